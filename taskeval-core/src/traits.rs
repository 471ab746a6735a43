//! Common traits for taskeval.
//!
//! These traits define the interfaces that different implementations can satisfy,
//! enabling modularity and testing.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::Result;
use crate::types::{Evaluation, EvaluationReport, StoreStats, Task};

// ═══════════════════════════════════════════════════════════════════════════════
// STORE TRAIT
// ═══════════════════════════════════════════════════════════════════════════════

/// Filter and pagination options for task listings.
#[derive(Clone, Debug, Default)]
pub struct TaskFilter {
    /// Restrict to tasks owned by this user
    pub user_id: Option<Uuid>,
    /// Restrict to tasks in this language (matched case-insensitively)
    pub language: Option<String>,
    /// Number of matching tasks to skip
    pub offset: u64,
    /// Maximum number of tasks to return
    pub limit: u64,
}

/// Interface for task and evaluation storage.
///
/// Implementations might use:
/// - In-memory storage (for testing/development/single-process deployments)
/// - PostgreSQL or a hosted row store (for production)
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Persists a new task after validating it.
    ///
    /// Returns the task identifier.
    async fn create_task(&self, task: Task) -> Result<Uuid>;

    /// Retrieves a task by identifier.
    async fn get_task(&self, id: Uuid) -> Result<Option<Task>>;

    /// Lists tasks matching a filter, newest first.
    async fn list_tasks(&self, filter: TaskFilter) -> Result<Vec<Task>>;

    /// Persists an evaluation for a task.
    ///
    /// A task carries at most one evaluation; a second insert for the same
    /// task is rejected rather than merged.
    async fn insert_evaluation(&self, evaluation: Evaluation) -> Result<Uuid>;

    /// Retrieves the evaluation attached to a task, if any.
    async fn get_evaluation(&self, task_id: Uuid) -> Result<Option<Evaluation>>;

    /// Unlocks the full report for a task's evaluation.
    async fn mark_paid(&self, task_id: Uuid) -> Result<()>;

    /// Returns the total task count.
    async fn count_tasks(&self) -> Result<u64>;

    /// Returns the total evaluation count.
    async fn count_evaluations(&self) -> Result<u64>;
}

// ═══════════════════════════════════════════════════════════════════════════════
// EVALUATOR TRAIT
// ═══════════════════════════════════════════════════════════════════════════════

/// Interface for producing an evaluation report from a task.
///
/// The hosted implementation calls an LLM API; an offline implementation
/// exists for development and tests.
#[async_trait]
pub trait Evaluator: Send + Sync {
    /// Evaluates a task and returns the model's report.
    ///
    /// The report is validated and its score clamped before it is returned.
    async fn evaluate(&self, task: &Task) -> Result<EvaluationReport>;

    /// A short name identifying this evaluator, for logging.
    fn name(&self) -> &str;
}

/// Extension surface for stores that can report aggregate statistics.
#[async_trait]
pub trait StatsSource: Send + Sync {
    /// Returns current aggregate counters.
    async fn stats(&self) -> Result<StoreStats>;

    /// Returns every stored evaluation (for score aggregation).
    async fn all_evaluations(&self) -> Result<Vec<Evaluation>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_filter_default() {
        let filter = TaskFilter::default();
        assert!(filter.user_id.is_none());
        assert!(filter.language.is_none());
        assert_eq!(filter.offset, 0);
        assert_eq!(filter.limit, 0);
    }
}
