//! In-memory task and evaluation store.
//!
//! Fast, thread-safe storage suitable for development, testing,
//! and single-process deployments.

use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use parking_lot::RwLock;
use tracing::{debug, instrument};
use uuid::Uuid;

use taskeval_core::constants::{DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT};
use taskeval_core::error::{EvalError, Result};
use taskeval_core::traits::{StatsSource, TaskFilter, TaskStore};
use taskeval_core::types::{Evaluation, StoreStats, Task};

/// In-memory task and evaluation store.
///
/// Uses concurrent data structures for thread-safe access without
/// requiring external synchronization.
///
/// # Indexing
///
/// - Tasks by ID: for direct lookup
/// - Evaluations by task ID: a task carries at most one evaluation,
///   enforced at insertion
///
/// # Thread Safety
///
/// All operations are thread-safe and can be called concurrently.
#[derive(Debug, Default)]
pub struct MemoryStore {
    /// Primary storage: task ID → Task
    tasks: DashMap<Uuid, Task>,
    /// Evaluation storage: task ID → Evaluation
    evaluations: DashMap<Uuid, Evaluation>,
    /// Aggregate counters
    stats: RwLock<StoreStats>,
}

impl MemoryStore {
    /// Creates a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store with preallocated capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            tasks: DashMap::with_capacity(capacity),
            evaluations: DashMap::with_capacity(capacity),
            stats: RwLock::new(StoreStats::new()),
        }
    }

    /// Returns the number of stored tasks.
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Returns true if the store holds no tasks.
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Clears all tasks and evaluations.
    pub fn clear(&self) {
        self.tasks.clear();
        self.evaluations.clear();
        *self.stats.write() = StoreStats::new();
    }
}

#[async_trait]
impl TaskStore for MemoryStore {
    /// Persists a new task after validating it.
    #[instrument(skip(self, task), fields(language = %task.language))]
    async fn create_task(&self, task: Task) -> Result<Uuid> {
        task.validate()?;

        let id = task.id;
        debug!(%id, "Storing task");

        self.stats.write().add_task(&task);
        self.tasks.insert(id, task);

        Ok(id)
    }

    async fn get_task(&self, id: Uuid) -> Result<Option<Task>> {
        Ok(self.tasks.get(&id).map(|entry| entry.clone()))
    }

    /// Lists tasks matching a filter, newest first.
    #[instrument(skip(self))]
    async fn list_tasks(&self, filter: TaskFilter) -> Result<Vec<Task>> {
        let language = filter.language.as_deref().map(|l| l.trim().to_lowercase());

        let mut tasks: Vec<Task> = self
            .tasks
            .iter()
            .filter(|entry| {
                let task = entry.value();
                if let Some(user_id) = filter.user_id {
                    if task.user_id != user_id {
                        return false;
                    }
                }
                if let Some(ref language) = language {
                    if &task.normalized_language() != language {
                        return false;
                    }
                }
                true
            })
            .map(|entry| entry.value().clone())
            .collect();

        tasks.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let limit = match filter.limit {
            0 => DEFAULT_PAGE_LIMIT,
            n => n.min(MAX_PAGE_LIMIT),
        };

        let page: Vec<Task> = tasks
            .into_iter()
            .skip(filter.offset as usize)
            .take(limit as usize)
            .collect();

        debug!(count = page.len(), "Listed tasks");
        Ok(page)
    }

    /// Persists an evaluation for a task.
    ///
    /// Rejected when the task does not exist or already has an evaluation.
    #[instrument(skip(self, evaluation), fields(task_id = %evaluation.task_id))]
    async fn insert_evaluation(&self, evaluation: Evaluation) -> Result<Uuid> {
        if !self.tasks.contains_key(&evaluation.task_id) {
            return Err(EvalError::TaskNotFound(evaluation.task_id.to_string()));
        }

        let id = evaluation.id;
        match self.evaluations.entry(evaluation.task_id) {
            Entry::Occupied(_) => {
                return Err(EvalError::DuplicateEvaluation(
                    evaluation.task_id.to_string(),
                ));
            }
            Entry::Vacant(slot) => {
                self.stats.write().add_evaluation(&evaluation);
                slot.insert(evaluation);
            }
        }

        debug!(%id, "Stored evaluation");
        Ok(id)
    }

    async fn get_evaluation(&self, task_id: Uuid) -> Result<Option<Evaluation>> {
        Ok(self.evaluations.get(&task_id).map(|entry| entry.clone()))
    }

    /// Unlocks the full report for a task's evaluation. Idempotent.
    #[instrument(skip(self))]
    async fn mark_paid(&self, task_id: Uuid) -> Result<()> {
        let mut entry = self
            .evaluations
            .get_mut(&task_id)
            .ok_or_else(|| EvalError::EvaluationNotFound(task_id.to_string()))?;

        if !entry.is_paid {
            entry.is_paid = true;
            self.stats.write().add_paid();
            debug!(%task_id, "Unlocked evaluation");
        }

        Ok(())
    }

    async fn count_tasks(&self) -> Result<u64> {
        Ok(self.tasks.len() as u64)
    }

    async fn count_evaluations(&self) -> Result<u64> {
        Ok(self.evaluations.len() as u64)
    }
}

#[async_trait]
impl StatsSource for MemoryStore {
    async fn stats(&self) -> Result<StoreStats> {
        Ok(self.stats.read().clone())
    }

    async fn all_evaluations(&self) -> Result<Vec<Evaluation>> {
        Ok(self
            .evaluations
            .iter()
            .map(|entry| entry.value().clone())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use taskeval_core::types::EvaluationReport;

    fn make_task(language: &str) -> Task {
        Task::new(Uuid::new_v4(), "example", language, "fn main() {}")
    }

    fn make_report() -> EvaluationReport {
        EvaluationReport {
            score: 80,
            strengths: vec!["readable".into()],
            improvements: vec!["add tests".into()],
            full_report: "Solid overall.".into(),
            fixed_code: "fn main() {}".into(),
        }
    }

    #[tokio::test]
    async fn test_create_and_get_task() {
        let store = MemoryStore::new();
        let task = make_task("rust");

        let id = store.create_task(task.clone()).await.unwrap();
        assert_eq!(id, task.id);

        let fetched = store.get_task(id).await.unwrap().unwrap();
        assert_eq!(fetched.title, "example");
    }

    #[tokio::test]
    async fn test_invalid_task_rejected() {
        let store = MemoryStore::new();
        let mut task = make_task("rust");
        task.code = String::new();

        assert!(store.create_task(task).await.is_err());
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_get_nonexistent_task() {
        let store = MemoryStore::new();
        let result = store.get_task(Uuid::new_v4()).await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_list_filters_by_user() {
        let store = MemoryStore::new();
        let user = Uuid::new_v4();

        let mut mine = make_task("rust");
        mine.user_id = user;
        store.create_task(mine).await.unwrap();
        store.create_task(make_task("rust")).await.unwrap();

        let filter = TaskFilter {
            user_id: Some(user),
            ..Default::default()
        };
        let tasks = store.list_tasks(filter).await.unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].user_id, user);
    }

    #[tokio::test]
    async fn test_list_filters_by_language_case_insensitive() {
        let store = MemoryStore::new();
        store.create_task(make_task("Rust")).await.unwrap();
        store.create_task(make_task("rust")).await.unwrap();
        store.create_task(make_task("python")).await.unwrap();

        let filter = TaskFilter {
            language: Some("RUST".into()),
            ..Default::default()
        };
        let tasks = store.list_tasks(filter).await.unwrap();
        assert_eq!(tasks.len(), 2);
    }

    #[tokio::test]
    async fn test_list_pagination() {
        let store = MemoryStore::new();
        for _ in 0..5 {
            store.create_task(make_task("rust")).await.unwrap();
        }

        let filter = TaskFilter {
            offset: 2,
            limit: 2,
            ..Default::default()
        };
        let page = store.list_tasks(filter).await.unwrap();
        assert_eq!(page.len(), 2);
    }

    #[tokio::test]
    async fn test_insert_and_get_evaluation() {
        let store = MemoryStore::new();
        let task = make_task("rust");
        store.create_task(task.clone()).await.unwrap();

        let eval = Evaluation::from_report(&task, make_report());
        store.insert_evaluation(eval).await.unwrap();

        let fetched = store.get_evaluation(task.id).await.unwrap().unwrap();
        assert_eq!(fetched.score, 80);
        assert!(!fetched.is_paid);
    }

    #[tokio::test]
    async fn test_duplicate_evaluation_rejected() {
        let store = MemoryStore::new();
        let task = make_task("rust");
        store.create_task(task.clone()).await.unwrap();

        store
            .insert_evaluation(Evaluation::from_report(&task, make_report()))
            .await
            .unwrap();

        let second = store
            .insert_evaluation(Evaluation::from_report(&task, make_report()))
            .await;
        assert!(matches!(second, Err(EvalError::DuplicateEvaluation(_))));
    }

    #[tokio::test]
    async fn test_evaluation_requires_existing_task() {
        let store = MemoryStore::new();
        let orphan = make_task("rust");

        let result = store
            .insert_evaluation(Evaluation::from_report(&orphan, make_report()))
            .await;
        assert!(matches!(result, Err(EvalError::TaskNotFound(_))));
    }

    #[tokio::test]
    async fn test_mark_paid() {
        let store = MemoryStore::new();
        let task = make_task("rust");
        store.create_task(task.clone()).await.unwrap();
        store
            .insert_evaluation(Evaluation::from_report(&task, make_report()))
            .await
            .unwrap();

        store.mark_paid(task.id).await.unwrap();
        assert!(store.get_evaluation(task.id).await.unwrap().unwrap().is_paid);

        // Idempotent: a second unlock does not double-count
        store.mark_paid(task.id).await.unwrap();
        assert_eq!(store.stats().await.unwrap().paid_reports, 1);
    }

    #[tokio::test]
    async fn test_mark_paid_missing_evaluation() {
        let store = MemoryStore::new();
        let result = store.mark_paid(Uuid::new_v4()).await;
        assert!(matches!(result, Err(EvalError::EvaluationNotFound(_))));
    }

    #[tokio::test]
    async fn test_counts_and_stats() {
        let store = MemoryStore::new();
        let task = make_task("rust");
        store.create_task(task.clone()).await.unwrap();
        store.create_task(make_task("python")).await.unwrap();
        store
            .insert_evaluation(Evaluation::from_report(&task, make_report()))
            .await
            .unwrap();

        assert_eq!(store.count_tasks().await.unwrap(), 2);
        assert_eq!(store.count_evaluations().await.unwrap(), 1);

        let stats = store.stats().await.unwrap();
        assert_eq!(stats.total_tasks, 2);
        assert_eq!(stats.total_evaluations, 1);
        assert_eq!(stats.language_distribution["rust"], 1);
        assert_eq!(stats.language_distribution["python"], 1);
    }

    #[tokio::test]
    async fn test_clear() {
        let store = MemoryStore::new();
        store.create_task(make_task("rust")).await.unwrap();

        store.clear();
        assert!(store.is_empty());
        assert_eq!(store.stats().await.unwrap().total_tasks, 0);
    }

    #[tokio::test]
    async fn test_concurrent_create() {
        use std::sync::Arc;
        use tokio::task::JoinSet;

        let store = Arc::new(MemoryStore::new());
        let mut tasks = JoinSet::new();

        // Spawn 100 concurrent create tasks
        for _ in 0..100 {
            let store = store.clone();
            tasks.spawn(async move { store.create_task(make_task("rust")).await.unwrap() });
        }

        while let Some(result) = tasks.join_next().await {
            result.unwrap();
        }

        assert_eq!(store.len(), 100);
    }
}
