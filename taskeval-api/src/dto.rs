//! DTOs for API requests and responses.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use taskeval_core::types::{Evaluation, Task};

/// Request to upload a task.
#[derive(Debug, Deserialize)]
pub struct CreateTaskRequest {
    /// Owner of the task
    pub user_id: Uuid,
    /// Short title
    pub title: String,
    /// Programming language of the snippet
    pub language: String,
    /// The snippet itself
    pub code: String,
    /// Optional context for the evaluator
    pub description: Option<String>,
}

/// A task as returned by the API.
#[derive(Debug, Clone, Serialize)]
pub struct TaskDto {
    /// Task identifier
    pub id: Uuid,
    /// Owner
    pub user_id: Uuid,
    /// Title
    pub title: String,
    /// Language
    pub language: String,
    /// Snippet
    pub code: String,
    /// Optional description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Creation time
    pub created_at: DateTime<Utc>,
}

impl From<Task> for TaskDto {
    fn from(task: Task) -> Self {
        Self {
            id: task.id,
            user_id: task.user_id,
            title: task.title,
            language: task.language,
            code: task.code,
            description: task.description,
            created_at: task.created_at,
        }
    }
}

/// Query parameters for listing tasks.
#[derive(Debug, Deserialize)]
pub struct ListTasksQuery {
    /// Filter by owner
    pub user_id: Option<Uuid>,
    /// Filter by language (case-insensitive)
    pub language: Option<String>,
    /// Pagination: offset
    pub offset: Option<u64>,
    /// Pagination: limit
    pub limit: Option<u64>,
}

/// Response for task listings.
#[derive(Debug, Serialize)]
pub struct ListTasksResponse {
    /// Tasks on this page, newest first
    pub tasks: Vec<TaskDto>,
    /// Number of tasks on this page
    pub count: u64,
}

/// Request to evaluate a task.
#[derive(Debug, Deserialize)]
pub struct EvaluateRequest {
    /// Task identifier (UUID)
    pub task_id: String,
}

/// An evaluation as returned by the API.
///
/// The narrative report and rewritten code are present only once the
/// evaluation has been unlocked.
#[derive(Debug, Clone, Serialize)]
pub struct EvaluationDto {
    /// Evaluation identifier
    pub id: Uuid,
    /// The evaluated task
    pub task_id: Uuid,
    /// Owner
    pub user_id: Uuid,
    /// Overall quality score
    pub score: u8,
    /// What the code does well
    pub strengths: Vec<String>,
    /// Concrete improvement suggestions
    pub improvements: Vec<String>,
    /// Detailed analysis (unlocked reports only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_report: Option<String>,
    /// Rewritten code (unlocked reports only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fixed_code: Option<String>,
    /// Whether the full report has been unlocked
    pub is_paid: bool,
    /// Creation time
    pub created_at: DateTime<Utc>,
}

impl From<Evaluation> for EvaluationDto {
    fn from(eval: Evaluation) -> Self {
        let gated = if eval.is_paid {
            (Some(eval.full_report), Some(eval.fixed_code))
        } else {
            (None, None)
        };

        Self {
            id: eval.id,
            task_id: eval.task_id,
            user_id: eval.user_id,
            score: eval.score,
            strengths: eval.strengths,
            improvements: eval.improvements,
            full_report: gated.0,
            fixed_code: gated.1,
            is_paid: eval.is_paid,
            created_at: eval.created_at,
        }
    }
}

/// Response for the evaluate workflow.
#[derive(Debug, Serialize)]
pub struct EvaluateResponse {
    /// The stored (or cached) evaluation
    pub evaluation: EvaluationDto,
    /// True when the result came from the cache
    pub cached: bool,
}

/// Response for the processing-status probe.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    /// Task identifier
    pub task_id: Uuid,
    /// Whether an evaluation attempt is currently in flight
    pub in_progress: bool,
}

/// Response for unlocking an evaluation.
#[derive(Debug, Serialize)]
pub struct UnlockResponse {
    /// Task identifier
    pub task_id: Uuid,
    /// Confirmation
    pub is_paid: bool,
}

/// Query parameters for the stats endpoint.
#[derive(Debug, Deserialize)]
pub struct StatsQuery {
    /// Requesting user (rate-limiting key)
    pub user_id: Option<Uuid>,
}

/// Tasks per language, for distribution display.
#[derive(Debug, Clone, Serialize)]
pub struct LanguageCount {
    /// Normalized language name
    pub language: String,
    /// Number of tasks
    pub count: u64,
}

/// Service statistics.
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    /// Total tasks
    pub total_tasks: u64,
    /// Total evaluations
    pub total_evaluations: u64,
    /// Unlocked reports
    pub paid_reports: u64,
    /// Mean score over all evaluations, two decimals
    pub average_score: f64,
    /// Evaluations currently in flight
    pub processing_count: u64,
    /// Task distribution per language, largest first
    pub language_distribution: Vec<LanguageCount>,
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Status
    pub status: String,
    /// Version
    pub version: String,
    /// Uptime in seconds
    pub uptime_seconds: u64,
    /// Total tasks in the store
    pub tasks_count: u64,
    /// Evaluations currently in flight
    pub processing_count: u64,
    /// Name of the active evaluator
    pub evaluator: String,
}
