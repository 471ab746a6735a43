//! API route handlers.

use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use tracing::{debug, info};

use taskeval_core::traits::{StatsSource, TaskFilter, TaskStore};
use taskeval_core::types::{average_score, parse_task_id, Evaluation, Task};

use crate::dto::*;
use crate::error::ApiError;
use crate::state::AppState;

type Result<T> = std::result::Result<T, ApiError>;

/// POST /api/v1/tasks
pub async fn create_task(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateTaskRequest>,
) -> Result<Json<TaskDto>> {
    let mut task = Task::new(req.user_id, req.title, req.language, req.code);
    if let Some(description) = req.description {
        task = task.with_description(description);
    }

    let id = state.store.create_task(task.clone()).await?;

    info!(%id, language = %task.language, "Task uploaded");
    Ok(Json(TaskDto::from(task)))
}

/// GET /api/v1/tasks/:id
pub async fn get_task(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<TaskDto>> {
    let id = parse_task_id(&id)?;

    let task = state
        .store
        .get_task(id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Task not found: {id}")))?;

    Ok(Json(TaskDto::from(task)))
}

/// GET /api/v1/tasks
pub async fn list_tasks(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListTasksQuery>,
) -> Result<Json<ListTasksResponse>> {
    let filter = TaskFilter {
        user_id: params.user_id,
        language: params.language,
        offset: params.offset.unwrap_or(0),
        limit: params.limit.unwrap_or(0),
    };

    let tasks: Vec<TaskDto> = state
        .store
        .list_tasks(filter)
        .await?
        .into_iter()
        .map(TaskDto::from)
        .collect();

    let count = tasks.len() as u64;
    Ok(Json(ListTasksResponse { tasks, count }))
}

/// POST /api/v1/evaluate
///
/// The evaluation workflow: cached results short-circuit, a task with an
/// existing evaluation conflicts, and everything else runs exactly once
/// under single-flight protection with the configured timeout.
pub async fn evaluate(
    State(state): State<Arc<AppState>>,
    Json(req): Json<EvaluateRequest>,
) -> Result<Json<EvaluateResponse>> {
    let task_id = parse_task_id(&req.task_id)?;
    let key = task_id.to_string();

    if let Some(cached) = state.cache.get(&key) {
        debug!(%task_id, "Evaluation served from cache");
        return Ok(Json(EvaluateResponse {
            evaluation: EvaluationDto::from(cached),
            cached: true,
        }));
    }

    let task = state
        .store
        .get_task(task_id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Task not found: {task_id}")))?;

    if state.store.get_evaluation(task_id).await?.is_some() {
        return Err(ApiError::conflict(
            "Task has already been evaluated",
            "ALREADY_EVALUATED",
        ));
    }

    let store = &state.store;
    let evaluator = Arc::clone(&state.evaluator);
    let evaluation = state
        .tracker
        .run(&key, async move {
            let report = evaluator.evaluate(&task).await?;
            let evaluation = Evaluation::from_report(&task, report);
            store.insert_evaluation(evaluation.clone()).await?;
            Ok(evaluation)
        })
        .await?;

    state.cache.insert(key, evaluation.clone());

    info!(%task_id, score = evaluation.score, "Evaluation complete");
    Ok(Json(EvaluateResponse {
        evaluation: EvaluationDto::from(evaluation),
        cached: false,
    }))
}

/// GET /api/v1/evaluate/:id/status
pub async fn evaluation_status(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<StatusResponse>> {
    let task_id = parse_task_id(&id)?;

    Ok(Json(StatusResponse {
        task_id,
        in_progress: state.tracker.is_in_progress(&task_id.to_string()),
    }))
}

/// GET /api/v1/evaluations/:task_id
pub async fn get_evaluation(
    State(state): State<Arc<AppState>>,
    Path(task_id): Path<String>,
) -> Result<Json<EvaluationDto>> {
    let task_id = parse_task_id(&task_id)?;

    let evaluation = state
        .store
        .get_evaluation(task_id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Evaluation not found for task: {task_id}")))?;

    Ok(Json(EvaluationDto::from(evaluation)))
}

/// POST /api/v1/evaluations/:task_id/unlock
pub async fn unlock_evaluation(
    State(state): State<Arc<AppState>>,
    Path(task_id): Path<String>,
) -> Result<Json<UnlockResponse>> {
    let task_id = parse_task_id(&task_id)?;

    state.store.mark_paid(task_id).await?;
    // The cached copy predates the unlock
    state.cache.remove(&task_id.to_string());

    info!(%task_id, "Evaluation unlocked");
    Ok(Json(UnlockResponse {
        task_id,
        is_paid: true,
    }))
}

/// GET /api/v1/stats
pub async fn stats(
    State(state): State<Arc<AppState>>,
    Query(params): Query<StatsQuery>,
) -> Result<Json<StatsResponse>> {
    let user_id = params
        .user_id
        .ok_or_else(|| ApiError::bad_request("user_id is required"))?;

    if state.stats_limiter.check_key(&user_id).is_err() {
        return Err(ApiError::too_many_requests("Stats request limit exceeded"));
    }

    let cache_key = user_id.to_string();
    if let Some(mut cached) = state.stats_cache.get(&cache_key) {
        // In-flight count is a point-in-time reading, never cached
        cached.processing_count = state.tracker.count() as u64;
        return Ok(Json(cached));
    }

    let store_stats = state.store.stats().await?;
    let evaluations = state.store.all_evaluations().await?;

    let mut language_distribution: Vec<LanguageCount> = store_stats
        .language_distribution
        .iter()
        .map(|(language, &count)| LanguageCount {
            language: language.clone(),
            count,
        })
        .collect();
    language_distribution.sort_by(|a, b| b.count.cmp(&a.count).then(a.language.cmp(&b.language)));

    let response = StatsResponse {
        total_tasks: store_stats.total_tasks,
        total_evaluations: store_stats.total_evaluations,
        paid_reports: store_stats.paid_reports,
        average_score: average_score(&evaluations),
        processing_count: state.tracker.count() as u64,
        language_distribution,
    };

    state.stats_cache.insert(cache_key, response.clone());

    debug!(user = %user_id, "Computed stats");
    Ok(Json(response))
}

static START_TIME: std::sync::OnceLock<Instant> = std::sync::OnceLock::new();

/// GET /health
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let start = START_TIME.get_or_init(Instant::now);
    let uptime = start.elapsed().as_secs();

    let tasks_count = state.store.count_tasks().await.unwrap_or(0);

    Json(HealthResponse {
        status: "ok".into(),
        version: env!("CARGO_PKG_VERSION").into(),
        uptime_seconds: uptime,
        tasks_count,
        processing_count: state.tracker.count() as u64,
        evaluator: state.evaluator.name().into(),
    })
}
