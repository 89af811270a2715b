/// Task tracking REST API endpoints
///
/// Task CRUD, comment threads, filtered listings, and per-status counts.

use crate::api::{parse_body, ApiResponse, AppState};
use crate::error::{HrmsError, HrmsResult};
use crate::task::{
    CreateCommentRequest, CreateTaskRequest, Task, TaskComment, TaskListParams, TaskQuery,
    TaskSummary, UpdateTaskRequest,
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::{delete, get, post, put},
    Router,
};
use serde::Deserialize;

/// Query string of `GET /api/tasks/summary`
#[derive(Debug, Default, Deserialize)]
pub struct SummaryParams {
    pub assignee: Option<String>,
}

pub fn create_task_routes() -> Router<AppState> {
    Router::new()
        .route("/api/tasks", get(list_tasks))
        .route("/api/tasks", post(create_task))
        .route("/api/tasks/summary", get(task_summary))
        .route("/api/tasks/{id}", get(get_task))
        .route("/api/tasks/{id}", put(update_task))
        .route("/api/tasks/{id}", delete(delete_task))
        .route("/api/tasks/{id}/comments", post(add_comment))
}

/// GET /api/tasks?search=&status=&assignee=&projectId=&sort=&direction=
async fn list_tasks(
    State(state): State<AppState>,
    Query(params): Query<TaskListParams>,
) -> HrmsResult<Json<ApiResponse<Vec<Task>>>> {
    let query = TaskQuery::try_from(params)?;
    let tasks = state.tasks.list_tasks(&query).await?;
    let count = tasks.len();
    Ok(Json(ApiResponse::data(tasks).with_count(count)))
}

/// POST /api/tasks
async fn create_task(
    State(state): State<AppState>,
    body: String,
) -> HrmsResult<(StatusCode, Json<ApiResponse<Task>>)> {
    let request: CreateTaskRequest = parse_body(&body)?;
    let task = state.tasks.create_task(request).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::data(task).with_message("Task created successfully")),
    ))
}

/// GET /api/tasks/summary?assignee=
async fn task_summary(
    State(state): State<AppState>,
    Query(params): Query<SummaryParams>,
) -> HrmsResult<Json<ApiResponse<TaskSummary>>> {
    let assignee = params.assignee.as_deref().map(str::trim).filter(|a| !a.is_empty());
    let summary = state.tasks.summary(assignee).await?;
    Ok(Json(ApiResponse::data(summary)))
}

/// GET /api/tasks/{id}
async fn get_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> HrmsResult<Json<ApiResponse<Task>>> {
    match state.tasks.get_task(&id).await? {
        Some(task) => Ok(Json(ApiResponse::data(task))),
        None => Err(HrmsError::not_found("Task not found")),
    }
}

/// PUT /api/tasks/{id}
async fn update_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: String,
) -> HrmsResult<Json<ApiResponse<Task>>> {
    let request: UpdateTaskRequest = parse_body(&body)?;
    let task = state.tasks.update_task(&id, request).await?;
    Ok(Json(ApiResponse::data(task).with_message("Task updated successfully")))
}

/// DELETE /api/tasks/{id}
async fn delete_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> HrmsResult<Json<ApiResponse<()>>> {
    if state.tasks.delete_task(&id).await? {
        tracing::info!("🗑️ Deleted task {}", id);
        Ok(Json(ApiResponse::message("Task deleted successfully")))
    } else {
        Err(HrmsError::not_found("Task not found"))
    }
}

/// POST /api/tasks/{id}/comments
/// Body: { "text": "...", "author": "..." }
async fn add_comment(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: String,
) -> HrmsResult<(StatusCode, Json<ApiResponse<TaskComment>>)> {
    let request: CreateCommentRequest = parse_body(&body)?;
    let comment = state.tasks.add_comment(&id, request).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::data(comment).with_message("Comment added successfully")),
    ))
}
