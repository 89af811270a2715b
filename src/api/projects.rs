/// Project management REST API endpoints
///
/// CRUD for projects plus team membership. Create and update accept team
/// members by display name and are applied atomically.

use crate::api::{parse_body, ApiResponse, AppState};
use crate::employee::EmployeeOption;
use crate::error::{HrmsError, HrmsResult};
use crate::project::{
    AddMemberRequest, CreateProjectRequest, ProjectDetails, ProjectSummary, TeamAssignment,
    UpdateProjectRequest,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::{delete, get, post, put},
    Router,
};

/// Create project management routes
pub fn create_project_routes() -> Router<AppState> {
    Router::new()
        .route("/api/projects", get(list_projects))
        .route("/api/projects", post(create_project))
        .route("/api/projects/employees/selection", get(employee_selection))
        .route("/api/projects/members", post(add_member))
        .route("/api/projects/{id}", get(get_project))
        .route("/api/projects/{id}", put(update_project))
        .route("/api/projects/{id}", delete(delete_project))
        .route("/api/projects/{project_id}/members/{employee_id}", delete(remove_member))
}

/// List all projects with lead and team
///
/// GET /api/projects
async fn list_projects(
    State(state): State<AppState>,
) -> HrmsResult<Json<ApiResponse<Vec<ProjectDetails>>>> {
    let projects = state.projects.list_projects().await?;
    Ok(Json(ApiResponse::data(projects)))
}

/// Create a project with its team
///
/// POST /api/projects
/// Body: { "name", "key", "type", "projectLead", "projectManagers": [..], "technicalLeads": [..], "teamMembers": [..], ... }
async fn create_project(
    State(state): State<AppState>,
    body: String,
) -> HrmsResult<(StatusCode, Json<ApiResponse<ProjectSummary>>)> {
    let request: CreateProjectRequest = parse_body(&body)?;
    let summary = state.projects.create_project(request).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::data(summary).with_message("Project created successfully")),
    ))
}

/// GET /api/projects/{id}
async fn get_project(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> HrmsResult<Json<ApiResponse<ProjectDetails>>> {
    match state.projects.get_project(&id).await? {
        Some(project) => Ok(Json(ApiResponse::data(project))),
        None => Err(HrmsError::not_found("Project not found")),
    }
}

/// Update project fields and optionally replace the team
///
/// PUT /api/projects/{id}
async fn update_project(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: String,
) -> HrmsResult<Json<ApiResponse<ProjectSummary>>> {
    let request: UpdateProjectRequest = parse_body(&body)?;
    let summary = state.projects.update_project(&id, request).await?;

    Ok(Json(
        ApiResponse::data(summary).with_message("Project updated successfully"),
    ))
}

/// DELETE /api/projects/{id}
async fn delete_project(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> HrmsResult<Json<ApiResponse<()>>> {
    if state.projects.delete_project(&id).await? {
        tracing::info!("🗑️ Deleted project {}", id);
        Ok(Json(ApiResponse::message("Project deleted successfully")))
    } else {
        Err(HrmsError::not_found("Project not found"))
    }
}

/// Active employees for the team picker
///
/// GET /api/projects/employees/selection
async fn employee_selection(
    State(state): State<AppState>,
) -> HrmsResult<Json<ApiResponse<Vec<EmployeeOption>>>> {
    let employees = state.employees.list_for_selection().await?;
    let count = employees.len();
    Ok(Json(ApiResponse::data(employees).with_count(count)))
}

/// POST /api/projects/members
/// Body: { "projectId": "...", "employeeId": "...", "role": "Member" }
async fn add_member(
    State(state): State<AppState>,
    body: String,
) -> HrmsResult<(StatusCode, Json<ApiResponse<TeamAssignment>>)> {
    let request: AddMemberRequest = parse_body(&body)?;
    let assignment = state.projects.add_member(request).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::data(assignment).with_message("Member added to project successfully")),
    ))
}

/// DELETE /api/projects/{project_id}/members/{employee_id}
async fn remove_member(
    State(state): State<AppState>,
    Path((project_id, employee_id)): Path<(String, String)>,
) -> HrmsResult<Json<ApiResponse<()>>> {
    state.projects.remove_member(&project_id, &employee_id).await?;
    Ok(Json(ApiResponse::message("Member removed from project successfully")))
}
