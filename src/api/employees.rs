/// Employee directory endpoints
///
/// Minimal employee records so projects have people to reference.

use crate::api::{parse_body, ApiResponse, AppState};
use crate::employee::{CreateEmployeeRequest, Employee};
use crate::error::{HrmsError, HrmsResult};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};

pub fn create_employee_routes() -> Router<AppState> {
    Router::new()
        .route("/api/employees", get(list_employees))
        .route("/api/employees", post(create_employee))
        .route("/api/employees/{id}", get(get_employee))
}

/// GET /api/employees
async fn list_employees(
    State(state): State<AppState>,
) -> HrmsResult<Json<ApiResponse<Vec<Employee>>>> {
    let employees = state.employees.list_employees().await?;
    let count = employees.len();
    Ok(Json(ApiResponse::data(employees).with_count(count)))
}

/// POST /api/employees
/// Body: { "employeeId"?: "...", "firstName": "...", "lastName"?: "...", "companyEmail"?: "..." }
async fn create_employee(
    State(state): State<AppState>,
    body: String,
) -> HrmsResult<(StatusCode, Json<ApiResponse<Employee>>)> {
    let request: CreateEmployeeRequest = parse_body(&body)?;
    let employee = state.employees.create_employee(request).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::data(employee).with_message("Employee created successfully")),
    ))
}

/// GET /api/employees/{id}
async fn get_employee(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> HrmsResult<Json<ApiResponse<Employee>>> {
    state
        .employees
        .get_employee(&id)
        .await?
        .map(|employee| Json(ApiResponse::data(employee)))
        .ok_or_else(|| HrmsError::not_found("Employee not found"))
}
