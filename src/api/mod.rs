/// HTTP API Layer
///
/// REST endpoints for employees, projects with their teams, and tasks.
/// Every response uses the same JSON envelope:
/// `{ "success": bool, "message"?: string, "count"?: number, "data"?: any }`.

// Employee directory endpoints
pub mod employees;

// Project CRUD and team membership endpoints
pub mod projects;

// Task tracking endpoints
pub mod tasks;

use crate::{
    employee::EmployeeStorage,
    error::{HrmsError, HrmsResult},
    project::ProjectStorage,
    task::TaskStorage,
};
use serde::{de::DeserializeOwned, Serialize};

// Re-export router builders
pub use employees::create_employee_routes;
pub use projects::create_project_routes;
pub use tasks::create_task_routes;

/// Application state containing shared storage handles
#[derive(Clone)]
pub struct AppState {
    pub employees: EmployeeStorage,
    pub projects: ProjectStorage,
    pub tasks: TaskStorage,
}

impl AppState {
    pub fn new(pool: sqlx::SqlitePool) -> Self {
        Self {
            employees: EmployeeStorage::new(pool.clone()),
            projects: ProjectStorage::new(pool.clone()),
            tasks: TaskStorage::new(pool),
        }
    }
}

/// Success envelope
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn data(data: T) -> Self {
        Self {
            success: true,
            message: None,
            count: None,
            data: Some(data),
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_count(mut self, count: usize) -> Self {
        self.count = Some(count);
        self
    }
}

impl ApiResponse<()> {
    /// Envelope carrying only a message
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            count: None,
            data: None,
        }
    }
}

/// Parse a JSON request body, turning malformed input into a 400
pub fn parse_body<T: DeserializeOwned>(body: &str) -> HrmsResult<T> {
    serde_json::from_str(body).map_err(|e| {
        tracing::warn!("❌ Invalid JSON payload: {}", e);
        HrmsError::validation(format!("Invalid request body: {}", e))
    })
}
