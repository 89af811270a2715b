/// HRMS: project, team and task management service
///
/// This library provides the employee directory, projects with role-tagged
/// team assignments, and task tracking, exposed as a JSON REST API over a
/// single SQLite database.

// Core configuration and setup
pub mod config;

// Error type shared by storage and HTTP layers
pub mod error;

// Database connection, schema and value helpers
pub mod db;

// Employee directory - name resolution for team assignment
pub mod employee;

// Project management layer - projects and their teams
pub mod project;

// Task tracking - tasks, comments and summaries
pub mod task;

// HTTP API layer - REST endpoints
pub mod api;

// Server setup and initialization
pub mod server;

// Re-export commonly used types for external consumers
pub use employee::{Employee, EmployeeStorage};
pub use error::{HrmsError, HrmsResult};
pub use project::{Project, ProjectDetails, ProjectStorage, TeamRole};
pub use server::{create_app, start_server};
pub use task::{Task, TaskStorage};
