/// Employee type definitions
///
/// Employees are the people projects and team assignments point at. Only the
/// fields the project module needs are modelled here.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Default value of `employment_status`
pub const ACTIVE_STATUS: &str = "Active";

/// Placeholder avatar handed to selection lists
pub const PLACEHOLDER_AVATAR: &str = "/api/placeholder/40/40";

/// A person record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    #[serde(rename = "employee_id")]
    pub employee_id: String,
    pub first_name: String,
    pub last_name: Option<String>,
    pub company_email: Option<String>,
    /// "Active", "Inactive", ... (free text, only "Active" is interpreted)
    pub employment_status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Employee {
    /// "First Last", or just the first name when there is no last name
    pub fn full_name(&self) -> String {
        match self.last_name.as_deref() {
            Some(last) if !last.trim().is_empty() => format!("{} {}", self.first_name, last),
            _ => self.first_name.clone(),
        }
    }
}

/// Compact employee reference embedded in project payloads
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeRef {
    #[serde(rename = "employee_id")]
    pub employee_id: String,
    pub first_name: String,
    pub last_name: Option<String>,
}

/// Employee formatted for the project team picker
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmployeeOption {
    pub id: String,
    pub name: String,
    pub email: Option<String>,
    pub avatar: &'static str,
}

impl From<&Employee> for EmployeeOption {
    fn from(employee: &Employee) -> Self {
        Self {
            id: employee.employee_id.clone(),
            name: employee.full_name(),
            email: employee.company_email.clone(),
            avatar: PLACEHOLDER_AVATAR,
        }
    }
}

/// Request body for employee creation
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEmployeeRequest {
    /// Generated when omitted
    pub employee_id: Option<String>,
    #[serde(default)]
    pub first_name: String,
    pub last_name: Option<String>,
    pub company_email: Option<String>,
    pub employment_status: Option<String>,
}

/// Split a display name into the (first name, last name) pair used for lookup
///
/// One token matches the first name only. With more tokens the first one is
/// the first name and the rest, joined by single spaces, is the last name.
pub fn split_name(name: &str) -> Option<(String, Option<String>)> {
    let mut parts = name.split_whitespace();
    let first = parts.next()?.to_string();
    let rest: Vec<&str> = parts.collect();
    if rest.is_empty() {
        Some((first, None))
    } else {
        Some((first, Some(rest.join(" "))))
    }
}
