/// Task type definitions
///
/// Tasks carry a human-readable id derived from their type (`BUG-004`,
/// `STOR-012`, `TASK-001`), a status/priority pair, and a comment thread.

use crate::db::{deserialize_clearable_date, deserialize_optional_date};
use crate::error::{HrmsError, HrmsResult};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Generates `as_str`, `Display` and `FromStr` for a display-name enum
macro_rules! display_enum {
    ($name:ident, $what:literal, { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = HrmsError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::ALL
                    .iter()
                    .copied()
                    .find(|value| value.as_str() == s)
                    .ok_or_else(|| HrmsError::validation(format!("Invalid task {} '{}'", $what, s)))
            }
        }
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TaskStatus {
    #[default]
    #[serde(rename = "To Do")]
    ToDo,
    #[serde(rename = "In Progress")]
    InProgress,
    Done,
}

display_enum!(TaskStatus, "status", {
    ToDo => "To Do",
    InProgress => "In Progress",
    Done => "Done",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TaskType {
    #[default]
    Task,
    Bug,
    Story,
}

display_enum!(TaskType, "type", {
    Task => "Task",
    Bug => "Bug",
    Story => "Story",
});

impl TaskType {
    /// Id prefix for tasks of this type
    pub fn id_prefix(&self) -> &'static str {
        match self {
            Self::Task => "TASK",
            Self::Bug => "BUG",
            Self::Story => "STOR",
        }
    }
}

/// Ordered from least to most urgent
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub enum TaskPriority {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

display_enum!(TaskPriority, "priority", {
    Low => "Low",
    Medium => "Medium",
    High => "High",
    Critical => "Critical",
});

/// Next id for a task of `task_type`
///
/// Takes the highest numeric suffix among existing ids with the same prefix
/// and adds one, zero-padded to three digits. Suffixes that do not parse count
/// as zero.
pub fn next_task_id<'a>(task_type: TaskType, existing: impl IntoIterator<Item = &'a str>) -> String {
    let prefix = task_type.id_prefix();
    let highest = existing
        .into_iter()
        .filter_map(|id| id.strip_prefix(prefix)?.strip_prefix('-'))
        .map(|suffix| suffix.parse::<u32>().unwrap_or(0))
        .max()
        .unwrap_or(0);
    format!("{}-{:03}", prefix, highest + 1)
}

/// A comment on a task
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskComment {
    pub id: String,
    pub text: String,
    pub author: String,
    pub timestamp: DateTime<Utc>,
}

/// A tracked work item
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
    #[serde(rename = "type")]
    pub task_type: TaskType,
    pub priority: TaskPriority,
    pub assignee: Option<String>,
    pub reporter: Option<String>,
    pub project_id: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub estimate: Option<String>,
    #[serde(rename = "created")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updated")]
    pub updated_at: DateTime<Utc>,
    pub comments: Vec<TaskComment>,
}

/// Request body for task creation
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub status: Option<String>,
    #[serde(rename = "type")]
    pub task_type: Option<String>,
    pub priority: Option<String>,
    pub assignee: Option<String>,
    pub reporter: Option<String>,
    pub project_id: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub due_date: Option<NaiveDate>,
    pub estimate: Option<String>,
}

/// Validated creation input
#[derive(Debug, Clone, PartialEq)]
pub struct NewTask {
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
    pub task_type: TaskType,
    pub priority: TaskPriority,
    pub assignee: Option<String>,
    pub reporter: Option<String>,
    pub project_id: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub estimate: Option<String>,
}

fn parse_or_default<T: FromStr<Err = HrmsError> + Default>(value: Option<&str>) -> HrmsResult<T> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        Some(text) => text.parse(),
        None => Ok(T::default()),
    }
}

fn clean(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl CreateTaskRequest {
    pub fn validate(self) -> HrmsResult<NewTask> {
        let title = self.title.trim().to_string();
        if title.is_empty() {
            return Err(HrmsError::validation("Task title is required"));
        }
        Ok(NewTask {
            title,
            description: self.description.trim().to_string(),
            status: parse_or_default(self.status.as_deref())?,
            task_type: parse_or_default(self.task_type.as_deref())?,
            priority: parse_or_default(self.priority.as_deref())?,
            assignee: clean(self.assignee),
            reporter: clean(self.reporter),
            project_id: clean(self.project_id),
            due_date: self.due_date,
            estimate: clean(self.estimate),
        })
    }
}

/// Request body for task updates; absent fields are left untouched
///
/// The type is fixed at creation because it determines the id.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTaskRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
    pub priority: Option<String>,
    pub assignee: Option<String>,
    pub reporter: Option<String>,
    pub project_id: Option<String>,
    /// `Some(None)` clears the due date
    #[serde(default, deserialize_with = "deserialize_clearable_date")]
    pub due_date: Option<Option<NaiveDate>>,
    pub estimate: Option<String>,
}

impl UpdateTaskRequest {
    /// Apply changes to a loaded task; empty strings (and a null due date) clear optional fields
    pub fn apply_to(self, task: &mut Task) -> HrmsResult<()> {
        if let Some(title) = self.title {
            let title = title.trim();
            if title.is_empty() {
                return Err(HrmsError::validation("Task title must not be empty"));
            }
            task.title = title.to_string();
        }
        if let Some(description) = self.description {
            task.description = description.trim().to_string();
        }
        if let Some(status) = self.status {
            task.status = status.trim().parse()?;
        }
        if let Some(priority) = self.priority {
            task.priority = priority.trim().parse()?;
        }
        if self.assignee.is_some() {
            task.assignee = clean(self.assignee);
        }
        if self.reporter.is_some() {
            task.reporter = clean(self.reporter);
        }
        if self.project_id.is_some() {
            task.project_id = clean(self.project_id);
        }
        if let Some(due_date) = self.due_date {
            task.due_date = due_date;
        }
        if self.estimate.is_some() {
            task.estimate = clean(self.estimate);
        }
        Ok(())
    }
}

/// Request body for a new comment
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateCommentRequest {
    #[serde(default)]
    pub text: String,
    pub author: Option<String>,
}

/// Column a task list can be sorted by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TaskSortField {
    #[default]
    DueDate,
    Priority,
    Status,
    Title,
    Id,
    Created,
    Updated,
}

impl TaskSortField {
    /// SQL ordering expression for this field
    pub fn order_expression(&self) -> &'static str {
        match self {
            Self::DueDate => "due_date",
            Self::Priority => {
                "CASE priority WHEN 'Low' THEN 0 WHEN 'Medium' THEN 1 WHEN 'High' THEN 2 ELSE 3 END"
            }
            Self::Status => {
                "CASE status WHEN 'To Do' THEN 0 WHEN 'In Progress' THEN 1 ELSE 2 END"
            }
            Self::Title => "title COLLATE NOCASE",
            Self::Id => "id",
            Self::Created => "created_at",
            Self::Updated => "updated_at",
        }
    }
}

impl FromStr for TaskSortField {
    type Err = HrmsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "dueDate" => Ok(Self::DueDate),
            "priority" => Ok(Self::Priority),
            "status" => Ok(Self::Status),
            "title" => Ok(Self::Title),
            "id" => Ok(Self::Id),
            "created" => Ok(Self::Created),
            "updated" => Ok(Self::Updated),
            other => Err(HrmsError::validation(format!("Invalid sort field '{}'", other))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_sql(&self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

impl FromStr for SortDirection {
    type Err = HrmsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            _ => Err(HrmsError::validation(format!("Invalid sort direction '{}'", s))),
        }
    }
}

/// Raw list query parameters (`GET /api/tasks?search=..&status=..`)
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskListParams {
    pub search: Option<String>,
    pub status: Option<String>,
    pub assignee: Option<String>,
    pub project_id: Option<String>,
    pub sort: Option<String>,
    pub direction: Option<String>,
}

/// Validated task list filter and ordering
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskQuery {
    /// Case-insensitive substring of title or id
    pub search: Option<String>,
    pub status: Option<TaskStatus>,
    pub assignee: Option<String>,
    pub project_id: Option<String>,
    pub sort: TaskSortField,
    pub direction: SortDirection,
}

impl TryFrom<TaskListParams> for TaskQuery {
    type Error = HrmsError;

    fn try_from(params: TaskListParams) -> Result<Self, Self::Error> {
        let status = match params.status.as_deref().map(str::trim) {
            None | Some("") | Some("All") => None,
            Some(status) => Some(status.parse::<TaskStatus>()?),
        };
        Ok(Self {
            search: clean(params.search),
            status,
            assignee: clean(params.assignee),
            project_id: clean(params.project_id),
            sort: parse_or_default(params.sort.as_deref())?,
            direction: parse_or_default(params.direction.as_deref())?,
        })
    }
}

/// Task counts by status
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskSummary {
    pub total: i64,
    pub todo: i64,
    pub in_progress: i64,
    pub done: i64,
}
