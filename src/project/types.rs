/// Project type definitions
///
/// Projects are owned by a lead and staffed through role-tagged team rows.
/// Request structs carry team members by display name; the storage layer
/// resolves them to employees inside the create/update transaction.

use crate::db::deserialize_optional_date;
use crate::employee::EmployeeRef;
use crate::error::{HrmsError, HrmsResult};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Lifecycle status of a project
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ProjectStatus {
    #[default]
    Active,
    Completed,
    #[serde(rename = "On Hold")]
    OnHold,
    Cancelled,
    #[serde(rename = "Not Started")]
    NotStarted,
}

impl ProjectStatus {
    pub const ALL: [ProjectStatus; 5] = [
        Self::Active,
        Self::Completed,
        Self::OnHold,
        Self::Cancelled,
        Self::NotStarted,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "Active",
            Self::Completed => "Completed",
            Self::OnHold => "On Hold",
            Self::Cancelled => "Cancelled",
            Self::NotStarted => "Not Started",
        }
    }
}

impl fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProjectStatus {
    type Err = HrmsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| HrmsError::validation(format!("Invalid project status '{}'", s)))
    }
}

/// Role an employee holds on a project team
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TeamRole {
    Lead,
    #[serde(rename = "Project Manager")]
    ProjectManager,
    #[serde(rename = "Technical Lead")]
    TechnicalLead,
    Member,
}

impl TeamRole {
    pub const ALL: [TeamRole; 4] = [
        Self::Lead,
        Self::ProjectManager,
        Self::TechnicalLead,
        Self::Member,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Lead => "Lead",
            Self::ProjectManager => "Project Manager",
            Self::TechnicalLead => "Technical Lead",
            Self::Member => "Member",
        }
    }
}

impl fmt::Display for TeamRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TeamRole {
    type Err = HrmsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|role| role.as_str() == s)
            .ok_or_else(|| HrmsError::validation(format!("Invalid team role '{}'", s)))
    }
}

/// Check a project key: 2 to 10 characters, uppercase ASCII letters or digits
pub fn validate_project_key(key: &str) -> HrmsResult<()> {
    let valid_len = (2..=10).contains(&key.len());
    let valid_chars = key
        .chars()
        .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit());
    if valid_len && valid_chars {
        Ok(())
    } else {
        Err(HrmsError::validation(
            "Project key must be 2-10 uppercase letters or numbers",
        ))
    }
}

fn validate_timeline(start: Option<NaiveDate>, end: Option<NaiveDate>) -> HrmsResult<()> {
    match (start, end) {
        (Some(start), Some(end)) if start > end => Err(HrmsError::validation(
            "End date must be after start date",
        )),
        _ => Ok(()),
    }
}

/// A stored project row
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Project {
    pub project_id: String,
    pub name: String,
    pub key: String,
    #[serde(rename = "type")]
    pub project_type: String,
    pub description: Option<String>,
    pub department: Option<String>,
    pub lead_id: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub status: ProjectStatus,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

/// One employee's role on a project, with the employee's name
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamMember {
    #[serde(flatten)]
    pub employee: EmployeeRef,
    pub role: TeamRole,
    pub joined_date: NaiveDate,
}

/// Project together with its lead and team, grouped by role
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectDetails {
    #[serde(flatten)]
    pub project: Project,
    pub project_lead: Option<EmployeeRef>,
    pub project_managers: Vec<EmployeeRef>,
    pub technical_leads: Vec<EmployeeRef>,
    /// Every team row, lead included
    pub team_members: Vec<TeamMember>,
}

impl ProjectDetails {
    /// Group a project's team rows by role
    pub fn assemble(project: Project, project_lead: Option<EmployeeRef>, team: Vec<TeamMember>) -> Self {
        let by_role = |role: TeamRole| -> Vec<EmployeeRef> {
            team.iter()
                .filter(|member| member.role == role)
                .map(|member| member.employee.clone())
                .collect()
        };

        let project_managers = by_role(TeamRole::ProjectManager);
        let technical_leads = by_role(TeamRole::TechnicalLead);

        Self {
            project,
            project_lead,
            project_managers,
            technical_leads,
            team_members: team,
        }
    }
}

/// A project_team_members row
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamAssignment {
    pub id: String,
    pub project_id: String,
    pub employee_id: String,
    pub role: TeamRole,
    pub joined_date: NaiveDate,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

/// Short result of create/update operations
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectSummary {
    pub project_id: String,
    pub name: String,
    pub key: String,
}

/// Request body for project creation
///
/// Team members are given by display name ("Alex Johnson").
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProjectRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub key: String,
    #[serde(default, rename = "type")]
    pub project_type: String,
    pub description: Option<String>,
    pub department: Option<String>,
    #[serde(default)]
    pub project_lead: String,
    #[serde(default)]
    pub project_managers: Vec<String>,
    #[serde(default)]
    pub technical_leads: Vec<String>,
    #[serde(default)]
    pub team_members: Vec<String>,
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub end_date: Option<NaiveDate>,
}

impl CreateProjectRequest {
    pub fn validate(&self) -> HrmsResult<()> {
        if self.name.trim().is_empty() {
            return Err(HrmsError::validation("Project name is required"));
        }
        if self.key.trim().is_empty() {
            return Err(HrmsError::validation("Project key is required"));
        }
        validate_project_key(self.key.trim())?;
        if self.project_type.trim().is_empty() {
            return Err(HrmsError::validation("Project type is required"));
        }
        if self.project_lead.trim().is_empty() {
            return Err(HrmsError::validation("Project lead is required"));
        }
        validate_timeline(self.start_date, self.end_date)
    }

    /// Role lists in insertion order
    pub fn role_lists(&self) -> [(TeamRole, &[String]); 3] {
        [
            (TeamRole::ProjectManager, self.project_managers.as_slice()),
            (TeamRole::TechnicalLead, self.technical_leads.as_slice()),
            (TeamRole::Member, self.team_members.as_slice()),
        ]
    }
}

/// Request body for project updates; absent fields are left untouched
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProjectRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub department: Option<String>,
    pub project_lead: Option<String>,
    pub project_managers: Option<Vec<String>>,
    pub technical_leads: Option<Vec<String>>,
    pub team_members: Option<Vec<String>>,
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub end_date: Option<NaiveDate>,
    pub status: Option<String>,
}

impl UpdateProjectRequest {
    /// Parsed status, if one was sent
    pub fn parsed_status(&self) -> HrmsResult<Option<ProjectStatus>> {
        self.status
            .as_deref()
            .filter(|status| !status.is_empty())
            .map(ProjectStatus::from_str)
            .transpose()
    }

    /// Whether the request replaces the team (any role list present)
    pub fn replaces_team(&self) -> bool {
        self.project_managers.is_some() || self.technical_leads.is_some() || self.team_members.is_some()
    }

    /// Role lists in insertion order, absent lists as empty
    pub fn role_lists(&self) -> [(TeamRole, &[String]); 3] {
        fn list(names: &Option<Vec<String>>) -> &[String] {
            names.as_deref().unwrap_or(&[])
        }
        [
            (TeamRole::ProjectManager, list(&self.project_managers)),
            (TeamRole::TechnicalLead, list(&self.technical_leads)),
            (TeamRole::Member, list(&self.team_members)),
        ]
    }

    /// Apply scalar changes to a loaded project, validating the result
    pub fn apply_to(&self, project: &mut Project) -> HrmsResult<()> {
        if let Some(name) = self.name.as_deref().map(str::trim).filter(|n| !n.is_empty()) {
            project.name = name.to_string();
        }
        if let Some(description) = &self.description {
            project.description = Some(description.clone()).filter(|d| !d.trim().is_empty());
        }
        if let Some(department) = &self.department {
            project.department = Some(department.clone()).filter(|d| !d.trim().is_empty());
        }
        if self.start_date.is_some() {
            project.start_date = self.start_date;
        }
        if self.end_date.is_some() {
            project.end_date = self.end_date;
        }
        if let Some(status) = self.parsed_status()? {
            project.status = status;
        }
        validate_timeline(project.start_date, project.end_date)
    }
}

/// Request body for adding a single member to an existing project
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddMemberRequest {
    pub project_id: Option<String>,
    pub employee_id: Option<String>,
    pub role: Option<String>,
}
