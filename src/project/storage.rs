/// SQLite persistence for projects and their teams
///
/// Project creation and update are multi-statement workflows: the project row,
/// the lead's team row and every role-tagged member row are written through a
/// single transaction. Any failure (unknown employee, duplicate key, database
/// error) returns early and drops the transaction, which rolls everything back.

use crate::db::{begin_write, format_date, now_timestamp, parse_optional_date, parse_date, parse_stored, parse_timestamp, today};
use crate::employee::{find_employee_by_name, get_employee_by_id, EmployeeRef};
use crate::error::{is_unique_violation, HrmsError, HrmsResult};
use crate::project::types::{
    AddMemberRequest, CreateProjectRequest, Project, ProjectDetails, ProjectSummary,
    TeamAssignment, TeamMember, TeamRole, UpdateProjectRequest,
};
use sqlx::{
    sqlite::{SqlitePool, SqliteRow},
    Row, SqliteConnection,
};
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

const PROJECT_SELECT: &str = r#"
    SELECT p.project_id, p.name, p.project_key, p.project_type, p.description, p.department,
           p.lead_id, p.start_date, p.end_date, p.status, p.created_at, p.updated_at,
           e.first_name AS lead_first_name, e.last_name AS lead_last_name
    FROM projects p
    LEFT JOIN employees e ON e.employee_id = p.lead_id
"#;

const TEAM_SELECT: &str = r#"
    SELECT t.project_id, t.employee_id, t.role, t.joined_date, e.first_name, e.last_name
    FROM project_team_members t
    JOIN employees e ON e.employee_id = t.employee_id
"#;

const TEAM_ORDER: &str = r#"
    ORDER BY CASE t.role
                 WHEN 'Lead' THEN 0
                 WHEN 'Project Manager' THEN 1
                 WHEN 'Technical Lead' THEN 2
                 ELSE 3
             END,
             e.first_name, e.last_name
"#;

/// SQLite-based project and team storage
#[derive(Debug, Clone)]
pub struct ProjectStorage {
    pool: SqlitePool,
}

impl ProjectStorage {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a project with its lead and role-scoped team in one transaction
    pub async fn create_project(&self, request: CreateProjectRequest) -> HrmsResult<ProjectSummary> {
        request.validate()?;

        let mut tx = begin_write(&self.pool).await?;

        let lead_name = request.project_lead.trim();
        let lead = find_employee_by_name(&mut *tx, lead_name)
            .await?
            .ok_or_else(|| {
                HrmsError::validation(format!("Project lead '{}' not found in the system", lead_name))
            })?;

        let project_id = Uuid::new_v4().to_string();
        let name = request.name.trim().to_string();
        let key = request.key.trim().to_string();
        let now = now_timestamp();

        let inserted = sqlx::query(
            r#"
            INSERT INTO projects
                (project_id, name, project_key, project_type, description, department, lead_id,
                 start_date, end_date, status, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, 'Active', ?, ?)
            "#,
        )
        .bind(&project_id)
        .bind(&name)
        .bind(&key)
        .bind(request.project_type.trim())
        .bind(non_blank(request.description.as_deref()))
        .bind(non_blank(request.department.as_deref()))
        .bind(&lead.employee_id)
        .bind(request.start_date.map(format_date))
        .bind(request.end_date.map(format_date))
        .bind(&now)
        .bind(&now)
        .execute(&mut *tx)
        .await;

        match inserted {
            Ok(_) => {}
            Err(e) if is_unique_violation(&e) => {
                return Err(HrmsError::conflict(format!("Project key '{}' already exists", key)))
            }
            Err(e) => return Err(e.into()),
        }

        insert_team_row(&mut *tx, &project_id, &lead.employee_id, TeamRole::Lead).await?;
        let assigned = assign_roles(&mut *tx, &project_id, request.role_lists()).await?;

        tx.commit().await?;

        tracing::info!(
            "📁 Created project {} ({}) led by {} with {} team assignments",
            key,
            project_id,
            lead.employee_id,
            assigned
        );

        Ok(ProjectSummary { project_id, name, key })
    }

    /// All projects with lead and team, newest first
    pub async fn list_projects(&self) -> HrmsResult<Vec<ProjectDetails>> {
        let mut conn = self.pool.acquire().await?;

        let rows = sqlx::query(&format!("{} ORDER BY p.created_at DESC, p.name", PROJECT_SELECT))
            .fetch_all(&mut *conn)
            .await?;

        let team_rows = sqlx::query(&format!("{} {}", TEAM_SELECT, TEAM_ORDER))
            .fetch_all(&mut *conn)
            .await?;

        let mut teams: HashMap<String, Vec<TeamMember>> = HashMap::new();
        for row in &team_rows {
            let project_id: String = row.get("project_id");
            teams.entry(project_id).or_default().push(team_member_from_row(row)?);
        }

        rows.iter()
            .map(|row| {
                let (project, lead) = project_from_row(row)?;
                let team = teams.remove(&project.project_id).unwrap_or_default();
                Ok(ProjectDetails::assemble(project, lead, team))
            })
            .collect()
    }

    /// A single project with lead and team
    pub async fn get_project(&self, project_id: &str) -> HrmsResult<Option<ProjectDetails>> {
        let mut conn = self.pool.acquire().await?;

        let Some((project, lead)) = load_project(&mut *conn, project_id).await? else {
            return Ok(None);
        };
        let team = load_team(&mut *conn, project_id).await?;

        Ok(Some(ProjectDetails::assemble(project, lead, team)))
    }

    /// Partially update a project; a role list in the request replaces the team
    pub async fn update_project(
        &self,
        project_id: &str,
        request: UpdateProjectRequest,
    ) -> HrmsResult<ProjectSummary> {
        let mut tx = begin_write(&self.pool).await?;

        let (mut project, _) = load_project(&mut *tx, project_id)
            .await?
            .ok_or_else(|| HrmsError::not_found("Project not found"))?;

        request.apply_to(&mut project)?;

        if let Some(lead_name) = request.project_lead.as_deref().map(str::trim).filter(|n| !n.is_empty()) {
            let lead = find_employee_by_name(&mut *tx, lead_name)
                .await?
                .ok_or_else(|| {
                    HrmsError::validation(format!("Project lead '{}' not found in the system", lead_name))
                })?;

            if lead.employee_id != project.lead_id {
                sqlx::query("DELETE FROM project_team_members WHERE project_id = ? AND role = ?")
                    .bind(project_id)
                    .bind(TeamRole::Lead.as_str())
                    .execute(&mut *tx)
                    .await?;
                insert_team_row(&mut *tx, project_id, &lead.employee_id, TeamRole::Lead).await?;
                tracing::debug!("🔁 Project {} lead {} -> {}", project_id, project.lead_id, lead.employee_id);
                project.lead_id = lead.employee_id;
            }
        }

        sqlx::query(
            r#"
            UPDATE projects
            SET name = ?, description = ?, department = ?, lead_id = ?,
                start_date = ?, end_date = ?, status = ?, updated_at = ?
            WHERE project_id = ?
            "#,
        )
        .bind(&project.name)
        .bind(&project.description)
        .bind(&project.department)
        .bind(&project.lead_id)
        .bind(project.start_date.map(format_date))
        .bind(project.end_date.map(format_date))
        .bind(project.status.as_str())
        .bind(now_timestamp())
        .bind(project_id)
        .execute(&mut *tx)
        .await?;

        if request.replaces_team() {
            sqlx::query("DELETE FROM project_team_members WHERE project_id = ? AND role != ?")
                .bind(project_id)
                .bind(TeamRole::Lead.as_str())
                .execute(&mut *tx)
                .await?;
            let assigned = assign_roles(&mut *tx, project_id, request.role_lists()).await?;
            tracing::debug!("👥 Replaced team of project {} with {} assignments", project_id, assigned);
        }

        tx.commit().await?;

        tracing::info!("✏️ Updated project {} ({})", project.key, project_id);

        Ok(ProjectSummary {
            project_id: project.project_id,
            name: project.name,
            key: project.key,
        })
    }

    /// Delete a project; team rows cascade and tasks are detached
    pub async fn delete_project(&self, project_id: &str) -> HrmsResult<bool> {
        let result = sqlx::query("DELETE FROM projects WHERE project_id = ?")
            .bind(project_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Add one employee to an existing project
    pub async fn add_member(&self, request: AddMemberRequest) -> HrmsResult<TeamAssignment> {
        let project_id = request.project_id.as_deref().map(str::trim).unwrap_or_default();
        let employee_id = request.employee_id.as_deref().map(str::trim).unwrap_or_default();
        if project_id.is_empty() || employee_id.is_empty() {
            return Err(HrmsError::validation("Project ID and Employee ID are required"));
        }

        let role = match request.role.as_deref().map(str::trim).filter(|r| !r.is_empty()) {
            Some(role) => role.parse::<TeamRole>()?,
            None => TeamRole::Member,
        };
        if role == TeamRole::Lead {
            return Err(HrmsError::validation(
                "The project lead is set on the project itself, not through team membership",
            ));
        }

        let mut tx = begin_write(&self.pool).await?;

        if !project_exists(&mut *tx, project_id).await? {
            return Err(HrmsError::not_found("Project not found"));
        }
        if get_employee_by_id(&mut *tx, employee_id).await?.is_none() {
            return Err(HrmsError::not_found("Employee not found"));
        }

        let existing: Option<String> = sqlx::query_scalar(
            "SELECT id FROM project_team_members WHERE project_id = ? AND employee_id = ? LIMIT 1",
        )
        .bind(project_id)
        .bind(employee_id)
        .fetch_optional(&mut *tx)
        .await?;
        if existing.is_some() {
            return Err(HrmsError::validation("Employee is already a member of this project"));
        }

        let assignment = insert_team_row(&mut *tx, project_id, employee_id, role).await?;
        tx.commit().await?;

        tracing::info!("➕ Added {} to project {} as {}", employee_id, project_id, role);
        Ok(assignment)
    }

    /// Remove an employee's non-lead roles from a project, returning how many rows went
    pub async fn remove_member(&self, project_id: &str, employee_id: &str) -> HrmsResult<u64> {
        let mut tx = begin_write(&self.pool).await?;

        let roles: Vec<String> = sqlx::query_scalar(
            "SELECT role FROM project_team_members WHERE project_id = ? AND employee_id = ?",
        )
        .bind(project_id)
        .bind(employee_id)
        .fetch_all(&mut *tx)
        .await?;

        if roles.is_empty() {
            return Err(HrmsError::not_found("Employee is not a member of this project"));
        }
        if roles.iter().all(|role| role == TeamRole::Lead.as_str()) {
            return Err(HrmsError::validation(
                "The project lead cannot be removed; assign a new lead instead",
            ));
        }

        let result = sqlx::query(
            "DELETE FROM project_team_members WHERE project_id = ? AND employee_id = ? AND role != ?",
        )
        .bind(project_id)
        .bind(employee_id)
        .bind(TeamRole::Lead.as_str())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::info!("➖ Removed {} from project {}", employee_id, project_id);
        Ok(result.rows_affected())
    }
}

/// Resolve every name in the role lists and insert one row per employee per role
///
/// Blank names are skipped; a name that matches nobody aborts the workflow.
async fn assign_roles(
    conn: &mut SqliteConnection,
    project_id: &str,
    role_lists: [(TeamRole, &[String]); 3],
) -> HrmsResult<usize> {
    let mut seen: HashSet<(String, TeamRole)> = HashSet::new();

    for (role, names) in role_lists {
        for name in names.iter().map(|n| n.trim()).filter(|n| !n.is_empty()) {
            let employee = find_employee_by_name(&mut *conn, name)
                .await?
                .ok_or_else(|| {
                    HrmsError::validation(format!("{} '{}' not found in the system", role, name))
                })?;

            if seen.insert((employee.employee_id.clone(), role)) {
                insert_team_row(&mut *conn, project_id, &employee.employee_id, role).await?;
            }
        }
    }

    Ok(seen.len())
}

async fn insert_team_row(
    conn: &mut SqliteConnection,
    project_id: &str,
    employee_id: &str,
    role: TeamRole,
) -> HrmsResult<TeamAssignment> {
    let id = Uuid::new_v4().to_string();
    let joined = today();
    let now = now_timestamp();

    sqlx::query(
        r#"
        INSERT INTO project_team_members
            (id, project_id, employee_id, role, joined_date, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&id)
    .bind(project_id)
    .bind(employee_id)
    .bind(role.as_str())
    .bind(&joined)
    .bind(&now)
    .bind(&now)
    .execute(&mut *conn)
    .await?;

    let created_at = parse_timestamp(&now)?;
    Ok(TeamAssignment {
        id,
        project_id: project_id.to_string(),
        employee_id: employee_id.to_string(),
        role,
        joined_date: parse_date(&joined)?,
        created_at,
        updated_at: created_at,
    })
}

pub(crate) async fn project_exists(conn: &mut SqliteConnection, project_id: &str) -> HrmsResult<bool> {
    let found: Option<i64> = sqlx::query_scalar("SELECT 1 FROM projects WHERE project_id = ?")
        .bind(project_id)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(found.is_some())
}

async fn load_project(
    conn: &mut SqliteConnection,
    project_id: &str,
) -> HrmsResult<Option<(Project, Option<EmployeeRef>)>> {
    let row = sqlx::query(&format!("{} WHERE p.project_id = ?", PROJECT_SELECT))
        .bind(project_id)
        .fetch_optional(&mut *conn)
        .await?;

    row.as_ref().map(project_from_row).transpose()
}

async fn load_team(conn: &mut SqliteConnection, project_id: &str) -> HrmsResult<Vec<TeamMember>> {
    let rows = sqlx::query(&format!("{} WHERE t.project_id = ? {}", TEAM_SELECT, TEAM_ORDER))
        .bind(project_id)
        .fetch_all(&mut *conn)
        .await?;

    rows.iter().map(team_member_from_row).collect()
}

fn project_from_row(row: &SqliteRow) -> HrmsResult<(Project, Option<EmployeeRef>)> {
    let lead_id: String = row.get("lead_id");
    let status: String = row.get("status");
    let created_at: String = row.get("created_at");
    let updated_at: String = row.get("updated_at");

    let lead_first_name: Option<String> = row.get("lead_first_name");
    let lead = lead_first_name.map(|first_name| EmployeeRef {
        employee_id: lead_id.clone(),
        first_name,
        last_name: row.get("lead_last_name"),
    });

    let project = Project {
        project_id: row.get("project_id"),
        name: row.get("name"),
        key: row.get("project_key"),
        project_type: row.get("project_type"),
        description: row.get("description"),
        department: row.get("department"),
        lead_id,
        start_date: parse_optional_date(row.get("start_date"))?,
        end_date: parse_optional_date(row.get("end_date"))?,
        status: parse_stored(&status)?,
        created_at: parse_timestamp(&created_at)?,
        updated_at: parse_timestamp(&updated_at)?,
    };

    Ok((project, lead))
}

fn team_member_from_row(row: &SqliteRow) -> HrmsResult<TeamMember> {
    let role: String = row.get("role");
    let joined_date: String = row.get("joined_date");
    Ok(TeamMember {
        employee: EmployeeRef {
            employee_id: row.get("employee_id"),
            first_name: row.get("first_name"),
            last_name: row.get("last_name"),
        },
        role: parse_stored(&role)?,
        joined_date: parse_date(&joined_date)?,
    })
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
