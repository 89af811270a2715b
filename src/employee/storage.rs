/// SQLite persistence for employees
///
/// Besides plain CRUD this provides the name resolution the project workflow
/// uses to turn display names ("Alex Johnson") into employee records. Lookups
/// take a `SqliteConnection` so they can run inside a caller's transaction.

use crate::db::{now_timestamp, parse_timestamp};
use crate::employee::types::{
    split_name, CreateEmployeeRequest, Employee, EmployeeOption, ACTIVE_STATUS,
};
use crate::error::{is_unique_violation, HrmsError, HrmsResult};
use sqlx::{
    sqlite::{SqlitePool, SqliteRow},
    Row, SqliteConnection,
};

const EMPLOYEE_COLUMNS: &str = "employee_id, first_name, last_name, company_email, \
     employment_status, created_at, updated_at";

/// SQLite-based employee storage
#[derive(Debug, Clone)]
pub struct EmployeeStorage {
    pool: SqlitePool,
}

impl EmployeeStorage {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a new employee, generating an id when the request has none
    pub async fn create_employee(&self, request: CreateEmployeeRequest) -> HrmsResult<Employee> {
        let first_name = request.first_name.trim().to_string();
        if first_name.is_empty() {
            return Err(HrmsError::validation("First name is required"));
        }

        let employee_id = match request.employee_id.map(|id| id.trim().to_string()) {
            Some(id) if id.is_empty() => {
                return Err(HrmsError::validation("Employee ID must not be blank"))
            }
            Some(id) => id,
            None => generate_employee_id(),
        };

        let last_name = request
            .last_name
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty());
        let status = request
            .employment_status
            .filter(|status| !status.trim().is_empty())
            .unwrap_or_else(|| ACTIVE_STATUS.to_string());
        let now = now_timestamp();

        let result = sqlx::query(
            r#"
            INSERT INTO employees
                (employee_id, first_name, last_name, company_email, employment_status, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&employee_id)
        .bind(&first_name)
        .bind(&last_name)
        .bind(&request.company_email)
        .bind(&status)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => {}
            Err(e) if is_unique_violation(&e) => {
                return Err(HrmsError::conflict(format!(
                    "Employee '{}' already exists",
                    employee_id
                )))
            }
            Err(e) => return Err(e.into()),
        }

        tracing::info!("👤 Created employee {} ({})", employee_id, first_name);

        self.get_employee(&employee_id)
            .await?
            .ok_or_else(|| HrmsError::Internal(format!("employee {} vanished after insert", employee_id)))
    }

    pub async fn get_employee(&self, employee_id: &str) -> HrmsResult<Option<Employee>> {
        let mut conn = self.pool.acquire().await?;
        get_employee_by_id(&mut *conn, employee_id).await
    }

    /// All employees ordered by id
    pub async fn list_employees(&self) -> HrmsResult<Vec<Employee>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM employees ORDER BY employee_id",
            EMPLOYEE_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(employee_from_row).collect()
    }

    /// Active employees formatted for the project team picker
    pub async fn list_for_selection(&self) -> HrmsResult<Vec<EmployeeOption>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM employees WHERE employment_status = ? ORDER BY first_name, last_name",
            EMPLOYEE_COLUMNS
        ))
        .bind(ACTIVE_STATUS)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| employee_from_row(row).map(|employee| EmployeeOption::from(&employee)))
            .collect()
    }
}

/// Look up an employee by primary key on an existing connection
pub async fn get_employee_by_id(
    conn: &mut SqliteConnection,
    employee_id: &str,
) -> HrmsResult<Option<Employee>> {
    let row = sqlx::query(&format!(
        "SELECT {} FROM employees WHERE employee_id = ?",
        EMPLOYEE_COLUMNS
    ))
    .bind(employee_id)
    .fetch_optional(&mut *conn)
    .await?;

    row.as_ref().map(employee_from_row).transpose()
}

/// Resolve a display name to an employee
///
/// A single token matches `first_name`; otherwise the first token must match
/// `first_name` and the remainder `last_name`. When several employees share
/// the name the lowest id wins.
pub async fn find_employee_by_name(
    conn: &mut SqliteConnection,
    name: &str,
) -> HrmsResult<Option<Employee>> {
    let Some((first_name, last_name)) = split_name(name) else {
        return Ok(None);
    };

    let row = match last_name {
        Some(last_name) => {
            sqlx::query(&format!(
                "SELECT {} FROM employees WHERE first_name = ? AND last_name = ? \
                 ORDER BY employee_id LIMIT 1",
                EMPLOYEE_COLUMNS
            ))
            .bind(first_name)
            .bind(last_name)
            .fetch_optional(&mut *conn)
            .await?
        }
        None => {
            sqlx::query(&format!(
                "SELECT {} FROM employees WHERE first_name = ? ORDER BY employee_id LIMIT 1",
                EMPLOYEE_COLUMNS
            ))
            .bind(first_name)
            .fetch_optional(&mut *conn)
            .await?
        }
    };

    row.as_ref().map(employee_from_row).transpose()
}

fn employee_from_row(row: &SqliteRow) -> HrmsResult<Employee> {
    let created_at: String = row.get("created_at");
    let updated_at: String = row.get("updated_at");
    Ok(Employee {
        employee_id: row.get("employee_id"),
        first_name: row.get("first_name"),
        last_name: row.get("last_name"),
        company_email: row.get("company_email"),
        employment_status: row.get("employment_status"),
        created_at: parse_timestamp(&created_at)?,
        updated_at: parse_timestamp(&updated_at)?,
    })
}

fn generate_employee_id() -> String {
    let id = uuid::Uuid::new_v4().simple().to_string();
    format!("EMP-{}", id[..8].to_uppercase())
}
