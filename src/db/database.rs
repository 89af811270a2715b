/// SQLite connection setup and schema management
///
/// One database file holds employees, projects, team assignments and tasks.
/// Referential integrity is enforced by SQLite foreign keys, so deleting a
/// project cascades to its team rows and detaches its tasks.

use crate::config::DatabaseConfig;
use anyhow::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool};
use std::time::Duration;

/// How long a write transaction waits for another writer to finish
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Open (creating if missing) the service database and ensure its schema
pub async fn connect(config: &DatabaseConfig) -> Result<SqlitePool> {
    std::fs::create_dir_all(&config.data_dir)
        .map_err(|e| anyhow::anyhow!("Failed to create data directory '{}': {}", config.data_dir, e))?;

    let db_path = config.database_path();
    tracing::info!("🗄️ Opening database: {}", db_path.display());

    let options = SqliteConnectOptions::new()
        .filename(&db_path)
        .create_if_missing(true)
        .foreign_keys(true)
        .busy_timeout(BUSY_TIMEOUT)
        .journal_mode(SqliteJournalMode::Wal);
    let pool = SqlitePool::connect_with(options).await?;

    init_schema(&pool).await?;

    tracing::info!("✅ Database ready: {}", db_path.display());
    Ok(pool)
}

/// Create all tables and indexes
///
/// Safe to call multiple times (uses IF NOT EXISTS).
pub async fn init_schema(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS employees (
            employee_id TEXT PRIMARY KEY,
            first_name TEXT NOT NULL,
            last_name TEXT,
            company_email TEXT,
            employment_status TEXT NOT NULL DEFAULT 'Active',
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS projects (
            project_id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            project_key TEXT NOT NULL UNIQUE,
            project_type TEXT NOT NULL,
            description TEXT,
            department TEXT,
            lead_id TEXT NOT NULL REFERENCES employees(employee_id),
            start_date TEXT,
            end_date TEXT,
            status TEXT NOT NULL DEFAULT 'Active'
                CHECK (status IN ('Active', 'Completed', 'On Hold', 'Cancelled', 'Not Started')),
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS project_team_members (
            id TEXT PRIMARY KEY,
            project_id TEXT NOT NULL REFERENCES projects(project_id) ON DELETE CASCADE,
            employee_id TEXT NOT NULL REFERENCES employees(employee_id) ON DELETE CASCADE,
            role TEXT NOT NULL
                CHECK (role IN ('Lead', 'Project Manager', 'Technical Lead', 'Member')),
            joined_date TEXT NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            UNIQUE (project_id, employee_id, role)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS tasks (
            id TEXT PRIMARY KEY,
            title TEXT NOT NULL,
            description TEXT NOT NULL DEFAULT '',
            status TEXT NOT NULL,
            task_type TEXT NOT NULL,
            priority TEXT NOT NULL,
            assignee TEXT,
            reporter TEXT,
            project_id TEXT REFERENCES projects(project_id) ON DELETE SET NULL,
            due_date TEXT,
            estimate TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS task_comments (
            id TEXT PRIMARY KEY,
            task_id TEXT NOT NULL REFERENCES tasks(id) ON DELETE CASCADE,
            body TEXT NOT NULL,
            author TEXT NOT NULL,
            created_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Lookup indexes
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_employees_name ON employees(first_name, last_name)")
        .execute(pool)
        .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_team_project ON project_team_members(project_id)")
        .execute(pool)
        .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_tasks_assignee ON tasks(assignee)")
        .execute(pool)
        .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_comments_task ON task_comments(task_id)")
        .execute(pool)
        .await?;

    Ok(())
}
