/// SQLite persistence for tasks and their comments
///
/// Task ids are derived from existing ids of the same type, so id generation
/// and insert share one transaction.

use crate::db::{begin_write, format_date, now_timestamp, parse_optional_date, parse_stored, parse_timestamp};
use crate::error::{HrmsError, HrmsResult};
use crate::project::storage::project_exists;
use crate::task::types::{
    next_task_id, CreateCommentRequest, CreateTaskRequest, Task, TaskComment, TaskQuery,
    TaskStatus, TaskSummary, UpdateTaskRequest,
};
use sqlx::{
    sqlite::{SqlitePool, SqliteRow},
    QueryBuilder, Row, Sqlite, SqliteConnection,
};
use std::collections::HashMap;
use uuid::Uuid;

const TASK_COLUMNS: &str = "id, title, description, status, task_type, priority, assignee, \
     reporter, project_id, due_date, estimate, created_at, updated_at";

/// Author recorded when a comment arrives without one
pub const ANONYMOUS_AUTHOR: &str = "Anonymous";

/// SQLite-based task storage
#[derive(Debug, Clone)]
pub struct TaskStorage {
    pool: SqlitePool,
}

impl TaskStorage {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a task, assigning the next id for its type
    pub async fn create_task(&self, request: CreateTaskRequest) -> HrmsResult<Task> {
        let new_task = request.validate()?;

        let mut tx = begin_write(&self.pool).await?;

        if let Some(project_id) = &new_task.project_id {
            if !project_exists(&mut *tx, project_id).await? {
                return Err(HrmsError::not_found("Project not found"));
            }
        }

        let prefix = new_task.task_type.id_prefix();
        let existing: Vec<String> = sqlx::query_scalar("SELECT id FROM tasks WHERE id LIKE ?")
            .bind(format!("{}-%", prefix))
            .fetch_all(&mut *tx)
            .await?;
        let id = next_task_id(new_task.task_type, existing.iter().map(String::as_str));
        let now = now_timestamp();

        sqlx::query(
            r#"
            INSERT INTO tasks
                (id, title, description, status, task_type, priority, assignee, reporter,
                 project_id, due_date, estimate, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(&new_task.title)
        .bind(&new_task.description)
        .bind(new_task.status.as_str())
        .bind(new_task.task_type.as_str())
        .bind(new_task.priority.as_str())
        .bind(&new_task.assignee)
        .bind(&new_task.reporter)
        .bind(&new_task.project_id)
        .bind(new_task.due_date.map(format_date))
        .bind(&new_task.estimate)
        .bind(&now)
        .bind(&now)
        .execute(&mut *tx)
        .await?;

        let task = load_task(&mut *tx, &id)
            .await?
            .ok_or_else(|| HrmsError::Internal(format!("task {} vanished after insert", id)))?;

        tx.commit().await?;

        tracing::info!("📝 Created task {} ({})", task.id, task.title);
        Ok(task)
    }

    /// Filtered, ordered task list with comments
    pub async fn list_tasks(&self, query: &TaskQuery) -> HrmsResult<Vec<Task>> {
        let mut builder: QueryBuilder<Sqlite> =
            QueryBuilder::new(format!("SELECT {} FROM tasks WHERE 1 = 1", TASK_COLUMNS));

        if let Some(status) = query.status {
            builder.push(" AND status = ").push_bind(status.as_str());
        }
        if let Some(assignee) = &query.assignee {
            builder.push(" AND assignee = ").push_bind(assignee.clone());
        }
        if let Some(project_id) = &query.project_id {
            builder.push(" AND project_id = ").push_bind(project_id.clone());
        }

        builder
            .push(" ORDER BY ")
            .push(query.sort.order_expression())
            .push(" ")
            .push(query.direction.as_sql())
            .push(", id ASC");

        let mut conn = self.pool.acquire().await?;
        let rows = builder.build().fetch_all(&mut *conn).await?;
        let mut tasks = rows.iter().map(task_from_row).collect::<HrmsResult<Vec<_>>>()?;

        // SQLite's LOWER() only folds ASCII, so the substring match runs here
        if let Some(search) = &query.search {
            let needle = search.to_lowercase();
            tasks.retain(|task| {
                task.title.to_lowercase().contains(&needle) || task.id.to_lowercase().contains(&needle)
            });
        }

        attach_comments(&mut *conn, &mut tasks).await?;
        Ok(tasks)
    }

    pub async fn get_task(&self, id: &str) -> HrmsResult<Option<Task>> {
        let mut conn = self.pool.acquire().await?;
        load_task(&mut *conn, id).await
    }

    /// Partially update a task and refresh its `updated` timestamp
    pub async fn update_task(&self, id: &str, request: UpdateTaskRequest) -> HrmsResult<Task> {
        let mut tx = begin_write(&self.pool).await?;

        let mut task = load_task(&mut *tx, id)
            .await?
            .ok_or_else(|| HrmsError::not_found("Task not found"))?;
        request.apply_to(&mut task)?;

        if let Some(project_id) = &task.project_id {
            if !project_exists(&mut *tx, project_id).await? {
                return Err(HrmsError::not_found("Project not found"));
            }
        }

        sqlx::query(
            r#"
            UPDATE tasks
            SET title = ?, description = ?, status = ?, priority = ?, assignee = ?, reporter = ?,
                project_id = ?, due_date = ?, estimate = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&task.title)
        .bind(&task.description)
        .bind(task.status.as_str())
        .bind(task.priority.as_str())
        .bind(&task.assignee)
        .bind(&task.reporter)
        .bind(&task.project_id)
        .bind(task.due_date.map(format_date))
        .bind(&task.estimate)
        .bind(now_timestamp())
        .bind(id)
        .execute(&mut *tx)
        .await?;

        let task = load_task(&mut *tx, id)
            .await?
            .ok_or_else(|| HrmsError::Internal(format!("task {} vanished during update", id)))?;

        tx.commit().await?;

        tracing::info!("✏️ Updated task {}", id);
        Ok(task)
    }

    /// Delete a task and its comments
    pub async fn delete_task(&self, id: &str) -> HrmsResult<bool> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Append a comment to a task
    pub async fn add_comment(&self, task_id: &str, request: CreateCommentRequest) -> HrmsResult<TaskComment> {
        let text = request.text.trim().to_string();
        if text.is_empty() {
            return Err(HrmsError::validation("Comment text is required"));
        }
        let author = request
            .author
            .map(|a| a.trim().to_string())
            .filter(|a| !a.is_empty())
            .unwrap_or_else(|| ANONYMOUS_AUTHOR.to_string());

        let exists: Option<String> = sqlx::query_scalar("SELECT id FROM tasks WHERE id = ?")
            .bind(task_id)
            .fetch_optional(&self.pool)
            .await?;
        if exists.is_none() {
            return Err(HrmsError::not_found("Task not found"));
        }

        let id = Uuid::new_v4().to_string();
        let now = now_timestamp();
        sqlx::query(
            "INSERT INTO task_comments (id, task_id, body, author, created_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(task_id)
        .bind(&text)
        .bind(&author)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        tracing::debug!("💬 Comment {} on task {} by {}", id, task_id, author);

        Ok(TaskComment {
            id,
            text,
            author,
            timestamp: parse_timestamp(&now)?,
        })
    }

    /// Task counts per status, optionally for one assignee
    pub async fn summary(&self, assignee: Option<&str>) -> HrmsResult<TaskSummary> {
        let rows = match assignee {
            Some(assignee) => {
                sqlx::query("SELECT status, COUNT(*) AS n FROM tasks WHERE assignee = ? GROUP BY status")
                    .bind(assignee)
                    .fetch_all(&self.pool)
                    .await?
            }
            None => {
                sqlx::query("SELECT status, COUNT(*) AS n FROM tasks GROUP BY status")
                    .fetch_all(&self.pool)
                    .await?
            }
        };

        let mut summary = TaskSummary::default();
        for row in rows {
            let status: String = row.get("status");
            let count: i64 = row.get("n");
            match parse_stored::<TaskStatus>(&status)? {
                TaskStatus::ToDo => summary.todo += count,
                TaskStatus::InProgress => summary.in_progress += count,
                TaskStatus::Done => summary.done += count,
            }
            summary.total += count;
        }
        Ok(summary)
    }
}

async fn load_task(conn: &mut SqliteConnection, id: &str) -> HrmsResult<Option<Task>> {
    let row = sqlx::query(&format!("SELECT {} FROM tasks WHERE id = ?", TASK_COLUMNS))
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

    let Some(row) = row else {
        return Ok(None);
    };
    let mut tasks = vec![task_from_row(&row)?];
    attach_comments(conn, &mut tasks).await?;
    Ok(tasks.pop())
}

/// Load comments for every task in one query, oldest first
async fn attach_comments(conn: &mut SqliteConnection, tasks: &mut [Task]) -> HrmsResult<()> {
    if tasks.is_empty() {
        return Ok(());
    }

    let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new(
        "SELECT id, task_id, body, author, created_at FROM task_comments WHERE task_id IN (",
    );
    let mut ids = builder.separated(", ");
    for task in tasks.iter() {
        ids.push_bind(task.id.clone());
    }
    builder.push(") ORDER BY created_at, id");

    let rows = builder.build().fetch_all(&mut *conn).await?;

    let mut by_task: HashMap<String, Vec<TaskComment>> = HashMap::new();
    for row in &rows {
        let created_at: String = row.get("created_at");
        by_task.entry(row.get("task_id")).or_default().push(TaskComment {
            id: row.get("id"),
            text: row.get("body"),
            author: row.get("author"),
            timestamp: parse_timestamp(&created_at)?,
        });
    }

    for task in tasks.iter_mut() {
        task.comments = by_task.remove(&task.id).unwrap_or_default();
    }
    Ok(())
}

fn task_from_row(row: &SqliteRow) -> HrmsResult<Task> {
    let status: String = row.get("status");
    let task_type: String = row.get("task_type");
    let priority: String = row.get("priority");
    let created_at: String = row.get("created_at");
    let updated_at: String = row.get("updated_at");

    Ok(Task {
        id: row.get("id"),
        title: row.get("title"),
        description: row.get("description"),
        status: parse_stored(&status)?,
        task_type: parse_stored(&task_type)?,
        priority: parse_stored(&priority)?,
        assignee: row.get("assignee"),
        reporter: row.get("reporter"),
        project_id: row.get("project_id"),
        due_date: parse_optional_date(row.get("due_date"))?,
        estimate: row.get("estimate"),
        created_at: parse_timestamp(&created_at)?,
        updated_at: parse_timestamp(&updated_at)?,
        comments: Vec::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_pool;
    use crate::task::types::{SortDirection, TaskPriority, TaskSortField, TaskType};
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn request(title: &str, task_type: &str, priority: &str) -> CreateTaskRequest {
        CreateTaskRequest {
            title: title.to_string(),
            task_type: Some(task_type.to_string()),
            priority: Some(priority.to_string()),
            assignee: Some("Alex Johnson".to_string()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn ids_increment_per_type() {
        let (_dir, pool) = test_pool().await;
        let storage = TaskStorage::new(pool);

        let a = storage.create_task(request("a", "Task", "Low")).await.unwrap();
        let b = storage.create_task(request("b", "Bug", "Low")).await.unwrap();
        let c = storage.create_task(request("c", "Task", "Low")).await.unwrap();
        let d = storage.create_task(request("d", "Story", "Low")).await.unwrap();

        assert_eq!(a.id, "TASK-001");
        assert_eq!(b.id, "BUG-001");
        assert_eq!(c.id, "TASK-002");
        assert_eq!(d.id, "STOR-001");
        assert_eq!(c.task_type, TaskType::Task);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_creates_get_distinct_ids() {
        let (_dir, pool) = test_pool().await;
        let storage = TaskStorage::new(pool);

        let handles: Vec<_> = (0..16)
            .map(|i| {
                let storage = storage.clone();
                tokio::spawn(async move {
                    storage
                        .create_task(request(&format!("parallel {}", i), "Task", "Low"))
                        .await
                })
            })
            .collect();

        let mut ids = Vec::new();
        for handle in handles {
            ids.push(handle.await.unwrap().unwrap().id);
        }
        ids.sort();

        let expected: Vec<String> = (1..=16).map(|n| format!("TASK-{:03}", n)).collect();
        assert_eq!(ids, expected);
    }

    #[tokio::test]
    async fn search_folds_non_ascii_case() {
        let (_dir, pool) = test_pool().await;
        let storage = TaskStorage::new(pool);
        storage.create_task(request("Élan review", "Task", "Low")).await.unwrap();
        storage.create_task(request("Plain review", "Task", "Low")).await.unwrap();

        for needle in ["élan", "ÉLAN", "Élan rev"] {
            let hits = storage
                .list_tasks(&TaskQuery {
                    search: Some(needle.to_string()),
                    ..Default::default()
                })
                .await
                .unwrap();
            assert_eq!(hits.len(), 1, "search {:?}", needle);
            assert_eq!(hits[0].title, "Élan review");
        }

        // Wildcard characters match literally
        let none = storage
            .list_tasks(&TaskQuery {
                search: Some("%".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn unknown_project_is_rejected() {
        let (_dir, pool) = test_pool().await;
        let storage = TaskStorage::new(pool);

        let mut req = request("a", "Task", "Low");
        req.project_id = Some("missing".to_string());
        let err = storage.create_task(req).await.unwrap_err();
        assert!(matches!(err, HrmsError::NotFound(_)));
    }

    #[tokio::test]
    async fn list_filters_and_sorts() {
        let (_dir, pool) = test_pool().await;
        let storage = TaskStorage::new(pool);

        let mut login = request("Implement login", "Task", "High");
        login.due_date = NaiveDate::from_ymd_opt(2025, 5, 20);
        storage.create_task(login).await.unwrap();

        let mut sidebar = request("Fix sidebar collapse", "Bug", "Critical");
        sidebar.due_date = NaiveDate::from_ymd_opt(2025, 5, 10);
        sidebar.status = Some("In Progress".to_string());
        storage.create_task(sidebar).await.unwrap();

        let mut profile = request("Profile themes", "Story", "Low");
        profile.due_date = NaiveDate::from_ymd_opt(2025, 5, 15);
        profile.assignee = Some("Emily Chen".to_string());
        storage.create_task(profile).await.unwrap();

        let all = storage.list_tasks(&TaskQuery::default()).await.unwrap();
        let ids: Vec<&str> = all.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["BUG-001", "STOR-001", "TASK-001"]);

        let by_priority = storage
            .list_tasks(&TaskQuery {
                sort: TaskSortField::Priority,
                direction: SortDirection::Desc,
                ..Default::default()
            })
            .await
            .unwrap();
        let priorities: Vec<TaskPriority> = by_priority.iter().map(|t| t.priority).collect();
        assert_eq!(
            priorities,
            vec![TaskPriority::Critical, TaskPriority::High, TaskPriority::Low]
        );

        let search = storage
            .list_tasks(&TaskQuery {
                search: Some("SIDEBAR".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(search.len(), 1);
        assert_eq!(search[0].id, "BUG-001");

        let by_id = storage
            .list_tasks(&TaskQuery {
                search: Some("stor-".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(by_id.len(), 1);

        let in_progress = storage
            .list_tasks(&TaskQuery {
                status: Some(TaskStatus::InProgress),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(in_progress.len(), 1);

        let mine = storage
            .list_tasks(&TaskQuery {
                assignee: Some("Emily Chen".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].title, "Profile themes");
    }

    #[tokio::test]
    async fn update_and_delete() {
        let (_dir, pool) = test_pool().await;
        let storage = TaskStorage::new(pool);
        let created = storage.create_task(request("a", "Task", "Low")).await.unwrap();

        let updated = storage
            .update_task(
                &created.id,
                UpdateTaskRequest {
                    status: Some("Done".to_string()),
                    priority: Some("High".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.status, TaskStatus::Done);
        assert_eq!(updated.priority, TaskPriority::High);
        assert!(updated.updated_at >= created.updated_at);

        let missing = storage
            .update_task("TASK-999", UpdateTaskRequest::default())
            .await
            .unwrap_err();
        assert!(matches!(missing, HrmsError::NotFound(_)));

        assert!(storage.delete_task(&created.id).await.unwrap());
        assert!(!storage.delete_task(&created.id).await.unwrap());
        assert!(storage.get_task(&created.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn comments_are_attached_in_order() {
        let (_dir, pool) = test_pool().await;
        let storage = TaskStorage::new(pool);
        let created = storage.create_task(request("a", "Task", "Low")).await.unwrap();

        storage
            .add_comment(
                &created.id,
                CreateCommentRequest {
                    text: "Backend APIs are ready".to_string(),
                    author: Some("Alex Johnson".to_string()),
                },
            )
            .await
            .unwrap();
        let second = storage
            .add_comment(
                &created.id,
                CreateCommentRequest {
                    text: "Reviewed".to_string(),
                    author: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(second.author, ANONYMOUS_AUTHOR);

        let task = storage.get_task(&created.id).await.unwrap().unwrap();
        let texts: Vec<&str> = task.comments.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(texts, vec!["Backend APIs are ready", "Reviewed"]);

        let blank = storage
            .add_comment(&created.id, CreateCommentRequest::default())
            .await
            .unwrap_err();
        assert!(matches!(blank, HrmsError::Validation(_)));

        let missing = storage
            .add_comment(
                "TASK-999",
                CreateCommentRequest {
                    text: "hello".to_string(),
                    author: None,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(missing, HrmsError::NotFound(_)));
    }

    #[tokio::test]
    async fn summary_counts_by_status() {
        let (_dir, pool) = test_pool().await;
        let storage = TaskStorage::new(pool);

        storage.create_task(request("a", "Task", "Low")).await.unwrap();
        let mut done = request("b", "Bug", "Low");
        done.status = Some("Done".to_string());
        storage.create_task(done).await.unwrap();
        let mut other = request("c", "Task", "Low");
        other.assignee = Some("Emily Chen".to_string());
        storage.create_task(other).await.unwrap();

        assert_eq!(
            storage.summary(None).await.unwrap(),
            TaskSummary { total: 3, todo: 2, in_progress: 0, done: 1 }
        );
        assert_eq!(
            storage.summary(Some("Emily Chen")).await.unwrap(),
            TaskSummary { total: 1, todo: 1, in_progress: 0, done: 0 }
        );
    }
}
