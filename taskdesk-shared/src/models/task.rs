/// Task model and repository operations
///
/// Every query is scoped by the owning user: a task that exists but belongs to
/// someone else is indistinguishable from one that does not exist, and both
/// surface as [`TaskError::NotFound`].
///
/// # Lifecycle
///
/// ```text
/// create ──> incomplete <──toggle──> completed
///                 │  edit                │  edit
///                 └──────── delete ──────┘──> (gone, irreversible)
/// ```
///
/// # Schema
///
/// ```sql
/// CREATE TABLE tasks (
///     id INTEGER PRIMARY KEY AUTOINCREMENT,
///     user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     title TEXT NOT NULL,
///     description TEXT,
///     completed INTEGER NOT NULL DEFAULT 0,
///     created_at INTEGER NOT NULL,  -- microseconds since epoch
///     updated_at INTEGER NOT NULL
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use taskdesk_shared::models::task::{Task, TaskInput, TaskQuery};
/// use sqlx::SqlitePool;
///
/// # async fn example(pool: SqlitePool, owner_id: i64) -> Result<(), Box<dyn std::error::Error>> {
/// let mut tx = pool.begin().await?;
///
/// let task = Task::create(&mut tx, owner_id, TaskInput::new("Buy milk", "")).await?;
/// Task::toggle(&mut tx, owner_id, task.id).await?;
///
/// let open = Task::list(&mut tx, owner_id, &TaskQuery::parse(Some("incomplete"), None)).await?;
/// assert!(open.is_empty());
///
/// tx.commit().await?;
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{QueryBuilder, Sqlite, SqliteConnection};
use validator::{Validate, ValidationError};

use super::timestamp;
use crate::validation::{field_errors, rule_error, FieldError};

/// Minimum title length in characters (after trimming)
pub const TITLE_MIN_LEN: usize = 3;

/// Maximum title length in characters (after trimming)
pub const TITLE_MAX_LEN: usize = 200;

/// Maximum description length in characters (after trimming)
pub const DESCRIPTION_MAX_LEN: usize = 200;

/// Error type for task repository operations
#[derive(Debug, thiserror::Error)]
pub enum TaskError {
    /// Submitted fields failed validation
    #[error("Task validation failed: {} errors", .0.len())]
    Validation(Vec<FieldError>),

    /// Task does not exist or is owned by another user
    #[error("Task not found")]
    NotFound,

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// A to-do item owned by one user
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Task {
    /// Unique task ID, never reused
    pub id: i64,

    /// Owning user
    pub user_id: i64,

    /// Short title (3 to 200 characters)
    pub title: String,

    /// Optional longer text (up to 200 characters)
    pub description: Option<String>,

    /// Whether the task has been marked done
    pub completed: bool,

    /// When the task was created
    pub created_at: DateTime<Utc>,

    /// When the task was last edited or toggled
    pub updated_at: DateTime<Utc>,
}

/// Stored form of a task
#[derive(Debug, sqlx::FromRow)]
struct TaskRow {
    id: i64,
    user_id: i64,
    title: String,
    description: Option<String>,
    completed: bool,
    created_at: i64,
    updated_at: i64,
}

impl TryFrom<TaskRow> for Task {
    type Error = sqlx::Error;

    fn try_from(row: TaskRow) -> Result<Self, Self::Error> {
        Ok(Task {
            id: row.id,
            user_id: row.user_id,
            title: row.title,
            description: row.description,
            completed: row.completed,
            created_at: timestamp::decode_micros("tasks.created_at", row.created_at)?,
            updated_at: timestamp::decode_micros("tasks.updated_at", row.updated_at)?,
        })
    }
}

const TASK_COLUMNS: &str = "id, user_id, title, description, completed, created_at, updated_at";

/// Title and description as submitted by a form
///
/// Construction trims both fields; an empty description becomes `None`.
#[derive(Debug, Clone, PartialEq, Eq, Validate)]
pub struct TaskInput {
    #[validate(custom(function = "title_rule"))]
    pub title: String,

    #[validate(length(
        max = 200,
        message = "Task description must be at most 200 characters."
    ))]
    pub description: Option<String>,
}

fn title_rule(title: &str) -> Result<(), ValidationError> {
    let length = title.chars().count();

    if length == 0 {
        return Err(rule_error("required", "Task title is required.".to_string()));
    }

    if !(TITLE_MIN_LEN..=TITLE_MAX_LEN).contains(&length) {
        return Err(rule_error(
            "length",
            format!(
                "Task title must be between {} and {} characters.",
                TITLE_MIN_LEN, TITLE_MAX_LEN
            ),
        ));
    }

    Ok(())
}

impl TaskInput {
    pub fn new(title: &str, description: &str) -> Self {
        let description = description.trim();

        Self {
            title: title.trim().to_string(),
            description: (!description.is_empty()).then(|| description.to_string()),
        }
    }

    /// Checks field constraints, returning one message per failing field
    pub fn check(&self) -> Result<(), TaskError> {
        self.validate()
            .map_err(|e| TaskError::Validation(field_errors(&e)))
    }
}

/// Completion filter for the task list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskFilter {
    /// Every task
    #[default]
    All,

    /// Only tasks not yet completed
    Incomplete,

    /// Only completed tasks
    Completed,
}

impl TaskFilter {
    /// Parses a query-string value; anything unrecognised means `All`
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "incomplete" => TaskFilter::Incomplete,
            "completed" => TaskFilter::Completed,
            _ => TaskFilter::All,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskFilter::All => "all",
            TaskFilter::Incomplete => "incomplete",
            TaskFilter::Completed => "completed",
        }
    }
}

/// Filter and search term for listing tasks
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskQuery {
    pub filter: TaskFilter,

    /// Case-insensitive title substring; `None` when blank
    pub search: Option<String>,
}

impl TaskQuery {
    pub fn parse(filter: Option<&str>, search: Option<&str>) -> Self {
        let search = search.map(str::trim).filter(|s| !s.is_empty());

        Self {
            filter: filter.map(TaskFilter::parse).unwrap_or_default(),
            search: search.map(str::to_string),
        }
    }
}

/// Per-user task counts shown on the dashboard
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TaskStats {
    pub total: i64,
    pub completed: i64,
    pub incomplete: i64,
}

/// LIKE pattern matching `term` literally anywhere in a lowercased title
///
/// SQLite's `LOWER` folds ASCII only, so the term is folded the same way.
fn contains_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c.to_ascii_lowercase());
    }
    pattern.push('%');
    pattern
}

impl Task {
    /// Creates a task owned by `owner_id`
    ///
    /// New tasks start incomplete with `updated_at == created_at`.
    ///
    /// # Errors
    ///
    /// - `TaskError::Validation` if the title or description is out of bounds
    /// - `TaskError::Database` on storage failure (including an unknown owner)
    pub async fn create(
        conn: &mut SqliteConnection,
        owner_id: i64,
        input: TaskInput,
    ) -> Result<Self, TaskError> {
        input.check()?;

        let now = timestamp::to_micros(timestamp::now());

        let row = sqlx::query_as::<_, TaskRow>(&format!(
            r#"
            INSERT INTO tasks (user_id, title, description, completed, created_at, updated_at)
            VALUES (?, ?, ?, 0, ?, ?)
            RETURNING {TASK_COLUMNS}
            "#
        ))
        .bind(owner_id)
        .bind(input.title)
        .bind(input.description)
        .bind(now)
        .bind(now)
        .fetch_one(&mut *conn)
        .await?;

        Ok(Task::try_from(row)?)
    }

    /// Lists the owner's tasks, newest first
    pub async fn list(
        conn: &mut SqliteConnection,
        owner_id: i64,
        query: &TaskQuery,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let mut qb = QueryBuilder::<Sqlite>::new(format!(
            "SELECT {TASK_COLUMNS} FROM tasks WHERE user_id = "
        ));
        qb.push_bind(owner_id);

        match query.filter {
            TaskFilter::All => {}
            TaskFilter::Incomplete => {
                qb.push(" AND completed = 0");
            }
            TaskFilter::Completed => {
                qb.push(" AND completed = 1");
            }
        }

        if let Some(term) = &query.search {
            qb.push(" AND LOWER(title) LIKE ");
            qb.push_bind(contains_pattern(term));
            qb.push(" ESCAPE '\\'");
        }

        qb.push(" ORDER BY created_at DESC, id DESC");

        let rows = qb.build_query_as::<TaskRow>().fetch_all(&mut *conn).await?;

        rows.into_iter().map(Task::try_from).collect()
    }

    /// Counts the owner's tasks by completion state
    ///
    /// With a search term only matching titles are counted. The
    /// completion filter never narrows the counts.
    pub async fn stats(
        conn: &mut SqliteConnection,
        owner_id: i64,
        search: Option<&str>,
    ) -> Result<TaskStats, sqlx::Error> {
        let mut qb = QueryBuilder::<Sqlite>::new(
            "SELECT COUNT(*), SUM(completed) FROM tasks WHERE user_id = ",
        );
        qb.push_bind(owner_id);

        if let Some(term) = search {
            qb.push(" AND LOWER(title) LIKE ");
            qb.push_bind(contains_pattern(term));
            qb.push(" ESCAPE '\\'");
        }

        let (total, completed): (i64, Option<i64>) =
            qb.build_query_as().fetch_one(&mut *conn).await?;

        let completed = completed.unwrap_or(0);

        Ok(TaskStats {
            total,
            completed,
            incomplete: total - completed,
        })
    }

    /// Fetches one task, applying the ownership guard
    ///
    /// # Errors
    ///
    /// `TaskError::NotFound` if the task is missing or owned by someone else.
    pub async fn find_owned(
        conn: &mut SqliteConnection,
        owner_id: i64,
        task_id: i64,
    ) -> Result<Self, TaskError> {
        let row = sqlx::query_as::<_, TaskRow>(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks WHERE id = ? AND user_id = ?"
        ))
        .bind(task_id)
        .bind(owner_id)
        .fetch_optional(&mut *conn)
        .await?;

        match row {
            Some(row) => Ok(Task::try_from(row)?),
            None => Err(TaskError::NotFound),
        }
    }

    /// Replaces title and description
    ///
    /// The ownership guard runs before validation so a foreign task id is
    /// always reported as not found.
    pub async fn update(
        conn: &mut SqliteConnection,
        owner_id: i64,
        task_id: i64,
        input: TaskInput,
    ) -> Result<Self, TaskError> {
        let current = Task::find_owned(conn, owner_id, task_id).await?;
        input.check()?;

        let updated_at = timestamp::next_after(current.updated_at);

        let row = sqlx::query_as::<_, TaskRow>(&format!(
            r#"
            UPDATE tasks
            SET title = ?, description = ?, updated_at = ?
            WHERE id = ? AND user_id = ?
            RETURNING {TASK_COLUMNS}
            "#
        ))
        .bind(input.title)
        .bind(input.description)
        .bind(timestamp::to_micros(updated_at))
        .bind(task_id)
        .bind(owner_id)
        .fetch_optional(&mut *conn)
        .await?;

        match row {
            Some(row) => Ok(Task::try_from(row)?),
            None => Err(TaskError::NotFound),
        }
    }

    /// Flips the completion flag
    pub async fn toggle(
        conn: &mut SqliteConnection,
        owner_id: i64,
        task_id: i64,
    ) -> Result<Self, TaskError> {
        let current = Task::find_owned(conn, owner_id, task_id).await?;
        let updated_at = timestamp::next_after(current.updated_at);

        let row = sqlx::query_as::<_, TaskRow>(&format!(
            r#"
            UPDATE tasks
            SET completed = ?, updated_at = ?
            WHERE id = ? AND user_id = ?
            RETURNING {TASK_COLUMNS}
            "#
        ))
        .bind(!current.completed)
        .bind(timestamp::to_micros(updated_at))
        .bind(task_id)
        .bind(owner_id)
        .fetch_optional(&mut *conn)
        .await?;

        match row {
            Some(row) => Ok(Task::try_from(row)?),
            None => Err(TaskError::NotFound),
        }
    }

    /// Permanently removes a task, returning what was deleted
    ///
    /// Deleting an already deleted task is `TaskError::NotFound`.
    pub async fn delete(
        conn: &mut SqliteConnection,
        owner_id: i64,
        task_id: i64,
    ) -> Result<Self, TaskError> {
        let row = sqlx::query_as::<_, TaskRow>(&format!(
            "DELETE FROM tasks WHERE id = ? AND user_id = ? RETURNING {TASK_COLUMNS}"
        ))
        .bind(task_id)
        .bind(owner_id)
        .fetch_optional(&mut *conn)
        .await?;

        match row {
            Some(row) => Ok(Task::try_from(row)?),
            None => Err(TaskError::NotFound),
        }
    }
}
