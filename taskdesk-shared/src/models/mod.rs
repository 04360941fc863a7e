/// Database models for Taskdesk
///
/// # Models
///
/// - `user`: Accounts, looked up by id or username
/// - `task`: To-do items, always scoped to their owner
/// - `timestamp`: Microsecond timestamps as stored in SQLite
///
/// # Example
///
/// ```no_run
/// use taskdesk_shared::models::task::{Task, TaskInput};
/// use taskdesk_shared::db::pool::{create_pool, DatabaseConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
/// let mut conn = pool.acquire().await?;
///
/// let task = Task::create(&mut conn, 1, TaskInput::new("Buy milk", "")).await?;
/// # Ok(())
/// # }
/// ```

pub mod task;
pub mod timestamp;
pub mod user;
