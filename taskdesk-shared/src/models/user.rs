/// User model and database operations
///
/// Users own tasks and authenticate with a username and password. Rows are
/// never updated or deleted by the application once created.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE users (
///     id INTEGER PRIMARY KEY AUTOINCREMENT,
///     username TEXT NOT NULL UNIQUE,
///     password_hash TEXT NOT NULL,
///     created_at INTEGER NOT NULL  -- microseconds since epoch
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use taskdesk_shared::models::user::{User, CreateUser};
/// use sqlx::SqlitePool;
///
/// # async fn example(pool: SqlitePool) -> Result<(), sqlx::Error> {
/// let mut conn = pool.acquire().await?;
///
/// let user = User::create(&mut conn, CreateUser {
///     username: "alice".to_string(),
///     password_hash: "$argon2id$...".to_string(),
/// })
/// .await?;
///
/// let found = User::find_by_username(&mut conn, "alice").await?;
/// assert_eq!(found.map(|u| u.id), Some(user.id));
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::SqliteConnection;

use super::timestamp;

/// User account
///
/// Passwords are stored as Argon2id hashes, never in plaintext.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    /// Unique user ID
    pub id: i64,

    /// Login name (unique, case-sensitive)
    pub username: String,

    /// Argon2id password hash in PHC string format
    #[serde(skip_serializing)]
    pub password_hash: String,

    /// When the account was created
    pub created_at: DateTime<Utc>,
}

/// Stored form of a user
#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: i64,
    username: String,
    password_hash: String,
    created_at: i64,
}

impl TryFrom<UserRow> for User {
    type Error = sqlx::Error;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        Ok(User {
            id: row.id,
            username: row.username,
            password_hash: row.password_hash,
            created_at: timestamp::decode_micros("users.created_at", row.created_at)?,
        })
    }
}

/// Input for creating a new user
#[derive(Debug, Clone)]
pub struct CreateUser {
    /// Already validated username
    pub username: String,

    /// Argon2id password hash (NOT plaintext password!)
    pub password_hash: String,
}

impl User {
    /// Inserts a new user
    ///
    /// # Errors
    ///
    /// Returns a database error if the username is taken (unique constraint
    /// violation) or the connection fails.
    pub async fn create(conn: &mut SqliteConnection, data: CreateUser) -> Result<Self, sqlx::Error> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (username, password_hash, created_at)
            VALUES (?, ?, ?)
            RETURNING id, username, password_hash, created_at
            "#,
        )
        .bind(data.username)
        .bind(data.password_hash)
        .bind(timestamp::to_micros(timestamp::now()))
        .fetch_one(&mut *conn)
        .await?;

        User::try_from(row)
    }

    /// Finds a user by ID
    pub async fn find_by_id(conn: &mut SqliteConnection, id: i64) -> Result<Option<Self>, sqlx::Error> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, username, password_hash, created_at
            FROM users
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

        row.map(User::try_from).transpose()
    }

    /// Finds a user by exact username
    pub async fn find_by_username(
        conn: &mut SqliteConnection,
        username: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, username, password_hash, created_at
            FROM users
            WHERE username = ?
            "#,
        )
        .bind(username)
        .fetch_optional(&mut *conn)
        .await?;

        row.map(User::try_from).transpose()
    }

    /// Counts registered users
    pub async fn count(conn: &mut SqliteConnection) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(&mut *conn)
            .await?;

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{migrations::run_migrations, pool::{create_pool, DatabaseConfig}};

    async fn migrated_pool() -> sqlx::SqlitePool {
        let pool = create_pool(DatabaseConfig::in_memory()).await.unwrap();
        run_migrations(&pool).await.unwrap();
        pool
    }

    #[test]
    fn test_row_with_bad_timestamp_is_rejected() {
        let row = UserRow {
            id: 1,
            username: "alice".to_string(),
            password_hash: "hash".to_string(),
            created_at: i64::MAX,
        };

        assert!(User::try_from(row).is_err());
    }

    #[test]
    fn test_password_hash_is_not_serialized() {
        let user = User {
            id: 7,
            username: "alice".to_string(),
            password_hash: "$argon2id$secret".to_string(),
            created_at: timestamp::now(),
        };

        let json = serde_json::to_string(&user).unwrap();
        assert!(json.contains("\"username\":\"alice\""));
        assert!(!json.contains("argon2id"));
    }

    #[tokio::test]
    async fn test_create_and_find() {
        let pool = migrated_pool().await;
        let mut conn = pool.acquire().await.unwrap();

        let user = User::create(
            &mut conn,
            CreateUser {
                username: "alice".to_string(),
                password_hash: "hash".to_string(),
            },
        )
        .await
        .unwrap();

        assert!(user.id > 0);
        assert_eq!(user.username, "alice");

        let by_id = User::find_by_id(&mut conn, user.id).await.unwrap();
        assert_eq!(by_id, Some(user.clone()));

        let by_name = User::find_by_username(&mut conn, "alice").await.unwrap();
        assert_eq!(by_name, Some(user));

        assert!(User::find_by_username(&mut conn, "Alice").await.unwrap().is_none());
        assert_eq!(User::count(&mut conn).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_username_violates_unique_constraint() {
        let pool = migrated_pool().await;
        let mut conn = pool.acquire().await.unwrap();

        let data = CreateUser {
            username: "bob".to_string(),
            password_hash: "hash".to_string(),
        };

        User::create(&mut conn, data.clone()).await.unwrap();
        let err = User::create(&mut conn, data).await.unwrap_err();

        match err {
            sqlx::Error::Database(db_err) => assert!(db_err.is_unique_violation()),
            other => panic!("expected unique violation, got {:?}", other),
        }
    }
}
