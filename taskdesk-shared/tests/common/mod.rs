/// Shared fixtures for repository integration tests

use sqlx::SqlitePool;
use taskdesk_shared::auth::credentials::{register, Registration};
use taskdesk_shared::auth::password::HashingParams;
use taskdesk_shared::db::migrations::run_migrations;
use taskdesk_shared::db::pool::{create_pool, DatabaseConfig};
use taskdesk_shared::models::user::User;

/// Fresh migrated in-memory database
pub async fn test_pool() -> SqlitePool {
    let pool = create_pool(DatabaseConfig::in_memory())
        .await
        .expect("Failed to create in-memory pool");
    run_migrations(&pool).await.expect("Failed to run migrations");
    pool
}

/// Registers a user with a known-good password
pub async fn create_user(pool: &SqlitePool, username: &str) -> User {
    let mut conn = pool.acquire().await.unwrap();
    register(
        &mut conn,
        Registration::new(username, "Passw0rd", "Passw0rd"),
        &HashingParams::insecure_fast(),
    )
    .await
    .expect("Failed to register test user")
}
