/// Credential store: registration and authentication
///
/// Registration validates the username and password policy, enforces username
/// uniqueness, and stores only an Argon2id hash. Authentication answers every
/// failure with the same [`CredentialError::InvalidCredentials`], and verifies
/// against a dummy hash when the username is unknown so response timing does
/// not reveal which accounts exist. The dummy is hashed with the same cost
/// parameters as real accounts.
///
/// Argon2 is CPU-bound, so hashing and verification run on the blocking pool.
///
/// # Example
///
/// ```no_run
/// use taskdesk_shared::auth::credentials::{authenticate, register, Registration};
/// use taskdesk_shared::auth::password::HashingParams;
/// use sqlx::SqlitePool;
///
/// # async fn example(pool: SqlitePool) -> Result<(), Box<dyn std::error::Error>> {
/// let mut tx = pool.begin().await?;
///
/// let params = HashingParams::default();
/// register(&mut tx, Registration::new("alice", "Passw0rd", "Passw0rd"), &params).await?;
/// let user = authenticate(&mut tx, "alice", "Passw0rd", &params).await?;
///
/// tx.commit().await?;
/// # Ok(())
/// # }
/// ```

use serde::Deserialize;
use sqlx::SqliteConnection;
use std::collections::HashMap;
use std::sync::{Mutex, OnceLock};
use validator::{Validate, ValidationError};

use super::password::{self, HashingParams, PasswordError};
use crate::models::user::{CreateUser, User};
use crate::validation::{field_errors, rule_error, username_rule, FieldError};

/// Message for a taken username
pub const USERNAME_TAKEN: &str = "Username already exists. Please choose a different one.";

/// Message for any login failure
pub const INVALID_CREDENTIALS: &str = "Invalid username or password.";

/// Error type for credential operations
#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    /// Submitted fields failed validation (including a taken username)
    #[error("Credential validation failed: {} errors", .0.len())]
    Validation(Vec<FieldError>),

    /// Unknown username or wrong password; deliberately indistinguishable
    #[error("Invalid username or password")]
    InvalidCredentials,

    /// Hashing or verification failed
    #[error(transparent)]
    Password(#[from] PasswordError),

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl CredentialError {
    fn single(field: &str, message: &str) -> Self {
        CredentialError::Validation(vec![FieldError::new(field, message)])
    }
}

/// Registration form contents
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct Registration {
    #[validate(custom(function = "username_rule"))]
    pub username: String,

    #[validate(custom(function = "password_rule"))]
    pub password: String,

    #[validate(must_match(other = "password", message = "Passwords do not match."))]
    pub confirm_password: String,
}

fn password_rule(password: &str) -> Result<(), ValidationError> {
    password::validate_password_strength(password).map_err(|message| rule_error("password", message))
}

impl Registration {
    pub fn new(username: &str, password: &str, confirm_password: &str) -> Self {
        Self {
            username: username.to_string(),
            password: password.to_string(),
            confirm_password: confirm_password.to_string(),
        }
    }

    /// Trims the username; passwords are taken verbatim
    pub fn normalized(mut self) -> Self {
        self.username = self.username.trim().to_string();
        self
    }
}

/// Registers a new account
///
/// # Errors
///
/// - `CredentialError::Validation` for a malformed or taken username, a
///   password violating the policy, or a confirmation mismatch
/// - `CredentialError::Password` if hashing fails
/// - `CredentialError::Database` on storage failure
pub async fn register(
    conn: &mut SqliteConnection,
    registration: Registration,
    params: &HashingParams,
) -> Result<User, CredentialError> {
    let registration = registration.normalized();

    registration
        .validate()
        .map_err(|e| CredentialError::Validation(field_errors(&e)))?;

    if User::find_by_username(conn, &registration.username).await?.is_some() {
        return Err(CredentialError::single("username", USERNAME_TAKEN));
    }

    let password_hash = hash_blocking(registration.password, *params).await?;

    let created = User::create(
        conn,
        CreateUser {
            username: registration.username,
            password_hash,
        },
    )
    .await;

    match created {
        Ok(user) => {
            tracing::info!(user_id = user.id, username = %user.username, "Registered new user");
            Ok(user)
        }
        // Lost a race with a concurrent registration of the same name
        Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
            Err(CredentialError::single("username", USERNAME_TAKEN))
        }
        Err(e) => Err(e.into()),
    }
}

/// Checks a username and password
///
/// `params` must be the cost accounts are registered with, so the unknown-user
/// path costs the same as a wrong password.
///
/// # Errors
///
/// - `CredentialError::Validation` if either field is blank
/// - `CredentialError::InvalidCredentials` for an unknown user or wrong password
pub async fn authenticate(
    conn: &mut SqliteConnection,
    username: &str,
    password: &str,
    params: &HashingParams,
) -> Result<User, CredentialError> {
    let username = username.trim();

    if username.is_empty() || password.is_empty() {
        return Err(CredentialError::single(
            "form",
            "Username and password are required.",
        ));
    }

    let Some(user) = User::find_by_username(conn, username).await? else {
        if let Some(hash) = dummy_hash(params).await {
            let _ = verify_blocking(password.to_string(), hash).await;
        }
        tracing::warn!(username = %username, "Login attempt for unknown user");
        return Err(CredentialError::InvalidCredentials);
    };

    if !verify_blocking(password.to_string(), user.password_hash.clone()).await? {
        tracing::warn!(user_id = user.id, "Login attempt with wrong password");
        return Err(CredentialError::InvalidCredentials);
    }

    tracing::info!(user_id = user.id, "User authenticated");
    Ok(user)
}

/// Hash verified when the username is unknown, computed once per cost setting
async fn dummy_hash(params: &HashingParams) -> Option<String> {
    static DUMMIES: OnceLock<Mutex<HashMap<HashingParams, String>>> = OnceLock::new();
    let dummies = DUMMIES.get_or_init(|| Mutex::new(HashMap::new()));

    if let Some(hash) = dummies.lock().ok()?.get(params) {
        return Some(hash.clone());
    }

    let hash = hash_blocking("taskdesk-dummy-password".to_string(), *params)
        .await
        .ok()?;
    dummies.lock().ok()?.insert(*params, hash.clone());

    Some(hash)
}

async fn hash_blocking(password: String, params: HashingParams) -> Result<String, PasswordError> {
    tokio::task::spawn_blocking(move || password::hash_password_with(&password, &params))
        .await
        .map_err(|e| PasswordError::HashError(format!("Hashing task failed: {}", e)))?
}

async fn verify_blocking(password: String, hash: String) -> Result<bool, PasswordError> {
    tokio::task::spawn_blocking(move || password::verify_password(&password, &hash))
        .await
        .map_err(|e| PasswordError::VerifyError(format!("Verification task failed: {}", e)))?
}
