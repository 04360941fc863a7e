/// Authentication utilities
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing and password policy
/// - [`credentials`]: Registration and login against the user table
/// - [`session`]: Signed session tokens and the request's session state
/// - [`csrf`]: Form tokens bound to a per-browser nonce
///
/// # Security Features
///
/// - **Password Hashing**: Argon2id, 64 MB memory, 3 iterations by default
/// - **Sessions**: HS256-signed tokens with a fixed lifetime
/// - **Constant-time Comparison**: password and CSRF checks
/// - **Uniform Login Failures**: unknown users and wrong passwords look alike
///
/// # Example
///
/// ```no_run
/// use taskdesk_shared::auth::password::{hash_password, verify_password};
/// use taskdesk_shared::auth::session::{create_session_token, SessionClaims};
/// use chrono::Duration;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let hash = hash_password("Passw0rd")?;
/// assert!(verify_password("Passw0rd", &hash)?);
///
/// let claims = SessionClaims::new(1, "alice", Duration::hours(24));
/// let token = create_session_token(&claims, "a-session-secret-of-at-least-32-bytes")?;
/// # Ok(())
/// # }
/// ```

pub mod credentials;
pub mod csrf;
pub mod password;
pub mod session;
