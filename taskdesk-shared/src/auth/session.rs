/// Signed session tokens
///
/// A session is a JWT signed with HS256 using the server's session secret and
/// carried in an HttpOnly cookie. Holding a valid, unexpired token is what
/// makes a browser `Authenticated`; anything else is `Anonymous`.
///
/// ```text
///              authenticate ok
///  Anonymous ───────────────────> Authenticated
///      ^                               │
///      └──── logout / expiry / bad ────┘
///            signature / user gone
/// ```
///
/// # Example
///
/// ```
/// use taskdesk_shared::auth::session::{create_session_token, SessionClaims, SessionState};
/// use chrono::Duration;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let secret = "a-session-secret-of-at-least-32-bytes";
/// let claims = SessionClaims::new(42, "alice", Duration::hours(24));
/// let token = create_session_token(&claims, secret)?;
///
/// let state = SessionState::from_token(Some(&token), secret);
/// assert_eq!(state.user().map(|u| u.id), Some(42));
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Issuer claim stamped on every session token
pub const SESSION_ISSUER: &str = "taskdesk";

/// Error type for session token operations
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// Failed to create token
    #[error("Failed to create session token: {0}")]
    CreateError(String),

    /// Signature, format or claim check failed
    #[error("Invalid session token: {0}")]
    InvalidToken(String),

    /// Token has expired
    #[error("Session has expired")]
    Expired,

    /// Token was issued by something else
    #[error("Invalid issuer: expected {expected}")]
    InvalidIssuer { expected: String },
}

/// Session token claims
///
/// # Standard Claims
///
/// - `sub`: user ID (decimal string)
/// - `iss`: always "taskdesk"
/// - `iat`, `nbf`, `exp`: Unix timestamps
///
/// # Custom Claims
///
/// - `username`: display name, so pages render without a lookup
/// - `sid`: random session ID, also the key for CSRF tokens
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    pub sub: String,
    pub iss: String,
    pub iat: i64,
    pub exp: i64,
    pub nbf: i64,
    pub username: String,
    pub sid: Uuid,
}

impl SessionClaims {
    /// Creates claims for a freshly authenticated user
    pub fn new(user_id: i64, username: &str, ttl: Duration) -> Self {
        let now = Utc::now();

        Self {
            sub: user_id.to_string(),
            iss: SESSION_ISSUER.to_string(),
            iat: now.timestamp(),
            exp: now
                .checked_add_signed(ttl)
                .unwrap_or(DateTime::<Utc>::MAX_UTC)
                .timestamp(),
            nbf: now.timestamp(),
            username: username.to_string(),
            sid: Uuid::new_v4(),
        }
    }

    /// User ID carried in `sub`
    pub fn user_id(&self) -> Result<i64, SessionError> {
        self.sub
            .parse()
            .map_err(|_| SessionError::InvalidToken("Subject is not a user id".to_string()))
    }
}

/// Signs claims into a session token
pub fn create_session_token(claims: &SessionClaims, secret: &str) -> Result<String, SessionError> {
    let header = Header::new(Algorithm::HS256);
    let key = EncodingKey::from_secret(secret.as_bytes());

    encode(&header, claims, &key)
        .map_err(|e| SessionError::CreateError(format!("Token encoding failed: {}", e)))
}

/// Validates a session token and extracts its claims
///
/// Verifies the signature, expiry (no leeway), not-before and issuer.
pub fn validate_session_token(token: &str, secret: &str) -> Result<SessionClaims, SessionError> {
    let key = DecodingKey::from_secret(secret.as_bytes());

    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[SESSION_ISSUER]);
    validation.validate_exp = true;
    validation.validate_nbf = true;
    validation.leeway = 0;

    let token_data = decode::<SessionClaims>(token, &key, &validation).map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => SessionError::Expired,
        jsonwebtoken::errors::ErrorKind::InvalidIssuer => SessionError::InvalidIssuer {
            expected: SESSION_ISSUER.to_string(),
        },
        _ => SessionError::InvalidToken(format!("Token validation failed: {}", e)),
    })?;

    let claims = token_data.claims;
    claims.user_id()?;

    Ok(claims)
}

/// The authenticated principal attached to a request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    pub id: i64,
    pub username: String,
    pub session_id: Uuid,
}

impl TryFrom<SessionClaims> for CurrentUser {
    type Error = SessionError;

    fn try_from(claims: SessionClaims) -> Result<Self, Self::Error> {
        Ok(Self {
            id: claims.user_id()?,
            username: claims.username,
            session_id: claims.sid,
        })
    }
}

/// Whether a request carries a usable session
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Anonymous,
    Authenticated(CurrentUser),
}

impl SessionState {
    /// Resolves the state from an optional cookie value
    ///
    /// Missing, malformed, forged and expired tokens all yield `Anonymous`.
    pub fn from_token(token: Option<&str>, secret: &str) -> Self {
        let Some(token) = token.filter(|t| !t.is_empty()) else {
            return SessionState::Anonymous;
        };

        match validate_session_token(token, secret).and_then(CurrentUser::try_from) {
            Ok(user) => SessionState::Authenticated(user),
            Err(e) => {
                tracing::debug!(error = %e, "Ignoring unusable session token");
                SessionState::Anonymous
            }
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, SessionState::Authenticated(_))
    }

    pub fn user(&self) -> Option<&CurrentUser> {
        match self {
            SessionState::Authenticated(user) => Some(user),
            SessionState::Anonymous => None,
        }
    }
}
