/// Error handling for the web server
///
/// Handlers return `Result<T, WebError>`; the error renders as an HTML error
/// page (or, for a missing session, a redirect to the login page). Form
/// validation failures are not errors at this level: handlers re-render the
/// form themselves with inline messages.
///
/// # Example
///
/// ```no_run
/// use taskdesk_web::error::WebResult;
/// use axum::response::Html;
///
/// async fn handler() -> WebResult<Html<String>> {
///     Ok(Html("<p>ok</p>".to_string()))
/// }
/// ```

use axum::{
    extract::{rejection::FormRejection, FromRequest},
    http::StatusCode,
    response::{IntoResponse, Response},
    Form,
};
use taskdesk_shared::auth::{credentials::CredentialError, password::PasswordError, session::SessionError};
use taskdesk_shared::models::task::TaskError;

use crate::flash::{self, FlashMessage};
use crate::views::{pages::ErrorPage, render, Chrome};

/// Web result type alias
pub type WebResult<T> = Result<T, WebError>;

/// Message shown when a protected page is requested without a session
pub const LOGIN_REQUIRED: &str = "Please log in to access this page.";

/// Unified web error type
#[derive(Debug, thiserror::Error)]
pub enum WebError {
    /// No usable session; redirect to the login page (303)
    #[error("Authentication required")]
    Unauthenticated,

    /// Missing or mismatched CSRF token (403)
    #[error("CSRF token missing or invalid")]
    Csrf,

    /// Resource missing or not owned by the caller (404)
    #[error("Not found")]
    NotFound,

    /// Malformed request the handler could not re-render (400)
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error (500); details are logged, never shown
    #[error("Internal error: {0}")]
    Internal(String),
}

impl WebError {
    pub fn status(&self) -> StatusCode {
        match self {
            WebError::Unauthenticated => StatusCode::SEE_OTHER,
            WebError::Csrf => StatusCode::FORBIDDEN,
            WebError::NotFound => StatusCode::NOT_FOUND,
            WebError::BadRequest(_) => StatusCode::BAD_REQUEST,
            WebError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        let status = self.status();

        let page = match self {
            WebError::Unauthenticated => {
                return flash::redirect_with("/login", FlashMessage::error(LOGIN_REQUIRED), false);
            }
            WebError::Csrf => {
                tracing::warn!("Rejected form submission with bad CSRF token");
                ErrorPage::forbidden_csrf()
            }
            WebError::NotFound => ErrorPage::not_found(),
            WebError::BadRequest(msg) => ErrorPage::bad_request(msg),
            WebError::Internal(msg) => {
                // Log internal errors but don't expose details to clients
                tracing::error!("Internal error: {}", msg);
                ErrorPage::internal()
            }
        };

        (status, render(&page, &Chrome::default())).into_response()
    }
}

/// `Form` extractor whose rejection renders the HTML error page
///
/// A body that is not a urlencoded form, or that lacks required fields,
/// answers 400 before any handler or CSRF check runs.
#[derive(Debug, FromRequest)]
#[from_request(via(Form), rejection(WebError))]
pub struct HtmlForm<T>(pub T);

impl From<FormRejection> for WebError {
    fn from(rejection: FormRejection) -> Self {
        tracing::debug!(status = %rejection.status(), "Rejected form body");
        WebError::BadRequest(rejection.body_text())
    }
}

/// Convert sqlx errors to web errors
impl From<sqlx::Error> for WebError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => WebError::NotFound,
            _ => WebError::Internal(format!("Database error: {}", err)),
        }
    }
}

/// Convert task repository errors to web errors
///
/// Validation is normally handled by re-rendering the form before this point.
impl From<TaskError> for WebError {
    fn from(err: TaskError) -> Self {
        match err {
            TaskError::NotFound => WebError::NotFound,
            TaskError::Validation(errors) => WebError::BadRequest(
                errors
                    .into_iter()
                    .map(|e| e.message)
                    .collect::<Vec<_>>()
                    .join(" "),
            ),
            TaskError::Database(e) => e.into(),
        }
    }
}

/// Convert credential errors to web errors
impl From<CredentialError> for WebError {
    fn from(err: CredentialError) -> Self {
        match err {
            CredentialError::Validation(errors) => WebError::BadRequest(
                errors
                    .into_iter()
                    .map(|e| e.message)
                    .collect::<Vec<_>>()
                    .join(" "),
            ),
            CredentialError::InvalidCredentials => WebError::Unauthenticated,
            CredentialError::Password(e) => e.into(),
            CredentialError::Database(e) => e.into(),
        }
    }
}

/// Convert password errors to web errors
impl From<PasswordError> for WebError {
    fn from(err: PasswordError) -> Self {
        WebError::Internal(format!("Password operation failed: {}", err))
    }
}

/// Convert session errors to web errors
impl From<SessionError> for WebError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::CreateError(msg) => WebError::Internal(msg),
            _ => WebError::Unauthenticated,
        }
    }
}

impl From<axum::http::header::InvalidHeaderValue> for WebError {
    fn from(err: axum::http::header::InvalidHeaderValue) -> Self {
        WebError::Internal(format!("Invalid header value: {}", err))
    }
}
