/// Registration, login and logout
///
/// # Endpoints
///
/// - `GET /register`, `POST /register` - Create an account, then log in
/// - `GET /login`, `POST /login` - Start a session
/// - `GET /logout` - End the session
///
/// Signed-in users who open the register or login pages are sent to their
/// dashboard instead.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    Extension,
};
use serde::Deserialize;
use taskdesk_shared::auth::{
    credentials::{self, CredentialError, Registration, INVALID_CREDENTIALS},
    session::{create_session_token, CurrentUser, SessionClaims, SessionState},
};
use taskdesk_shared::validation::FieldError;

use crate::{
    app::AppState,
    cookies::{self, SESSION_COOKIE},
    error::{HtmlForm, WebResult},
    flash::{self, Flash, FlashMessage},
    middleware::csrf::CsrfGuard,
    views::{
        pages::{LoginPage, RegisterPage},
        render, Chrome,
    },
};

/// Register form fields
#[derive(Debug, Default, Deserialize)]
pub struct RegisterForm {
    #[serde(default)]
    pub username: String,

    #[serde(default)]
    pub password: String,

    #[serde(default)]
    pub confirm_password: String,

    #[serde(default)]
    pub csrf_token: String,
}

/// Login form fields
#[derive(Debug, Default, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,

    #[serde(default)]
    pub password: String,

    #[serde(default)]
    pub csrf_token: String,
}

fn to_dashboard() -> Response {
    Redirect::to("/dashboard").into_response()
}

/// `GET /register`
pub async fn register_form(
    Extension(session): Extension<SessionState>,
    Extension(flash): Extension<Flash>,
    Extension(csrf): Extension<CsrfGuard>,
) -> Response {
    if session.is_authenticated() {
        return to_dashboard();
    }

    let page = RegisterPage {
        csrf_token: csrf.token().to_string(),
        username: String::new(),
        errors: Vec::new(),
    };

    render(&page, &Chrome::new(None, flash.0)).into_response()
}

/// `POST /register`
///
/// On success the user is sent to the login page; registration does not
/// start a session by itself.
///
/// # Errors
///
/// - `400 Bad Request`: form re-rendered with field messages
/// - `403 Forbidden`: CSRF token invalid
pub async fn register(
    State(state): State<AppState>,
    Extension(session): Extension<SessionState>,
    Extension(csrf): Extension<CsrfGuard>,
    HtmlForm(form): HtmlForm<RegisterForm>,
) -> WebResult<Response> {
    csrf.verify(&form.csrf_token)?;

    if session.is_authenticated() {
        return Ok(to_dashboard());
    }

    let registration = Registration::new(&form.username, &form.password, &form.confirm_password);

    let mut tx = state.db.begin().await?;
    let result = credentials::register(&mut tx, registration, &state.config.hashing).await;

    match result {
        Ok(_) => {
            tx.commit().await?;

            Ok(flash::redirect_with(
                "/login",
                FlashMessage::success("Registration successful! Please log in."),
                state.secure_cookies(),
            ))
        }
        Err(CredentialError::Validation(errors)) => {
            tracing::debug!(errors = errors.len(), "Registration rejected");

            let page = RegisterPage {
                csrf_token: csrf.token().to_string(),
                username: form.username.trim().to_string(),
                errors,
            };

            Ok((StatusCode::BAD_REQUEST, render(&page, &Chrome::default())).into_response())
        }
        Err(e) => Err(e.into()),
    }
}

/// `GET /login`
pub async fn login_form(
    Extension(session): Extension<SessionState>,
    Extension(flash): Extension<Flash>,
    Extension(csrf): Extension<CsrfGuard>,
) -> Response {
    if session.is_authenticated() {
        return to_dashboard();
    }

    let page = LoginPage {
        csrf_token: csrf.token().to_string(),
        username: String::new(),
        errors: Vec::new(),
    };

    render(&page, &Chrome::new(None, flash.0)).into_response()
}

/// `POST /login`
///
/// # Errors
///
/// - `400 Bad Request`: a field was left empty
/// - `401 Unauthorized`: unknown user or wrong password (same message for both)
/// - `403 Forbidden`: CSRF token invalid
pub async fn login(
    State(state): State<AppState>,
    Extension(session): Extension<SessionState>,
    Extension(csrf): Extension<CsrfGuard>,
    HtmlForm(form): HtmlForm<LoginForm>,
) -> WebResult<Response> {
    csrf.verify(&form.csrf_token)?;

    if session.is_authenticated() {
        return Ok(to_dashboard());
    }

    let mut tx = state.db.begin().await?;
    let result = credentials::authenticate(
        &mut tx,
        &form.username,
        &form.password,
        &state.config.hashing,
    )
    .await;

    let (status, errors) = match result {
        Ok(user) => {
            tx.commit().await?;

            let secure = state.secure_cookies();
            let ttl = state.config.session.ttl();
            let claims = SessionClaims::new(user.id, &user.username, ttl);
            let token = create_session_token(&claims, state.session_secret())?;

            let mut response = flash::redirect_with(
                "/dashboard",
                FlashMessage::success(format!("Welcome back, {}!", user.username)),
                secure,
            );
            cookies::append(
                &mut response,
                cookies::build(SESSION_COOKIE, &token, Some(ttl), secure)?,
            );

            tracing::info!(user_id = user.id, session_id = %claims.sid, "Session started");
            return Ok(response);
        }
        Err(CredentialError::Validation(errors)) => (StatusCode::BAD_REQUEST, errors),
        Err(CredentialError::InvalidCredentials) => (
            StatusCode::UNAUTHORIZED,
            vec![FieldError::new("form", INVALID_CREDENTIALS)],
        ),
        Err(e) => return Err(e.into()),
    };

    let page = LoginPage {
        csrf_token: csrf.token().to_string(),
        username: form.username.trim().to_string(),
        errors,
    };

    Ok((status, render(&page, &Chrome::default())).into_response())
}

/// `GET /logout`
///
/// Sessions are stateless signed tokens, so logging out clears the cookie.
pub async fn logout(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> Response {
    let secure = state.secure_cookies();

    let mut response = flash::redirect_with(
        "/",
        FlashMessage::success("You have been logged out successfully."),
        secure,
    );
    cookies::append(&mut response, cookies::removal(SESSION_COOKIE, secure));

    tracing::info!(user_id = user.id, session_id = %user.session_id, "Session ended");
    response
}
