/// Session middleware
///
/// [`resolve_session`] runs on every request: it turns the session cookie into
/// a [`SessionState`] request extension, downgrading to `Anonymous` (and
/// clearing the cookie) when the token is unusable or its user no longer
/// exists. [`require_session`] guards the protected routes and exposes the
/// [`CurrentUser`] to handlers.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use sqlx::SqlitePool;
use taskdesk_shared::auth::session::{CurrentUser, SessionState};
use taskdesk_shared::models::user::User;

use crate::{
    app::AppState,
    cookies::{self, SESSION_COOKIE},
    error::{WebError, LOGIN_REQUIRED},
    flash::{self, FlashMessage},
};

async fn user_exists(pool: &SqlitePool, user_id: i64) -> Result<bool, sqlx::Error> {
    // Connection goes back to the pool before the handler runs
    let mut conn = pool.acquire().await?;
    Ok(User::find_by_id(&mut conn, user_id).await?.is_some())
}

/// Resolves the session cookie into a `SessionState` extension
pub async fn resolve_session(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Response {
    let token = cookies::read(req.headers(), SESSION_COOKIE);
    let mut session = SessionState::from_token(token.as_deref(), state.session_secret());
    let mut clear_cookie = token.is_some() && !session.is_authenticated();

    if let SessionState::Authenticated(user) = &session {
        match user_exists(&state.db, user.id).await {
            Ok(true) => {}
            Ok(false) => {
                tracing::warn!(user_id = user.id, "Session refers to a missing user");
                session = SessionState::Anonymous;
                clear_cookie = true;
            }
            Err(e) => return WebError::from(e).into_response(),
        }
    }

    req.extensions_mut().insert(session);

    let mut response = next.run(req).await;

    if clear_cookie && !cookies::is_set(&response, SESSION_COOKIE) {
        cookies::append(
            &mut response,
            cookies::removal(SESSION_COOKIE, state.secure_cookies()),
        );
    }

    response
}

/// Redirects anonymous requests to the login page
pub async fn require_session(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Response {
    let user: Option<CurrentUser> = req
        .extensions()
        .get::<SessionState>()
        .and_then(SessionState::user)
        .cloned();

    match user {
        Some(user) => {
            req.extensions_mut().insert(user);
            next.run(req).await
        }
        None => {
            tracing::debug!(path = %req.uri().path(), "Anonymous request to protected route");
            flash::redirect_with(
                "/login",
                FlashMessage::error(LOGIN_REQUIRED),
                state.secure_cookies(),
            )
        }
    }
}
