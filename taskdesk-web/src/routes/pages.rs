/// Landing page, dashboard and the not-found fallback

use axum::{
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
    Extension,
};
use serde::Deserialize;
use sqlx::SqliteConnection;
use taskdesk_shared::auth::session::{CurrentUser, SessionState};
use taskdesk_shared::models::task::{Task, TaskQuery};

use crate::{
    app::AppState,
    error::{WebError, WebResult},
    flash::Flash,
    middleware::csrf::CsrfGuard,
    views::{
        pages::{DashboardPage, IndexPage},
        render, Chrome,
    },
};

/// `GET /`
///
/// Signed-in users go straight to their dashboard.
pub async fn index(
    Extension(session): Extension<SessionState>,
    Extension(flash): Extension<Flash>,
) -> Response {
    if session.is_authenticated() {
        return Redirect::to("/dashboard").into_response();
    }

    render(&IndexPage, &Chrome::new(None, flash.0)).into_response()
}

/// Query string of `GET /dashboard`
#[derive(Debug, Default, Deserialize)]
pub struct DashboardParams {
    /// `all`, `incomplete` or `completed`; anything else means `all`
    pub filter: Option<String>,

    /// Case-insensitive title substring
    pub search: Option<String>,
}

/// Loads everything the dashboard shows for one user
pub(crate) async fn load_dashboard(
    conn: &mut SqliteConnection,
    state: &AppState,
    user: &CurrentUser,
    csrf_token: &str,
    query: TaskQuery,
) -> WebResult<DashboardPage> {
    let tasks = Task::list(conn, user.id, &query).await?;
    let stats = Task::stats(conn, user.id, query.search.as_deref()).await?;

    Ok(DashboardPage {
        csrf_token: csrf_token.to_string(),
        username: user.username.clone(),
        tasks,
        stats,
        query,
        draft_title: String::new(),
        draft_description: String::new(),
        errors: Vec::new(),
        display: state.config.display.clone(),
    })
}

/// `GET /dashboard?filter=&search=`
pub async fn dashboard(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Extension(flash): Extension<Flash>,
    Extension(csrf): Extension<CsrfGuard>,
    Query(params): Query<DashboardParams>,
) -> WebResult<Response> {
    let query = TaskQuery::parse(params.filter.as_deref(), params.search.as_deref());

    let mut tx = state.db.begin().await?;
    let page = load_dashboard(&mut tx, &state, &user, csrf.token(), query).await?;
    tx.commit().await?;

    tracing::debug!(user_id = user.id, tasks = page.tasks.len(), "Rendered dashboard");

    Ok(render(&page, &Chrome::new(Some(&user.username), flash.0)).into_response())
}

/// Fallback for unknown paths
pub async fn not_found() -> WebError {
    WebError::NotFound
}
