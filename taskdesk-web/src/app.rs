/// Application state and router builder
///
/// This module defines the shared application state and provides
/// a function to build the Axum router with all routes and middleware.
///
/// # Example
///
/// ```no_run
/// use taskdesk_web::{app::AppState, config::Config};
/// use taskdesk_shared::db::pool::{create_pool, DatabaseConfig};
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = create_pool(DatabaseConfig {
///     url: config.database.url.clone(),
///     ..Default::default()
/// })
/// .await?;
/// let state = AppState::new(pool, config);
/// let app = taskdesk_web::app::build_router(state);
/// # Ok(())
/// # }
/// ```

use crate::{
    config::Config,
    flash::carry_flash,
    middleware::{
        csrf::ensure_csrf_nonce,
        security::SecurityHeadersLayer,
        session::{require_session, resolve_session},
    },
};
use axum::{
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use sqlx::SqlitePool;
use std::sync::Arc;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

/// Shared application state
///
/// This is cloned for each request handler via Axum's `State` extractor.
/// Uses Arc internally for cheap cloning.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,

    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Creates new application state
    pub fn new(db: SqlitePool, config: Config) -> Self {
        Self {
            db,
            config: Arc::new(config),
        }
    }

    /// Key for session tokens and CSRF tokens
    pub fn session_secret(&self) -> &str {
        &self.config.session.secret
    }

    /// Whether cookies must carry the `Secure` attribute
    pub fn secure_cookies(&self) -> bool {
        self.config.server.production
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /
/// ├── GET  /                     # Landing page (public)
/// ├── GET  /register, POST       # Registration (public)
/// ├── GET  /login, POST          # Login (public)
/// ├── GET  /health               # Health check (public, JSON)
/// ├── GET  /static/app.{js,css}  # Embedded assets
/// └── session required:
///     ├── GET  /logout
///     ├── GET  /dashboard        # ?filter=&search=
///     ├── POST /tasks
///     ├── GET  /tasks/:id/edit, POST
///     ├── POST /tasks/:id/toggle
///     └── POST /tasks/:id/delete
/// ```
///
/// # Middleware Stack
///
/// Outermost first:
/// 1. Security headers
/// 2. Logging (tower-http TraceLayer)
/// 3. Session resolution (cookie to `SessionState`)
/// 4. Flash delivery
/// 5. CSRF nonce
/// 6. Session requirement (protected routes only)
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    let public_routes = Router::new()
        .route("/", get(routes::pages::index))
        .route(
            "/register",
            get(routes::auth::register_form).post(routes::auth::register),
        )
        .route(
            "/login",
            get(routes::auth::login_form).post(routes::auth::login),
        )
        .route("/health", get(routes::health::health_check))
        .route("/static/app.js", get(routes::assets::script))
        .route("/static/app.css", get(routes::assets::stylesheet));

    let protected_routes = Router::new()
        .route("/logout", get(routes::auth::logout))
        .route("/dashboard", get(routes::pages::dashboard))
        .route("/tasks", post(routes::tasks::create))
        .route(
            "/tasks/:id/edit",
            get(routes::tasks::edit_form).post(routes::tasks::update),
        )
        .route("/tasks/:id/toggle", post(routes::tasks::toggle))
        .route("/tasks/:id/delete", post(routes::tasks::delete))
        .route_layer(from_fn_with_state(state.clone(), require_session));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .fallback(routes::pages::not_found)
        .layer(from_fn_with_state(state.clone(), ensure_csrf_nonce))
        .layer(from_fn_with_state(state.clone(), carry_flash))
        .layer(from_fn_with_state(state.clone(), resolve_session))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(SecurityHeadersLayer::new(state.config.server.production))
        .with_state(state)
}
