/// CSRF middleware
///
/// Makes sure every browser holds a nonce cookie and hands handlers a
/// [`CsrfGuard`] that derives the form token and checks submissions.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use taskdesk_shared::auth::csrf;

use crate::{
    app::AppState,
    config::Config,
    cookies::{self, CSRF_COOKIE},
    error::WebError,
};

/// Per-request CSRF state
#[derive(Clone)]
pub struct CsrfGuard {
    nonce: String,
    token: String,
    config: Arc<Config>,
}

impl CsrfGuard {
    fn new(nonce: String, config: Arc<Config>) -> Self {
        let token = csrf::token_for(&config.session.secret, &nonce);
        Self {
            nonce,
            token,
            config,
        }
    }

    /// Token to embed in rendered forms
    pub fn token(&self) -> &str {
        &self.token
    }

    /// Checks a submitted token against this browser's nonce
    pub fn verify(&self, submitted: &str) -> Result<(), WebError> {
        if csrf::verify_token(&self.config.session.secret, &self.nonce, submitted) {
            Ok(())
        } else {
            Err(WebError::Csrf)
        }
    }
}

/// Issues a nonce cookie when missing and inserts the `CsrfGuard`
pub async fn ensure_csrf_nonce(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Response {
    let existing = cookies::read(req.headers(), CSRF_COOKIE).filter(|n| csrf::is_valid_nonce(n));

    let (nonce, fresh) = match existing {
        Some(nonce) => (nonce, false),
        None => (csrf::generate_nonce(), true),
    };

    req.extensions_mut()
        .insert(CsrfGuard::new(nonce.clone(), state.config.clone()));

    let mut response = next.run(req).await;

    if fresh {
        match cookies::build(CSRF_COOKIE, &nonce, None, state.secure_cookies()) {
            Ok(cookie) => cookies::append(&mut response, cookie),
            Err(e) => tracing::error!(error = %e, "Failed to build CSRF cookie"),
        }
    }

    response
}
