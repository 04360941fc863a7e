/// One-shot messages carried across a redirect
///
/// A handler that redirects attaches a [`FlashMessage`] as a short-lived
/// cookie. The next request sees it through the [`Flash`] extension, and the
/// first non-redirect response clears the cookie so the message is shown once.

use axum::{
    extract::{Request, State},
    http::HeaderValue,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use chrono::Duration;

use crate::app::AppState;
use crate::cookies::{self, FLASH_COOKIE};

/// How long an unread flash survives
const FLASH_MAX_AGE_SECONDS: i64 = 300;

/// Message severity, used as a CSS class
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlashLevel {
    Success,
    Error,
}

impl FlashLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            FlashLevel::Success => "success",
            FlashLevel::Error => "error",
        }
    }

    fn parse(value: &str) -> Option<Self> {
        match value {
            "success" => Some(FlashLevel::Success),
            "error" => Some(FlashLevel::Error),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlashMessage {
    pub level: FlashLevel,
    pub message: String,
}

impl FlashMessage {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: FlashLevel::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: FlashLevel::Error,
            message: message.into(),
        }
    }

    /// Hex keeps arbitrary message text cookie-safe
    fn encode(&self) -> String {
        hex::encode(format!("{}:{}", self.level.as_str(), self.message))
    }

    fn decode(value: &str) -> Option<Self> {
        let bytes = hex::decode(value).ok()?;
        let text = String::from_utf8(bytes).ok()?;
        let (level, message) = text.split_once(':')?;

        Some(Self {
            level: FlashLevel::parse(level)?,
            message: message.to_string(),
        })
    }

    /// `Set-Cookie` value carrying this message
    pub fn cookie(&self, secure: bool) -> Option<HeaderValue> {
        cookies::build(
            FLASH_COOKIE,
            &self.encode(),
            Some(Duration::seconds(FLASH_MAX_AGE_SECONDS)),
            secure,
        )
        .ok()
    }
}

/// The flash delivered with the current request, if any
#[derive(Debug, Clone, Default)]
pub struct Flash(pub Option<FlashMessage>);

/// Exposes the incoming flash and clears it once a page has been rendered
pub async fn carry_flash(State(state): State<AppState>, mut req: Request, next: Next) -> Response {
    let incoming = cookies::read(req.headers(), FLASH_COOKIE);
    let message = incoming.as_deref().and_then(FlashMessage::decode);

    req.extensions_mut().insert(Flash(message));

    let mut response = next.run(req).await;

    if incoming.is_some()
        && !response.status().is_redirection()
        && !cookies::is_set(&response, FLASH_COOKIE)
    {
        cookies::append(
            &mut response,
            cookies::removal(FLASH_COOKIE, state.secure_cookies()),
        );
    }

    response
}

/// 303 redirect that leaves a message for the next page
pub fn redirect_with(to: &str, message: FlashMessage, secure: bool) -> Response {
    let mut response = Redirect::to(to).into_response();

    if let Some(cookie) = message.cookie(secure) {
        cookies::append(&mut response, cookie);
    }

    response
}
