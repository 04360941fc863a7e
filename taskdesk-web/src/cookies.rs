/// Cookie reading and `Set-Cookie` construction
///
/// Every cookie the server sets is `HttpOnly`, `SameSite=Lax` and scoped to
/// `/`; `Secure` is added in production.

use axum::http::{
    header::{COOKIE, SET_COOKIE},
    HeaderMap, HeaderValue,
};
use axum::response::Response;
use chrono::Duration;

/// Signed session token
pub const SESSION_COOKIE: &str = "taskdesk_session";

/// Per-browser CSRF nonce
pub const CSRF_COOKIE: &str = "taskdesk_csrf";

/// One-shot flash message
pub const FLASH_COOKIE: &str = "taskdesk_flash";

/// Reads a cookie from the request headers
///
/// Looks through every `Cookie` header; the first matching pair wins.
pub fn read(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.trim_matches('"').to_string())
}

/// Builds a `Set-Cookie` value
///
/// `max_age` of `None` makes a browser-session cookie.
pub fn build(
    name: &str,
    value: &str,
    max_age: Option<Duration>,
    secure: bool,
) -> Result<HeaderValue, axum::http::header::InvalidHeaderValue> {
    let mut cookie = format!("{}={}; Path=/; HttpOnly; SameSite=Lax", name, value);

    if let Some(max_age) = max_age {
        cookie.push_str(&format!("; Max-Age={}", max_age.num_seconds().max(0)));
    }

    if secure {
        cookie.push_str("; Secure");
    }

    HeaderValue::from_str(&cookie)
}

/// Builds a `Set-Cookie` value that deletes the cookie
pub fn removal(name: &str, secure: bool) -> HeaderValue {
    let mut cookie = format!("{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0", name);
    if secure {
        cookie.push_str("; Secure");
    }

    // Names are our own constants, always valid header text
    HeaderValue::from_str(&cookie).unwrap_or_else(|_| HeaderValue::from_static(""))
}

/// Appends a `Set-Cookie` header without replacing earlier ones
pub fn append(response: &mut Response, cookie: HeaderValue) {
    response.headers_mut().append(SET_COOKIE, cookie);
}

/// Whether the response already sets (or clears) the named cookie
pub fn is_set(response: &Response, name: &str) -> bool {
    let prefix = format!("{}=", name);
    response
        .headers()
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .any(|value| value.starts_with(&prefix))
}
