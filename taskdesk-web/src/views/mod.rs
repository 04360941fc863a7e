/// Server-side HTML rendering
///
/// Each page is a typed view-model implementing [`Page`]; [`render`] wraps
/// its body in the shared layout (navigation, flash message, assets). Every
/// piece of user-supplied text goes through [`escape`] before it reaches the
/// output.
///
/// Scripts are only ever loaded from `/static/app.js`; the CSP forbids inline
/// script, so pages communicate with it through `data-*` attributes.

pub mod pages;

use axum::response::Html;
use chrono::{DateTime, Utc};

use crate::config::DisplayConfig;
use crate::flash::FlashMessage;

/// A renderable page
pub trait Page {
    /// Text for the `<title>` element
    fn title(&self) -> String;

    /// Inner HTML placed in `<main>`
    fn body(&self) -> String;
}

/// Per-request layout context
#[derive(Debug, Clone, Default)]
pub struct Chrome {
    /// Username of the signed-in user, if any
    pub username: Option<String>,

    /// Flash message to show above the page body
    pub flash: Option<FlashMessage>,
}

impl Chrome {
    pub fn new(username: Option<&str>, flash: Option<FlashMessage>) -> Self {
        Self {
            username: username.map(str::to_string),
            flash,
        }
    }
}

/// Escapes text for use in HTML content and quoted attributes
pub fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Formats a timestamp in the configured display zone
///
/// e.g. `16 Oct 2026, 09:15 PM IST`
pub fn format_time(at: DateTime<Utc>, display: &DisplayConfig) -> String {
    format!(
        "{} {}",
        at.with_timezone(&display.offset).format("%d %b %Y, %I:%M %p"),
        display.label
    )
}

fn navigation(chrome: &Chrome) -> String {
    match &chrome.username {
        Some(username) => format!(
            r#"<nav class="nav"><a class="brand" href="/dashboard">Taskdesk</a><span class="nav-user">Signed in as <strong>{}</strong></span><a href="/dashboard">Dashboard</a><a href="/logout">Log out</a></nav>"#,
            escape(username)
        ),
        None => r#"<nav class="nav"><a class="brand" href="/">Taskdesk</a><a href="/login">Log in</a><a href="/register">Register</a></nav>"#
            .to_string(),
    }
}

fn flash_banner(chrome: &Chrome) -> String {
    match &chrome.flash {
        Some(flash) => format!(
            r#"<div class="flash flash-{}" role="status">{}</div>"#,
            flash.level.as_str(),
            escape(&flash.message)
        ),
        None => String::new(),
    }
}

/// Renders a page inside the shared layout
pub fn render<P: Page>(page: &P, chrome: &Chrome) -> Html<String> {
    Html(format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title} | Taskdesk</title>
<link rel="stylesheet" href="/static/app.css">
<script src="/static/app.js" defer></script>
</head>
<body>
{nav}
<main class="container">
{flash}
{body}
</main>
</body>
</html>
"#,
        title = escape(&page.title()),
        nav = navigation(chrome),
        flash = flash_banner(chrome),
        body = page.body(),
    ))
}

/// Inline messages for one form field
pub(crate) fn field_messages(errors: &[taskdesk_shared::validation::FieldError], field: &str) -> String {
    errors
        .iter()
        .filter(|e| e.field == field)
        .map(|e| format!(r#"<p class="field-error">{}</p>"#, escape(&e.message)))
        .collect()
}

/// Hidden CSRF input included in every POST form
pub(crate) fn csrf_field(token: &str) -> String {
    format!(
        r#"<input type="hidden" name="csrf_token" value="{}">"#,
        escape(token)
    )
}
