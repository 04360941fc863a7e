/// Route handlers
///
/// Handlers are organized by area:
///
/// - `pages`: Landing page, dashboard and the 404 fallback
/// - `auth`: Registration, login and logout
/// - `tasks`: Task create, edit, toggle and delete
/// - `health`: Health check endpoint
/// - `assets`: Embedded script and stylesheet

pub mod assets;
pub mod auth;
pub mod health;
pub mod pages;
pub mod tasks;
