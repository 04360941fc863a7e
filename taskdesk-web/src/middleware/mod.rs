/// Middleware modules for the web server
///
/// - `security`: Security response headers
/// - `session`: Session resolution and the login requirement
/// - `csrf`: Nonce cookie and form token checks

pub mod csrf;
pub mod security;
pub mod session;
