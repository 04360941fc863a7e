//! # Taskdesk Web Server Library
//!
//! HTTP layer of the Taskdesk to-do application: routing, middleware and
//! server-rendered pages on top of `taskdesk-shared`.
//!
//! ## Modules
//!
//! - `app`: Application state and router builder
//! - `config`: Configuration management
//! - `cookies`: Cookie parsing and `Set-Cookie` construction
//! - `error`: Error handling and HTTP response mapping
//! - `flash`: One-shot messages across redirects
//! - `middleware`: Security headers, session and CSRF layers
//! - `routes`: Route handlers
//! - `views`: HTML page rendering

pub mod app;
pub mod config;
pub mod cookies;
pub mod error;
pub mod flash;
pub mod middleware;
pub mod routes;
pub mod views;
