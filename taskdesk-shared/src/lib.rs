//! # Taskdesk Shared Library
//!
//! Domain logic for the Taskdesk to-do application: persistence, credentials,
//! sessions and the task repository. The web crate is a thin HTTP layer on top
//! of this one.
//!
//! ## Module Organization
//!
//! - `db`: SQLite connection pool and embedded migrations
//! - `models`: Users and tasks with their repository operations
//! - `auth`: Password hashing, credential store, session tokens and CSRF
//! - `validation`: Form field rules and error flattening

pub mod auth;
pub mod db;
pub mod models;
pub mod validation;

/// Current version of the Taskdesk shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
