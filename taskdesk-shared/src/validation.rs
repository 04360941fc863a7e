/// Form field validation shared by the credential store and task repository
///
/// Validation failures are collected as [`FieldError`]s so the web layer can
/// re-render a form with one inline message per offending field.
///
/// # Example
///
/// ```
/// use taskdesk_shared::validation::validate_username;
///
/// assert!(validate_username("alice_01").is_ok());
/// assert!(validate_username("al").is_err());
/// assert!(validate_username("alice!").is_err());
/// ```

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use validator::{ValidationError, ValidationErrors};

/// Minimum username length in characters
pub const USERNAME_MIN_LEN: usize = 3;

/// Maximum username length in characters
pub const USERNAME_MAX_LEN: usize = 20;

/// A single failed field with a human-readable message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// Form field name (e.g. "username", "title")
    pub field: String,

    /// Message shown next to the field
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Flattens `validator` output into field errors
///
/// Fields are sorted by name so messages render in a stable order.
pub fn field_errors(errors: &ValidationErrors) -> Vec<FieldError> {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by(|a, b| a.0.cmp(&b.0));

    fields
        .into_iter()
        .flat_map(|(field, errors)| {
            errors.iter().map(move |error| FieldError {
                field: field.to_string(),
                message: error
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| "Invalid value".to_string()),
            })
        })
        .collect()
}

/// Validates a username
///
/// Rules: 3 to 20 characters, ASCII letters, digits and underscores only.
pub fn validate_username(username: &str) -> Result<(), String> {
    let length = username.chars().count();

    if length == 0 {
        return Err("Username is required.".to_string());
    }

    if length < USERNAME_MIN_LEN {
        return Err(format!(
            "Username must be at least {} characters long.",
            USERNAME_MIN_LEN
        ));
    }

    if length > USERNAME_MAX_LEN {
        return Err(format!(
            "Username must be at most {} characters long.",
            USERNAME_MAX_LEN
        ));
    }

    if !username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_')
    {
        return Err("Username can only contain letters, numbers, and underscores.".to_string());
    }

    Ok(())
}

/// `validator` adapter around [`validate_username`]
pub fn username_rule(username: &str) -> Result<(), ValidationError> {
    validate_username(username).map_err(|message| rule_error("username", message))
}

/// Builds a `validator` error carrying our own message
pub(crate) fn rule_error(code: &'static str, message: String) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(Cow::Owned(message));
    error
}
