//! Shared primitives for the role migration crates.

#![forbid(unsafe_code)]

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type used across the role migration crates.
pub type AppResult<T> = Result<T, AppError>;

/// A validated non-empty UTF-8 string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NonEmptyString(String);

impl NonEmptyString {
    /// Creates a validated non-empty string.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(AppError::Validation(
                "value must not be empty or whitespace".to_owned(),
            ));
        }

        Ok(Self(value))
    }

    /// Returns the underlying string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl From<NonEmptyString> for String {
    fn from(value: NonEmptyString) -> Self {
        value.0
    }
}

/// Organization identifier used as the partition key for every persisted row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrgId(i64);

impl OrgId {
    /// Creates an organization identifier from its stored value.
    #[must_use]
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    /// Returns the stored value.
    #[must_use]
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl Display for OrgId {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// Common application error categories.
#[derive(Debug, Error)]
pub enum AppError {
    /// Invalid input or configuration.
    #[error("validation error: {0}")]
    Validation(String),

    /// Requested resource does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Write operation conflicts with existing state.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Underlying storage query or statement failed.
    #[error("storage error: {0}")]
    Storage(String),

    /// No unused role UID was found within the retry bound.
    #[error("failed to generate an unused role uid in org {org_id} after {attempts} attempts")]
    UidExhausted {
        /// Organization the UID was scoped to.
        org_id: OrgId,
        /// Number of candidates checked.
        attempts: u8,
    },

    /// An assignment references a role missing from the role index.
    #[error("unknown role '{role_name}' in org {org_id}")]
    UnknownRole {
        /// Organization of the assignment.
        org_id: OrgId,
        /// Offending role name.
        role_name: String,
    },

    /// A managed assignment name carries an identifier that cannot be parsed.
    #[error("malformed managed assignment '{role_name}': {reason}")]
    MalformedAssignment {
        /// Offending role name.
        role_name: String,
        /// Parse failure detail.
        reason: String,
    },

    /// Internal unexpected error.
    #[error("internal error: {0}")]
    Internal(String),
}

#[cfg(test)]
mod tests {
    use super::{AppError, NonEmptyString, OrgId};

    #[test]
    fn non_empty_string_rejects_whitespace() {
        let result = NonEmptyString::new("   ");
        assert!(result.is_err());
    }

    #[test]
    fn org_id_formats_as_integer() {
        assert_eq!(OrgId::new(42).to_string(), "42");
    }

    #[test]
    fn unknown_role_message_names_the_role() {
        let error = AppError::UnknownRole {
            org_id: OrgId::new(3),
            role_name: "managed:users:9:permissions".to_owned(),
        };

        assert_eq!(
            error.to_string(),
            "unknown role 'managed:users:9:permissions' in org 3"
        );
    }
}
