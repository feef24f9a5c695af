//! Shared primitives for all Rust crates in Tripwire.

#![forbid(unsafe_code)]

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type used across Tripwire crates.
pub type AppResult<T> = Result<T, AppError>;

/// A validated non-empty UTF-8 string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
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

/// Error taxonomy shared by every pipeline step.
#[derive(Debug, Error)]
pub enum AppError {
    /// Invalid input or configuration.
    #[error("validation error: {0}")]
    Validation(String),

    /// Reference time did not match the strict timestamp format.
    #[error("invalid time format: {0}")]
    InvalidTimeFormat(String),

    /// Log search produced no entries.
    #[error("empty result set: {0}")]
    EmptyResultSet(String),

    /// Log entry is not a structured object carrying an event id.
    #[error("malformed log entry: {0}")]
    MalformedLogEntry(String),

    /// No audit record exists for the requested event.
    #[error("event not found: {0}")]
    EventNotFound(String),

    /// Issue tracker rejected or failed the creation request.
    #[error("ticket creation failed: {0}")]
    TicketCreationFailed(String),

    /// Audit store, secret store or log search backend failed a call.
    #[error("store error: {0}")]
    Store(String),

    /// Internal unexpected error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Returns the stable taxonomy name reported to the orchestrator.
    #[must_use]
    pub fn error_type(&self) -> &'static str {
        match self {
            Self::Validation(_) => "Validation",
            Self::InvalidTimeFormat(_) => "InvalidTimeFormat",
            Self::EmptyResultSet(_) => "EmptyResultSet",
            Self::MalformedLogEntry(_) => "MalformedLogEntry",
            Self::EventNotFound(_) => "EventNotFound",
            Self::TicketCreationFailed(_) => "TicketCreationFailed",
            Self::Store(_) => "StoreError",
            Self::Internal(_) => "InternalError",
        }
    }
}
