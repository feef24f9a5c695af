use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tripwire_core::{AppError, AppResult, NonEmptyString};

use crate::log_entry::LogEntry;

/// Globally unique event identity supplied by the log source.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EventId(NonEmptyString);

impl EventId {
    /// Creates a validated event identifier.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        NonEmptyString::new(value)
            .map(Self)
            .map_err(|_| AppError::Validation("event id must not be empty".to_owned()))
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Display for EventId {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Issue key returned by the ticket tracker.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TicketId(NonEmptyString);

impl TicketId {
    /// Creates a validated ticket identifier.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        NonEmptyString::new(value)
            .map(Self)
            .map_err(|_| AppError::Validation("ticket id must not be empty".to_owned()))
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Display for TicketId {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Logical audit table that partitions stored records.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AuditTableName(String);

impl AuditTableName {
    /// Creates a validated table name.
    ///
    /// Names are limited to ASCII alphanumerics, `_`, `-` and `.` so adapters
    /// can embed them in keys without escaping.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into();
        let trimmed = value.trim();

        if trimmed.is_empty() {
            return Err(AppError::Validation(
                "audit table name must not be empty".to_owned(),
            ));
        }

        if trimmed.len() > 255 {
            return Err(AppError::Validation(
                "audit table name must be at most 255 characters".to_owned(),
            ));
        }

        if !trimmed
            .chars()
            .all(|character| character.is_ascii_alphanumeric() || "_-.".contains(character))
        {
            return Err(AppError::Validation(format!(
                "audit table name '{trimmed}' may only contain letters, digits, '_', '-' and '.'"
            )));
        }

        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the table name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Display for AuditTableName {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Durable record of one distinct event and the ticket opened for it.
#[derive(Debug, Clone, PartialEq)]
pub struct AuditRecord {
    event_id: EventId,
    ticket_id: Option<TicketId>,
    log_record: Map<String, Value>,
    alarm_type: String,
}

impl AuditRecord {
    /// Creates a fresh record for a newly observed log entry.
    #[must_use]
    pub fn unticketed(entry: LogEntry, alarm_type: impl Into<String>) -> Self {
        let (event_id, log_record) = entry.into_parts();
        Self {
            event_id,
            ticket_id: None,
            log_record,
            alarm_type: alarm_type.into(),
        }
    }

    /// Rehydrates a record loaded from storage.
    #[must_use]
    pub fn from_stored(
        event_id: EventId,
        ticket_id: Option<TicketId>,
        log_record: Map<String, Value>,
        alarm_type: String,
    ) -> Self {
        Self {
            event_id,
            ticket_id,
            log_record,
            alarm_type,
        }
    }

    /// Returns the event identity.
    #[must_use]
    pub fn event_id(&self) -> &EventId {
        &self.event_id
    }

    /// Returns the ticket opened for this event, if any.
    #[must_use]
    pub fn ticket_id(&self) -> Option<&TicketId> {
        self.ticket_id.as_ref()
    }

    /// Returns the original structured log entry.
    #[must_use]
    pub fn log_record(&self) -> &Map<String, Value> {
        &self.log_record
    }

    /// Returns the triggering alarm label.
    #[must_use]
    pub fn alarm_type(&self) -> &str {
        self.alarm_type.as_str()
    }
}
