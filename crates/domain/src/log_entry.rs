use serde_json::{Map, Value};
use tripwire_core::{AppError, AppResult};

use crate::audit::EventId;

/// Field carrying both the event identity and the dedup key.
pub const EVENT_ID_FIELD: &str = "eventID";

/// Decoded structured payload of one matched log line.
#[derive(Debug, Clone, PartialEq)]
pub struct LogEntry {
    event_id: EventId,
    fields: Map<String, Value>,
}

impl LogEntry {
    /// Decodes one raw log message.
    pub fn parse(raw: &str) -> AppResult<Self> {
        let value = serde_json::from_str::<Value>(raw).map_err(|error| {
            AppError::MalformedLogEntry(format!("log entry is not valid JSON: {error}"))
        })?;

        match value {
            Value::Object(fields) => Self::from_fields(fields),
            other => Err(AppError::MalformedLogEntry(format!(
                "log entry must be a JSON object, got {}",
                json_kind(&other)
            ))),
        }
    }

    /// Builds an entry from already decoded fields.
    pub fn from_fields(fields: Map<String, Value>) -> AppResult<Self> {
        let event_id = fields
            .get(EVENT_ID_FIELD)
            .and_then(Value::as_str)
            .filter(|value| !value.trim().is_empty())
            .ok_or_else(|| {
                AppError::MalformedLogEntry(format!(
                    "log entry requires a non-empty string field '{EVENT_ID_FIELD}'"
                ))
            })?;
        let event_id = EventId::new(event_id)?;

        Ok(Self { event_id, fields })
    }

    /// Returns the event identity.
    #[must_use]
    pub fn event_id(&self) -> &EventId {
        &self.event_id
    }

    /// Returns all decoded fields.
    #[must_use]
    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    pub(crate) fn into_parts(self) -> (EventId, Map<String, Value>) {
        (self.event_id, self.fields)
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use tripwire_core::AppError;

    use super::LogEntry;

    #[test]
    fn parse_extracts_event_id() {
        let entry = LogEntry::parse(r#"{"eventID":"abc","eventName":"Foo"}"#);
        assert!(entry.is_ok());
        assert_eq!(
            entry.unwrap_or_else(|_| unreachable!()).event_id().as_str(),
            "abc"
        );
    }

    #[test]
    fn parse_rejects_non_objects_and_missing_ids() {
        for raw in [
            "not json",
            "[1, 2]",
            r#""eventID""#,
            r#"{"eventName":"Foo"}"#,
            r#"{"eventID":""}"#,
            r#"{"eventID":42}"#,
        ] {
            let entry = LogEntry::parse(raw);
            assert!(
                matches!(entry, Err(AppError::MalformedLogEntry(_))),
                "expected malformed entry for {raw}"
            );
        }
    }
}
