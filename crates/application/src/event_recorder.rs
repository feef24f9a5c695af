use std::sync::Arc;

use tracing::{error, info, warn};
use tripwire_core::{AppError, AppResult};
use tripwire_domain::{AuditRecord, AuditTableName, EventId, LogEntry};

use crate::incident_ports::AuditRecordRepository;

/// Dedup boundary: persists each distinct event exactly once.
#[derive(Clone)]
pub struct EventRecorder {
    repository: Arc<dyn AuditRecordRepository>,
}

impl EventRecorder {
    /// Creates a recorder over the given audit store.
    #[must_use]
    pub fn new(repository: Arc<dyn AuditRecordRepository>) -> Self {
        Self { repository }
    }

    /// Records one raw log entry.
    ///
    /// Returns the event id when this call created the audit record and
    /// `None` when the event had already been recorded.
    pub async fn record(
        &self,
        table: &AuditTableName,
        raw_entry: &str,
        alarm_type: &str,
    ) -> AppResult<Option<EventId>> {
        let entry = LogEntry::parse(raw_entry)?;
        let event_id = entry.event_id().clone();

        let inserted = self
            .repository
            .insert_if_absent(table, AuditRecord::unticketed(entry, alarm_type))
            .await
            .inspect_err(|error| {
                error!(
                    table = %table,
                    event_id = %event_id,
                    error = %error,
                    "failed to store audit record"
                );
            })?;

        if inserted {
            info!(table = %table, event_id = %event_id, "recorded new event");
            Ok(Some(event_id))
        } else {
            info!(table = %table, event_id = %event_id, "event already processed");
            Ok(None)
        }
    }

    /// Records a batch of raw log entries in order.
    ///
    /// Malformed entries are skipped. A store failure aborts the batch; entries
    /// inserted before it stay recorded and report as already processed on a
    /// retry, so they are left unticketed until swept.
    pub async fn record_batch(
        &self,
        table: &AuditTableName,
        raw_entries: &[String],
        alarm_type: &str,
    ) -> AppResult<Vec<EventId>> {
        let mut new_events = Vec::new();

        for raw_entry in raw_entries {
            match self.record(table, raw_entry.as_str(), alarm_type).await {
                Ok(Some(event_id)) => new_events.push(event_id),
                Ok(None) => {}
                Err(AppError::MalformedLogEntry(reason)) => {
                    warn!(table = %table, reason = %reason, "skipping malformed log entry");
                }
                Err(error) => return Err(error),
            }
        }

        info!(
            table = %table,
            received = raw_entries.len(),
            recorded = new_events.len(),
            "processed log entry batch"
        );

        Ok(new_events)
    }
}

#[cfg(test)]
mod tests;
