use std::sync::Arc;

use tracing::{info, warn};
use tripwire_core::{AppError, AppResult};
use tripwire_domain::{AuditTableName, EventId, IssueDraft, TicketId};

use crate::incident_ports::{AuditRecordRepository, CreateIssueRequest, SecretStore, TicketTracker};

/// Alarm label used when the invocation does not carry one.
pub const DEFAULT_ALARM_NAME: &str = "AWS CIS Benchmark Alarm";

/// Input for opening the ticket of one recorded event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenTicketInput {
    /// Audit table holding the event.
    pub table: AuditTableName,
    /// Event to open a ticket for.
    pub event_id: EventId,
    /// Tracker REST base URL.
    pub tracker_url: String,
    /// Tracker project key.
    pub project_key: String,
    /// Secret store reference for the tracker credential.
    pub credential_ref: String,
    /// Alarm label rendered into the issue summary.
    pub alarm_name: String,
}

/// Opens at most one ticket per recorded event.
#[derive(Clone)]
pub struct TicketOpener {
    repository: Arc<dyn AuditRecordRepository>,
    secret_store: Arc<dyn SecretStore>,
    tracker: Arc<dyn TicketTracker>,
}

impl TicketOpener {
    /// Creates an opener over the given collaborators.
    #[must_use]
    pub fn new(
        repository: Arc<dyn AuditRecordRepository>,
        secret_store: Arc<dyn SecretStore>,
        tracker: Arc<dyn TicketTracker>,
    ) -> Self {
        Self {
            repository,
            secret_store,
            tracker,
        }
    }

    /// Returns the ticket for `input.event_id`, creating it if needed.
    ///
    /// Re-invocation after success returns the stored ticket without calling
    /// the tracker. When a concurrent invocation recorded its ticket first,
    /// the stored ticket wins and is returned.
    pub async fn open(&self, input: OpenTicketInput) -> AppResult<TicketId> {
        let OpenTicketInput {
            table,
            event_id,
            tracker_url,
            project_key,
            credential_ref,
            alarm_name,
        } = input;

        let record = self
            .repository
            .find_record(&table, &event_id)
            .await?
            .ok_or_else(|| {
                AppError::EventNotFound(format!(
                    "no audit record for event '{event_id}' in table '{table}'"
                ))
            })?;

        if let Some(ticket_id) = record.ticket_id() {
            info!(
                event_id = %event_id,
                ticket_id = %ticket_id,
                "event already ticketed"
            );
            return Ok(ticket_id.clone());
        }

        let credential = self.secret_store.get_secret(credential_ref.as_str()).await?;
        let draft = IssueDraft::for_record(alarm_name.as_str(), &record);

        let ticket_id = self
            .tracker
            .create_issue(CreateIssueRequest {
                tracker_url,
                credential,
                project_key,
                summary: draft.summary().to_owned(),
                description: draft.description(),
            })
            .await?;
        info!(event_id = %event_id, ticket_id = %ticket_id, "created ticket");

        let applied = self
            .repository
            .set_ticket_id_if_absent(&table, &event_id, &ticket_id)
            .await?;

        if applied {
            return Ok(ticket_id);
        }

        let stored = self
            .repository
            .find_record(&table, &event_id)
            .await?
            .and_then(|record| record.ticket_id().cloned())
            .ok_or_else(|| {
                AppError::Internal(format!(
                    "ticket update for event '{event_id}' was rejected but no ticket is stored"
                ))
            })?;

        warn!(
            event_id = %event_id,
            orphaned_ticket_id = %ticket_id,
            ticket_id = %stored,
            "event was ticketed concurrently; keeping the stored ticket"
        );

        Ok(stored)
    }
}
