use async_trait::async_trait;
use tripwire_core::AppResult;
use tripwire_domain::{AuditRecord, AuditTableName, EventId, TicketId};

/// Repository port for durable audit records.
///
/// Only conditional mutations are exposed. Concurrent recorders and openers
/// therefore never overwrite each other without external locking.
#[async_trait]
pub trait AuditRecordRepository: Send + Sync {
    /// Loads one record by event identity.
    async fn find_record(
        &self,
        table: &AuditTableName,
        event_id: &EventId,
    ) -> AppResult<Option<AuditRecord>>;

    /// Stores `record` only when no record exists for its event id.
    ///
    /// Returns `true` when this call created the record.
    async fn insert_if_absent(&self, table: &AuditTableName, record: AuditRecord)
    -> AppResult<bool>;

    /// Sets the ticket id only when the record exists and has none yet.
    ///
    /// Returns `true` when this call applied the update.
    async fn set_ticket_id_if_absent(
        &self,
        table: &AuditTableName,
        event_id: &EventId,
        ticket_id: &TicketId,
    ) -> AppResult<bool>;
}
