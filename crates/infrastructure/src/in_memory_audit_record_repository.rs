use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use tripwire_application::AuditRecordRepository;
use tripwire_core::AppResult;
use tripwire_domain::{AuditRecord, AuditTableName, EventId, TicketId};

/// In-memory audit record repository implementation.
#[derive(Debug, Default)]
pub struct InMemoryAuditRecordRepository {
    records: RwLock<HashMap<(String, String), AuditRecord>>,
}

impl InMemoryAuditRecordRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn key_for(table: &AuditTableName, event_id: &EventId) -> (String, String) {
    (table.as_str().to_owned(), event_id.as_str().to_owned())
}

#[async_trait]
impl AuditRecordRepository for InMemoryAuditRecordRepository {
    async fn find_record(
        &self,
        table: &AuditTableName,
        event_id: &EventId,
    ) -> AppResult<Option<AuditRecord>> {
        Ok(self
            .records
            .read()
            .await
            .get(&key_for(table, event_id))
            .cloned())
    }

    async fn insert_if_absent(
        &self,
        table: &AuditTableName,
        record: AuditRecord,
    ) -> AppResult<bool> {
        let key = key_for(table, record.event_id());
        let mut records = self.records.write().await;

        if records.contains_key(&key) {
            return Ok(false);
        }

        records.insert(key, record);
        Ok(true)
    }

    async fn set_ticket_id_if_absent(
        &self,
        table: &AuditTableName,
        event_id: &EventId,
        ticket_id: &TicketId,
    ) -> AppResult<bool> {
        let mut records = self.records.write().await;
        let Some(record) = records.get_mut(&key_for(table, event_id)) else {
            return Ok(false);
        };

        if record.ticket_id().is_some() {
            return Ok(false);
        }

        *record = AuditRecord::from_stored(
            record.event_id().clone(),
            Some(ticket_id.clone()),
            record.log_record().clone(),
            record.alarm_type().to_owned(),
        );
        Ok(true)
    }
}
