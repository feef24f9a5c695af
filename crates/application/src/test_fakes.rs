use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use tripwire_core::{AppError, AppResult};
use tripwire_domain::{AuditRecord, AuditTableName, EventId, TicketId};

use crate::incident_ports::AuditRecordRepository;

#[derive(Default)]
pub(crate) struct FakeAuditRecordRepository {
    pub(crate) records: Mutex<HashMap<(String, String), AuditRecord>>,
    pub(crate) fail_writes: Mutex<bool>,
    pub(crate) fail_insert_for: Mutex<Option<String>>,
}

impl FakeAuditRecordRepository {
    pub(crate) async fn stored(&self, table: &str, event_id: &str) -> Option<AuditRecord> {
        self.records
            .lock()
            .await
            .get(&(table.to_owned(), event_id.to_owned()))
            .cloned()
    }
}

#[async_trait]
impl AuditRecordRepository for FakeAuditRecordRepository {
    async fn find_record(
        &self,
        table: &AuditTableName,
        event_id: &EventId,
    ) -> AppResult<Option<AuditRecord>> {
        Ok(self.stored(table.as_str(), event_id.as_str()).await)
    }

    async fn insert_if_absent(
        &self,
        table: &AuditTableName,
        record: AuditRecord,
    ) -> AppResult<bool> {
        if *self.fail_writes.lock().await
            || self.fail_insert_for.lock().await.as_deref() == Some(record.event_id().as_str())
        {
            return Err(AppError::Store("audit store unavailable".to_owned()));
        }

        let key = (
            table.as_str().to_owned(),
            record.event_id().as_str().to_owned(),
        );
        let mut records = self.records.lock().await;
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
        if *self.fail_writes.lock().await {
            return Err(AppError::Store("audit store unavailable".to_owned()));
        }

        let key = (table.as_str().to_owned(), event_id.as_str().to_owned());
        let mut records = self.records.lock().await;
        let Some(record) = records.get(&key) else {
            return Ok(false);
        };

        if record.ticket_id().is_some() {
            return Ok(false);
        }

        let updated = AuditRecord::from_stored(
            record.event_id().clone(),
            Some(ticket_id.clone()),
            record.log_record().clone(),
            record.alarm_type().to_owned(),
        );
        records.insert(key, updated);
        Ok(true)
    }
}

pub(crate) fn table() -> AuditTableName {
    AuditTableName::new("audit").unwrap_or_else(|_| unreachable!())
}
