//! Redis-backed audit record repository.
//!
//! Each record is one hash at `{prefix}:{table}:{event_id}`. Both mutations
//! run as Lua scripts so the existence check and the write are atomic.

use std::collections::HashMap;

use async_trait::async_trait;
use redis::{AsyncCommands, Script};
use serde_json::{Map, Value};
use tracing::error;

use tripwire_application::AuditRecordRepository;
use tripwire_core::{AppError, AppResult};
use tripwire_domain::{AuditRecord, AuditTableName, EventId, TicketId};

const INSERT_IF_ABSENT_SCRIPT: &str = r#"
if redis.call('EXISTS', KEYS[1]) == 1 then
  return 0
end
redis.call('HSET', KEYS[1], 'event_id', ARGV[1], 'alarm_type', ARGV[2], 'log_record', ARGV[3])
return 1
"#;

const SET_TICKET_IF_ABSENT_SCRIPT: &str = r#"
if redis.call('EXISTS', KEYS[1]) == 0 then
  return 0
end
return redis.call('HSETNX', KEYS[1], 'ticket_id', ARGV[1])
"#;

/// Redis implementation of the audit record repository.
#[derive(Clone)]
pub struct RedisAuditRecordRepository {
    client: redis::Client,
    key_prefix: String,
}

impl RedisAuditRecordRepository {
    /// Creates one repository adapter.
    #[must_use]
    pub fn new(client: redis::Client, key_prefix: impl Into<String>) -> Self {
        Self {
            client,
            key_prefix: key_prefix.into(),
        }
    }

    fn key_for(&self, table: &AuditTableName, event_id: &EventId) -> String {
        format!("{}:{table}:{event_id}", self.key_prefix)
    }

    async fn connection(&self) -> AppResult<redis::aio::MultiplexedConnection> {
        self.client
            .get_multiplexed_async_connection()
            .await
            .map_err(|error| {
                error!(error = %error, "failed to connect to redis audit store");
                AppError::Store(format!("failed to connect to redis: {error}"))
            })
    }
}

fn store_error(action: &str, event_id: &EventId, error: redis::RedisError) -> AppError {
    error!(event_id = %event_id, error = %error, "audit store {action} failed");
    AppError::Store(format!(
        "failed to {action} audit record '{event_id}' in redis: {error}"
    ))
}

fn record_from_hash(fields: HashMap<String, String>) -> AppResult<AuditRecord> {
    let event_id = fields
        .get("event_id")
        .ok_or_else(|| AppError::Store("redis audit record is missing event_id".to_owned()))?;
    let log_record = fields
        .get("log_record")
        .map(|raw| serde_json::from_str::<Map<String, Value>>(raw))
        .transpose()
        .map_err(|error| {
            AppError::Store(format!(
                "redis audit record '{event_id}' has invalid log_record: {error}"
            ))
        })?
        .unwrap_or_default();
    let ticket_id = fields
        .get("ticket_id")
        .filter(|value| !value.is_empty())
        .map(|value| TicketId::new(value.as_str()))
        .transpose()?;

    Ok(AuditRecord::from_stored(
        EventId::new(event_id.as_str())?,
        ticket_id,
        log_record,
        fields.get("alarm_type").cloned().unwrap_or_default(),
    ))
}

#[async_trait]
impl AuditRecordRepository for RedisAuditRecordRepository {
    async fn find_record(
        &self,
        table: &AuditTableName,
        event_id: &EventId,
    ) -> AppResult<Option<AuditRecord>> {
        let mut connection = self.connection().await?;
        let fields: HashMap<String, String> = connection
            .hgetall(self.key_for(table, event_id))
            .await
            .map_err(|error| store_error("load", event_id, error))?;

        if fields.is_empty() {
            return Ok(None);
        }

        record_from_hash(fields).map(Some)
    }

    async fn insert_if_absent(
        &self,
        table: &AuditTableName,
        record: AuditRecord,
    ) -> AppResult<bool> {
        let log_record = serde_json::to_string(record.log_record()).map_err(|error| {
            AppError::Internal(format!("failed to serialize log record: {error}"))
        })?;
        let mut connection = self.connection().await?;

        let inserted = Script::new(INSERT_IF_ABSENT_SCRIPT)
            .key(self.key_for(table, record.event_id()))
            .arg(record.event_id().as_str())
            .arg(record.alarm_type())
            .arg(log_record)
            .invoke_async::<i32>(&mut connection)
            .await
            .map_err(|error| store_error("insert", record.event_id(), error))?;

        Ok(inserted > 0)
    }

    async fn set_ticket_id_if_absent(
        &self,
        table: &AuditTableName,
        event_id: &EventId,
        ticket_id: &TicketId,
    ) -> AppResult<bool> {
        let mut connection = self.connection().await?;

        let applied = Script::new(SET_TICKET_IF_ABSENT_SCRIPT)
            .key(self.key_for(table, event_id))
            .arg(ticket_id.as_str())
            .invoke_async::<i32>(&mut connection)
            .await
            .map_err(|error| store_error("update", event_id, error))?;

        Ok(applied > 0)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use tripwire_application::AuditRecordRepository;
    use tripwire_domain::{AuditRecord, AuditTableName, EventId, LogEntry, TicketId};

    use super::{RedisAuditRecordRepository, record_from_hash};

    fn test_repository() -> Option<RedisAuditRecordRepository> {
        let redis_url = std::env::var("REDIS_URL").ok()?;
        let client = match redis::Client::open(redis_url) {
            Ok(client) => client,
            Err(error) => panic!("invalid REDIS_URL in test: {error}"),
        };
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|elapsed| elapsed.as_nanos())
            .unwrap_or_default();

        Some(RedisAuditRecordRepository::new(
            client,
            format!("tripwire-test-{nanos}"),
        ))
    }

    #[test]
    fn record_from_hash_restores_ticket_and_log_record() {
        let record = record_from_hash(HashMap::from([
            ("event_id".to_owned(), "e1".to_owned()),
            ("alarm_type".to_owned(), "Alarm".to_owned()),
            ("log_record".to_owned(), r#"{"eventID":"e1"}"#.to_owned()),
            ("ticket_id".to_owned(), "PROJ-1".to_owned()),
        ]));

        assert!(record.is_ok());
        let record = record.unwrap_or_else(|_| unreachable!());
        assert_eq!(record.ticket_id().map(TicketId::as_str), Some("PROJ-1"));
        assert_eq!(record.log_record().len(), 1);
    }

    #[test]
    fn record_from_hash_rejects_corrupt_log_record() {
        let record = record_from_hash(HashMap::from([
            ("event_id".to_owned(), "e1".to_owned()),
            ("log_record".to_owned(), "[".to_owned()),
        ]));

        assert!(record.is_err());
    }

    #[tokio::test]
    async fn conditional_writes_apply_once() {
        let Some(repository) = test_repository() else {
            return;
        };

        let table = AuditTableName::new("audit").unwrap_or_else(|_| unreachable!());
        let event_id = EventId::new("e1").unwrap_or_else(|_| unreachable!());
        let record = || {
            AuditRecord::unticketed(
                LogEntry::parse(r#"{"eventID":"e1","eventName":"Foo"}"#)
                    .unwrap_or_else(|_| unreachable!()),
                "Alarm",
            )
        };

        assert!(matches!(
            repository.insert_if_absent(&table, record()).await,
            Ok(true)
        ));
        assert!(matches!(
            repository.insert_if_absent(&table, record()).await,
            Ok(false)
        ));

        let first = TicketId::new("PROJ-1").unwrap_or_else(|_| unreachable!());
        let second = TicketId::new("PROJ-2").unwrap_or_else(|_| unreachable!());
        assert!(matches!(
            repository
                .set_ticket_id_if_absent(&table, &event_id, &first)
                .await,
            Ok(true)
        ));
        assert!(matches!(
            repository
                .set_ticket_id_if_absent(&table, &event_id, &second)
                .await,
            Ok(false)
        ));

        let stored = repository
            .find_record(&table, &event_id)
            .await
            .unwrap_or_default()
            .unwrap_or_else(|| unreachable!());
        assert_eq!(stored.ticket_id(), Some(&first));
        assert_eq!(stored.alarm_type(), "Alarm");
    }

    #[tokio::test]
    async fn ticket_update_on_missing_record_is_rejected() {
        let Some(repository) = test_repository() else {
            return;
        };

        let table = AuditTableName::new("audit").unwrap_or_else(|_| unreachable!());
        let event_id = EventId::new("missing").unwrap_or_else(|_| unreachable!());
        let ticket_id = TicketId::new("PROJ-1").unwrap_or_else(|_| unreachable!());

        assert!(matches!(
            repository
                .set_ticket_id_if_absent(&table, &event_id, &ticket_id)
                .await,
            Ok(false)
        ));
        assert!(matches!(
            repository.find_record(&table, &event_id).await,
            Ok(None)
        ));
    }
}
