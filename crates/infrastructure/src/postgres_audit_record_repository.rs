use async_trait::async_trait;
use serde_json::{Map, Value};
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};
use tracing::error;

use tripwire_application::AuditRecordRepository;
use tripwire_core::{AppError, AppResult};
use tripwire_domain::{AuditRecord, AuditTableName, EventId, TicketId};

/// PostgreSQL-backed repository for audit records.
#[derive(Clone)]
pub struct PostgresAuditRecordRepository {
    pool: PgPool,
}

impl PostgresAuditRecordRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct AuditRecordRow {
    event_id: String,
    ticket_id: Option<String>,
    log_record: Json<Map<String, Value>>,
    alarm_type: String,
}

impl AuditRecordRow {
    fn into_record(self) -> AppResult<AuditRecord> {
        let event_id = EventId::new(self.event_id)?;
        let ticket_id = self.ticket_id.map(TicketId::new).transpose()?;

        Ok(AuditRecord::from_stored(
            event_id,
            ticket_id,
            self.log_record.0,
            self.alarm_type,
        ))
    }
}

fn store_error(
    action: &str,
    table: &AuditTableName,
    event_id: &EventId,
    error: sqlx::Error,
) -> AppError {
    error!(
        table = %table,
        event_id = %event_id,
        error = %error,
        "audit store {action} failed"
    );
    AppError::Store(format!(
        "failed to {action} audit record '{event_id}' in '{table}': {error}"
    ))
}

#[async_trait]
impl AuditRecordRepository for PostgresAuditRecordRepository {
    async fn find_record(
        &self,
        table: &AuditTableName,
        event_id: &EventId,
    ) -> AppResult<Option<AuditRecord>> {
        let row = sqlx::query_as::<_, AuditRecordRow>(
            r#"
            SELECT event_id, ticket_id, log_record, alarm_type
            FROM audit_records
            WHERE audit_table = $1 AND event_id = $2
            "#,
        )
        .bind(table.as_str())
        .bind(event_id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| store_error("load", table, event_id, error))?;

        row.map(AuditRecordRow::into_record).transpose()
    }

    async fn insert_if_absent(
        &self,
        table: &AuditTableName,
        record: AuditRecord,
    ) -> AppResult<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO audit_records (audit_table, event_id, ticket_id, log_record, alarm_type)
            VALUES ($1, $2, NULL, $3, $4)
            ON CONFLICT (audit_table, event_id) DO NOTHING
            "#,
        )
        .bind(table.as_str())
        .bind(record.event_id().as_str())
        .bind(Json(record.log_record()))
        .bind(record.alarm_type())
        .execute(&self.pool)
        .await
        .map_err(|error| store_error("insert", table, record.event_id(), error))?;

        Ok(result.rows_affected() == 1)
    }

    async fn set_ticket_id_if_absent(
        &self,
        table: &AuditTableName,
        event_id: &EventId,
        ticket_id: &TicketId,
    ) -> AppResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE audit_records
            SET ticket_id = $3, ticketed_at = now()
            WHERE audit_table = $1 AND event_id = $2 AND ticket_id IS NULL
            "#,
        )
        .bind(table.as_str())
        .bind(event_id.as_str())
        .bind(ticket_id.as_str())
        .execute(&self.pool)
        .await
        .map_err(|error| store_error("update", table, event_id, error))?;

        Ok(result.rows_affected() == 1)
    }
}
