//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod environment_secret_store;
mod http_log_search_client;
mod in_memory_audit_record_repository;
mod jira_ticket_tracker;
mod postgres_audit_record_repository;
mod redis_audit_record_repository;
mod system_clock;
mod vault_secret_store;

pub use environment_secret_store::EnvironmentSecretStore;
pub use http_log_search_client::HttpLogSearchClient;
pub use in_memory_audit_record_repository::InMemoryAuditRecordRepository;
pub use jira_ticket_tracker::{ISSUE_TYPE_NAME, JiraTicketTracker, basic_credential};
pub use postgres_audit_record_repository::PostgresAuditRecordRepository;
pub use redis_audit_record_repository::RedisAuditRecordRepository;
pub use system_clock::SystemClock;
pub use vault_secret_store::{DEFAULT_SECRET_KEY, VaultSecretStore};
