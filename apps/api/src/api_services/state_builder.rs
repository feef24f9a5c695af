use std::sync::Arc;

use tracing::info;
use tripwire_application::{
    AuditRecordRepository, EventRecorder, LogQueryRunner, SecretStore, TicketOpener,
    WindowResolver,
};
use tripwire_core::AppError;
use tripwire_infrastructure::{
    EnvironmentSecretStore, HttpLogSearchClient, InMemoryAuditRecordRepository,
    JiraTicketTracker, PostgresAuditRecordRepository, RedisAuditRecordRepository, SystemClock,
    VaultSecretStore,
};

use crate::api_config::{ApiConfig, AuditStoreConfig, SecretStoreConfig};
use crate::state::AppState;

use super::database::connect_and_migrate;
use super::redis::build_redis_client;

pub async fn build_app_state(config: &ApiConfig) -> Result<AppState, AppError> {
    let http_client = reqwest::Client::builder()
        .timeout(config.http_timeout)
        .build()
        .map_err(|error| AppError::Internal(format!("failed to build http client: {error}")))?;

    let repository = build_audit_record_repository(&config.audit_store).await?;
    let secret_store = build_secret_store(&config.secret_store, http_client.clone())?;
    let log_search_client = HttpLogSearchClient::new(
        http_client.clone(),
        config.log_search_base_url.as_str(),
        config.log_search_api_token.clone(),
    )?;

    Ok(AppState {
        window_resolver: WindowResolver::new(Arc::new(SystemClock), config.window_lookback),
        log_query_runner: LogQueryRunner::new(Arc::new(log_search_client), config.query_settings),
        event_recorder: EventRecorder::new(repository.clone()),
        ticket_opener: TicketOpener::new(
            repository,
            secret_store,
            Arc::new(JiraTicketTracker::new(http_client)),
        ),
    })
}

async fn build_audit_record_repository(
    store: &AuditStoreConfig,
) -> Result<Arc<dyn AuditRecordRepository>, AppError> {
    match store {
        AuditStoreConfig::Postgres { database_url } => {
            let pool = connect_and_migrate(database_url).await?;
            info!("using postgres audit store");
            Ok(Arc::new(PostgresAuditRecordRepository::new(pool)))
        }
        AuditStoreConfig::Redis {
            redis_url,
            key_prefix,
        } => {
            let client = build_redis_client(redis_url)?;
            info!(key_prefix = %key_prefix, "using redis audit store");
            Ok(Arc::new(RedisAuditRecordRepository::new(
                client,
                key_prefix.as_str(),
            )))
        }
        AuditStoreConfig::Memory => {
            info!("using in-memory audit store; records are lost on restart");
            Ok(Arc::new(InMemoryAuditRecordRepository::new()))
        }
    }
}

fn build_secret_store(
    store: &SecretStoreConfig,
    http_client: reqwest::Client,
) -> Result<Arc<dyn SecretStore>, AppError> {
    match store {
        SecretStoreConfig::Environment => Ok(Arc::new(EnvironmentSecretStore::from_env())),
        SecretStoreConfig::Vault {
            address,
            token,
            mount,
        } => Ok(Arc::new(VaultSecretStore::new(
            http_client,
            address.as_str(),
            token.as_str(),
            mount.as_str(),
        )?)),
    }
}
