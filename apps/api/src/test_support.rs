use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use tripwire_application::{
    Clock, EventRecorder, LogQueryRunner, LogQuerySettings, TicketOpener, WindowResolver,
};
use tripwire_infrastructure::{
    EnvironmentSecretStore, HttpLogSearchClient, InMemoryAuditRecordRepository,
    JiraTicketTracker,
};

use crate::state::AppState;

struct FixedClock(DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Builds in-memory state with the clock pinned at epoch second 200 and a
/// 100 second lookback.
pub(crate) fn build_state(log_search_base_url: &str) -> AppState {
    let repository = Arc::new(InMemoryAuditRecordRepository::new());
    let http_client = reqwest::Client::new();
    let log_search_client =
        HttpLogSearchClient::new(http_client.clone(), log_search_base_url, None)
            .unwrap_or_else(|_| unreachable!());

    AppState {
        window_resolver: WindowResolver::new(
            Arc::new(FixedClock(
                Utc.timestamp_opt(200, 0)
                    .single()
                    .unwrap_or_else(|| unreachable!()),
            )),
            TimeDelta::seconds(100),
        ),
        log_query_runner: LogQueryRunner::new(
            Arc::new(log_search_client),
            LogQuerySettings {
                result_limit: 10,
                poll_interval: Duration::from_millis(1),
            },
        ),
        event_recorder: EventRecorder::new(repository.clone()),
        ticket_opener: TicketOpener::new(
            repository,
            Arc::new(EnvironmentSecretStore::from_vars([(
                "JIRA_CREDENTIAL",
                "user:token",
            )])),
            Arc::new(JiraTicketTracker::new(http_client)),
        ),
    }
}
