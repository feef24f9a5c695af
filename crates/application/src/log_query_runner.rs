use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info};
use tripwire_core::{AppError, AppResult};
use tripwire_domain::QueryWindow;

use crate::incident_ports::{
    LogSearchClient, LogSearchPage, LogSearchRequest, LogSearchRow, LogSearchStatus,
};

/// Result column that carries the raw log message.
pub const MESSAGE_FIELD: &str = "@message";

/// Tunables for log search execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogQuerySettings {
    /// Maximum rows requested per search, bounding ticket fan-out.
    pub result_limit: u32,
    /// Delay between status polls.
    pub poll_interval: Duration,
}

impl Default for LogQuerySettings {
    fn default() -> Self {
        Self {
            result_limit: 10,
            poll_interval: Duration::from_secs(5),
        }
    }
}

/// Runs one log search to completion and extracts message payloads.
#[derive(Clone)]
pub struct LogQueryRunner {
    client: Arc<dyn LogSearchClient>,
    settings: LogQuerySettings,
}

impl LogQueryRunner {
    /// Creates a runner over the given search backend.
    #[must_use]
    pub fn new(client: Arc<dyn LogSearchClient>, settings: LogQuerySettings) -> Self {
        Self { client, settings }
    }

    /// Searches `log_group` over `window` and returns every `@message` value.
    ///
    /// Fails with `EmptyResultSet` when nothing was extracted, including the
    /// case where the search ended in a non-complete terminal status.
    pub async fn run(
        &self,
        log_group: &str,
        window: QueryWindow,
        query_string: &str,
    ) -> AppResult<Vec<String>> {
        if log_group.trim().is_empty() {
            return Err(AppError::Validation(
                "log group name must not be empty".to_owned(),
            ));
        }

        if query_string.trim().is_empty() {
            return Err(AppError::Validation(
                "log query string must not be empty".to_owned(),
            ));
        }

        let job_id = self
            .client
            .submit_search(LogSearchRequest {
                log_group: log_group.to_owned(),
                window,
                query_string: query_string.to_owned(),
                limit: self.settings.result_limit,
            })
            .await?;

        info!(
            job_id = %job_id,
            log_group = %log_group,
            start = window.start(),
            end = window.end(),
            "submitted log search"
        );

        let page = self.wait_for_terminal_status(job_id.as_str()).await?;
        let entries = extract_messages(&page.rows);

        if entries.is_empty() {
            return Err(AppError::EmptyResultSet(format!(
                "log search '{job_id}' on '{log_group}' returned no entries"
            )));
        }

        info!(job_id = %job_id, entries = entries.len(), "extracted log entries");
        Ok(entries)
    }

    async fn wait_for_terminal_status(&self, job_id: &str) -> AppResult<LogSearchPage> {
        let mut page = self.client.poll_search(job_id).await?;

        while !page.status.is_terminal() {
            tokio::time::sleep(self.settings.poll_interval).await;
            page = self.client.poll_search(job_id).await?;
        }

        if page.status == LogSearchStatus::Complete {
            let statistics = page.statistics.unwrap_or_default();
            info!(
                job_id = %job_id,
                rows = page.rows.len(),
                records_matched = statistics.records_matched,
                records_scanned = statistics.records_scanned,
                bytes_scanned = statistics.bytes_scanned,
                "log search complete"
            );
        } else {
            error!(
                job_id = %job_id,
                status = page.status.as_str(),
                rows = page.rows.len(),
                "log search ended without completing"
            );
        }

        Ok(page)
    }
}

fn extract_messages(rows: &[LogSearchRow]) -> Vec<String> {
    rows.iter()
        .filter_map(|row| {
            row.iter()
                .find(|column| column.field == MESSAGE_FIELD)
                .map(|column| column.value.clone())
        })
        .collect()
}
