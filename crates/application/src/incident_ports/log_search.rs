use async_trait::async_trait;
use tripwire_core::AppResult;
use tripwire_domain::QueryWindow;

/// Search job submitted to the log store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSearchRequest {
    /// Log group the search is scoped to.
    pub log_group: String,
    /// Time window searched.
    pub window: QueryWindow,
    /// Backend query string, passed through verbatim.
    pub query_string: String,
    /// Maximum number of rows returned.
    pub limit: u32,
}

/// Search job status reported by the log store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogSearchStatus {
    /// Accepted but not started.
    Scheduled,
    /// In progress.
    Running,
    /// Finished successfully.
    Complete,
    /// Finished with an error.
    Failed,
    /// Cancelled before completion.
    Cancelled,
    /// Exceeded the backend time limit.
    Timeout,
    /// Any status this adapter does not recognise.
    Unknown,
}

impl LogSearchStatus {
    /// Parses a backend status value.
    #[must_use]
    pub fn parse(value: &str) -> Self {
        match value {
            "Scheduled" => Self::Scheduled,
            "Running" => Self::Running,
            "Complete" => Self::Complete,
            "Failed" => Self::Failed,
            "Cancelled" => Self::Cancelled,
            "Timeout" => Self::Timeout,
            _ => Self::Unknown,
        }
    }

    /// Returns stable status value.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Scheduled => "Scheduled",
            Self::Running => "Running",
            Self::Complete => "Complete",
            Self::Failed => "Failed",
            Self::Cancelled => "Cancelled",
            Self::Timeout => "Timeout",
            Self::Unknown => "Unknown",
        }
    }

    /// Returns whether polling should stop.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Scheduled | Self::Running)
    }
}

/// One named column of a result row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSearchField {
    /// Column name, e.g. `@message`.
    pub field: String,
    /// Column value.
    pub value: String,
}

/// One result row.
pub type LogSearchRow = Vec<LogSearchField>;

/// Scan statistics reported alongside results.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LogSearchStatistics {
    /// Records that matched the query.
    pub records_matched: f64,
    /// Records scanned.
    pub records_scanned: f64,
    /// Bytes scanned.
    pub bytes_scanned: f64,
}

/// Snapshot returned by one poll.
#[derive(Debug, Clone, PartialEq)]
pub struct LogSearchPage {
    /// Job status at poll time.
    pub status: LogSearchStatus,
    /// Rows available so far.
    pub rows: Vec<LogSearchRow>,
    /// Scan statistics, when reported.
    pub statistics: Option<LogSearchStatistics>,
}

/// Port for the asynchronous log search backend.
#[async_trait]
pub trait LogSearchClient: Send + Sync {
    /// Submits a search job and returns its id.
    async fn submit_search(&self, request: LogSearchRequest) -> AppResult<String>;

    /// Fetches the current status and rows of a job.
    async fn poll_search(&self, job_id: &str) -> AppResult<LogSearchPage>;
}
