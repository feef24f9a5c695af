//! Application services and ports.

#![forbid(unsafe_code)]

mod event_recorder;
mod incident_ports;
mod log_query_runner;
mod ticket_opener;
mod window_resolver;

#[cfg(test)]
mod test_fakes;

pub use event_recorder::EventRecorder;
pub use incident_ports::{
    AuditRecordRepository, Clock, CreateIssueRequest, LogSearchClient, LogSearchField,
    LogSearchPage, LogSearchRequest, LogSearchRow, LogSearchStatistics, LogSearchStatus,
    SecretStore, TicketTracker,
};
pub use log_query_runner::{LogQueryRunner, LogQuerySettings, MESSAGE_FIELD};
pub use ticket_opener::{DEFAULT_ALARM_NAME, OpenTicketInput, TicketOpener};
pub use window_resolver::{DEFAULT_LOOKBACK, WindowResolver};
