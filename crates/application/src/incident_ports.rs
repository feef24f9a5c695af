mod audit_store;
mod clock;
mod log_search;
mod secret_store;
mod ticket_tracker;

pub use audit_store::AuditRecordRepository;
pub use clock::Clock;
pub use log_search::{
    LogSearchClient, LogSearchField, LogSearchPage, LogSearchRequest, LogSearchRow,
    LogSearchStatistics, LogSearchStatus,
};
pub use secret_store::SecretStore;
pub use ticket_tracker::{CreateIssueRequest, TicketTracker};
