//! Domain entities and invariants.

#![forbid(unsafe_code)]

mod audit;
mod issue;
mod log_entry;
mod query_window;

pub use audit::{AuditRecord, AuditTableName, EventId, TicketId};
pub use issue::{
    EMPTY_VALUE_PLACEHOLDER, FieldPlacement, IssueDraft, IssueSection, placement_for_field,
};
pub use log_entry::{EVENT_ID_FIELD, LogEntry};
pub use query_window::{QueryWindow, REFERENCE_TIME_FORMAT, parse_reference_time};
