use tripwire_application::{EventRecorder, LogQueryRunner, TicketOpener, WindowResolver};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub window_resolver: WindowResolver,
    pub log_query_runner: LogQueryRunner,
    pub event_recorder: EventRecorder,
    pub ticket_opener: TicketOpener,
}
