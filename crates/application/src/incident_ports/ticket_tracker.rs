use async_trait::async_trait;
use tripwire_core::AppResult;
use tripwire_domain::TicketId;

/// Issue creation payload sent to the tracker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateIssueRequest {
    /// Tracker REST base URL.
    pub tracker_url: String,
    /// Basic authorization credential.
    pub credential: String,
    /// Target project key.
    pub project_key: String,
    /// One-line issue summary.
    pub summary: String,
    /// Rendered issue description.
    pub description: String,
}

/// Port for the external issue tracker.
#[async_trait]
pub trait TicketTracker: Send + Sync {
    /// Creates one issue and returns its key.
    async fn create_issue(&self, request: CreateIssueRequest) -> AppResult<TicketId>;
}
