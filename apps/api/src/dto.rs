use serde::{Deserialize, Serialize};
use tripwire_domain::QueryWindow;

/// Health response payload.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// Incoming payload for window resolution.
#[derive(Debug, Default, Deserialize)]
pub struct ResolveWindowRequest {
    #[serde(default)]
    pub time: Option<String>,
}

/// Epoch-second window, used both as a response and as query input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpochWindowPayload {
    pub start: i64,
    pub end: i64,
}

impl From<QueryWindow> for EpochWindowPayload {
    fn from(value: QueryWindow) -> Self {
        Self {
            start: value.start(),
            end: value.end(),
        }
    }
}

/// Query text wrapper.
#[derive(Debug, Clone, Deserialize)]
pub struct QueryStringPayload {
    pub string: String,
}

/// Incoming payload for a log search.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryLogsRequest {
    #[serde(alias = "CloudWatchLogsLogGroupName")]
    pub log_group_name: String,
    pub epoch: EpochWindowPayload,
    pub query: QueryStringPayload,
}

/// Raw log lines, shaped as the query step emits them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogsPayload {
    pub logs: Vec<String>,
}

/// Incoming payload for recording a batch of log lines.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordEventsRequest {
    #[serde(alias = "DDBAuditTableName")]
    pub audit_table_name: String,
    #[serde(default)]
    pub alarm_name: Option<String>,
    pub logs: LogsPayload,
}

/// Newly recorded event ids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordEventsResponse {
    pub events: Vec<String>,
}

/// Incoming payload for opening a ticket.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenTicketRequest {
    #[serde(alias = "DDBAuditTableName")]
    pub audit_table_name: String,
    #[serde(alias = "JiraUrl")]
    pub jira_url: String,
    #[serde(alias = "JiraProjectKey")]
    pub jira_project_key: String,
    #[serde(alias = "JiraAuthTokenSecretArn")]
    pub jira_auth_token_secret_arn: String,
    #[serde(default, alias = "AlarmName")]
    pub alarm_name: Option<String>,
    #[serde(rename = "EventId", alias = "eventId")]
    pub event_id: String,
}

/// Ticket opened (or previously opened) for one event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OpenTicketResponse {
    #[serde(rename = "TicketID")]
    pub ticket_id: String,
}
