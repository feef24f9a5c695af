use axum::Json;
use axum::extract::State;
use tripwire_application::{DEFAULT_ALARM_NAME, OpenTicketInput};
use tripwire_domain::{AuditTableName, EventId, QueryWindow};

use crate::dto::{
    EpochWindowPayload, LogsPayload, OpenTicketRequest, OpenTicketResponse, QueryLogsRequest,
    RecordEventsRequest, RecordEventsResponse, ResolveWindowRequest,
};
use crate::error::ApiResult;
use crate::extract::ApiJson;
use crate::state::AppState;


pub async fn resolve_window_handler(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<ResolveWindowRequest>,
) -> ApiResult<Json<EpochWindowPayload>> {
    let window = state.window_resolver.resolve(payload.time.as_deref())?;
    Ok(Json(EpochWindowPayload::from(window)))
}

pub async fn query_logs_handler(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<QueryLogsRequest>,
) -> ApiResult<Json<LogsPayload>> {
    let window = QueryWindow::new(payload.epoch.start, payload.epoch.end)?;
    let logs = state
        .log_query_runner
        .run(
            payload.log_group_name.as_str(),
            window,
            payload.query.string.as_str(),
        )
        .await?;

    Ok(Json(LogsPayload { logs }))
}

pub async fn record_events_handler(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<RecordEventsRequest>,
) -> ApiResult<Json<RecordEventsResponse>> {
    let table = AuditTableName::new(payload.audit_table_name)?;
    let alarm_type = alarm_name_or_default(payload.alarm_name);

    let events = state
        .event_recorder
        .record_batch(&table, payload.logs.logs.as_slice(), alarm_type.as_str())
        .await?;

    Ok(Json(RecordEventsResponse {
        events: events
            .into_iter()
            .map(|event_id| event_id.as_str().to_owned())
            .collect(),
    }))
}

pub async fn open_ticket_handler(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<OpenTicketRequest>,
) -> ApiResult<Json<OpenTicketResponse>> {
    let ticket_id = state
        .ticket_opener
        .open(OpenTicketInput {
            table: AuditTableName::new(payload.audit_table_name)?,
            event_id: EventId::new(payload.event_id)?,
            tracker_url: payload.jira_url,
            project_key: payload.jira_project_key,
            credential_ref: payload.jira_auth_token_secret_arn,
            alarm_name: alarm_name_or_default(payload.alarm_name),
        })
        .await?;

    Ok(Json(OpenTicketResponse {
        ticket_id: ticket_id.as_str().to_owned(),
    }))
}

fn alarm_name_or_default(alarm_name: Option<String>) -> String {
    alarm_name
        .filter(|value| !value.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_ALARM_NAME.to_owned())
}
