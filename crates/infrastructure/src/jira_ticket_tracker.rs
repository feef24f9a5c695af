use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use reqwest::StatusCode;
use reqwest::header;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use tripwire_application::{CreateIssueRequest, TicketTracker};
use tripwire_core::{AppError, AppResult};
use tripwire_domain::TicketId;

/// Issue type used for every ticket opened by the pipeline.
pub const ISSUE_TYPE_NAME: &str = "Task";

/// Jira REST implementation of the ticket tracker port.
#[derive(Clone)]
pub struct JiraTicketTracker {
    http_client: reqwest::Client,
}

#[derive(Debug, Serialize)]
struct CreateIssueBody<'a> {
    fields: IssueFields<'a>,
}

#[derive(Debug, Serialize)]
struct IssueFields<'a> {
    project: ProjectRef<'a>,
    summary: &'a str,
    description: &'a str,
    issuetype: IssueTypeRef<'a>,
}

#[derive(Debug, Serialize)]
struct ProjectRef<'a> {
    key: &'a str,
}

#[derive(Debug, Serialize)]
struct IssueTypeRef<'a> {
    name: &'a str,
}

#[derive(Debug, Deserialize)]
struct CreatedIssueResponse {
    key: Option<String>,
}

impl JiraTicketTracker {
    /// Creates a tracker adapter on top of a shared HTTP client.
    #[must_use]
    pub fn new(http_client: reqwest::Client) -> Self {
        Self { http_client }
    }
}

/// Returns the value placed after `Basic ` in the authorization header.
///
/// Raw `user:token` pairs are encoded, already encoded secrets pass through.
#[must_use]
pub fn basic_credential(secret: &str) -> String {
    let secret = secret.trim();
    if secret.contains(':') {
        STANDARD.encode(secret)
    } else {
        secret.to_owned()
    }
}

#[async_trait]
impl TicketTracker for JiraTicketTracker {
    async fn create_issue(&self, request: CreateIssueRequest) -> AppResult<TicketId> {
        let endpoint = format!("{}/issue/", request.tracker_url.trim_end_matches('/'));
        let body = CreateIssueBody {
            fields: IssueFields {
                project: ProjectRef {
                    key: request.project_key.as_str(),
                },
                summary: request.summary.as_str(),
                description: request.description.as_str(),
                issuetype: IssueTypeRef {
                    name: ISSUE_TYPE_NAME,
                },
            },
        };

        let response = self
            .http_client
            .post(endpoint.as_str())
            .header(
                header::AUTHORIZATION,
                format!("Basic {}", basic_credential(request.credential.as_str())),
            )
            .header(header::CONTENT_TYPE, "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|error| {
                AppError::TicketCreationFailed(format!(
                    "failed to call tracker endpoint '{endpoint}': {error}"
                ))
            })?;

        let status = response.status();
        info!(status = status.as_u16(), endpoint = %endpoint, "tracker responded");

        if status != StatusCode::OK && status != StatusCode::CREATED {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<body unavailable>".to_owned());
            error!(status = status.as_u16(), endpoint = %endpoint, "tracker rejected issue");
            return Err(AppError::TicketCreationFailed(format!(
                "tracker returned status {}: {body}",
                status.as_u16()
            )));
        }

        let created = response
            .json::<CreatedIssueResponse>()
            .await
            .map_err(|error| {
                AppError::TicketCreationFailed(format!(
                    "failed to parse tracker response body: {error}"
                ))
            })?;

        let key = created
            .key
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                AppError::TicketCreationFailed("tracker response carried no issue key".to_owned())
            })?;

        TicketId::new(key)
    }
}

#[cfg(test)]
mod tests {
    use httpmock::Method::POST;
    use httpmock::MockServer;
    use serde_json::json;

    use tripwire_application::{CreateIssueRequest, TicketTracker};
    use tripwire_core::AppError;

    use super::{JiraTicketTracker, basic_credential};

    fn request(server: &MockServer) -> CreateIssueRequest {
        CreateIssueRequest {
            tracker_url: format!("{}/rest/api/2/", server.base_url()),
            credential: "dXNlcjp0b2tlbg==".to_owned(),
            project_key: "PROJ".to_owned(),
            summary: "RootLogin (abc)".to_owned(),
            description: "Alarm Name: RootLogin\n".to_owned(),
        }
    }

    #[test]
    fn basic_credential_encodes_raw_pairs_only() {
        assert_eq!(basic_credential("user:token"), "dXNlcjp0b2tlbg==");
        assert_eq!(basic_credential("dXNlcjp0b2tlbg=="), "dXNlcjp0b2tlbg==");
    }

    #[tokio::test]
    async fn create_issue_posts_payload_and_returns_key() {
        let server = MockServer::start_async().await;
        let create = server.mock(|when, then| {
            when.method(POST)
                .path("/rest/api/2/issue/")
                .header("Authorization", "Basic dXNlcjp0b2tlbg==")
                .header("Content-Type", "application/json")
                .json_body(json!({
                    "fields": {
                        "project": {"key": "PROJ"},
                        "summary": "RootLogin (abc)",
                        "description": "Alarm Name: RootLogin\n",
                        "issuetype": {"name": "Task"}
                    }
                }));
            then.status(201)
                .json_body(json!({"id": "10001", "key": "PROJ-1", "self": "https://tracker/10001"}));
        });

        let ticket = JiraTicketTracker::new(reqwest::Client::new())
            .create_issue(request(&server))
            .await;

        assert!(ticket.is_ok());
        assert_eq!(ticket.unwrap_or_else(|_| unreachable!()).as_str(), "PROJ-1");
        create.assert_calls(1);
    }

    #[tokio::test]
    async fn create_issue_accepts_ok_status() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(POST).path("/rest/api/2/issue/");
            then.status(200).json_body(json!({"key": "PROJ-7"}));
        });

        let ticket = JiraTicketTracker::new(reqwest::Client::new())
            .create_issue(request(&server))
            .await;

        assert!(ticket.is_ok());
        assert_eq!(ticket.unwrap_or_else(|_| unreachable!()).as_str(), "PROJ-7");
    }

    #[tokio::test]
    async fn create_issue_fails_on_other_statuses_and_missing_key() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(POST)
                .path("/rest/api/2/issue/")
                .body_includes("\"key\":\"BAD\"");
            then.status(400).body("project does not exist");
        });
        server.mock(|when, then| {
            when.method(POST)
                .path("/rest/api/2/issue/")
                .body_includes("\"key\":\"PROJ\"");
            then.status(202).json_body(json!({"key": "PROJ-2"}));
        });

        let tracker = JiraTicketTracker::new(reqwest::Client::new());
        let rejected = tracker
            .create_issue(CreateIssueRequest {
                project_key: "BAD".to_owned(),
                ..request(&server)
            })
            .await;
        assert!(matches!(rejected, Err(AppError::TicketCreationFailed(_))));

        let accepted_elsewhere = tracker.create_issue(request(&server)).await;
        assert!(matches!(
            accepted_elsewhere,
            Err(AppError::TicketCreationFailed(_))
        ));
    }
}
