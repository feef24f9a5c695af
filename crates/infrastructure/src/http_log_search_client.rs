use async_trait::async_trait;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use tracing::error;

use tripwire_application::{
    LogSearchClient, LogSearchField, LogSearchPage, LogSearchRequest, LogSearchStatistics,
    LogSearchStatus,
};
use tripwire_core::{AppError, AppResult};

/// HTTP client for an asynchronous log search API.
///
/// Jobs are started with `POST {base}/queries` and polled with
/// `GET {base}/queries/{query_id}`.
#[derive(Clone)]
pub struct HttpLogSearchClient {
    http_client: reqwest::Client,
    base_url: Url,
    api_token: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct StartQueryBody<'a> {
    log_group_name: &'a str,
    start_time: i64,
    end_time: i64,
    query_string: &'a str,
    limit: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StartQueryResponse {
    query_id: String,
}

#[derive(Debug, Deserialize)]
struct QueryResultsResponse {
    status: String,
    #[serde(default)]
    results: Vec<Vec<ResultFieldResponse>>,
    #[serde(default)]
    statistics: Option<QueryStatisticsResponse>,
}

#[derive(Debug, Deserialize)]
struct ResultFieldResponse {
    field: Option<String>,
    value: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QueryStatisticsResponse {
    #[serde(default)]
    records_matched: f64,
    #[serde(default)]
    records_scanned: f64,
    #[serde(default)]
    bytes_scanned: f64,
}

impl HttpLogSearchClient {
    /// Creates a client for the API rooted at `base_url`.
    pub fn new(
        http_client: reqwest::Client,
        base_url: &str,
        api_token: Option<String>,
    ) -> AppResult<Self> {
        let base_url = Url::parse(base_url).map_err(|error| {
            AppError::Validation(format!("invalid log search base url '{base_url}': {error}"))
        })?;

        if base_url.cannot_be_a_base() {
            return Err(AppError::Validation(format!(
                "log search base url '{base_url}' cannot carry a path"
            )));
        }

        Ok(Self {
            http_client,
            base_url,
            api_token: api_token.filter(|token| !token.trim().is_empty()),
        })
    }

    fn endpoint(&self, segments: &[&str]) -> AppResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| {
                AppError::Internal("log search base url cannot carry a path".to_owned())
            })?
            .pop_if_empty()
            .extend(segments);

        Ok(url)
    }

    fn authorize(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn read_json<T>(response: reqwest::Response, action: &str) -> AppResult<T>
    where
        T: for<'de> Deserialize<'de>,
    {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<body unavailable>".to_owned());
            error!(status = status.as_u16(), action, "log search call rejected");
            return Err(AppError::Store(format!(
                "log search {action} returned status {}: {body}",
                status.as_u16()
            )));
        }

        response.json::<T>().await.map_err(|error| {
            AppError::Store(format!(
                "failed to parse log search {action} response body: {error}"
            ))
        })
    }
}

#[async_trait]
impl LogSearchClient for HttpLogSearchClient {
    async fn submit_search(&self, request: LogSearchRequest) -> AppResult<String> {
        let endpoint = self.endpoint(&["queries"])?;
        let response = self
            .authorize(self.http_client.post(endpoint))
            .json(&StartQueryBody {
                log_group_name: request.log_group.as_str(),
                start_time: request.window.start(),
                end_time: request.window.end(),
                query_string: request.query_string.as_str(),
                limit: request.limit,
            })
            .send()
            .await
            .map_err(|error| AppError::Store(format!("failed to start log search: {error}")))?;

        let body = Self::read_json::<StartQueryResponse>(response, "start").await?;
        if body.query_id.trim().is_empty() {
            return Err(AppError::Store(
                "log search start response carried an empty queryId".to_owned(),
            ));
        }

        Ok(body.query_id)
    }

    async fn poll_search(&self, job_id: &str) -> AppResult<LogSearchPage> {
        let endpoint = self.endpoint(&["queries", job_id])?;
        let response = self
            .authorize(self.http_client.get(endpoint))
            .send()
            .await
            .map_err(|error| AppError::Store(format!("failed to poll log search: {error}")))?;

        let body = Self::read_json::<QueryResultsResponse>(response, "poll").await?;

        Ok(LogSearchPage {
            status: LogSearchStatus::parse(body.status.as_str()),
            rows: body
                .results
                .into_iter()
                .map(|row| {
                    row.into_iter()
                        .filter_map(|column| {
                            Some(LogSearchField {
                                field: column.field?,
                                value: column.value?,
                            })
                        })
                        .collect()
                })
                .collect(),
            statistics: body.statistics.map(|statistics| LogSearchStatistics {
                records_matched: statistics.records_matched,
                records_scanned: statistics.records_scanned,
                bytes_scanned: statistics.bytes_scanned,
            }),
        })
    }
}
