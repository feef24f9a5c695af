use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use tripwire_core::AppError;

/// API error payload understood by the orchestrator.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    #[serde(rename = "errorType")]
    error_type: &'static str,
    #[serde(rename = "errorMessage")]
    error_message: String,
}

/// HTTP API error wrapper around core application errors.
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(value: AppError) -> Self {
        Self(value)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(value: JsonRejection) -> Self {
        Self(AppError::Validation(format!(
            "invalid request body: {}",
            value.body_text()
        )))
    }
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self.0 {
            AppError::Validation(_)
            | AppError::InvalidTimeFormat(_)
            | AppError::MalformedLogEntry(_) => StatusCode::BAD_REQUEST,
            AppError::EventNotFound(_) => StatusCode::NOT_FOUND,
            AppError::EmptyResultSet(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::TicketCreationFailed(_) => StatusCode::BAD_GATEWAY,
            AppError::Store(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let payload = Json(ErrorResponse {
            error_type: self.0.error_type(),
            error_message: self.0.to_string(),
        });

        (status, payload).into_response()
    }
}

/// Standard API result type.
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use axum::response::IntoResponse;
    use tripwire_core::AppError;

    use super::ApiError;

    #[test]
    fn errors_map_to_orchestrator_statuses() {
        let cases = [
            (AppError::Validation("x".to_owned()), StatusCode::BAD_REQUEST),
            (
                AppError::InvalidTimeFormat("x".to_owned()),
                StatusCode::BAD_REQUEST,
            ),
            (
                AppError::MalformedLogEntry("x".to_owned()),
                StatusCode::BAD_REQUEST,
            ),
            (AppError::EventNotFound("x".to_owned()), StatusCode::NOT_FOUND),
            (
                AppError::EmptyResultSet("x".to_owned()),
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (
                AppError::TicketCreationFailed("x".to_owned()),
                StatusCode::BAD_GATEWAY,
            ),
            (AppError::Store("x".to_owned()), StatusCode::SERVICE_UNAVAILABLE),
            (
                AppError::Internal("x".to_owned()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (error, expected) in cases {
            assert_eq!(ApiError(error).into_response().status(), expected);
        }
    }
}
