//! Typed API error for HTTP handlers.
//!
//! Converts service errors into JSON responses of the form
//! `{"success": false, "error": "<message>"}`.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use leadmatch_service::ServiceError;

/// Use via `Result<Json<T>, ApiError>` in handlers.
#[derive(Debug)]
pub enum ApiError {
    /// 400 Bad Request: missing or malformed input from the caller.
    BadRequest(String),
    /// 500 Internal Server Error: store, provider or configuration failure.
    /// The message is returned to the caller after being logged.
    Internal(anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::BadRequest(msg) => {
                tracing::warn!(error = %msg, "rejected request");
                (StatusCode::BAD_REQUEST, msg)
            },
            Self::Internal(err) => {
                tracing::error!(error = ?err, "request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
            },
        };
        let body = serde_json::json!({ "success": false, "error": message });
        (status, Json(body)).into_response()
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err)
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        if err.is_client_error() {
            Self::BadRequest(err.to_string())
        } else {
            Self::Internal(err.into())
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_input_maps_to_bad_request() {
        let err = ApiError::from(ServiceError::InvalidInput("Parâmetros obrigatórios".to_owned()));
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn not_configured_maps_to_internal() {
        let err = ApiError::from(ServiceError::NotConfigured("SERPER_API_KEY não configurada".to_owned()));
        assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
