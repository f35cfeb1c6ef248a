// HTTP API Error Types
use axum::{extract::rejection::JsonRejection, http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

use crate::database::record::RecordError;
use crate::services::ServiceError;

/// HTTP API error with appropriate status codes and client-friendly messages
#[derive(Debug)]
pub enum ApiError {
    // 400 Bad Request
    BadRequest(String),

    // 404 Not Found
    NotFound(String),

    // 500 Internal Server Error; detail is only sent when configured
    InternalServerError { message: String, detail: Option<String> },

    // 503 Service Unavailable
    ServiceUnavailable(String),
}

impl ApiError {
    /// Get HTTP status code
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::InternalServerError { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// Get client-safe error message
    pub fn message(&self) -> &str {
        match self {
            ApiError::BadRequest(msg) => msg,
            ApiError::NotFound(msg) => msg,
            ApiError::InternalServerError { message, .. } => message,
            ApiError::ServiceUnavailable(msg) => msg,
        }
    }

    /// Get error code for client handling
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "BAD_REQUEST",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::InternalServerError { .. } => "INTERNAL_SERVER_ERROR",
            ApiError::ServiceUnavailable(_) => "SERVICE_UNAVAILABLE",
        }
    }

    /// Convert to JSON response body
    pub fn to_json(&self) -> Value {
        let mut body = json!({
            "success": false,
            "error": self.message(),
            "code": self.error_code()
        });

        if let ApiError::InternalServerError { detail: Some(detail), .. } = self {
            body["message"] = json!(detail);
        }

        body
    }
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn internal_server_error(message: impl Into<String>) -> Self {
        ApiError::InternalServerError {
            message: message.into(),
            detail: None,
        }
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        ApiError::ServiceUnavailable(message.into())
    }

    /// Attach internal detail to a 500, if the deployment allows it
    pub fn with_detail(self, detail: impl Into<String>) -> Self {
        match self {
            ApiError::InternalServerError { message, .. }
                if crate::config::config().api.expose_error_details =>
            {
                ApiError::InternalServerError {
                    message,
                    detail: Some(detail.into()),
                }
            }
            other => other,
        }
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::NotFound(msg) => ApiError::not_found(msg),
            ServiceError::InvalidInput(msg) => ApiError::bad_request(msg),
            ServiceError::Storage(store_err) => {
                // Log the real error but return generic message
                tracing::error!("Storage failure: {}", store_err);
                ApiError::internal_server_error("Server error").with_detail(store_err.to_string())
            }
        }
    }
}

impl From<RecordError> for ApiError {
    fn from(err: RecordError) -> Self {
        ApiError::bad_request(err.to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::bad_request(rejection.body_text())
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (self.status_code(), Json(self.to_json())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::store::StoreError;

    #[test]
    fn service_errors_map_to_status_codes() {
        let not_found: ApiError = ServiceError::NotFound("Map 1 not found".into()).into();
        assert_eq!(not_found.status_code(), StatusCode::NOT_FOUND);

        let invalid: ApiError = ServiceError::InvalidInput("Zones array is required".into()).into();
        assert_eq!(invalid.status_code(), StatusCode::BAD_REQUEST);

        let storage: ApiError = ServiceError::Storage(StoreError::Statement("boom".into())).into();
        assert_eq!(storage.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn error_body_uses_failure_envelope() {
        let body = ApiError::not_found("Map 7 not found").to_json();
        assert_eq!(body["success"], json!(false));
        assert_eq!(body["error"], json!("Map 7 not found"));
        assert_eq!(body["code"], json!("NOT_FOUND"));
    }

    #[test]
    fn storage_message_is_generic() {
        let err: ApiError = ServiceError::Storage(StoreError::Statement("DELETE FROM map".into())).into();
        assert_eq!(err.message(), "Server error");
    }
}
