use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use serde_json::{json, Map, Value};

/// Wrapper for API responses that automatically adds success envelope.
///
/// Object payloads are flattened into the envelope, so `{"map": ...}`
/// is sent as `{"success": true, "map": ...}`. Any other payload is
/// placed under `data`.
#[derive(Debug)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub message: Option<String>,
    pub status_code: Option<StatusCode>,
}

impl<T: Serialize> ApiResponse<T> {
    /// Create a successful API response with default 200 status
    pub fn success(data: T) -> Self {
        Self {
            data,
            message: None,
            status_code: None, // Default to 200 OK
        }
    }

    /// Create an API response with custom status code
    pub fn with_status(data: T, status_code: StatusCode) -> Self {
        Self {
            data,
            message: None,
            status_code: Some(status_code),
        }
    }

    /// Create a 201 Created response
    pub fn created(data: T) -> Self {
        Self::with_status(data, StatusCode::CREATED)
    }

    /// Attach a human-readable `message` to the envelope
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let status = self.status_code.unwrap_or(StatusCode::OK);

        let data_value = match serde_json::to_value(&self.data) {
            Ok(value) => value,
            Err(e) => {
                tracing::error!("Failed to serialize response data: {}", e);
                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({
                        "success": false,
                        "error": "Failed to serialize response data",
                        "code": "INTERNAL_SERVER_ERROR"
                    })),
                )
                    .into_response();
            }
        };

        let mut envelope = Map::new();
        envelope.insert("success".to_string(), Value::Bool(true));
        match data_value {
            Value::Object(fields) => envelope.extend(fields),
            Value::Null => {}
            other => {
                envelope.insert("data".to_string(), other);
            }
        }
        if let Some(message) = self.message {
            envelope.insert("message".to_string(), Value::String(message));
        }

        (status, Json(Value::Object(envelope))).into_response()
    }
}

pub type ApiResult<T> = Result<ApiResponse<T>, crate::error::ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_of(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn object_payload_is_flattened() {
        let response = ApiResponse::success(json!({"zones": []}))
            .with_message("0 zones saved")
            .into_response();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_of(response).await,
            json!({"success": true, "zones": [], "message": "0 zones saved"})
        );
    }

    #[tokio::test]
    async fn created_sets_status() {
        let response = ApiResponse::created(json!({"zone": {"id": "z1"}})).into_response();
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(body_of(response).await["zone"]["id"], json!("z1"));
    }

    #[tokio::test]
    async fn unit_payload_carries_only_message() {
        let response = ApiResponse::success(()).with_message("Zone deleted successfully").into_response();
        assert_eq!(
            body_of(response).await,
            json!({"success": true, "message": "Zone deleted successfully"})
        );
    }
}
