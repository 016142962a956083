pub mod analytics;
pub mod api;
pub mod auth;
pub mod camera;
pub mod command;
pub mod context;
pub mod event;
pub mod setting;
pub mod store;

pub use analytics::AnalyticsError;
pub use api::ApiError;
pub use auth::AuthError;
pub use camera::CameraError;
pub use command::CommandError;
pub use context::ContextError;
pub use event::EventError;
pub use setting::SettingError;
pub use store::StoreError;

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use uuid::Uuid;

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_message, error_id) = match self {
            ApiError::AnalyticsError(AnalyticsError::Analysis(e)) => {
                let error_id = Uuid::new_v4();
                tracing::error!(error_id = ?error_id, "Analysis error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                    Some(error_id.to_string()),
                )
            }
            ApiError::AnalyticsError(e) => (e.status_code(), e.to_string(), None),
            ApiError::AuthError(e) => (e.status_code(), e.to_string(), None),
            ApiError::CameraError(e) => (e.status_code(), e.to_string(), None),
            ApiError::CommandError(e) => (e.status_code(), e.to_string(), None),
            ApiError::EventError(e) => (e.status_code(), e.to_string(), None),
            ApiError::SettingError(e) => (e.status_code(), e.to_string(), None),
            ApiError::StoreError(e) => {
                tracing::warn!("Store error: {}", e);
                (e.status_code(), e.to_string(), None)
            }
            ApiError::ContextError(e) => {
                let error_id = Uuid::new_v4();
                tracing::error!(error_id = ?error_id, "Context error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                    Some(error_id.to_string()),
                )
            }
            ApiError::InternalError(e) => {
                let error_id = Uuid::new_v4();
                tracing::error!(error_id = ?error_id, "Internal error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                    Some(error_id.to_string()),
                )
            }
        };

        let mut error_obj = json!({
            "code": status.as_u16(),
            "message": error_message
        });

        if status == StatusCode::SERVICE_UNAVAILABLE {
            error_obj["retryable"] = json!(true);
        }

        if let Some(error_id) = error_id {
            error_obj["error_id"] = json!(error_id);
        }

        let body = Json(json!({
            "error": error_obj
        }));

        (status, body).into_response()
    }
}
