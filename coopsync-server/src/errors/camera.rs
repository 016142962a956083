use axum::http::StatusCode;

use super::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum CameraError {
    #[error("Camera address is not configured")]
    NotConfigured,

    #[error("Frame rate must be between 1 and 30, got {0}")]
    InvalidFps(u32),

    #[error("No frame has been captured yet")]
    NoFrame,

    #[error("Camera capture failed: {0}")]
    Capture(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl CameraError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            CameraError::NotConfigured => StatusCode::CONFLICT,
            CameraError::InvalidFps(_) => StatusCode::BAD_REQUEST,
            CameraError::NoFrame => StatusCode::NOT_FOUND,
            CameraError::Capture(_) => StatusCode::BAD_GATEWAY,
            CameraError::Store(e) => e.status_code(),
        }
    }
}
