use axum::http::StatusCode;

use super::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum EventError {
    #[error("Invalid event key: {0}")]
    InvalidKey(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl EventError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            EventError::InvalidKey(_) => StatusCode::BAD_REQUEST,
            EventError::Store(e) => e.status_code(),
        }
    }
}
