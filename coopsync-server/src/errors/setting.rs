use axum::http::StatusCode;

use super::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum SettingError {
    #[error("Hour must be between 0 and 23, got {0}")]
    InvalidHour(u8),

    #[error("Flow rate must be a positive number")]
    InvalidFlowRate,

    #[error("Chicken count must be at least 1")]
    InvalidChickenCount,

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl SettingError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            SettingError::InvalidHour(_) => StatusCode::BAD_REQUEST,
            SettingError::InvalidFlowRate => StatusCode::BAD_REQUEST,
            SettingError::InvalidChickenCount => StatusCode::BAD_REQUEST,
            SettingError::Store(e) => e.status_code(),
        }
    }
}
