use axum::http::StatusCode;
use coopsync_analyser::ConversionError;

use super::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("{0}")]
    Busy(&'static str),

    #[error("Invalid dispense request: {0}")]
    InvalidRequest(#[from] ConversionError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl CommandError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            CommandError::Busy(_) => StatusCode::CONFLICT,
            CommandError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            CommandError::Store(e) => e.status_code(),
        }
    }
}
