use axum::http::StatusCode;
use coopsync_analyser::AnalyserError;

use super::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum AnalyticsError {
    #[error("Could not compute chart: {0}")]
    Analysis(#[from] AnalyserError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl AnalyticsError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AnalyticsError::Analysis(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AnalyticsError::Store(e) => e.status_code(),
        }
    }
}
