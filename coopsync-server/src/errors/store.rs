use axum::http::StatusCode;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("Realtime store is unavailable: {0}")]
    Unavailable(String),

    #[error("Realtime store rejected the write: {0}")]
    Rejected(String),

    #[error("Realtime store sent an unreadable response: {0}")]
    Malformed(String),

    #[error("Subscription to {0} was closed")]
    SubscriptionClosed(String),
}

impl StoreError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            StoreError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            StoreError::Rejected(_) => StatusCode::BAD_GATEWAY,
            StoreError::Malformed(_) => StatusCode::BAD_GATEWAY,
            StoreError::SubscriptionClosed(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}
