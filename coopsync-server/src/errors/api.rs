use super::{
    AnalyticsError, AuthError, CameraError, CommandError, ContextError, EventError, SettingError,
    StoreError,
};

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Analytics error: {0}")]
    AnalyticsError(#[from] AnalyticsError),

    #[error("Authentication error: {0}")]
    AuthError(#[from] AuthError),

    #[error("Camera error: {0}")]
    CameraError(#[from] CameraError),

    #[error("Command error: {0}")]
    CommandError(#[from] CommandError),

    #[error("Context error: {0}")]
    ContextError(#[from] ContextError),

    #[error("Event error: {0}")]
    EventError(#[from] EventError),

    #[error("Setting error: {0}")]
    SettingError(#[from] SettingError),

    #[error("Store error: {0}")]
    StoreError(#[from] StoreError),

    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}
