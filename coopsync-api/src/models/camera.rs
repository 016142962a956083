use serde::{Deserialize, Serialize};

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CameraSettings {
    /// Camera address, host or host:port
    pub ip: Option<String>,
}

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamRequest {
    /// Frames per second, 1 to 30
    #[serde(default = "default_fps")]
    pub fps: u32,
}

fn default_fps() -> u32 {
    5
}

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum StreamStatus {
    Idle,
    Streaming {
        fps: u32,
        /// Epoch milliseconds of the last frame, if any arrived yet
        last_frame_at: Option<i64>,
    },
}
