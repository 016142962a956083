use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use coopsync_api::models::{CameraSettings, StreamStatus};
use coopsync_api::paths::CAMERA_IP;
use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use serde_json::json;
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::errors::CameraError;
use crate::services::clock::Clock;
use crate::store::SharedStore;

pub const MAX_FPS: u32 = 30;

#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub content_type: String,
    pub bytes: Vec<u8>,
    /// Epoch milliseconds
    pub captured_at: i64,
}

#[async_trait]
pub trait FrameSource: Send + Sync {
    async fn capture(&self, address: &str, at_millis: i64) -> Result<Frame, CameraError>;
}

/// ESP32-CAM style snapshot endpoint.
pub struct HttpFrameSource {
    client: Client,
}

impl HttpFrameSource {
    pub fn new(timeout: Duration) -> Result<Self, CameraError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| CameraError::Capture(e.to_string()))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl FrameSource for HttpFrameSource {
    async fn capture(&self, address: &str, at_millis: i64) -> Result<Frame, CameraError> {
        // The timestamp defeats caches between the dashboard and the camera.
        let url = format!("http://{address}/capture?t={at_millis}");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(|e| CameraError::Capture(e.to_string()))?;

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or("image/jpeg")
            .to_string();

        let bytes = response
            .bytes()
            .await
            .map_err(|e| CameraError::Capture(e.to_string()))?;

        Ok(Frame {
            content_type,
            bytes: bytes.to_vec(),
            captured_at: at_millis,
        })
    }
}

enum StreamState {
    Idle,
    Streaming { fps: u32, task: JoinHandle<()> },
}

/// Polls the coop camera while a stream is running and keeps the latest
/// frame.
pub struct CameraService {
    store: SharedStore,
    clock: Arc<dyn Clock>,
    source: Arc<dyn FrameSource>,
    state: Mutex<StreamState>,
    latest: Arc<RwLock<Option<Frame>>>,
}

impl CameraService {
    pub fn new(store: SharedStore, clock: Arc<dyn Clock>, source: Arc<dyn FrameSource>) -> Self {
        Self {
            store,
            clock,
            source,
            state: Mutex::new(StreamState::Idle),
            latest: Arc::new(RwLock::new(None)),
        }
    }

    pub async fn settings(&self) -> Result<CameraSettings, CameraError> {
        let node = self.store.get(CAMERA_IP).await?;

        let ip = node
            .as_ref()
            .and_then(|value| value.as_str())
            .map(str::trim)
            .filter(|ip| !ip.is_empty())
            .map(str::to_string);

        Ok(CameraSettings { ip })
    }

    pub async fn set_settings(&self, settings: CameraSettings) -> Result<CameraSettings, CameraError> {
        let ip = settings
            .ip
            .map(|ip| ip.trim().to_string())
            .filter(|ip| !ip.is_empty());

        match &ip {
            Some(ip) => self.store.set(CAMERA_IP, json!(ip)).await?,
            None => self.store.remove(CAMERA_IP).await?,
        }

        Ok(CameraSettings { ip })
    }

    async fn address(&self) -> Result<String, CameraError> {
        self.settings().await?.ip.ok_or(CameraError::NotConfigured)
    }

    /// Starts polling at `fps`, replacing a running stream.
    pub async fn start(&self, fps: u32) -> Result<StreamStatus, CameraError> {
        if !(1..=MAX_FPS).contains(&fps) {
            return Err(CameraError::InvalidFps(fps));
        }

        let address = self.address().await?;

        let mut state = self.state.lock().await;
        if let StreamState::Streaming { task, .. } = &*state {
            task.abort();
        }
        *self.latest.write().await = None;

        let source = self.source.clone();
        let clock = self.clock.clone();
        let latest = self.latest.clone();
        let period = Duration::from_millis(1000 / fps as u64);

        let task = tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                interval.tick().await;

                match source.capture(&address, clock.now_millis()).await {
                    Ok(frame) => *latest.write().await = Some(frame),
                    Err(e) => tracing::debug!("Camera capture failed: {}", e),
                }
            }
        });

        *state = StreamState::Streaming { fps, task };
        tracing::info!("Camera stream started at {} fps", fps);

        Ok(StreamStatus::Streaming {
            fps,
            last_frame_at: None,
        })
    }

    pub async fn stop(&self) -> StreamStatus {
        let mut state = self.state.lock().await;

        if let StreamState::Streaming { task, .. } = std::mem::replace(&mut *state, StreamState::Idle) {
            task.abort();
            tracing::info!("Camera stream stopped");
        }

        StreamStatus::Idle
    }

    pub async fn status(&self) -> StreamStatus {
        match &*self.state.lock().await {
            StreamState::Idle => StreamStatus::Idle,
            StreamState::Streaming { fps, .. } => StreamStatus::Streaming {
                fps: *fps,
                last_frame_at: self.latest.read().await.as_ref().map(|frame| frame.captured_at),
            },
        }
    }

    /// Latest streamed frame, or a single capture when no stream runs.
    pub async fn frame(&self) -> Result<Frame, CameraError> {
        let streaming = matches!(&*self.state.lock().await, StreamState::Streaming { .. });

        if streaming {
            return self.latest.read().await.clone().ok_or(CameraError::NoFrame);
        }

        let address = self.address().await?;
        self.source.capture(&address, self.clock.now_millis()).await
    }
}
