use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use coopsync_api::models::Preferences;
use tokio::sync::RwLock;

use crate::errors::ContextError;
use crate::services::camera_service::CameraService;
use crate::services::command_service::CommandService;
use crate::services::event_log_service::EventLogService;
use crate::services::mirror_service::MirrorService;

/// Everything the dashboard keeps alive between requests: operator
/// preferences, live subscriptions, dispense timers and the camera stream.
///
/// Created once at startup with [`AppContext::init`] and torn down with
/// [`AppContext::shutdown`].
pub struct AppContext {
    preferences_path: PathBuf,
    preferences: RwLock<Preferences>,
    mirror: Arc<MirrorService>,
    commands: Arc<CommandService>,
    events: Arc<EventLogService>,
    camera: Arc<CameraService>,
}

impl AppContext {
    pub async fn init(
        preferences_path: impl Into<PathBuf>,
        mirror: Arc<MirrorService>,
        commands: Arc<CommandService>,
        events: Arc<EventLogService>,
        camera: Arc<CameraService>,
    ) -> Result<Self, ContextError> {
        let preferences_path = preferences_path.into();
        let preferences = load_preferences(&preferences_path).await?;

        // The store may be unreachable at startup; the dashboard then shows
        // disconnected and the operator retries with a refresh.
        if let Err(e) = mirror.start().await {
            tracing::warn!("Dashboard mirror not started: {}", e);
        }
        if let Err(e) = events.start().await {
            tracing::warn!("Event log not started: {}", e);
        }

        Ok(Self {
            preferences_path,
            preferences: RwLock::new(preferences),
            mirror,
            commands,
            events,
            camera,
        })
    }

    pub async fn preferences(&self) -> Preferences {
        self.preferences.read().await.clone()
    }

    pub async fn set_preferences(&self, preferences: Preferences) -> Result<Preferences, ContextError> {
        let mut current = self.preferences.write().await;
        save_preferences(&self.preferences_path, &preferences).await?;
        *current = preferences.clone();

        Ok(preferences)
    }

    pub async fn shutdown(&self) -> Result<(), ContextError> {
        self.commands.shutdown().await;
        self.camera.stop().await;
        self.events.stop().await;
        self.mirror.stop().await;

        let preferences = self.preferences.read().await.clone();
        save_preferences(&self.preferences_path, &preferences).await?;

        tracing::info!("Application context shut down");
        Ok(())
    }
}

async fn load_preferences(path: &Path) -> Result<Preferences, ContextError> {
    match tokio::fs::read_to_string(path).await {
        Ok(content) => Ok(toml::from_str(&content)?),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(Preferences::default()),
        Err(e) => Err(e.into()),
    }
}

async fn save_preferences(path: &Path, preferences: &Preferences) -> Result<(), ContextError> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }

    tokio::fs::write(path, toml::to_string(preferences)?).await?;
    Ok(())
}
