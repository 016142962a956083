use std::sync::Arc;
use std::time::Duration;

use anyhow::anyhow;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::configs::Settings;
use crate::handles::*;
use crate::middlewares::TokenState;
use crate::services::*;
use crate::store::{SharedStore, create_store};

pub async fn create_app(settings: &Arc<Settings>) -> anyhow::Result<(Router, Arc<AppContext>)> {
    let store = create_store(&settings.store)?;
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let frames: Arc<dyn FrameSource> = Arc::new(HttpFrameSource::new(Duration::from_secs(
        settings.store.timeout_secs,
    ))?);

    build_app(settings, store, clock, frames).await
}

/// Wires every service and router on top of the given store, clock and
/// camera.
pub async fn build_app(
    settings: &Settings,
    store: SharedStore,
    clock: Arc<dyn Clock>,
    frames: Arc<dyn FrameSource>,
) -> anyhow::Result<(Router, Arc<AppContext>)> {
    let calendar = settings.dashboard.calendar()?;

    let mirror_service = Arc::new(MirrorService::new(store.clone(), clock.clone()));
    let command_service = Arc::new(CommandService::new(
        store.clone(),
        clock.clone(),
        Duration::from_secs(settings.dashboard.reset_buffer_secs),
    ));
    let event_log_service = Arc::new(EventLogService::new(
        store.clone(),
        clock.clone(),
        calendar,
        settings.dashboard.event_limit,
        settings.dashboard.visible_events,
    ));
    let analytics_service = Arc::new(AnalyticsService::new(store.clone(), clock.clone(), calendar));
    let control_service = Arc::new(ControlService::new(store.clone()));
    let schedule_service = Arc::new(ScheduleService::new(store.clone()));
    let camera_service = Arc::new(CameraService::new(store, clock, frames));

    let auth_service = Arc::new(
        AuthService::new(&settings.auth.username, &settings.auth.password)
            .map_err(|e| anyhow!("Failed to hash operator password: {}", e))?,
    );
    let token_service = Arc::new(TokenService::new(&settings.auth));

    let context = Arc::new(
        AppContext::init(
            &settings.context.preferences_path,
            mirror_service.clone(),
            command_service.clone(),
            event_log_service.clone(),
            camera_service.clone(),
        )
        .await?,
    );

    let token_state = TokenState {
        token_service: token_service.clone(),
    };

    let router = Router::new()
        .merge(auth_router(AuthState {
            auth_service,
            token_service,
        }))
        .merge(dashboard_router(
            DashboardState { mirror_service },
            token_state.clone(),
        ))
        .merge(control_router(
            ControlState {
                control_service,
                command_service,
            },
            token_state.clone(),
        ))
        .merge(analytics_router(
            AnalyticsState { analytics_service },
            token_state.clone(),
        ))
        .merge(event_router(
            EventState { event_log_service },
            token_state.clone(),
        ))
        .merge(schedule_router(
            ScheduleState { schedule_service },
            token_state.clone(),
        ))
        .merge(camera_router(
            CameraState { camera_service },
            token_state.clone(),
        ))
        .merge(preference_router(
            PreferenceState {
                context: context.clone(),
            },
            token_state,
        ))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    Ok((router, context))
}
