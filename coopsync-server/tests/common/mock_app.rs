use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, header};
use coopsync_analyser::Calendar;
use coopsync_server::configs::Auth;
use coopsync_server::errors::CameraError;
use coopsync_server::handles::*;
use coopsync_server::middlewares::TokenState;
use coopsync_server::services::*;
use coopsync_server::store::{MemoryStore, SharedStore};
use serde_json::Value;
use time::OffsetDateTime;
use time::macros::datetime;

/// Friday 2024-03-15 12:00 UTC
pub const NOW: OffsetDateTime = datetime!(2024-03-15 12:00 UTC);
pub const NOW_TS: i64 = 1710504000;

pub const USERNAME: &str = "admin";
pub const PASSWORD: &str = "admin123";

/// Camera that answers every capture with the requested address.
pub struct StubFrameSource;

#[async_trait]
impl FrameSource for StubFrameSource {
    async fn capture(&self, address: &str, at_millis: i64) -> Result<Frame, CameraError> {
        Ok(Frame {
            content_type: "image/jpeg".to_string(),
            bytes: address.as_bytes().to_vec(),
            captured_at: at_millis,
        })
    }
}

pub struct MockApp {
    pub store: MemoryStore,
    pub clock: Arc<FixedClock>,
    pub token: String,
    pub token_state: TokenState,
    pub auth_service: Arc<AuthService>,
    pub token_service: Arc<TokenService>,
    pub mirror_service: Arc<MirrorService>,
    pub command_service: Arc<CommandService>,
    pub event_log_service: Arc<EventLogService>,
    pub analytics_service: Arc<AnalyticsService>,
    pub control_service: Arc<ControlService>,
    pub schedule_service: Arc<ScheduleService>,
    pub camera_service: Arc<CameraService>,
    pub router: Router,
}

impl MockApp {
    pub async fn new() -> Self {
        Self::with_data(Value::Null).await
    }

    pub async fn with_data(data: Value) -> Self {
        let store = MemoryStore::with_data(data);
        let shared: SharedStore = Arc::new(store.clone());
        let clock = Arc::new(FixedClock::new(NOW));
        let dyn_clock: Arc<dyn Clock> = clock.clone();
        let calendar = Calendar::default();

        let auth_service = Arc::new(AuthService::new(USERNAME, PASSWORD).unwrap());
        let token_service = Arc::new(TokenService::new(&Auth {
            secret: String::from("test"),
            expiration: 1000,
            username: String::from(USERNAME),
            password: String::from(PASSWORD),
        }));
        let token = token_service.generate_token(USERNAME).unwrap().token;

        Self {
            mirror_service: Arc::new(MirrorService::new(shared.clone(), dyn_clock.clone())),
            command_service: Arc::new(CommandService::new(
                shared.clone(),
                dyn_clock.clone(),
                Duration::from_secs(5),
            )),
            event_log_service: Arc::new(EventLogService::new(
                shared.clone(),
                dyn_clock.clone(),
                calendar,
                100,
                15,
            )),
            analytics_service: Arc::new(AnalyticsService::new(
                shared.clone(),
                dyn_clock.clone(),
                calendar,
            )),
            control_service: Arc::new(ControlService::new(shared.clone())),
            schedule_service: Arc::new(ScheduleService::new(shared.clone())),
            camera_service: Arc::new(CameraService::new(
                shared,
                dyn_clock,
                Arc::new(StubFrameSource),
            )),
            token_state: TokenState {
                token_service: token_service.clone(),
            },
            store,
            clock,
            token,
            auth_service,
            token_service,
            router: Router::new(),
        }
    }

    pub fn with_auth_handle(mut self) -> Self {
        self.router = self.router.merge(auth_router(AuthState {
            auth_service: self.auth_service.clone(),
            token_service: self.token_service.clone(),
        }));
        self
    }

    pub fn with_dashboard_handle(mut self) -> Self {
        self.router = self.router.merge(dashboard_router(
            DashboardState {
                mirror_service: self.mirror_service.clone(),
            },
            self.token_state.clone(),
        ));
        self
    }

    pub fn with_control_handle(mut self) -> Self {
        self.router = self.router.merge(control_router(
            ControlState {
                control_service: self.control_service.clone(),
                command_service: self.command_service.clone(),
            },
            self.token_state.clone(),
        ));
        self
    }

    pub fn with_analytics_handle(mut self) -> Self {
        self.router = self.router.merge(analytics_router(
            AnalyticsState {
                analytics_service: self.analytics_service.clone(),
            },
            self.token_state.clone(),
        ));
        self
    }

    pub fn with_event_handle(mut self) -> Self {
        self.router = self.router.merge(event_router(
            EventState {
                event_log_service: self.event_log_service.clone(),
            },
            self.token_state.clone(),
        ));
        self
    }

    pub fn with_schedule_handle(mut self) -> Self {
        self.router = self.router.merge(schedule_router(
            ScheduleState {
                schedule_service: self.schedule_service.clone(),
            },
            self.token_state.clone(),
        ));
        self
    }

    pub fn with_camera_handle(mut self) -> Self {
        self.router = self.router.merge(camera_router(
            CameraState {
                camera_service: self.camera_service.clone(),
            },
            self.token_state.clone(),
        ));
        self
    }

    pub fn request(&self, method: Method, uri: &str) -> Request<Body> {
        Request::builder()
            .uri(uri)
            .method(method)
            .header(header::AUTHORIZATION, format!("Bearer {}", self.token))
            .body(Body::empty())
            .unwrap()
    }

    pub fn json_request(&self, method: Method, uri: &str, body: &Value) -> Request<Body> {
        Request::builder()
            .uri(uri)
            .method(method)
            .header(header::AUTHORIZATION, format!("Bearer {}", self.token))
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_string(body).unwrap()))
            .unwrap()
    }
}

pub async fn read_json(response: axum::response::Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();

    serde_json::from_slice(&body).unwrap()
}
