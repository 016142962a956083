use std::sync::Arc;

use axum::extract::State;
use axum::response::Sse;
use axum::response::sse::{Event, KeepAlive};
use axum::routing::{get, post};
use axum::{Json, Router, middleware};
use coopsync_api::models::DashboardSnapshot;
use serde_json::{Value, json};
use tokio_stream::wrappers::WatchStream;
use tokio_stream::{Stream, StreamExt};

use crate::errors::ApiError;
use crate::middlewares::{TokenState, auth};
use crate::services::MirrorService;

#[derive(Clone)]
pub struct DashboardState {
    pub mirror_service: Arc<MirrorService>,
}

pub fn dashboard_router(dashboard_state: DashboardState, token_state: TokenState) -> Router {
    Router::new()
        .route("/api/dashboard", get(get_dashboard))
        .route("/api/dashboard/refresh", post(refresh_dashboard))
        .route("/api/dashboard/sse", get(stream_dashboard))
        .route_layer(middleware::from_fn_with_state(token_state, auth))
        .route("/api/health", get(health))
        .with_state(dashboard_state)
}

#[utoipa::path(
    get,
    path = "/api/health",
    tag = "dashboard",
    responses(
        (status = 200, description = "Service is up; reports whether the store is reachable")
    )
)]
pub async fn health(State(state): State<DashboardState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "connected": state.mirror_service.snapshot().connected,
    }))
}

#[utoipa::path(
    get,
    path = "/api/dashboard",
    tag = "dashboard",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Current mirrored coop state", body = DashboardSnapshot),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn get_dashboard(State(state): State<DashboardState>) -> Json<DashboardSnapshot> {
    Json(state.mirror_service.snapshot())
}

#[utoipa::path(
    post,
    path = "/api/dashboard/refresh",
    tag = "dashboard",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "State read again from the store", body = DashboardSnapshot),
        (status = 401, description = "Unauthorized"),
        (status = 503, description = "Store unavailable, retry later")
    )
)]
pub async fn refresh_dashboard(
    State(state): State<DashboardState>,
) -> Result<Json<DashboardSnapshot>, ApiError> {
    let snapshot = state.mirror_service.refresh().await?;

    Ok(Json(snapshot))
}

#[utoipa::path(
    get,
    path = "/api/dashboard/sse",
    tag = "dashboard",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Event stream of dashboard snapshots"),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn stream_dashboard(
    State(state): State<DashboardState>,
) -> Sse<impl Stream<Item = Result<Event, axum::Error>>> {
    let stream = WatchStream::new(state.mirror_service.watch())
        .map(|snapshot| Event::default().event("snapshot").json_data(snapshot));

    Sse::new(stream).keep_alive(KeepAlive::default())
}
