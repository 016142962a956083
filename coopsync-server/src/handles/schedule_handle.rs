use std::sync::Arc;

use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router, middleware};
use coopsync_api::models::*;

use crate::errors::ApiError;
use crate::middlewares::{TokenState, auth};
use crate::services::ScheduleService;

#[derive(Clone)]
pub struct ScheduleState {
    pub schedule_service: Arc<ScheduleService>,
}

pub fn schedule_router(schedule_state: ScheduleState, token_state: TokenState) -> Router {
    Router::new()
        .route("/api/schedules/:kind", get(get_schedule))
        .route("/api/schedules/:kind/:hour", get(get_schedule_slot).put(set_schedule_slot))
        .route("/api/settings/water", get(get_water_settings).put(set_water_settings))
        .route("/api/settings/feeding", get(get_feeding_settings).put(set_feeding_settings))
        .route_layer(middleware::from_fn_with_state(token_state, auth))
        .with_state(schedule_state)
}

#[utoipa::path(
    get,
    path = "/api/schedules/{kind}",
    tag = "schedule",
    params(
        ("kind" = ScheduleKind, Path, description = "feeding or water")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "All 24 hourly slots", body = ScheduleResponse),
        (status = 401, description = "Unauthorized"),
        (status = 503, description = "Store unavailable")
    )
)]
pub async fn get_schedule(
    State(state): State<ScheduleState>,
    Path(kind): Path<ScheduleKind>,
) -> Result<Json<ScheduleResponse>, ApiError> {
    let schedule = state.schedule_service.get_schedule(kind).await?;

    Ok(Json(schedule))
}

#[utoipa::path(
    get,
    path = "/api/schedules/{kind}/{hour}",
    tag = "schedule",
    params(
        ("kind" = ScheduleKind, Path, description = "feeding or water"),
        ("hour" = u8, Path, description = "Hour of day, 0 to 23")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Slot state", body = ScheduleSlot),
        (status = 400, description = "Hour out of range"),
        (status = 401, description = "Unauthorized"),
        (status = 503, description = "Store unavailable")
    )
)]
pub async fn get_schedule_slot(
    State(state): State<ScheduleState>,
    Path((kind, hour)): Path<(ScheduleKind, u8)>,
) -> Result<Json<ScheduleSlot>, ApiError> {
    let slot = state.schedule_service.get_slot(kind, hour).await?;

    Ok(Json(slot))
}

#[utoipa::path(
    put,
    path = "/api/schedules/{kind}/{hour}",
    tag = "schedule",
    params(
        ("kind" = ScheduleKind, Path, description = "feeding or water"),
        ("hour" = u8, Path, description = "Hour of day, 0 to 23")
    ),
    request_body = ScheduleRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Slot written", body = ScheduleSlot),
        (status = 400, description = "Hour out of range"),
        (status = 401, description = "Unauthorized"),
        (status = 502, description = "Store refused the write"),
        (status = 503, description = "Store unavailable")
    )
)]
pub async fn set_schedule_slot(
    State(state): State<ScheduleState>,
    Path((kind, hour)): Path<(ScheduleKind, u8)>,
    Json(body): Json<ScheduleRequest>,
) -> Result<Json<ScheduleSlot>, ApiError> {
    let slot = state
        .schedule_service
        .set_slot(kind, hour, body.enabled)
        .await?;

    Ok(Json(slot))
}

#[utoipa::path(
    get,
    path = "/api/settings/water",
    tag = "schedule",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Pump settings", body = WaterSettings),
        (status = 401, description = "Unauthorized"),
        (status = 503, description = "Store unavailable")
    )
)]
pub async fn get_water_settings(
    State(state): State<ScheduleState>,
) -> Result<Json<WaterSettings>, ApiError> {
    let settings = state.schedule_service.water_settings().await?;

    Ok(Json(settings))
}

#[utoipa::path(
    put,
    path = "/api/settings/water",
    tag = "schedule",
    request_body = WaterSettings,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Pump settings written", body = WaterSettings),
        (status = 400, description = "Invalid flow rate"),
        (status = 401, description = "Unauthorized"),
        (status = 502, description = "Store refused the write"),
        (status = 503, description = "Store unavailable")
    )
)]
pub async fn set_water_settings(
    State(state): State<ScheduleState>,
    Json(body): Json<WaterSettings>,
) -> Result<Json<WaterSettings>, ApiError> {
    let settings = state.schedule_service.set_water_settings(body).await?;

    Ok(Json(settings))
}

#[utoipa::path(
    get,
    path = "/api/settings/feeding",
    tag = "schedule",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Flock settings", body = FeedingSettings),
        (status = 401, description = "Unauthorized"),
        (status = 503, description = "Store unavailable")
    )
)]
pub async fn get_feeding_settings(
    State(state): State<ScheduleState>,
) -> Result<Json<FeedingSettings>, ApiError> {
    let settings = state.schedule_service.feeding_settings().await?;

    Ok(Json(settings))
}

#[utoipa::path(
    put,
    path = "/api/settings/feeding",
    tag = "schedule",
    request_body = FeedingSettings,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Flock settings written", body = FeedingSettings),
        (status = 400, description = "Invalid chicken count"),
        (status = 401, description = "Unauthorized"),
        (status = 502, description = "Store refused the write"),
        (status = 503, description = "Store unavailable")
    )
)]
pub async fn set_feeding_settings(
    State(state): State<ScheduleState>,
    Json(body): Json<FeedingSettings>,
) -> Result<Json<FeedingSettings>, ApiError> {
    let settings = state.schedule_service.set_feeding_settings(body).await?;

    Ok(Json(settings))
}
