use std::sync::Arc;

use axum::extract::{Path, State};
use axum::routing::{get, post, put};
use axum::{Extension, Json, Router, middleware};
use coopsync_api::models::*;

use crate::errors::ApiError;
use crate::middlewares::{TokenState, auth};
use crate::services::{CommandService, ControlService, TokenClaims};

#[derive(Clone)]
pub struct ControlState {
    pub control_service: Arc<ControlService>,
    pub command_service: Arc<CommandService>,
}

pub fn control_router(control_state: ControlState, token_state: TokenState) -> Router {
    Router::new()
        .route("/api/controls/:actuator", put(set_control))
        .route("/api/feed", post(feed))
        .route("/api/feed/status", get(get_dispense_status))
        .route("/api/water", post(water))
        .route_layer(middleware::from_fn_with_state(token_state, auth))
        .with_state(control_state)
}

#[utoipa::path(
    put,
    path = "/api/controls/{actuator}",
    tag = "control",
    params(
        ("actuator" = Actuator, Path, description = "fan, heat, pump or automation")
    ),
    request_body = ControlRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Switch written", body = ControlResponse),
        (status = 401, description = "Unauthorized"),
        (status = 502, description = "Store refused the write"),
        (status = 503, description = "Store unavailable")
    )
)]
pub async fn set_control(
    Extension(token_data): Extension<TokenClaims>,
    State(state): State<ControlState>,
    Path(actuator): Path<Actuator>,
    Json(body): Json<ControlRequest>,
) -> Result<Json<ControlResponse>, ApiError> {
    tracing::debug!("{} switches {:?}", token_data.sub, actuator);

    let response = state.control_service.set(actuator, body.enabled).await?;

    Ok(Json(response))
}

#[utoipa::path(
    post,
    path = "/api/feed",
    tag = "control",
    request_body = FeedRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Feeder triggered", body = DispenseResponse),
        (status = 400, description = "Invalid amount"),
        (status = 401, description = "Unauthorized"),
        (status = 409, description = "Feeder busy"),
        (status = 502, description = "Store refused a write"),
        (status = 503, description = "Store unavailable")
    )
)]
pub async fn feed(
    Extension(token_data): Extension<TokenClaims>,
    State(state): State<ControlState>,
    Json(body): Json<FeedRequest>,
) -> Result<Json<DispenseResponse>, ApiError> {
    tracing::debug!("{} requests feeding", token_data.sub);

    let response = state.command_service.feed(body).await?;

    Ok(Json(response))
}

#[utoipa::path(
    post,
    path = "/api/water",
    tag = "control",
    request_body = WaterRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Pump triggered", body = DispenseResponse),
        (status = 400, description = "Invalid amount or flow rate"),
        (status = 401, description = "Unauthorized"),
        (status = 409, description = "Pump busy"),
        (status = 502, description = "Store refused a write"),
        (status = 503, description = "Store unavailable")
    )
)]
pub async fn water(
    Extension(token_data): Extension<TokenClaims>,
    State(state): State<ControlState>,
    Json(body): Json<WaterRequest>,
) -> Result<Json<DispenseResponse>, ApiError> {
    tracing::debug!("{} requests watering", token_data.sub);

    let response = state.command_service.water(body).await?;

    Ok(Json(response))
}

#[utoipa::path(
    get,
    path = "/api/feed/status",
    tag = "control",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Whether a dispense is in progress", body = DispenseStatus),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn get_dispense_status(State(state): State<ControlState>) -> Json<DispenseStatus> {
    Json(state.command_service.status())
}
