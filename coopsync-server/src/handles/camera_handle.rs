use std::sync::Arc;

use axum::extract::State;
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router, middleware};
use coopsync_api::models::*;

use crate::errors::ApiError;
use crate::middlewares::{TokenState, auth};
use crate::services::CameraService;

#[derive(Clone)]
pub struct CameraState {
    pub camera_service: Arc<CameraService>,
}

pub fn camera_router(camera_state: CameraState, token_state: TokenState) -> Router {
    Router::new()
        .route("/api/camera", get(get_camera).put(set_camera))
        .route("/api/camera/stream", post(start_stream).delete(stop_stream))
        .route("/api/camera/frame", get(get_frame))
        .route_layer(middleware::from_fn_with_state(token_state, auth))
        .with_state(camera_state)
}

#[utoipa::path(
    get,
    path = "/api/camera",
    tag = "camera",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Configured camera address", body = CameraSettings),
        (status = 401, description = "Unauthorized"),
        (status = 503, description = "Store unavailable")
    )
)]
pub async fn get_camera(State(state): State<CameraState>) -> Result<Json<CameraSettings>, ApiError> {
    let settings = state.camera_service.settings().await?;

    Ok(Json(settings))
}

#[utoipa::path(
    put,
    path = "/api/camera",
    tag = "camera",
    request_body = CameraSettings,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Camera address written; null clears it", body = CameraSettings),
        (status = 401, description = "Unauthorized"),
        (status = 502, description = "Store refused the write"),
        (status = 503, description = "Store unavailable")
    )
)]
pub async fn set_camera(
    State(state): State<CameraState>,
    Json(body): Json<CameraSettings>,
) -> Result<Json<CameraSettings>, ApiError> {
    let settings = state.camera_service.set_settings(body).await?;

    Ok(Json(settings))
}

#[utoipa::path(
    post,
    path = "/api/camera/stream",
    tag = "camera",
    request_body = StreamRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Stream running", body = StreamStatus),
        (status = 400, description = "Frame rate out of range"),
        (status = 401, description = "Unauthorized"),
        (status = 409, description = "Camera address not configured")
    )
)]
pub async fn start_stream(
    State(state): State<CameraState>,
    Json(body): Json<StreamRequest>,
) -> Result<Json<StreamStatus>, ApiError> {
    let status = state.camera_service.start(body.fps).await?;

    Ok(Json(status))
}

#[utoipa::path(
    delete,
    path = "/api/camera/stream",
    tag = "camera",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Stream stopped", body = StreamStatus),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn stop_stream(State(state): State<CameraState>) -> Json<StreamStatus> {
    Json(state.camera_service.stop().await)
}

#[utoipa::path(
    get,
    path = "/api/camera/frame",
    tag = "camera",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Latest camera image", content_type = "image/jpeg"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Stream has not produced a frame yet"),
        (status = 409, description = "Camera address not configured"),
        (status = 502, description = "Camera did not answer")
    )
)]
pub async fn get_frame(State(state): State<CameraState>) -> Result<Response, ApiError> {
    let frame = state.camera_service.frame().await?;

    Ok((
        [
            (header::CONTENT_TYPE, frame.content_type),
            (header::CACHE_CONTROL, "no-store".to_string()),
        ],
        frame.bytes,
    )
        .into_response())
}
