use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{delete, get};
use axum::{Extension, Json, Router, middleware};
use coopsync_api::models::*;
use serde::Deserialize;

use crate::errors::ApiError;
use crate::middlewares::{TokenState, auth};
use crate::services::{EventLogService, TokenClaims};

#[derive(Clone)]
pub struct EventState {
    pub event_log_service: Arc<EventLogService>,
}

#[derive(Debug, Default, Deserialize)]
pub struct EventQuery {
    #[serde(default)]
    pub filter: EventFilter,
    #[serde(default)]
    pub show_all: bool,
}

pub fn event_router(event_state: EventState, token_state: TokenState) -> Router {
    Router::new()
        .route("/api/events", get(get_events))
        .route("/api/events/:event_id", delete(delete_event))
        .route_layer(middleware::from_fn_with_state(token_state, auth))
        .with_state(event_state)
}

#[utoipa::path(
    get,
    path = "/api/events",
    tag = "event",
    params(
        ("filter" = Option<EventFilter>, Query, description = "day, week, month or all"),
        ("show_all" = Option<bool>, Query, description = "Return every matching event instead of the first page")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Newest events first", body = EventListResponse),
        (status = 401, description = "Unauthorized"),
        (status = 503, description = "Store unavailable")
    )
)]
pub async fn get_events(
    State(state): State<EventState>,
    Query(query): Query<EventQuery>,
) -> Result<Json<EventListResponse>, ApiError> {
    let response = state
        .event_log_service
        .list(query.filter, query.show_all)
        .await?;

    Ok(Json(response))
}

#[utoipa::path(
    delete,
    path = "/api/events/{event_id}",
    tag = "event",
    params(
        ("event_id" = String, Path, description = "Store key of the event")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 204, description = "Event deleted"),
        (status = 400, description = "Invalid event key"),
        (status = 401, description = "Unauthorized"),
        (status = 502, description = "Store refused the delete"),
        (status = 503, description = "Store unavailable")
    )
)]
pub async fn delete_event(
    Extension(token_data): Extension<TokenClaims>,
    State(state): State<EventState>,
    Path(event_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    tracing::debug!("{} deletes event {}", token_data.sub, event_id);

    state.event_log_service.delete(&event_id).await?;

    Ok(StatusCode::NO_CONTENT)
}
