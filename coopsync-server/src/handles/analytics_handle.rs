use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::routing::get;
use axum::{Json, Router, middleware};
use coopsync_api::models::*;
use serde::Deserialize;

use crate::errors::ApiError;
use crate::middlewares::{TokenState, auth};
use crate::services::AnalyticsService;

#[derive(Clone)]
pub struct AnalyticsState {
    pub analytics_service: Arc<AnalyticsService>,
}

#[derive(Debug, Default, Deserialize)]
pub struct AnalyticsQuery {
    #[serde(default)]
    pub period: Period,
    #[serde(default)]
    pub compare: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct HistoryQuery {
    #[serde(default)]
    pub period: Period,
    pub page: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
pub struct HydrationQuery {
    pub chicken_count: Option<u32>,
}

pub fn analytics_router(analytics_state: AnalyticsState, token_state: TokenState) -> Router {
    Router::new()
        .route("/api/analytics/:source", get(get_analytics))
        .route("/api/history", get(get_history))
        .route("/api/hydration", get(get_hydration))
        .route_layer(middleware::from_fn_with_state(token_state, auth))
        .with_state(analytics_state)
}

#[utoipa::path(
    get,
    path = "/api/analytics/{source}",
    tag = "analytics",
    params(
        ("source" = LogSource, Path, description = "feeding or water"),
        ("period" = Option<Period>, Query, description = "day, week or month"),
        ("compare" = Option<bool>, Query, description = "Include the previous period")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Chart points and summary", body = AnalyticsResponse),
        (status = 401, description = "Unauthorized"),
        (status = 503, description = "Store unavailable")
    )
)]
pub async fn get_analytics(
    State(state): State<AnalyticsState>,
    Path(source): Path<LogSource>,
    Query(query): Query<AnalyticsQuery>,
) -> Result<Json<AnalyticsResponse>, ApiError> {
    let response = state
        .analytics_service
        .analytics(source, query.period, query.compare)
        .await?;

    Ok(Json(response))
}

#[utoipa::path(
    get,
    path = "/api/history",
    tag = "analytics",
    params(
        ("period" = Option<Period>, Query, description = "day, week or month"),
        ("page" = Option<usize>, Query, description = "Zero-based page, defaults to the most recent")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "One page of temperature and humidity readings", body = HistoryResponse),
        (status = 401, description = "Unauthorized"),
        (status = 503, description = "Store unavailable")
    )
)]
pub async fn get_history(
    State(state): State<AnalyticsState>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<HistoryResponse>, ApiError> {
    let response = state
        .analytics_service
        .history(query.period, query.page)
        .await?;

    Ok(Json(response))
}

#[utoipa::path(
    get,
    path = "/api/hydration",
    tag = "analytics",
    params(
        ("chicken_count" = Option<u32>, Query, description = "Overrides the stored flock size")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Water per bird today", body = HydrationResponse),
        (status = 401, description = "Unauthorized"),
        (status = 503, description = "Store unavailable")
    )
)]
pub async fn get_hydration(
    State(state): State<AnalyticsState>,
    Query(query): Query<HydrationQuery>,
) -> Result<Json<HydrationResponse>, ApiError> {
    let response = state
        .analytics_service
        .hydration(query.chicken_count)
        .await?;

    Ok(Json(response))
}
