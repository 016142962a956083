use std::sync::Arc;

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router, middleware};
use coopsync_api::models::Preferences;

use crate::errors::ApiError;
use crate::middlewares::{TokenState, auth};
use crate::services::AppContext;

#[derive(Clone)]
pub struct PreferenceState {
    pub context: Arc<AppContext>,
}

pub fn preference_router(preference_state: PreferenceState, token_state: TokenState) -> Router {
    Router::new()
        .route("/api/preferences", get(get_preferences).put(set_preferences))
        .route_layer(middleware::from_fn_with_state(token_state, auth))
        .with_state(preference_state)
}

#[utoipa::path(
    get,
    path = "/api/preferences",
    tag = "preference",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Operator preferences", body = Preferences),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn get_preferences(State(state): State<PreferenceState>) -> Json<Preferences> {
    Json(state.context.preferences().await)
}

#[utoipa::path(
    put,
    path = "/api/preferences",
    tag = "preference",
    request_body = Preferences,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Preferences saved", body = Preferences),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Preferences file could not be written")
    )
)]
pub async fn set_preferences(
    State(state): State<PreferenceState>,
    Json(body): Json<Preferences>,
) -> Result<Json<Preferences>, ApiError> {
    let preferences = state.context.set_preferences(body).await?;

    Ok(Json(preferences))
}
