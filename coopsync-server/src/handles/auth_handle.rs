use std::sync::Arc;

use anyhow::anyhow;
use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use coopsync_api::models::{LoginRequest, TokenResponse};

use crate::errors::{ApiError, AuthError};
use crate::services::{AuthService, TokenService};

#[derive(Clone)]
pub struct AuthState {
    pub auth_service: Arc<AuthService>,
    pub token_service: Arc<TokenService>,
}

pub fn auth_router(auth_state: AuthState) -> Router {
    Router::new()
        .route("/api/auth/login", post(login))
        .with_state(auth_state)
}

#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful, return bearer token", body = TokenResponse),
        (status = 400, description = "Invalid request parameters"),
        (status = 401, description = "Invalid username or password"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn login(
    State(state): State<AuthState>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    if body.username.is_empty() || body.password.is_empty() {
        return Err(AuthError::InvalidRequest.into());
    }

    let result = state
        .auth_service
        .verify(&body.username, &body.password)
        .map_err(|e| anyhow!("Failed to verify password: {}", e))?;

    if !result {
        tracing::warn!("Rejected login for {}", body.username);
        return Err(AuthError::InvalidCredentials.into());
    }

    let token = state
        .token_service
        .generate_token(&body.username)
        .map_err(|e| anyhow!("Failed to generate token: {}", e))?;

    Ok(Json(TokenResponse {
        token: token.token,
        expires_at: token.exp,
    }))
}
