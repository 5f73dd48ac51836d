//! Application-account endpoints: register, login, me.

use axum::{extract::Extension, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domains::user::actions;
use crate::kernel::BaseUserStore;
use crate::server::app::AppState;
use crate::server::error::ApiError;
use crate::server::middleware::AuthUser;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: &'static str,
}

pub async fn register_handler(
    Extension(state): Extension<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    let token = actions::register(&state.server_deps, &request.email, &request.password).await?;
    Ok(Json(TokenResponse {
        access_token: token,
        token_type: "bearer",
    }))
}

pub async fn login_handler(
    Extension(state): Extension<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    let token = actions::login(&state.server_deps, &request.email, &request.password).await?;
    Ok(Json(TokenResponse {
        access_token: token,
        token_type: "bearer",
    }))
}

#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub id: Uuid,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

pub async fn me_handler(
    user: AuthUser,
    Extension(state): Extension<AppState>,
) -> Result<Json<MeResponse>, ApiError> {
    let record = state
        .server_deps
        .users
        .find_by_id(user.user_id)
        .await?
        .ok_or_else(|| ApiError::unauthorized("account no longer exists"))?;

    Ok(Json(MeResponse {
        id: record.id,
        email: record.email,
        created_at: record.created_at,
    }))
}
