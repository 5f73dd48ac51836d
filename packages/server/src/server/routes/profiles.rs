//! Profile authorization endpoints: list, start, code, password.

use axum::{extract::Extension, Json};
use serde::{Deserialize, Serialize};

use crate::domains::profiles::actions::{self, ProfileSummary, StartAuthOutcome};
use crate::server::app::AppState;
use crate::server::error::ApiError;
use crate::server::middleware::AuthUser;

#[derive(Debug, Deserialize)]
pub struct PhoneRequest {
    pub phone: String,
}

#[derive(Debug, Deserialize)]
pub struct CodeRequest {
    pub phone: String,
    pub code: String,
}

#[derive(Debug, Deserialize)]
pub struct PasswordRequest {
    pub phone: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct StartAuthResponse {
    pub status: &'static str,
    pub message: &'static str,
    pub phone: String,
}

pub async fn start_auth_handler(
    user: AuthUser,
    Extension(state): Extension<AppState>,
    Json(request): Json<PhoneRequest>,
) -> Result<Json<StartAuthResponse>, ApiError> {
    let outcome = actions::start_auth(&state.server_deps, user.user_id, &request.phone).await?;

    let response = match outcome {
        StartAuthOutcome::AlreadyAuthorized { phone } => StartAuthResponse {
            status: "already_authorized",
            message: "this profile is already authorized",
            phone,
        },
        StartAuthOutcome::CodeSent { phone } => StartAuthResponse {
            status: "code_sent",
            message: "a login code was sent to the account's devices",
            phone,
        },
    };
    Ok(Json(response))
}

#[derive(Debug, Serialize)]
pub struct VerifiedResponse {
    pub status: &'static str,
    pub message: &'static str,
    pub phone: String,
    pub username: Option<String>,
}

pub async fn verify_code_handler(
    user: AuthUser,
    Extension(state): Extension<AppState>,
    Json(request): Json<CodeRequest>,
) -> Result<Json<VerifiedResponse>, ApiError> {
    let verified = actions::verify_code(
        &state.server_deps,
        user.user_id,
        &request.phone,
        &request.code,
    )
    .await?;

    Ok(Json(VerifiedResponse {
        status: "success",
        message: "authorization complete",
        phone: verified.phone,
        username: verified.username,
    }))
}

pub async fn verify_password_handler(
    user: AuthUser,
    Extension(state): Extension<AppState>,
    Json(request): Json<PasswordRequest>,
) -> Result<Json<VerifiedResponse>, ApiError> {
    let verified = actions::verify_password(
        &state.server_deps,
        user.user_id,
        &request.phone,
        &request.password,
    )
    .await?;

    Ok(Json(VerifiedResponse {
        status: "success",
        message: "authorization complete",
        phone: verified.phone,
        username: verified.username,
    }))
}

#[derive(Debug, Serialize)]
pub struct ProfileListResponse {
    pub status: &'static str,
    pub profiles: Vec<ProfileSummary>,
}

pub async fn list_profiles_handler(
    user: AuthUser,
    Extension(state): Extension<AppState>,
) -> Result<Json<ProfileListResponse>, ApiError> {
    let profiles = actions::list_profiles(&state.server_deps, user.user_id).await?;
    Ok(Json(ProfileListResponse {
        status: "success",
        profiles,
    }))
}
