//! Messaging endpoints: unread, send, dialogs.

use axum::{extract::Extension, Json};
use serde::{Deserialize, Serialize};

use crate::domains::messages::actions;
use crate::domains::messages::models::{DialogSummary, UnreadMessage};
use crate::server::app::AppState;
use crate::server::error::ApiError;
use crate::server::middleware::AuthUser;

fn default_limit() -> usize {
    50
}

#[derive(Debug, Deserialize)]
pub struct MessagesRequest {
    pub phone: String,
    #[serde(default = "default_limit")]
    pub limit: usize,
}

#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    pub phone: String,
    pub text: String,
    pub receiver: String,
}

#[derive(Debug, Deserialize)]
pub struct DialogsRequest {
    pub phone: String,
    #[serde(default = "default_limit")]
    pub limit: usize,
}

#[derive(Debug, Serialize)]
pub struct UnreadResponse {
    pub status: &'static str,
    pub count: usize,
    pub messages: Vec<UnreadMessage>,
}

pub async fn unread_handler(
    user: AuthUser,
    Extension(state): Extension<AppState>,
    Json(request): Json<MessagesRequest>,
) -> Result<Json<UnreadResponse>, ApiError> {
    let batch = actions::fetch_unread(
        &state.server_deps,
        user.user_id,
        &request.phone,
        request.limit,
    )
    .await?;

    Ok(Json(UnreadResponse {
        status: "success",
        count: batch.count,
        messages: batch.messages,
    }))
}

#[derive(Debug, Serialize)]
pub struct SentResponse {
    pub status: &'static str,
    pub message: &'static str,
}

pub async fn send_handler(
    user: AuthUser,
    Extension(state): Extension<AppState>,
    Json(request): Json<SendMessageRequest>,
) -> Result<Json<SentResponse>, ApiError> {
    actions::send_message(
        &state.server_deps,
        user.user_id,
        &request.phone,
        &request.text,
        &request.receiver,
    )
    .await?;

    Ok(Json(SentResponse {
        status: "success",
        message: "message sent",
    }))
}

#[derive(Debug, Serialize)]
pub struct DialogsResponse {
    pub status: &'static str,
    pub dialogs: Vec<DialogSummary>,
}

pub async fn dialogs_handler(
    user: AuthUser,
    Extension(state): Extension<AppState>,
    Json(request): Json<DialogsRequest>,
) -> Result<Json<DialogsResponse>, ApiError> {
    let dialogs = actions::list_dialogs(
        &state.server_deps,
        user.user_id,
        &request.phone,
        request.limit,
    )
    .await?;

    Ok(Json(DialogsResponse {
        status: "success",
        dialogs,
    }))
}
