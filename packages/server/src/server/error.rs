//! Uniform error envelope for the HTTP surface.
//!
//! Domain errors never cross this boundary as panics or raw internals; they
//! become `{status: "error", message}` with a matching HTTP status.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use tracing::error;

use crate::common::ProfileAuthError;
use crate::domains::user::AccountError;

#[derive(Serialize)]
struct ErrorBody {
    status: &'static str,
    message: String,
}

pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn unauthorized(message: &str) -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            message: message.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorBody {
                status: "error",
                message: self.message,
            }),
        )
            .into_response()
    }
}

impl From<ProfileAuthError> for ApiError {
    fn from(err: ProfileAuthError) -> Self {
        let status = match &err {
            ProfileAuthError::UserNotFound
            | ProfileAuthError::ProfileNotFound
            | ProfileAuthError::SessionNotFound
            | ProfileAuthError::EntityNotFound(_) => StatusCode::NOT_FOUND,
            ProfileAuthError::PhoneClaimedByOtherUser => StatusCode::CONFLICT,
            ProfileAuthError::ChallengeNotRequested
            | ProfileAuthError::ProfileNotAuthorized
            | ProfileAuthError::AuthRejected(_)
            | ProfileAuthError::PasswordRequired => StatusCode::BAD_REQUEST,
            ProfileAuthError::SessionExpired => StatusCode::UNAUTHORIZED,
            ProfileAuthError::ProviderUnreachable(_) => StatusCode::BAD_GATEWAY,
            ProfileAuthError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let message = match &err {
            // Storage details stay in the logs.
            ProfileAuthError::Storage(_) => {
                error!(error = %err, "storage failure");
                "internal error".to_string()
            }
            _ => err.to_string(),
        };

        Self { status, message }
    }
}

impl From<AccountError> for ApiError {
    fn from(err: AccountError) -> Self {
        let status = match &err {
            AccountError::EmailTaken => StatusCode::CONFLICT,
            AccountError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AccountError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let message = match &err {
            AccountError::Storage(_) => {
                error!(error = %err, "storage failure");
                "internal error".to_string()
            }
            _ => err.to_string(),
        };

        Self { status, message }
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        error!(error = %err, "internal error");
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: "internal error".to_string(),
        }
    }
}
