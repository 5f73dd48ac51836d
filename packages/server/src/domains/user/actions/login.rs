//! Application-account login

use tracing::info;

use crate::domains::user::actions::{hash_password, AccountError};
use crate::kernel::{BaseUserStore, ServerDeps};

/// Verify email + password and issue a bearer token.
///
/// Unknown email and wrong password are indistinguishable to the caller.
pub async fn login(deps: &ServerDeps, email: &str, password: &str) -> Result<String, AccountError> {
    let user = deps
        .users
        .find_by_email(email)
        .await?
        .ok_or(AccountError::InvalidCredentials)?;

    if user.password_hash != hash_password(password) {
        return Err(AccountError::InvalidCredentials);
    }

    deps.users.record_login(user.id).await?;
    let token = deps
        .jwt_service
        .create_token(user.id, user.email.clone())
        .map_err(AccountError::Storage)?;

    info!(user_id = %user.id, email = %email, "user logged in");
    Ok(token)
}
