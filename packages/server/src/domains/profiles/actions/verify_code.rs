//! Submit the one-time login code.

use telegram::Connection;
use tracing::{error, info};
use uuid::Uuid;

use crate::common::ProfileAuthError;
use crate::domains::profiles::auth_state::AuthState;
use crate::domains::profiles::models::{Profile, ProviderSession};
use crate::kernel::{provider, BaseProfileStore, BaseSessionStore, ServerDeps};

/// Result of a completed sign-in step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verified {
    pub phone: String,
    pub username: Option<String>,
}

/// Complete sign-in with the code delivered after [`start_auth`].
///
/// A rejection from the provider (wrong code, expired challenge) leaves
/// stored state untouched so the caller can retry with a fresh code via
/// `start_auth`. An account with two-factor auth enabled fails with
/// [`ProfileAuthError::PasswordRequired`], which callers route to
/// `verify_password`.
///
/// [`start_auth`]: crate::domains::profiles::actions::start_auth
pub async fn verify_code(
    deps: &ServerDeps,
    user_id: Uuid,
    phone: &str,
    code: &str,
) -> Result<Verified, ProfileAuthError> {
    let profile = deps
        .profiles
        .find_for_user(user_id, phone)
        .await?
        .ok_or(ProfileAuthError::ProfileNotFound)?;

    let session = deps.sessions.find_active(profile.id).await?;
    let credential = session.as_ref().and_then(|s| s.session_string.clone());

    let challenge = match AuthState::derive(&profile, credential.as_deref()) {
        AuthState::CodeSent { challenge } => challenge,
        _ => return Err(ProfileAuthError::ChallengeNotRequested),
    };

    let session = match session {
        Some(session) => session,
        None => deps.sessions.create(profile.id).await?,
    };

    let mut conn = match provider::acquire(deps, credential.as_deref()).await {
        Ok(conn) => conn,
        Err(e) => {
            error!(user_id = %user_id, phone = %phone, error = %e, "code verification failed");
            return Err(e.into());
        }
    };

    let outcome = run_verify(deps, &profile, &session, code, &challenge, conn.as_mut()).await;
    conn.disconnect().await;

    match outcome {
        Ok(result) => Ok(result),
        Err(e) => {
            error!(user_id = %user_id, phone = %phone, error = %e, "code verification failed");
            Err(e)
        }
    }
}

async fn run_verify(
    deps: &ServerDeps,
    profile: &Profile,
    session: &ProviderSession,
    code: &str,
    challenge: &str,
    conn: &mut dyn Connection,
) -> Result<Verified, ProfileAuthError> {
    provider::bounded(
        deps.provider_timeout,
        conn.sign_in(&profile.phone, code, challenge),
    )
    .await?;

    // Credential before flag: is_authorized must never point at empty
    // session material.
    deps.sessions
        .save_credential(session.id, &conn.export_session())
        .await?;

    let me = provider::bounded(deps.provider_timeout, conn.get_me()).await?;
    deps.profiles.complete_authorization(profile.id, &me).await?;

    info!(user_id = %profile.user_id, phone = %profile.phone, "profile authorized");
    Ok(Verified {
        phone: profile.phone.clone(),
        username: me.username,
    })
}
