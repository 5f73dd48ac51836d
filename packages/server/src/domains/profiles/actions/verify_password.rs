//! Submit the two-factor password.

use telegram::Connection;
use tracing::{error, info};
use uuid::Uuid;

use crate::common::ProfileAuthError;
use crate::domains::profiles::actions::verify_code::Verified;
use crate::domains::profiles::models::{Profile, ProviderSession};
use crate::kernel::{provider, BaseProfileStore, BaseSessionStore, ServerDeps};

/// Finish sign-in for an account with two-factor auth enabled.
///
/// Unlike `verify_code` there is no pending-challenge precondition: the
/// provider tracks the 2FA state of the sign-in attempt server-side. On
/// rejection nothing is mutated.
pub async fn verify_password(
    deps: &ServerDeps,
    user_id: Uuid,
    phone: &str,
    password: &str,
) -> Result<Verified, ProfileAuthError> {
    let profile = deps
        .profiles
        .find_for_user(user_id, phone)
        .await?
        .ok_or(ProfileAuthError::ProfileNotFound)?;

    let session = match deps.sessions.find_active(profile.id).await? {
        Some(session) => session,
        None => deps.sessions.create(profile.id).await?,
    };

    let mut conn = match provider::acquire(deps, session.session_string.as_deref()).await {
        Ok(conn) => conn,
        Err(e) => {
            error!(user_id = %user_id, phone = %phone, error = %e, "password verification failed");
            return Err(e.into());
        }
    };

    let outcome = run_verify(deps, &profile, &session, password, conn.as_mut()).await;
    conn.disconnect().await;

    match outcome {
        Ok(result) => Ok(result),
        Err(e) => {
            error!(user_id = %user_id, phone = %phone, error = %e, "password verification failed");
            Err(e)
        }
    }
}

async fn run_verify(
    deps: &ServerDeps,
    profile: &Profile,
    session: &ProviderSession,
    password: &str,
    conn: &mut dyn Connection,
) -> Result<Verified, ProfileAuthError> {
    provider::bounded(deps.provider_timeout, conn.check_password(password)).await?;

    deps.sessions
        .save_credential(session.id, &conn.export_session())
        .await?;

    let me = provider::bounded(deps.provider_timeout, conn.get_me()).await?;
    deps.profiles.complete_authorization(profile.id, &me).await?;

    info!(
        user_id = %profile.user_id,
        phone = %profile.phone,
        "profile authorized with password"
    );
    Ok(Verified {
        phone: profile.phone.clone(),
        username: me.username,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::profiles::actions::{start_auth, verify_code};
    use crate::kernel::{MockTelegram, TestDependencies};

    async fn at_password_step(test: &TestDependencies) -> (Uuid, String) {
        let user = test.seed_user("user@example.org").await;
        start_auth(&test.deps, user.id, "+15550001111")
            .await
            .unwrap();
        let err = verify_code(&test.deps, user.id, "+15550001111", "22222")
            .await
            .unwrap_err();
        assert!(matches!(err, ProfileAuthError::PasswordRequired));
        (user.id, "+15550001111".to_string())
    }

    #[tokio::test]
    async fn accepts_the_password_and_authorizes() {
        let test = TestDependencies::with_telegram(MockTelegram::new().with_password_required());
        let (user_id, phone) = at_password_step(&test).await;

        let verified = verify_password(&test.deps, user_id, &phone, "hunter2")
            .await
            .unwrap();
        assert_eq!(verified.phone, phone);

        let profile = test
            .deps
            .profiles
            .find_for_user(user_id, &phone)
            .await
            .unwrap()
            .unwrap();
        assert!(profile.is_authorized);
        assert!(profile.phone_code_hash.is_none());

        let session = test
            .deps
            .sessions
            .find_active(profile.id)
            .await
            .unwrap()
            .unwrap();
        assert!(session.session_string.is_some_and(|s| !s.is_empty()));
    }

    #[tokio::test]
    async fn rejection_mutates_nothing() {
        let test = TestDependencies::with_telegram(
            MockTelegram::new()
                .with_password_required()
                .with_password_rejection("the password is not valid"),
        );
        let (user_id, phone) = at_password_step(&test).await;

        let err = verify_password(&test.deps, user_id, &phone, "wrong")
            .await
            .unwrap_err();
        assert!(matches!(err, ProfileAuthError::AuthRejected(_)));

        let profile = test
            .deps
            .profiles
            .find_for_user(user_id, &phone)
            .await
            .unwrap()
            .unwrap();
        assert!(!profile.is_authorized);
    }

    #[tokio::test]
    async fn missing_profile_is_rejected() {
        let test = TestDependencies::new();
        let user = test.seed_user("user@example.org").await;

        let err = verify_password(&test.deps, user.id, "+15550001111", "hunter2")
            .await
            .unwrap_err();
        assert!(matches!(err, ProfileAuthError::ProfileNotFound));
    }
}
