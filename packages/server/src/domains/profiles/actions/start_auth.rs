//! Start the login ceremony for a (user, phone) pair.

use telegram::Connection;
use tracing::{error, info};
use uuid::Uuid;

use crate::common::ProfileAuthError;
use crate::domains::profiles::models::{Profile, ProviderSession};
use crate::kernel::{provider, BaseProfileStore, BaseSessionStore, BaseUserStore, ServerDeps};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartAuthOutcome {
    /// The profile can be used as-is; no code was requested.
    AlreadyAuthorized { phone: String },
    /// A one-time code is on its way to the account's devices.
    CodeSent { phone: String },
}

/// Begin (or short-circuit) authorization of a profile.
///
/// The phone-ownership conflict is checked before anything touches the
/// provider, and an already-authorized profile never triggers a code request.
/// When the stored session turns out to still be signed in on the provider
/// side, storage is reconciled to that truth instead of forcing a fresh code.
pub async fn start_auth(
    deps: &ServerDeps,
    user_id: Uuid,
    phone: &str,
) -> Result<StartAuthOutcome, ProfileAuthError> {
    deps.users
        .find_by_id(user_id)
        .await?
        .ok_or(ProfileAuthError::UserNotFound)?;

    if let Some(owner) = deps.profiles.find_by_phone(phone).await? {
        if owner.user_id != user_id {
            return Err(ProfileAuthError::PhoneClaimedByOtherUser);
        }
    }

    let profile = match deps.profiles.find_for_user(user_id, phone).await? {
        Some(profile) => profile,
        None => deps.profiles.create(user_id, phone).await?,
    };

    if profile.is_authorized {
        info!(user_id = %user_id, phone = %phone, "profile already authorized");
        return Ok(StartAuthOutcome::AlreadyAuthorized {
            phone: profile.phone,
        });
    }

    // Session row materializes on first client construction.
    let session = match deps.sessions.find_active(profile.id).await? {
        Some(session) => session,
        None => deps.sessions.create(profile.id).await?,
    };

    let mut conn = match provider::acquire(deps, session.session_string.as_deref()).await {
        Ok(conn) => conn,
        Err(e) => {
            error!(user_id = %user_id, phone = %phone, error = %e, "auth start failed");
            return Err(e.into());
        }
    };

    let outcome = run_start(deps, &profile, &session, conn.as_mut()).await;
    conn.disconnect().await;

    match outcome {
        Ok(result) => Ok(result),
        Err(e) => {
            error!(user_id = %user_id, phone = %phone, error = %e, "auth start failed");
            Err(e)
        }
    }
}

async fn run_start(
    deps: &ServerDeps,
    profile: &Profile,
    session: &ProviderSession,
    conn: &mut dyn Connection,
) -> Result<StartAuthOutcome, ProfileAuthError> {
    if provider::bounded(deps.provider_timeout, conn.is_authorized()).await? {
        // The session survived from a previous run; reconcile storage with
        // provider truth without demanding a fresh code. Credential first so
        // the authorized flag never points at empty session material.
        deps.sessions
            .save_credential(session.id, &conn.export_session())
            .await?;
        deps.profiles.set_authorized(profile.id, true).await?;
        info!(
            user_id = %profile.user_id,
            phone = %profile.phone,
            "stored session still authorized on the provider"
        );
        return Ok(StartAuthOutcome::AlreadyAuthorized {
            phone: profile.phone.clone(),
        });
    }

    let sent = provider::bounded(
        deps.provider_timeout,
        conn.request_login_code(&profile.phone),
    )
    .await?;

    deps.sessions
        .save_credential(session.id, &conn.export_session())
        .await?;
    deps.profiles
        .set_challenge(profile.id, Some(&sent.phone_code_hash))
        .await?;

    info!(user_id = %profile.user_id, phone = %profile.phone, "login code sent");
    Ok(StartAuthOutcome::CodeSent {
        phone: profile.phone.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::{MockTelegram, TestDependencies};

    #[tokio::test]
    async fn unknown_user_is_rejected() {
        let test = TestDependencies::new();

        let err = start_auth(&test.deps, Uuid::new_v4(), "+15550001111")
            .await
            .unwrap_err();

        assert!(matches!(err, ProfileAuthError::UserNotFound));
        assert_eq!(test.telegram.connect_count(), 0);
    }

    #[tokio::test]
    async fn phone_claimed_by_another_user_is_a_conflict_before_any_provider_call() {
        let test = TestDependencies::new();
        let owner = test.seed_user("owner@example.org").await;
        let intruder = test.seed_user("intruder@example.org").await;
        test.deps
            .profiles
            .create(owner.id, "+15550001111")
            .await
            .unwrap();

        let err = start_auth(&test.deps, intruder.id, "+15550001111")
            .await
            .unwrap_err();

        assert!(matches!(err, ProfileAuthError::PhoneClaimedByOtherUser));
        assert_eq!(test.telegram.connect_count(), 0);
    }

    #[tokio::test]
    async fn locally_authorized_profile_short_circuits_without_a_code_request() {
        let test = TestDependencies::new();
        let user = test.seed_user("user@example.org").await;
        let profile = test
            .deps
            .profiles
            .create(user.id, "+15550001111")
            .await
            .unwrap();
        test.deps
            .profiles
            .set_authorized(profile.id, true)
            .await
            .unwrap();

        let outcome = start_auth(&test.deps, user.id, "+15550001111")
            .await
            .unwrap();

        assert_eq!(
            outcome,
            StartAuthOutcome::AlreadyAuthorized {
                phone: "+15550001111".to_string()
            }
        );
        assert_eq!(test.telegram.connect_count(), 0);
        assert!(test.telegram.code_requests().is_empty());
    }

    #[tokio::test]
    async fn provider_side_authorization_reconciles_storage() {
        let test = TestDependencies::with_telegram(MockTelegram::new().with_authorized());
        let user = test.seed_user("user@example.org").await;

        let outcome = start_auth(&test.deps, user.id, "+15550001111")
            .await
            .unwrap();

        assert!(matches!(outcome, StartAuthOutcome::AlreadyAuthorized { .. }));
        assert!(test.telegram.code_requests().is_empty());

        let profile = test
            .deps
            .profiles
            .find_for_user(user.id, "+15550001111")
            .await
            .unwrap()
            .unwrap();
        assert!(profile.is_authorized);

        // authorized implies non-empty stored credential
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
    async fn fresh_profile_gets_a_code_and_a_persisted_challenge() {
        let test = TestDependencies::new();
        let user = test.seed_user("user@example.org").await;

        let outcome = start_auth(&test.deps, user.id, "+15550001111")
            .await
            .unwrap();

        assert_eq!(
            outcome,
            StartAuthOutcome::CodeSent {
                phone: "+15550001111".to_string()
            }
        );
        assert_eq!(test.telegram.code_requests(), vec!["+15550001111"]);

        let profile = test
            .deps
            .profiles
            .find_for_user(user.id, "+15550001111")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(profile.phone_code_hash.as_deref(), Some("mock-code-hash"));
        assert!(!profile.is_authorized);

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
    async fn connect_failure_surfaces_as_unreachable_and_authorizes_nothing() {
        let test =
            TestDependencies::with_telegram(MockTelegram::new().with_connect_failure("dc down"));
        let user = test.seed_user("user@example.org").await;

        let err = start_auth(&test.deps, user.id, "+15550001111")
            .await
            .unwrap_err();

        assert!(matches!(err, ProfileAuthError::ProviderUnreachable(_)));
        let profile = test
            .deps
            .profiles
            .find_for_user(user.id, "+15550001111")
            .await
            .unwrap()
            .unwrap();
        assert!(!profile.is_authorized);
    }
}
