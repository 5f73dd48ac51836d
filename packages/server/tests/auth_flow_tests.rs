//! End-to-end login ceremony against the in-process sandbox provider.
//!
//! These tests drive the real orchestrator and gateway actions over
//! in-memory stores, with the sandbox playing the provider: credentials
//! exported by one connection are replayed by the next, exactly like a
//! persisted real session.

use chrono::Utc;
use telegram::sandbox::{SandboxAccount, SandboxTelegram};
use telegram::{Dialog, Message};

use server_core::common::ProfileAuthError;
use server_core::domains::messages::actions::{fetch_unread, send_message};
use server_core::domains::profiles::actions::{
    list_profiles, start_auth, verify_code, verify_password, StartAuthOutcome,
};
use server_core::kernel::{
    BaseProfileStore, BaseSessionStore, BaseUserStore, ServerDeps, TestDependencies, TestStores,
};

const PHONE: &str = "+15550001111";

fn alice() -> SandboxAccount {
    SandboxAccount::new(PHONE, 100, "Alice", Some("alice"))
}

async fn setup(account: SandboxAccount) -> (SandboxTelegram, ServerDeps, TestStores, uuid::Uuid) {
    let sandbox = SandboxTelegram::new();
    sandbox.add_account(account);
    let (deps, stores) = TestDependencies::deps_with_connector(sandbox.connector());
    let user = deps.users.create("user@example.org", "digest").await.unwrap();
    (sandbox, deps, stores, user.id)
}

#[tokio::test]
async fn plain_ceremony_authorizes_and_upholds_the_credential_invariant() {
    let (_sandbox, deps, _stores, user_id) = setup(alice()).await;

    let outcome = start_auth(&deps, user_id, PHONE).await.unwrap();
    assert!(matches!(outcome, StartAuthOutcome::CodeSent { .. }));

    let verified = verify_code(&deps, user_id, PHONE, "22222").await.unwrap();
    assert_eq!(verified.phone, PHONE);
    assert_eq!(verified.username.as_deref(), Some("alice"));

    let profile = deps
        .profiles
        .find_for_user(user_id, PHONE)
        .await
        .unwrap()
        .unwrap();
    assert!(profile.is_authorized);
    assert!(profile.phone_code_hash.is_none());
    assert_eq!(profile.first_name.as_deref(), Some("Alice"));

    // authorized implies a non-empty stored credential
    let session = deps.sessions.find_active(profile.id).await.unwrap().unwrap();
    assert!(session.session_string.is_some_and(|s| !s.is_empty()));

    let summaries = list_profiles(&deps, user_id).await.unwrap();
    assert_eq!(summaries.len(), 1);
    assert_eq!(summaries[0].state, "authorized");
}

#[tokio::test]
async fn two_factor_ceremony_routes_through_the_password_step() {
    let (_sandbox, deps, _stores, user_id) = setup(alice().with_password("hunter2")).await;

    start_auth(&deps, user_id, PHONE).await.unwrap();

    let err = verify_code(&deps, user_id, PHONE, "22222").await.unwrap_err();
    assert!(matches!(err, ProfileAuthError::PasswordRequired));

    // The account is not authorized until the password lands.
    let profile = deps
        .profiles
        .find_for_user(user_id, PHONE)
        .await
        .unwrap()
        .unwrap();
    assert!(!profile.is_authorized);

    let verified = verify_password(&deps, user_id, PHONE, "hunter2")
        .await
        .unwrap();
    assert_eq!(verified.username.as_deref(), Some("alice"));

    let profile = deps
        .profiles
        .find_for_user(user_id, PHONE)
        .await
        .unwrap()
        .unwrap();
    assert!(profile.is_authorized);
}

#[tokio::test]
async fn wrong_code_is_retryable_without_restarting_the_ceremony() {
    let (_sandbox, deps, _stores, user_id) = setup(alice()).await;
    start_auth(&deps, user_id, PHONE).await.unwrap();

    let err = verify_code(&deps, user_id, PHONE, "99999").await.unwrap_err();
    assert!(matches!(err, ProfileAuthError::AuthRejected(_)));

    // The challenge survived, so the right code still lands.
    verify_code(&deps, user_id, PHONE, "22222").await.unwrap();
}

#[tokio::test]
async fn second_start_short_circuits_without_a_new_code() {
    let (_sandbox, deps, _stores, user_id) = setup(alice()).await;
    start_auth(&deps, user_id, PHONE).await.unwrap();
    verify_code(&deps, user_id, PHONE, "22222").await.unwrap();

    let outcome = start_auth(&deps, user_id, PHONE).await.unwrap();
    assert!(matches!(outcome, StartAuthOutcome::AlreadyAuthorized { .. }));
}

#[tokio::test]
async fn start_reconciles_a_session_that_survived_a_previous_run() {
    let (_sandbox, deps, _stores, user_id) = setup(alice()).await;
    start_auth(&deps, user_id, PHONE).await.unwrap();
    verify_code(&deps, user_id, PHONE, "22222").await.unwrap();

    // Local flag lost (say, a bad deploy), provider-side session intact.
    let profile = deps
        .profiles
        .find_for_user(user_id, PHONE)
        .await
        .unwrap()
        .unwrap();
    deps.profiles.set_authorized(profile.id, false).await.unwrap();

    let outcome = start_auth(&deps, user_id, PHONE).await.unwrap();
    assert!(matches!(outcome, StartAuthOutcome::AlreadyAuthorized { .. }));

    let profile = deps
        .profiles
        .find_for_user(user_id, PHONE)
        .await
        .unwrap()
        .unwrap();
    assert!(profile.is_authorized);
}

#[tokio::test]
async fn unregistered_phone_is_rejected_by_the_provider() {
    let sandbox = SandboxTelegram::new();
    let (deps, _stores) = TestDependencies::deps_with_connector(sandbox.connector());
    let user = deps.users.create("user@example.org", "digest").await.unwrap();

    let err = start_auth(&deps, user.id, "+15559998888").await.unwrap_err();
    assert!(matches!(err, ProfileAuthError::AuthRejected(_)));
}

#[tokio::test]
async fn revoked_session_expires_on_use_and_heals_storage() {
    let account = alice().with_dialog(
        Dialog {
            id: 10,
            name: "Work chat".to_string(),
            unread_count: 1,
            is_group: true,
            is_channel: false,
        },
        vec![Message {
            id: 1,
            text: Some("hello".to_string()),
            date: Utc::now(),
            sender_first_name: Some("Bob".to_string()),
            sender_username: None,
        }],
    );
    let (sandbox, deps, _stores, user_id) = setup(account).await;
    start_auth(&deps, user_id, PHONE).await.unwrap();
    verify_code(&deps, user_id, PHONE, "22222").await.unwrap();

    // Works while the provider honors the session.
    let batch = fetch_unread(&deps, user_id, PHONE, 50).await.unwrap();
    assert_eq!(batch.count, 1);

    // The provider silently expires it.
    sandbox.revoke(PHONE);

    let err = fetch_unread(&deps, user_id, PHONE, 50).await.unwrap_err();
    assert!(matches!(err, ProfileAuthError::SessionExpired));
    assert!(err.to_string().contains("expired"));

    // The self-healing write-back is visible to the next listing.
    let summaries = list_profiles(&deps, user_id).await.unwrap();
    assert_eq!(summaries.len(), 1);
    assert!(!summaries[0].is_authorized);
    assert_eq!(summaries[0].state, "new");
}

#[tokio::test]
async fn sent_messages_reach_the_provider_outbox() {
    let account = alice().with_dialog(
        Dialog {
            id: 42,
            name: "Carol".to_string(),
            unread_count: 0,
            is_group: false,
            is_channel: false,
        },
        vec![],
    );
    let (sandbox, deps, _stores, user_id) = setup(account).await;
    start_auth(&deps, user_id, PHONE).await.unwrap();
    verify_code(&deps, user_id, PHONE, "22222").await.unwrap();

    send_message(&deps, user_id, PHONE, "on my way", "42")
        .await
        .unwrap();

    assert_eq!(
        sandbox.outbox(),
        vec![(PHONE.to_string(), 42, "on my way".to_string())]
    );
}
