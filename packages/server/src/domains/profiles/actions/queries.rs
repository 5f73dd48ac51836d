//! Profile listing.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::common::ProfileAuthError;
use crate::domains::profiles::auth_state::AuthState;
use crate::kernel::{BaseProfileStore, BaseSessionStore, ServerDeps};

/// Public representation of one profile
#[derive(Debug, Clone, Serialize)]
pub struct ProfileSummary {
    pub id: Uuid,
    pub phone: String,
    pub is_authorized: bool,
    pub is_active: bool,
    /// Derived ceremony position: "new", "code_sent" or "authorized"
    pub state: &'static str,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub username: Option<String>,
    pub created_at: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
}

/// All profiles of a user, oldest first.
pub async fn list_profiles(
    deps: &ServerDeps,
    user_id: Uuid,
) -> Result<Vec<ProfileSummary>, ProfileAuthError> {
    let profiles = deps.profiles.list_for_user(user_id).await?;

    let mut summaries = Vec::with_capacity(profiles.len());
    for profile in profiles {
        let session = deps.sessions.find_active(profile.id).await?;
        let credential = session.as_ref().and_then(|s| s.session_string.as_deref());
        let state = AuthState::derive(&profile, credential);

        summaries.push(ProfileSummary {
            id: profile.id,
            phone: profile.phone,
            is_authorized: profile.is_authorized,
            is_active: profile.is_active,
            state: state.label(),
            first_name: profile.first_name,
            last_name: profile.last_name,
            username: profile.username,
            created_at: profile.created_at,
            last_login: profile.last_login,
        });
    }

    Ok(summaries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::profiles::actions::{start_auth, verify_code};
    use crate::kernel::TestDependencies;

    #[tokio::test]
    async fn reports_each_profile_with_its_derived_state() {
        let test = TestDependencies::new();
        let user = test.seed_user("user@example.org").await;

        // One profile mid-ceremony, one fully authorized.
        start_auth(&test.deps, user.id, "+15550001111")
            .await
            .unwrap();
        start_auth(&test.deps, user.id, "+15550002222")
            .await
            .unwrap();
        verify_code(&test.deps, user.id, "+15550002222", "22222")
            .await
            .unwrap();

        let summaries = list_profiles(&test.deps, user.id).await.unwrap();
        assert_eq!(summaries.len(), 2);

        let pending = summaries.iter().find(|s| s.phone == "+15550001111").unwrap();
        assert_eq!(pending.state, "code_sent");
        assert!(!pending.is_authorized);

        let authorized = summaries.iter().find(|s| s.phone == "+15550002222").unwrap();
        assert_eq!(authorized.state, "authorized");
        assert!(authorized.is_authorized);
        assert_eq!(authorized.username.as_deref(), Some("test_account"));
    }

    #[tokio::test]
    async fn empty_for_a_user_with_no_profiles() {
        let test = TestDependencies::new();
        let user = test.seed_user("user@example.org").await;

        let summaries = list_profiles(&test.deps, user.id).await.unwrap();
        assert!(summaries.is_empty());
    }
}
