//! Login-ceremony state, reconstructed from storage.
//!
//! No state enum is persisted. A profile's position in the ceremony is a
//! deterministic function of the authorized flag, the pending challenge and
//! the stored credential, and every consumer derives it the same way through
//! [`AuthState::derive`]. The provider-side "password required" branch is
//! deliberately absent: storage cannot distinguish it from an outstanding
//! code, so it only ever surfaces as a live rejection during verification.

use crate::domains::profiles::models::Profile;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthState {
    /// No ceremony in flight; `start` is the only useful call.
    New,
    /// A login code is outstanding; the provider challenge must accompany it.
    CodeSent { challenge: String },
    /// The stored credential is believed valid.
    Authorized,
}

impl AuthState {
    /// Classify a profile from its flat columns and the active session's
    /// credential blob.
    ///
    /// An authorized flag without session material classifies as `New`: the
    /// flag is advisory and there is nothing left to connect with, so the
    /// ceremony has to start over.
    pub fn derive(profile: &Profile, credential: Option<&str>) -> Self {
        let has_credential = credential.is_some_and(|c| !c.trim().is_empty());

        match (profile.is_authorized, &profile.phone_code_hash) {
            (true, _) if has_credential => AuthState::Authorized,
            (true, _) => AuthState::New,
            (false, Some(challenge)) => AuthState::CodeSent {
                challenge: challenge.clone(),
            },
            (false, None) => AuthState::New,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AuthState::New => "new",
            AuthState::CodeSent { .. } => "code_sent",
            AuthState::Authorized => "authorized",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn profile(is_authorized: bool, phone_code_hash: Option<&str>) -> Profile {
        Profile {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            phone: "+15550001111".to_string(),
            phone_code_hash: phone_code_hash.map(str::to_string),
            is_authorized,
            is_active: true,
            first_name: None,
            last_name: None,
            username: None,
            photo_id: None,
            created_at: Utc::now(),
            last_login: None,
        }
    }

    #[test]
    fn fresh_profile_is_new() {
        assert_eq!(AuthState::derive(&profile(false, None), None), AuthState::New);
    }

    #[test]
    fn outstanding_challenge_is_code_sent() {
        let state = AuthState::derive(&profile(false, Some("hash-123")), Some("blob"));
        assert_eq!(
            state,
            AuthState::CodeSent {
                challenge: "hash-123".to_string()
            }
        );
    }

    #[test]
    fn challenge_without_credential_is_still_code_sent() {
        // The session row may not have materialized yet; the challenge alone
        // marks the ceremony position.
        let state = AuthState::derive(&profile(false, Some("hash-123")), None);
        assert!(matches!(state, AuthState::CodeSent { .. }));
    }

    #[test]
    fn authorized_flag_with_credential_is_authorized() {
        let state = AuthState::derive(&profile(true, None), Some("blob"));
        assert_eq!(state, AuthState::Authorized);
    }

    #[test]
    fn authorized_flag_beats_stale_challenge() {
        let state = AuthState::derive(&profile(true, Some("leftover")), Some("blob"));
        assert_eq!(state, AuthState::Authorized);
    }

    #[test]
    fn authorized_flag_without_credential_degrades_to_new() {
        assert_eq!(AuthState::derive(&profile(true, None), None), AuthState::New);
        assert_eq!(
            AuthState::derive(&profile(true, None), Some("   ")),
            AuthState::New
        );
    }

    #[test]
    fn labels_are_stable() {
        assert_eq!(AuthState::New.label(), "new");
        assert_eq!(
            AuthState::CodeSent {
                challenge: "x".into()
            }
            .label(),
            "code_sent"
        );
        assert_eq!(AuthState::Authorized.label(), "authorized");
    }
}
