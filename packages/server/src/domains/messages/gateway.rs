//! Shared preamble for every post-login operation.
//!
//! Local "authorized" state is advisory. Each operation acquires its own
//! connection from the stored credential, asks the provider whether the
//! session is still honored, and corrects storage the moment the provider
//! disagrees - deactivating the session row and clearing the profile's
//! authorized flag before the error returns. The connection is released on
//! every exit path, and the (possibly rotated) credential is written back
//! after a successful operation body.

use std::time::Duration;

use telegram::{Connection, TelegramError};
use tracing::warn;
use uuid::Uuid;

use crate::common::ProfileAuthError;
use crate::domains::profiles::models::{Profile, ProviderSession};
use crate::kernel::{provider, BaseProfileStore, BaseSessionStore, ServerDeps};

/// A validated, connected provider client for one operation.
pub struct ProfileGateway {
    pub profile: Profile,
    pub session: ProviderSession,
    pub(crate) conn: Box<dyn Connection>,
    pub(crate) timeout: Duration,
}

impl std::fmt::Debug for ProfileGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProfileGateway")
            .field("profile", &self.profile)
            .field("session", &self.session)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl ProfileGateway {
    /// Run the preamble: load profile and session, require local
    /// authorization, connect, and re-validate against the provider.
    ///
    /// `SessionExpired` and `ProviderUnreachable` both perform the
    /// self-healing write-back before returning; it is the only mechanism
    /// that reconciles local and external truth.
    pub async fn open(
        deps: &ServerDeps,
        user_id: Uuid,
        phone: &str,
    ) -> Result<Self, ProfileAuthError> {
        let profile = deps
            .profiles
            .find_for_user(user_id, phone)
            .await?
            .ok_or(ProfileAuthError::ProfileNotFound)?;

        // Operations never attempt an implicit re-login.
        if !profile.is_authorized {
            return Err(ProfileAuthError::ProfileNotAuthorized);
        }

        // Missing session despite the flag means corrupted local state,
        // distinct from not-authorized.
        let session = deps
            .sessions
            .find_active(profile.id)
            .await?
            .ok_or(ProfileAuthError::SessionNotFound)?;

        let mut conn = match provider::acquire(deps, session.session_string.as_deref()).await {
            Ok(conn) => conn,
            Err(e) => {
                Self::heal(deps, &profile, &session).await?;
                warn!(
                    profile_id = %profile.id,
                    phone = %profile.phone,
                    error = %e,
                    "provider unreachable; session deactivated"
                );
                return Err(ProfileAuthError::ProviderUnreachable(e.to_string()));
            }
        };

        match provider::bounded(deps.provider_timeout, conn.is_authorized()).await {
            Ok(true) => {}
            Ok(false) => {
                conn.disconnect().await;
                Self::heal(deps, &profile, &session).await?;
                warn!(
                    profile_id = %profile.id,
                    phone = %profile.phone,
                    "provider no longer honors the stored session; deactivated"
                );
                return Err(ProfileAuthError::SessionExpired);
            }
            Err(e) => {
                conn.disconnect().await;
                Self::heal(deps, &profile, &session).await?;
                warn!(
                    profile_id = %profile.id,
                    phone = %profile.phone,
                    error = %e,
                    "session validation failed; session deactivated"
                );
                return Err(ProfileAuthError::ProviderUnreachable(e.to_string()));
            }
        }

        Ok(Self {
            profile,
            session,
            conn,
            timeout: deps.provider_timeout,
        })
    }

    /// Release the connection and translate the operation outcome.
    ///
    /// On success the rotated credential is persisted. A mid-operation
    /// authorization loss or transport failure triggers the same write-back
    /// as the preamble.
    pub async fn finish<T>(
        mut self,
        deps: &ServerDeps,
        outcome: Result<T, TelegramError>,
    ) -> Result<T, ProfileAuthError> {
        let exported = self.conn.export_session();
        self.conn.disconnect().await;

        match outcome {
            Ok(value) => {
                deps.sessions
                    .save_credential(self.session.id, &exported)
                    .await?;
                Ok(value)
            }
            Err(TelegramError::Unauthorized) => {
                Self::heal(deps, &self.profile, &self.session).await?;
                warn!(
                    profile_id = %self.profile.id,
                    "provider revoked authorization mid-operation; session deactivated"
                );
                Err(ProfileAuthError::SessionExpired)
            }
            Err(e @ (TelegramError::Transport(_) | TelegramError::BadSession(_))) => {
                Self::heal(deps, &self.profile, &self.session).await?;
                warn!(
                    profile_id = %self.profile.id,
                    error = %e,
                    "provider failed mid-operation; session deactivated"
                );
                Err(ProfileAuthError::ProviderUnreachable(e.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn heal(
        deps: &ServerDeps,
        profile: &Profile,
        session: &ProviderSession,
    ) -> Result<(), ProfileAuthError> {
        deps.sessions.deactivate(session.id).await?;
        deps.profiles.set_authorized(profile.id, false).await?;
        Ok(())
    }
}
