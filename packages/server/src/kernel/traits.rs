// Trait definitions for dependency injection
//
// These are INFRASTRUCTURE traits only - no business logic. The orchestrator
// and gateway are domain functions that use these traits.
//
// Naming convention: Base* for trait names (e.g., BaseProfileStore)

use anyhow::Result;
use async_trait::async_trait;
use telegram::AccountInfo;
use uuid::Uuid;

use crate::domains::profiles::models::{Profile, ProviderSession};
use crate::domains::user::models::User;

// =============================================================================
// User Store (application accounts)
// =============================================================================

#[async_trait]
pub trait BaseUserStore: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>>;

    async fn create(&self, email: &str, password_hash: &str) -> Result<User>;

    async fn record_login(&self, id: Uuid) -> Result<()>;
}

// =============================================================================
// Profile Store (external account bindings)
// =============================================================================

#[async_trait]
pub trait BaseProfileStore: Send + Sync {
    /// Lookup by phone across all users, for the one-owner-per-phone check.
    async fn find_by_phone(&self, phone: &str) -> Result<Option<Profile>>;

    async fn find_for_user(&self, user_id: Uuid, phone: &str) -> Result<Option<Profile>>;

    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Profile>>;

    async fn create(&self, user_id: Uuid, phone: &str) -> Result<Profile>;

    async fn set_authorized(&self, id: Uuid, authorized: bool) -> Result<()>;

    async fn set_challenge(&self, id: Uuid, phone_code_hash: Option<&str>) -> Result<()>;

    /// Record display metadata, flip the authorized flag, clear the pending
    /// challenge and stamp the login, as one write.
    async fn complete_authorization(&self, id: Uuid, account: &AccountInfo) -> Result<()>;
}

// =============================================================================
// Session Store (provider credentials)
// =============================================================================

#[async_trait]
pub trait BaseSessionStore: Send + Sync {
    async fn find_active(&self, profile_id: Uuid) -> Result<Option<ProviderSession>>;

    async fn create(&self, profile_id: Uuid) -> Result<ProviderSession>;

    async fn save_credential(&self, id: Uuid, session_string: &str) -> Result<()>;

    async fn deactivate(&self, id: Uuid) -> Result<()>;
}
