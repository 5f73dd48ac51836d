//! Postgres-backed store adapters.
//!
//! Thin delegations from the store traits to the query methods the models
//! own; all SQL lives next to the row structs.

use anyhow::Result;
use async_trait::async_trait;
use sqlx::PgPool;
use telegram::AccountInfo;
use uuid::Uuid;

use crate::domains::profiles::models::{Profile, ProviderSession};
use crate::domains::user::models::User;
use crate::kernel::{BaseProfileStore, BaseSessionStore, BaseUserStore};

pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BaseUserStore for PgUserStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>> {
        User::find_by_id(id, &self.pool).await
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        User::find_by_email(email, &self.pool).await
    }

    async fn create(&self, email: &str, password_hash: &str) -> Result<User> {
        User::insert(email, password_hash, &self.pool).await
    }

    async fn record_login(&self, id: Uuid) -> Result<()> {
        User::record_login(id, &self.pool).await
    }
}

pub struct PgProfileStore {
    pool: PgPool,
}

impl PgProfileStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BaseProfileStore for PgProfileStore {
    async fn find_by_phone(&self, phone: &str) -> Result<Option<Profile>> {
        Profile::find_by_phone(phone, &self.pool).await
    }

    async fn find_for_user(&self, user_id: Uuid, phone: &str) -> Result<Option<Profile>> {
        Profile::find_for_user(user_id, phone, &self.pool).await
    }

    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Profile>> {
        Profile::list_for_user(user_id, &self.pool).await
    }

    async fn create(&self, user_id: Uuid, phone: &str) -> Result<Profile> {
        Profile::insert(user_id, phone, &self.pool).await
    }

    async fn set_authorized(&self, id: Uuid, authorized: bool) -> Result<()> {
        Profile::set_authorized(id, authorized, &self.pool).await
    }

    async fn set_challenge(&self, id: Uuid, phone_code_hash: Option<&str>) -> Result<()> {
        Profile::set_challenge(id, phone_code_hash, &self.pool).await
    }

    async fn complete_authorization(&self, id: Uuid, account: &AccountInfo) -> Result<()> {
        Profile::complete_authorization(id, account, &self.pool).await
    }
}

pub struct PgSessionStore {
    pool: PgPool,
}

impl PgSessionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BaseSessionStore for PgSessionStore {
    async fn find_active(&self, profile_id: Uuid) -> Result<Option<ProviderSession>> {
        ProviderSession::find_active(profile_id, &self.pool).await
    }

    async fn create(&self, profile_id: Uuid) -> Result<ProviderSession> {
        ProviderSession::insert(profile_id, &self.pool).await
    }

    async fn save_credential(&self, id: Uuid, session_string: &str) -> Result<()> {
        ProviderSession::save_credential(id, session_string, &self.pool).await
    }

    async fn deactivate(&self, id: Uuid) -> Result<()> {
        ProviderSession::deactivate(id, &self.pool).await
    }
}
