use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

/// Provider session - SQL persistence layer
///
/// Holds the reusable login credential for one profile. The blob is opaque
/// and secret-equivalent; it is rewritten after every provider interaction
/// because the provider may rotate transport state at any time. At most one
/// active row per profile is treated as authoritative, and rows are
/// deactivated rather than deleted.
#[derive(sqlx::FromRow, Debug, Clone)]
pub struct ProviderSession {
    pub id: Uuid,
    pub profile_id: Uuid,
    pub session_string: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub last_used: DateTime<Utc>,
}

impl ProviderSession {
    /// The authoritative active session for a profile, if any
    pub async fn find_active(profile_id: Uuid, pool: &PgPool) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>(
            "SELECT * FROM telegram_sessions
             WHERE profile_id = $1 AND is_active = true
             ORDER BY created_at DESC
             LIMIT 1",
        )
        .bind(profile_id)
        .fetch_optional(pool)
        .await
        .map_err(Into::into)
    }

    /// Insert a fresh, empty session row
    pub async fn insert(profile_id: Uuid, pool: &PgPool) -> Result<Self> {
        sqlx::query_as::<_, Self>(
            "INSERT INTO telegram_sessions (profile_id) VALUES ($1) RETURNING *",
        )
        .bind(profile_id)
        .fetch_one(pool)
        .await
        .map_err(Into::into)
    }

    /// Persist a (possibly rotated) credential blob and stamp the use
    pub async fn save_credential(id: Uuid, session_string: &str, pool: &PgPool) -> Result<()> {
        sqlx::query(
            "UPDATE telegram_sessions SET session_string = $2, last_used = now() WHERE id = $1",
        )
        .bind(id)
        .bind(session_string)
        .execute(pool)
        .await?;

        Ok(())
    }

    /// Retire a session the provider no longer honors
    pub async fn deactivate(id: Uuid, pool: &PgPool) -> Result<()> {
        sqlx::query("UPDATE telegram_sessions SET is_active = false WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(())
    }
}
