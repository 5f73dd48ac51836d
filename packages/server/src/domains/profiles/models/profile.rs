use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use telegram::AccountInfo;
use uuid::Uuid;

/// Telegram profile - SQL persistence layer
///
/// One external account binding, scoped to its owning user. The phone number
/// is unique across all users. `phone_code_hash` holds the provider's pending
/// login challenge between the start and verify steps; display metadata stays
/// empty until the first successful sign-in.
#[derive(sqlx::FromRow, Debug, Clone)]
pub struct Profile {
    pub id: Uuid,
    pub user_id: Uuid,
    pub phone: String,
    pub phone_code_hash: Option<String>,
    pub is_authorized: bool,
    pub is_active: bool,

    // Display metadata from the provider
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub username: Option<String>,
    pub photo_id: Option<String>,

    pub created_at: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
}

impl Profile {
    /// Find profile by phone, regardless of owner (phone-claim checks)
    pub async fn find_by_phone(phone: &str, pool: &PgPool) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>("SELECT * FROM telegram_profiles WHERE phone = $1")
            .bind(phone)
            .fetch_optional(pool)
            .await
            .map_err(Into::into)
    }

    /// Find a user's profile by phone
    pub async fn find_for_user(user_id: Uuid, phone: &str, pool: &PgPool) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>(
            "SELECT * FROM telegram_profiles WHERE user_id = $1 AND phone = $2",
        )
        .bind(user_id)
        .bind(phone)
        .fetch_optional(pool)
        .await
        .map_err(Into::into)
    }

    /// All profiles owned by a user
    pub async fn list_for_user(user_id: Uuid, pool: &PgPool) -> Result<Vec<Self>> {
        sqlx::query_as::<_, Self>(
            "SELECT * FROM telegram_profiles WHERE user_id = $1 ORDER BY created_at",
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
        .map_err(Into::into)
    }

    /// Insert a new, unauthorized profile
    pub async fn insert(user_id: Uuid, phone: &str, pool: &PgPool) -> Result<Self> {
        sqlx::query_as::<_, Self>(
            "INSERT INTO telegram_profiles (user_id, phone) VALUES ($1, $2) RETURNING *",
        )
        .bind(user_id)
        .bind(phone)
        .fetch_one(pool)
        .await
        .map_err(Into::into)
    }

    /// Flip the authorization flag
    pub async fn set_authorized(id: Uuid, authorized: bool, pool: &PgPool) -> Result<()> {
        sqlx::query("UPDATE telegram_profiles SET is_authorized = $2 WHERE id = $1")
            .bind(id)
            .bind(authorized)
            .execute(pool)
            .await?;

        Ok(())
    }

    /// Store or clear the pending login challenge
    pub async fn set_challenge(
        id: Uuid,
        phone_code_hash: Option<&str>,
        pool: &PgPool,
    ) -> Result<()> {
        sqlx::query("UPDATE telegram_profiles SET phone_code_hash = $2 WHERE id = $1")
            .bind(id)
            .bind(phone_code_hash)
            .execute(pool)
            .await?;

        Ok(())
    }

    /// Finish a successful sign-in in one statement: record display metadata,
    /// flip the authorized flag, clear the challenge, stamp the login.
    pub async fn complete_authorization(
        id: Uuid,
        account: &AccountInfo,
        pool: &PgPool,
    ) -> Result<()> {
        sqlx::query(
            "UPDATE telegram_profiles
             SET is_authorized = true,
                 phone_code_hash = NULL,
                 first_name = $2,
                 last_name = $3,
                 username = $4,
                 photo_id = $5,
                 last_login = now()
             WHERE id = $1",
        )
        .bind(id)
        .bind(&account.first_name)
        .bind(&account.last_name)
        .bind(&account.username)
        .bind(&account.photo_id)
        .execute(pool)
        .await?;

        Ok(())
    }
}
