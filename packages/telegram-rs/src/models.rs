//! Data carried across the provider boundary.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Outcome of a login-code request. The challenge token must be echoed back
/// when the code is submitted.
#[derive(Debug, Clone)]
pub struct SentCode {
    pub phone_code_hash: String,
}

/// Display metadata of a signed-in account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountInfo {
    pub id: i64,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub username: Option<String>,
    pub photo_id: Option<String>,
}

/// One open conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dialog {
    pub id: i64,
    pub name: String,
    pub unread_count: i32,
    pub is_group: bool,
    pub is_channel: bool,
}

/// One message inside a conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: i64,
    /// Absent for media-only messages.
    pub text: Option<String>,
    pub date: DateTime<Utc>,
    pub sender_first_name: Option<String>,
    pub sender_username: Option<String>,
}
