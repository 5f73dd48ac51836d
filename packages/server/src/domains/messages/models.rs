//! Public API representations for message operations.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// One unread message, flattened for display
#[derive(Debug, Clone, Serialize)]
pub struct UnreadMessage {
    pub id: i64,
    /// Sender's given name, else their handle, else the conversation name
    pub from: String,
    /// Message body, or a media placeholder
    pub text: String,
    pub date: DateTime<Utc>,
    pub chat_name: String,
    pub chat_id: i64,
}

/// Result of one unread sweep
#[derive(Debug, Clone, Serialize)]
pub struct UnreadBatch {
    pub count: usize,
    pub messages: Vec<UnreadMessage>,
}

/// One conversation, as listed
#[derive(Debug, Clone, Serialize)]
pub struct DialogSummary {
    pub id: i64,
    pub name: String,
    pub unread_count: i32,
    pub is_group: bool,
    pub is_channel: bool,
}
