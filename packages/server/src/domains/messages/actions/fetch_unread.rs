//! Sweep unread messages across all conversations.

use telegram::TelegramError;
use tracing::{info, warn};
use uuid::Uuid;

use crate::common::ProfileAuthError;
use crate::domains::messages::gateway::ProfileGateway;
use crate::domains::messages::models::{UnreadBatch, UnreadMessage};
use crate::kernel::{provider, ServerDeps};

/// Placeholder body for media-only messages.
const MEDIA_PLACEHOLDER: &str = "[media]";

/// Fetch up to `limit` recent messages from every conversation with unread
/// ones, then acknowledge those conversations as read (best-effort).
pub async fn fetch_unread(
    deps: &ServerDeps,
    user_id: Uuid,
    phone: &str,
    limit: usize,
) -> Result<UnreadBatch, ProfileAuthError> {
    let mut gate = ProfileGateway::open(deps, user_id, phone).await?;
    let outcome = collect_unread(&mut gate, limit).await;
    let batch = gate.finish(deps, outcome).await?;

    info!(
        user_id = %user_id,
        phone = %phone,
        count = batch.count,
        "unread messages fetched"
    );
    Ok(batch)
}

async fn collect_unread(
    gate: &mut ProfileGateway,
    limit: usize,
) -> Result<UnreadBatch, TelegramError> {
    let dialogs = provider::bounded(gate.timeout, gate.conn.dialogs(None)).await?;

    let mut messages = Vec::new();
    let mut unread_chats = Vec::new();

    for dialog in &dialogs {
        if dialog.unread_count <= 0 {
            continue;
        }

        let take = (dialog.unread_count as usize).min(limit);
        let recent =
            provider::bounded(gate.timeout, gate.conn.recent_messages(dialog.id, take)).await?;

        for message in recent {
            let from = message
                .sender_first_name
                .clone()
                .or_else(|| message.sender_username.clone())
                .unwrap_or_else(|| dialog.name.clone());

            messages.push(UnreadMessage {
                id: message.id,
                from,
                text: message.text.unwrap_or_else(|| MEDIA_PLACEHOLDER.to_string()),
                date: message.date,
                chat_name: dialog.name.clone(),
                chat_id: dialog.id,
            });
        }

        unread_chats.push(dialog.id);
    }

    // Best-effort: a failed acknowledge is logged, not retried, and does not
    // fail the sweep.
    for chat_id in unread_chats {
        if let Err(e) = provider::bounded(gate.timeout, gate.conn.mark_read(chat_id)).await {
            warn!(chat_id, error = %e, "failed to acknowledge read state");
        }
    }

    Ok(UnreadBatch {
        count: messages.len(),
        messages,
    })
}
