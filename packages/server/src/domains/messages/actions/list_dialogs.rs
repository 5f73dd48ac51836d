//! List a profile's conversations.

use telegram::TelegramError;
use uuid::Uuid;

use crate::common::ProfileAuthError;
use crate::domains::messages::gateway::ProfileGateway;
use crate::domains::messages::models::DialogSummary;
use crate::kernel::{provider, ServerDeps};

/// Up to `limit` conversations with their unread counts and classification.
pub async fn list_dialogs(
    deps: &ServerDeps,
    user_id: Uuid,
    phone: &str,
    limit: usize,
) -> Result<Vec<DialogSummary>, ProfileAuthError> {
    let mut gate = ProfileGateway::open(deps, user_id, phone).await?;
    let outcome = collect_dialogs(&mut gate, limit).await;
    gate.finish(deps, outcome).await
}

async fn collect_dialogs(
    gate: &mut ProfileGateway,
    limit: usize,
) -> Result<Vec<DialogSummary>, TelegramError> {
    let dialogs = provider::bounded(gate.timeout, gate.conn.dialogs(Some(limit))).await?;

    Ok(dialogs
        .into_iter()
        .map(|d| DialogSummary {
            id: d.id,
            name: d.name,
            unread_count: d.unread_count,
            is_group: d.is_group,
            is_channel: d.is_channel,
        })
        .collect())
}
