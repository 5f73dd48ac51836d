//! Send a text message from a profile.

use telegram::TelegramError;
use tracing::info;
use uuid::Uuid;

use crate::common::ProfileAuthError;
use crate::domains::messages::gateway::ProfileGateway;
use crate::kernel::{provider, ServerDeps};

/// Resolve `receiver` to a provider-side peer and send `text` to it.
///
/// A purely numeric receiver is tried as a direct peer id first; when that
/// lookup fails, and for every non-numeric receiver, the profile's
/// conversation list is scanned instead. An unresolvable receiver fails with
/// [`ProfileAuthError::EntityNotFound`].
pub async fn send_message(
    deps: &ServerDeps,
    user_id: Uuid,
    phone: &str,
    text: &str,
    receiver: &str,
) -> Result<(), ProfileAuthError> {
    let mut gate = ProfileGateway::open(deps, user_id, phone).await?;
    let outcome = run_send(&mut gate, text, receiver).await;
    gate.finish(deps, outcome).await?;

    info!(user_id = %user_id, phone = %phone, receiver = %receiver, "message sent");
    Ok(())
}

async fn run_send(
    gate: &mut ProfileGateway,
    text: &str,
    receiver: &str,
) -> Result<(), TelegramError> {
    let peer = resolve_receiver(gate, receiver).await?;
    provider::bounded(gate.timeout, gate.conn.send_message(peer, text)).await
}

async fn resolve_receiver(gate: &mut ProfileGateway, receiver: &str) -> Result<i64, TelegramError> {
    if let Ok(id) = receiver.parse::<i64>() {
        match provider::bounded(gate.timeout, gate.conn.resolve_peer(id)).await {
            Ok(peer) => return Ok(peer),
            // Not directly addressable; fall back to the conversation list.
            Err(TelegramError::PeerNotFound(_)) => {
                let dialogs = provider::bounded(gate.timeout, gate.conn.dialogs(None)).await?;
                return dialogs
                    .iter()
                    .find(|d| d.id == id)
                    .map(|d| d.id)
                    .ok_or_else(|| TelegramError::PeerNotFound(receiver.to_string()));
            }
            Err(e) => return Err(e),
        }
    }

    let dialogs = provider::bounded(gate.timeout, gate.conn.dialogs(None)).await?;
    dialogs
        .iter()
        .find(|d| d.name.eq_ignore_ascii_case(receiver))
        .map(|d| d.id)
        .ok_or_else(|| TelegramError::PeerNotFound(receiver.to_string()))
}
