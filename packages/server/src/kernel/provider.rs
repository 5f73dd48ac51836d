//! Provider client factory.
//!
//! Every operation acquires its own connection from the stored credential and
//! releases it before returning; handles are never pooled or shared across
//! concurrent requests for the same profile, because the provider's session
//! protocol cannot be multiplexed over one credential safely.

use std::future::Future;
use std::time::Duration;

use telegram::{Connection, Connector, TelegramError};

use crate::kernel::ServerDeps;

/// Build and connect a provider client from a stored credential, within the
/// configured time bound. `None` (or an empty blob) yields a fresh,
/// unauthorized session.
pub async fn acquire(
    deps: &ServerDeps,
    credential: Option<&str>,
) -> Result<Box<dyn Connection>, TelegramError> {
    bounded(deps.provider_timeout, deps.telegram.connect(credential)).await
}

/// Impose the configured upper bound on a provider call. An elapsed timer is
/// indistinguishable from an unreachable provider for callers, and is
/// reported as such.
pub async fn bounded<T, F>(limit: Duration, fut: F) -> Result<T, TelegramError>
where
    F: Future<Output = Result<T, TelegramError>>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result,
        Err(_) => Err(TelegramError::Transport(format!(
            "provider call exceeded {}s",
            limit.as_secs()
        ))),
    }
}
