//! Server dependencies for domain actions (using traits for testability)
//!
//! This module provides the central dependency container used by the auth
//! orchestrator, the message gateway and the HTTP handlers. All external
//! services use trait abstractions to enable testing.

use std::sync::Arc;
use std::time::Duration;

use telegram::Connector;

use crate::domains::user::jwt::JwtService;
use crate::kernel::{BaseProfileStore, BaseSessionStore, BaseUserStore};

/// Server dependencies accessible to domain actions
#[derive(Clone)]
pub struct ServerDeps {
    pub users: Arc<dyn BaseUserStore>,
    pub profiles: Arc<dyn BaseProfileStore>,
    pub sessions: Arc<dyn BaseSessionStore>,
    /// Provider client factory: one connection per operation, never shared.
    pub telegram: Arc<dyn Connector>,
    /// JWT service for application-account tokens
    pub jwt_service: Arc<JwtService>,
    /// Upper bound on any single provider connect/call
    pub provider_timeout: Duration,
}

impl ServerDeps {
    pub fn new(
        users: Arc<dyn BaseUserStore>,
        profiles: Arc<dyn BaseProfileStore>,
        sessions: Arc<dyn BaseSessionStore>,
        telegram: Arc<dyn Connector>,
        jwt_service: Arc<JwtService>,
        provider_timeout: Duration,
    ) -> Self {
        Self {
            users,
            profiles,
            sessions,
            telegram,
            jwt_service,
            provider_timeout,
        }
    }
}
