//! Profiles domain - the auth orchestrator
//!
//! Walks one external account through the provider's login ceremony:
//!
//!   NEW -> CODE_SENT -> AUTHORIZED, with CODE_SENT -> (password) -> AUTHORIZED
//!
//! No ceremony state is persisted as an enum; it is derived from the profile
//! and session rows (see `auth_state`). Every step persists the rotated
//! session credential before flipping the authorized flag, so the flag never
//! points at empty session material.

pub mod actions;
pub mod auth_state;
pub mod models;

pub use auth_state::AuthState;
