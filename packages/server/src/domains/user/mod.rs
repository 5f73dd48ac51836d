//! User domain - application accounts that own Telegram profiles
//!
//! Responsibilities:
//! - Registration and login with email + password digest
//! - JWT token management for the HTTP layer

pub mod actions;
pub mod jwt;
pub mod models;

pub use actions::AccountError;
pub use jwt::{Claims, JwtService};
