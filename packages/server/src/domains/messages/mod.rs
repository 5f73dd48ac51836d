//! Messages domain - the authorized-operation gateway
//!
//! Every operation here follows the same validate-then-execute-then-persist
//! pattern (see `gateway`): acquire a fresh provider connection from the
//! stored credential, confirm the provider still honors it, run the
//! operation body, persist the rotated credential, release the connection.

pub mod actions;
pub mod gateway;
pub mod models;

pub use gateway::ProfileGateway;
pub use models::{DialogSummary, UnreadBatch, UnreadMessage};
