pub mod login;
pub mod register;

pub use login::login;
pub use register::register;

use sha2::{Digest, Sha256};
use thiserror::Error;

/// Failures of application-account registration and login.
#[derive(Debug, Error)]
pub enum AccountError {
    #[error("email is already registered")]
    EmailTaken,

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("internal error: {0}")]
    Storage(#[from] anyhow::Error),
}

/// Hex SHA-256 digest of an account password.
pub fn hash_password(password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}
