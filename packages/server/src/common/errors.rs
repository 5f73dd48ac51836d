use telegram::TelegramError;
use thiserror::Error;

/// Failures of the profile auth orchestrator and the authorized-operation
/// gateway.
///
/// Every variant carries a short message fit for direct display; the HTTP
/// layer converts them into the uniform `{status: "error", message}` envelope
/// instead of letting anything panic across the boundary.
#[derive(Error, Debug)]
pub enum ProfileAuthError {
    #[error("user not found")]
    UserNotFound,

    #[error("profile not found")]
    ProfileNotFound,

    #[error("no stored session for this profile")]
    SessionNotFound,

    #[error("this phone number is already used by another user")]
    PhoneClaimedByOtherUser,

    #[error("no login code outstanding; request one via /profiles/start first")]
    ChallengeNotRequested,

    #[error("profile is not authorized; complete the login flow first")]
    ProfileNotAuthorized,

    #[error("the provider rejected the credentials: {0}")]
    AuthRejected(String),

    #[error("a two-factor password is required to finish signing in")]
    PasswordRequired,

    #[error("the session has expired; authorize the profile again")]
    SessionExpired,

    #[error("could not reach the messaging provider: {0}")]
    ProviderUnreachable(String),

    #[error("receiver not found: {0}")]
    EntityNotFound(String),

    #[error("internal error: {0}")]
    Storage(#[from] anyhow::Error),
}

impl From<TelegramError> for ProfileAuthError {
    fn from(err: TelegramError) -> Self {
        match err {
            TelegramError::PasswordRequired => ProfileAuthError::PasswordRequired,
            TelegramError::AuthRejected(msg) => ProfileAuthError::AuthRejected(msg),
            TelegramError::Unauthorized => ProfileAuthError::SessionExpired,
            TelegramError::PeerNotFound(peer) => ProfileAuthError::EntityNotFound(peer),
            TelegramError::Transport(msg) => ProfileAuthError::ProviderUnreachable(msg),
            TelegramError::BadSession(msg) => ProfileAuthError::ProviderUnreachable(msg),
        }
    }
}
