//! Client-side boundary for the Telegram MTProto provider.
//!
//! The server never talks to the wire protocol directly: everything it needs
//! from Telegram is expressed by the [`Connector`] / [`Connection`] traits.
//! A transport-backed connector is linked in at the composition root of a
//! deployment; this crate ships the shared types, the error taxonomy and an
//! in-process [`sandbox`] provider used by development configs and tests.

use async_trait::async_trait;

pub mod models;
pub mod sandbox;
pub mod session;

pub use models::{AccountInfo, Dialog, Message, SentCode};
pub use session::StringSession;

/// Errors surfaced by a provider connection.
///
/// `PasswordRequired` is a first-class variant rather than a generic
/// rejection so callers can route the user to the two-factor step instead of
/// pattern-matching on message text.
#[derive(Debug, thiserror::Error)]
pub enum TelegramError {
    #[error("two-factor password required")]
    PasswordRequired,

    #[error("sign-in rejected: {0}")]
    AuthRejected(String),

    #[error("not authorized")]
    Unauthorized,

    #[error("no such peer: {0}")]
    PeerNotFound(String),

    #[error("connection failed: {0}")]
    Transport(String),

    #[error("stored session credential is unusable: {0}")]
    BadSession(String),
}

/// One live connection to the provider, bound to a single session credential.
///
/// A connection is owned by exactly one in-flight operation. The session
/// protocol is not safe for concurrent multiplexing over one credential, so
/// handles are never pooled or shared; callers must call [`disconnect`] on
/// every exit path and persist [`export_session`] afterwards, because the
/// provider may rotate transport state on any interaction.
///
/// [`disconnect`]: Connection::disconnect
/// [`export_session`]: Connection::export_session
#[async_trait]
pub trait Connection: Send {
    /// Whether the provider still considers this session signed in.
    async fn is_authorized(&mut self) -> Result<bool, TelegramError>;

    /// Ask the provider to deliver a one-time login code to `phone`.
    async fn request_login_code(&mut self, phone: &str) -> Result<SentCode, TelegramError>;

    /// Complete sign-in with the delivered code and the challenge token from
    /// [`request_login_code`](Connection::request_login_code).
    ///
    /// Fails with [`TelegramError::PasswordRequired`] when the account has
    /// two-factor auth enabled.
    async fn sign_in(
        &mut self,
        phone: &str,
        code: &str,
        phone_code_hash: &str,
    ) -> Result<(), TelegramError>;

    /// Complete two-factor sign-in with the account password.
    async fn check_password(&mut self, password: &str) -> Result<(), TelegramError>;

    /// Display metadata of the signed-in account.
    async fn get_me(&mut self) -> Result<AccountInfo, TelegramError>;

    /// Open conversations, most recent first. `None` means no limit.
    async fn dialogs(&mut self, limit: Option<usize>) -> Result<Vec<Dialog>, TelegramError>;

    /// Most recent messages of one conversation, newest first.
    async fn recent_messages(
        &mut self,
        chat_id: i64,
        limit: usize,
    ) -> Result<Vec<Message>, TelegramError>;

    /// Send a text message to a known peer.
    async fn send_message(&mut self, chat_id: i64, text: &str) -> Result<(), TelegramError>;

    /// Acknowledge every unread message in one conversation.
    async fn mark_read(&mut self, chat_id: i64) -> Result<(), TelegramError>;

    /// Resolve a raw numeric id to an addressable peer.
    async fn resolve_peer(&mut self, peer_id: i64) -> Result<i64, TelegramError>;

    /// Serialize the (possibly rotated) session credential for persistence.
    fn export_session(&self) -> String;

    /// Release the connection. Must be called on every exit path.
    async fn disconnect(&mut self);
}

/// Builds one [`Connection`] per operation from a stored session credential.
///
/// An empty or absent credential yields a fresh, unauthorized session.
#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(&self, session: Option<&str>) -> Result<Box<dyn Connection>, TelegramError>;
}
