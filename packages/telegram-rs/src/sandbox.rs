//! In-process provider used by development configurations and tests.
//!
//! The sandbox keeps a shared picture of registered accounts and issued
//! sessions behind a mutex; every [`Connection`] handed out by the connector
//! operates on that shared state, so a credential exported by one connection
//! can be replayed by the next one, exactly like a real provider session.
//!
//! Login codes are fixed per account (set at registration) rather than
//! delivered anywhere.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{AccountInfo, Dialog, Message, SentCode};
use crate::session::StringSession;
use crate::{Connection, Connector, TelegramError};

/// One account registered with the sandbox provider.
#[derive(Debug, Clone)]
pub struct SandboxAccount {
    pub phone: String,
    pub info: AccountInfo,
    pub login_code: String,
    /// Two-factor password; `Some` makes sign-in demand the password step.
    pub password: Option<String>,
    pub dialogs: Vec<Dialog>,
    /// Messages per dialog, newest first.
    pub messages: HashMap<i64, Vec<Message>>,
    /// Peer ids resolvable by direct id lookup without an open dialog.
    pub known_peers: Vec<i64>,
}

impl SandboxAccount {
    pub fn new(phone: &str, id: i64, first_name: &str, username: Option<&str>) -> Self {
        Self {
            phone: phone.to_string(),
            info: AccountInfo {
                id,
                first_name: Some(first_name.to_string()),
                last_name: None,
                username: username.map(str::to_string),
                photo_id: None,
            },
            login_code: "22222".to_string(),
            password: None,
            dialogs: Vec::new(),
            messages: HashMap::new(),
            known_peers: Vec::new(),
        }
    }

    pub fn with_password(mut self, password: &str) -> Self {
        self.password = Some(password.to_string());
        self
    }

    pub fn with_login_code(mut self, code: &str) -> Self {
        self.login_code = code.to_string();
        self
    }

    pub fn with_dialog(mut self, dialog: Dialog, messages: Vec<Message>) -> Self {
        self.messages.insert(dialog.id, messages);
        self.dialogs.push(dialog);
        self
    }

    pub fn with_known_peer(mut self, peer_id: i64) -> Self {
        self.known_peers.push(peer_id);
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct SessionPayload {
    session_id: String,
}

#[derive(Debug, Clone)]
struct PendingCode {
    phone: String,
    phone_code_hash: String,
    awaiting_password: bool,
}

#[derive(Debug, Default)]
struct SessionState {
    authorized_phone: Option<String>,
    pending: Option<PendingCode>,
}

#[derive(Default)]
struct SandboxState {
    accounts: HashMap<String, SandboxAccount>,
    sessions: HashMap<String, SessionState>,
    /// Messages sent through the sandbox: (sender phone, chat id, text).
    outbox: Vec<(String, i64, String)>,
}

/// The shared sandbox provider. Clone-cheap; hand [`connector`] to the
/// server and keep a handle for inspecting or mutating provider-side state.
///
/// [`connector`]: SandboxTelegram::connector
#[derive(Clone, Default)]
pub struct SandboxTelegram {
    state: Arc<Mutex<SandboxState>>,
}

impl SandboxTelegram {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn connector(&self) -> Arc<dyn Connector> {
        Arc::new(SandboxConnector {
            state: self.state.clone(),
        })
    }

    pub fn add_account(&self, account: SandboxAccount) {
        let mut state = self.state.lock().unwrap();
        state.accounts.insert(account.phone.clone(), account);
    }

    /// Invalidate every session signed in as `phone`, simulating a session
    /// the provider silently expired.
    pub fn revoke(&self, phone: &str) {
        let mut state = self.state.lock().unwrap();
        for session in state.sessions.values_mut() {
            if session.authorized_phone.as_deref() == Some(phone) {
                session.authorized_phone = None;
            }
        }
    }

    /// Everything sent through the sandbox as (sender phone, chat id, text).
    pub fn outbox(&self) -> Vec<(String, i64, String)> {
        self.state.lock().unwrap().outbox.clone()
    }
}

struct SandboxConnector {
    state: Arc<Mutex<SandboxState>>,
}

#[async_trait]
impl Connector for SandboxConnector {
    async fn connect(&self, session: Option<&str>) -> Result<Box<dyn Connection>, TelegramError> {
        let session_id = match session.filter(|s| !s.trim().is_empty()) {
            Some(blob) => StringSession::decode::<SessionPayload>(blob)?.session_id,
            None => Uuid::new_v4().to_string(),
        };

        let mut state = self.state.lock().unwrap();
        state.sessions.entry(session_id.clone()).or_default();

        Ok(Box::new(SandboxConnection {
            state: self.state.clone(),
            session_id,
        }))
    }
}

struct SandboxConnection {
    state: Arc<Mutex<SandboxState>>,
    session_id: String,
}

impl SandboxConnection {
    fn authorized_phone(state: &SandboxState, session_id: &str) -> Result<String, TelegramError> {
        state
            .sessions
            .get(session_id)
            .and_then(|s| s.authorized_phone.clone())
            .ok_or(TelegramError::Unauthorized)
    }
}

#[async_trait]
impl Connection for SandboxConnection {
    async fn is_authorized(&mut self) -> Result<bool, TelegramError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .sessions
            .get(&self.session_id)
            .is_some_and(|s| s.authorized_phone.is_some()))
    }

    async fn request_login_code(&mut self, phone: &str) -> Result<SentCode, TelegramError> {
        let mut state = self.state.lock().unwrap();
        if !state.accounts.contains_key(phone) {
            return Err(TelegramError::AuthRejected(format!(
                "phone number {phone} is not registered with the sandbox provider"
            )));
        }
        let phone_code_hash = Uuid::new_v4().simple().to_string();
        let session = state
            .sessions
            .get_mut(&self.session_id)
            .ok_or(TelegramError::Unauthorized)?;
        session.pending = Some(PendingCode {
            phone: phone.to_string(),
            phone_code_hash: phone_code_hash.clone(),
            awaiting_password: false,
        });
        Ok(SentCode { phone_code_hash })
    }

    async fn sign_in(
        &mut self,
        phone: &str,
        code: &str,
        phone_code_hash: &str,
    ) -> Result<(), TelegramError> {
        let mut state = self.state.lock().unwrap();

        let account = state
            .accounts
            .get(phone)
            .cloned()
            .ok_or_else(|| TelegramError::AuthRejected("unknown phone number".into()))?;

        let session = state
            .sessions
            .get_mut(&self.session_id)
            .ok_or(TelegramError::Unauthorized)?;
        let pending = session
            .pending
            .as_mut()
            .filter(|p| p.phone == phone && p.phone_code_hash == phone_code_hash)
            .ok_or_else(|| {
                TelegramError::AuthRejected("login code expired or never requested".into())
            })?;

        if code.trim() != account.login_code {
            return Err(TelegramError::AuthRejected(
                "the confirmation code is not valid".into(),
            ));
        }

        if account.password.is_some() {
            pending.awaiting_password = true;
            return Err(TelegramError::PasswordRequired);
        }

        session.authorized_phone = Some(phone.to_string());
        session.pending = None;
        Ok(())
    }

    async fn check_password(&mut self, password: &str) -> Result<(), TelegramError> {
        let mut state = self.state.lock().unwrap();

        let (phone, expected) = {
            let session = state
                .sessions
                .get(&self.session_id)
                .ok_or(TelegramError::Unauthorized)?;
            let pending = session.pending.as_ref().ok_or_else(|| {
                TelegramError::AuthRejected("no sign-in attempt awaiting a password".into())
            })?;
            let account = state.accounts.get(&pending.phone).ok_or_else(|| {
                TelegramError::AuthRejected("unknown phone number".into())
            })?;
            (pending.phone.clone(), account.password.clone())
        };

        if expected.as_deref() != Some(password) {
            return Err(TelegramError::AuthRejected(
                "the two-factor password is not valid".into(),
            ));
        }

        let session = state
            .sessions
            .get_mut(&self.session_id)
            .ok_or(TelegramError::Unauthorized)?;
        session.authorized_phone = Some(phone);
        session.pending = None;
        Ok(())
    }

    async fn get_me(&mut self) -> Result<AccountInfo, TelegramError> {
        let state = self.state.lock().unwrap();
        let phone = Self::authorized_phone(&state, &self.session_id)?;
        state
            .accounts
            .get(&phone)
            .map(|a| a.info.clone())
            .ok_or(TelegramError::Unauthorized)
    }

    async fn dialogs(&mut self, limit: Option<usize>) -> Result<Vec<Dialog>, TelegramError> {
        let state = self.state.lock().unwrap();
        let phone = Self::authorized_phone(&state, &self.session_id)?;
        let account = state.accounts.get(&phone).ok_or(TelegramError::Unauthorized)?;
        let mut dialogs = account.dialogs.clone();
        if let Some(limit) = limit {
            dialogs.truncate(limit);
        }
        Ok(dialogs)
    }

    async fn recent_messages(
        &mut self,
        chat_id: i64,
        limit: usize,
    ) -> Result<Vec<Message>, TelegramError> {
        let state = self.state.lock().unwrap();
        let phone = Self::authorized_phone(&state, &self.session_id)?;
        let account = state.accounts.get(&phone).ok_or(TelegramError::Unauthorized)?;
        let messages = account
            .messages
            .get(&chat_id)
            .map(|m| m.iter().take(limit).cloned().collect())
            .unwrap_or_default();
        Ok(messages)
    }

    async fn send_message(&mut self, chat_id: i64, text: &str) -> Result<(), TelegramError> {
        let mut state = self.state.lock().unwrap();
        let phone = Self::authorized_phone(&state, &self.session_id)?;
        let account = state.accounts.get(&phone).ok_or(TelegramError::Unauthorized)?;
        let known = account.dialogs.iter().any(|d| d.id == chat_id)
            || account.known_peers.contains(&chat_id);
        if !known {
            return Err(TelegramError::PeerNotFound(chat_id.to_string()));
        }
        state.outbox.push((phone, chat_id, text.to_string()));
        Ok(())
    }

    async fn mark_read(&mut self, chat_id: i64) -> Result<(), TelegramError> {
        let mut state = self.state.lock().unwrap();
        let phone = Self::authorized_phone(&state, &self.session_id)?;
        let account = state
            .accounts
            .get_mut(&phone)
            .ok_or(TelegramError::Unauthorized)?;
        if let Some(dialog) = account.dialogs.iter_mut().find(|d| d.id == chat_id) {
            dialog.unread_count = 0;
        }
        Ok(())
    }

    async fn resolve_peer(&mut self, peer_id: i64) -> Result<i64, TelegramError> {
        let state = self.state.lock().unwrap();
        let phone = Self::authorized_phone(&state, &self.session_id)?;
        let account = state.accounts.get(&phone).ok_or(TelegramError::Unauthorized)?;
        let known = account.dialogs.iter().any(|d| d.id == peer_id)
            || account.known_peers.contains(&peer_id);
        if known {
            Ok(peer_id)
        } else {
            Err(TelegramError::PeerNotFound(peer_id.to_string()))
        }
    }

    fn export_session(&self) -> String {
        StringSession::encode(&SessionPayload {
            session_id: self.session_id.clone(),
        })
    }

    async fn disconnect(&mut self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account() -> SandboxAccount {
        SandboxAccount::new("+15550001111", 100, "Alice", Some("alice"))
    }

    #[tokio::test]
    async fn full_sign_in_round_trip() {
        let sandbox = SandboxTelegram::new();
        sandbox.add_account(account());
        let connector = sandbox.connector();

        let mut conn = connector.connect(None).await.unwrap();
        assert!(!conn.is_authorized().await.unwrap());

        let sent = conn.request_login_code("+15550001111").await.unwrap();
        conn.sign_in("+15550001111", "22222", &sent.phone_code_hash)
            .await
            .unwrap();
        assert!(conn.is_authorized().await.unwrap());

        // The exported credential revives the authorized session.
        let blob = conn.export_session();
        conn.disconnect().await;
        let mut revived = connector.connect(Some(&blob)).await.unwrap();
        assert!(revived.is_authorized().await.unwrap());
        assert_eq!(revived.get_me().await.unwrap().id, 100);
    }

    #[tokio::test]
    async fn two_factor_accounts_demand_the_password_step() {
        let sandbox = SandboxTelegram::new();
        sandbox.add_account(account().with_password("hunter2"));
        let connector = sandbox.connector();

        let mut conn = connector.connect(None).await.unwrap();
        let sent = conn.request_login_code("+15550001111").await.unwrap();
        let err = conn
            .sign_in("+15550001111", "22222", &sent.phone_code_hash)
            .await
            .unwrap_err();
        assert!(matches!(err, TelegramError::PasswordRequired));

        let err = conn.check_password("wrong").await.unwrap_err();
        assert!(matches!(err, TelegramError::AuthRejected(_)));
        assert!(!conn.is_authorized().await.unwrap());

        conn.check_password("hunter2").await.unwrap();
        assert!(conn.is_authorized().await.unwrap());
    }

    #[tokio::test]
    async fn wrong_code_is_rejected_and_retryable() {
        let sandbox = SandboxTelegram::new();
        sandbox.add_account(account());
        let connector = sandbox.connector();

        let mut conn = connector.connect(None).await.unwrap();
        let sent = conn.request_login_code("+15550001111").await.unwrap();
        let err = conn
            .sign_in("+15550001111", "99999", &sent.phone_code_hash)
            .await
            .unwrap_err();
        assert!(matches!(err, TelegramError::AuthRejected(_)));

        conn.sign_in("+15550001111", "22222", &sent.phone_code_hash)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn revoked_sessions_stop_validating() {
        let sandbox = SandboxTelegram::new();
        sandbox.add_account(account());
        let connector = sandbox.connector();

        let mut conn = connector.connect(None).await.unwrap();
        let sent = conn.request_login_code("+15550001111").await.unwrap();
        conn.sign_in("+15550001111", "22222", &sent.phone_code_hash)
            .await
            .unwrap();
        let blob = conn.export_session();

        sandbox.revoke("+15550001111");

        let mut revived = connector.connect(Some(&blob)).await.unwrap();
        assert!(!revived.is_authorized().await.unwrap());
        assert!(matches!(
            revived.get_me().await.unwrap_err(),
            TelegramError::Unauthorized
        ));
    }

    #[tokio::test]
    async fn corrupted_credentials_fail_to_connect() {
        let sandbox = SandboxTelegram::new();
        let connector = sandbox.connector();
        let err = connector.connect(Some("@@garbage@@")).await.err();
        assert!(matches!(err, Some(TelegramError::BadSession(_))));
    }
}
