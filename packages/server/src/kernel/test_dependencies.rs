// TestDependencies - mock implementations for testing
//
// Provides in-memory stores and a scripted provider connector that can be
// injected into ServerDeps for tests. The provider mock records every call so
// tests can assert on interaction counts (e.g. "no code request was issued").

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::Utc;
use telegram::{AccountInfo, Connection, Connector, Dialog, Message, SentCode, TelegramError};
use uuid::Uuid;

use crate::domains::profiles::models::{Profile, ProviderSession};
use crate::domains::user::jwt::JwtService;
use crate::domains::user::models::User;
use crate::kernel::{BaseProfileStore, BaseSessionStore, BaseUserStore, ServerDeps};

// =============================================================================
// In-memory stores
// =============================================================================

#[derive(Default)]
pub struct InMemoryUserStore {
    rows: Mutex<HashMap<Uuid, User>>,
}

#[async_trait]
impl BaseUserStore for InMemoryUserStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>> {
        Ok(self.rows.lock().unwrap().get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn create(&self, email: &str, password_hash: &str) -> Result<User> {
        let mut rows = self.rows.lock().unwrap();
        if rows.values().any(|u| u.email == email) {
            return Err(anyhow!("duplicate key value violates unique constraint"));
        }
        let user = User {
            id: Uuid::new_v4(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            created_at: Utc::now(),
            last_login: None,
        };
        rows.insert(user.id, user.clone());
        Ok(user)
    }

    async fn record_login(&self, id: Uuid) -> Result<()> {
        if let Some(user) = self.rows.lock().unwrap().get_mut(&id) {
            user.last_login = Some(Utc::now());
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryProfileStore {
    rows: Mutex<HashMap<Uuid, Profile>>,
}

#[async_trait]
impl BaseProfileStore for InMemoryProfileStore {
    async fn find_by_phone(&self, phone: &str) -> Result<Option<Profile>> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .values()
            .find(|p| p.phone == phone)
            .cloned())
    }

    async fn find_for_user(&self, user_id: Uuid, phone: &str) -> Result<Option<Profile>> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .values()
            .find(|p| p.user_id == user_id && p.phone == phone)
            .cloned())
    }

    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Profile>> {
        let mut profiles: Vec<Profile> = self
            .rows
            .lock()
            .unwrap()
            .values()
            .filter(|p| p.user_id == user_id)
            .cloned()
            .collect();
        profiles.sort_by_key(|p| p.created_at);
        Ok(profiles)
    }

    async fn create(&self, user_id: Uuid, phone: &str) -> Result<Profile> {
        let mut rows = self.rows.lock().unwrap();
        if rows.values().any(|p| p.phone == phone) {
            return Err(anyhow!("duplicate key value violates unique constraint"));
        }
        let profile = Profile {
            id: Uuid::new_v4(),
            user_id,
            phone: phone.to_string(),
            phone_code_hash: None,
            is_authorized: false,
            is_active: true,
            first_name: None,
            last_name: None,
            username: None,
            photo_id: None,
            created_at: Utc::now(),
            last_login: None,
        };
        rows.insert(profile.id, profile.clone());
        Ok(profile)
    }

    async fn set_authorized(&self, id: Uuid, authorized: bool) -> Result<()> {
        if let Some(profile) = self.rows.lock().unwrap().get_mut(&id) {
            profile.is_authorized = authorized;
        }
        Ok(())
    }

    async fn set_challenge(&self, id: Uuid, phone_code_hash: Option<&str>) -> Result<()> {
        if let Some(profile) = self.rows.lock().unwrap().get_mut(&id) {
            profile.phone_code_hash = phone_code_hash.map(str::to_string);
        }
        Ok(())
    }

    async fn complete_authorization(&self, id: Uuid, account: &AccountInfo) -> Result<()> {
        if let Some(profile) = self.rows.lock().unwrap().get_mut(&id) {
            profile.is_authorized = true;
            profile.phone_code_hash = None;
            profile.first_name = account.first_name.clone();
            profile.last_name = account.last_name.clone();
            profile.username = account.username.clone();
            profile.photo_id = account.photo_id.clone();
            profile.last_login = Some(Utc::now());
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemorySessionStore {
    rows: Mutex<HashMap<Uuid, ProviderSession>>,
}

#[async_trait]
impl BaseSessionStore for InMemorySessionStore {
    async fn find_active(&self, profile_id: Uuid) -> Result<Option<ProviderSession>> {
        let rows = self.rows.lock().unwrap();
        let mut active: Vec<&ProviderSession> = rows
            .values()
            .filter(|s| s.profile_id == profile_id && s.is_active)
            .collect();
        active.sort_by_key(|s| s.created_at);
        Ok(active.last().map(|s| (*s).clone()))
    }

    async fn create(&self, profile_id: Uuid) -> Result<ProviderSession> {
        let session = ProviderSession {
            id: Uuid::new_v4(),
            profile_id,
            session_string: None,
            is_active: true,
            created_at: Utc::now(),
            last_used: Utc::now(),
        };
        self.rows
            .lock()
            .unwrap()
            .insert(session.id, session.clone());
        Ok(session)
    }

    async fn save_credential(&self, id: Uuid, session_string: &str) -> Result<()> {
        if let Some(session) = self.rows.lock().unwrap().get_mut(&id) {
            session.session_string = Some(session_string.to_string());
            session.last_used = Utc::now();
        }
        Ok(())
    }

    async fn deactivate(&self, id: Uuid) -> Result<()> {
        if let Some(session) = self.rows.lock().unwrap().get_mut(&id) {
            session.is_active = false;
        }
        Ok(())
    }
}

// =============================================================================
// Mock provider
// =============================================================================

#[derive(Debug, Clone)]
enum SignInScript {
    Accept,
    RequirePassword,
    Reject(String),
}

#[derive(Debug, Clone)]
enum PasswordScript {
    Accept,
    Reject(String),
}

struct MockState {
    connect_failure: Option<String>,
    authorized: bool,
    sign_in: SignInScript,
    password: PasswordScript,
    account: AccountInfo,
    dialogs: Vec<Dialog>,
    messages: HashMap<i64, Vec<Message>>,
    /// Peers resolvable by direct id lookup. Dialog-only peers are not, so
    /// tests can exercise the dialog-scan fallback.
    direct_peers: Vec<i64>,

    // Recorded interactions
    connects: usize,
    code_requests: Vec<String>,
    dialog_scans: usize,
    resolve_calls: Vec<i64>,
    sent: Vec<(i64, String)>,
    marked_read: Vec<i64>,
    exports: usize,
}

impl Default for MockState {
    fn default() -> Self {
        Self {
            connect_failure: None,
            authorized: false,
            sign_in: SignInScript::Accept,
            password: PasswordScript::Accept,
            account: AccountInfo {
                id: 1000,
                first_name: Some("Test".to_string()),
                last_name: None,
                username: Some("test_account".to_string()),
                photo_id: None,
            },
            dialogs: Vec::new(),
            messages: HashMap::new(),
            direct_peers: Vec::new(),
            connects: 0,
            code_requests: Vec::new(),
            dialog_scans: 0,
            resolve_calls: Vec::new(),
            sent: Vec::new(),
            marked_read: Vec::new(),
            exports: 0,
        }
    }
}

/// Scripted provider connector with call recording
pub struct MockTelegram {
    state: Arc<Mutex<MockState>>,
}

impl Default for MockTelegram {
    fn default() -> Self {
        Self::new()
    }
}

impl MockTelegram {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(MockState::default())),
        }
    }

    /// Provider considers the connection signed in from the start.
    pub fn with_authorized(self) -> Self {
        self.state.lock().unwrap().authorized = true;
        self
    }

    /// Every connect attempt fails at the transport level.
    pub fn with_connect_failure(self, message: &str) -> Self {
        self.state.lock().unwrap().connect_failure = Some(message.to_string());
        self
    }

    pub fn with_sign_in_rejection(self, message: &str) -> Self {
        self.state.lock().unwrap().sign_in = SignInScript::Reject(message.to_string());
        self
    }

    /// Sign-in demands the two-factor password step.
    pub fn with_password_required(self) -> Self {
        self.state.lock().unwrap().sign_in = SignInScript::RequirePassword;
        self
    }

    pub fn with_password_rejection(self, message: &str) -> Self {
        self.state.lock().unwrap().password = PasswordScript::Reject(message.to_string());
        self
    }

    pub fn with_account(self, account: AccountInfo) -> Self {
        self.state.lock().unwrap().account = account;
        self
    }

    pub fn with_dialog(self, dialog: Dialog, messages: Vec<Message>) -> Self {
        let mut state = self.state.lock().unwrap();
        state.messages.insert(dialog.id, messages);
        state.dialogs.push(dialog);
        drop(state);
        self
    }

    pub fn with_direct_peer(self, peer_id: i64) -> Self {
        self.state.lock().unwrap().direct_peers.push(peer_id);
        self
    }

    pub fn connect_count(&self) -> usize {
        self.state.lock().unwrap().connects
    }

    /// Phones a login code was requested for
    pub fn code_requests(&self) -> Vec<String> {
        self.state.lock().unwrap().code_requests.clone()
    }

    pub fn dialog_scan_count(&self) -> usize {
        self.state.lock().unwrap().dialog_scans
    }

    pub fn resolve_calls(&self) -> Vec<i64> {
        self.state.lock().unwrap().resolve_calls.clone()
    }

    pub fn sent_messages(&self) -> Vec<(i64, String)> {
        self.state.lock().unwrap().sent.clone()
    }

    /// Chat ids a read acknowledge was sent for
    pub fn marked_read(&self) -> Vec<i64> {
        self.state.lock().unwrap().marked_read.clone()
    }
}

#[async_trait]
impl Connector for MockTelegram {
    async fn connect(&self, _session: Option<&str>) -> Result<Box<dyn Connection>, TelegramError> {
        let mut state = self.state.lock().unwrap();
        state.connects += 1;
        if let Some(message) = &state.connect_failure {
            return Err(TelegramError::Transport(message.clone()));
        }
        Ok(Box::new(MockConnection {
            state: self.state.clone(),
        }))
    }
}

struct MockConnection {
    state: Arc<Mutex<MockState>>,
}

#[async_trait]
impl Connection for MockConnection {
    async fn is_authorized(&mut self) -> Result<bool, TelegramError> {
        Ok(self.state.lock().unwrap().authorized)
    }

    async fn request_login_code(&mut self, phone: &str) -> Result<SentCode, TelegramError> {
        self.state
            .lock()
            .unwrap()
            .code_requests
            .push(phone.to_string());
        Ok(SentCode {
            phone_code_hash: "mock-code-hash".to_string(),
        })
    }

    async fn sign_in(
        &mut self,
        _phone: &str,
        _code: &str,
        _phone_code_hash: &str,
    ) -> Result<(), TelegramError> {
        let mut state = self.state.lock().unwrap();
        match state.sign_in.clone() {
            SignInScript::Accept => {
                state.authorized = true;
                Ok(())
            }
            SignInScript::RequirePassword => Err(TelegramError::PasswordRequired),
            SignInScript::Reject(message) => Err(TelegramError::AuthRejected(message)),
        }
    }

    async fn check_password(&mut self, _password: &str) -> Result<(), TelegramError> {
        let mut state = self.state.lock().unwrap();
        match state.password.clone() {
            PasswordScript::Accept => {
                state.authorized = true;
                Ok(())
            }
            PasswordScript::Reject(message) => Err(TelegramError::AuthRejected(message)),
        }
    }

    async fn get_me(&mut self) -> Result<AccountInfo, TelegramError> {
        Ok(self.state.lock().unwrap().account.clone())
    }

    async fn dialogs(&mut self, limit: Option<usize>) -> Result<Vec<Dialog>, TelegramError> {
        let mut state = self.state.lock().unwrap();
        state.dialog_scans += 1;
        let mut dialogs = state.dialogs.clone();
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
        Ok(self
            .state
            .lock()
            .unwrap()
            .messages
            .get(&chat_id)
            .map(|m| m.iter().take(limit).cloned().collect())
            .unwrap_or_default())
    }

    async fn send_message(&mut self, chat_id: i64, text: &str) -> Result<(), TelegramError> {
        let mut state = self.state.lock().unwrap();
        let known = state.dialogs.iter().any(|d| d.id == chat_id)
            || state.direct_peers.contains(&chat_id);
        if !known {
            return Err(TelegramError::PeerNotFound(chat_id.to_string()));
        }
        state.sent.push((chat_id, text.to_string()));
        Ok(())
    }

    async fn mark_read(&mut self, chat_id: i64) -> Result<(), TelegramError> {
        let mut state = self.state.lock().unwrap();
        state.marked_read.push(chat_id);
        if let Some(dialog) = state.dialogs.iter_mut().find(|d| d.id == chat_id) {
            dialog.unread_count = 0;
        }
        Ok(())
    }

    async fn resolve_peer(&mut self, peer_id: i64) -> Result<i64, TelegramError> {
        let mut state = self.state.lock().unwrap();
        state.resolve_calls.push(peer_id);
        if state.direct_peers.contains(&peer_id) {
            Ok(peer_id)
        } else {
            Err(TelegramError::PeerNotFound(peer_id.to_string()))
        }
    }

    fn export_session(&self) -> String {
        let mut state = self.state.lock().unwrap();
        state.exports += 1;
        format!("mock-credential-{}", state.exports)
    }

    async fn disconnect(&mut self) {}
}

// =============================================================================
// TestDependencies
// =============================================================================

/// Handles to the in-memory stores backing a test's ServerDeps
pub struct TestStores {
    pub users: Arc<InMemoryUserStore>,
    pub profiles: Arc<InMemoryProfileStore>,
    pub sessions: Arc<InMemorySessionStore>,
}

impl Default for TestStores {
    fn default() -> Self {
        Self::new()
    }
}

impl TestStores {
    pub fn new() -> Self {
        Self {
            users: Arc::new(InMemoryUserStore::default()),
            profiles: Arc::new(InMemoryProfileStore::default()),
            sessions: Arc::new(InMemorySessionStore::default()),
        }
    }
}

/// Everything a test needs: ServerDeps plus handles for scripting the
/// provider and inspecting storage.
pub struct TestDependencies {
    pub deps: ServerDeps,
    pub stores: TestStores,
    pub telegram: Arc<MockTelegram>,
}

impl Default for TestDependencies {
    fn default() -> Self {
        Self::new()
    }
}

impl TestDependencies {
    pub fn new() -> Self {
        Self::with_telegram(MockTelegram::new())
    }

    pub fn with_telegram(mock: MockTelegram) -> Self {
        let telegram = Arc::new(mock);
        let (deps, stores) = Self::deps_with_connector(telegram.clone());
        Self {
            deps,
            stores,
            telegram,
        }
    }

    /// Build deps around an arbitrary connector (e.g. the sandbox provider).
    pub fn deps_with_connector(connector: Arc<dyn Connector>) -> (ServerDeps, TestStores) {
        let stores = TestStores::new();
        let deps = ServerDeps::new(
            stores.users.clone(),
            stores.profiles.clone(),
            stores.sessions.clone(),
            connector,
            Arc::new(JwtService::new("test-secret", "test-issuer".to_string())),
            Duration::from_secs(5),
        );
        (deps, stores)
    }

    pub async fn seed_user(&self, email: &str) -> User {
        self.deps
            .users
            .create(email, "irrelevant-digest")
            .await
            .unwrap()
    }
}
