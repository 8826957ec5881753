//! Session lifecycle: startup restore, login, registration, logout

use std::sync::Arc;
use tokio::sync::{watch, Mutex};

use super::state::{AuthStatus, Session};
use crate::api::{ApiClient, CredentialProvider};
use crate::auth::{
    inspect_token, validate_registration, LoginRequest, PasswordChange, ProfileUpdate,
    RegisterRequest, RegistrationForm, User,
};
use crate::config::{Config, RegistrationConfig};
use crate::error::{Error, Result};
use crate::storage::{self, SecureStore, TOKEN_KEY};

/// Tunables for a [`SessionManager`]
#[derive(Debug, Clone)]
pub struct SessionSettings {
    /// Storage key holding the bearer token
    pub token_key: String,
    /// Drop the session when any call is rejected as unauthorized
    pub invalidate_on_unauthorized: bool,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            token_key: TOKEN_KEY.to_string(),
            invalidate_on_unauthorized: true,
        }
    }
}

impl SessionSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            token_key: config.storage.token_key.clone(),
            invalidate_on_unauthorized: config.session.invalidate_on_unauthorized,
        }
    }
}

/// Owner of the process-wide session.
///
/// Cloning is cheap and every clone drives the same session. All state
/// changes go through [`SessionManager::publish`], which notifies
/// subscribers. Session-mutating operations are serialized by one guard:
/// login and registration fail with [`Error::Busy`] while another operation
/// is in flight, logout waits for it.
#[derive(Clone)]
pub struct SessionManager {
    inner: Arc<Inner>,
}

struct Inner {
    api: ApiClient,
    store: Arc<dyn SecureStore>,
    settings: SessionSettings,
    state: watch::Sender<Session>,
    op_guard: Mutex<()>,
}

impl SessionManager {
    /// Create a manager in the `Unknown` state. The API client's credential
    /// provider becomes the one this manager installs tokens into.
    pub fn new(api: ApiClient, store: Arc<dyn SecureStore>, settings: SessionSettings) -> Self {
        let (state, _) = watch::channel(Session::unknown());
        Self {
            inner: Arc::new(Inner {
                api,
                store,
                settings,
                state,
                op_guard: Mutex::new(()),
            }),
        }
    }

    /// Build the manager, API client and encrypted store described by `config`
    pub fn from_config(config: &Config) -> Result<Self> {
        let store = storage::open_store(&config.storage)?;
        let api = ApiClient::new(&config.api, CredentialProvider::new())?;
        Ok(Self::new(
            api,
            Arc::new(store),
            SessionSettings::from_config(config),
        ))
    }

    /// The API client whose credential this session controls
    pub fn api(&self) -> &ApiClient {
        &self.inner.api
    }

    fn credentials(&self) -> &CredentialProvider {
        self.inner.api.credentials()
    }

    fn token_key(&self) -> &str {
        &self.inner.settings.token_key
    }

    // ------------------------------------------------------------------
    // Reads
    // ------------------------------------------------------------------

    /// Snapshot of the current session
    pub fn session(&self) -> Session {
        self.inner.state.borrow().clone()
    }

    pub fn status(&self) -> AuthStatus {
        self.inner.state.borrow().status()
    }

    pub fn user(&self) -> Option<User> {
        self.inner.state.borrow().user().cloned()
    }

    pub fn token(&self) -> Option<String> {
        self.inner.state.borrow().token().map(str::to_string)
    }

    /// `Authorization` header value for the current session, if signed in
    pub fn authorization_header_value(&self) -> Option<String> {
        self.credentials().header_value()
    }

    /// Receive every session change
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.inner.state.subscribe()
    }

    /// Wait until startup has resolved the session
    pub async fn wait_until_resolved(&self) -> AuthStatus {
        let mut rx = self.subscribe();
        let resolved = rx
            .wait_for(|session| session.status().is_resolved())
            .await
            .map(|session| session.status());
        resolved.unwrap_or_else(|_| self.status())
    }

    fn publish(&self, session: Session) {
        tracing::debug!("Session is now {}", session.status());
        self.inner.state.send_replace(session);
    }

    // ------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------

    /// Restore the persisted session. Runs once; later calls return the
    /// resolved status untouched.
    pub async fn initialize(&self) -> AuthStatus {
        let _guard = self.inner.op_guard.lock().await;

        let current = self.status();
        if current.is_resolved() {
            tracing::debug!("Session already resolved as {}", current);
            return current;
        }

        let restored = self.restore().await;
        self.publish(restored);
        self.status()
    }

    async fn restore(&self) -> Session {
        let token = match self.inner.store.get(self.token_key()) {
            Ok(Some(token)) if !token.trim().is_empty() => token,
            Ok(_) => {
                tracing::info!("No stored session");
                return Session::signed_out();
            }
            Err(e) => {
                tracing::warn!("Failed to read stored token: {}", e);
                return Session::signed_out();
            }
        };

        if inspect_token(&token).is_some_and(|claims| claims.is_expired()) {
            tracing::info!("Stored token has expired, discarding it");
            self.purge_stored_token();
            return Session::signed_out();
        }

        self.credentials().install(&token);

        match self.inner.api.fetch_profile().await {
            Ok(user) => {
                tracing::info!("Restored session for {}", user.email);
                Session::signed_in(token, user)
            }
            Err(e) => {
                tracing::warn!("Stored token was not accepted: {}", e);
                self.credentials().clear();
                self.purge_stored_token();
                Session::signed_out()
            }
        }
    }

    /// Sign in with email and password
    pub async fn login(&self, email: &str, password: &str) -> Result<User> {
        let _guard = self.inner.op_guard.try_lock().map_err(|_| Error::Busy)?;

        let request = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };

        let token = match self.inner.api.login(&request).await {
            Ok(token) => token,
            Err(e) => {
                tracing::warn!("Login failed for {}: {}", email, e);
                return Err(e);
            }
        };

        self.commit(token).await
    }

    /// Create an account and sign in with it
    pub async fn register(&self, name: &str, email: &str, password: &str) -> Result<User> {
        let _guard = self.inner.op_guard.try_lock().map_err(|_| Error::Busy)?;

        let request = RegisterRequest {
            name: Some(name.to_string()),
            email: email.to_string(),
            password: password.to_string(),
        };

        let token = match self.inner.api.register(&request).await {
            Ok(token) => token,
            Err(e) => {
                tracing::warn!("Registration failed for {}: {}", email, e);
                return Err(e);
            }
        };

        self.commit(token).await
    }

    /// Validate a registration form locally, then register
    pub async fn register_form(
        &self,
        form: &RegistrationForm,
        rules: &RegistrationConfig,
    ) -> Result<User> {
        validate_registration(form, rules)?;
        self.register(form.name.trim(), &form.email, &form.password)
            .await
    }

    /// Adopt a freshly issued token. Nothing is persisted, installed or
    /// published unless every step succeeds.
    async fn commit(&self, token: String) -> Result<User> {
        let user = match self.inner.api.fetch_profile_with(&token).await {
            Ok(user) => user,
            Err(e) => {
                tracing::warn!("Could not load profile for new token: {}", e);
                return Err(e);
            }
        };

        if let Err(e) = self.inner.store.set(self.token_key(), &token) {
            tracing::error!("Failed to persist token: {}", e);
            return Err(e);
        }

        self.credentials().install(&token);
        self.publish(Session::signed_in(token, user.clone()));
        tracing::info!("Signed in as {}", user.email);
        Ok(user)
    }

    /// Sign out.
    ///
    /// The in-memory session and installed credential are always cleared
    /// first. A failure to delete the persisted token is returned afterwards.
    pub async fn logout(&self) -> Result<()> {
        let _guard = self.inner.op_guard.lock().await;

        self.clear_local();

        if let Err(e) = self.inner.store.delete(self.token_key()) {
            tracing::error!("Signed out, but the stored token could not be deleted: {}", e);
            return Err(e);
        }

        tracing::info!("Signed out");
        Ok(())
    }

    /// Drop the session after the server rejected its token
    pub async fn invalidate(&self) {
        let _guard = self.inner.op_guard.lock().await;
        if self.status() == AuthStatus::Unauthenticated {
            return;
        }
        self.end_rejected_session();
    }

    /// Drop the session only if `token` is still the current one once the
    /// guard is held. A login that commits while we wait keeps its session.
    async fn invalidate_if_current(&self, token: &str) {
        let _guard = self.inner.op_guard.lock().await;
        if self.token().as_deref() != Some(token) {
            tracing::debug!("Ignoring rejection of a token that is no longer current");
            return;
        }
        self.end_rejected_session();
    }

    fn end_rejected_session(&self) {
        tracing::warn!("Session rejected by the server, signing out");
        self.clear_local();
        self.purge_stored_token();
    }

    /// Central reaction to a failed API call made with `sent_token`.
    ///
    /// Only an unauthorized rejection of the token that is still current
    /// ends the session; a stale rejection cannot sign out a newer login.
    pub async fn handle_rejection(&self, sent_token: Option<&str>, error: &Error) {
        if !self.inner.settings.invalidate_on_unauthorized || !error.is_unauthorized() {
            return;
        }

        if let Some(sent) = sent_token {
            self.invalidate_if_current(sent).await;
        }
    }

    fn clear_local(&self) {
        self.credentials().clear();
        self.publish(Session::signed_out());
    }

    fn purge_stored_token(&self) {
        if let Err(e) = self.inner.store.delete(self.token_key()) {
            tracing::warn!("Failed to delete stored token: {}", e);
        }
    }

    // ------------------------------------------------------------------
    // Profile
    // ------------------------------------------------------------------

    fn require_token(&self) -> Result<String> {
        self.token().ok_or(Error::NotAuthenticated)
    }

    /// Run an authenticated call, routing rejections through [`Self::handle_rejection`]
    async fn authorized<T, F>(&self, call: F) -> Result<T>
    where
        F: std::future::Future<Output = Result<T>>,
    {
        let token = self.require_token()?;
        let result = call.await;
        if let Err(e) = &result {
            self.handle_rejection(Some(&token), e).await;
        }
        result
    }

    /// Replace the session's user if `token` is still the current one
    async fn replace_user(&self, token: &str, user: User) {
        let _guard = self.inner.op_guard.lock().await;
        let session = self.session();
        if session.token() == Some(token) {
            self.publish(session.with_user(user));
        }
    }

    /// Re-fetch the signed-in user's profile
    pub async fn refresh_profile(&self) -> Result<User> {
        let token = self.require_token()?;
        let user = self.authorized(self.inner.api.fetch_profile()).await?;
        self.replace_user(&token, user.clone()).await;
        Ok(user)
    }

    /// Change name and/or email
    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<User> {
        if update.is_empty() {
            return Err(Error::Validation("Nothing to update".to_string()));
        }
        if update.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
            return Err(Error::Validation("Name cannot be empty".to_string()));
        }
        if update.email.as_deref().is_some_and(|e| !e.contains('@')) {
            return Err(Error::Validation("Please enter a valid email".to_string()));
        }

        let token = self.require_token()?;
        let user = self
            .authorized(self.inner.api.update_profile(update))
            .await?;
        self.replace_user(&token, user.clone()).await;
        tracing::info!("Profile updated for {}", user.email);
        Ok(user)
    }

    pub async fn change_password(&self, current: &str, new: &str) -> Result<()> {
        if current.is_empty() || new.is_empty() {
            return Err(Error::Validation("Both passwords are required".to_string()));
        }

        let change = PasswordChange {
            current_password: current.to_string(),
            new_password: new.to_string(),
        };
        self.authorized(self.inner.api.change_password(&change))
            .await?;
        tracing::info!("Password changed");
        Ok(())
    }

    /// Delete the account on the server, then sign out locally
    pub async fn delete_account(&self) -> Result<()> {
        self.authorized(self.inner.api.delete_account()).await?;
        tracing::info!("Account deleted");
        self.logout().await
    }
}
