use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use crate::api::ApiClient;
use crate::error::{AppError, AppResult};
use crate::gate::SessionState;
use crate::models::{Identity, User};

use super::token;

/// File-backed stand-in for the browser's token storage.
#[derive(Debug, Clone)]
pub struct TokenStore {
    path: PathBuf,
}

impl TokenStore {
    pub fn new(path: &str) -> Self {
        Self {
            path: PathBuf::from(path),
        }
    }

    pub fn load(&self) -> Option<String> {
        fs::read_to_string(&self.path)
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    }

    pub fn save(&self, token: &str) -> AppResult<()> {
        fs::write(&self.path, token)
            .map_err(|e| AppError::Internal(format!("could not persist token: {e}")))
    }

    pub fn clear(&self) {
        if let Err(e) = fs::remove_file(&self.path) {
            if e.kind() != ErrorKind::NotFound {
                tracing::warn!("Could not remove cached token: {e}");
            }
        }
    }
}

/// The one owned session object. Created once at startup, torn down by
/// `logout`; everything else borrows it.
#[derive(Debug)]
pub struct AuthSession {
    token: Option<String>,
    identity: Option<Identity>,
    loading: bool,
}

impl Default for AuthSession {
    fn default() -> Self {
        Self::new()
    }
}

impl AuthSession {
    pub fn new() -> Self {
        Self {
            token: None,
            identity: None,
            loading: true,
        }
    }

    /// Restore a previous session from the token store, if any. A token
    /// that no longer decodes is wiped so the next start comes up clean.
    pub fn restore(&mut self, store: &TokenStore) {
        if let Some(token) = store.load() {
            match token::decode(&token) {
                Ok(identity) => {
                    self.token = Some(token);
                    self.identity = Some(identity);
                }
                Err(e) => {
                    tracing::warn!("Cached token is invalid, clearing it: {e}");
                    store.clear();
                }
            }
        }
        self.loading = false;
    }

    /// Persist the token and install the decoded identity. On a decode
    /// failure nothing stays stored and the error propagates.
    pub fn login(&mut self, store: &TokenStore, token: &str) -> AppResult<()> {
        self.loading = false;
        match token::decode(token) {
            Ok(identity) => {
                store.save(token)?;
                self.token = Some(token.to_string());
                self.identity = Some(identity);
                Ok(())
            }
            Err(e) => {
                store.clear();
                self.token = None;
                self.identity = None;
                Err(e)
            }
        }
    }

    /// Purely client-side: the server keeps no session to invalidate.
    pub fn logout(&mut self, store: &TokenStore) {
        store.clear();
        self.token = None;
        self.identity = None;
        self.loading = false;
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    pub fn state(&self) -> SessionState {
        if self.loading {
            return SessionState::Loading;
        }
        match self.identity.as_ref().and_then(|i| i.role.clone()) {
            Some(role) => SessionState::Authenticated(role),
            None => SessionState::Unauthenticated,
        }
    }

    /// Tokens minted before the id claim existed carry no user id. Patch
    /// it in from the user directory by email. Best effort: on any
    /// failure the session stays usable with `id == None`.
    pub async fn ensure_user_id(&mut self, api: &ApiClient) {
        let email = match self.identity.as_ref() {
            Some(identity) if identity.id.is_none() && !identity.email.is_empty() => {
                identity.email.clone()
            }
            _ => return,
        };

        match api.get_json::<Vec<User>>("/usuario").await {
            Ok(users) => {
                match users.iter().find(|u| u.email.eq_ignore_ascii_case(&email)) {
                    Some(user) => {
                        if let Some(identity) = self.identity.as_mut() {
                            identity.id = Some(user.id);
                            tracing::debug!("Resolved user id {} for {email}", user.id);
                        }
                    }
                    None => tracing::warn!("No user directory entry matches {email}"),
                }
            }
            Err(e) => tracing::warn!("User id lookup failed: {e}"),
        }
    }
}
