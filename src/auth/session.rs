// src/auth/session.rs
//! In-process session store
//!
//! Sessions are keyed by an opaque token carried in a cookie. Each entry
//! holds the pending anti-forgery nonce and, once login succeeds, the
//! bound user id plus the credential needed for revocation on logout.
//! The store is deliberately ephemeral: a restart drops every session and
//! users log in again.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::common::id_generator::{generate_session_token, generate_state_nonce};

/// Per-session state. Identity fields are populated together by
/// [`SessionStore::bind_identity`] and wiped together by
/// [`SessionStore::clear_identity`]; nothing else mutates them.
#[derive(Debug, Clone, Default)]
pub struct SessionData {
    pub state_nonce: Option<String>,
    pub user_id: Option<String>,
    pub access_token: Option<String>,
    pub subject: Option<String>,
    pub email: Option<String>,
    pub name: Option<String>,
    pub picture: Option<String>,
}

/// Identity fields written into a session on successful login.
#[derive(Debug, Clone)]
pub struct BoundIdentity {
    pub user_id: String,
    pub access_token: String,
    pub subject: String,
    pub email: String,
    pub name: String,
    pub picture: Option<String>,
}

#[derive(Clone, Default)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<String, SessionData>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Create a fresh session and return its token.
    pub async fn create(&self) -> String {
        let token = generate_session_token();
        self.sessions
            .write()
            .await
            .insert(token.clone(), SessionData::default());
        token
    }

    /// Snapshot a session's state.
    pub async fn get(&self, token: &str) -> Option<SessionData> {
        self.sessions.read().await.get(token).cloned()
    }

    pub async fn exists(&self, token: &str) -> bool {
        self.sessions.read().await.contains_key(token)
    }

    /// Issue a new anti-forgery nonce for the pending login and store it
    /// in the session. Returns None if the session does not exist.
    pub async fn issue_nonce(&self, token: &str) -> Option<String> {
        let mut sessions = self.sessions.write().await;
        let session = sessions.get_mut(token)?;
        let nonce = generate_state_nonce();
        session.state_nonce = Some(nonce.clone());
        Some(nonce)
    }

    /// Bind a verified identity to the session in a single write. The
    /// consumed state nonce is dropped at the same time so it cannot be
    /// replayed. Returns false if the session has disappeared.
    pub async fn bind_identity(&self, token: &str, identity: BoundIdentity) -> bool {
        let mut sessions = self.sessions.write().await;
        match sessions.get_mut(token) {
            Some(session) => {
                *session = SessionData {
                    state_nonce: None,
                    user_id: Some(identity.user_id),
                    access_token: Some(identity.access_token),
                    subject: Some(identity.subject),
                    email: Some(identity.email),
                    name: Some(identity.name),
                    picture: identity.picture,
                };
                true
            }
            None => false,
        }
    }

    /// Clear every identity field of a session in one write. Partial
    /// clearing (credential gone but user id left behind) must not be
    /// observable. Returns false if the session does not exist.
    pub async fn clear_identity(&self, token: &str) -> bool {
        let mut sessions = self.sessions.write().await;
        match sessions.get_mut(token) {
            Some(session) => {
                *session = SessionData::default();
                true
            }
            None => false,
        }
    }
}
