use chrono::{DateTime, Duration, Utc};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[serde(alias = "Admin", alias = "ADMIN")]
    Admin,
    #[serde(alias = "Editor", alias = "EDITOR")]
    Editor,
    #[serde(alias = "Viewer", alias = "VIEWER")]
    Viewer,
}

impl Role {
    /// Admins and editors may build queries and charts.
    pub fn can_edit(self) -> bool {
        matches!(self, Self::Admin | Self::Editor)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Admin => "admin",
            Self::Editor => "editor",
            Self::Viewer => "viewer",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "admin" => Ok(Self::Admin),
            "editor" => Ok(Self::Editor),
            "viewer" => Ok(Self::Viewer),
            _ => Err(format!("Unknown role: {s}")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
}

pub type UnauthorizedHook = Arc<dyn Fn() + Send + Sync>;

#[derive(Debug, Default)]
struct SessionState {
    token: Option<String>,
    user: Option<User>,
    expires_at: Option<DateTime<Utc>>,
}

/// Shared authentication context. Every request made through an
/// [`ApiClient`](crate::api::ApiClient) built from this session reads the
/// token from here; only sign-in and sign-out write it.
#[derive(Clone, Default)]
pub struct Session {
    state: Arc<RwLock<SessionState>>,
    on_unauthorized: Option<UnauthorizedHook>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.read();
        f.debug_struct("Session")
            .field("has_token", &state.token.is_some())
            .field("user", &state.user)
            .field("expires_at", &state.expires_at)
            .field("on_unauthorized", &self.on_unauthorized.is_some())
            .finish()
    }
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Session seeded with a token obtained elsewhere (environment, keyring).
    /// No expiry is tracked for it.
    pub fn with_token(token: impl Into<String>) -> Self {
        let session = Self::new();
        session.write().token = Some(token.into());
        session
    }

    pub fn on_unauthorized<F>(mut self, hook: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.on_unauthorized = Some(Arc::new(hook));
        self
    }

    pub fn sign_in(&self, token: String, user: User, ttl: Duration) {
        let expires_at = Utc::now() + ttl;
        info!("Signed in as {} ({})", user.email, user.role);
        let mut state = self.write();
        state.token = Some(token);
        state.user = Some(user);
        state.expires_at = Some(expires_at);
    }

    pub fn set_user(&self, user: User) {
        self.write().user = Some(user);
    }

    /// Current bearer token, unless it has expired.
    pub fn token(&self) -> Option<String> {
        let state = self.read();
        match state.expires_at {
            Some(exp) if Utc::now() >= exp => None,
            _ => state.token.clone(),
        }
    }

    pub fn current_user(&self) -> Option<User> {
        self.read().user.clone()
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.read().expires_at
    }

    pub fn is_valid(&self) -> bool {
        self.token().is_some()
    }

    pub fn can_edit(&self) -> bool {
        self.read().user.as_ref().is_some_and(|u| u.role.can_edit())
    }

    pub fn clear(&self) {
        *self.write() = SessionState::default();
    }

    /// Called by the HTTP client on a 401: drops all auth state and notifies
    /// the embedding application so it can route back to login.
    pub fn expire(&self) {
        warn!("Session rejected by server, clearing local auth state");
        self.clear();
        if let Some(hook) = &self.on_unauthorized {
            hook();
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, SessionState> {
        self.state.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, SessionState> {
        self.state.write().unwrap_or_else(|e| e.into_inner())
    }
}
