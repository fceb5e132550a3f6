//! Application state management

use crate::api::ApiClient;
use crate::config::ApiConfig;
use crate::error::{AppError, Result};
use crate::feed::{QuoteFeed, QuoteSource};
use parking_lot::RwLock;
use std::sync::Arc;

/// User session information
#[derive(Debug, Clone)]
pub struct Session {
    pub username: String,
    pub logged_in_at: chrono::DateTime<chrono::Utc>,
}

/// The single piece of cross-view session state, injected into
/// anything that needs an identity instead of read ambiently.
///
/// "Logged out" means the slot is `None` — no other authentication
/// signal exists.
#[derive(Default)]
pub struct SessionStore {
    current: RwLock<Option<Session>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a session for a username, returning it.
    pub fn open(&self, username: &str) -> Session {
        let session = Session {
            username: username.to_string(),
            logged_in_at: chrono::Utc::now(),
        };
        *self.current.write() = Some(session.clone());
        session
    }

    /// Close the current session, if any.
    pub fn close(&self) {
        *self.current.write() = None;
    }

    pub fn current(&self) -> Option<Session> {
        self.current.read().clone()
    }

    pub fn is_logged_in(&self) -> bool {
        self.current.read().is_some()
    }

    /// Username of the logged-in user, or an authentication error
    /// prompting re-login. Every action that talks to the backend on
    /// the user's behalf goes through this gate first.
    pub fn username(&self) -> Result<String> {
        self.current
            .read()
            .as_ref()
            .map(|session| session.username.clone())
            .ok_or_else(|| AppError::Auth("Please login again (username missing)".to_string()))
    }
}

/// Application state shared across all services.
pub struct AppState {
    /// Resolved endpoint configuration
    pub config: ApiConfig,

    /// Shared REST client
    pub api: Arc<ApiClient>,

    /// Current user session
    pub session: Arc<SessionStore>,

    /// Shared live-quote pollers
    pub feed: QuoteFeed,
}

impl AppState {
    /// Create application state around an explicit configuration.
    pub fn new(config: ApiConfig) -> Self {
        let api = Arc::new(ApiClient::new(config.clone()));
        let feed = QuoteFeed::new(Arc::clone(&api) as Arc<dyn QuoteSource>);

        Self {
            config,
            api,
            session: Arc::new(SessionStore::new()),
            feed,
        }
    }

    /// Create application state from the environment.
    pub fn from_env() -> Result<Self> {
        Ok(Self::new(ApiConfig::from_env()?))
    }
}
