use std::sync::Arc;

use crate::config::Config;
use crate::repositories::{
    api::RemoteApi,
    http::HttpApi,
    session::{FileSessionStore, SessionStore},
};

/// The client's shared state: configuration plus the two collaborators
/// every component needs.
#[derive(Clone)]
pub struct AppState {
    /// The client's configuration.
    pub config: Config,
    /// The remote API.
    pub api: Arc<dyn RemoteApi>,
    /// Durable session storage.
    pub sessions: Arc<dyn SessionStore>,
}

impl AppState {
    /// Creates a new `AppState` talking HTTP and storing the session on disk.
    ///
    /// # Arguments
    ///
    /// * `config` - The client's configuration.
    pub fn new(config: &Config) -> Self {
        let api = HttpApi::new(&config.api_url);
        tracing::info!("✅ HTTP client initialized for {}", api.base_url());

        let sessions = FileSessionStore::new(&config.session_file);
        tracing::info!("✅ Session store at {}", sessions.path().display());

        Self::with_parts(config.clone(), Arc::new(api), Arc::new(sessions))
    }

    /// Assembles a state from explicit collaborators.
    pub fn with_parts(
        config: Config,
        api: Arc<dyn RemoteApi>,
        sessions: Arc<dyn SessionStore>,
    ) -> Self {
        Self {
            config,
            api,
            sessions,
        }
    }
}
