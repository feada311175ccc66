use std::sync::Arc;

use secrecy::SecretString;
use tracing::info;

use crate::middleware::{MiddlewareChain, default_chain};
use crate::services::discord::{DiscordOAuth, IdentityProvider};
use crate::services::session::SessionService;
use crate::services::store::UserStore;
use crate::utils::config::{ConfigError, DiscordConfig};

/// Application state shared across requests. Needs to be thread-safe.
///
/// Immutable after startup; per-request data lives in
/// [`RequestContext`](super::RequestContext).
pub struct AppState {
    /// Persistence layer for users and sessions.
    pub store: Arc<dyn UserStore>,
    /// Session token signing and validation.
    pub sessions: Arc<SessionService>,
    /// The OAuth provider accounts get connected to.
    pub identity_provider: Arc<dyn IdentityProvider>,
    /// Middlewares run in front of every Discord route.
    pub chain: MiddlewareChain,
}

impl AppState {
    /// Creates a new application state with the provided services and the
    /// default middleware chain.
    ///
    /// # Arguments
    ///
    /// * `store` - Persistence layer for users and sessions
    /// * `sessions` - Service validating session tokens
    /// * `identity_provider` - OAuth provider for the connect flow
    pub fn new(
        store: Arc<dyn UserStore>,
        sessions: Arc<SessionService>,
        identity_provider: Arc<dyn IdentityProvider>,
    ) -> Self {
        info!("Initializing application state");
        let chain = default_chain(Arc::clone(&sessions), Arc::clone(&store));

        Self {
            store,
            sessions,
            identity_provider,
            chain,
        }
    }

    /// Creates the state with the real Discord client.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the Discord client cannot be built.
    pub fn with_discord(
        store: Arc<dyn UserStore>,
        discord: DiscordConfig,
        session_secret: &SecretString,
    ) -> Result<Self, ConfigError> {
        let sessions = Arc::new(SessionService::from_secret(session_secret));
        let discord = Arc::new(DiscordOAuth::new(discord, Arc::clone(&store))?);
        Ok(Self::new(store, sessions, discord))
    }
}
