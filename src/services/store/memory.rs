use async_trait::async_trait;
use dashmap::DashMap;
use time::OffsetDateTime;
use tracing::{debug, instrument};

use super::{StoreError, UserStore, hash_session_id, token_expiry};
use crate::models::{ProviderTokens, SessionId, UserRecord};
use crate::utils::constant::SESSION_TOKEN_EXPIRY;

/// In-process user store.
///
/// Used when no `DATABASE_URL` is configured and by the test-suite. Nothing
/// survives a restart.
#[derive(Debug, Default)]
pub struct MemoryUserStore {
    users: DashMap<i64, UserRecord>,
    /// session hash -> (user id, expiry)
    sessions: DashMap<String, (i64, OffsetDateTime)>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a user.
    pub fn insert_user(&self, user: UserRecord) {
        self.users.insert(user.id, user);
    }

    /// Opens a session for the user and returns its id.
    pub fn create_session(&self, user_id: i64) -> SessionId {
        let session_id = SessionId::generate();
        self.insert_session(
            &session_id,
            user_id,
            OffsetDateTime::now_utc() + SESSION_TOKEN_EXPIRY,
        );
        session_id
    }

    pub fn insert_session(&self, session_id: &SessionId, user_id: i64, expires_at: OffsetDateTime) {
        self.sessions
            .insert(hash_session_id(session_id), (user_id, expires_at));
    }

    /// Snapshot of a stored user, bypassing the async trait.
    pub fn user(&self, user_id: i64) -> Option<UserRecord> {
        self.users.get(&user_id).map(|entry| entry.value().clone())
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    #[instrument(skip_all)]
    async fn find_user_by_session(
        &self,
        session_id: &SessionId,
    ) -> Result<Option<UserRecord>, StoreError> {
        // copy out of the map before touching `users`, no nested guards
        let session = self
            .sessions
            .get(&hash_session_id(session_id))
            .map(|entry| *entry.value());

        let Some((user_id, expires_at)) = session else {
            debug!("Session not found");
            return Ok(None);
        };

        if expires_at <= OffsetDateTime::now_utc() {
            debug!(user_id, "Session expired");
            return Ok(None);
        }

        Ok(self.user(user_id))
    }

    async fn find_user_by_id(&self, user_id: i64) -> Result<Option<UserRecord>, StoreError> {
        Ok(self.user(user_id))
    }

    #[instrument(skip(self, tokens))]
    async fn update_user_tokens(
        &self,
        user_id: i64,
        tokens: &ProviderTokens,
    ) -> Result<UserRecord, StoreError> {
        let mut entry = self
            .users
            .get_mut(&user_id)
            .ok_or(StoreError::UserNotFound(user_id))?;

        let user = entry.value_mut();
        user.discord_access_token = Some(tokens.access_token.clone());
        user.discord_refresh_token = tokens.refresh_token.clone();
        user.discord_token_expires_at = token_expiry(tokens);

        debug!("Stored Discord tokens");
        Ok(user.clone())
    }
}
