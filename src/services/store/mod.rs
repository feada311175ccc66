//! # User Store
//!
//! Persistence capabilities consumed by the middlewares and the Discord
//! services. The rest of the application only sees the [`UserStore`] trait.
//!
//! ## Implementations
//!
//! - [`PgUserStore`] - PostgreSQL backed store used in production
//! - [`MemoryUserStore`] - In-process store for development and tests

mod memory;
mod postgres;

pub use memory::MemoryUserStore;
pub use postgres::PgUserStore;

use async_trait::async_trait;
use sha2::{Digest, Sha256};
use thiserror::Error;
use time::OffsetDateTime;
use tracing::warn;

use crate::models::{ProviderTokens, SessionId, UserRecord};

/// Errors that can occur during store operations
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Db(#[from] sqlx::Error),
    #[error("user {0} not found")]
    UserNotFound(i64),
}

/// Persistence layer for users and their sessions
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Looks up the user owning a live session.
    ///
    /// Returns `Ok(None)` for unknown or expired sessions.
    async fn find_user_by_session(
        &self,
        session_id: &SessionId,
    ) -> Result<Option<UserRecord>, StoreError>;

    async fn find_user_by_id(&self, user_id: i64) -> Result<Option<UserRecord>, StoreError>;

    /// Writes the Discord token fields of a user and returns the updated record.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::UserNotFound`] if no user has the given id.
    async fn update_user_tokens(
        &self,
        user_id: i64,
        tokens: &ProviderTokens,
    ) -> Result<UserRecord, StoreError>;
}

/// Session ids are only ever stored hashed.
pub fn hash_session_id(session_id: &SessionId) -> String {
    let mut hasher = Sha256::new();
    hasher.update(session_id.as_str().as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Absolute expiry of an access token issued now.
///
/// `expires_in` comes from the provider; a lifetime that doesn't fit into a
/// date is stored as unknown.
fn token_expiry(tokens: &ProviderTokens) -> Option<OffsetDateTime> {
    let expires_in = tokens.expires_in?;
    let expiry = i64::try_from(expires_in)
        .ok()
        .and_then(|secs| OffsetDateTime::now_utc().checked_add(time::Duration::seconds(secs)));
    if expiry.is_none() {
        warn!(expires_in, "Ignoring out of range token lifetime");
    }
    expiry
}
