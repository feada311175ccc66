//! # User Records
//!
//! Types owned by the persistence layer and consumed by the middlewares and
//! the Discord services.

use std::fmt;

use serde::Serialize;
use time::OffsetDateTime;

/// A local site user as stored by the persistence layer.
///
/// The Discord token fields are only written by the OAuth token exchange.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct UserRecord {
    pub id: i64,
    /// Display name on the site. Not unique.
    pub username: String,
    #[serde(skip)]
    pub discord_access_token: Option<String>,
    #[serde(skip)]
    pub discord_refresh_token: Option<String>,
    #[serde(skip)]
    pub discord_token_expires_at: Option<OffsetDateTime>,
}

impl UserRecord {
    /// A user without any Discord connection yet.
    pub fn new(id: i64, username: impl Into<String>) -> Self {
        Self {
            id,
            username: username.into(),
            discord_access_token: None,
            discord_refresh_token: None,
            discord_token_expires_at: None,
        }
    }
}

/// Opaque identifier of a server-side session, carried in the `sub` claim of
/// the session token.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionId(String);

impl SessionId {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Generates a fresh random session id.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().simple().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
