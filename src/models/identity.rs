//! # Discord Identity Types

use serde::{Deserialize, Serialize};

/// Tokens returned by the Discord token endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderTokens {
    pub access_token: String,
    pub token_type: String,
    /// Access token lifetime in seconds
    #[serde(default)]
    pub expires_in: Option<u64>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub scope: Option<String>,
}

/// Discord profile of the connected account.
///
/// Built fresh on every fetch and never persisted; only the refresh token it
/// carries lives on in the [`UserRecord`](super::UserRecord).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderIdentity {
    pub user_id: String,
    pub username: String,
    pub avatar_url: String,
    pub refresh_token: Option<String>,
}

impl ProviderIdentity {
    /// Discord answered, but without a username. Treated as a provider error
    /// by the page state resolver.
    #[inline]
    pub fn is_incomplete(&self) -> bool {
        self.username.is_empty()
    }
}
