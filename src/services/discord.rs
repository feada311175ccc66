//! # Discord OAuth Service
//!
//! This module connects a local account to Discord using the OAuth 2.0
//! authorization code grant. The flow consists of:
//!
//! 1. Exchanging the authorization code for access and refresh tokens, and
//!    persisting them on the local user record
//! 2. Fetching the Discord profile with the stored access token
//!
//! The [`IdentityProvider`] trait is the seam the page state resolver and the
//! handlers depend on, so tests can swap the network out.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{StatusCode, Url};
use secrecy::ExposeSecret;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, error, info, instrument, warn};

use crate::models::{ProviderIdentity, ProviderTokens, UserRecord};
use crate::services::store::{StoreError, UserStore};
use crate::utils::config::{ConfigError, DiscordConfig};
use crate::utils::constant::{DISCORD_DEFAULT_AVATAR_COUNT, DISCORD_SCOPES, USER_AGENT};

/// Longest provider error body kept in an error message
const MAX_ERROR_BODY_LEN: usize = 200;

/// Errors of the authorization code exchange.
///
/// Authorization codes are single-use, so replaying a consumed code ends up
/// as [`AuthCodeExchangeError::Rejected`].
#[derive(Debug, Error)]
pub enum AuthCodeExchangeError {
    #[error("authorization code is missing")]
    MissingCode,
    #[error("user {0} does not exist")]
    UnknownUser(i64),
    #[error("token request failed: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("Discord rejected the authorization code ({status}): {reason}")]
    Rejected { status: StatusCode, reason: String },
    #[error("unreadable token response: {0}")]
    InvalidResponse(String),
    #[error("failed to store tokens: {0}")]
    Store(#[from] StoreError),
}

/// Errors of the identity fetch.
#[derive(Debug, Error)]
pub enum ProviderFetchError {
    #[error("user has no Discord access token")]
    MissingAccessToken,
    #[error("identity request failed: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("Discord rejected the identity request ({status}): {reason}")]
    Rejected { status: StatusCode, reason: String },
    #[error("unreadable identity response: {0}")]
    InvalidResponse(String),
}

/// An OAuth identity provider a local account can be connected to
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// URL the user is sent to in order to grant access.
    fn authorize_url(&self) -> String;

    /// Exchanges an authorization code for tokens and stores them on the user.
    ///
    /// # Errors
    ///
    /// Returns [`AuthCodeExchangeError`] if the code is missing, the provider
    /// rejects it, or the tokens cannot be stored.
    async fn exchange_code(
        &self,
        user_id: i64,
        code: &str,
    ) -> Result<UserRecord, AuthCodeExchangeError>;

    /// Fetches the provider profile of a user that went through [`exchange_code`].
    ///
    /// A profile without a username is returned as `Ok`; callers decide what an
    /// incomplete profile means.
    ///
    /// [`exchange_code`]: IdentityProvider::exchange_code
    async fn fetch_identity(&self, user: &UserRecord)
    -> Result<ProviderIdentity, ProviderFetchError>;
}

/// The subset of `GET /users/@me` we care for
#[derive(Debug, Deserialize)]
struct DiscordUser {
    id: String,
    #[serde(default)]
    username: String,
    #[serde(default)]
    avatar: Option<String>,
}

/// Error body of the Discord OAuth endpoints
#[derive(Debug, Deserialize)]
struct OAuthErrorBody {
    error: String,
    #[serde(default)]
    error_description: Option<String>,
}

/// Discord implementation of [`IdentityProvider`] over reqwest
pub struct DiscordOAuth {
    config: DiscordConfig,
    authorize_url: Url,
    http_client: reqwest::Client,
    store: Arc<dyn UserStore>,
}

impl DiscordOAuth {
    /// Creates the Discord client.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the API base is not a valid URL or the HTTP
    /// client cannot be built.
    pub fn new(config: DiscordConfig, store: Arc<dyn UserStore>) -> Result<Self, ConfigError> {
        let mut authorize_url =
            Url::parse(&config.authorize_url()).map_err(|e| ConfigError::InvalidValue {
                var: "DISCORD_API_BASE",
                value: e.to_string(),
            })?;
        authorize_url
            .query_pairs_mut()
            .append_pair("client_id", &config.client_id)
            .append_pair("response_type", "code")
            .append_pair("redirect_uri", &config.redirect_uri)
            .append_pair("scope", DISCORD_SCOPES);

        let http_client = reqwest::Client::builder().user_agent(USER_AGENT).build()?;

        info!(api_base = %config.api_base, "Initializing Discord OAuth client");
        Ok(Self {
            config,
            authorize_url,
            http_client,
            store,
        })
    }

    fn avatar_url(&self, user: &DiscordUser) -> String {
        let cdn = &self.config.cdn_base;
        match user.avatar.as_deref() {
            Some(hash) if hash.starts_with("a_") => {
                format!("{cdn}/avatars/{}/{hash}.gif", user.id)
            }
            Some(hash) => format!("{cdn}/avatars/{}/{hash}.png", user.id),
            None => {
                let index = user.id.parse::<u64>().map_or(0, |id| {
                    (id >> 22) % DISCORD_DEFAULT_AVATAR_COUNT
                });
                format!("{cdn}/embed/avatars/{index}.png")
            }
        }
    }
}

/// Turns a provider error body into something short enough for a message.
fn rejection_reason(body: &str) -> String {
    if let Ok(parsed) = serde_json::from_str::<OAuthErrorBody>(body) {
        return match parsed.error_description {
            Some(description) => format!("{}: {description}", parsed.error),
            None => parsed.error,
        };
    }
    body.chars().take(MAX_ERROR_BODY_LEN).collect()
}

#[async_trait]
impl IdentityProvider for DiscordOAuth {
    fn authorize_url(&self) -> String {
        self.authorize_url.to_string()
    }

    #[instrument(skip(self, code), fields(code_length = code.len()))]
    async fn exchange_code(
        &self,
        user_id: i64,
        code: &str,
    ) -> Result<UserRecord, AuthCodeExchangeError> {
        if code.is_empty() {
            warn!("Token exchange attempted without an authorization code");
            return Err(AuthCodeExchangeError::MissingCode);
        }

        if self.store.find_user_by_id(user_id).await?.is_none() {
            warn!("Token exchange attempted for an unknown user");
            return Err(AuthCodeExchangeError::UnknownUser(user_id));
        }

        debug!("Requesting Discord access token");
        let response = self
            .http_client
            .post(self.config.token_url())
            .basic_auth(
                &self.config.client_id,
                Some(self.config.client_secret.expose_secret()),
            )
            .form(&[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("redirect_uri", self.config.redirect_uri.as_str()),
            ])
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "Network request to Discord token endpoint failed");
                AuthCodeExchangeError::Transport(e)
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(AuthCodeExchangeError::Transport)?;

        if !status.is_success() {
            let reason = rejection_reason(&body);
            warn!(%status, %reason, "Discord rejected the authorization code");
            return Err(AuthCodeExchangeError::Rejected { status, reason });
        }

        let tokens: ProviderTokens = serde_json::from_str(&body).map_err(|e| {
            error!(error = %e, "Failed to read Discord token response");
            AuthCodeExchangeError::InvalidResponse(e.to_string())
        })?;

        let user = self.store.update_user_tokens(user_id, &tokens).await?;
        info!(scope = ?tokens.scope, "Discord tokens stored");
        Ok(user)
    }

    #[instrument(skip_all, fields(user_id = user.id))]
    async fn fetch_identity(
        &self,
        user: &UserRecord,
    ) -> Result<ProviderIdentity, ProviderFetchError> {
        let access_token = user
            .discord_access_token
            .as_deref()
            .ok_or(ProviderFetchError::MissingAccessToken)?;

        debug!("Requesting Discord identity");
        let response = self
            .http_client
            .get(self.config.identity_url())
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "Network request to Discord identity endpoint failed");
                ProviderFetchError::Transport(e)
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read error response body".to_string());
            let reason = rejection_reason(&body);
            warn!(%status, %reason, "Discord rejected the identity request");
            return Err(ProviderFetchError::Rejected { status, reason });
        }

        let profile: DiscordUser = response.json().await.map_err(|e| {
            error!(error = %e, "Failed to read Discord identity response");
            ProviderFetchError::InvalidResponse(e.to_string())
        })?;

        debug!(discord_user_id = %profile.id, "Discord identity fetched");
        Ok(ProviderIdentity {
            avatar_url: self.avatar_url(&profile),
            user_id: profile.id,
            username: profile.username,
            refresh_token: user.discord_refresh_token.clone(),
        })
    }
}
