//! # Application Configuration
//!
//! Configuration is read from the environment (optionally seeded from a
//! `.env` file by `main`). Secrets may also be provided through `*_FILE`
//! variables, see [`get_secret`].

use std::env;

use secrecy::SecretString;
use thiserror::Error;
use tracing::{debug, info};
use validator::{Validate, ValidationErrors};

use super::constant::{DEFAULT_DISCORD_API_BASE, DEFAULT_DISCORD_CDN_BASE};
use super::secret::get_secret;

/// Errors that can occur while loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required env variable `{0}`")]
    Missing(&'static str),
    #[error("invalid value for `{var}`: {value}")]
    InvalidValue { var: &'static str, value: String },
    #[error("invalid configuration: {0}")]
    Invalid(#[from] ValidationErrors),
    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
}

/// Deployment environment, selected with `APP_ENV`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    fn parse(raw: &str) -> Result<Self, ConfigError> {
        match raw.to_ascii_lowercase().as_str() {
            "production" => Ok(AppEnv::Production),
            "development" | "dev" | "test" => Ok(AppEnv::Development),
            _ => Err(ConfigError::InvalidValue {
                var: "APP_ENV",
                value: raw.to_string(),
            }),
        }
    }
}

/// OAuth client settings for the Discord application
#[derive(Debug, Validate)]
pub struct DiscordConfig {
    #[validate(length(min = 1))]
    pub client_id: String,
    pub client_secret: SecretString,
    /// Must match one of the redirect URIs registered on the Discord application
    #[validate(url)]
    pub redirect_uri: String,
    #[validate(url)]
    pub api_base: String,
    #[validate(url)]
    pub cdn_base: String,
}

impl DiscordConfig {
    /// Builds a config pointing at the public Discord endpoints.
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        redirect_uri: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: SecretString::from(client_secret.into()),
            redirect_uri: redirect_uri.into(),
            api_base: DEFAULT_DISCORD_API_BASE.to_string(),
            cdn_base: DEFAULT_DISCORD_CDN_BASE.to_string(),
        }
    }

    /// Overrides the REST API base, e.g. to point at a local fake in tests.
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    pub fn token_url(&self) -> String {
        format!("{}/oauth2/token", self.api_base)
    }

    pub fn identity_url(&self) -> String {
        format!("{}/users/@me", self.api_base)
    }

    pub fn authorize_url(&self) -> String {
        format!("{}/oauth2/authorize", self.api_base)
    }
}

/// Top-level application configuration
#[derive(Debug, Validate)]
pub struct AppConfig {
    pub app_env: AppEnv,
    pub bind_addr: String,
    /// When unset the application runs on the in-memory user store
    pub database_url: Option<String>,
    #[validate(nested)]
    pub discord: DiscordConfig,
    pub session_secret: SecretString,
}

impl AppConfig {
    /// Loads and validates the configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `APP_ENV` - "production" or "development" (default)
    /// - `BIND_ADDR` - Listen address, default `0.0.0.0:8090`
    /// - `DATABASE_URL` - Optional PostgreSQL connection string
    /// - `DISCORD_CLIENT_ID` - Required
    /// - `DISCORD_CLIENT_SECRET` / `DISCORD_CLIENT_SECRET_FILE` - Required
    /// - `DISCORD_REDIRECT_URI` - Required
    /// - `DISCORD_API_BASE` - Default `https://discord.com/api/v10`
    /// - `DISCORD_CDN_BASE` - Default `https://cdn.discordapp.com`
    /// - `SESSION_SECRET` / `SESSION_SECRET_FILE` - Required
    pub fn from_env() -> Result<Self, ConfigError> {
        let app_env = match env::var("APP_ENV") {
            Ok(raw) => AppEnv::parse(&raw)?,
            Err(_) => AppEnv::Development,
        };
        debug!(?app_env, "Loading configuration");

        let discord = DiscordConfig {
            client_id: required("DISCORD_CLIENT_ID")?,
            client_secret: get_secret("DISCORD_CLIENT_SECRET_FILE", "DISCORD_CLIENT_SECRET")
                .ok_or(ConfigError::Missing("DISCORD_CLIENT_SECRET"))?,
            redirect_uri: required("DISCORD_REDIRECT_URI")?,
            api_base: env::var("DISCORD_API_BASE")
                .unwrap_or_else(|_| DEFAULT_DISCORD_API_BASE.to_string())
                .trim_end_matches('/')
                .to_string(),
            cdn_base: env::var("DISCORD_CDN_BASE")
                .unwrap_or_else(|_| DEFAULT_DISCORD_CDN_BASE.to_string())
                .trim_end_matches('/')
                .to_string(),
        };

        let config = Self {
            app_env,
            bind_addr: env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8090".to_string()),
            database_url: env::var("DATABASE_URL").ok().filter(|url| !url.is_empty()),
            discord,
            session_secret: get_secret("SESSION_SECRET_FILE", "SESSION_SECRET")
                .ok_or(ConfigError::Missing("SESSION_SECRET"))?,
        };
        config.validate()?;

        info!(
            bind_addr = %config.bind_addr,
            persistent_store = config.database_url.is_some(),
            "Configuration loaded"
        );
        Ok(config)
    }
}

fn required(var: &'static str) -> Result<String, ConfigError> {
    env::var(var)
        .ok()
        .filter(|value| !value.is_empty())
        .ok_or(ConfigError::Missing(var))
}
