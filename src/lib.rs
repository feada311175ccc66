//! # Discord Connect - account linking backend
//!
//! Connects a logged in site account to a Discord account through the OAuth
//! authorization code flow and renders the outcome.
//!
//! ## Modules
//!
//! - [`handlers`] - HTTP request handlers for the connect flow
//! - [`middleware`] - The logging → session → user request pipeline
//! - [`models`] - Request context, user records and page states
//! - [`services`] - Discord OAuth, page state resolution, sessions and persistence
//! - [`utils`] - Configuration, constants, page rendering and telemetry

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod utils;

use std::sync::Arc;

use axum::{Router, routing::get};
use sqlx::PgPool;
use tracing::info;

use crate::handlers::{connect_provider, connect_result_page, health_check, oauth_callback};
use crate::models::AppState;
use crate::services::store::{MemoryUserStore, PgUserStore, UserStore};
use crate::utils::config::{AppConfig, ConfigError};

/// Creates an Axum router with application routes and state.
///
/// # Routes
///
/// - `GET /health-check`
/// - `GET /api/auth/connect/{provider}` - Redirect to the provider consent screen
/// - `GET /api/auth/callback/{provider}` - JSON callback
/// - `GET /{provider}/success` - Server-rendered result page
pub fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health-check", get(health_check))
        .route("/api/auth/connect/{provider}", get(connect_provider))
        .route("/api/auth/callback/{provider}", get(oauth_callback))
        .route("/{provider}/success", get(connect_result_page))
        .with_state(state)
}

/// Errors that can prevent the application from starting
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("failed to connect to database: {0}")]
    Db(#[from] sqlx::Error),
    #[error("failed to run migrations: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),
}

/// Builds the application state from configuration.
///
/// Connects to PostgreSQL and runs migrations when `DATABASE_URL` is set,
/// otherwise falls back to the in-memory store.
pub async fn build_state(config: AppConfig) -> Result<Arc<AppState>, StartupError> {
    let store: Arc<dyn UserStore> = match &config.database_url {
        Some(database_url) => {
            info!("Using PostgreSQL user store");
            let store = PgUserStore::new(PgPool::connect(database_url).await?);
            store.migrate().await?;
            Arc::new(store)
        }
        None => {
            info!("Using in-memory user store, data will not survive restarts");
            Arc::new(MemoryUserStore::new())
        }
    };

    let state = AppState::with_discord(store, config.discord, &config.session_secret)?;
    Ok(Arc::new(state))
}
