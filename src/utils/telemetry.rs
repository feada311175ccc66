//! # Telemetry
//!
//! Installs the global tracing subscriber. Production emits bunyan-formatted
//! JSON lines, development a human readable format.

use tracing_bunyan_formatter::{BunyanFormattingLayer, JsonStorageLayer};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use super::config::AppEnv;

/// Default filter when `RUST_LOG` is not set
const DEFAULT_FILTER: &str = "discord_connect=info,tower=warn";

/// Installs the global subscriber. Must be called once, before the server starts.
pub fn init_tracing(app_env: AppEnv) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    match app_env {
        AppEnv::Production => {
            let formatting_layer =
                BunyanFormattingLayer::new(env!("CARGO_PKG_NAME").into(), std::io::stdout);
            tracing_subscriber::registry()
                .with(env_filter)
                .with(JsonStorageLayer)
                .with(formatting_layer)
                .init();
        }
        AppEnv::Development => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer())
                .init();
        }
    }
}
