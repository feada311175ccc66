use discord_connect::{app, build_state, utils::config::AppConfig, utils::telemetry::init_tracing};
use tokio::net::TcpListener;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let config = AppConfig::from_env()?;
    init_tracing(config.app_env);

    let bind_addr = config.bind_addr.clone();
    let app = app(build_state(config).await?);

    let listener = TcpListener::bind(&bind_addr).await?;
    info!("Server starting at http://{}", bind_addr);

    axum::serve(listener, app.into_make_service()).await?;
    Ok(())
}
