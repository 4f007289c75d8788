use anyhow::Result;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use site_api::{AppState, config::AppConfig, routes, scheduler};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Starting site API");

    let config = AppConfig::load()?;
    for setting in config.development_defaults() {
        warn!(
            "{} is using its development default; override it before deploying",
            setting
        );
    }

    let app_state = AppState::from_config(&config).await?;

    let _purge_scheduler = scheduler::start_session_purge(
        app_state.session_manager.clone(),
        &config.sessions.purge_schedule,
    )
    .await?;

    // Start the web server
    let app = routes::create_router(app_state);

    let listener = TcpListener::bind(&config.server.bind_address).await?;
    info!("Site API listening on {}", config.server.bind_address);

    axum::serve(listener, app).await?;

    Ok(())
}
