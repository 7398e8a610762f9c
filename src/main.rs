use anyhow::Result;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

use image_agent::config::Config;
use image_agent::{create_app, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("image_agent=debug,tower_http=debug")),
        )
        .init();

    let config_path = Config::discover_path();
    let config = Config::load(config_path.as_deref())?;
    match &config_path {
        Some(path) => info!("Loaded configuration from: {}", path.display()),
        None => info!("No config file found, using defaults and environment"),
    }

    let state = AppState::new(config.clone())?;
    info!(
        "Agent '{}' ({}) via runtime at {}",
        state.agent.name, state.agent.model, config.runtime.base_url
    );

    let sessions = state.sessions.clone();
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(Duration::from_secs(60));
        loop {
            ticker.tick().await;
            let evicted = sessions.evict_idle();
            if evicted > 0 {
                info!("Evicted {} idle chat sessions", evicted);
            }
        }
    });

    let app = create_app(state);

    let addr = config.bind_addr();
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
