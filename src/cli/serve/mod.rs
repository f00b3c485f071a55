//! Serve command - runs the API server

use std::net::SocketAddr;

use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::api::create_router;
use crate::config::AppConfig;
use crate::infrastructure::logging;

/// Run the API server
pub async fn run() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load().unwrap_or_default();
    logging::init_logging(&config.logging);

    if config.auth.uses_development_secret() {
        warn!(
            "Token signing secret is the shipped development placeholder; \
             set ELECTION_AUTH__SECRET before deploying"
        );
    }

    info!(
        storage = ?config.storage.mode,
        queue = ?config.queue.mode,
        "Configured backends"
    );

    let state = crate::create_app_state(&config).await?;

    let provisioned = state
        .user_service
        .bootstrap_admin(&config.admin.username, &config.admin.password)
        .await?;

    if !provisioned {
        info!(username = %config.admin.username, "Bootstrap admin already present");
    }

    let app = create_router(state, &config.cors);

    let addr = build_socket_addr(&config)?;
    info!("Starting server on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn build_socket_addr(config: &AppConfig) -> anyhow::Result<SocketAddr> {
    Ok(SocketAddr::from((
        config.server.host.parse::<std::net::IpAddr>()?,
        config.server.port,
    )))
}
