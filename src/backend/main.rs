/**
 * siteauth Server Entry Point
 *
 * Loads configuration from the environment (and `.env` if present), builds
 * the application and serves it.
 */

use siteauth::backend::logging::init_tracing;
use siteauth::backend::server::create_app;
use siteauth::shared::AppConfig;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables from .env file if present
    dotenv::dotenv().ok();

    init_tracing("info");

    let config = AppConfig::from_env().map_err(|e| {
        tracing::error!("Invalid configuration: {}", e);
        e
    })?;
    tracing::info!("Configuration loaded: {:?}", config);

    let port = config.server_port;
    let app = create_app(config).await?;

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
