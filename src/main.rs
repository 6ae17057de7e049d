use muc_directory::{
    app, AppConfig, AppState, ConnectionHandle, MemoryRoomFactory, RoomDirectory,
    StaticConnectionProvider,
};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "muc_directory=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env()?;

    info!(
        service_address = %config.service_address,
        "Starting conference room directory"
    );

    let provider = Arc::new(StaticConnectionProvider::new(ConnectionHandle::new(
        config.service_address.clone(),
    )));
    let directory = RoomDirectory::start(provider, Arc::new(MemoryRoomFactory), config.sweep.clone());

    let app = app(AppState::new(Arc::clone(&directory)));

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    info!("Server running on http://{}", config.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    directory.shutdown().await;
    info!("Server stopped");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
