/// Duaelmix Server - remote mode endpoint
use clap::Parser;
use duaelmix_server::{create_router, AppState, ServerConfig};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "duaelmix-server")]
#[command(about = "Duaelmix remote mode server", long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = duaelmix_server::config::DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Override the bind host
    #[arg(long, env = "DUAELMIX_SERVER_HOST")]
    host: Option<String>,

    /// Override the bind port
    #[arg(short, long, env = "DUAELMIX_SERVER_PORT")]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "duaelmix_server=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let mut config = ServerConfig::load_from(&cli.config)?;
    if let Some(host) = cli.host {
        config.server.host = host;
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }

    serve(config).await
}

async fn serve(config: ServerConfig) -> anyhow::Result<()> {
    tracing::info!("Starting Duaelmix Server");

    let app = create_router(AppState::in_memory());
    let listener = config.bind().await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
