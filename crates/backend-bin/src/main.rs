use clap::Parser;
use petmarket_backend_lib::{config::Settings, router, storage::FlatFileStore, AppState};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

/// PetMarket account service
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Path to an additional TOML config file
    #[arg(long)]
    config: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize configuration
    let settings = match &args.config {
        Some(path) => Settings::load_from(path)?,
        None => Settings::load()?,
    };
    settings.validate()?;

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(settings.log_level.clone())),
        )
        .init();

    // Create storage
    let store = Arc::new(FlatFileStore::new(&settings.data_dir)?);

    // Create application state
    let bind_addr = settings.bind_addr;
    let state = Arc::new(AppState::new(store, settings)?);

    // Create the router
    let app = router::create_router(state);

    // Start the server
    let listener = TcpListener::bind(bind_addr).await?;
    tracing::info!("listening on {bind_addr}");

    axum::serve(listener, app).await?;

    Ok(())
}
