//! stevedore - Admin console for S3-compatible storage
//!
//! A single-operator web console for managing named connection profiles
//! to S3-compatible backends and browsing their buckets.

mod config;
mod router;

use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use stevedore_profiles::ProfileStore;

#[derive(Parser, Debug)]
#[command(name = "stevedore")]
#[command(about = "Admin console for S3-compatible storage profiles", long_about = None)]
struct Args {
    /// Port to listen on
    #[arg(short, long, env = "STEVEDORE_PORT")]
    port: Option<u16>,

    /// Host to bind to
    #[arg(long, env = "STEVEDORE_HOST")]
    host: Option<String>,

    /// Path to the profile database
    #[arg(long, env = "STEVEDORE_DATABASE")]
    database: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", env = "STEVEDORE_LOG_LEVEL")]
    log_level: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("stevedore={},tower_http=debug", args.log_level).into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Config file and environment supply defaults; CLI flags win
    let file_config = config::Config::load()?;
    let host = args.host.unwrap_or(file_config.server.host);
    let port = args.port.unwrap_or(file_config.server.port);
    let database = args.database.unwrap_or(file_config.database.path);

    info!("Starting stevedore...");
    info!("  Profile database: {}", database.display());

    let store = Arc::new(ProfileStore::open(&database)?);
    let state = router::AppState::new(store);
    let app = router::create_router(state);

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
