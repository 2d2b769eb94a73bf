//! hookworks server: the webhook gateway plus the build worker.

use clap::Parser;
use hookworks_api::{AppState, Settings, routes};
use hookworks_scheduler::BuildService;
use std::net::SocketAddr;
use std::path::PathBuf;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "hookworks-server")]
#[command(about = "Webhook-triggered build runner", long_about = None)]
struct Cli {
    /// Server bind address
    #[arg(long, default_value = "0.0.0.0")]
    host: String,

    /// Server port
    #[arg(short, long, default_value_t = 5000)]
    port: u16,

    /// Owners allowed to trigger builds (repeatable; empty allows everyone)
    #[arg(short, long = "user")]
    user: Vec<String>,

    /// Data directory for working copies and build logs
    #[arg(long, env = "HOOKWORKS_DATA_DIR")]
    data_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let data_dir = cli
        .data_dir
        .unwrap_or_else(|| std::env::temp_dir().join("hookworks"));
    info!(data_dir = %data_dir.display(), "Using data directory");

    // The build service owns the queue and the single worker task.
    let service = BuildService::start(&data_dir);

    let state = AppState::new(
        service.jobs(),
        Settings {
            allowed_owners: cli.user,
        },
    );

    let app = routes::router(state).layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("{}:{}", cli.host, cli.port).parse()?;
    info!("Starting server on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
