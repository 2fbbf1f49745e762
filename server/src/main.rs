//! Keygate licensing service.
//!
//! Serves the trial, activation and verification endpoints over HTTP.
//!
//! Usage:
//!   keygate-server --port 8080
//!   keygate-server --backend remote --remote-url https://project.supabase.co
//!
//! Without `--backend`, the remote backend is used when both a url and a
//! service-role key are configured, and process memory otherwise. Memory
//! data is lost on restart.

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use keygate_license::LicensingService;
use keygate_server::build_router;
use keygate_storage::{BackendConfig, BackendKind, open_store};
use tracing::{Level, info, warn};
use tracing_subscriber::FmtSubscriber;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Backend {
    Memory,
    Remote,
}

impl From<Backend> for BackendKind {
    fn from(backend: Backend) -> Self {
        match backend {
            Backend::Memory => BackendKind::Memory,
            Backend::Remote => BackendKind::Remote,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "keygate-server")]
#[command(about = "Keygate licensing HTTP service")]
struct Args {
    /// HTTP port to listen on
    #[arg(short, long, env = "KEYGATE_PORT", default_value = "8080")]
    port: u16,

    /// Address to bind
    #[arg(long, env = "KEYGATE_BIND", default_value = "0.0.0.0")]
    bind: String,

    /// Persistence backend (defaults to remote when credentials are set)
    #[arg(long, env = "KEYGATE_BACKEND", value_enum)]
    backend: Option<Backend>,

    /// Base URL of the remote relational service
    #[arg(long, env = "SUPABASE_URL")]
    remote_url: Option<String>,

    /// Service-role key for the remote relational service
    #[arg(long, env = "SUPABASE_SERVICE_ROLE_KEY", hide_env_values = true)]
    service_role_key: Option<String>,

    /// Per-request timeout for the remote backend, in seconds
    #[arg(long, default_value = "30")]
    remote_timeout_secs: u64,

    /// Enable verbose debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let log_level = if args.verbose { Level::DEBUG } else { Level::INFO };
    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .compact()
        .init();

    info!("Keygate starting...");

    let config = BackendConfig::resolve(
        args.backend.map(Into::into),
        args.remote_url,
        args.service_role_key,
        args.remote_timeout_secs,
    );
    if config.kind() == BackendKind::Memory {
        warn!("Using in-memory license store; data will be lost on restart");
    }
    let store = open_store(&config).context("Failed to open license store")?;
    let service = LicensingService::new(store);
    let backend = service.backend_name();

    let app = build_router(service);
    let addr = format!("{}:{}", args.bind, args.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("Listening on {} ({} backend)", addr, backend);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    info!("Keygate stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown requested");
}
