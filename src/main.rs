//! Regional News site server.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ──────────────▶ http server ──▶ route table ──▶ rendering policy
//!                         │              lookup           │
//!                         │                               ▼
//!                         │                         render cache ──▶ renderer
//!                         ▼
//!                    static files (NotFound fallback)
//!
//!     Cross-cutting: config (+ route source watcher), lifecycle,
//!     observability, security headers, admin API
//! ```

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use news_site::config::watcher::RouteSourceWatcher;
use news_site::lifecycle::signals::spawn_signal_handler;
use news_site::lifecycle::{build_context, load_site_config};
use news_site::observability::{logging, metrics};
use news_site::{Shutdown, SiteServer};

#[derive(Parser)]
#[command(name = "news-site", version, about = "Regional news site server")]
struct Args {
    /// Path to the site configuration (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    let config = match load_site_config(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("news-site: {}", e);
            return ExitCode::FAILURE;
        }
    };

    logging::init_tracing(&config.observability);
    tracing::info!("news-site v{} starting", env!("CARGO_PKG_VERSION"));

    tracing::info!(
        site = %config.site.name,
        bind_address = %config.listener.bind_address,
        routes_path = %config.routes_path.0,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    match run(config).await {
        Ok(()) => {
            tracing::info!("Shutdown complete");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "Fatal error");
            ExitCode::FAILURE
        }
    }
}

async fn run(config: news_site::SiteConfig) -> Result<(), Box<dyn std::error::Error>> {
    let watch_routes = config.reload.watch_routes;
    let routes_path = PathBuf::from(&config.routes_path.0);
    let bind_address = config.listener.bind_address.clone();

    let ctx = Arc::new(build_context(config)?);

    // Kept alive for the lifetime of the server.
    let (_watcher, updates_rx) = if watch_routes {
        let (watcher, rx) = RouteSourceWatcher::new(&routes_path);
        (Some(watcher.run()?), rx)
    } else {
        let (_tx, rx) = mpsc::unbounded_channel();
        (None, rx)
    };

    let listener = TcpListener::bind(&bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let shutdown_rx = shutdown.subscribe();
    let _signals = spawn_signal_handler(&shutdown);

    SiteServer::new(ctx).run(listener, updates_rx, shutdown_rx).await?;
    Ok(())
}
