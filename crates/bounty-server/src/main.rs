//! Bounty Server
//!
//! HTTP API for the property-maintenance marketplace.

use std::future::IntoFuture;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tracing::info;

use bounty_core::config::{self, load_config};
use bounty_core::tracing_init::init_tracing;

use bounty_server::routes::{AppState, build_router};
use bounty_server::seed::seed_demo_data;
use bounty_server::service::MarketplaceService;
use bounty_server::storage::Database;
use bounty_server::store::{MemoryStore, Store};
use bounty_server::ticker::spawn_ticker;

#[derive(Parser, Debug)]
#[command(name = "bounty-server")]
#[command(version, about = "Bounty marketplace server - bounty lifecycle over HTTP")]
struct Args {
    /// Address to listen on.
    #[arg(long, env = "BOUNTY_ADDR")]
    addr: Option<SocketAddr>,

    /// Path to SQLite database file.
    #[arg(long, env = "BOUNTY_DATABASE_PATH")]
    db_path: Option<PathBuf>,

    /// Keep all state in memory instead of SQLite.
    #[arg(long, conflicts_with = "db_path")]
    memory: bool,

    /// JSON settings file layered over the global one.
    #[arg(long, env = "BOUNTY_CONFIG")]
    config: Option<PathBuf>,

    /// Load the demo dataset when the store is empty.
    #[arg(long)]
    seed: bool,

    /// Count down accepted bounties server-side every N seconds (0 = off).
    #[arg(long, env = "BOUNTY_TICK_INTERVAL_SECS")]
    tick_interval_secs: Option<u64>,

    /// Comma-separated CORS origins; `*` allows any.
    #[arg(long, value_delimiter = ',')]
    allowed_origins: Option<Vec<String>>,

    /// Emit JSON log lines.
    #[arg(long)]
    log_json: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = load_config(args.config.as_deref())?;
    if let Some(addr) = args.addr {
        config.server.addr = addr;
    }
    if let Some(path) = args.db_path {
        config.server.database_path = Some(path);
    }
    if let Some(secs) = args.tick_interval_secs {
        config.server.tick_interval_secs = secs;
    }
    if let Some(origins) = args.allowed_origins {
        config.server.allowed_origins = origins;
    }
    config.server.log_json |= args.log_json;

    init_tracing(
        &format!("bounty_server={}", config.server.log_level),
        config.server.log_json,
    );

    let store: Arc<dyn Store> = if args.memory {
        info!("Using in-memory store");
        Arc::new(MemoryStore::new())
    } else {
        let db_path = config
            .server
            .database_path
            .clone()
            .or_else(config::database_path)
            .context("Could not determine database path; pass --db-path")?;
        info!(path = %db_path.display(), "Opening database");
        Arc::new(Database::open(&db_path).await?)
    };

    if args.seed && seed_demo_data(store.as_ref(), &config.ui).await? {
        info!("Seeded demo data");
    }

    let service = Arc::new(MarketplaceService::new(store, config.ui.clone()));

    let ticker = (config.server.tick_interval_secs > 0).then(|| {
        spawn_ticker(
            Arc::clone(&service),
            Duration::from_secs(config.server.tick_interval_secs),
        )
    });

    let app = build_router(AppState { service }, &config.server.allowed_origins);
    let listener = tokio::net::TcpListener::bind(config.server.addr).await?;
    info!(addr = %config.server.addr, "Bounty server listening");

    tokio::select! {
        result = axum::serve(listener, app).into_future() => {
            result?;
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Received shutdown signal");
        }
    }

    if let Some(handle) = ticker {
        handle.abort();
    }
    info!("Bounty server stopped");
    Ok(())
}
