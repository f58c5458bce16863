//! docgate server
//!
//! HTTP gateway that stores incoming bill documents in an embedded KV store
//! and duplicates selected fields into a relational table.

mod error;
mod handlers;
mod services;
mod storage;
#[cfg(test)]
mod test_support;

use anyhow::{Context, Result};
use axum::{routing::get, Router};
use clap::Parser;
use docgate_core::{LogSettings, Settings};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use services::IngestService;
use storage::{KvStore, SqlStore};

#[derive(Parser)]
#[command(name = "docgate-server")]
#[command(author, version, about = "docgate - JSON document gateway", long_about = None)]
struct Cli {
    /// TOML configuration file (values are overridden by DOCGATE__* variables)
    #[arg(short, long, env = "DOCGATE_CONFIG")]
    config: Option<PathBuf>,
}

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub kv: KvStore,
    pub sql: Arc<SqlStore>,
    pub ingest: Arc<IngestService>,
}

#[tokio::main]
async fn main() {
    // Set up panic hook to log crashes
    std::panic::set_hook(Box::new(|info| {
        let location = info
            .location()
            .map(|l| format!("{}:{}", l.file(), l.line()));
        let payload = if let Some(s) = info.payload().downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = info.payload().downcast_ref::<String>() {
            s.clone()
        } else {
            "Unknown panic".to_string()
        };
        eprintln!("[PANIC] at {:?}: {}", location, payload);
        tracing::error!("PANIC at {:?}: {}", location, payload);
    }));

    let cli = Cli::parse();

    let settings = match Settings::load(cli.config.as_deref()) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("[FATAL] Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = init_logging(&settings.log) {
        eprintln!("[FATAL] Failed to initialize logging: {}", e);
        std::process::exit(1);
    }

    info!("Starting docgate server v{}", env!("CARGO_PKG_VERSION"));
    info!("PID: {}", std::process::id());

    if let Err(e) = run_server(settings).await {
        error!("Server failed: {:#}", e);
        std::process::exit(1);
    }
}

fn init_logging(log: &LogSettings) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&log.filter))
        .context("Invalid log filter")?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false);

    if log.json {
        tracing::subscriber::set_global_default(builder.json().finish())?;
    } else {
        tracing::subscriber::set_global_default(builder.finish())?;
    }

    Ok(())
}

async fn run_server(settings: Settings) -> Result<()> {
    info!(
        "Config loaded: bind={}, kv={}, table={}",
        settings.server.bind_address,
        settings.kv.path.display(),
        settings.sql.table
    );

    if let Some(parent) = settings.kv.path.parent() {
        tokio::fs::create_dir_all(parent).await.with_context(|| {
            format!("Failed to create KV directory: {}", parent.display())
        })?;
    }
    let kv = KvStore::open(&settings.kv.path, settings.kv.read_only)
        .context("Failed to open KV store")?;
    if kv.is_read_only() {
        warn!("KV store is read-only, ingest requests will be rejected");
    }

    let sql = Arc::new(
        SqlStore::connect(&settings.sql)
            .await
            .context("Failed to initialize relational store")?,
    );
    info!("Relational store ready, table: {}", sql.table());

    let state = AppState {
        ingest: Arc::new(IngestService::new(kv.clone(), sql.clone())),
        kv: kv.clone(),
        sql: sql.clone(),
    };

    let addr: SocketAddr = settings
        .server
        .bind_address
        .parse()
        .context("Failed to parse bind address")?;

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    info!("Server listening on {}", addr);
    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Shutting down, flushing KV store");
    if let Err(e) = kv.flush() {
        warn!("Failed to flush KV store: {}", e);
    }
    sql.close().await;

    Ok(())
}

fn app(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::welcome))
        .route("/health", get(handlers::health))
        .nest("/api", api_routes())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn api_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/bill",
            get(handlers::bill::list).post(handlers::bill::ingest),
        )
        .route(
            "/bill/:key",
            get(handlers::bill::get).delete(handlers::bill::delete),
        )
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
