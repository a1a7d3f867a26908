//! Reference parse service: turns raw InfluxQL into query configs.

use std::collections::HashSet;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use clap::Parser;

use celledit::model::QueryConfig;
use celledit::query::{parse_query, substitute_templates};
use celledit::remote::{ParsedQuery, QueriesRequest, QueriesResponse};

#[path = "celledit_server/http_error.rs"]
mod http_error;
use self::http_error::*;
#[path = "celledit_server/handlers.rs"]
mod handlers;
use self::handlers::*;

#[derive(Clone)]
struct AppState {
    /// Source ids the server answers for; empty means any.
    sources: HashSet<String>,
}

#[derive(Parser, Debug)]
#[command(name = "celledit-server")]
struct Args {
    /// Address to listen on
    #[arg(long, default_value = "127.0.0.1:8888")]
    addr: SocketAddr,

    /// Write bound address to this file (dev/test convenience)
    #[arg(long)]
    addr_file: Option<PathBuf>,

    /// Restrict the server to these source ids (repeatable)
    #[arg(long = "source", value_name = "ID")]
    sources: Vec<String>,
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("{:#}", err);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let args = Args::parse();
    celledit::logging::init(None)?;

    let state = Arc::new(AppState {
        sources: args.sources.into_iter().collect(),
    });

    let app = Router::new()
        .route("/healthz", get(healthz))
        .route("/sources/:id/queries", post(parse_queries))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(args.addr)
        .await
        .with_context(|| format!("bind {}", args.addr))?;

    let local_addr = listener.local_addr().context("read listener local addr")?;
    eprintln!("celledit-server listening on {}", local_addr);

    if let Some(addr_file) = &args.addr_file {
        std::fs::write(addr_file, local_addr.to_string())
            .with_context(|| format!("write addr file {}", addr_file.display()))?;
    }

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}

async fn healthz() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}
