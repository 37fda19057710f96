use anyhow::{Context, Result};
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use clap::Parser;
use loadgen_core::{RunConfig, RunController, Settings, StartError};
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "loadgen-server")]
#[command(about = "Controllable HTTP load generator with an admin API")]
struct Args {
    /// Path to configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Bind address for the admin API (overrides config)
    #[arg(long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let mut settings = match &args.config {
        Some(path) => Settings::from_file(path)
            .with_context(|| format!("Failed to load config from {:?}", path))?,
        None => Settings::default(),
    };
    if let Some(bind) = args.bind {
        settings.bind = bind;
    }

    let bind = settings.bind.clone();
    let controller =
        Arc::new(RunController::new(settings).context("Failed to build HTTP client")?);

    let app = Router::new()
        .route("/load/start", post(start_load))
        .route("/load/stop", post(stop_load))
        .route("/load/status", get(get_status))
        .route("/health", get(health_check))
        .with_state(controller);

    let listener = tokio::net::TcpListener::bind(&bind)
        .await
        .with_context(|| format!("Failed to bind {bind}"))?;
    info!("admin API listening on {bind}");

    axum::serve(listener, app).await?;
    Ok(())
}

async fn start_load(
    State(controller): State<Arc<RunController>>,
    Json(config): Json<RunConfig>,
) -> impl IntoResponse {
    match controller.start(config.clone()).await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "message": "Load generation started",
                "targetRps": config.rps,
                "target": config.target,
            })),
        ),
        Err(err @ StartError::AlreadyActive) => (
            StatusCode::CONFLICT,
            Json(json!({ "error": err.to_string() })),
        ),
        Err(err) => (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": err.to_string() })),
        ),
    }
}

async fn stop_load(State(controller): State<Arc<RunController>>) -> impl IntoResponse {
    let summary = controller.stop().await;
    Json(json!({
        "message": "Load generation stopped",
        "totalRequests": summary.total_requests,
        "successCount": summary.success_count,
        "failCount": summary.fail_count,
    }))
}

async fn get_status(State(controller): State<Arc<RunController>>) -> impl IntoResponse {
    Json(controller.snapshot().await)
}

async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "service": "loadgen-server",
    }))
}
