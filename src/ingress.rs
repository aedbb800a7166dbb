//! HTTP invocation surface.
//!
//! `POST /invoke` takes a queue envelope and answers with the invocation
//! status; `GET /health` is a liveness probe.

use anyhow::Context;
use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};
use tokio::net::TcpListener;
use tracing::{error, info};

use crate::{
    base::types::{InvocationStatus, Void},
    interaction::relay::handle_payload,
    runtime::Runtime,
};

/// Build the router over a runtime.
pub fn router(runtime: Runtime) -> Router {
    Router::new().route("/invoke", post(invoke)).route("/health", get(health)).with_state(runtime)
}

/// Serve the router on `listen_address` until Ctrl-C.
pub async fn serve(runtime: Runtime) -> Void {
    let address = runtime.config.listen_address.clone();
    let listener = TcpListener::bind(&address).await.with_context(|| format!("Failed to bind `{address}`"))?;

    info!("Listening on `{}`", address);

    axum::serve(listener, router(runtime))
        .with_graceful_shutdown(shutdown_on(tokio::signal::ctrl_c()))
        .await?;

    Ok(())
}

/// Resolve once `signal` fires.  If the signal cannot be listened for, never resolve.
async fn shutdown_on(signal: impl Future<Output = std::io::Result<()>>) {
    match signal.await {
        Ok(()) => info!("Shutting down ..."),
        Err(err) => {
            error!("Failed to listen for the shutdown signal: {}", err);
            std::future::pending::<()>().await;
        }
    }
}

async fn invoke(State(runtime): State<Runtime>, payload: String) -> (StatusCode, Json<InvocationStatus>) {
    let status = handle_payload(&runtime, &payload).await;
    let code = if status.is_success() { StatusCode::OK } else { StatusCode::INTERNAL_SERVER_ERROR };

    (code, Json(status))
}

async fn health() -> &'static str {
    "ok"
}

// Tests.
