//! Webhook HTTP endpoint.

use anyhow::{Context, Result};
use axum::{
    Router,
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::post,
};
use bocfix_core::{FixOutcome, WebhookPayload};
use bocfix_ledger::Ledger;
use chrono::Utc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info, warn};

use crate::state::AppState;

pub const SIGNATURE_HEADER: &str = "signature";

pub fn create_router<L: Ledger>(state: AppState<L>) -> Router {
    Router::new()
        .route("/webhook", post(handle_webhook::<L>))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// 403 for anything unauthenticated, 400 for an undecodable body, 500 when
/// the ledger rejects the correction, 200 otherwise (no-ops included).
async fn handle_webhook<L: Ledger>(
    State(state): State<AppState<L>>,
    headers: HeaderMap,
    body: Bytes,
) -> StatusCode {
    let header = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();

    if let Err(err) = state.verifier.authenticate(header, &body, Utc::now().timestamp()) {
        warn!(%err, "received message with wrong or un-parsable signature");
        return StatusCode::FORBIDDEN;
    }

    let payload: WebhookPayload = match serde_json::from_slice(&body) {
        Ok(p) => p,
        Err(err) => {
            warn!(%err, "failed to parse webhook json");
            return StatusCode::BAD_REQUEST;
        }
    };
    debug!(?payload, "request received");

    let cmd = match state.fixer.fix(&payload) {
        FixOutcome::Correct(cmd) => cmd,
        FixOutcome::Skip(_) => return StatusCode::OK,
    };

    match state.ledger.update_transaction(&cmd).await {
        Ok(()) => {
            info!(journal_id = cmd.journal_id, "transaction corrected");
            StatusCode::OK
        }
        Err(err) => {
            error!(
                journal_id = cmd.journal_id,
                err = %format!("{err:#}"),
                "failed to fix BoC transaction"
            );
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

pub async fn serve<L: Ledger>(addr: &str, state: AppState<L>) -> Result<()> {
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("bind {addr}"))?;
    info!(addr = %listener.local_addr()?, build = env!("BOCFIX_BUILD_SHA"), "listening");

    axum::serve(listener, create_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serve webhook endpoint")?;

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!(%err, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(err) => {
                error!(%err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("shutting down");
}
