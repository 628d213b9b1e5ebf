//! HTTP surface of the updater.

use axum::{
    extract::State,
    http::{header::AUTHORIZATION, HeaderMap},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;

use crate::error::{UpdateError, UpdateResponse};
use crate::handler::Updater;

/// Creates the updater router.
pub fn router(updater: Arc<Updater>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/update", post(trigger_update))
        .with_state(updater)
}

/// Serve until `shutdown` resolves, then drain in-flight requests.
pub async fn serve<F>(
    listener: TcpListener,
    updater: Arc<Updater>,
    shutdown: F,
) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    if let Ok(addr) = listener.local_addr() {
        tracing::info!(address = %addr, "Updater listening");
    }

    axum::serve(listener, router(updater))
        .with_graceful_shutdown(shutdown)
        .await
}

/// Health check endpoint.
async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy"
    }))
}

async fn trigger_update(
    State(updater): State<Arc<Updater>>,
    headers: HeaderMap,
) -> Result<Json<UpdateResponse>, UpdateError> {
    let authorization = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok());
    updater.authorize(authorization)?;

    // Detached from the request future: a dropped connection must not cancel a started update.
    let task = tokio::spawn(async move { updater.run_update().await });
    let outcome = task.await.map_err(|e| {
        tracing::error!(error = %e, "Update task aborted");
        UpdateError::TaskAborted(e)
    })??;
    Ok(Json(UpdateResponse::success(outcome.message())))
}
