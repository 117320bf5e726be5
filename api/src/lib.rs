use std::{env, sync::Arc};

pub mod core;
pub mod error_handler;
mod routes;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use tokio::signal;
use tracing::{info, warn};

use crate::{
    core::app_state::AppState,
    error_handler::AppError,
    routes::{process_file::process_file_route::process_file, report::get_report_route::get_report},
};

const DEFAULT_ADDRESS: &str = "0.0.0.0:8000";

/// Room for multipart framing and the text part on top of the document limit.
const BODY_OVERHEAD_BYTES: usize = 1024 * 1024;

/// Builds the HTTP router. Exposed separately from [`start`] so it can be
/// driven in-process by tests.
pub fn router(state: Arc<AppState>) -> Router {
    let body_limit = state.max_upload_bytes().saturating_add(BODY_OVERHEAD_BYTES);

    Router::new()
        .route("/process-file/", post(process_file))
        .route("/report/{report_id}", get(get_report))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}

/// Binds `API_ADDRESS` (default `0.0.0.0:8000`) and serves until Ctrl+C.
pub async fn start(state: Arc<AppState>) -> Result<(), AppError> {
    let host_url = env::var("API_ADDRESS").unwrap_or_else(|_| DEFAULT_ADDRESS.to_string());

    let app = router(state);

    let listener = tokio::net::TcpListener::bind(&host_url)
        .await
        .map_err(AppError::Bind)?;
    info!(address = %host_url, "http server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(AppError::Server)?;

    info!("http server stopped");
    Ok(())
}

/// Returns a future that resolves when Ctrl+C is pressed
async fn shutdown_signal() {
    if let Err(e) = signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
