use crate::config::Config;
use anyhow::{Context, Result};
use axum::{
    body::Body,
    http::{Request, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    Router,
};
use gifloop_common::paths::is_temp_artifact;
use percent_encoding::percent_decode_str;
use std::future::Future;
use std::net::SocketAddr;
use std::path::Path;
use tokio::signal;
use tower_http::{services::ServeDir, trace::TraceLayer};

/// Create the router serving published artifacts out of `output_dir`.
///
/// Every path maps to a file in the directory; there are no other routes.
/// In-progress temp artifacts are never served.
pub fn create_router(output_dir: &Path) -> Router {
    Router::new()
        .fallback_service(ServeDir::new(output_dir))
        .layer(middleware::from_fn(hide_temp_artifacts))
        .layer(TraceLayer::new_for_http())
}

async fn hide_temp_artifacts(request: Request<Body>, next: Next) -> Response {
    // ServeDir resolves the percent-decoded path
    let decoded = percent_decode_str(request.uri().path()).decode_utf8_lossy();
    if is_temp_artifact(Path::new(decoded.as_ref())) {
        return StatusCode::NOT_FOUND.into_response();
    }
    next.run(request).await
}

/// Start the HTTP server and run until Ctrl+C or SIGTERM.
pub async fn start_server(config: &Config) -> Result<()> {
    start_server_with_shutdown(config, shutdown_signal()).await
}

/// Start the HTTP server, stopping when `shutdown` resolves.
pub async fn start_server_with_shutdown<F>(config: &Config, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("Invalid server address")?;

    let app = create_router(&config.output.dir);

    tracing::info!("Server is running on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => {}
            Err(e) => {
                tracing::error!("Failed to install Ctrl+C handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
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

    tracing::info!("Shutdown signal received");
}
