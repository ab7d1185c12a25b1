//! HTTP front end: axum router, shared state and lifecycle.
//!
//! All configuration is captured in an [`AppState`] built once at startup
//! and shared with every handler through an `Arc`. Each request runs its own
//! transform on tokio's blocking pool; the only thing requests share is the
//! read-only state.

mod error;
mod handlers;

pub use error::{ServerError, ServerResult};

use crate::config::ServerConfig;
use crate::imaging::{ImageBackend, RustBackend};
use crate::store::{ObjectStore, build_store};
use axum::{Router, routing::get};
use std::sync::Arc;
use tokio::signal;
use tower_http::trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::{Level, error, info};

/// Read-only state shared by all handlers.
pub struct AppState {
    pub store: Arc<dyn ObjectStore>,
    pub backend: Arc<dyn ImageBackend>,
    /// `max-age` sent on resized responses, in seconds.
    pub cache_max_age: u64,
}

impl AppState {
    pub fn new(store: Arc<dyn ObjectStore>, cache_max_age: u64) -> Self {
        Self {
            store,
            backend: Arc::new(RustBackend::new()),
            cache_max_age,
        }
    }

    pub fn with_backend(mut self, backend: Arc<dyn ImageBackend>) -> Self {
        self.backend = backend;
        self
    }
}

/// Build the router with request tracing.
pub fn router(state: AppState) -> Router {
    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_request(DefaultOnRequest::new().level(Level::DEBUG))
        .on_response(DefaultOnResponse::new().level(Level::INFO));

    Router::new()
        .route("/image/:image_key", get(handlers::resize_handler))
        .route("/robots.txt", get(handlers::robots_handler))
        .layer(trace_layer)
        .with_state(Arc::new(state))
}

/// Bind, serve until Ctrl-C / SIGTERM, then drain in-flight requests.
pub async fn serve(config: ServerConfig) -> ServerResult<()> {
    let store = build_store(&config.storage).await;
    let app = router(AppState::new(store, config.cache.max_age_secs));

    let addr = config.server.addr();
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| ServerError::Internal(format!("Failed to bind to {addr}: {e}")))?;

    info!("Serving resized images on http://{}/image/<key>?resize=WxH", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| ServerError::Internal(format!("Server error: {e}")))?;

    info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
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

    info!("Shutdown signal received, draining connections");
}
