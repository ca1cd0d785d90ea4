//! HTTP server entrypoint
//!
//! Wires logging, the relay service and the router together and serves
//! them on the configured address. Embedders only supply the two chat
//! services.

use crate::api::endpoints::{AppState, create_router};
use crate::core::config::Config;
use crate::core::logging::init_logging;
use crate::core::provider::{GeminiChat, OpenAIChat};
use crate::relay::RelayService;
use anyhow::{Context, Result};
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{debug, error, info};

/// Initialize logging, bind `[server]` host:port and serve until Ctrl-C or SIGTERM
pub async fn serve(
    config: Config,
    gemini_chat: Arc<dyn GeminiChat>,
    openai_chat: Arc<dyn OpenAIChat>,
) -> Result<()> {
    if let Err(e) = init_logging(&config.server.log_level) {
        debug!("Logging already initialized: {}", e);
    }
    let listener = bind(&config).await?;
    serve_with_listener(listener, config, gemini_chat, openai_chat, shutdown_signal()).await
}

pub async fn bind(config: &Config) -> Result<TcpListener> {
    let addr = config.bind_address();
    TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))
}

/// Serve on an already bound listener until `shutdown` resolves
///
/// Queued relay work is drained before this returns.
pub async fn serve_with_listener<F>(
    listener: TcpListener,
    config: Config,
    gemini_chat: Arc<dyn GeminiChat>,
    openai_chat: Arc<dyn OpenAIChat>,
    shutdown: F,
) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let config = Arc::new(config);
    let service = RelayService::start(&config, gemini_chat, openai_chat);
    let app = create_router(AppState {
        config: config.clone(),
        bus: service.bus().clone(),
        client: service.client(),
    });

    info!("Server listening on http://{}", listener.local_addr()?);
    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await;

    service.shutdown().await;
    served.context("Server error")
}

/// Resolves on Ctrl-C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to install Ctrl-C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
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
        _ = ctrl_c => info!("Received Ctrl-C, shutting down"),
        _ = terminate => info!("Received SIGTERM, shutting down"),
    }
}
