//! Server execution logic.

use std::{future::Future, sync::Arc};

use axum::{Router, routing::get};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::usecase::DispatcherHandle;

use super::{
    config::ServerConfig,
    handler::{get_users, health_check, websocket_handler},
    signal::shutdown_signal,
    state::AppState,
};

pub type ServerError = Box<dyn std::error::Error + Send + Sync>;

/// WebSocket chat relay server
///
/// This struct encapsulates the server configuration and provides methods to run the server.
///
/// # Example
///
/// ```ignore
/// let (dispatcher, handle) = Dispatcher::new(broadcaster);
/// tokio::spawn(dispatcher.run());
///
/// let server = Server::new(handle, ServerConfig::default());
/// server.run().await?;
/// ```
pub struct Server {
    /// Dispatcher へのハンドル
    dispatcher: DispatcherHandle,
    config: ServerConfig,
}

impl Server {
    pub fn new(dispatcher: DispatcherHandle, config: ServerConfig) -> Self {
        Self { dispatcher, config }
    }

    /// Build the router with all endpoints
    pub fn router(&self) -> Router {
        let app_state = Arc::new(AppState {
            dispatcher: self.dispatcher.clone(),
            config: self.config.clone(),
        });

        Router::new()
            // WebSocket エンドポイント
            .route("/ws", get(websocket_handler))
            // HTTP エンドポイント
            .route("/api/health", get(health_check))
            .route("/api/users", get(get_users))
            .layer(TraceLayer::new_for_http())
            .with_state(app_state)
    }

    /// Run the server on the configured host and port until Ctrl+C or SIGTERM
    ///
    /// # Errors
    ///
    /// Returns an error if the server fails to bind to the configured address or
    /// if there's an error during server execution.
    pub async fn run(self) -> Result<(), ServerError> {
        let bind_addr = self.config.bind_addr();
        let listener = TcpListener::bind(&bind_addr).await?;

        tracing::info!("Connect to: ws://{}/ws", bind_addr);
        tracing::info!("Press Ctrl+C to shutdown gracefully");

        self.serve(listener, shutdown_signal()).await
    }

    /// Serve on an already bound listener until `shutdown` resolves
    pub async fn serve<F>(self, listener: TcpListener, shutdown: F) -> Result<(), ServerError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let app = self.router();

        tracing::info!(
            "WebSocket chat relay listening on {}",
            listener.local_addr()?
        );

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await?;

        tracing::info!("Server shutdown complete");

        Ok(())
    }
}
