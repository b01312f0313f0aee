//! Application server
//!
//! Brings the headless client online, builds the router, and runs the HTTP
//! server with graceful shutdown.

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;

use crate::client::{Service, SkClient, SkClientBuilder};
use crate::config::Settings;
use crate::server::{routes, state::AppState};

/// Main application struct
pub struct App {
    settings: Arc<Settings>,
    state: AppState,
    // Keeps the client (and its session task ownership) alive for the
    // lifetime of the server
    _client: SkClient,
}

impl App {
    /// Create a new application instance.
    ///
    /// Connects the headless client before the HTTP server starts, so a bad
    /// login aborts startup instead of serving 503s forever.
    pub async fn new(settings: Settings) -> Result<Self> {
        let settings = Arc::new(settings);

        let mut builder = SkClientBuilder::new(settings.username.as_str(), settings.password.as_str())
            .region(settings.region)
            .language(settings.language)
            .enable_service(Service::Exchange);
        if let Some(addr) = &settings.server_addr {
            builder = builder.server_addr(addr);
        }
        let client = builder.build()?;

        tracing::debug!(
            region = %settings.region,
            language = %settings.language,
            "Bringing the headless client online"
        );
        client
            .connect()
            .await
            .context("Failed to bring the headless client online")?;

        let state = AppState::new(settings.clone(), client.feed());

        Ok(Self {
            settings,
            state,
            _client: client,
        })
    }

    /// Run the server with graceful shutdown support.
    ///
    /// The server shuts down on SIGINT (Ctrl+C) or SIGTERM.
    pub async fn run_with_graceful_shutdown(self) -> Result<()> {
        let addr = self.settings.server_bind_addr().parse::<SocketAddr>()?;
        let router = routes::create_router(self.state.clone());

        tracing::info!("Starting server on {} with graceful shutdown enabled", addr);

        let listener = tokio::net::TcpListener::bind(addr).await?;

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        Ok(())
    }

    /// Get a reference to the application state
    pub fn state(&self) -> &AppState {
        &self.state
    }
}

/// Create a future that completes when a shutdown signal is received
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
