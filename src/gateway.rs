use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::{net::TcpListener, signal};

use crate::{config::Config, upstream::MlClient};

mod handlers;

pub use handlers::build_router;

/// Shared, read-only state behind every handler.
#[derive(Debug)]
pub struct Gateway {
    pub config: Config,
    pub client: MlClient,
}

impl Gateway {
    pub fn new(config: Config) -> anyhow::Result<Arc<Self>> {
        let client = MlClient::new(&config).context("Failed to build ML service client")?;
        Ok(Arc::new(Self { config, client }))
    }

    pub fn upstream(&self) -> &str {
        self.config.upstream_display()
    }
}

pub async fn serve(config: Config) -> anyhow::Result<()> {
    let port = config.port;
    let gateway = Gateway::new(config)?;
    let upstream = gateway.upstream().to_owned();
    let router = build_router(gateway);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    tracing::info!("Brew API running on port {port}");
    tracing::info!("Health check: http://localhost:{port}/health");
    tracing::info!("Search endpoint: http://localhost:{port}/api/search");
    tracing::info!("ML service URL: {upstream}");

    axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(error) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {error}");
            std::future::pending::<()>().await;
        }
        tracing::info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                tracing::info!("Received terminate signal, shutting down");
            }
            Err(error) => {
                tracing::error!("Failed to install terminate handler: {error}");
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
}
