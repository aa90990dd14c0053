use crate::config::{AppConfig, Mode, Settings};
use crate::core::client::run_client;
use crate::core::coordinator::Coordinator;
use crate::core::server::CoordinatorServer;
use crate::notify;
use crate::utils::error::Result;
use crate::utils::validation::Validate;
use std::future::Future;
use std::sync::Arc;

/// Validates the configuration and runs the role selected by `MODE`.
pub async fn run(config: AppConfig) -> Result<()> {
    config.validate()?;
    let settings = config.load_settings()?;
    settings.validate()?;

    match config.mode()? {
        Mode::Server => {
            tracing::info!("Starting as COORDINATOR (server)...");
            run_server(&config, settings, shutdown_signal()).await
        }
        Mode::Client => {
            tracing::info!("Starting as CLIENT...");
            run_client(&config, &settings.client).await?;
            tracing::info!("Message sent successfully!");
            Ok(())
        }
    }
}

pub async fn run_server<F>(config: &AppConfig, settings: Settings, shutdown: F) -> Result<()>
where
    F: Future<Output = ()>,
{
    let notifier = notify::from_config(config, &settings.notifier);
    let coordinator = Arc::new(Coordinator::new(
        settings.server.expected_clients,
        notifier,
    ));

    let server = CoordinatorServer::bind(&config.bind_addr(), coordinator, settings.server).await?;
    server.serve_with_shutdown(shutdown).await?;

    tracing::info!("Coordinator shutdown complete");
    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
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
}
