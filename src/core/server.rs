use crate::config::ServerSettings;
use crate::core::coordinator::Coordinator;
use crate::domain::model::{ClientId, RoundStatus};
use crate::protocol::{read_frame, write_frame};
use crate::utils::error::Result;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::net::{TcpListener, TcpStream};

const ACCEPT_BACKOFF: Duration = Duration::from_millis(100);

/// TCP front end of the coordinator: one frame in, one ack frame out, per
/// connection.
pub struct CoordinatorServer {
    listener: TcpListener,
    coordinator: Arc<Coordinator>,
    settings: ServerSettings,
}

impl CoordinatorServer {
    pub async fn bind(
        addr: &str,
        coordinator: Arc<Coordinator>,
        settings: ServerSettings,
    ) -> Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        Ok(Self {
            listener,
            coordinator,
            settings,
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    pub async fn serve(self) -> Result<()> {
        self.serve_with_shutdown(std::future::pending::<()>()).await
    }

    /// Accepts connections until `shutdown` resolves. Connections already
    /// being handled run to completion on their own tasks.
    pub async fn serve_with_shutdown<F>(self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);

        tracing::info!("Coordinator serving on {}", self.local_addr()?);
        tracing::info!(
            "Waiting for {} clients...",
            self.coordinator.expected_clients()
        );

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    tracing::info!("Shutdown signal received, no longer accepting connections");
                    break;
                }
                accepted = self.listener.accept() => match accepted {
                    Ok((stream, peer)) => {
                        let coordinator = Arc::clone(&self.coordinator);
                        let settings = self.settings.clone();
                        tokio::spawn(async move {
                            handle_connection(stream, peer, coordinator, settings).await;
                        });
                    }
                    Err(e) => {
                        tracing::warn!("Failed to accept connection: {}", e);
                        tokio::time::sleep(ACCEPT_BACKOFF).await;
                    }
                }
            }
        }

        Ok(())
    }
}

async fn handle_connection(
    mut stream: TcpStream,
    peer: SocketAddr,
    coordinator: Arc<Coordinator>,
    settings: ServerSettings,
) {
    let client_id = ClientId::from(peer);
    tracing::debug!("Accepted connection from {}", client_id);

    if let Err(e) = exchange(&mut stream, &client_id, &coordinator, &settings).await {
        tracing::warn!("Error handling connection from {}: {}", client_id, e);
    }

    tracing::debug!("Closing connection with {}", client_id);
    if let Err(e) = stream.shutdown().await {
        tracing::debug!("Shutdown of {} failed: {}", client_id, e);
    }
}

async fn exchange(
    stream: &mut TcpStream,
    client_id: &ClientId,
    coordinator: &Coordinator,
    settings: &ServerSettings,
) -> Result<RoundStatus> {
    let message = read_frame(stream, settings.max_frame_bytes).await?;
    tracing::info!("Received {:?} from {}", message, client_id);

    let status = coordinator.submit(client_id.clone(), message).await;

    write_frame(stream, &settings.ack_message).await?;
    tracing::info!("Sent acknowledgment to {}", client_id);

    Ok(status)
}
