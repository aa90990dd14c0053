use crate::config::{AppConfig, ClientSettings};
use crate::domain::model::ClientReport;
use crate::protocol::{read_frame, write_frame};
use crate::utils::error::{GossipError, Result};
use rand::seq::IndexedRandom;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;

/// TCP client that keeps retrying until the coordinator accepts it.
pub struct ReliableTcpClient {
    host: String,
    port: u16,
    settings: ClientSettings,
    stream: Option<TcpStream>,
}

impl ReliableTcpClient {
    pub fn new(host: impl Into<String>, port: u16, settings: ClientSettings) -> Self {
        Self {
            host: host.into(),
            port,
            settings,
            stream: None,
        }
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn is_connected(&self) -> bool {
        self.stream.is_some()
    }

    /// Connects with a per-attempt timeout, sleeping `reconnect_delay`
    /// between failures. Without `max_connect_attempts` this never gives up.
    pub async fn connect(&mut self) -> Result<()> {
        let mut attempts: u32 = 0;

        loop {
            attempts += 1;
            tracing::info!("Attempting to connect to {}...", self.addr());

            let connecting = TcpStream::connect((self.host.as_str(), self.port));
            match tokio::time::timeout(self.settings.connect_timeout(), connecting).await {
                Ok(Ok(stream)) => {
                    tracing::info!("Successfully connected to {}", self.addr());
                    self.stream = Some(stream);
                    return Ok(());
                }
                Ok(Err(e)) => tracing::warn!("Connection failed: {}", e),
                Err(_) => tracing::warn!(
                    "Connection timeout after {}s",
                    self.settings.connect_timeout_secs
                ),
            }

            if let Some(max) = self.settings.max_connect_attempts {
                if attempts >= max {
                    return Err(GossipError::ConnectFailed {
                        addr: self.addr(),
                        attempts,
                    });
                }
            }

            tracing::info!(
                "Retrying in {} seconds...",
                self.settings.reconnect_delay_secs
            );
            tokio::time::sleep(self.settings.reconnect_delay()).await;
        }
    }

    pub async fn send_message(&mut self, message: &str) -> Result<()> {
        let stream = match self.stream.as_mut() {
            Some(stream) => stream,
            None => {
                return Err(GossipError::NotConnected {
                    addr: format!("{}:{}", self.host, self.port),
                })
            }
        };

        match write_frame(stream, message).await {
            Ok(()) => {
                tracing::info!("Sent: {:?} (length: {} bytes)", message, message.len());
                Ok(())
            }
            Err(e) => {
                tracing::warn!("Error sending message: {}", e);
                self.stream = None;
                Err(e)
            }
        }
    }

    /// Reads one ack frame of at most `max_len` payload bytes.
    pub async fn receive_message(&mut self, max_len: usize) -> Result<String> {
        let stream = match self.stream.as_mut() {
            Some(stream) => stream,
            None => {
                return Err(GossipError::NotConnected {
                    addr: format!("{}:{}", self.host, self.port),
                })
            }
        };

        match read_frame(stream, max_len).await {
            Ok(response) => {
                tracing::info!("Received: {:?}", response);
                Ok(response)
            }
            Err(e) => {
                tracing::warn!("Error receiving message: {}", e);
                self.stream = None;
                Err(e)
            }
        }
    }

    pub async fn close(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            if let Err(e) = stream.shutdown().await {
                tracing::debug!("Shutdown of {} failed: {}", self.addr(), e);
            }
            tracing::info!("Connection closed");
        }
    }
}

/// Picks a random non-blank word from the vocabulary.
pub fn choose_word(words: &[String]) -> Result<String> {
    let candidates: Vec<&String> = words.iter().filter(|w| !w.trim().is_empty()).collect();
    candidates
        .choose(&mut rand::rng())
        .map(|w| w.to_string())
        .ok_or_else(|| GossipError::InvalidConfigValueError {
            field: "client.words".to_string(),
            value: String::new(),
            reason: "No words to choose from".to_string(),
        })
}

/// One request/response exchange: connect, send `message`, wait for the
/// ack. The connection is closed whether or not the exchange succeeded.
pub async fn send_once(
    host: &str,
    port: u16,
    settings: ClientSettings,
    message: &str,
) -> Result<ClientReport> {
    let max_len = settings.max_frame_bytes;
    let mut client = ReliableTcpClient::new(host, port, settings);
    client.connect().await?;

    let exchange = async {
        client.send_message(message).await?;
        client.receive_message(max_len).await
    }
    .await;

    client.close().await;

    let response = exchange?;
    Ok(ClientReport {
        sent: message.to_string(),
        response,
    })
}

pub async fn run_client(config: &AppConfig, settings: &ClientSettings) -> Result<ClientReport> {
    let word = choose_word(&settings.words)?;
    tracing::info!("Client sending random message: {}", word);

    let report = send_once(
        &config.coordinator_ip,
        config.coordinator_port,
        settings.clone(),
        &word,
    )
    .await?;

    tracing::info!("Server response: {}", report.response);
    Ok(report)
}
