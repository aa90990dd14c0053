use crate::domain::model::{ClientId, RoundStatus};
use crate::domain::ports::Notifier;
use indexmap::IndexMap;
use tokio::sync::Mutex;

#[derive(Debug, Default)]
struct RoundState {
    /// Insertion-ordered; a repeat submission keeps its first position.
    messages: IndexMap<ClientId, String>,
    message_sent: bool,
}

/// Collects one message per client and relays the joined text once enough
/// clients have reported.
pub struct Coordinator {
    state: Mutex<RoundState>,
    expected_clients: usize,
    notifier: Option<Box<dyn Notifier>>,
}

impl Coordinator {
    pub fn new(expected_clients: usize, notifier: Option<Box<dyn Notifier>>) -> Self {
        Self {
            state: Mutex::new(RoundState::default()),
            expected_clients: expected_clients.max(1),
            notifier,
        }
    }

    pub fn expected_clients(&self) -> usize {
        self.expected_clients
    }

    pub async fn is_sent(&self) -> bool {
        self.state.lock().await.message_sent
    }

    /// Snapshot of the stored messages in arrival order.
    pub async fn pending(&self) -> Vec<(ClientId, String)> {
        let state = self.state.lock().await;
        state
            .messages
            .iter()
            .map(|(id, msg)| (id.clone(), msg.clone()))
            .collect()
    }

    /// Records `message` for `client_id` and, when the round is complete,
    /// combines and relays it.
    ///
    /// The lock is held across the notification so concurrent submissions
    /// cannot complete the same round twice.
    pub async fn submit(&self, client_id: ClientId, message: String) -> RoundStatus {
        let mut state = self.state.lock().await;

        tracing::info!("Stored message from {}: {}", client_id, message);
        state.messages.insert(client_id, message);
        tracing::debug!(
            "Current clients: {:?}",
            state.messages.keys().map(ClientId::as_str).collect::<Vec<_>>()
        );

        if state.message_sent {
            tracing::info!("Message already sent for this round, skipping");
            return RoundStatus::AlreadySent;
        }

        let have = state.messages.len();
        if have < self.expected_clients {
            tracing::info!(
                "Not enough messages yet. Have {}, need {}",
                have,
                self.expected_clients
            );
            return RoundStatus::Pending {
                have,
                need: self.expected_clients,
            };
        }

        let combined = state
            .messages
            .values()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(" ");
        tracing::info!("Combined message: {}", combined);

        let status = match &self.notifier {
            Some(notifier) => match notifier.notify(&combined).await {
                Ok(()) => {
                    tracing::info!("Message sent to {} successfully", notifier.name());
                    state.message_sent = true;
                    RoundStatus::Delivered { combined }
                }
                Err(e) => {
                    tracing::warn!("Failed to send message to {}: {}", notifier.name(), e);
                    RoundStatus::NotificationFailed { combined }
                }
            },
            None => {
                tracing::info!("No notifier configured, skipping notification");
                state.message_sent = true;
                RoundStatus::Skipped { combined }
            }
        };

        state.messages.clear();
        tracing::debug!("Cleared client messages");

        status
    }
}
