use std::fmt;
use std::net::SocketAddr;

pub const DEFAULT_ACK_MESSAGE: &str = "Message received";
pub const DEFAULT_EXPECTED_CLIENTS: usize = 2;
pub const DEFAULT_PORT: u16 = 8888;

/// Identity of a submitting client: its remote `ip:port`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClientId(String);

impl ClientId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<SocketAddr> for ClientId {
    fn from(addr: SocketAddr) -> Self {
        Self(format!("{}:{}", addr.ip(), addr.port()))
    }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// What a single submission did to the current round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoundStatus {
    /// Still waiting for more clients.
    Pending { have: usize, need: usize },
    /// Combined message handed to the notifier successfully.
    Delivered { combined: String },
    /// The notifier gave up; the round stays open for the next quorum.
    NotificationFailed { combined: String },
    /// No notifier configured; the round is closed without sending.
    Skipped { combined: String },
    /// A round was already sent; the message is stored but never combined.
    AlreadySent,
}

impl RoundStatus {
    pub fn combined(&self) -> Option<&str> {
        match self {
            RoundStatus::Delivered { combined }
            | RoundStatus::NotificationFailed { combined }
            | RoundStatus::Skipped { combined } => Some(combined),
            RoundStatus::Pending { .. } | RoundStatus::AlreadySent => None,
        }
    }
}

/// Outcome of one client run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientReport {
    pub sent: String,
    pub response: String,
}
