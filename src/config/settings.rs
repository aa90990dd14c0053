use crate::domain::model::{DEFAULT_ACK_MESSAGE, DEFAULT_EXPECTED_CLIENTS};
use crate::protocol::DEFAULT_MAX_FRAME_BYTES;
use crate::utils::error::{GossipError, Result};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_TELEGRAM_API_BASE: &str = "https://api.telegram.org";

const DEFAULT_WORDS: [&str; 18] = [
    "Hello",
    "World",
    "Gossip",
    "Async",
    "Network",
    "Message",
    "Client",
    "Server",
    "Coordinator",
    "Telegram",
    "Bot",
    "API",
    "Connection",
    "Socket",
    "Protocol",
    "Data",
    "Stream",
    "Buffer",
];

/// Tuning knobs read from the optional TOML settings file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub server: ServerSettings,
    pub client: ClientSettings,
    pub notifier: NotifierSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub expected_clients: usize,
    pub ack_message: String,
    pub max_frame_bytes: usize,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            expected_clients: DEFAULT_EXPECTED_CLIENTS,
            ack_message: DEFAULT_ACK_MESSAGE.to_string(),
            max_frame_bytes: DEFAULT_MAX_FRAME_BYTES,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientSettings {
    pub connect_timeout_secs: u64,
    pub reconnect_delay_secs: u64,
    /// `None` retries forever.
    pub max_connect_attempts: Option<u32>,
    pub max_frame_bytes: usize,
    pub words: Vec<String>,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            connect_timeout_secs: 3,
            reconnect_delay_secs: 5,
            max_connect_attempts: None,
            max_frame_bytes: DEFAULT_MAX_FRAME_BYTES,
            words: DEFAULT_WORDS.iter().map(|w| w.to_string()).collect(),
        }
    }
}

impl ClientSettings {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_secs(self.reconnect_delay_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotifierSettings {
    pub api_base: String,
    pub max_attempts: u32,
    pub timeout_secs: u64,
    pub retry_delay_secs: u64,
}

impl Default for NotifierSettings {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_TELEGRAM_API_BASE.to_string(),
            max_attempts: 3,
            timeout_secs: 3,
            retry_delay_secs: 5,
        }
    }
}

impl NotifierSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_secs(self.retry_delay_secs)
    }
}

impl Settings {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(GossipError::IoError)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed = Self::substitute_env_vars(content)?;

        toml::from_str(&processed).map_err(|e| GossipError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${NAME}` with the value of the environment variable `NAME`.
    /// Unset variables are left as written.
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| GossipError::ConfigError {
            message: format!("Bad substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }
}

impl Validate for Settings {
    fn validate(&self) -> Result<()> {
        validation::at_least("server.expected_clients", self.server.expected_clients, 1)?;
        validation::at_least("server.max_frame_bytes", self.server.max_frame_bytes, 1)?;
        validation::at_least("client.max_frame_bytes", self.client.max_frame_bytes, 1)?;
        if self.client.words.iter().all(|w| w.trim().is_empty()) {
            return Err(GossipError::InvalidConfigValueError {
                field: "client.words".to_string(),
                value: format!("{:?}", self.client.words),
                reason: "At least one non-empty word is required".to_string(),
            });
        }
        if self.client.max_connect_attempts == Some(0) {
            return Err(GossipError::InvalidConfigValueError {
                field: "client.max_connect_attempts".to_string(),
                value: "0".to_string(),
                reason: "Omit the key to retry forever, or use a value of at least 1".to_string(),
            });
        }
        validation::http_url("notifier.api_base", &self.notifier.api_base)?;
        validation::at_least("notifier.max_attempts", self.notifier.max_attempts, 1)?;
        Ok(())
    }
}
