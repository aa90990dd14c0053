pub mod settings;

pub use settings::{ClientSettings, NotifierSettings, ServerSettings, Settings};

use crate::domain::model::DEFAULT_PORT;
use crate::utils::error::{GossipError, Result};
use crate::utils::logger::LogOptions;
use crate::utils::validation::{self, Validate};
use clap::Parser;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Server,
    Client,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Server => "server",
            Mode::Client => "client",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = GossipError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "server" => Ok(Mode::Server),
            "client" => Ok(Mode::Client),
            _ => Err(GossipError::InvalidConfigValueError {
                field: "MODE".to_string(),
                value: s.to_string(),
                reason: "Expected 'server' (coordinator) or 'client'".to_string(),
            }),
        }
    }
}

#[derive(Clone, Parser)]
#[command(name = "gossip-app")]
#[command(about = "Gossip coordinator and client: collects messages over TCP and relays them to Telegram")]
pub struct AppConfig {
    /// Role of this process: server or client
    #[arg(long, env = "MODE")]
    pub mode: Option<String>,

    /// Coordinator address the client connects to
    #[arg(long, env = "COORDINATOR_IP", default_value = "0.0.0.0")]
    pub coordinator_ip: String,

    #[arg(long, env = "COORDINATOR_PORT", default_value_t = DEFAULT_PORT)]
    pub coordinator_port: u16,

    /// Interface the coordinator listens on
    #[arg(long, env = "BIND_ADDRESS", default_value = "0.0.0.0")]
    pub bind_address: String,

    #[arg(long, env = "TELEGRAM_BOT_TOKEN", hide_env_values = true)]
    pub telegram_bot_token: Option<String>,

    #[arg(long, env = "TELEGRAM_CHAT_ID")]
    pub telegram_chat_id: Option<String>,

    /// Optional TOML settings file
    #[arg(long, env = "GOSSIP_CONFIG")]
    pub config: Option<PathBuf>,

    #[arg(long, env = "GOSSIP_LOG_DIR", default_value = "logs")]
    pub log_dir: PathBuf,

    /// Log to the console only
    #[arg(long)]
    pub no_file_log: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("mode", &self.mode)
            .field("coordinator_ip", &self.coordinator_ip)
            .field("coordinator_port", &self.coordinator_port)
            .field("bind_address", &self.bind_address)
            .field(
                "telegram_bot_token",
                &self.telegram_bot_token.as_ref().map(|_| "<redacted>"),
            )
            .field("telegram_chat_id", &self.telegram_chat_id)
            .field("config", &self.config)
            .field("log_dir", &self.log_dir)
            .field("no_file_log", &self.no_file_log)
            .field("verbose", &self.verbose)
            .finish()
    }
}

impl AppConfig {
    pub fn mode(&self) -> Result<Mode> {
        validation::require("MODE", &self.mode)?.parse()
    }

    pub fn coordinator_addr(&self) -> String {
        format!("{}:{}", self.coordinator_ip, self.coordinator_port)
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.bind_address, self.coordinator_port)
    }

    /// Token and chat id, only when both are set to something non-blank.
    pub fn telegram_credentials(&self) -> Option<(&str, &str)> {
        let token = self.telegram_bot_token.as_deref().map(str::trim)?;
        let chat_id = self.telegram_chat_id.as_deref().map(str::trim)?;
        if token.is_empty() || chat_id.is_empty() {
            return None;
        }
        Some((token, chat_id))
    }

    pub fn load_settings(&self) -> Result<Settings> {
        match &self.config {
            Some(path) => Settings::from_file(path),
            None => Ok(Settings::default()),
        }
    }

    /// Log file prefix follows the role so server and client logs stay apart.
    pub fn log_options(&self) -> LogOptions {
        let name = self
            .mode()
            .map(|m| m.as_str().to_string())
            .unwrap_or_else(|_| "gossip-app".to_string());
        LogOptions {
            name,
            verbose: self.verbose,
            log_dir: (!self.no_file_log).then(|| self.log_dir.clone()),
        }
    }
}

impl Validate for AppConfig {
    fn validate(&self) -> Result<()> {
        self.mode()?;
        validation::at_least("COORDINATOR_PORT", self.coordinator_port, 1)?;
        validation::not_blank("COORDINATOR_IP", &self.coordinator_ip)?;
        validation::not_blank("BIND_ADDRESS", &self.bind_address)?;
        if !self.no_file_log {
            validation::usable_dir("GOSSIP_LOG_DIR", &self.log_dir)?;
        }
        Ok(())
    }
}
