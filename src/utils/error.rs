use thiserror::Error;

#[derive(Error, Debug)]
pub enum GossipError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Frame of {len} bytes exceeds the limit of {max} bytes")]
    FrameTooLarge { len: usize, max: usize },

    #[error("Frame payload is not valid UTF-8: {0}")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),

    #[error("Connection closed by peer")]
    ConnectionClosed,

    #[error("Not connected to {addr}")]
    NotConnected { addr: String },

    #[error("Could not connect to {addr} after {attempts} attempts")]
    ConnectFailed { addr: String, attempts: u32 },

    #[error("Notification failed after {attempts} attempts")]
    NotificationError { attempts: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Network,
    Protocol,
    Notification,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl GossipError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            GossipError::ConfigError { .. }
            | GossipError::ConfigValidationError { .. }
            | GossipError::MissingConfigError { .. }
            | GossipError::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
            GossipError::ConnectionClosed
            | GossipError::NotConnected { .. }
            | GossipError::ConnectFailed { .. } => ErrorCategory::Network,
            GossipError::FrameTooLarge { .. } | GossipError::InvalidUtf8(_) => {
                ErrorCategory::Protocol
            }
            GossipError::NotificationError { .. } => ErrorCategory::Notification,
            GossipError::IoError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Notification => ErrorSeverity::Low,
            ErrorCategory::Network => ErrorSeverity::Medium,
            ErrorCategory::Configuration | ErrorCategory::Protocol => ErrorSeverity::High,
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    /// Short operator hint printed next to the error.
    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            GossipError::MissingConfigError { .. } => {
                "Set the missing environment variable, e.g. MODE=server or MODE=client"
            }
            GossipError::InvalidConfigValueError { .. }
            | GossipError::ConfigValidationError { .. }
            | GossipError::ConfigError { .. } => {
                "Check the environment variables and the settings file for typos"
            }
            GossipError::ConnectFailed { .. } | GossipError::NotConnected { .. } => {
                "Make sure the coordinator is running and COORDINATOR_IP/COORDINATOR_PORT point to it"
            }
            GossipError::ConnectionClosed => "The peer hung up early; retry the client",
            GossipError::NotificationError { .. } => {
                "Verify TELEGRAM_BOT_TOKEN, TELEGRAM_CHAT_ID and outbound network access"
            }
            GossipError::FrameTooLarge { .. } => {
                "Raise server.max_frame_bytes or send a shorter message"
            }
            GossipError::InvalidUtf8(_) => "The peer is not speaking the gossip protocol",
            GossipError::IoError(_) => "Check file permissions and that the port is free",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Configuration => format!("Invalid configuration: {}", self),
            ErrorCategory::Network => format!("Network problem: {}", self),
            ErrorCategory::Protocol => format!("Protocol violation: {}", self),
            ErrorCategory::Notification => format!("Notification not delivered: {}", self),
            ErrorCategory::System => format!("System error: {}", self),
        }
    }
}

pub type Result<T> = std::result::Result<T, GossipError>;
