pub mod config;
pub mod core;
pub mod domain;
pub mod notify;
pub mod protocol;
pub mod utils;

pub use crate::config::{AppConfig, Mode, Settings};
pub use crate::core::{
    client::ReliableTcpClient, coordinator::Coordinator, server::CoordinatorServer,
};
pub use crate::notify::TelegramNotifier;
pub use crate::utils::error::{GossipError, Result};
