pub mod app;
pub mod client;
pub mod coordinator;
pub mod server;

pub use crate::domain::model::{ClientId, ClientReport, RoundStatus};
pub use crate::domain::ports::Notifier;
pub use crate::utils::error::Result;
