use crate::utils::error::Result;
use async_trait::async_trait;

/// Sink for combined round messages.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Delivers `text`, retrying internally as the implementation sees fit.
    async fn notify(&self, text: &str) -> Result<()>;

    /// Name used in log lines.
    fn name(&self) -> &str;
}
