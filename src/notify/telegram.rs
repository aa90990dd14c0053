use crate::config::NotifierSettings;
use crate::domain::ports::Notifier;
use crate::utils::error::{GossipError, Result};
use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;

/// Error body returned by the Bot API on failure.
#[derive(Debug, Deserialize)]
struct ApiReply {
    #[serde(default)]
    description: Option<String>,
}

/// Sends messages through the Telegram Bot API `sendMessage` method.
///
/// The bot token is part of the request path, so request URLs are never
/// logged.
pub struct TelegramNotifier {
    client: Client,
    token: String,
    chat_id: String,
    settings: NotifierSettings,
}

impl TelegramNotifier {
    pub fn new(
        token: impl Into<String>,
        chat_id: impl Into<String>,
        settings: NotifierSettings,
    ) -> Self {
        Self {
            client: Client::new(),
            token: token.into(),
            chat_id: chat_id.into(),
            settings,
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/bot{}/sendMessage",
            self.settings.api_base.trim_end_matches('/'),
            self.token
        )
    }

    pub async fn send(&self, text: &str) -> Result<()> {
        let max_attempts = self.settings.max_attempts.max(1);

        for attempt in 1..=max_attempts {
            let request = self
                .client
                .post(self.endpoint())
                .query(&[("chat_id", self.chat_id.as_str()), ("text", text)])
                .timeout(self.settings.timeout());

            match request.send().await {
                Ok(response) if response.status() == StatusCode::OK => {
                    tracing::info!("Notification sent successfully on attempt {}", attempt);
                    return Ok(());
                }
                Ok(response) => {
                    let status = response.status();
                    let description = describe_failure(response).await;
                    tracing::warn!(
                        "Attempt {} failed with status code: {} ({})",
                        attempt,
                        status,
                        description
                    );
                }
                Err(e) if e.is_timeout() => {
                    tracing::warn!(
                        "Attempt {} timed out after {} seconds",
                        attempt,
                        self.settings.timeout_secs
                    );
                }
                Err(e) => {
                    let e = e.without_url();
                    tracing::warn!(
                        "Attempt {} failed with error: {}",
                        attempt,
                        error_chain(&e)
                    );
                }
            }

            if attempt < max_attempts {
                tracing::info!(
                    "Waiting {} seconds before next attempt...",
                    self.settings.retry_delay_secs
                );
                tokio::time::sleep(self.settings.retry_delay()).await;
            }
        }

        tracing::error!("All attempts failed. Notification could not be sent.");
        Err(GossipError::NotificationError {
            attempts: max_attempts,
        })
    }
}

/// Joins an error and all of its sources, outermost first.
fn error_chain(err: &dyn std::error::Error) -> String {
    let mut text = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        text.push_str(": ");
        text.push_str(&cause.to_string());
        source = cause.source();
    }
    text
}

async fn describe_failure(response: Response) -> String {
    response
        .json::<ApiReply>()
        .await
        .ok()
        .and_then(|reply| reply.description)
        .unwrap_or_else(|| "no description".to_string())
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn notify(&self, text: &str) -> Result<()> {
        self.send(text).await
    }

    fn name(&self) -> &str {
        "telegram"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use std::fmt;
    use std::io;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl CapturedLogs {
        fn contents(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    impl io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[derive(Debug)]
    struct ChainedError {
        name: &'static str,
        source: Option<Box<ChainedError>>,
    }

    impl fmt::Display for ChainedError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str(self.name)
        }
    }

    impl std::error::Error for ChainedError {
        fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
            self.source
                .as_deref()
                .map(|inner| inner as &(dyn std::error::Error + 'static))
        }
    }

    fn settings_for(server: &MockServer) -> NotifierSettings {
        NotifierSettings {
            api_base: server.base_url(),
            max_attempts: 3,
            timeout_secs: 2,
            retry_delay_secs: 0,
        }
    }

    #[tokio::test]
    async fn test_send_posts_chat_id_and_text() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(POST)
                .path("/botTEST_TOKEN/sendMessage")
                .query_param("chat_id", "42")
                .query_param("text", "Hello World");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(serde_json::json!({"ok": true, "result": {}}));
        });

        let notifier = TelegramNotifier::new("TEST_TOKEN", "42", settings_for(&server));
        notifier.send("Hello World").await.unwrap();

        api_mock.assert();
    }

    #[tokio::test]
    async fn test_send_retries_then_gives_up() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(POST).path("/botTEST_TOKEN/sendMessage");
            then.status(500);
        });

        let notifier = TelegramNotifier::new("TEST_TOKEN", "42", settings_for(&server));
        let err = notifier.send("Data Stream").await.unwrap_err();

        api_mock.assert_hits(3);
        assert!(matches!(err, GossipError::NotificationError { attempts: 3 }));
    }

    #[tokio::test]
    async fn test_client_error_status_is_not_success() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(POST).path("/botTEST_TOKEN/sendMessage");
            then.status(400)
                .header("Content-Type", "application/json")
                .json_body(serde_json::json!({
                    "ok": false,
                    "error_code": 400,
                    "description": "Bad Request: chat not found"
                }));
        });

        let mut settings = settings_for(&server);
        settings.max_attempts = 1;
        let notifier = TelegramNotifier::new("TEST_TOKEN", "missing", settings);

        assert!(notifier.send("Hello").await.is_err());
        api_mock.assert_hits(1);
    }

    #[tokio::test]
    async fn test_trailing_slash_in_api_base() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(POST).path("/botTEST_TOKEN/sendMessage");
            then.status(200);
        });

        let mut settings = settings_for(&server);
        settings.api_base = format!("{}/", server.base_url());
        let notifier = TelegramNotifier::new("TEST_TOKEN", "42", settings);

        notifier.notify("Buffer").await.unwrap();
        api_mock.assert();
        assert_eq!(notifier.name(), "telegram");
    }

    #[tokio::test]
    async fn test_unreachable_api_fails_after_all_attempts() {
        let settings = NotifierSettings {
            api_base: "http://127.0.0.1:1".to_string(),
            max_attempts: 2,
            timeout_secs: 1,
            retry_delay_secs: 0,
        };
        let notifier = TelegramNotifier::new("TEST_TOKEN", "42", settings);

        let err = notifier.send("Hello").await.unwrap_err();
        assert!(matches!(err, GossipError::NotificationError { attempts: 2 }));
    }

    #[tokio::test]
    async fn test_failed_attempts_never_log_the_token() {
        let logs = CapturedLogs::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_max_level(tracing::Level::TRACE)
            .with_ansi(false)
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let settings = NotifierSettings {
            api_base: "http://127.0.0.1:1".to_string(),
            max_attempts: 1,
            timeout_secs: 1,
            retry_delay_secs: 0,
        };
        let notifier = TelegramNotifier::new("SECRET_TOKEN_XYZ", "42", settings);
        assert!(notifier.send("Hello").await.is_err());

        let output = logs.contents();
        assert!(output.contains("Attempt 1 "), "{}", output);
        assert!(output.contains("All attempts failed"), "{}", output);
        assert!(!output.contains("SECRET_TOKEN_XYZ"), "{}", output);
    }

    #[tokio::test]
    async fn test_transport_error_logs_its_cause() {
        let logs = CapturedLogs::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let settings = NotifierSettings {
            api_base: "http://127.0.0.1:1".to_string(),
            max_attempts: 1,
            timeout_secs: 5,
            retry_delay_secs: 0,
        };
        let notifier = TelegramNotifier::new("TEST_TOKEN", "42", settings);
        assert!(notifier.send("Hello").await.is_err());

        let output = logs.contents();
        assert!(
            output.contains("Attempt 1 failed with error: error sending request: "),
            "{}",
            output
        );
    }

    #[test]
    fn test_error_chain_joins_sources() {
        let err = ChainedError {
            name: "error sending request",
            source: Some(Box::new(ChainedError {
                name: "tcp connect error",
                source: Some(Box::new(ChainedError {
                    name: "Connection refused",
                    source: None,
                })),
            })),
        };
        assert_eq!(
            error_chain(&err),
            "error sending request: tcp connect error: Connection refused"
        );
        assert_eq!(
            error_chain(&ChainedError {
                name: "timed out",
                source: None
            }),
            "timed out"
        );
    }
}
