use clap::Parser;
use gossip_app::config::{AppConfig, ClientSettings, Settings};
use gossip_app::core::app::{run, run_server};
use gossip_app::core::client::run_client;
use gossip_app::GossipError;
use httpmock::prelude::*;
use serial_test::serial;
use std::io::Write;
use tempfile::NamedTempFile;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

const ENV_VARS: [&str; 8] = [
    "MODE",
    "COORDINATOR_IP",
    "COORDINATOR_PORT",
    "BIND_ADDRESS",
    "TELEGRAM_BOT_TOKEN",
    "TELEGRAM_CHAT_ID",
    "GOSSIP_CONFIG",
    "GOSSIP_LOG_DIR",
];

fn config(args: &[&str]) -> AppConfig {
    for name in ENV_VARS {
        std::env::remove_var(name);
    }
    let mut argv = vec!["gossip-app", "--no-file-log"];
    argv.extend_from_slice(args);
    AppConfig::try_parse_from(argv).unwrap()
}

/// A loopback port that was free a moment ago.
async fn free_port() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap().port().to_string()
}

/// Clients keep retrying while the server task is still binding.
fn patient_client() -> ClientSettings {
    ClientSettings {
        connect_timeout_secs: 1,
        reconnect_delay_secs: 1,
        max_connect_attempts: Some(10),
        ..ClientSettings::default()
    }
}

fn client_config(port: &str) -> AppConfig {
    config(&[
        "--mode",
        "client",
        "--coordinator-ip",
        "127.0.0.1",
        "--coordinator-port",
        port,
    ])
}

struct RunningApp {
    stop: oneshot::Sender<()>,
    handle: JoinHandle<gossip_app::Result<()>>,
}

impl RunningApp {
    fn start(server_config: AppConfig, settings: Settings) -> Self {
        let (stop, stopped) = oneshot::channel::<()>();
        let handle = tokio::spawn(async move {
            run_server(&server_config, settings, async move {
                let _ = stopped.await;
            })
            .await
        });
        Self { stop, handle }
    }

    async fn shutdown(self) {
        self.stop.send(()).unwrap();
        self.handle.await.unwrap().unwrap();
    }
}

#[tokio::test]
#[serial]
async fn test_run_server_acknowledges_run_client() {
    let port = free_port().await;
    let server_config = config(&[
        "--mode",
        "server",
        "--bind-address",
        "127.0.0.1",
        "--coordinator-port",
        &port,
    ]);
    let app = RunningApp::start(server_config, Settings::default());

    let client_config = client_config(&port);
    let settings = patient_client();

    let first = run_client(&client_config, &settings).await.unwrap();
    assert_eq!(first.response, "Message received");
    assert!(settings.words.contains(&first.sent));

    let second = run_client(&client_config, &settings).await.unwrap();
    assert_eq!(second.response, "Message received");

    app.shutdown().await;
}

#[tokio::test]
#[serial]
async fn test_run_server_wires_telegram_from_credentials() {
    let telegram = MockServer::start();
    let api_mock = telegram.mock(|when, then| {
        when.method(POST)
            .path("/botTEST_TOKEN/sendMessage")
            .query_param("chat_id", "42");
        then.status(200);
    });

    let port = free_port().await;
    let server_config = config(&[
        "--mode",
        "server",
        "--bind-address",
        "127.0.0.1",
        "--coordinator-port",
        &port,
        "--telegram-bot-token",
        "TEST_TOKEN",
        "--telegram-chat-id",
        "42",
    ]);
    let mut settings = Settings::default();
    settings.notifier.api_base = telegram.base_url();
    settings.notifier.max_attempts = 1;
    settings.notifier.retry_delay_secs = 0;
    let app = RunningApp::start(server_config, settings);

    let client_config = client_config(&port);
    run_client(&client_config, &patient_client()).await.unwrap();
    api_mock.assert_hits(0);

    // The second ack is written only after the notifier returns.
    run_client(&client_config, &patient_client()).await.unwrap();
    api_mock.assert_hits(1);

    app.shutdown().await;
}

#[tokio::test]
#[serial]
async fn test_run_in_client_mode_uses_settings_file() {
    let telegram = MockServer::start();
    let api_mock = telegram.mock(|when, then| {
        when.method(POST)
            .path("/botTEST_TOKEN/sendMessage")
            .query_param("text", "Coordinator Coordinator");
        then.status(200);
    });

    let port = free_port().await;
    let server_config = config(&[
        "--mode",
        "server",
        "--bind-address",
        "127.0.0.1",
        "--coordinator-port",
        &port,
        "--telegram-bot-token",
        "TEST_TOKEN",
        "--telegram-chat-id",
        "42",
    ]);
    let mut settings = Settings::default();
    settings.notifier.api_base = telegram.base_url();
    settings.notifier.retry_delay_secs = 0;
    let app = RunningApp::start(server_config, settings);

    let mut settings_file = NamedTempFile::new().unwrap();
    settings_file
        .write_all(
            b"[client]\nconnect_timeout_secs = 1\nreconnect_delay_secs = 1\nmax_connect_attempts = 10\nwords = [\"Coordinator\"]\n",
        )
        .unwrap();
    let path = settings_file.path().to_string_lossy().into_owned();

    for _ in 0..2 {
        let config = config(&[
            "--mode",
            "client",
            "--coordinator-ip",
            "127.0.0.1",
            "--coordinator-port",
            &port,
            "--config",
            &path,
        ]);
        run(config).await.unwrap();
    }

    api_mock.assert();
    app.shutdown().await;
}

#[tokio::test]
#[serial]
async fn test_run_rejects_unparsable_settings_file() {
    let mut settings_file = NamedTempFile::new().unwrap();
    settings_file
        .write_all(b"[server\nexpected_clients = 2\n")
        .unwrap();
    let path = settings_file.path().to_string_lossy().into_owned();

    let config = config(&["--mode", "server", "--config", &path]);
    let err = run(config).await.unwrap_err();

    assert!(matches!(err, GossipError::ConfigValidationError { .. }));
}

#[tokio::test]
#[serial]
async fn test_run_rejects_invalid_settings_values() {
    let mut settings_file = NamedTempFile::new().unwrap();
    settings_file
        .write_all(b"[server]\nexpected_clients = 0\n")
        .unwrap();
    let path = settings_file.path().to_string_lossy().into_owned();

    let config = config(&["--mode", "server", "--config", &path]);
    let err = run(config).await.unwrap_err();

    assert!(matches!(
        err,
        GossipError::InvalidConfigValueError { ref field, .. } if field == "server.expected_clients"
    ));
}

#[tokio::test]
#[serial]
async fn test_run_without_mode_fails() {
    let config = config(&[]);
    let err = run(config).await.unwrap_err();

    assert!(matches!(err, GossipError::MissingConfigError { ref field } if field == "MODE"));
}
