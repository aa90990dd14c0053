use clap::Parser;
use gossip_app::config::ClientSettings;
use gossip_app::core::client::send_once;
use gossip_app::utils::logger::{self, LogOptions};

/// Sends one message to a running coordinator and prints the acknowledgement.
#[derive(Parser)]
#[command(name = "gossip-probe")]
#[command(about = "Send a single message to a gossip coordinator")]
struct Args {
    /// Text to send
    message: String,

    #[arg(long, env = "COORDINATOR_IP", default_value = "127.0.0.1")]
    host: String,

    #[arg(long, env = "COORDINATOR_PORT", default_value_t = 8888)]
    port: u16,

    /// Give up after this many connection attempts
    #[arg(long, default_value_t = 3)]
    attempts: u32,

    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> gossip_app::Result<()> {
    let args = Args::parse();

    let _guard = logger::init_logger(&LogOptions {
        name: "probe".to_string(),
        verbose: args.verbose,
        log_dir: None,
    })?;

    let settings = ClientSettings {
        connect_timeout_secs: 3,
        reconnect_delay_secs: 1,
        max_connect_attempts: Some(args.attempts.max(1)),
        ..ClientSettings::default()
    };

    println!("📡 Sending {:?} to {}:{}", args.message, args.host, args.port);
    let report = send_once(&args.host, args.port, settings, &args.message).await?;
    println!("✅ Coordinator replied: {}", report.response);

    Ok(())
}
