use clap::Parser;
use gossip_app::utils::error::ErrorSeverity;
use gossip_app::utils::logger;
use gossip_app::{AppConfig, GossipError};

#[tokio::main]
async fn main() {
    let config = AppConfig::parse();

    // Keep the guard alive so the file writer flushes on exit.
    let _log_guard = match logger::init_logger(&config.log_options()) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("❌ {}", e.user_friendly_message());
            std::process::exit(1);
        }
    };

    tracing::info!("===  GossipApp   ===");
    tracing::info!("MODE: {}", config.mode.as_deref().unwrap_or("<unset>"));
    tracing::info!("Coordinator address: {}", config.coordinator_addr());
    if config.verbose {
        tracing::debug!("Config: {:?}", config);
    }

    if let Err(e) = gossip_app::core::app::run(config).await {
        report_failure(&e);

        let exit_code = match e.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        };
        if exit_code > 0 {
            drop(_log_guard);
            std::process::exit(exit_code);
        }
    }
}

fn report_failure(e: &GossipError) {
    tracing::error!(
        "❌ GossipApp failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());

    let mode_problem = match e {
        GossipError::MissingConfigError { field } => field == "MODE",
        GossipError::InvalidConfigValueError { field, .. } => field == "MODE",
        _ => false,
    };
    if mode_problem {
        eprintln!("Please set MODE environment variable to one of:");
        eprintln!("  MODE=server  # to run as a server (coordinator)");
        eprintln!("  MODE=client  # to run as a client");
    }
}
