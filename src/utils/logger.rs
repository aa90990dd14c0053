use crate::utils::error::{GossipError, Result};
use std::fs;
use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const MAX_LOG_FILES: usize = 5;
const LOG_FILE_SUFFIX: &str = "log";

#[derive(Debug, Clone)]
pub struct LogOptions {
    /// Prefix of the rolling log files, usually the role name.
    pub name: String,
    pub verbose: bool,
    /// `None` keeps logging on the console only.
    pub log_dir: Option<PathBuf>,
}

fn default_filter(verbose: bool) -> EnvFilter {
    if verbose {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("gossip_app=debug,info"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("gossip_app=info"))
    }
}

/// Installs the global subscriber: a compact console layer plus, when a log
/// directory is given, a daily-rolling JSON file layer.
///
/// The returned guard flushes the file writer on drop and must outlive every
/// log call.
pub fn init_logger(options: &LogOptions) -> Result<Option<WorkerGuard>> {
    let (file_layer, guard) = match &options.log_dir {
        Some(dir) => {
            fs::create_dir_all(dir)?;

            let appender = RollingFileAppender::builder()
                .rotation(Rotation::DAILY)
                .filename_prefix(&options.name)
                .filename_suffix(LOG_FILE_SUFFIX)
                .max_log_files(MAX_LOG_FILES)
                .build(dir)
                .map_err(|e| GossipError::ConfigError {
                    message: format!("Cannot open log file in {}: {}", dir.display(), e),
                })?;
            let (writer, guard) = tracing_appender::non_blocking(appender);

            let layer = tracing_subscriber::fmt::layer()
                .json()
                .with_writer(writer)
                .with_ansi(false)
                .with_file(true)
                .with_line_number(true);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(default_filter(options.verbose))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .with_writer(std::io::stderr)
                .compact(),
        )
        .with(file_layer)
        .try_init()
        .map_err(|e| GossipError::ConfigError {
            message: format!("Logger already initialized: {}", e),
        })?;

    tracing::info!(
        "===== NEW APP SESSION STARTED {} =====",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );

    Ok(guard)
}
