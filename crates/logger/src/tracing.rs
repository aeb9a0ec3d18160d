use std::env::var;
use std::fs::OpenOptions;
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;

use thiserror::Error;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{
    Layer, filter::EnvFilter, layer::SubscriberExt, util::SubscriberInitExt,
    util::TryInitError,
};

/// Crates whose chatter is capped at `warn`.
const NOISY_CRATES: &[&str] = &["hyper", "hyper_util", "reqwest", "actix_server"];

#[derive(Debug, Error)]
pub enum LoggerError {
    #[error("Failed to open log file {}: {source}", path.display())]
    LogFile { path: PathBuf, source: io::Error },
    #[error("Failed to install tracing subscriber: {0}")]
    Init(#[from] TryInitError),
}

/// Options accepted by [`init_tracing_with`].
#[derive(Debug, Clone)]
pub struct LogOptions {
    pub level: LevelFilter,
    /// Events are mirrored into this file (append mode, no ANSI colours).
    pub log_file: Option<PathBuf>,
}

impl Default for LogOptions {
    fn default() -> Self {
        Self { level: LevelFilter::INFO, log_file: None }
    }
}

/// Initialize tracing subscriber.
///
/// `RUST_LOG` overrides the level, `RUST_LOG_FORMAT=json` switches the
/// stdout layer to JSON lines.
pub fn init_tracing_with(options: &LogOptions) -> Result<(), LoggerError> {
    let env_filter = build_filter(options.level);

    let log_format = var("RUST_LOG_FORMAT").unwrap_or_default();

    let log_layer = match log_format.as_str() {
        "json" => tracing_subscriber::fmt::layer().json().boxed(),
        _ => tracing_subscriber::fmt::layer().compact().without_time().boxed(),
    };

    let file_layer = match &options.log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|source| LoggerError::LogFile { path: path.clone(), source })?;
            Some(tracing_subscriber::fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(log_layer)
        .with(file_layer)
        .with(env_filter)
        .try_init()?;

    Ok(())
}

fn build_filter(level: LevelFilter) -> EnvFilter {
    let mut filter = EnvFilter::builder().with_default_directive(level.into()).from_env_lossy();

    for name in NOISY_CRATES {
        if let Ok(directive) = format!("{name}=warn").parse() {
            filter = filter.add_directive(directive);
        }
    }

    filter
}
