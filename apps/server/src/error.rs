use std::io::Error as IoError;

use logger::LoggerError;
use thiserror::Error;
use webmon_service::ConfigError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0:#}")]
    Io(#[from] IoError),
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("Logging setup failed: {0}")]
    Logger(#[from] LoggerError),
    #[error("Startup failed: {0:#}")]
    Startup(#[from] anyhow::Error),
}
