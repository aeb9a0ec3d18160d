use std::io::Error as IoError;
use std::path::PathBuf;

use thiserror::Error;

/// Fatal configuration problems, detected before the scheduler starts
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {}: {source}", path.display())]
    ReadFailed { path: PathBuf, source: IoError },

    #[error("Failed to parse config: {0}")]
    ParseFailed(#[from] toml::de::Error),

    #[error("interval must be a positive number of seconds")]
    ZeroInterval,

    #[error("timeout_seconds must be between {min} and {max}, got {value}")]
    TimeoutOutOfRange { value: u64, min: u64, max: u64 },

    #[error("max_concurrency must be greater than zero")]
    ZeroConcurrency,

    #[error("site identifiers must not be empty")]
    EmptySiteId,

    #[error("site `{site}`: invalid url `{url}`: {source}")]
    InvalidUrl { site: String, url: String, source: url::ParseError },

    #[error("site `{site}`: unsupported scheme `{scheme}`, expected http or https")]
    UnsupportedScheme { site: String, scheme: String },

    #[error("site `{site}`: invalid content pattern: {source}")]
    InvalidPattern { site: String, source: regex::Error },
}
