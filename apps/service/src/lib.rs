//! webmon monitoring engine
//!
//! Periodically probes the configured HTTP(S) sites and publishes each
//! cycle's results as one immutable [`Snapshot`] for concurrent readers.

pub mod config;
pub mod error;
pub mod monitoring;

pub use config::{Config, ServerConfig};
pub use error::ConfigError;
pub use monitoring::{
    HttpProber, ProbeErrorKind, Prober, Scheduler, SiteStatus, Snapshot, SnapshotReader,
    SnapshotStore,
};
