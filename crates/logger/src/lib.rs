//! Shared tracing setup for the webmon binaries.

mod tracing;

pub use crate::tracing::{LogOptions, LoggerError, init_tracing_with};
