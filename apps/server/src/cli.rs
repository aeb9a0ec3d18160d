use std::net::IpAddr;
use std::path::PathBuf;

use clap::Parser;

/// Synthetic availability monitor for HTTP(S) sites
#[derive(Debug, Parser)]
#[command(name = "webmon", version, about)]
pub struct Args {
    /// Path to the TOML configuration file
    #[arg(short, long, env = "WEBMON_CONFIG", default_value = "webmon.toml")]
    pub config: PathBuf,

    /// Check interval in seconds (overrides config file).
    ///
    /// The short flag is `-i`; `-c` selects the configuration file.
    #[arg(short, long, value_parser = clap::value_parser!(u64).range(1..))]
    pub interval: Option<u64>,

    /// Dashboard bind address (overrides config file)
    #[arg(long)]
    pub bind: Option<IpAddr>,

    /// Dashboard port (overrides config file)
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Also write log events to this file
    #[arg(long, env = "WEBMON_LOG_FILE")]
    pub log_file: Option<PathBuf>,

    /// Run a single check cycle and exit without serving the dashboard
    #[arg(long)]
    pub once: bool,
}
