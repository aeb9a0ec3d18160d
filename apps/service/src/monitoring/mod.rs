/// Monitoring engine module - probes sites and publishes snapshots
///
/// This module is responsible for:
/// - Executing one HTTP(S) check per site and classifying failures
/// - Driving the repeating check cycle
/// - Holding the latest snapshot for concurrent readers
pub mod prober;
pub mod scheduler;
pub mod store;
pub mod types;

pub use prober::{DEFAULT_TIMEOUT, HttpProber, Prober};
pub use scheduler::Scheduler;
pub use store::{SnapshotReader, SnapshotStore};
pub use types::{ContentPattern, ProbeErrorKind, Site, SiteStatus, Snapshot};
