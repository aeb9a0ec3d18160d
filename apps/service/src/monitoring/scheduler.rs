use chrono::Utc;
use futures::stream::{self, StreamExt};
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use super::prober::Prober;
use super::store::SnapshotStore;
use super::types::{Site, SiteStatus, Snapshot};
use crate::config::Config;

/// Monitoring scheduler - drives the probe cycle and publishes snapshots.
///
/// A cycle probes every site concurrently, waits for all of them, publishes
/// the ordered result set, then sleeps for the interval. The interval is
/// measured from the end of a cycle.
pub struct Scheduler {
    sites: Vec<Site>,
    interval: Duration,
    max_concurrency: Option<NonZeroUsize>,
    prober: Arc<dyn Prober>,
    store: SnapshotStore,
    cancel: CancellationToken,
    cycle: u64,
}

impl Scheduler {
    /// Create a new scheduler over `sites`, probing all of them at once
    pub fn new(
        sites: Vec<Site>,
        interval: Duration,
        prober: Arc<dyn Prober>,
        store: SnapshotStore,
        cancel: CancellationToken,
    ) -> Self {
        Self { sites, interval, max_concurrency: None, prober, store, cancel, cycle: 0 }
    }

    pub fn from_config(
        config: &Config,
        prober: Arc<dyn Prober>,
        store: SnapshotStore,
        cancel: CancellationToken,
    ) -> Self {
        Self::new(config.sites.clone(), config.interval, prober, store, cancel)
            .with_max_concurrency(config.max_concurrency)
    }

    /// Cap the number of probes in flight; `None` means one per site
    pub fn with_max_concurrency(mut self, limit: Option<NonZeroUsize>) -> Self {
        self.max_concurrency = limit;
        self
    }

    /// Run cycles until the cancellation token fires.
    ///
    /// Cancellation is observed before each fan-out and while sleeping; a
    /// cycle that already started is finished and published.
    pub async fn run(mut self) {
        info!(
            sites = self.sites.len(),
            interval_secs = self.interval.as_secs(),
            "Scheduler started"
        );

        loop {
            if self.cancel.is_cancelled() {
                break;
            }

            self.run_cycle().await;

            tokio::select! {
                _ = tokio::time::sleep(self.interval) => {}
                _ = self.cancel.cancelled() => break,
            }
        }

        info!(cycles = self.cycle, "Scheduler stopped");
    }

    /// Probe every site once, publish the snapshot and log it
    pub async fn run_cycle(&mut self) -> Arc<Snapshot> {
        self.cycle += 1;
        let taken_at = Utc::now();
        let start = Instant::now();

        let statuses = self.probe_all().await;
        let snapshot = self.store.publish(Snapshot::new(self.cycle, taken_at, statuses));

        log_cycle(&snapshot, start.elapsed());
        snapshot
    }

    /// Fan out one probe per site and collect them in configuration order
    async fn probe_all(&self) -> Vec<SiteStatus> {
        let limit = match self.max_concurrency {
            Some(limit) => limit.get(),
            None => self.sites.len().max(1),
        };

        // Collected eagerly so `run()` stays `Send`; `buffered` keeps input order
        let checks: Vec<_> = self.sites.iter().map(|site| self.prober.check(site)).collect();
        stream::iter(checks).buffered(limit).collect().await
    }
}

/// Emit the per-cycle record
fn log_cycle(snapshot: &Snapshot, duration: Duration) {
    info!(
        cycle = snapshot.cycle,
        taken_at = %snapshot.taken_at.to_rfc3339(),
        up = snapshot.up_count(),
        down = snapshot.down_count(),
        duration_ms = duration.as_millis() as u64,
        "Check cycle completed"
    );

    for status in &snapshot.sites {
        let elapsed_ms = status.elapsed.as_millis() as u64;
        if status.up {
            info!(
                site = %status.id,
                code = status.code,
                matched = status.matched,
                elapsed_ms,
                "Site up"
            );
        } else {
            warn!(
                site = %status.id,
                error = status.error.map(tracing::field::display),
                elapsed_ms,
                reason = status.error_message.as_deref(),
                "Site down"
            );
        }
    }
}
