//! Latest-snapshot cell shared between the scheduler and its readers.
//!
//! The scheduler owns the [`SnapshotStore`] and is the only writer; everyone
//! else gets a [`SnapshotReader`]. Publication is a single atomic pointer
//! swap, so a reader sees either the previous snapshot or the new one and
//! never waits on the writer.

use arc_swap::ArcSwapOption;
use std::sync::Arc;

use super::types::Snapshot;

/// Write side of the snapshot cell
#[derive(Debug)]
pub struct SnapshotStore {
    current: Arc<ArcSwapOption<Snapshot>>,
}

impl SnapshotStore {
    /// Empty store; reads report no data until the first publish
    pub fn new() -> Self {
        Self { current: Arc::new(ArcSwapOption::empty()) }
    }

    /// Replace the held snapshot wholesale
    pub fn publish(&mut self, snapshot: Snapshot) -> Arc<Snapshot> {
        let snapshot = Arc::new(snapshot);
        self.current.store(Some(Arc::clone(&snapshot)));
        snapshot
    }

    /// Read-only handle for the presentation layer
    pub fn reader(&self) -> SnapshotReader {
        SnapshotReader { current: Arc::clone(&self.current) }
    }

    pub fn read(&self) -> Option<Snapshot> {
        self.reader().read()
    }
}

impl Default for SnapshotStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Read side of the snapshot cell; cheap to clone
#[derive(Debug, Clone)]
pub struct SnapshotReader {
    current: Arc<ArcSwapOption<Snapshot>>,
}

impl SnapshotReader {
    /// Independent copy of the latest snapshot, `None` before the first cycle
    pub fn read(&self) -> Option<Snapshot> {
        self.latest().map(|snapshot| Snapshot::clone(&snapshot))
    }

    /// Shared handle to the latest snapshot without copying it
    pub fn latest(&self) -> Option<Arc<Snapshot>> {
        self.current.load_full()
    }

    pub fn is_available(&self) -> bool {
        self.current.load().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::monitoring::types::{ContentPattern, Site, SiteStatus};
    use chrono::Utc;
    use std::thread;
    use std::time::Duration;
    use url::Url;

    /// Snapshot whose every entry carries `cycle` as its status code
    fn snapshot(cycle: u64, sites: usize) -> Snapshot {
        let statuses = (0..sites)
            .map(|i| {
                let site = Site::new(
                    format!("site-{i}"),
                    Url::parse("https://example.com/").unwrap(),
                    ContentPattern::new("OK", false).unwrap(),
                );
                SiteStatus::reachable(&site, cycle as u16, Duration::from_millis(i as u64), true)
            })
            .collect();
        Snapshot::new(cycle, Utc::now(), statuses)
    }

    #[test]
    fn test_unavailable_before_first_publish() {
        let store = SnapshotStore::new();
        let reader = store.reader();

        assert!(store.read().is_none());
        assert!(reader.read().is_none());
        assert!(reader.latest().is_none());
        assert!(!reader.is_available());
    }

    #[test]
    fn test_read_returns_published_snapshot() {
        let mut store = SnapshotStore::new();
        let reader = store.reader();
        let published = snapshot(1, 3);

        store.publish(published.clone());

        assert!(reader.is_available());
        assert_eq!(reader.read(), Some(published));
    }

    #[test]
    fn test_mutating_a_read_copy_does_not_touch_the_store() {
        let mut store = SnapshotStore::new();
        let reader = store.reader();
        store.publish(snapshot(1, 2));

        let mut copy = reader.read().unwrap();
        copy.sites[0].up = false;
        copy.sites[0].code = None;
        copy.sites.pop();

        let fresh = reader.read().unwrap();
        assert_eq!(fresh.sites.len(), 2);
        assert!(fresh.sites[0].up);
        assert_eq!(fresh.sites[0].code, Some(1));
    }

    #[test]
    fn test_publish_supersedes_previous_snapshot() {
        let mut store = SnapshotStore::new();
        let reader = store.reader();

        store.publish(snapshot(1, 2));
        let held = reader.latest().unwrap();
        store.publish(snapshot(2, 4));

        // Earlier handles keep the snapshot they were given
        assert_eq!(held.cycle, 1);
        assert_eq!(held.sites.len(), 2);

        let current = reader.read().unwrap();
        assert_eq!(current.cycle, 2);
        assert_eq!(current.sites.len(), 4);
    }

    #[test]
    fn test_concurrent_reads_never_see_torn_snapshots() {
        let mut store = SnapshotStore::new();
        store.publish(snapshot(1, 8));

        let readers: Vec<_> = (0..4)
            .map(|_| {
                let reader = store.reader();
                thread::spawn(move || {
                    let mut last_cycle = 0;
                    for _ in 0..2_000 {
                        let seen = reader.read().expect("published before readers start");
                        assert_eq!(seen.sites.len(), 8);
                        assert!(seen.sites.iter().all(|s| s.code == Some(seen.cycle as u16)));
                        assert!(seen.cycle >= last_cycle, "snapshots went backwards");
                        last_cycle = seen.cycle;
                    }
                })
            })
            .collect();

        for cycle in 2..=200 {
            store.publish(snapshot(cycle, 8));
        }

        for handle in readers {
            handle.join().unwrap();
        }
        assert_eq!(store.read().unwrap().cycle, 200);
    }
}
