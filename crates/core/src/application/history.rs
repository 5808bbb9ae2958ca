// History Retention - bounded log of finished jobs

use crate::domain::Job;
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::{debug, warn};

/// Default number of finished jobs kept
pub const DEFAULT_HISTORY_CAPACITY: usize = 100;

/// Insertion-ordered log of terminal job snapshots
///
/// Once `capacity` is exceeded the oldest entries are dropped first.
pub struct HistoryRetention {
    entries: Mutex<VecDeque<Job>>,
    capacity: usize,
}

impl HistoryRetention {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: Mutex::new(VecDeque::with_capacity(capacity.min(1024))),
            capacity,
        }
    }

    /// Append a snapshot and evict from the front down to capacity
    pub fn append(&self, snapshot: Job) {
        if !snapshot.is_terminal() {
            warn!(
                job_id = %snapshot.id,
                status = %snapshot.status,
                "Non-terminal job appended to history"
            );
        }

        let mut entries = self.lock();
        entries.push_back(snapshot);
        while entries.len() > self.capacity {
            if let Some(evicted) = entries.pop_front() {
                debug!(job_id = %evicted.id, "Evicted from history");
            }
        }
    }

    /// Most recent snapshot with the given id
    pub fn find(&self, id: &str) -> Option<Job> {
        self.lock().iter().rev().find(|job| job.id == id).cloned()
    }

    /// Full log, oldest first
    pub fn all(&self) -> Vec<Job> {
        self.lock().iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<Job>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for HistoryRetention {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn finished(id: &str) -> Job {
        let mut job = Job::new(id, 1_000, format!("https://x/{}", id));
        job.start_download().unwrap();
        job.complete(2_000).unwrap();
        job
    }

    #[test]
    fn test_append_keeps_insertion_order() {
        let history = HistoryRetention::new(10);
        history.append(finished("a"));
        history.append(finished("b"));
        history.append(finished("c"));

        let ids: Vec<String> = history.all().into_iter().map(|j| j.id).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_capacity_evicts_oldest_first() {
        let history = HistoryRetention::default();

        for i in 0..=DEFAULT_HISTORY_CAPACITY {
            history.append(finished(&format!("job-{}", i)));
        }

        let all = history.all();
        assert_eq!(all.len(), DEFAULT_HISTORY_CAPACITY);
        assert_eq!(all[0].id, "job-1");
        assert_eq!(all[DEFAULT_HISTORY_CAPACITY - 1].id, "job-100");
        assert!(history.find("job-0").is_none());
    }

    #[test]
    fn test_find_prefers_newest_duplicate() {
        let history = HistoryRetention::new(10);
        history.append(finished("dup"));

        let mut newer = Job::new("dup", 5_000, "https://x/other");
        newer.start_download().unwrap();
        newer.fail("boom", 6_000).unwrap();
        history.append(newer);

        let found = history.find("dup").unwrap();
        assert_eq!(found.url, "https://x/other");
        assert_eq!(found.error.as_deref(), Some("boom"));
    }

    #[test]
    fn test_len_never_exceeds_capacity() {
        let history = HistoryRetention::new(2);
        assert_eq!(history.capacity(), 2);

        for id in ["a", "b", "c"] {
            history.append(finished(id));
        }

        assert_eq!(history.len(), history.capacity());
    }

    #[test]
    fn test_find_unknown_returns_none() {
        let history = HistoryRetention::new(10);
        history.append(finished("a"));

        assert!(history.find("b").is_none());
    }

    #[test]
    fn test_zero_capacity_keeps_nothing() {
        let history = HistoryRetention::new(0);
        history.append(finished("a"));

        assert!(history.is_empty());
    }
}
