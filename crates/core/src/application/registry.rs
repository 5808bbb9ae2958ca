// Job Registry - live table of download jobs

use crate::domain::error::Result as DomainResult;
use crate::domain::{Job, JobId};
use crate::port::{IdProvider, TimeProvider};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::debug;

/// Owns every live job record
///
/// The registry is the only place job state is mutated. All methods take
/// `&self` and synchronize internally, so it can be shared through an `Arc`
/// by any number of tasks. Locks are never held across an `.await`.
pub struct JobRegistry {
    jobs: RwLock<HashMap<JobId, Job>>,
    id_provider: Arc<dyn IdProvider>,
    time_provider: Arc<dyn TimeProvider>,
}

impl JobRegistry {
    pub fn new(id_provider: Arc<dyn IdProvider>, time_provider: Arc<dyn TimeProvider>) -> Self {
        Self {
            jobs: RwLock::new(HashMap::new()),
            id_provider,
            time_provider,
        }
    }

    /// Insert a new `Starting` job and return its id
    pub fn create(&self, url: impl Into<String>) -> JobId {
        let job = Job::new(
            self.id_provider.generate_id(),
            self.time_provider.now_millis(),
            url,
        );
        let id = job.id.clone();

        debug!(job_id = %id, url = %job.url, "Job registered");
        self.write().insert(id.clone(), job);
        id
    }

    /// Current snapshot of a live job
    pub fn get(&self, id: &str) -> Option<Job> {
        self.read().get(id).cloned()
    }

    /// Apply a mutation to a live job
    ///
    /// The mutation runs against a copy that is only written back if it
    /// succeeds, so a rejected transition leaves the job untouched.
    ///
    /// # Returns
    /// - `Ok(Some(job))` with the updated snapshot
    /// - `Ok(None)` if the job was already evicted (not an error)
    /// - `Err(_)` if the mutation was rejected by the domain model
    pub fn update<F>(&self, id: &str, mutation: F) -> DomainResult<Option<Job>>
    where
        F: FnOnce(&mut Job) -> DomainResult<()>,
    {
        let mut jobs = self.write();
        let Some(current) = jobs.get_mut(id) else {
            debug!(job_id = %id, "Update skipped, job no longer live");
            return Ok(None);
        };

        let mut next = current.clone();
        mutation(&mut next)?;
        *current = next.clone();
        Ok(Some(next))
    }

    /// Delete a live job (idempotent)
    pub fn remove(&self, id: &str) -> Option<Job> {
        self.write().remove(id)
    }

    /// Snapshot of all live jobs, oldest submission first
    ///
    /// The order is a display convenience only.
    pub fn list_active(&self) -> Vec<Job> {
        let mut jobs: Vec<Job> = self.read().values().cloned().collect();
        jobs.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        jobs
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    // A panic while holding the lock cannot leave a half-written job behind
    // (updates are applied to a copy), so poisoning is safe to ignore.
    fn read(&self) -> std::sync::RwLockReadGuard<'_, HashMap<JobId, Job>> {
        self.jobs.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, HashMap<JobId, Job>> {
        self.jobs.write().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DomainError, JobStatus};
    use crate::port::id_provider::SequentialIdProvider;
    use crate::port::time_provider::mocks::FixedTimeProvider;
    use std::collections::HashSet;

    fn registry() -> JobRegistry {
        JobRegistry::new(
            Arc::new(SequentialIdProvider::new()),
            Arc::new(FixedTimeProvider::new(1_000)),
        )
    }

    #[test]
    fn test_create_inserts_starting_job() {
        let registry = registry();

        let id = registry.create("https://x/1");
        let job = registry.get(&id).unwrap();

        assert_eq!(job.id, id);
        assert_eq!(job.url, "https://x/1");
        assert_eq!(job.status, JobStatus::Starting);
        assert_eq!(job.progress, 0);
        assert_eq!(job.created_at, 1_000);
        assert!(job.error.is_none());
    }

    #[test]
    fn test_get_unknown_returns_none() {
        assert!(registry().get("missing").is_none());
    }

    #[test]
    fn test_update_applies_mutation() {
        let registry = registry();
        let id = registry.create("https://x/1");

        let updated = registry.update(&id, |job| job.start_download()).unwrap();

        assert_eq!(updated.unwrap().status, JobStatus::Downloading);
        assert_eq!(registry.get(&id).unwrap().status, JobStatus::Downloading);
    }

    #[test]
    fn test_update_missing_job_is_silent() {
        let registry = registry();

        let result = registry.update("gone", |job| job.start_download());

        assert_eq!(result, Ok(None));
    }

    #[test]
    fn test_rejected_update_leaves_job_unchanged() {
        let registry = registry();
        let id = registry.create("https://x/1");

        let result = registry.update(&id, |job| {
            job.progress = 50; // partial write that must not leak
            job.complete(2_000)
        });

        assert!(matches!(
            result,
            Err(DomainError::InvalidStateTransition { .. })
        ));
        let job = registry.get(&id).unwrap();
        assert_eq!(job.status, JobStatus::Starting);
        assert_eq!(job.progress, 0);
    }

    #[test]
    fn test_remove_is_idempotent() {
        let registry = registry();
        let id = registry.create("https://x/1");

        assert!(registry.remove(&id).is_some());
        assert!(registry.remove(&id).is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_list_active_returns_all_live_jobs() {
        let registry = registry();
        let a = registry.create("https://x/1");
        let b = registry.create("https://x/2");
        registry.remove(&a);
        let c = registry.create("https://x/3");

        let ids: Vec<JobId> = registry.list_active().into_iter().map(|j| j.id).collect();

        assert_eq!(ids.len(), 2);
        assert!(ids.contains(&b));
        assert!(ids.contains(&c));
    }

    #[tokio::test]
    async fn test_concurrent_create_yields_unique_ids() {
        let registry = Arc::new(JobRegistry::new(
            Arc::new(crate::port::id_provider::UuidProvider),
            Arc::new(crate::port::time_provider::SystemTimeProvider),
        ));

        let mut handles = Vec::new();
        for task in 0..8 {
            let registry = Arc::clone(&registry);
            handles.push(tokio::spawn(async move {
                (0..50)
                    .map(|i| registry.create(format!("https://x/{}/{}", task, i)))
                    .collect::<Vec<_>>()
            }));
        }

        let mut ids = HashSet::new();
        for handle in handles {
            ids.extend(handle.await.unwrap());
        }

        assert_eq!(ids.len(), 400);
        assert_eq!(registry.len(), 400);
    }
}
