//! In-memory job registry
//!
//! Jobs are keyed by id and live for the process lifetime. All transitions
//! go through [`Job::transition_to`], so a terminal job can never change.

use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::models::{Job, JobResult, JobStatus, TaskKind};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum JobError {
    #[error("Job not found: {0}")]
    NotFound(Uuid),

    #[error("Job already exists: {0}")]
    AlreadyExists(Uuid),

    #[error("Invalid job transition for {job_id}: {from:?} -> {to:?}")]
    InvalidTransition {
        job_id: Uuid,
        from: JobStatus,
        to: JobStatus,
    },
}

/// Shared job registry; clones share storage
#[derive(Debug, Clone, Default)]
pub struct JobTracker {
    jobs: Arc<RwLock<HashMap<Uuid, Job>>>,
}

impl JobTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new `queued` job
    pub async fn create(&self, job_id: Uuid, kind: TaskKind) -> Result<Job, JobError> {
        let mut jobs = self.jobs.write().await;
        if jobs.contains_key(&job_id) {
            return Err(JobError::AlreadyExists(job_id));
        }
        let job = Job::new(job_id, kind);
        jobs.insert(job_id, job.clone());
        debug!(job_id = %job_id, kind = ?kind, "Job queued");
        Ok(job)
    }

    /// `queued → running`
    pub async fn start(&self, job_id: Uuid) -> Result<Job, JobError> {
        self.update(job_id, JobStatus::Running, |_| {}).await
    }

    /// Move to `succeeded`, attaching the result and optional audio
    pub async fn complete(
        &self,
        job_id: Uuid,
        result: JobResult,
        audio_url: Option<String>,
        duration: Option<f64>,
    ) -> Result<Job, JobError> {
        let job = self
            .update(job_id, JobStatus::Succeeded, move |job| {
                job.result = Some(result);
                job.audio_url = audio_url;
                job.duration = duration;
            })
            .await?;
        info!(job_id = %job_id, kind = ?job.kind, "Job succeeded");
        Ok(job)
    }

    /// Move to `failed` with an error description
    pub async fn fail(&self, job_id: Uuid, error: impl Into<String>) -> Result<Job, JobError> {
        let error = error.into();
        warn!(job_id = %job_id, error = %error, "Job failed");
        self.update(job_id, JobStatus::Failed, move |job| job.error = Some(error))
            .await
    }

    /// Snapshot of a job
    pub async fn get(&self, job_id: Uuid) -> Result<Job, JobError> {
        self.jobs
            .read()
            .await
            .get(&job_id)
            .cloned()
            .ok_or(JobError::NotFound(job_id))
    }

    pub async fn len(&self) -> usize {
        self.jobs.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.jobs.read().await.is_empty()
    }

    async fn update<F>(&self, job_id: Uuid, next: JobStatus, apply: F) -> Result<Job, JobError>
    where
        F: FnOnce(&mut Job),
    {
        let mut jobs = self.jobs.write().await;
        let job = jobs.get_mut(&job_id).ok_or(JobError::NotFound(job_id))?;

        let from = job.status;
        if job.transition_to(next).is_none() {
            return Err(JobError::InvalidTransition {
                job_id,
                from,
                to: next,
            });
        }
        apply(job);
        Ok(job.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NarrationResult;

    fn narration(summary: &str) -> JobResult {
        JobResult::Narration(NarrationResult {
            summary: summary.to_string(),
            ..Default::default()
        })
    }

    #[tokio::test]
    async fn test_full_lifecycle() {
        let tracker = JobTracker::new();
        let id = Uuid::new_v4();

        tracker.create(id, TaskKind::Narration).await.unwrap();
        assert_eq!(tracker.get(id).await.unwrap().status, JobStatus::Queued);

        tracker.start(id).await.unwrap();
        let job = tracker
            .complete(id, narration("done"), Some("/api/v1/audio/x.mp3".into()), Some(1.5))
            .await
            .unwrap();

        assert_eq!(job.status, JobStatus::Succeeded);
        assert_eq!(job.result.unwrap().summary(), "done");
        assert_eq!(job.duration, Some(1.5));
        assert_eq!(tracker.get(id).await.unwrap().audio_url.as_deref(), Some("/api/v1/audio/x.mp3"));
    }

    #[tokio::test]
    async fn test_unknown_job() {
        let tracker = JobTracker::new();
        let id = Uuid::new_v4();
        assert_eq!(tracker.get(id).await, Err(JobError::NotFound(id)));
        assert_eq!(tracker.start(id).await, Err(JobError::NotFound(id)));
    }

    #[tokio::test]
    async fn test_duplicate_create() {
        let tracker = JobTracker::new();
        let id = Uuid::new_v4();
        tracker.create(id, TaskKind::Vision).await.unwrap();
        assert_eq!(
            tracker.create(id, TaskKind::Vision).await,
            Err(JobError::AlreadyExists(id))
        );
    }

    #[tokio::test]
    async fn test_terminal_job_is_frozen() {
        let tracker = JobTracker::new();
        let id = Uuid::new_v4();
        tracker.create(id, TaskKind::Narration).await.unwrap();
        tracker.fail(id, "upstream down").await.unwrap();

        let err = tracker
            .complete(id, narration("late"), None, None)
            .await
            .unwrap_err();
        assert!(matches!(err, JobError::InvalidTransition { from: JobStatus::Failed, .. }));

        let job = tracker.get(id).await.unwrap();
        assert_eq!(job.status, JobStatus::Failed);
        assert!(job.result.is_none());
        assert_eq!(job.error.as_deref(), Some("upstream down"));
    }

    #[tokio::test]
    async fn test_clones_share_storage() {
        let tracker = JobTracker::new();
        let other = tracker.clone();
        let id = Uuid::new_v4();
        tracker.create(id, TaskKind::Narration).await.unwrap();
        assert!(other.get(id).await.is_ok());
        assert_eq!(other.len().await, 1);
    }
}
