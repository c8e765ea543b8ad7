//! In-memory registry for deferred summarization jobs.
//!
//! Job state lives for the process lifetime only: nothing is persisted across
//! restarts and entries are never evicted. The tracker is constructed once
//! near process start and injected into the router state; tests build a fresh
//! tracker per case.

use crate::pipeline::PipelineError;
use futures_util::FutureExt;
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use uuid::Uuid;

/// Identifier handed back to clients when a job is accepted.
pub type JobId = Uuid;

/// Lifecycle state of a tracked summarization job.
///
/// Terminal states carry their payload in the same enum value, so a status
/// swap under the registry lock is atomic: a reader can never observe
/// `Processing` with a result attached, or a result without a terminal state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobStatus {
    /// Accepted, not yet started.
    Queued,
    /// Worker picked the job up.
    Processing,
    /// Finished with a stitched summary.
    Completed(String),
    /// Finished with an error message.
    Failed(String),
}

impl JobStatus {
    /// Whether the job reached a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed(_) | Self::Failed(_))
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Queued => write!(f, "Queued"),
            Self::Processing => write!(f, "Processing"),
            Self::Completed(summary) => write!(f, "Completed: {summary}"),
            Self::Failed(message) => write!(f, "Failed: {message}"),
        }
    }
}

/// Concurrency-safe registry backing the deferred handlers.
#[derive(Default)]
pub struct JobTracker {
    jobs: RwLock<HashMap<JobId, JobStatus>>,
}

impl JobTracker {
    /// Create an empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `work` under a fresh id and schedule it on the runtime.
    ///
    /// The returned id is visible to [`JobTracker::status`] in the `Queued`
    /// state before this call returns. The spawned task performs exactly one
    /// terminal transition; a panicking future is recorded as `Failed` rather
    /// than left unobserved.
    pub fn submit<F>(self: &Arc<Self>, work: F) -> JobId
    where
        F: Future<Output = Result<String, PipelineError>> + Send + 'static,
    {
        let id = Uuid::new_v4();
        self.write().insert(id, JobStatus::Queued);
        tracing::info!(job_id = %id, "Job accepted");

        let tracker = Arc::clone(self);
        tokio::spawn(async move {
            tracker.transition(id, JobStatus::Processing);
            let status = match AssertUnwindSafe(work).catch_unwind().await {
                Ok(Ok(summary)) => JobStatus::Completed(summary),
                Ok(Err(error)) => {
                    tracing::error!(job_id = %id, error = %error, "Job failed");
                    JobStatus::Failed(error.to_string())
                }
                Err(_) => {
                    tracing::error!(job_id = %id, "Job panicked");
                    JobStatus::Failed("summarization task panicked".to_string())
                }
            };
            tracker.transition(id, status);
        });

        id
    }

    /// Snapshot of the job's current status, or `None` for unknown ids.
    /// Never blocks waiting for completion.
    pub fn status(&self, id: &JobId) -> Option<JobStatus> {
        self.read().get(id).cloned()
    }

    fn transition(&self, id: JobId, next: JobStatus) {
        let mut jobs = self.write();
        match jobs.get(&id) {
            Some(current) if current.is_terminal() => {
                tracing::warn!(job_id = %id, current = %current, "Ignoring transition on terminal job");
            }
            Some(_) => {
                jobs.insert(id, next);
            }
            None => {
                tracing::warn!(job_id = %id, "Transition requested for unknown job");
            }
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<JobId, JobStatus>> {
        self.jobs.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<JobId, JobStatus>> {
        self.jobs.write().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    async fn wait_for_terminal(tracker: &Arc<JobTracker>, id: JobId) -> JobStatus {
        for _ in 0..200 {
            if let Some(status) = tracker.status(&id) {
                if status.is_terminal() {
                    return status;
                }
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("job never reached a terminal state");
    }

    #[tokio::test]
    async fn submitted_job_is_immediately_visible() {
        let tracker = Arc::new(JobTracker::new());
        let id = tracker.submit(async { Ok("done".to_string()) });

        let status = tracker.status(&id).expect("job registered");
        assert!(matches!(
            status,
            JobStatus::Queued | JobStatus::Processing | JobStatus::Completed(_)
        ));
    }

    #[tokio::test]
    async fn successful_job_completes_with_summary() {
        let tracker = Arc::new(JobTracker::new());
        let id = tracker.submit(async { Ok("stitched summary".to_string()) });

        let status = wait_for_terminal(&tracker, id).await;
        assert_eq!(status, JobStatus::Completed("stitched summary".to_string()));
        assert_eq!(status.to_string(), "Completed: stitched summary");
    }

    #[tokio::test]
    async fn failing_job_records_error_message() {
        let tracker = Arc::new(JobTracker::new());
        let id = tracker.submit(async { Err(PipelineError::MissingReference) });

        let status = wait_for_terminal(&tracker, id).await;
        assert_eq!(
            status,
            JobStatus::Failed("missing document reference".to_string())
        );
    }

    #[tokio::test]
    async fn panicking_job_is_recorded_as_failed() {
        let tracker = Arc::new(JobTracker::new());
        let id = tracker.submit(async { panic!("boom") });

        let status = wait_for_terminal(&tracker, id).await;
        assert!(matches!(status, JobStatus::Failed(message) if message.contains("panicked")));
    }

    #[tokio::test]
    async fn unknown_id_returns_none() {
        let tracker = JobTracker::new();
        assert!(tracker.status(&Uuid::new_v4()).is_none());
    }

    #[tokio::test]
    async fn terminal_state_is_never_overwritten() {
        let tracker = Arc::new(JobTracker::new());
        let id = tracker.submit(async { Ok("first".to_string()) });
        let status = wait_for_terminal(&tracker, id).await;
        assert_eq!(status, JobStatus::Completed("first".to_string()));

        tracker.transition(id, JobStatus::Failed("late".to_string()));
        tracker.transition(id, JobStatus::Processing);

        assert_eq!(
            tracker.status(&id),
            Some(JobStatus::Completed("first".to_string()))
        );
    }

    #[tokio::test]
    async fn concurrent_jobs_do_not_interfere() {
        let tracker = Arc::new(JobTracker::new());
        let ids: Vec<JobId> = (0..8)
            .map(|n| tracker.submit(async move { Ok(format!("summary {n}")) }))
            .collect();

        for (n, id) in ids.iter().enumerate() {
            let status = wait_for_terminal(&tracker, *id).await;
            assert_eq!(status, JobStatus::Completed(format!("summary {n}")));
        }
    }
}
