//! Background batch jobs.
//!
//! A scheduled batch runs on its own tokio task. Status changes travel as
//! [`JobUpdate`] messages over an MPSC channel to [`start_job_updater`], the
//! single writer of the shared status map; request handlers only read it.

use std::{
    collections::{HashMap, VecDeque},
    sync::Arc,
};

use tokio::sync::{mpsc, RwLock};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::{
        batch::{BatchRequest, JobStatus},
        payslip::PayWindow,
    },
    services::batch_service::{BatchService, CancelHandle, CancelSignal},
};

/// Finished jobs kept for polling; older ones are evicted first.
const MAX_FINISHED_JOBS: usize = 100;

/// A status change for one job.
#[derive(Debug)]
pub struct JobUpdate {
    pub(crate) job_id: String,
    pub(crate) status: JobStatus,
}

/// Shared view of every batch job started by this process.
#[derive(Clone)]
pub struct JobsState {
    pub jobs: Arc<RwLock<HashMap<String, JobStatus>>>,
    cancels: Arc<RwLock<HashMap<String, CancelHandle>>>,
    tx: mpsc::UnboundedSender<JobUpdate>,
}

impl JobsState {
    /// The receiver must be handed to [`start_job_updater`].
    pub fn new() -> (Self, mpsc::UnboundedReceiver<JobUpdate>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let state = Self {
            jobs: Arc::new(RwLock::new(HashMap::new())),
            cancels: Arc::new(RwLock::new(HashMap::new())),
            tx,
        };
        (state, rx)
    }

    pub async fn status(&self, job_id: &str) -> Result<JobStatus, AppError> {
        self.jobs
            .read()
            .await
            .get(job_id)
            .cloned()
            .ok_or_else(|| AppError::not_found("Job", job_id))
    }

    /// Raises the job's cancellation signal. A finished job ignores it.
    pub async fn cancel(&self, job_id: &str) -> Result<(), AppError> {
        if let Some(handle) = self.cancels.read().await.get(job_id) {
            handle.cancel();
            tracing::info!(job_id, "batch cancellation requested");
            return Ok(());
        }
        // Known but already finished
        self.status(job_id).await.map(|_| ())
    }

    /// Validates the window, then runs the batch in the background.
    pub async fn schedule_batch(
        &self,
        service: BatchService,
        request: BatchRequest,
    ) -> Result<String, AppError> {
        PayWindow::new(request.week_start, request.week_end)?;

        let job_id = Uuid::new_v4().to_string();
        let (handle, signal) = CancelSignal::pair();

        self.jobs
            .write()
            .await
            .insert(job_id.clone(), JobStatus::Pending);
        self.cancels.write().await.insert(job_id.clone(), handle);

        let tx = self.tx.clone();
        let id = job_id.clone();
        tokio::spawn(async move {
            let progress_tx = tx.clone();
            let progress_id = id.clone();
            let outcome = service
                .generate_all(&request, &signal, move |current, total| {
                    let _ = progress_tx.send(JobUpdate {
                        job_id: progress_id.clone(),
                        status: JobStatus::InProgress { current, total },
                    });
                })
                .await;

            let status = match outcome {
                Ok(result) => JobStatus::Completed {
                    summary: result.summary(),
                    result,
                },
                Err(e) => {
                    tracing::error!(job_id = %id, error = %e, "batch job failed");
                    JobStatus::Failed {
                        message: e.to_string(),
                    }
                }
            };
            let _ = tx.send(JobUpdate { job_id: id, status });
        });

        tracing::info!(job_id = %job_id, "batch job scheduled");
        Ok(job_id)
    }
}

/// Applies updates in arrival order until every sender is gone.
pub async fn start_job_updater(state: JobsState, rx: mpsc::UnboundedReceiver<JobUpdate>) {
    run_job_updater(state, rx, MAX_FINISHED_JOBS).await
}

async fn run_job_updater(
    state: JobsState,
    mut rx: mpsc::UnboundedReceiver<JobUpdate>,
    keep_finished: usize,
) {
    let mut finished_order = VecDeque::new();

    while let Some(update) = rx.recv().await {
        let finished = matches!(
            update.status,
            JobStatus::Completed { .. } | JobStatus::Failed { .. }
        );
        if finished {
            state.cancels.write().await.remove(&update.job_id);
            finished_order.push_back(update.job_id.clone());
        }

        let mut jobs = state.jobs.write().await;
        jobs.insert(update.job_id, update.status);
        while finished_order.len() > keep_finished {
            if let Some(oldest) = finished_order.pop_front() {
                jobs.remove(&oldest);
                tracing::debug!(job_id = %oldest, "finished job evicted");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        db::{CollectionKey, MemoryRepository, RecordStore},
        models::batch::BatchMode,
        services::{
            batch_service::tests::MemorySink,
            document_service::tests::FakeRenderer,
            payslip_service::tests::{day, hourly_worker},
        },
    };
    use std::time::Duration;

    async fn wait_for_finish(jobs: &JobsState, job_id: &str) -> JobStatus {
        for _ in 0..200 {
            let status = jobs.status(job_id).await.unwrap();
            if matches!(status, JobStatus::Completed { .. } | JobStatus::Failed { .. }) {
                return status;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("job {} did not finish", job_id);
    }

    async fn service(sink: Arc<MemorySink>) -> BatchService {
        let store = RecordStore::new(Arc::new(MemoryRepository::new()));
        store
            .save_records(
                CollectionKey::Workers,
                &[hourly_worker("w1", "Jane Doe"), hourly_worker("w2", "Bo")],
            )
            .await
            .unwrap();
        BatchService::new(store, Arc::new(FakeRenderer::default()), sink)
    }

    #[tokio::test]
    async fn scheduled_batch_completes() {
        let (jobs, rx) = JobsState::new();
        tokio::spawn(start_job_updater(jobs.clone(), rx));
        let sink = Arc::new(MemorySink::default());

        let job_id = jobs
            .schedule_batch(
                service(sink.clone()).await,
                BatchRequest {
                    week_start: day(1),
                    week_end: day(7),
                    include_advances: true,
                    mode: BatchMode::Individual,
                },
            )
            .await
            .unwrap();

        match wait_for_finish(&jobs, &job_id).await {
            JobStatus::Completed { result, summary } => {
                assert_eq!(result.succeeded, 2);
                assert_eq!(summary, "2 of 2 payslips generated");
            }
            other => panic!("unexpected status {:?}", other),
        }
        assert_eq!(sink.names().len(), 2);

        // Cancelling a finished job is a no-op
        jobs.cancel(&job_id).await.unwrap();
        assert!(matches!(
            jobs.status(&job_id).await.unwrap(),
            JobStatus::Completed { .. }
        ));
    }

    #[tokio::test]
    async fn reversed_window_is_not_scheduled() {
        let (jobs, _rx) = JobsState::new();
        let err = jobs
            .schedule_batch(
                service(Arc::new(MemorySink::default())).await,
                BatchRequest {
                    week_start: day(7),
                    week_end: day(1),
                    include_advances: false,
                    mode: BatchMode::Zip,
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::InvalidDateRange { .. }));
        assert!(jobs.jobs.read().await.is_empty());
    }

    #[tokio::test]
    async fn unknown_job_is_not_found() {
        let (jobs, _rx) = JobsState::new();
        assert!(matches!(
            jobs.status("nope").await,
            Err(AppError::NotFound { entity: "Job", .. })
        ));
        assert!(matches!(
            jobs.cancel("nope").await,
            Err(AppError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn oldest_finished_jobs_are_evicted() {
        let (jobs, rx) = JobsState::new();
        tokio::spawn(run_job_updater(jobs.clone(), rx, 2));

        for id in ["a", "b", "c"] {
            jobs.tx
                .send(JobUpdate {
                    job_id: id.into(),
                    status: JobStatus::Failed { message: "boom".into() },
                })
                .unwrap();
        }
        jobs.tx
            .send(JobUpdate {
                job_id: "running".into(),
                status: JobStatus::InProgress { current: 1, total: 3 },
            })
            .unwrap();

        for _ in 0..200 {
            if jobs.jobs.read().await.contains_key("running") {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }

        let map = jobs.jobs.read().await;
        assert!(!map.contains_key("a"));
        assert!(map.contains_key("b"));
        assert!(map.contains_key("c"));
        assert!(map.contains_key("running"));
    }
}
