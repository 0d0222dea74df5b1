//! Batch-mode task group: bounded concurrency over a pre-enumerated job list.
//!
//! One blocking task per job, with a semaphore capping how many run at once.
//! Every task runs to completion regardless of sibling failures; the first
//! failure observed is kept for the caller to surface.

use serde::Serialize;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::{Id, JoinError, JoinSet};

use crate::error::PipelineError;
use crate::types::{ConversionJob, ConversionResult};

use super::convert::Convert;

/// One failed conversion, as recorded in a [`BatchReport`].
#[derive(Debug, Clone, Serialize)]
pub struct JobFailure {
    pub source_path: PathBuf,
    pub error: String,
}

/// Outcome of a batch run.
#[derive(Debug, Default, Serialize)]
pub struct BatchReport {
    /// Jobs submitted
    pub total: usize,
    /// Jobs that produced an output file
    pub succeeded: usize,
    /// Jobs that failed
    pub failed: usize,
    /// Every failure, in the order observed
    pub failures: Vec<JobFailure>,
    /// The first failure observed
    #[serde(skip)]
    pub first_error: Option<PipelineError>,
}

impl BatchReport {
    /// True when every job succeeded.
    pub fn is_success(&self) -> bool {
        self.failed == 0
    }

    fn record(&mut self, source_path: PathBuf, result: ConversionResult) {
        match result {
            Ok(_) => self.succeeded += 1,
            Err(e) => {
                self.failed += 1;
                self.failures.push(JobFailure {
                    source_path,
                    error: e.to_string(),
                });
                self.first_error.get_or_insert(e);
            }
        }
    }
}

/// Runs conversions with a fixed concurrency ceiling.
#[derive(Debug, Clone)]
pub struct TaskGroup {
    concurrency: usize,
}

impl TaskGroup {
    /// Create a task group. A ceiling of 0 is treated as 1.
    pub fn new(concurrency: usize) -> Self {
        Self {
            concurrency: concurrency.max(1),
        }
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Convert every job, calling `on_complete` once per finished job.
    ///
    /// `on_complete` runs on the calling task as results are collected, so it
    /// also fires for a job whose conversion task panicked.
    pub async fn run<F>(
        &self,
        jobs: Vec<ConversionJob>,
        converter: Arc<dyn Convert>,
        on_complete: F,
    ) -> BatchReport
    where
        F: Fn(&ConversionJob, &ConversionResult),
    {
        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let mut report = BatchReport {
            total: jobs.len(),
            ..Default::default()
        };
        let mut tasks = JoinSet::new();
        let mut pending: HashMap<Id, ConversionJob> = HashMap::new();

        for job in jobs {
            let Ok(permit) = semaphore.clone().acquire_owned().await else {
                tracing::warn!("Batch semaphore closed unexpectedly, stopping batch");
                break;
            };

            let converter = converter.clone();
            let task_job = job.clone();

            let handle = tasks.spawn_blocking(move || {
                let result = converter.convert(&task_job);
                drop(permit);
                match &result {
                    Ok(output) => tracing::debug!(
                        source = %task_job.source_path.display(),
                        output = %output.display(),
                        "converted"
                    ),
                    Err(e) => tracing::error!(
                        source = %task_job.source_path.display(),
                        error = %e,
                        "cannot convert"
                    ),
                }
                result
            });
            pending.insert(handle.id(), job);

            // Collect whatever already finished so failures are recorded in
            // roughly the order they happened.
            while let Some(joined) = tasks.try_join_next_with_id() {
                Self::collect(&mut report, &mut pending, joined, &on_complete);
            }
        }

        while let Some(joined) = tasks.join_next_with_id().await {
            Self::collect(&mut report, &mut pending, joined, &on_complete);
        }

        report
    }

    fn collect<F>(
        report: &mut BatchReport,
        pending: &mut HashMap<Id, ConversionJob>,
        joined: Result<(Id, ConversionResult), JoinError>,
        on_complete: &F,
    ) where
        F: Fn(&ConversionJob, &ConversionResult),
    {
        let (id, result) = match joined {
            Ok((id, result)) => (id, result),
            Err(e) => {
                let path = pending
                    .get(&e.id())
                    .map(|job| job.source_path.clone())
                    .unwrap_or_default();
                tracing::error!(source = %path.display(), "Conversion task panicked: {e}");
                let error = PipelineError::Task {
                    path,
                    message: e.to_string(),
                };
                (e.id(), Err(error))
            }
        };

        match pending.remove(&id) {
            Some(job) => {
                on_complete(&job, &result);
                report.record(job.source_path, result);
            }
            None => report.record(PathBuf::new(), result),
        }
    }
}

impl Default for TaskGroup {
    fn default() -> Self {
        Self::new(4)
    }
}
