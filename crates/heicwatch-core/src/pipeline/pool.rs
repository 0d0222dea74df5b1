//! Watch-mode worker pool.
//!
//! A fixed number of worker threads compete for events on one shared
//! multi-consumer channel; every event is delivered to exactly one worker.
//! Each worker loops over three sources: the shutdown signal, the event
//! channel, and the watcher's error channel.
//!
//! A worker converts synchronously, so while it is busy it does not dequeue.
//! Pending events wait in the channel, whose capacity is chosen by whoever
//! creates it (see [`crate::watch::WatchSource`]).
//!
//! Shutdown is observed between events only: a conversion that has started
//! always runs to completion. There is no per-conversion timeout, so a hung
//! external decoder keeps its worker (and [`WorkerPool::join`]) waiting.

use crossbeam_channel::{never, select, Receiver, Sender, TryRecvError};
use std::sync::Arc;
use std::thread::JoinHandle;

use crate::error::WatchError;
use crate::types::{WatchEvent, WorkerPoolConfig};

use super::convert::Convert;
use super::filter::EventFilter;

/// Create a linked shutdown trigger and signal.
pub fn shutdown_channel() -> (ShutdownTrigger, ShutdownSignal) {
    let (tx, rx) = crossbeam_channel::bounded(0);
    (ShutdownTrigger { _tx: tx }, ShutdownSignal { rx })
}

/// Fires shutdown when consumed or dropped.
#[derive(Debug)]
pub struct ShutdownTrigger {
    _tx: Sender<()>,
}

impl ShutdownTrigger {
    /// Tell every worker holding the matching signal to stop.
    pub fn fire(self) {
        drop(self);
    }
}

/// Shared, cloneable view of a shutdown trigger.
#[derive(Debug, Clone)]
pub struct ShutdownSignal {
    rx: Receiver<()>,
}

impl ShutdownSignal {
    /// True once the trigger has fired.
    pub fn is_fired(&self) -> bool {
        matches!(self.rx.try_recv(), Err(TryRecvError::Disconnected))
    }
}

/// Why a worker left its loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The shutdown signal fired
    Shutdown,
    /// The event channel was closed by the watch source
    EventsClosed,
}

/// Counters reported by a single worker when it stops.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerReport {
    pub id: usize,
    pub converted: usize,
    pub failed: usize,
    pub ignored: usize,
    pub stop: StopReason,
}

/// Totals across all workers of a pool.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PoolStats {
    /// Files converted successfully
    pub converted: usize,
    /// Conversions that failed
    pub failed: usize,
    /// Events rejected by the filter or pointing at non-regular files
    pub ignored: usize,
    /// Workers that exited abnormally
    pub panicked: usize,
}

/// Running set of watch-mode workers.
pub struct WorkerPool {
    handles: Vec<JoinHandle<WorkerReport>>,
}

impl WorkerPool {
    /// Start `config.concurrency` workers draining `events`.
    ///
    /// Worker log lines are recorded inside `span`, each in a child span
    /// carrying the worker id.
    pub fn spawn(
        config: &WorkerPoolConfig,
        filter: EventFilter,
        converter: Arc<dyn Convert>,
        events: Receiver<WatchEvent>,
        errors: Receiver<WatchError>,
        shutdown: ShutdownSignal,
        span: &tracing::Span,
    ) -> std::io::Result<Self> {
        let mut handles = Vec::with_capacity(config.concurrency);

        for id in 0..config.concurrency {
            let worker = Worker {
                id,
                config: config.clone(),
                filter: filter.clone(),
                converter: converter.clone(),
                events: events.clone(),
                errors: errors.clone(),
                shutdown: shutdown.clone(),
                span: tracing::info_span!(parent: span, "worker", id),
            };
            let handle = std::thread::Builder::new()
                .name(format!("heicwatch-worker-{id}"))
                .spawn(move || worker.run())?;
            handles.push(handle);
        }

        Ok(Self { handles })
    }

    /// Number of workers in the pool.
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Block until every worker has stopped and sum their counters.
    pub fn join(self) -> PoolStats {
        let mut stats = PoolStats::default();
        for handle in self.handles {
            match handle.join() {
                Ok(report) => {
                    tracing::debug!(
                        worker = report.id,
                        converted = report.converted,
                        failed = report.failed,
                        reason = ?report.stop,
                        "worker stopped"
                    );
                    stats.converted += report.converted;
                    stats.failed += report.failed;
                    stats.ignored += report.ignored;
                }
                Err(_) => {
                    tracing::error!("Worker thread panicked");
                    stats.panicked += 1;
                }
            }
        }
        stats
    }
}

struct Worker {
    id: usize,
    config: WorkerPoolConfig,
    filter: EventFilter,
    converter: Arc<dyn Convert>,
    events: Receiver<WatchEvent>,
    errors: Receiver<WatchError>,
    shutdown: ShutdownSignal,
    span: tracing::Span,
}

impl Worker {
    fn run(self) -> WorkerReport {
        let span = self.span.clone();
        let _entered = span.enter();

        let mut report = WorkerReport {
            id: self.id,
            converted: 0,
            failed: 0,
            ignored: 0,
            stop: StopReason::Shutdown,
        };
        let mut errors = self.errors.clone();

        loop {
            // A ready event must not win over an already fired shutdown.
            if self.shutdown.is_fired() {
                report.stop = StopReason::Shutdown;
                break;
            }

            select! {
                recv(self.shutdown.rx) -> _ => {
                    report.stop = StopReason::Shutdown;
                    break;
                }
                recv(self.events) -> msg => match msg {
                    Ok(event) => {
                        if !self.dispatch(event, &mut report) {
                            break;
                        }
                    }
                    Err(_) => {
                        report.stop = StopReason::EventsClosed;
                        break;
                    }
                },
                recv(errors) -> msg => match msg {
                    Ok(err) => tracing::warn!(error = %err, "watcher error"),
                    Err(_) => {
                        tracing::debug!("watcher error stream closed");
                        errors = never();
                    }
                },
            }
        }

        match report.stop {
            StopReason::Shutdown => tracing::debug!("stopping work: shutdown requested"),
            StopReason::EventsClosed => tracing::debug!("stopping work: event stream closed"),
        }
        report
    }

    /// Handle a received event unless shutdown fired in the meantime.
    /// Returns false when the worker must stop.
    fn dispatch(&self, event: WatchEvent, report: &mut WorkerReport) -> bool {
        // select! may pick a ready event even though shutdown just fired.
        if self.shutdown.is_fired() {
            tracing::debug!(path = %event.path.display(), "dropping event: shutdown requested");
            report.stop = StopReason::Shutdown;
            return false;
        }
        self.handle(event, report);
        true
    }

    fn handle(&self, event: WatchEvent, report: &mut WorkerReport) {
        tracing::debug!(path = %event.path.display(), kind = ?event.kind, "received watch event");

        if !self.filter.should_convert(&event) {
            report.ignored += 1;
            return;
        }
        if !event.path.is_file() {
            tracing::debug!(path = %event.path.display(), "skipping: not a regular file");
            report.ignored += 1;
            return;
        }

        let job = self.config.job_for(event.path);
        match self.converter.convert(&job) {
            Ok(output) => {
                report.converted += 1;
                tracing::info!(
                    source = %job.source_path.display(),
                    output = %output.display(),
                    "converted"
                );
            }
            Err(e) => {
                report.failed += 1;
                tracing::error!(
                    source = %job.source_path.display(),
                    error = %e,
                    "cannot convert"
                );
            }
        }
    }
}
