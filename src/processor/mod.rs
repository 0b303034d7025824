//! Batch conversion engine.
//!
//! Orchestrates a whole batch: file discovery, a bounded pool of blocking
//! conversion workers fed from a pull-based queue, per-file failure capture,
//! worker-loss recovery, and progress publication. All batch state lives in
//! the single orchestrator task and changes only in response to worker
//! messages.

pub mod discovery;
pub mod progress;
pub mod worker;

#[cfg(test)]
pub mod tests;

use self::discovery::FileDiscovery;
use self::progress::{BatchProgress, ProgressPublisher, ProgressReporter, ProgressSnapshot};
use self::worker::{Assignment, ConversionContext, FileOutput, WorkerEvent, run_worker};

use crate::config::{ConversionConfig, SystemProfile};
use crate::encoder::DocumentEncoder;
use crate::error::{EphemerisError, Result};
use crate::models::{BatchReport, FileFailure};

use futures::future::join_all;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tokio::fs;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// Lifecycle of one pool worker as seen by the orchestrator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    /// Waiting for an assignment
    Idle,
    /// Converting the file at this queue index
    Assigned { index: usize },
    /// Outcome received, being recorded
    Reporting { index: usize },
    /// Exited unexpectedly; never assigned again
    Lost,
}

/// Orchestrator's handle on one worker
struct WorkerSlot {
    state: WorkerState,
    assignments: Option<UnboundedSender<Assignment>>,
}

/// Main processor for batch ephemeris conversion
pub struct BatchProcessor {
    config: ConversionConfig,
    encoder: Arc<dyn DocumentEncoder>,
    reporter: Option<Arc<dyn ProgressReporter>>,
    progress: ProgressPublisher,
    system_profile: SystemProfile,
}

impl BatchProcessor {
    /// Create a new batch processor
    pub fn new(config: ConversionConfig, encoder: Arc<dyn DocumentEncoder>) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            encoder,
            reporter: None,
            progress: ProgressPublisher::new(),
            system_profile: SystemProfile::detect(),
        })
    }

    /// Attach a progress reporter
    pub fn with_reporter(mut self, reporter: Arc<dyn ProgressReporter>) -> Self {
        self.reporter = Some(reporter);
        self
    }

    /// Override detected system capabilities
    pub fn with_system_profile(mut self, profile: SystemProfile) -> Self {
        self.system_profile = profile;
        self
    }

    /// Handle for observing the attempted-file counter
    pub fn progress(&self) -> BatchProgress {
        self.progress.subscribe()
    }

    /// Convert every eligible input file.
    ///
    /// Per-file failures are collected in the report; only problems that stop
    /// the batch from starting at all (missing input directory, unwritable
    /// output directory) are returned as errors. A processor runs one batch,
    /// so the counter seen through [`BatchProcessor::progress`] never goes
    /// backwards.
    pub async fn process(self) -> Result<BatchReport> {
        let start_time = Instant::now();

        let discovery = FileDiscovery::new(
            self.config.input_dir.clone(),
            &self.config.input_pattern,
        )?;
        let files = discovery.discover_input_files()?;

        if files.is_empty() {
            warn!(
                "No input files matching '{}' in {}",
                self.config.input_pattern,
                self.config.input_dir.display()
            );
            self.publish(0, 0, 0);
            return Ok(BatchReport {
                output_dir: self.config.output_dir.clone(),
                elapsed: start_time.elapsed(),
                ..Default::default()
            });
        }

        fs::create_dir_all(&self.config.output_dir).await?;

        let worker_count = self
            .config
            .effective_workers(&self.system_profile, files.len());

        info!(
            "Converting {} files from {} with {} workers",
            files.len(),
            self.config.input_dir.display(),
            worker_count
        );

        let context = Arc::new(ConversionContext {
            output_dir: self.config.output_dir.clone(),
            encoder: Arc::clone(&self.encoder),
            step_tolerance_secs: self.config.step_tolerance_secs,
        });

        let mut report = self.run_pool(files, worker_count, context).await;
        report.elapsed = start_time.elapsed();

        info!(
            "Batch complete: {} converted, {} failed in {:.2}s",
            report.succeeded,
            report.failed(),
            report.elapsed.as_secs_f64()
        );

        Ok(report)
    }

    async fn run_pool(
        &self,
        files: Vec<PathBuf>,
        worker_count: usize,
        context: Arc<ConversionContext>,
    ) -> BatchReport {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let mut slots = Vec::with_capacity(worker_count);
        let mut handles: Vec<JoinHandle<()>> = Vec::with_capacity(worker_count);

        for worker in 0..worker_count {
            let (assign_tx, assign_rx) = mpsc::unbounded_channel();
            let events = event_tx.clone();
            let context = Arc::clone(&context);
            handles.push(tokio::task::spawn_blocking(move || {
                run_worker(worker, assign_rx, events, context)
            }));
            slots.push(WorkerSlot {
                state: WorkerState::Idle,
                assignments: Some(assign_tx),
            });
        }
        // Workers hold the only senders, so the channel closes once all are gone
        drop(event_tx);

        if let Some(reporter) = &self.reporter {
            reporter.start(files.len());
        }

        let mut dispatcher = Dispatcher {
            files,
            next_index: 0,
            slots,
            report: BatchReport {
                workers: worker_count,
                output_dir: self.config.output_dir.clone(),
                ..Default::default()
            },
        };
        dispatcher.report.total_files = dispatcher.files.len();

        for worker in 0..worker_count {
            dispatcher.assign_next(worker);
        }

        self.event_loop(&mut dispatcher, event_rx).await;

        // Closing assignment channels lets idle workers return
        for slot in &mut dispatcher.slots {
            slot.assignments = None;
        }
        for (worker, result) in join_all(handles).await.into_iter().enumerate() {
            if let Err(e) = result {
                debug!("Worker {} join error: {}", worker, e);
            }
        }

        if let Some(reporter) = &self.reporter {
            reporter.finish(dispatcher.report.succeeded, dispatcher.report.failed());
        }

        dispatcher.report
    }

    async fn event_loop(
        &self,
        dispatcher: &mut Dispatcher,
        mut events: UnboundedReceiver<WorkerEvent>,
    ) {
        while dispatcher.report.attempted() < dispatcher.files.len() {
            let Some(event) = events.recv().await else {
                break;
            };

            match event {
                WorkerEvent::Finished {
                    worker,
                    index,
                    outcome,
                } => {
                    dispatcher.record_outcome(worker, index, outcome);
                    dispatcher.assign_next(worker);
                }
                WorkerEvent::Exited { worker, panicked } => {
                    dispatcher.handle_exit(worker, panicked);
                }
            }

            if dispatcher.live_workers() == 0 {
                dispatcher.fail_unassigned();
            }

            self.publish(
                dispatcher.report.attempted(),
                dispatcher.report.failed(),
                dispatcher.files.len(),
            );
            if let Some(reporter) = &self.reporter {
                reporter.report_progress(dispatcher.report.attempted(), dispatcher.files.len());
            }
        }

        // Channel closed with work outstanding: nobody is left to do it
        if dispatcher.report.attempted() < dispatcher.files.len() {
            dispatcher.fail_in_flight();
            dispatcher.fail_unassigned();
            self.publish(
                dispatcher.report.attempted(),
                dispatcher.report.failed(),
                dispatcher.files.len(),
            );
        }
    }

    fn publish(&self, attempted: usize, failed: usize, total: usize) {
        self.progress.publish(ProgressSnapshot {
            attempted,
            failed,
            total,
        });
    }
}

/// Queue, worker table, and running totals; touched only by the event loop
struct Dispatcher {
    files: Vec<PathBuf>,
    next_index: usize,
    slots: Vec<WorkerSlot>,
    report: BatchReport,
}

impl Dispatcher {
    /// Hand the next unassigned file to `worker`, or leave it idle
    fn assign_next(&mut self, worker: usize) {
        let slot = &mut self.slots[worker];
        if slot.state == WorkerState::Lost {
            return;
        }
        if self.next_index >= self.files.len() {
            // Queue drained: closing the channel lets the worker return its thread
            slot.state = WorkerState::Idle;
            slot.assignments = None;
            return;
        }
        let Some(sender) = &slot.assignments else {
            return;
        };

        let index = self.next_index;
        let assignment = Assignment {
            index,
            path: self.files[index].clone(),
        };

        if sender.send(assignment).is_err() {
            // Receiver gone: the worker died before its exit notice arrived
            warn!("Worker {} stopped accepting work", worker);
            slot.state = WorkerState::Lost;
            slot.assignments = None;
            self.report.workers_lost += 1;
            return;
        }

        self.next_index += 1;
        slot.state = WorkerState::Assigned { index };
        debug!(
            "Assigned {} to worker {}",
            self.files[index].display(),
            worker
        );
    }

    fn record_outcome(&mut self, worker: usize, index: usize, outcome: Result<FileOutput>) {
        match self.slots[worker].state {
            WorkerState::Assigned { index: assigned } if assigned == index => {}
            other => warn!(
                "Worker {} reported file {} while {:?}",
                worker, index, other
            ),
        }
        self.slots[worker].state = WorkerState::Reporting { index };
        debug!("Worker {} finished {}", worker, self.files[index].display());

        match outcome {
            Ok(output) => {
                self.report.succeeded += 1;
                self.report.records_written += output.records;
                self.report.bytes_written += output.bytes;
            }
            Err(e) => self.record_failure(index, e),
        }
    }

    fn record_failure(&mut self, index: usize, error: EphemerisError) {
        let path = self.files[index].clone();
        error!("Failed to convert {}: {}", display_name(&path), error);
        self.report.failures.push(FileFailure {
            kind: error.kind(),
            reason: error.to_string(),
            path,
        });
    }

    fn handle_exit(&mut self, worker: usize, panicked: bool) {
        let previous = self.slots[worker].state;
        if !panicked && matches!(previous, WorkerState::Idle) {
            debug!("Worker {} exited", worker);
            return;
        }

        error!("Worker {} lost (panicked: {})", worker, panicked);
        if previous != WorkerState::Lost {
            self.report.workers_lost += 1;
        }
        self.slots[worker].state = WorkerState::Lost;
        self.slots[worker].assignments = None;

        if let WorkerState::Assigned { index } | WorkerState::Reporting { index } = previous {
            self.record_failure(index, EphemerisError::WorkerLost { worker });
        }
    }

    fn live_workers(&self) -> usize {
        self.slots
            .iter()
            .filter(|s| s.state != WorkerState::Lost)
            .count()
    }

    /// Mark every file still assigned to a worker as failed
    fn fail_in_flight(&mut self) {
        for worker in 0..self.slots.len() {
            if let WorkerState::Assigned { index } = self.slots[worker].state {
                self.slots[worker].state = WorkerState::Lost;
                self.record_failure(index, EphemerisError::WorkerLost { worker });
            }
        }
    }

    /// Mark every file never handed out as failed
    fn fail_unassigned(&mut self) {
        if self.next_index >= self.files.len() {
            return;
        }
        warn!(
            "No workers left; failing {} unassigned files",
            self.files.len() - self.next_index
        );
        while self.next_index < self.files.len() {
            let index = self.next_index;
            self.next_index += 1;
            self.record_failure(index, EphemerisError::PoolExhausted);
        }
    }
}

fn display_name(path: &std::path::Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}
