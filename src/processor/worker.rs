//! Conversion workers.
//!
//! A worker is a blocking thread that receives one [`Assignment`] at a time,
//! runs the full parse, validate, encode, and write pipeline for that file,
//! and reports back with a [`WorkerEvent`]. Workers never talk to each other.

use crate::document::parse_ephemeris_file;
use crate::encoder::DocumentEncoder;
use crate::error::{EphemerisError, Result};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::NamedTempFile;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};
use tracing::debug;

/// Shared, read-only inputs every worker needs
pub struct ConversionContext {
    pub output_dir: PathBuf,
    pub encoder: Arc<dyn DocumentEncoder>,
    pub step_tolerance_secs: f64,
}

/// One file handed to a worker
#[derive(Debug, Clone)]
pub struct Assignment {
    pub index: usize,
    pub path: PathBuf,
}

/// A successfully written output file
#[derive(Debug, Clone)]
pub struct FileOutput {
    pub output_path: PathBuf,
    pub records: usize,
    pub bytes: u64,
}

/// Messages from workers to the orchestrator
#[derive(Debug)]
pub enum WorkerEvent {
    /// The assignment was attempted, successfully or not
    Finished {
        worker: usize,
        index: usize,
        outcome: Result<FileOutput>,
    },
    /// The worker thread is gone; `panicked` distinguishes a crash from shutdown
    Exited { worker: usize, panicked: bool },
}

/// Sends `Exited` when the worker's thread unwinds or returns
struct ExitNotifier {
    worker: usize,
    events: UnboundedSender<WorkerEvent>,
}

impl Drop for ExitNotifier {
    fn drop(&mut self) {
        let _ = self.events.send(WorkerEvent::Exited {
            worker: self.worker,
            panicked: std::thread::panicking(),
        });
    }
}

/// Worker loop; runs until the assignment channel closes.
///
/// Must run on a blocking thread.
pub fn run_worker(
    worker: usize,
    mut assignments: UnboundedReceiver<Assignment>,
    events: UnboundedSender<WorkerEvent>,
    context: Arc<ConversionContext>,
) {
    let _notifier = ExitNotifier {
        worker,
        events: events.clone(),
    };

    debug!("Worker {} started", worker);

    while let Some(assignment) = assignments.blocking_recv() {
        let outcome = convert_file(&assignment.path, &context);
        let event = WorkerEvent::Finished {
            worker,
            index: assignment.index,
            outcome,
        };
        if events.send(event).is_err() {
            break;
        }
    }

    debug!("Worker {} finished - no more files", worker);
}

/// Convert one input file and write its encoded output
pub fn convert_file(input: &Path, context: &ConversionContext) -> Result<FileOutput> {
    let document = parse_ephemeris_file(input, context.step_tolerance_secs)?;
    let bytes = context.encoder.encode(&document)?;

    let output_path = output_path_for(input, &context.output_dir, context.encoder.extension())?;
    write_atomically(&output_path, &bytes)?;

    debug!(
        "Converted {} -> {} ({} records, {} bytes)",
        input.display(),
        output_path.display(),
        document.len(),
        bytes.len()
    );

    Ok(FileOutput {
        output_path,
        records: document.len(),
        bytes: bytes.len() as u64,
    })
}

/// `<output_dir>/<input stem>.<extension>`
pub fn output_path_for(input: &Path, output_dir: &Path, extension: &str) -> Result<PathBuf> {
    let stem = input
        .file_stem()
        .ok_or_else(|| EphemerisError::MalformedFilename {
            path: input.to_path_buf(),
            reason: "file name is missing".to_string(),
        })?;
    let mut file_name = stem.to_os_string();
    file_name.push(".");
    file_name.push(extension);
    Ok(output_dir.join(file_name))
}

/// Write to a temporary file beside `path`, then rename it into place.
///
/// On any failure the temporary file is removed and `path` is untouched.
pub fn write_atomically(path: &Path, bytes: &[u8]) -> Result<()> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let mut temp = NamedTempFile::new_in(dir)?;
    temp.write_all(bytes)?;
    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|e| EphemerisError::Persist {
        path: path.to_path_buf(),
        source: e.error,
    })?;
    Ok(())
}
