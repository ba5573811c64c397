//! Batch conversion on a background worker, reported over an event channel.
//!
//! The display side (the CLI's progress bar, or any other front end) never
//! shares mutable state with the worker. It builds a [`BatchPlan`] once at
//! selection time, hands it to [`spawn_batch`], and then only reads
//! [`BatchEvent`]s from the returned [`BatchHandle`]:
//!
//! ```text
//! FileStarted(0) ─ Progress … ─ FileFinished(0) ─ FileStarted(1) ─ … ─ BatchFinished
//! ```
//!
//! Files are converted strictly one after another on a single
//! `spawn_blocking` thread. A failed file is reported and the batch moves on
//! to the next one. Fractions carried by [`BatchEvent::Progress`] only ever
//! increase, and exactly one of them is `1.0`: the last progress event of the
//! batch.

use crate::config::ConversionConfig;
use crate::convert::{self, derive_output_path, derive_output_path_in};
use crate::error::Gif2PdfError;
use crate::output::ConversionStats;
use crate::pipeline::input::has_gif_extension;
use crate::progress::{BatchProgress, ConversionProgressCallback, ProgressCallback, ProgressEvent};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// One file of a batch, as planned at selection time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchItem {
    pub source: PathBuf,
    pub destination: PathBuf,
    /// Frames that will become pages; 0 if the file could not be read.
    pub frame_count: usize,
}

/// The files of a batch and the grand total used to scale progress.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchPlan {
    pub items: Vec<BatchItem>,
    pub total_frames: usize,
}

impl BatchPlan {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }
}

/// How one file of the batch ended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileOutcome {
    pub file_index: usize,
    pub source: PathBuf,
    pub destination: PathBuf,
    /// Stats on success, the error message on failure.
    pub result: Result<ConversionStats, String>,
}

impl FileOutcome {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

/// Totals for a finished batch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub total_files: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub pages_written: usize,
    pub total_duration_ms: u64,
    /// `(source, error message)` for every failed file, in batch order.
    pub failures: Vec<(PathBuf, String)>,
}

/// Worker → display messages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BatchEvent {
    /// The worker is about to convert `source`.
    FileStarted {
        file_index: usize,
        source: PathBuf,
        frame_count: usize,
    },
    /// Overall progress moved forward.
    Progress(ProgressEvent),
    /// A file succeeded or failed.
    FileFinished(FileOutcome),
    /// Every file has been attempted; always the last event.
    BatchFinished(BatchSummary),
}

/// Expand the user's selection into a list of GIF paths.
///
/// Directories contribute their `.gif` entries (not recursive, sorted by
/// name). Files without a `.gif` extension are skipped with a warning.
/// Duplicates are dropped, first occurrence wins.
pub fn collect_inputs(paths: &[PathBuf]) -> Vec<PathBuf> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();

    for path in paths {
        if path.is_dir() {
            let mut entries: Vec<PathBuf> = match std::fs::read_dir(path) {
                Ok(rd) => rd
                    .filter_map(|e| e.ok().map(|e| e.path()))
                    .filter(|p| p.is_file() && has_gif_extension(p))
                    .collect(),
                Err(e) => {
                    warn!("Cannot read directory {}: {}", path.display(), e);
                    continue;
                }
            };
            entries.sort();
            for entry in entries {
                if seen.insert(entry.clone()) {
                    out.push(entry);
                }
            }
        } else if has_gif_extension(path) {
            if seen.insert(path.clone()) {
                out.push(path.clone());
            }
        } else {
            warn!("Skipping non-GIF input: {}", path.display());
        }
    }

    out
}

/// Count the frames of every input and derive each destination.
///
/// This is a full decode pass over every file before any conversion starts.
/// Files that cannot be read are kept with a frame count of 0; their
/// conversion will fail and be reported like any other failure.
pub fn plan_batch(
    inputs: Vec<PathBuf>,
    out_dir: Option<&Path>,
    config: &ConversionConfig,
) -> BatchPlan {
    let mut items = Vec::with_capacity(inputs.len());
    let mut total_frames = 0usize;
    let mut claimed = HashSet::new();

    for source in inputs {
        let frame_count = match convert::count_frames(&source) {
            Ok(n) => config.frames.to_indices(n).len(),
            Err(e) => {
                warn!("Cannot count frames of {}: {}", source.display(), e);
                0
            }
        };
        total_frames += frame_count;

        let destination = match out_dir {
            Some(dir) => derive_output_path_in(&source, dir),
            None => derive_output_path(&source),
        };
        let destination = claim_destination(destination, &mut claimed);
        items.push(BatchItem {
            source,
            destination,
            frame_count,
        });
    }

    debug!(
        "Planned batch: {} files, {} frames",
        items.len(),
        total_frames
    );
    BatchPlan {
        items,
        total_frames,
    }
}

/// Reserve `destination` for one item of the batch.
///
/// Two inputs with the same stem (`a/x.gif` and `b/x.gif` into one out dir,
/// or `x.gif` next to `x.GIF`) would otherwise write the same PDF. Later
/// ones get `-2`, `-3`, … appended to the stem.
fn claim_destination(destination: PathBuf, claimed: &mut HashSet<PathBuf>) -> PathBuf {
    if claimed.insert(destination.clone()) {
        return destination;
    }
    let stem = destination
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());
    let mut n = 2usize;
    loop {
        let candidate = destination.with_file_name(format!("{stem}-{n}.pdf"));
        if claimed.insert(candidate.clone()) {
            warn!(
                "{} is already an output of this batch, writing {} instead",
                destination.display(),
                candidate.display()
            );
            return candidate;
        }
        n += 1;
    }
}

/// Receiving end of a running batch.
pub struct BatchHandle {
    events: UnboundedReceiver<BatchEvent>,
    worker: JoinHandle<BatchSummary>,
}

impl BatchHandle {
    /// Next event, or `None` once the worker is gone and the queue is drained.
    pub async fn recv(&mut self) -> Option<BatchEvent> {
        self.events.recv().await
    }

    /// Wait for the worker and return its summary.
    pub async fn join(self) -> Result<BatchSummary, Gif2PdfError> {
        self.worker
            .await
            .map_err(|e| Gif2PdfError::Internal(format!("Batch worker panicked: {e}")))
    }
}

/// Start converting `plan` on one background worker.
///
/// Must be called from within a Tokio runtime.
pub fn spawn_batch(plan: BatchPlan, config: ConversionConfig) -> BatchHandle {
    let (tx, events) = mpsc::unbounded_channel();
    let worker = tokio::task::spawn_blocking(move || run_batch(&plan, &config, &tx));
    BatchHandle { events, worker }
}

/// Convert every file of `plan` in order on the current thread, sending
/// events to `tx`.
///
/// A closed receiver does not stop the batch.
pub fn run_batch(
    plan: &BatchPlan,
    config: &ConversionConfig,
    tx: &UnboundedSender<BatchEvent>,
) -> BatchSummary {
    let start = Instant::now();
    let progress = Arc::new(Mutex::new(BatchProgress::new(plan.total_frames)));
    let mut summary = BatchSummary {
        total_files: plan.items.len(),
        ..BatchSummary::default()
    };
    info!(
        "Starting batch: {} files, {} frames",
        plan.items.len(),
        plan.total_frames
    );

    for (file_index, item) in plan.items.iter().enumerate() {
        let _ = tx.send(BatchEvent::FileStarted {
            file_index,
            source: item.source.clone(),
            frame_count: item.frame_count,
        });

        let callback = Arc::new(BatchCallback {
            file_index,
            tx: tx.clone(),
            progress: Arc::clone(&progress),
            frame_count: item.frame_count,
            completed: AtomicUsize::new(0),
            inner: config.progress_callback.clone(),
        });
        let mut file_config = config.clone();
        file_config.progress_callback = Some(Arc::clone(&callback) as ProgressCallback);

        let result = convert::convert(&item.source, &item.destination, &file_config);

        // Frames of a failed file still count towards the grand total.
        let completed = callback.completed.load(Ordering::SeqCst);
        let remaining = item.frame_count.saturating_sub(completed);
        if remaining > 0 {
            let fraction = lock(&progress).advance(remaining);
            if let Some(overall_fraction) = fraction {
                let _ = tx.send(BatchEvent::Progress(ProgressEvent {
                    file_index,
                    frame_index: item.frame_count.saturating_sub(1),
                    frame_total: item.frame_count,
                    overall_fraction,
                }));
            }
        }

        let result = match result {
            Ok(stats) => {
                summary.succeeded += 1;
                summary.pages_written += stats.pages_written;
                Ok(stats)
            }
            Err(e) => {
                warn!("Failed to convert {}: {}", item.source.display(), e);
                summary.failed += 1;
                summary.failures.push((item.source.clone(), e.to_string()));
                Err(e.to_string())
            }
        };

        let _ = tx.send(BatchEvent::FileFinished(FileOutcome {
            file_index,
            source: item.source.clone(),
            destination: item.destination.clone(),
            result,
        }));
    }

    let last = plan.items.len().saturating_sub(1);
    let last_frames = plan.items.last().map(|i| i.frame_count).unwrap_or(0);
    if let Some(overall_fraction) = lock(&progress).finish() {
        let _ = tx.send(BatchEvent::Progress(ProgressEvent {
            file_index: last,
            frame_index: last_frames.saturating_sub(1),
            frame_total: last_frames,
            overall_fraction,
        }));
    }

    summary.total_duration_ms = start.elapsed().as_millis() as u64;
    info!(
        "Batch complete: {}/{} files converted, {}ms",
        summary.succeeded, summary.total_files, summary.total_duration_ms
    );
    let _ = tx.send(BatchEvent::BatchFinished(summary.clone()));
    summary
}

fn lock(progress: &Mutex<BatchProgress>) -> std::sync::MutexGuard<'_, BatchProgress> {
    progress.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Turns one file's frame callbacks into batch-level progress events.
struct BatchCallback {
    file_index: usize,
    tx: UnboundedSender<BatchEvent>,
    progress: Arc<Mutex<BatchProgress>>,
    /// Selected frames of this file, as planned.
    frame_count: usize,
    completed: AtomicUsize,
    inner: Option<ProgressCallback>,
}

impl ConversionProgressCallback for BatchCallback {
    fn on_conversion_start(&self, frame_total: usize) {
        if let Some(ref cb) = self.inner {
            cb.on_conversion_start(frame_total);
        }
    }

    fn on_frame_start(&self, frame_index: usize, frame_total: usize) {
        if let Some(ref cb) = self.inner {
            cb.on_frame_start(frame_index, frame_total);
        }
    }

    fn on_frame_complete(&self, frame_index: usize, frame_total: usize) {
        self.completed.fetch_add(1, Ordering::SeqCst);
        let fraction = lock(&self.progress).advance(1);
        if let Some(overall_fraction) = fraction {
            let _ = self.tx.send(BatchEvent::Progress(ProgressEvent {
                file_index: self.file_index,
                frame_index,
                frame_total: self.frame_count,
                overall_fraction,
            }));
        }
        if let Some(ref cb) = self.inner {
            cb.on_frame_complete(frame_index, frame_total);
        }
    }

    fn on_conversion_complete(&self, frame_total: usize, pages_written: usize) {
        if let Some(ref cb) = self.inner {
            cb.on_conversion_complete(frame_total, pages_written);
        }
    }
}
