//! Progress reporting: the per-frame callback used by the converter and the
//! batch-level [`ProgressEvent`] built on top of it.
//!
//! The converter only knows about one file. It calls a
//! [`ConversionProgressCallback`] synchronously from the conversion loop with
//! 0-based frame indices; it never sees other files or a grand total.
//! Aggregating frames across a batch is [`BatchProgress`]'s job, which turns
//! completions into `overall_fraction` values for the display side.
//!
//! # Example
//!
//! ```rust
//! use gif2pdf::{ConversionProgressCallback, ConversionConfig};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountingCallback {
//!     completed: AtomicUsize,
//! }
//!
//! impl ConversionProgressCallback for CountingCallback {
//!     fn on_frame_complete(&self, frame_index: usize, frame_total: usize) {
//!         self.completed.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("frame {}/{}", frame_index + 1, frame_total);
//!     }
//! }
//!
//! let config = ConversionConfig::builder()
//!     .progress_callback(Arc::new(CountingCallback { completed: AtomicUsize::new(0) }))
//!     .build()
//!     .unwrap();
//! ```

use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Called by the conversion loop as it processes each frame.
///
/// All methods have default no-op implementations so callers only override
/// what they care about. Calls happen on the converting thread and must
/// return quickly; the loop waits for them.
pub trait ConversionProgressCallback: Send + Sync {
    /// Called once after the source is opened, before the first frame.
    ///
    /// # Arguments
    /// * `frame_total` — number of frames that will become pages
    fn on_conversion_start(&self, frame_total: usize) {
        let _ = frame_total;
    }

    /// Called before a frame is decoded and drawn.
    ///
    /// # Arguments
    /// * `frame_index` — 0-based index of the frame in the source
    /// * `frame_total` — number of frames in the source
    fn on_frame_start(&self, frame_index: usize, frame_total: usize) {
        let _ = (frame_index, frame_total);
    }

    /// Called after the frame's page has been committed.
    fn on_frame_complete(&self, frame_index: usize, frame_total: usize) {
        let _ = (frame_index, frame_total);
    }

    /// Called once after the document has been written.
    ///
    /// # Arguments
    /// * `frame_total`   — frames in the source
    /// * `pages_written` — pages in the output document
    fn on_conversion_complete(&self, frame_total: usize, pages_written: usize) {
        let _ = (frame_total, pages_written);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl ConversionProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::ConversionConfig`].
pub type ProgressCallback = Arc<dyn ConversionProgressCallback>;

/// One progress update for the display side of a batch, passed by value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProgressEvent {
    /// 0-based index of the file in the batch.
    pub file_index: usize,
    /// 0-based index, in the source animation, of the frame just completed.
    pub frame_index: usize,
    /// Frames of that file being converted, i.e. after frame selection.
    pub frame_total: usize,
    /// Fraction of the whole batch done, 0.0–1.0.
    pub overall_fraction: f64,
}

/// Frames processed against the grand total of a batch.
///
/// Fractions handed out by [`advance`](Self::advance) and
/// [`finish`](Self::finish) strictly increase, and `1.0` is handed out
/// exactly once per batch as long as `finish` is called at the end.
#[derive(Debug, Clone)]
pub struct BatchProgress {
    grand_total: usize,
    done: usize,
    last_emitted: f64,
}

impl BatchProgress {
    pub fn new(grand_total: usize) -> Self {
        Self {
            grand_total,
            done: 0,
            last_emitted: 0.0,
        }
    }

    pub fn grand_total(&self) -> usize {
        self.grand_total
    }

    pub fn done(&self) -> usize {
        self.done
    }

    /// Current fraction, clamped to 1.0 if more frames were seen than counted.
    pub fn fraction(&self) -> f64 {
        if self.grand_total == 0 {
            return 0.0;
        }
        (self.done.min(self.grand_total) as f64) / (self.grand_total as f64)
    }

    /// Record `frames` more processed (or settled) frames.
    ///
    /// Returns the new fraction if it is greater than the last one handed out.
    pub fn advance(&mut self, frames: usize) -> Option<f64> {
        self.done = self.done.saturating_add(frames);
        self.emit(self.fraction())
    }

    /// Close the batch: returns `Some(1.0)` unless 1.0 was already handed out.
    pub fn finish(&mut self) -> Option<f64> {
        self.done = self.done.max(self.grand_total);
        self.emit(1.0)
    }

    fn emit(&mut self, fraction: f64) -> Option<f64> {
        if fraction > self.last_emitted {
            self.last_emitted = fraction;
            Some(fraction)
        } else {
            None
        }
    }
}
