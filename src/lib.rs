//! # gif2pdf
//!
//! Convert animated GIFs to PDF documents, one page per frame.
//!
//! Every frame of the animation, in order, becomes one full-page image. All
//! pages share the GIF's logical screen size, one PDF point per pixel, so the
//! document flips through the animation at its native resolution.
//!
//! ## Pipeline Overview
//!
//! ```text
//! GIF
//!  │
//!  ├─ 1. Input     check path and GIF magic, open the decoder
//!  ├─ 2. Frames    count, then decode composited RGBA frames in order
//!  ├─ 3. Encode    flatten over the background, JPEG or raw RGB
//!  ├─ 4. Stage     one scoped temp file per frame, deleted on drop
//!  ├─ 5. Document  one full-bleed image page per frame (lopdf)
//!  └─ 6. Output    staging file persisted over the destination
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use gif2pdf::{convert, ConversionConfig};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ConversionConfig::default();
//!     let stats = convert("dance.gif", "dance.pdf", &config)?;
//!     eprintln!("{} pages, {} bytes", stats.pages_written, stats.output_bytes);
//!     Ok(())
//! }
//! ```
//!
//! Batches run on a background worker and report through an event channel,
//! see [`batch`].
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `gif2pdf` binary (clap + anyhow + indicatif + tracing-subscriber) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! gif2pdf = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod batch;
pub mod config;
pub mod convert;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod progress;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use batch::{
    collect_inputs, plan_batch, run_batch, spawn_batch, BatchEvent, BatchHandle, BatchItem,
    BatchPlan, BatchSummary, FileOutcome,
};
pub use config::{
    ConversionConfig, ConversionConfigBuilder, FrameEncoding, FrameSelection, FrameSizePolicy,
};
pub use convert::{
    convert, convert_reported, convert_to_dir, count_frames, derive_output_path,
    derive_output_path_in, inspect,
};
pub use error::Gif2PdfError;
pub use output::{ConversionStats, GifMetadata};
pub use progress::{
    BatchProgress, ConversionProgressCallback, NoopProgressCallback, ProgressCallback,
    ProgressEvent,
};
