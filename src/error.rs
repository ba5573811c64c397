//! Error types for the gif2pdf library.
//!
//! Every failure while converting one file is a single **conversion failure**:
//! the file is reported as failed and nothing is left at the destination.
//! [`Gif2PdfError`] keeps the detail (path, frame index, cause) so the library
//! caller can decide how much of it to show; [`crate::convert::convert_reported`]
//! collapses it to a boolean after logging it.

use std::path::PathBuf;
use thiserror::Error;

/// All errors returned by the gif2pdf library.
#[derive(Debug, Error)]
pub enum Gif2PdfError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("GIF file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The file exists and was read, but is not a GIF.
    #[error("File is not a GIF image: '{path}'\nFirst bytes: {magic:?}")]
    NotAGif { path: PathBuf, magic: [u8; 4] },

    /// The GIF header or frame stream could not be parsed.
    #[error("GIF '{path}' is corrupt: {detail}")]
    CorruptGif { path: PathBuf, detail: String },

    /// The animation (or the selected part of it) has no frames.
    #[error("GIF '{path}' has no frames to convert")]
    NoFrames { path: PathBuf },

    // ── Frame errors ──────────────────────────────────────────────────────
    /// The decoder failed part-way through the animation.
    #[error("Decoding failed for frame {frame}: {detail}")]
    FrameDecodeFailed { frame: usize, detail: String },

    /// A frame does not match the page size fixed by the first frame.
    #[error("Frame {frame} is {width}x{height} px but the page size is {page_width}x{page_height} px")]
    FrameSizeMismatch {
        frame: usize,
        width: u32,
        height: u32,
        page_width: u32,
        page_height: u32,
    },

    /// The flattened frame could not be encoded for embedding.
    #[error("Encoding failed for frame {frame}: {detail}")]
    FrameEncodeFailed { frame: usize, detail: String },

    /// The temporary per-frame artifact could not be written or read back.
    #[error("Temporary file for frame {frame} failed: {source}")]
    StagingFailed {
        frame: usize,
        #[source]
        source: std::io::Error,
    },

    // ── Output errors ─────────────────────────────────────────────────────
    /// Could not create or write the output PDF file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// lopdf could not serialise the document.
    #[error("Failed to serialise PDF '{path}': {detail}")]
    PdfWriteFailed { path: PathBuf, detail: String },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Gif2PdfError {
    /// The 0-based frame index this error refers to, if any.
    pub fn frame(&self) -> Option<usize> {
        match self {
            Gif2PdfError::FrameDecodeFailed { frame, .. }
            | Gif2PdfError::FrameSizeMismatch { frame, .. }
            | Gif2PdfError::FrameEncodeFailed { frame, .. }
            | Gif2PdfError::StagingFailed { frame, .. } => Some(*frame),
            _ => None,
        }
    }
}
