//! Scoped on-disk artifact for one encoded frame.
//!
//! Each frame is written to its own temporary file between encoding and
//! drawing. The file is a [`tempfile::NamedTempFile`], so it is removed when
//! the [`StagedFrame`] is dropped: after the page is committed, when a later
//! step returns an error, or during a panic unwind. Names combine the frame
//! index with a random suffix, so concurrent conversions cannot collide.

use crate::config::FrameEncoding;
use crate::error::Gif2PdfError;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::debug;

/// One encoded frame staged in a temporary file.
#[derive(Debug)]
pub struct StagedFrame {
    file: NamedTempFile,
    frame: usize,
}

impl StagedFrame {
    /// Write `bytes` for frame `frame` into a new temporary file in `dir`.
    pub fn write(
        dir: &Path,
        frame: usize,
        encoding: FrameEncoding,
        bytes: &[u8],
    ) -> Result<Self, Gif2PdfError> {
        let staging = |source| Gif2PdfError::StagingFailed { frame, source };

        let mut file = tempfile::Builder::new()
            .prefix(&format!("gif2pdf-frame-{frame:05}-"))
            .suffix(&format!(".{}", encoding.extension()))
            .tempfile_in(dir)
            .map_err(staging)?;
        file.write_all(bytes).map_err(staging)?;
        file.flush().map_err(staging)?;

        debug!("Staged frame {} at {}", frame, file.path().display());
        Ok(Self { file, frame })
    }

    /// Path of the temporary file.
    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Read the staged bytes back.
    pub fn read(&self) -> Result<Vec<u8>, Gif2PdfError> {
        std::fs::read(self.file.path()).map_err(|source| Gif2PdfError::StagingFailed {
            frame: self.frame,
            source,
        })
    }

    /// Delete the file now, reporting any error. Dropping also deletes it.
    pub fn remove(self) -> Result<(), Gif2PdfError> {
        let frame = self.frame;
        self.file
            .close()
            .map_err(|source| Gif2PdfError::StagingFailed { frame, source })
    }
}
