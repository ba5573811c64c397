//! Single-file conversion entry points.
//!
//! [`convert`] is the core routine: one GIF in, one PDF out, every frame
//! processed in order. [`convert_reported`] wraps it in the boolean contract
//! used by the batch shell: the error is logged, the caller only learns
//! whether the file made it.
//!
//! The output is written to a hidden staging file next to the destination
//! and moved into place only after the last page is committed, so a failed
//! conversion never leaves a truncated PDF behind.

use crate::config::{ConversionConfig, FrameSizePolicy};
use crate::error::Gif2PdfError;
use crate::output::{ConversionStats, GifMetadata};
use crate::pipeline::document::{DocumentInfo, PageImage, PdfBuilder};
use crate::pipeline::frames::{self, DecodedFrame};
use crate::pipeline::stage::StagedFrame;
use crate::pipeline::{encode, input};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tempfile::NamedTempFile;
use tracing::{debug, error, info, warn};

/// Convert the GIF at `source` into a PDF at `destination`.
///
/// This is the primary entry point for the library.
///
/// # Returns
/// `Ok(ConversionStats)` once the document is on disk with one page per
/// selected frame.
///
/// # Errors
/// Any failure aborts the whole file: there is no partial success at frame
/// granularity. The destination is left untouched and no temporary frame
/// file remains.
pub fn convert(
    source: impl AsRef<Path>,
    destination: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<ConversionStats, Gif2PdfError> {
    let total_start = Instant::now();
    let source = source.as_ref();
    let destination = destination.as_ref();
    info!(
        "Starting conversion: {} → {}",
        source.display(),
        destination.display()
    );

    // ── Step 1: Resolve input ────────────────────────────────────────────
    let source = input::resolve_local(source)?;

    // ── Step 2: Claim the output location before doing any work ──────────
    let mut staging = open_staging_output(destination)?;

    // ── Step 3: Count frames, compute the selection ──────────────────────
    let frame_total = frames::count_frames(&source)?;
    let selected = config.frames.to_indices(frame_total);
    if selected.is_empty() {
        return Err(Gif2PdfError::NoFrames { path: source });
    }
    debug!("Selected {} of {} frames", selected.len(), frame_total);

    // ── Step 4: Open the decoder; the screen size fixes the page size ────
    let decoder = input::open_decoder(&source)?;
    let page_size = frames::screen_size(&decoder);
    info!(
        "GIF has {} frames, page size {}x{}",
        frame_total, page_size.0, page_size.1
    );

    if let Some(ref cb) = config.progress_callback {
        cb.on_conversion_start(selected.len());
    }

    // ── Step 5: One page per selected frame, in order ────────────────────
    let temp_dir = config.effective_temp_dir();
    let mut builder = PdfBuilder::new(page_size.0, page_size.1);
    let mut decoded = frames::decode_frames(decoder);

    for &index in &selected {
        if let Some(ref cb) = config.progress_callback {
            cb.on_frame_start(index, frame_total);
        }

        let frame = seek(&mut decoded, index)?;
        draw_frame(&mut builder, &frame, page_size, config, &temp_dir)?;

        if let Some(ref cb) = config.progress_callback {
            cb.on_frame_complete(index, frame_total);
        }
    }

    // ── Step 6: Finalise and move into place ─────────────────────────────
    let pages_written = builder.page_count();
    let image_bytes = builder.image_bytes();
    let info = config
        .include_metadata
        .then(|| DocumentInfo::for_source(&source));
    {
        let mut writer = BufWriter::new(&mut staging);
        builder.write_to(info.as_ref(), &mut writer, destination)?;
        writer.flush().map_err(|e| output_error(destination, e))?;
    }
    staging
        .persist(destination)
        .map_err(|e| output_error(destination, e.error))?;

    let output_bytes = std::fs::metadata(destination).map(|m| m.len()).unwrap_or(0);
    let stats = ConversionStats {
        output_path: destination.to_path_buf(),
        total_frames: frame_total,
        pages_written,
        page_width: page_size.0,
        page_height: page_size.1,
        image_bytes,
        output_bytes,
        total_duration_ms: total_start.elapsed().as_millis() as u64,
    };

    info!(
        "Conversion complete: {} pages, {} bytes, {}ms",
        stats.pages_written, stats.output_bytes, stats.total_duration_ms
    );

    if let Some(ref cb) = config.progress_callback {
        cb.on_conversion_complete(frame_total, pages_written);
    }

    Ok(stats)
}

/// Convert and collapse the outcome to a boolean.
///
/// Returns `true` on full completion. On any failure the error is logged at
/// `ERROR` level and `false` is returned.
pub fn convert_reported(
    source: impl AsRef<Path>,
    destination: impl AsRef<Path>,
    config: &ConversionConfig,
) -> bool {
    let source = source.as_ref();
    match convert(source, destination, config) {
        Ok(_) => true,
        Err(e) => {
            error!("Failed to convert {}: {}", source.display(), e);
            false
        }
    }
}

/// Convert `source` into `out_dir`, naming the PDF after the GIF.
pub fn convert_to_dir(
    source: impl AsRef<Path>,
    out_dir: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<ConversionStats, Gif2PdfError> {
    let source = source.as_ref();
    let destination = derive_output_path_in(source, out_dir.as_ref());
    convert(source, destination, config)
}

/// Read GIF dimensions and frame count without converting anything.
pub fn inspect(source: impl AsRef<Path>) -> Result<GifMetadata, Gif2PdfError> {
    frames::read_metadata(source.as_ref())
}

/// Number of frames in the GIF at `source`.
pub fn count_frames(source: impl AsRef<Path>) -> Result<usize, Gif2PdfError> {
    frames::count_frames(source.as_ref())
}

/// The default PDF path for `source`: same directory, same stem, `.pdf`.
pub fn derive_output_path(source: impl AsRef<Path>) -> PathBuf {
    source.as_ref().with_extension("pdf")
}

/// The PDF path for `source` inside `out_dir`.
pub fn derive_output_path_in(source: impl AsRef<Path>, out_dir: impl AsRef<Path>) -> PathBuf {
    let stem = source
        .as_ref()
        .file_stem()
        .map(|s| s.to_os_string())
        .unwrap_or_else(|| "output".into());
    out_dir.as_ref().join(stem).with_extension("pdf")
}

// ── Internal helpers ─────────────────────────────────────────────────────

/// Create the hidden staging file in the destination's directory.
///
/// Fails fast when the directory is missing or not writable.
fn open_staging_output(destination: &Path) -> Result<NamedTempFile, Gif2PdfError> {
    let dir = match destination.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    tempfile::Builder::new()
        .prefix(".gif2pdf-")
        .suffix(".pdf.part")
        .tempfile_in(&dir)
        .map_err(|e| output_error(destination, e))
}

fn output_error(destination: &Path, source: std::io::Error) -> Gif2PdfError {
    Gif2PdfError::OutputWriteFailed {
        path: destination.to_path_buf(),
        source,
    }
}

/// Advance the decoder until frame `index` is produced.
fn seek<I>(decoded: &mut I, index: usize) -> Result<DecodedFrame, Gif2PdfError>
where
    I: Iterator<Item = Result<DecodedFrame, Gif2PdfError>>,
{
    for frame in decoded.by_ref() {
        let frame = frame?;
        if frame.index == index {
            return Ok(frame);
        }
    }
    Err(Gif2PdfError::FrameDecodeFailed {
        frame: index,
        detail: "animation ended before this frame".to_string(),
    })
}

/// Flatten, encode, stage and draw one frame onto a new page.
fn draw_frame(
    builder: &mut PdfBuilder,
    frame: &DecodedFrame,
    page_size: (u32, u32),
    config: &ConversionConfig,
    temp_dir: &Path,
) -> Result<(), Gif2PdfError> {
    let (width, height) = frame.buffer.dimensions();
    if (width, height) != page_size {
        match config.size_policy {
            FrameSizePolicy::Reject => {
                return Err(Gif2PdfError::FrameSizeMismatch {
                    frame: frame.index,
                    width,
                    height,
                    page_width: page_size.0,
                    page_height: page_size.1,
                });
            }
            FrameSizePolicy::Stretch => warn!(
                "Frame {} is {}x{}, stretching to {}x{}",
                frame.index, width, height, page_size.0, page_size.1
            ),
        }
    }

    let rgb = encode::flatten(&frame.buffer, config.background);
    let bytes = encode::encode_frame(&rgb, config.frame_encoding, frame.index)?;
    drop(rgb);

    let staged = StagedFrame::write(temp_dir, frame.index, config.frame_encoding, &bytes)?;
    drop(bytes);

    builder.add_image_page(PageImage {
        width,
        height,
        encoding: config.frame_encoding,
        data: staged.read()?,
    })?;
    staged.remove()
}
