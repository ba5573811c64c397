//! Configuration types for GIF-to-PDF conversion.
//!
//! All conversion behaviour is controlled through [`ConversionConfig`], built
//! via its [`ConversionConfigBuilder`]. One struct for every knob means the
//! batch worker can take its own clone and the CLI can map flags onto it in
//! one place.

use crate::error::Gif2PdfError;
use crate::progress::ProgressCallback;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Configuration for a GIF-to-PDF conversion.
///
/// Built via [`ConversionConfig::builder()`] or using
/// [`ConversionConfig::default()`].
///
/// # Example
/// ```rust
/// use gif2pdf::{ConversionConfig, FrameEncoding};
///
/// let config = ConversionConfig::builder()
///     .frame_encoding(FrameEncoding::Jpeg { quality: 80 })
///     .background([0, 0, 0])
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct ConversionConfig {
    /// How each flattened frame is stored inside the PDF. Default: JPEG, quality 90.
    pub frame_encoding: FrameEncoding,

    /// Colour that transparent pixels are flattened against. Default: white.
    pub background: [u8; 3],

    /// What to do with a frame whose size differs from the page size. Default: stretch.
    pub size_policy: FrameSizePolicy,

    /// Frame selection (1-indexed). Default: all frames.
    pub frames: FrameSelection,

    /// Directory for the temporary per-frame artifacts. `None` uses the
    /// system temp directory.
    pub temp_dir: Option<PathBuf>,

    /// Write a PDF Info dictionary (title, producer, creator). Default: true.
    pub include_metadata: bool,

    /// Optional per-frame progress callback.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            frame_encoding: FrameEncoding::default(),
            background: [255, 255, 255],
            size_policy: FrameSizePolicy::default(),
            frames: FrameSelection::default(),
            temp_dir: None,
            include_metadata: true,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for ConversionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionConfig")
            .field("frame_encoding", &self.frame_encoding)
            .field("background", &self.background)
            .field("size_policy", &self.size_policy)
            .field("frames", &self.frames)
            .field("temp_dir", &self.temp_dir)
            .field("include_metadata", &self.include_metadata)
            .field(
                "progress_callback",
                &self
                    .progress_callback
                    .as_ref()
                    .map(|_| "<dyn ConversionProgressCallback>"),
            )
            .finish()
    }
}

impl ConversionConfig {
    /// Create a new builder for `ConversionConfig`.
    pub fn builder() -> ConversionConfigBuilder {
        ConversionConfigBuilder {
            config: Self::default(),
        }
    }

    /// Directory the temporary frame artifacts are written to.
    pub fn effective_temp_dir(&self) -> PathBuf {
        self.temp_dir.clone().unwrap_or_else(std::env::temp_dir)
    }
}

/// Builder for [`ConversionConfig`].
#[derive(Debug)]
pub struct ConversionConfigBuilder {
    config: ConversionConfig,
}

impl ConversionConfigBuilder {
    pub fn frame_encoding(mut self, encoding: FrameEncoding) -> Self {
        self.config.frame_encoding = match encoding {
            FrameEncoding::Jpeg { quality } => FrameEncoding::Jpeg {
                quality: quality.clamp(1, 100),
            },
            other => other,
        };
        self
    }

    pub fn background(mut self, rgb: [u8; 3]) -> Self {
        self.config.background = rgb;
        self
    }

    pub fn size_policy(mut self, policy: FrameSizePolicy) -> Self {
        self.config.size_policy = policy;
        self
    }

    pub fn frames(mut self, selection: FrameSelection) -> Self {
        self.config.frames = selection;
        self
    }

    pub fn temp_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.temp_dir = Some(dir.into());
        self
    }

    pub fn include_metadata(mut self, v: bool) -> Self {
        self.config.include_metadata = v;
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ConversionConfig, Gif2PdfError> {
        let c = &self.config;
        if let FrameEncoding::Jpeg { quality } = c.frame_encoding {
            if !(1..=100).contains(&quality) {
                return Err(Gif2PdfError::InvalidConfig(format!(
                    "JPEG quality must be 1–100, got {quality}"
                )));
            }
        }
        if let FrameSelection::Range(start, end) = c.frames {
            if start == 0 || start > end {
                return Err(Gif2PdfError::InvalidConfig(format!(
                    "Invalid frame range {start}-{end}: frames are 1-indexed and start must be <= end"
                )));
            }
        }
        if let Some(ref dir) = c.temp_dir {
            if !dir.is_dir() {
                return Err(Gif2PdfError::InvalidConfig(format!(
                    "Temp directory does not exist: {}",
                    dir.display()
                )));
            }
        }
        Ok(self.config)
    }
}

// ── Enums ────────────────────────────────────────────────────────────────

/// How a flattened frame is embedded as a PDF image.
///
/// JPEG keeps documents small and is what most viewers expect for photos.
/// Lossless stores the raw RGB samples behind `/FlateDecode`, so the page
/// decodes back to exactly the flattened frame; GIF art with hard edges and
/// few colours often compresses better this way, too.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FrameEncoding {
    /// Baseline JPEG, embedded as `/DCTDecode`. Quality 1–100.
    Jpeg { quality: u8 },
    /// Raw 8-bit RGB, embedded as `/FlateDecode`.
    Lossless,
}

impl Default for FrameEncoding {
    fn default() -> Self {
        FrameEncoding::Jpeg { quality: 90 }
    }
}

impl FrameEncoding {
    /// File extension used for the staged temporary artifact.
    pub fn extension(&self) -> &'static str {
        match self {
            FrameEncoding::Jpeg { .. } => "jpg",
            FrameEncoding::Lossless => "rgb",
        }
    }
}

/// Policy for frames whose pixel size differs from the page size.
///
/// The page size is the GIF's logical screen size. The `image` GIF decoder
/// composites every frame onto that screen, so frames decoded from a GIF
/// always match it; the policy applies wherever a frame reaches the page
/// step with another size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FrameSizePolicy {
    /// Draw the frame scaled to the page size. (default)
    #[default]
    Stretch,
    /// Fail the conversion with [`Gif2PdfError::FrameSizeMismatch`].
    Reject,
}

/// Specifies which frames of the GIF become pages.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FrameSelection {
    /// Convert every frame (default).
    #[default]
    All,
    /// Convert a single frame (1-indexed).
    Single(usize),
    /// Convert a contiguous range of frames (1-indexed, inclusive).
    Range(usize, usize),
    /// Convert specific frames (1-indexed, deduplicated).
    Set(Vec<usize>),
}

impl FrameSelection {
    /// Expand the selection into a sorted, deduplicated list of 0-indexed frame numbers.
    pub fn to_indices(&self, total_frames: usize) -> Vec<usize> {
        let mut indices: Vec<usize> = match self {
            FrameSelection::All => (0..total_frames).collect(),
            FrameSelection::Single(f) => {
                if *f >= 1 && *f <= total_frames {
                    vec![f - 1]
                } else {
                    vec![]
                }
            }
            FrameSelection::Range(start, end) => {
                let s = (*start).max(1) - 1;
                let e = (*end).min(total_frames);
                (s..e).collect()
            }
            FrameSelection::Set(frames) => frames
                .iter()
                .filter(|&&f| f >= 1 && f <= total_frames)
                .map(|f| f - 1)
                .collect(),
        };
        indices.sort_unstable();
        indices.dedup();
        indices
    }
}
