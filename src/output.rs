//! Result types returned by the conversion entry points.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Summary of one successful GIF-to-PDF conversion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversionStats {
    /// Where the PDF was written.
    pub output_path: PathBuf,
    /// Frames in the source animation.
    pub total_frames: usize,
    /// Pages in the output document.
    pub pages_written: usize,
    /// Page width in PDF points (= source pixels).
    pub page_width: u32,
    /// Page height in PDF points (= source pixels).
    pub page_height: u32,
    /// Sum of the encoded image payloads embedded in the document.
    pub image_bytes: u64,
    /// Size of the written PDF file.
    pub output_bytes: u64,
    /// Wall-clock time for the whole conversion.
    pub total_duration_ms: u64,
}

/// What a GIF contains, read without converting it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GifMetadata {
    /// Logical screen width in pixels.
    pub width: u32,
    /// Logical screen height in pixels.
    pub height: u32,
    /// Number of frames in the animation.
    pub frame_count: usize,
    /// Sum of all frame delays.
    pub total_duration_ms: u64,
    /// Size of the file on disk.
    pub file_size: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stats_serialise_to_json() {
        let stats = ConversionStats {
            output_path: PathBuf::from("out.pdf"),
            total_frames: 3,
            pages_written: 3,
            page_width: 100,
            page_height: 80,
            image_bytes: 1234,
            output_bytes: 4321,
            total_duration_ms: 12,
        };
        let json = serde_json::to_string(&stats).unwrap();
        assert!(json.contains("\"pages_written\":3"));
        let back: ConversionStats = serde_json::from_str(&json).unwrap();
        assert_eq!(back, stats);
    }
}
