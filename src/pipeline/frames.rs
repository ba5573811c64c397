//! Frame iteration over an opened GIF.
//!
//! The `image` GIF decoder composites every frame onto the logical screen
//! and applies disposal methods, so each [`DecodedFrame`] is a complete
//! picture of what the animation shows at that point, not a sub-rectangle.
//! Frames can only be produced in order; "seeking" to frame *n* means
//! decoding frames `0..n`.

use crate::error::Gif2PdfError;
use crate::output::GifMetadata;
use crate::pipeline::input::{self, SourceDecoder};
use image::{AnimationDecoder, Delay, ImageDecoder, RgbaImage};
use std::path::Path;
use tracing::debug;

/// One composited animation frame.
#[derive(Debug, Clone)]
pub struct DecodedFrame {
    /// 0-based position in the animation.
    pub index: usize,
    /// Full-screen RGBA pixels.
    pub buffer: RgbaImage,
    /// How long the frame is shown.
    pub delay_ms: u64,
}

/// Logical screen size of the GIF: the page size of every output page.
pub fn screen_size(decoder: &SourceDecoder) -> (u32, u32) {
    decoder.dimensions()
}

/// Iterate the frames of `decoder` in order.
///
/// Decoder errors are reported as [`Gif2PdfError::FrameDecodeFailed`] with
/// the index of the frame that could not be produced.
pub fn decode_frames(
    decoder: SourceDecoder,
) -> impl Iterator<Item = Result<DecodedFrame, Gif2PdfError>> {
    decoder
        .into_frames()
        .enumerate()
        .map(|(index, frame)| match frame {
            Ok(frame) => {
                let delay_ms = delay_to_ms(frame.delay());
                Ok(DecodedFrame {
                    index,
                    buffer: frame.into_buffer(),
                    delay_ms,
                })
            }
            Err(e) => Err(Gif2PdfError::FrameDecodeFailed {
                frame: index,
                detail: e.to_string(),
            }),
        })
}

/// Count the frames of the GIF at `path` (a full decode pass).
pub fn count_frames(path: &Path) -> Result<usize, Gif2PdfError> {
    Ok(read_metadata(path)?.frame_count)
}

/// Read dimensions, frame count and total duration of the GIF at `path`.
pub fn read_metadata(path: &Path) -> Result<GifMetadata, Gif2PdfError> {
    let path = input::resolve_local(path)?;
    let file_size = std::fs::metadata(&path).map(|m| m.len()).unwrap_or(0);
    let decoder = input::open_decoder(&path)?;
    let (width, height) = screen_size(&decoder);

    let mut frame_count = 0usize;
    let mut total_duration_ms = 0u64;
    for frame in decode_frames(decoder) {
        let frame = frame?;
        frame_count += 1;
        total_duration_ms += frame.delay_ms;
    }

    debug!(
        "{}: {}x{} px, {} frames, {} ms",
        path.display(),
        width,
        height,
        frame_count,
        total_duration_ms
    );

    Ok(GifMetadata {
        width,
        height,
        frame_count,
        total_duration_ms,
        file_size,
    })
}

fn delay_to_ms(delay: Delay) -> u64 {
    let (numer, denom) = delay.numer_denom_ms();
    u64::from(numer) / u64::from(denom.max(1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::codecs::gif::GifEncoder;
    use image::{Frame, Rgba};

    fn write_gif(path: &Path, colours: &[[u8; 4]], w: u32, h: u32) {
        let mut bytes = Vec::new();
        {
            let mut encoder = GifEncoder::new(&mut bytes);
            for c in colours {
                let frame = Frame::from_parts(
                    RgbaImage::from_pixel(w, h, Rgba(*c)),
                    0,
                    0,
                    Delay::from_numer_denom_ms(100, 1),
                );
                encoder.encode_frame(frame).unwrap();
            }
        }
        std::fs::write(path, bytes).unwrap();
    }

    #[test]
    fn metadata_counts_frames_and_duration() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("three.gif");
        write_gif(
            &path,
            &[[255, 0, 0, 255], [0, 255, 0, 255], [0, 0, 255, 255]],
            12,
            7,
        );

        let meta = read_metadata(&path).unwrap();
        assert_eq!(meta.width, 12);
        assert_eq!(meta.height, 7);
        assert_eq!(meta.frame_count, 3);
        assert_eq!(meta.total_duration_ms, 300);
        assert!(meta.file_size > 0);
        assert_eq!(count_frames(&path).unwrap(), 3);
    }

    #[test]
    fn frames_are_screen_sized_and_ordered() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("two.gif");
        write_gif(&path, &[[255, 0, 0, 255], [0, 0, 255, 255]], 4, 4);

        let decoder = input::open_decoder(&path).unwrap();
        assert_eq!(screen_size(&decoder), (4, 4));
        let frames: Vec<DecodedFrame> = decode_frames(decoder).map(Result::unwrap).collect();
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].index, 0);
        assert_eq!(frames[1].index, 1);
        assert_eq!(frames[1].buffer.dimensions(), (4, 4));
        assert_eq!(frames[1].buffer.get_pixel(0, 0)[2], 255);
    }

    #[test]
    fn delay_conversion() {
        assert_eq!(delay_to_ms(Delay::from_numer_denom_ms(250, 1)), 250);
        assert_eq!(delay_to_ms(Delay::from_numer_denom_ms(0, 1)), 0);
    }
}
