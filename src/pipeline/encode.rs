//! Frame flattening and encoding: RGBA frame → opaque RGB → embeddable bytes.
//!
//! PDF image XObjects here carry no soft mask, so transparency is resolved
//! before encoding by compositing every pixel over the configured background.
//! JPEG output is stored verbatim behind `/DCTDecode`; lossless output is the
//! raw `DeviceRGB` sample buffer that the document stage flate-compresses.

use crate::config::FrameEncoding;
use crate::error::Gif2PdfError;
use image::codecs::jpeg::JpegEncoder;
use image::{Rgb, RgbImage, RgbaImage};
use tracing::debug;

/// Composite `frame` over `background`, dropping the alpha channel.
pub fn flatten(frame: &RgbaImage, background: [u8; 3]) -> RgbImage {
    RgbImage::from_fn(frame.width(), frame.height(), |x, y| {
        let [r, g, b, a] = frame.get_pixel(x, y).0;
        Rgb([
            blend(r, a, background[0]),
            blend(g, a, background[1]),
            blend(b, a, background[2]),
        ])
    })
}

fn blend(channel: u8, alpha: u8, background: u8) -> u8 {
    let a = u32::from(alpha);
    let v = u32::from(channel) * a + u32::from(background) * (255 - a);
    ((v + 127) / 255) as u8
}

/// Encode a flattened frame according to `encoding`.
///
/// `frame` is the 0-based frame index, used only for error reporting.
pub fn encode_frame(
    rgb: &RgbImage,
    encoding: FrameEncoding,
    frame: usize,
) -> Result<Vec<u8>, Gif2PdfError> {
    let bytes = match encoding {
        FrameEncoding::Jpeg { quality } => {
            let mut buf = Vec::new();
            JpegEncoder::new_with_quality(&mut buf, quality)
                .encode_image(rgb)
                .map_err(|e| Gif2PdfError::FrameEncodeFailed {
                    frame,
                    detail: e.to_string(),
                })?;
            buf
        }
        FrameEncoding::Lossless => rgb.as_raw().clone(),
    };
    debug!(
        "Encoded frame {} ({}x{}) → {} bytes",
        frame,
        rgb.width(),
        rgb.height(),
        bytes.len()
    );
    Ok(bytes)
}
