//! Input resolution: validate a user-supplied path and open it as a GIF.
//!
//! The magic bytes are checked up front so a renamed PNG or an empty file
//! fails with [`Gif2PdfError::NotAGif`] instead of an opaque decoder message.

use crate::error::Gif2PdfError;
use image::codecs::gif::GifDecoder;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Decoder type used throughout the pipeline.
pub type SourceDecoder = GifDecoder<BufReader<File>>;

/// Check if the path carries a `.gif` extension (case-insensitive).
pub fn has_gif_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("gif"))
}

/// Validate that `path` exists, is readable and starts with the GIF magic.
pub fn resolve_local(path: &Path) -> Result<PathBuf, Gif2PdfError> {
    let path = path.to_path_buf();

    if !path.exists() {
        return Err(Gif2PdfError::FileNotFound { path });
    }

    match File::open(&path) {
        Ok(mut f) => {
            let mut magic = [0u8; 4];
            if f.read_exact(&mut magic).is_ok() && &magic != b"GIF8" {
                return Err(Gif2PdfError::NotAGif { path, magic });
            }
        }
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            return Err(Gif2PdfError::PermissionDenied { path });
        }
        Err(_) => {
            return Err(Gif2PdfError::FileNotFound { path });
        }
    }

    debug!("Resolved local GIF: {}", path.display());
    Ok(path)
}

/// Open a validated GIF and parse its header.
pub fn open_decoder(path: &Path) -> Result<SourceDecoder, Gif2PdfError> {
    let file = File::open(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::PermissionDenied => Gif2PdfError::PermissionDenied {
            path: path.to_path_buf(),
        },
        _ => Gif2PdfError::FileNotFound {
            path: path.to_path_buf(),
        },
    })?;

    GifDecoder::new(BufReader::new(file)).map_err(|e| Gif2PdfError::CorruptGif {
        path: path.to_path_buf(),
        detail: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_has_gif_extension() {
        assert!(has_gif_extension(Path::new("a.gif")));
        assert!(has_gif_extension(Path::new("/x/y/B.GIF")));
        assert!(!has_gif_extension(Path::new("a.png")));
        assert!(!has_gif_extension(Path::new("gif")));
        assert!(!has_gif_extension(Path::new("")));
    }

    #[test]
    fn missing_file_is_not_found() {
        let err = resolve_local(Path::new("/definitely/not/a/real/file.gif")).unwrap_err();
        assert!(matches!(err, Gif2PdfError::FileNotFound { .. }));
    }

    #[test]
    fn wrong_magic_is_rejected() {
        let mut tmp = tempfile::Builder::new().suffix(".gif").tempfile().unwrap();
        tmp.write_all(b"%PDF-1.5 not a gif").unwrap();
        let err = resolve_local(tmp.path()).unwrap_err();
        match err {
            Gif2PdfError::NotAGif { magic, .. } => assert_eq!(&magic, b"%PDF"),
            other => panic!("expected NotAGif, got {other:?}"),
        }
    }

    #[test]
    fn truncated_gif_fails_to_open() {
        let mut tmp = tempfile::Builder::new().suffix(".gif").tempfile().unwrap();
        tmp.write_all(b"GIF89a").unwrap();
        let path = resolve_local(tmp.path()).expect("magic is fine");
        let err = open_decoder(&path)
            .err()
            .expect("a bare signature has no logical screen descriptor");
        assert!(matches!(err, Gif2PdfError::CorruptGif { .. }));
    }
}
