//! Pipeline stages for GIF-to-PDF conversion.
//!
//! Each submodule implements exactly one transformation step so it can be
//! tested on its own.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ frames ──▶ encode ──▶ stage ──▶ document
//! (path)    (decode)   (RGB/JPEG) (tmp file) (lopdf page)
//! ```
//!
//! 1. [`input`]    — validate the path and GIF magic, open the decoder
//! 2. [`frames`]   — iterate composited RGBA frames in order
//! 3. [`encode`]   — flatten over the background, encode JPEG or raw RGB
//! 4. [`stage`]    — scoped temporary file per frame, deleted on drop
//! 5. [`document`] — append one full-bleed image page per frame, write PDF

pub mod document;
pub mod encode;
pub mod frames;
pub mod input;
pub mod stage;
