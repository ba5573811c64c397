//! PDF assembly with `lopdf`: one full-bleed image page per frame.
//!
//! Every page has the same MediaBox, `[0 0 width height]`, one PDF point per
//! source pixel. Its content stream is
//!
//! ```text
//! q width 0 0 height 0 0 cm /Im0 Do Q
//! ```
//!
//! which scales the unit-square image XObject to cover the whole page with
//! its origin at (0, 0). A frame of a different pixel size is therefore
//! stretched to the page, never cropped.

use crate::config::FrameEncoding;
use crate::error::Gif2PdfError;
use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use std::io::Write;
use std::path::Path;
use tracing::debug;

/// Resource name of the page image in every page's `/XObject` dictionary.
pub const IMAGE_NAME: &str = "Im0";

/// Text for the document Info dictionary.
#[derive(Debug, Clone, Default)]
pub struct DocumentInfo {
    pub title: Option<String>,
    pub producer: String,
    pub creator: String,
}

impl DocumentInfo {
    /// Info for a document converted from `source`: the file stem is the title.
    pub fn for_source(source: &Path) -> Self {
        Self {
            title: source
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned()),
            producer: format!("gif2pdf {}", env!("CARGO_PKG_VERSION")),
            creator: "gif2pdf".to_string(),
        }
    }
}

/// An encoded frame ready to be drawn onto a page.
#[derive(Debug, Clone)]
pub struct PageImage {
    /// Pixel width of the encoded raster.
    pub width: u32,
    /// Pixel height of the encoded raster.
    pub height: u32,
    pub encoding: FrameEncoding,
    pub data: Vec<u8>,
}

/// Incrementally builds a document of equally-sized image pages.
pub struct PdfBuilder {
    doc: Document,
    pages_id: ObjectId,
    kids: Vec<Object>,
    page_width: u32,
    page_height: u32,
    image_bytes: u64,
}

impl PdfBuilder {
    /// Start an empty document whose pages are `page_width × page_height` points.
    pub fn new(page_width: u32, page_height: u32) -> Self {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        Self {
            doc,
            pages_id,
            kids: Vec::new(),
            page_width,
            page_height,
            image_bytes: 0,
        }
    }

    pub fn page_count(&self) -> usize {
        self.kids.len()
    }

    /// Total size of the image payloads added so far.
    pub fn image_bytes(&self) -> u64 {
        self.image_bytes
    }

    /// Append a page whose only content is `image`, drawn over the full page.
    pub fn add_image_page(&mut self, image: PageImage) -> Result<ObjectId, Gif2PdfError> {
        let page_index = self.kids.len();
        self.image_bytes += image.data.len() as u64;

        let image_id = self.doc.add_object(image_stream(image));

        let w = i64::from(self.page_width);
        let h = i64::from(self.page_height);
        let content = Content {
            operations: vec![
                Operation::new("q", vec![]),
                Operation::new(
                    "cm",
                    vec![
                        Object::Integer(w),
                        Object::Integer(0),
                        Object::Integer(0),
                        Object::Integer(h),
                        Object::Integer(0),
                        Object::Integer(0),
                    ],
                ),
                Operation::new("Do", vec![Object::Name(IMAGE_NAME.as_bytes().to_vec())]),
                Operation::new("Q", vec![]),
            ],
        };
        let encoded = content.encode().map_err(|e| Gif2PdfError::Internal(format!(
            "content stream for page {}: {e}",
            page_index + 1
        )))?;
        let content_id = self.doc.add_object(Stream::new(Dictionary::new(), encoded));

        let mut xobjects = Dictionary::new();
        xobjects.set(IMAGE_NAME, Object::Reference(image_id));
        let mut resources = Dictionary::new();
        resources.set("XObject", Object::Dictionary(xobjects));

        let mut page = Dictionary::new();
        page.set("Type", Object::Name(b"Page".to_vec()));
        page.set("Parent", Object::Reference(self.pages_id));
        page.set(
            "MediaBox",
            Object::Array(vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Integer(w),
                Object::Integer(h),
            ]),
        );
        page.set("Contents", Object::Reference(content_id));
        page.set("Resources", Object::Dictionary(resources));

        let page_id = self.doc.add_object(page);
        self.kids.push(Object::Reference(page_id));
        debug!("Committed page {} ({} x {} pt)", page_index + 1, w, h);
        Ok(page_id)
    }

    /// Close the page tree and catalog, returning the finished document.
    pub fn finish(self, info: Option<&DocumentInfo>) -> Document {
        let mut doc = self.doc;

        let mut pages = Dictionary::new();
        pages.set("Type", Object::Name(b"Pages".to_vec()));
        pages.set("Count", Object::Integer(self.kids.len() as i64));
        pages.set("Kids", Object::Array(self.kids));
        doc.objects.insert(self.pages_id, Object::Dictionary(pages));

        let mut catalog = Dictionary::new();
        catalog.set("Type", Object::Name(b"Catalog".to_vec()));
        catalog.set("Pages", Object::Reference(self.pages_id));
        let catalog_id = doc.add_object(catalog);
        doc.trailer.set("Root", Object::Reference(catalog_id));

        if let Some(info) = info {
            let mut dict = Dictionary::new();
            if let Some(ref title) = info.title {
                dict.set("Title", Object::string_literal(title.as_str()));
            }
            dict.set("Producer", Object::string_literal(info.producer.as_str()));
            dict.set("Creator", Object::string_literal(info.creator.as_str()));
            let info_id = doc.add_object(dict);
            doc.trailer.set("Info", Object::Reference(info_id));
        }

        doc.compress();
        doc
    }

    /// Finish the document and serialise it into `writer`.
    ///
    /// `path` is only used to label errors.
    pub fn write_to<W: Write>(
        self,
        info: Option<&DocumentInfo>,
        writer: &mut W,
        path: &Path,
    ) -> Result<(), Gif2PdfError> {
        let mut doc = self.finish(info);
        doc.save_to(writer).map_err(|e| Gif2PdfError::PdfWriteFailed {
            path: path.to_path_buf(),
            detail: e.to_string(),
        })?;
        Ok(())
    }
}

fn image_stream(image: PageImage) -> Stream {
    let mut dict = Dictionary::new();
    dict.set("Type", Object::Name(b"XObject".to_vec()));
    dict.set("Subtype", Object::Name(b"Image".to_vec()));
    dict.set("Width", Object::Integer(i64::from(image.width)));
    dict.set("Height", Object::Integer(i64::from(image.height)));
    dict.set("ColorSpace", Object::Name(b"DeviceRGB".to_vec()));
    dict.set("BitsPerComponent", Object::Integer(8));

    match image.encoding {
        FrameEncoding::Jpeg { .. } => {
            dict.set("Filter", Object::Name(b"DCTDecode".to_vec()));
            Stream::new(dict, image.data).with_compression(false)
        }
        // flate-compressed by Document::compress in finish()
        FrameEncoding::Lossless => Stream::new(dict, image.data),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid_page(w: u32, h: u32, rgb: [u8; 3]) -> PageImage {
        PageImage {
            width: w,
            height: h,
            encoding: FrameEncoding::Lossless,
            data: rgb.repeat((w * h) as usize),
        }
    }

    #[test]
    fn builds_one_page_per_image() {
        let mut b = PdfBuilder::new(10, 8);
        b.add_image_page(solid_page(10, 8, [255, 0, 0])).unwrap();
        b.add_image_page(solid_page(10, 8, [0, 255, 0])).unwrap();
        assert_eq!(b.page_count(), 2);
        assert_eq!(b.image_bytes(), 2 * 10 * 8 * 3);

        let doc = b.finish(None);
        assert_eq!(doc.get_pages().len(), 2);
    }

    #[test]
    fn pages_carry_media_box_and_image() {
        let mut b = PdfBuilder::new(100, 80);
        b.add_image_page(solid_page(100, 80, [1, 2, 3])).unwrap();
        let doc = b.finish(Some(&DocumentInfo::for_source(Path::new("/x/anim.gif"))));

        let (_, page_id) = doc.get_pages().into_iter().next().unwrap();
        let page = doc.get_object(page_id).unwrap().as_dict().unwrap();
        let media_box: Vec<i64> = page
            .get(b"MediaBox")
            .unwrap()
            .as_array()
            .unwrap()
            .iter()
            .map(|o| o.as_i64().unwrap())
            .collect();
        assert_eq!(media_box, vec![0, 0, 100, 80]);

        let xobjects = page
            .get(b"Resources")
            .unwrap()
            .as_dict()
            .unwrap()
            .get(b"XObject")
            .unwrap()
            .as_dict()
            .unwrap();
        let image_id = xobjects.get(IMAGE_NAME.as_bytes()).unwrap().as_reference().unwrap();
        let image = doc.get_object(image_id).unwrap().as_stream().unwrap();
        assert_eq!(image.dict.get(b"Width").unwrap().as_i64().unwrap(), 100);
        assert_eq!(image.dict.get(b"Height").unwrap().as_i64().unwrap(), 80);
    }

    #[test]
    fn info_title_is_source_stem() {
        let info = DocumentInfo::for_source(Path::new("/tmp/cat dance.gif"));
        assert_eq!(info.title.as_deref(), Some("cat dance"));
        assert!(info.producer.starts_with("gif2pdf "));
    }

    #[test]
    fn serialised_document_starts_with_header() {
        let mut b = PdfBuilder::new(2, 2);
        b.add_image_page(solid_page(2, 2, [9, 9, 9])).unwrap();
        let mut out = Vec::new();
        b.write_to(None, &mut out, Path::new("mem.pdf")).unwrap();
        assert!(out.starts_with(b"%PDF-1.5"));
        let reloaded = Document::load_mem(&out).unwrap();
        assert_eq!(reloaded.get_pages().len(), 1);
    }
}
