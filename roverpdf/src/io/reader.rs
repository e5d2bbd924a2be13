//! Opening rendered PDF bytes as a page source.
//!
//! A [`PageSource`] wraps a parsed `lopdf` document and exposes the pieces
//! the importer needs: the ordered page list, each page's size and
//! rotation, and the attributes a page inherits from its page-tree parents.
//!
//! # Examples
//!
//! ```no_run
//! use roverpdf::io::PageSource;
//!
//! # fn example(bytes: &[u8]) -> roverpdf::Result<()> {
//! let source = PageSource::open(bytes, "report.pdf")?;
//! for page in source.pages() {
//!     println!("{} x {} pts", page.width, page.height);
//! }
//! # Ok(())
//! # }
//! ```

use lopdf::{Document, Object, ObjectId};

use crate::error::{Result, RoverError};

/// Page attributes that may be inherited from a `/Pages` ancestor.
pub const INHERITABLE_KEYS: [&[u8]; 4] = [b"MediaBox", b"CropBox", b"Resources", b"Rotate"];

/// US Letter, used when a page has no MediaBox anywhere in its ancestry.
const DEFAULT_MEDIA_BOX: [f32; 4] = [0.0, 0.0, 612.0, 792.0];

/// Page orientation derived from the media box.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    /// Height is at least the width.
    Portrait,
    /// Width exceeds height.
    Landscape,
}

/// Geometry of one page in a source document.
#[derive(Debug, Clone, PartialEq)]
pub struct PageInfo {
    /// Object id of the page dictionary inside the source.
    pub id: ObjectId,
    /// Media box width in points.
    pub width: f32,
    /// Media box height in points.
    pub height: f32,
    /// Effective `/Rotate` value in degrees.
    pub rotation: i64,
}

impl PageInfo {
    /// Orientation of the unrotated media box.
    pub fn orientation(&self) -> Orientation {
        orientation_of(self.width, self.height)
    }

    /// `/Rotate` reduced to 0, 90, 180 or 270.
    pub fn normalized_rotation(&self) -> i64 {
        normalize_rotation(self.rotation)
    }

    /// Width and height as a viewer shows the page, after `/Rotate`.
    pub fn display_size(&self) -> (f32, f32) {
        match self.normalized_rotation() {
            90 | 270 => (self.height, self.width),
            _ => (self.width, self.height),
        }
    }

    /// Orientation as a viewer shows the page.
    pub fn display_orientation(&self) -> Orientation {
        let (width, height) = self.display_size();
        orientation_of(width, height)
    }
}

fn orientation_of(width: f32, height: f32) -> Orientation {
    if width > height {
        Orientation::Landscape
    } else {
        Orientation::Portrait
    }
}

/// Reduce any multiple of 90 to the range 0..360.
pub fn normalize_rotation(degrees: i64) -> i64 {
    degrees.rem_euclid(360) / 90 * 90
}

/// A parsed PDF ready to have its pages imported.
#[derive(Debug)]
pub struct PageSource {
    document: Document,
    origin: String,
}

impl PageSource {
    /// Parse `bytes` as a PDF.
    ///
    /// # Errors
    ///
    /// Returns [`RoverError::FailedToLoadPdf`] if the bytes are not a PDF
    /// lopdf can read, or if the document is still encrypted after loading.
    pub fn open(bytes: &[u8], origin: impl Into<String>) -> Result<Self> {
        let origin = origin.into();

        let document = Document::load_mem(bytes).map_err(|e| {
            let err_msg = e.to_string();
            if err_msg.contains("encrypt") || err_msg.contains("password") {
                RoverError::failed_to_load_pdf(&origin, format!("PDF is encrypted: {err_msg}"))
            } else {
                RoverError::failed_to_load_pdf(&origin, err_msg)
            }
        })?;

        if document.is_encrypted() {
            return Err(RoverError::failed_to_load_pdf(
                origin,
                "PDF is encrypted and cannot be imported",
            ));
        }

        Ok(Self { document, origin })
    }

    /// Description of where the bytes came from.
    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// Number of pages.
    pub fn page_count(&self) -> usize {
        self.document.get_pages().len()
    }

    /// Pages in document order.
    pub fn pages(&self) -> Vec<PageInfo> {
        self.document
            .get_pages()
            .into_values()
            .map(|id| page_info(&self.document, id))
            .collect()
    }

    /// Borrow the parsed document.
    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Take the parsed document.
    pub fn into_document(self) -> Document {
        self.document
    }
}

/// Size and rotation of a page, honouring inherited attributes.
pub fn page_info(doc: &Document, page_id: ObjectId) -> PageInfo {
    let [llx, lly, urx, ury] = effective_media_box(doc, page_id).unwrap_or(DEFAULT_MEDIA_BOX);
    let rotation = inherited_attribute(doc, page_id, b"Rotate")
        .and_then(|obj| obj.as_i64().ok())
        .unwrap_or(0);

    PageInfo {
        id: page_id,
        width: (urx - llx).abs(),
        height: (ury - lly).abs(),
        rotation,
    }
}

/// The page's media box, looked up through the parent chain.
pub fn effective_media_box(doc: &Document, page_id: ObjectId) -> Option<[f32; 4]> {
    let media_box = inherited_attribute(doc, page_id, b"MediaBox")?;
    let array = resolve(doc, &media_box).as_array().ok()?;
    if array.len() != 4 {
        return None;
    }

    let mut rect = [0.0; 4];
    for (slot, value) in rect.iter_mut().zip(array) {
        *slot = resolve(doc, value).as_float().ok()?;
    }
    Some(rect)
}

/// Find `key` on the page or the nearest `/Pages` ancestor that has it.
///
/// Ancestor lookup stops after a bounded number of hops so that a cyclic
/// `/Parent` chain in a damaged file cannot loop forever.
pub fn inherited_attribute(doc: &Document, page_id: ObjectId, key: &[u8]) -> Option<Object> {
    const MAX_DEPTH: usize = 64;

    let mut current = doc.get_object(page_id).ok()?.as_dict().ok()?;
    for _ in 0..MAX_DEPTH {
        if let Ok(value) = current.get(key) {
            return Some(value.clone());
        }
        let parent_id = current.get(b"Parent").and_then(Object::as_reference).ok()?;
        current = doc.get_object(parent_id).ok()?.as_dict().ok()?;
    }
    None
}

/// Follow a single level of indirection.
fn resolve<'a>(doc: &'a Document, obj: &'a Object) -> &'a Object {
    match obj {
        Object::Reference(id) => doc.get_object(*id).unwrap_or(obj),
        _ => obj,
    }
}
