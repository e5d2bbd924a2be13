//! "Page X of Y" stamping.
//!
//! Runs once over the finished page list. Each stamped page gets its
//! existing content wrapped in `q`/`Q` so the label is drawn in a clean
//! graphics state, and a font entry added to a private copy of its
//! resources. The label is placed in display space (after `/Rotate`), so it
//! sits at the bottom right of the page as a viewer shows it.

use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream, StringFormat, dictionary};

use crate::error::{Result, RoverError};
use crate::fonts::{FontFace, FontSet};
use crate::io::reader::{effective_media_box, page_info};

/// Distance of the label box from the left, right and bottom page edges.
pub const LABEL_INSET: f32 = 25.0;

/// Resource name of the label font on stamped pages.
const FONT_RESOURCE: &str = "RvPgNum";

/// Text of the label for 0-based page `index` of `total`.
pub fn page_label(index: usize, total: usize) -> String {
    format!("Page {} of {}", index + 1, total)
}

/// Stamps page numbers using one face from a [`FontSet`].
#[derive(Debug, Clone)]
pub struct PageNumberOverlay<'a> {
    face: &'a FontFace,
    size: f32,
}

impl<'a> PageNumberOverlay<'a> {
    /// Create an overlay drawing with `font` at `size` points.
    ///
    /// # Errors
    ///
    /// Returns [`RoverError::InvalidConfig`] if `font` is not in `fonts`.
    pub fn new(fonts: &'a FontSet, font: &str, size: f32) -> Result<Self> {
        let face = fonts
            .get(font)
            .ok_or_else(|| RoverError::invalid_config(format!("Unknown page number font: {font}")))?;
        Ok(Self { face, size })
    }

    /// Stamp pages `first_page_number..=page_ids.len()` (1-based).
    ///
    /// Pages before `first_page_number` are left untouched, but the label
    /// always counts from the first page of the document. Returns the number
    /// of pages stamped.
    ///
    /// # Errors
    ///
    /// Returns [`RoverError::PageNumberFailed`] for the first page that
    /// cannot be stamped. Pages stamped before it keep their label.
    pub fn apply(
        &self,
        doc: &mut Document,
        page_ids: &[ObjectId],
        first_page_number: u32,
    ) -> Result<usize> {
        let total = page_ids.len();
        let start = (first_page_number.max(1) - 1) as usize;
        if start >= total {
            return Ok(0);
        }

        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => self.face.base_font(),
            "Encoding" => "WinAnsiEncoding",
        });

        for (index, &page_id) in page_ids.iter().enumerate().skip(start) {
            let label = page_label(index, total);
            self.stamp(doc, page_id, font_id, &label)
                .map_err(|e| RoverError::page_number_failed(index + 1, e.to_string()))?;
        }

        let stamped = total - start;
        tracing::debug!(stamped, total, "Stamped page numbers");
        Ok(stamped)
    }

    fn stamp(&self, doc: &mut Document, page_id: ObjectId, font_id: ObjectId, label: &str) -> lopdf::Result<()> {
        let info = page_info(doc, page_id);
        let [llx, lly, _, _] = effective_media_box(doc, page_id).unwrap_or([0.0, 0.0, 0.0, 0.0]);
        let (display_width, _) = info.display_size();

        let line_height = self.face.line_height(self.size);
        let text_width = self.face.text_width(label, self.size);
        let box_right = display_width - LABEL_INSET;
        let x = box_right - text_width;
        let glyph_middle = f32::from(self.face.ascent() + self.face.descent()) * self.size / 2000.0;
        let y = LABEL_INSET + line_height / 2.0 - glyph_middle;

        let matrix = display_to_user(info.normalized_rotation(), info.width, info.height, llx, lly);

        let mut operations = vec![Operation::new("Q", vec![]), Operation::new("q", vec![])];
        operations.push(Operation::new("cm", matrix.iter().map(|&v| v.into()).collect()));
        operations.extend([
            Operation::new("BT", vec![]),
            Operation::new(
                "Tf",
                vec![Object::Name(FONT_RESOURCE.as_bytes().to_vec()), self.size.into()],
            ),
            Operation::new("Td", vec![x.into(), y.into()]),
            Operation::new(
                "Tj",
                vec![Object::String(label.as_bytes().to_vec(), StringFormat::Literal)],
            ),
            Operation::new("ET", vec![]),
            Operation::new("Q", vec![]),
        ]);
        let overlay = Content { operations }.encode()?;

        let save_id = doc.add_object(Stream::new(Dictionary::new(), b"q\n".to_vec()));
        let overlay_id = doc.add_object(Stream::new(Dictionary::new(), overlay));

        let resources = page_resources_with_font(doc, page_id, font_id)?;
        let mut contents = vec![Object::Reference(save_id)];
        contents.extend(existing_contents(doc, page_id));
        contents.push(Object::Reference(overlay_id));

        let page = doc.get_object_mut(page_id)?.as_dict_mut()?;

        page.set("Contents", Object::Array(contents));
        page.set("Resources", Object::Dictionary(resources));
        Ok(())
    }
}

/// Matrix mapping display coordinates (origin at the bottom left of the page
/// as shown) to the page's user space.
pub fn display_to_user(rotation: i64, width: f32, height: f32, llx: f32, lly: f32) -> [f32; 6] {
    match rotation {
        90 => [0.0, 1.0, -1.0, 0.0, llx + width, lly],
        180 => [-1.0, 0.0, 0.0, -1.0, llx + width, lly + height],
        270 => [0.0, -1.0, 1.0, 0.0, llx, lly + height],
        _ => [1.0, 0.0, 0.0, 1.0, llx, lly],
    }
}

/// The page's content stream references, in drawing order.
///
/// `Contents` may be a stream reference, an array of them, or a reference to
/// such an array.
fn existing_contents(doc: &Document, page_id: ObjectId) -> Vec<Object> {
    let Ok(contents) = doc.get_dictionary(page_id).and_then(|page| page.get(b"Contents")) else {
        return Vec::new();
    };
    match contents {
        Object::Array(streams) => streams.clone(),
        Object::Reference(id) => match doc.get_object(*id) {
            Ok(Object::Array(streams)) => streams.clone(),
            Ok(Object::Stream(_)) => vec![contents.clone()],
            _ => Vec::new(),
        },
        _ => Vec::new(),
    }
}

/// Owned copy of the page's resources with the label font registered.
///
/// Resources may be shared between pages; the copy keeps other pages'
/// dictionaries unchanged.
fn page_resources_with_font(doc: &Document, page_id: ObjectId, font_id: ObjectId) -> lopdf::Result<Dictionary> {
    let page = doc.get_dictionary(page_id)?;
    let mut resources = page
        .get(b"Resources")
        .ok()
        .and_then(|obj| owned_dict(doc, obj))
        .unwrap_or_default();

    let mut fonts = resources
        .get(b"Font")
        .ok()
        .and_then(|obj| owned_dict(doc, obj))
        .unwrap_or_default();
    fonts.set(FONT_RESOURCE, Object::Reference(font_id));
    resources.set("Font", Object::Dictionary(fonts));

    Ok(resources)
}

fn owned_dict(doc: &Document, obj: &Object) -> Option<Dictionary> {
    match obj {
        Object::Dictionary(dict) => Some(dict.clone()),
        Object::Reference(id) => doc.get_dictionary(*id).ok().cloned(),
        _ => None,
    }
}
