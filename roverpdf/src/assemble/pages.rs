//! Importing pages from a page source into the output.
//!
//! Each source is imported whole: its pages are made self-contained (no
//! attribute left to inherit from a page-tree node that will not be
//! copied), landscape pages are turned to portrait with `/Rotate`, object
//! ids are moved above everything already in the output, and the pages are
//! appended in source order.

use lopdf::{Document, Object, ObjectId};
use std::collections::BTreeSet;

use crate::assemble::accumulator::OutputAccumulator;
use crate::error::{Result, RoverError};
use crate::io::PageSource;
use crate::io::reader::{INHERITABLE_KEYS, Orientation, inherited_attribute, page_info};

/// `/Rotate` given to pages whose media box is wider than tall.
pub const LANDSCAPE_ROTATION: i64 = 90;

/// Output position of the pages one source contributed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportedRange {
    /// 0-based output index of the first appended page.
    pub first_index: usize,
    /// Number of pages appended.
    pub count: usize,
}

impl ImportedRange {
    /// Index of the first appended page, if any page was appended.
    pub fn first_page(&self) -> Option<usize> {
        (self.count > 0).then_some(self.first_index)
    }
}

/// Copies pages from a [`PageSource`] into an [`OutputAccumulator`].
#[derive(Debug, Clone, Copy, Default)]
pub struct PageImporter;

impl PageImporter {
    /// Create an importer.
    pub fn new() -> Self {
        Self
    }

    /// Append every page of `source` to `output`.
    ///
    /// A source without pages appends nothing and is not an error.
    ///
    /// # Errors
    ///
    /// Returns [`RoverError::FailedToLoadPdf`] if the source's object graph
    /// is too damaged to copy. Nothing is appended in that case.
    pub fn import(&self, source: PageSource, output: &mut OutputAccumulator) -> Result<ImportedRange> {
        let first_index = output.page_count();
        let origin = source.origin().to_string();
        let mut doc = source.into_document();

        let source_pages: Vec<ObjectId> = doc.get_pages().into_values().collect();
        if source_pages.is_empty() {
            tracing::debug!(origin = %origin, "Source has no pages");
            return Ok(ImportedRange {
                first_index,
                count: 0,
            });
        }

        for &page_id in &source_pages {
            prepare_page(&mut doc, page_id)
                .map_err(|e| RoverError::failed_to_load_pdf(&origin, e.to_string()))?;
        }

        doc.renumber_objects_with(output.max_id() + 1);
        let page_ids: Vec<ObjectId> = doc.get_pages().into_values().collect();

        drop_document_structure(&mut doc);
        for &page_id in &page_ids {
            let page = doc
                .get_object_mut(page_id)
                .and_then(Object::as_dict_mut)
                .map_err(|e| RoverError::failed_to_load_pdf(&origin, e.to_string()))?;
            page.set("Parent", output.pages_id());
        }

        let count = page_ids.len();
        output.absorb(doc.objects, &page_ids, doc.max_id)?;

        tracing::debug!(
            origin = %origin,
            first_index,
            pages = count,
            "Imported pages"
        );

        Ok(ImportedRange { first_index, count })
    }
}

/// Copy inherited attributes onto the page and turn landscape pages.
fn prepare_page(doc: &mut Document, page_id: ObjectId) -> lopdf::Result<()> {
    let inherited: Vec<(&[u8], Object)> = INHERITABLE_KEYS
        .iter()
        .filter_map(|key| inherited_attribute(doc, page_id, key).map(|value| (*key, value)))
        .collect();
    let info = page_info(doc, page_id);

    let page = doc.get_object_mut(page_id)?.as_dict_mut()?;
    for (key, value) in inherited {
        if !page.has(key) {
            page.set(key, value);
        }
    }

    if info.orientation() == Orientation::Landscape {
        page.set("Rotate", LANDSCAPE_ROTATION);
    }

    Ok(())
}

/// Remove the source catalog and page-tree nodes.
///
/// Pages are re-parented under the output tree, so these nodes would only
/// drag the source's outline, forms and other catalog entries along.
fn drop_document_structure(doc: &mut Document) {
    let mut structural: BTreeSet<ObjectId> = doc
        .objects
        .iter()
        .filter(|(_, object)| {
            object
                .as_dict()
                .and_then(|dict| dict.get(b"Type"))
                .and_then(Object::as_name)
                .is_ok_and(|name| name == b"Pages" || name == b"Catalog")
        })
        .map(|(id, _)| *id)
        .collect();

    if let Ok(root) = doc.trailer.get(b"Root").and_then(Object::as_reference) {
        structural.insert(root);
    }

    for id in structural {
        doc.objects.remove(&id);
    }
}
