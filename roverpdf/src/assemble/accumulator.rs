//! The output document while it is being assembled.

use lopdf::{Document, Object, ObjectId, dictionary};
use std::collections::BTreeMap;

use crate::error::{Result, RoverError};

/// An append-only PDF under construction.
///
/// Holds a catalog and a single flat `/Pages` node. Imported pages are
/// appended to its `Kids` in the order they arrive and are never moved or
/// removed afterwards.
#[derive(Debug)]
pub struct OutputAccumulator {
    document: Document,
    catalog_id: ObjectId,
    pages_id: ObjectId,
    page_ids: Vec<ObjectId>,
}

impl OutputAccumulator {
    /// Create an accumulator with an empty page tree.
    pub fn new() -> Self {
        let mut document = Document::with_version("1.7");

        let pages_id = document.add_object(dictionary! {
            "Type" => "Pages",
            "Kids" => Vec::<Object>::new(),
            "Count" => 0,
        });
        let catalog_id = document.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        document.trailer.set("Root", catalog_id);

        Self {
            document,
            catalog_id,
            pages_id,
            page_ids: Vec::new(),
        }
    }

    /// Pages appended so far.
    pub fn page_count(&self) -> usize {
        self.page_ids.len()
    }

    /// Page object ids in output order.
    pub fn page_ids(&self) -> &[ObjectId] {
        &self.page_ids
    }

    /// Id of the output `/Pages` node.
    pub fn pages_id(&self) -> ObjectId {
        self.pages_id
    }

    /// Id of the output catalog.
    pub fn catalog_id(&self) -> ObjectId {
        self.catalog_id
    }

    /// Highest object id in use.
    pub fn max_id(&self) -> u32 {
        self.document.max_id
    }

    /// Borrow the document.
    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Mutably borrow the document.
    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.document
    }

    /// Move a batch of already renumbered objects in and append `page_ids`.
    ///
    /// Object ids must not collide with ids already present; the importer
    /// guarantees this by renumbering above [`max_id`](Self::max_id).
    pub(crate) fn absorb(
        &mut self,
        objects: BTreeMap<ObjectId, Object>,
        page_ids: &[ObjectId],
        max_id: u32,
    ) -> Result<()> {
        self.document.objects.extend(objects);
        self.document.max_id = self.document.max_id.max(max_id);

        let pages = self
            .document
            .get_object_mut(self.pages_id)
            .and_then(Object::as_dict_mut)
            .map_err(|e| RoverError::other(format!("Output page tree is broken: {e}")))?;

        let kids = pages
            .get_mut(b"Kids")
            .and_then(Object::as_array_mut)
            .map_err(|_| RoverError::other("Output Pages dictionary missing Kids array"))?;
        kids.extend(page_ids.iter().copied().map(Object::Reference));

        self.page_ids.extend_from_slice(page_ids);
        pages.set("Count", self.page_ids.len() as i64);

        Ok(())
    }

    /// Take the finished document.
    pub fn into_document(self) -> Document {
        self.document
    }
}

impl Default for OutputAccumulator {
    fn default() -> Self {
        Self::new()
    }
}
