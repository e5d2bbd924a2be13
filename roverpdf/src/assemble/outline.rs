//! Bookmark tree construction.
//!
//! Bookmarks are collected in an in-memory [`OutlineTree`] while entries
//! are imported and written into the PDF once, at the end.
//!
//! Nesting follows the "+" convention. A title without a leading `+`
//! becomes a top-level bookmark and the new current scope. A title with a
//! leading `+` becomes a child of the current scope (or top-level when no
//! scope has been opened yet) and leaves the scope where it is, so runs of
//! `+` titles end up as siblings:
//!
//! ```text
//! A      ->  A
//! +B     ->  A / B
//! +C     ->  A / C
//! D      ->  D
//! +E     ->  D / E
//! ```

use lopdf::{Dictionary, Document, Object, ObjectId, StringFormat};
use serde::Serialize;

use crate::error::{Result, RoverError};

/// Prefix marking a bookmark as a child of the current scope.
pub const NESTED_PREFIX: char = '+';

/// Index of a node in an [`OutlineTree`].
pub type NodeId = usize;

/// Where "+" bookmarks are attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutlineScope {
    /// Top level of the outline.
    #[default]
    Root,
    /// Children of the given node.
    Node(NodeId),
}

/// One bookmark in the tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutlineNode {
    title: String,
    page_index: usize,
    children: Vec<NodeId>,
}

impl OutlineNode {
    /// Displayed title.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// 0-based output page the bookmark points to.
    pub fn page_index(&self) -> usize {
        self.page_index
    }

    /// Child nodes in creation order.
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }
}

/// Flat description of a created bookmark, returned to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BookmarkRecord {
    /// 1-based output page number.
    pub page: usize,
    /// Title as registered, including any leading `+`.
    pub title: String,
}

/// Append-only bookmark tree.
#[derive(Debug, Clone, Default)]
pub struct OutlineTree {
    nodes: Vec<OutlineNode>,
    roots: Vec<NodeId>,
}

impl OutlineTree {
    /// Empty tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// True when no bookmark has been added.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Total number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Top-level nodes in creation order.
    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    /// Look up a node.
    pub fn node(&self, id: NodeId) -> Option<&OutlineNode> {
        self.nodes.get(id)
    }

    /// Add a bookmark for `title` pointing at `page_index`, moving `scope`
    /// according to the "+" convention.
    pub fn add_bookmark(
        &mut self,
        scope: &mut OutlineScope,
        title: &str,
        page_index: usize,
    ) -> BookmarkRecord {
        match title.strip_prefix(NESTED_PREFIX) {
            Some(stripped) => {
                self.push_node(*scope, stripped, page_index);
            }
            None => {
                let id = self.push_node(OutlineScope::Root, title, page_index);
                *scope = OutlineScope::Node(id);
            }
        }

        BookmarkRecord {
            page: page_index + 1,
            title: title.to_string(),
        }
    }

    fn push_node(&mut self, parent: OutlineScope, title: &str, page_index: usize) -> NodeId {
        let id = self.nodes.len();
        self.nodes.push(OutlineNode {
            title: title.to_string(),
            page_index,
            children: Vec::new(),
        });
        match parent {
            OutlineScope::Root => self.roots.push(id),
            OutlineScope::Node(parent) => self.nodes[parent].children.push(id),
        }
        id
    }

    /// Write the tree as the document outline.
    ///
    /// `page_ids` maps output page indices to page objects. Every node is
    /// written open. Returns the id of the `/Outlines` dictionary, or `None`
    /// for an empty tree.
    ///
    /// # Errors
    ///
    /// Returns an error if a node points past the end of `page_ids` or the
    /// document has no catalog.
    pub fn write_to(&self, doc: &mut Document, page_ids: &[ObjectId]) -> Result<Option<ObjectId>> {
        if self.is_empty() {
            return Ok(None);
        }

        let outline_id = doc.new_object_id();
        let object_ids: Vec<ObjectId> = self.nodes.iter().map(|_| doc.new_object_id()).collect();

        let ctx = WriteContext {
            page_ids,
            object_ids: &object_ids,
        };
        self.write_level(doc, &ctx, outline_id, &self.roots)?;

        let mut outline_dict = Dictionary::new();
        outline_dict.set("Type", Object::Name(b"Outlines".to_vec()));
        outline_dict.set("Count", self.nodes.len() as i64);
        link_children(&mut outline_dict, &ctx, &self.roots);
        doc.objects.insert(outline_id, Object::Dictionary(outline_dict));

        let catalog = doc
            .catalog_mut()
            .map_err(|e| RoverError::other(format!("Failed to get catalog: {e}")))?;
        catalog.set("Outlines", Object::Reference(outline_id));
        catalog.set("PageMode", Object::Name(b"UseOutlines".to_vec()));

        Ok(Some(outline_id))
    }

    fn write_level(
        &self,
        doc: &mut Document,
        ctx: &WriteContext<'_>,
        parent_id: ObjectId,
        level: &[NodeId],
    ) -> Result<()> {
        for (position, &node_id) in level.iter().enumerate() {
            let node = &self.nodes[node_id];
            let page_id = ctx.page_ids.get(node.page_index).copied().ok_or_else(|| {
                RoverError::other(format!(
                    "Bookmark '{}' points to page {} of {}",
                    node.title,
                    node.page_index + 1,
                    ctx.page_ids.len()
                ))
            })?;

            let mut item = Dictionary::new();
            item.set("Title", pdf_text_string(&node.title));
            item.set("Parent", Object::Reference(parent_id));
            item.set(
                "Dest",
                Object::Array(vec![
                    Object::Reference(page_id),
                    Object::Name(b"XYZ".to_vec()),
                    Object::Null,
                    Object::Null,
                    Object::Null,
                ]),
            );
            if position > 0 {
                item.set("Prev", Object::Reference(ctx.object_ids[level[position - 1]]));
            }
            if let Some(&next) = level.get(position + 1) {
                item.set("Next", Object::Reference(ctx.object_ids[next]));
            }
            if !node.children.is_empty() {
                item.set("Count", self.descendants(node_id) as i64);
                link_children(&mut item, ctx, &node.children);
            }

            let item_id = ctx.object_ids[node_id];
            doc.objects.insert(item_id, Object::Dictionary(item));
            self.write_level(doc, ctx, item_id, &node.children)?;
        }
        Ok(())
    }

    fn descendants(&self, node_id: NodeId) -> usize {
        self.nodes[node_id]
            .children
            .iter()
            .map(|&child| 1 + self.descendants(child))
            .sum()
    }
}

struct WriteContext<'a> {
    page_ids: &'a [ObjectId],
    object_ids: &'a [ObjectId],
}

fn link_children(dict: &mut Dictionary, ctx: &WriteContext<'_>, children: &[NodeId]) {
    if let (Some(&first), Some(&last)) = (children.first(), children.last()) {
        dict.set("First", Object::Reference(ctx.object_ids[first]));
        dict.set("Last", Object::Reference(ctx.object_ids[last]));
    }
}

/// Encode a title as a PDF text string.
///
/// ASCII titles are written as literal strings; anything else as UTF-16BE
/// with a byte order mark.
pub fn pdf_text_string(text: &str) -> Object {
    if text.is_ascii() {
        Object::String(text.as_bytes().to_vec(), StringFormat::Literal)
    } else {
        let mut bytes = vec![0xFE, 0xFF];
        bytes.extend(text.encode_utf16().flat_map(u16::to_be_bytes));
        Object::String(bytes, StringFormat::Hexadecimal)
    }
}
