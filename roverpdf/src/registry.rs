//! Ordered registry of source documents.
//!
//! The registry only records *what* to assemble. Nothing here renders or
//! opens a document; an entry made from inline bytes is accepted as-is and
//! only checked when the assembly runs. File entries pass admission first:
//! the MIME type must be on the allow-list and the file must exist.

use bytes::Bytes;
use std::path::{Path, PathBuf};

use crate::error::{Result, RoverError};
use crate::mime::MimeType;

/// Where an entry's content comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentOrigin {
    /// A PDF already held in memory.
    InlineBytes(Bytes),
    /// A file on disk with its declared type.
    FileReference {
        /// Path to the file.
        path: PathBuf,
        /// Declared (and admitted) MIME type.
        mime: MimeType,
    },
}

impl DocumentOrigin {
    /// Short human readable description used in diagnostics.
    pub fn describe(&self) -> String {
        match self {
            Self::InlineBytes(bytes) => format!("inline bytes ({} bytes)", bytes.len()),
            Self::FileReference { path, .. } => path.display().to_string(),
        }
    }
}

/// One registered source plus its optional bookmark title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentEntry {
    origin: DocumentOrigin,
    bookmark_title: Option<String>,
}

impl DocumentEntry {
    /// Create an entry. The origin cannot be changed afterwards.
    pub(crate) fn new(origin: DocumentOrigin, bookmark_title: Option<String>) -> Self {
        Self {
            origin,
            bookmark_title,
        }
    }

    /// Content origin.
    pub fn origin(&self) -> &DocumentOrigin {
        &self.origin
    }

    /// Bookmark title, exactly as given (including any leading `+`).
    pub fn bookmark_title(&self) -> Option<&str> {
        self.bookmark_title.as_deref()
    }

    /// True when the entry should get a bookmark.
    pub fn is_bookmarked(&self) -> bool {
        self.bookmark_title.is_some()
    }
}

/// Insertion-ordered list of entries. Entries are never removed or edited.
///
/// File references only get in through [`SourceRegistry::add_file`], so
/// every one of them has passed admission:
///
/// ```compile_fail
/// use roverpdf::mime::MimeType;
/// use roverpdf::{DocumentOrigin, SourceRegistry};
///
/// let mut registry = SourceRegistry::new();
/// registry.add(
///     DocumentOrigin::FileReference {
///         path: "missing.pdf".into(),
///         mime: MimeType::Pdf,
///     },
///     None,
/// );
/// ```
#[derive(Debug, Clone, Default)]
pub struct SourceRegistry {
    entries: Vec<DocumentEntry>,
}

impl SourceRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry. File references must already be admitted.
    fn add(&mut self, origin: DocumentOrigin, bookmark_title: Option<String>) {
        self.entries.push(DocumentEntry::new(origin, bookmark_title));
    }

    /// Append in-memory PDF bytes.
    pub fn add_bytes(&mut self, pdf: impl Into<Bytes>, bookmark_title: Option<String>) {
        self.add(DocumentOrigin::InlineBytes(pdf.into()), bookmark_title);
    }

    /// Admit and append a file reference.
    ///
    /// # Errors
    ///
    /// Returns an admission error, and leaves the registry untouched, if:
    /// - `mime` is not one of the allowed types
    /// - `path` does not exist or is not a file
    pub fn add_file(
        &mut self,
        path: impl AsRef<Path>,
        mime: &str,
        bookmark_title: Option<String>,
    ) -> Result<()> {
        let path = path.as_ref();
        let mime = admit(path, mime)?;
        self.add(
            DocumentOrigin::FileReference {
                path: path.to_path_buf(),
                mime,
            },
            bookmark_title,
        );
        Ok(())
    }

    /// Append every entry of `other`, keeping their order.
    pub fn extend(&mut self, other: &SourceRegistry) {
        self.entries.extend(other.entries.iter().cloned());
    }

    /// Number of entries.
    pub fn count(&self) -> usize {
        self.entries.len()
    }

    /// True when nothing has been added.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in insertion order.
    pub fn entries(&self) -> &[DocumentEntry] {
        &self.entries
    }
}

/// Check the allow-list first, then that the file is really there.
fn admit(path: &Path, mime: &str) -> Result<MimeType> {
    let mime: MimeType = mime
        .parse()
        .map_err(|_| RoverError::unsupported_mime_type(path.to_path_buf(), mime))?;

    if !path.try_exists()? {
        return Err(RoverError::file_not_found(path.to_path_buf()));
    }

    if !path.is_file() {
        return Err(RoverError::not_a_file(path.to_path_buf()));
    }

    Ok(mime)
}
