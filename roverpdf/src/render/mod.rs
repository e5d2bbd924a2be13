//! Rendering registry entries to PDF bytes.
//!
//! Every entry, whatever its origin, becomes a buffer of PDF bytes before
//! it is imported:
//!
//! - inline bytes are passed through untouched
//! - PDF files are read from disk
//! - PNG, JPEG and BMP files are drawn onto a single A4 page
//!
//! Image work is CPU bound and runs on the blocking thread pool.

pub mod raster;

use bytes::Bytes;
use std::path::Path;
use tokio::task;

use crate::error::{Result, RoverError};
use crate::mime::MimeType;
use crate::registry::{DocumentEntry, DocumentOrigin};

/// PDF bytes produced for one entry.
#[derive(Debug, Clone)]
pub struct RenderedBuffer {
    bytes: Bytes,
    origin: String,
}

impl RenderedBuffer {
    /// Wrap bytes with a description of where they came from.
    pub fn new(bytes: impl Into<Bytes>, origin: impl Into<String>) -> Self {
        Self {
            bytes: bytes.into(),
            origin: origin.into(),
        }
    }

    /// The PDF bytes.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Path or description of the source.
    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// Size in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// True for a zero-length buffer.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Produces PDF bytes for registry entries.
#[derive(Debug, Clone, Copy, Default)]
pub struct Renderer;

impl Renderer {
    /// Create a renderer.
    pub fn new() -> Self {
        Self
    }

    /// Render one entry.
    ///
    /// # Errors
    ///
    /// Returns a render error if a referenced file cannot be read or an
    /// image cannot be converted. Inline bytes never fail here; they are
    /// only checked when imported.
    pub async fn render(&self, entry: &DocumentEntry) -> Result<RenderedBuffer> {
        let origin = entry.origin();
        match origin {
            DocumentOrigin::InlineBytes(bytes) => {
                Ok(RenderedBuffer::new(bytes.clone(), origin.describe()))
            }
            DocumentOrigin::FileReference { path, mime } => {
                let data = read_source(path).await?;
                let bytes = match mime {
                    MimeType::Pdf => data,
                    image_mime => {
                        let path = path.clone();
                        let mime = *image_mime;
                        task::spawn_blocking(move || raster::image_to_pdf(&data, mime, &path))
                            .await
                            .map_err(|e| RoverError::other(format!("Render task failed: {e}")))??
                    }
                };
                Ok(RenderedBuffer::new(bytes, origin.describe()))
            }
        }
    }
}

async fn read_source(path: &Path) -> Result<Vec<u8>> {
    tokio::fs::read(path)
        .await
        .map_err(|source| RoverError::FailedToReadSource {
            path: path.to_path_buf(),
            source,
        })
}
