//! The assembly orchestrator.
//!
//! An [`Assembly`] owns the source registry and drives every entry through
//! render, import and bookmarking, then finalizes the output: outline,
//! page numbers, metadata, and finally serialization.
//!
//! Rendering is the only stage that runs concurrently. Up to
//! [`AssemblyConfig::effective_jobs`] entries are rendered at once, but the
//! results are consumed in registry order, so pages and the outline scope
//! are mutated by a single task exactly as if everything ran sequentially.
//!
//! # Examples
//!
//! ```no_run
//! use roverpdf::{Assembly, AssemblyConfig, mime};
//!
//! # async fn example() -> roverpdf::Result<()> {
//! let mut assembly = Assembly::new(AssemblyConfig::default())?;
//! assembly.add_file("cover.pdf", mime::PDF, Some("Cover".to_string()))?;
//! assembly.add_file("photo.jpg", mime::JPEG, Some("+Photo".to_string()))?;
//!
//! let result = assembly.save_to_path("bundle.pdf".as_ref()).await?;
//! for bookmark in &result.bookmarks {
//!     println!("{} -> page {}", bookmark.title, bookmark.page);
//! }
//! # Ok(())
//! # }
//! ```

use bytes::Bytes;
use futures::stream::{self, StreamExt};
use lopdf::Document;
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tokio::io::AsyncWrite;

use crate::assemble::accumulator::OutputAccumulator;
use crate::assemble::metadata;
use crate::assemble::outline::{BookmarkRecord, OutlineScope, OutlineTree};
use crate::assemble::page_numbers::PageNumberOverlay;
use crate::assemble::pages::PageImporter;
use crate::config::AssemblyConfig;
use crate::diagnostics::{Diagnostic, DiagnosticSink, TracingSink};
use crate::error::{Result, RoverError};
use crate::fonts::FontSet;
use crate::io::{PageSource, PdfWriter};
use crate::registry::{DocumentEntry, DocumentOrigin, SourceRegistry};
use crate::render::{RenderedBuffer, Renderer};

/// Progress of one assembly run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssemblyState {
    /// Nothing processed yet.
    Empty,
    /// Entries are being imported in registry order.
    Accumulating,
    /// All entries processed; the output is being completed.
    Finalized,
}

/// What a save produced.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AssemblyResult {
    /// One record per created bookmark, in creation order.
    pub bookmarks: Vec<BookmarkRecord>,
    /// Pages in the output.
    pub page_count: usize,
}

/// A finished, not yet serialized output document.
#[derive(Debug)]
pub struct AssembledDocument {
    document: Document,
    result: AssemblyResult,
}

impl AssembledDocument {
    /// The PDF document.
    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Bookmarks and page count.
    pub fn result(&self) -> &AssemblyResult {
        &self.result
    }

    /// Split into the document and the result.
    pub fn into_parts(self) -> (Document, AssemblyResult) {
        (self.document, self.result)
    }
}

/// Builds one PDF out of an ordered list of PDFs and images.
pub struct Assembly {
    registry: SourceRegistry,
    config: AssemblyConfig,
    fonts: Arc<FontSet>,
    sink: Arc<dyn DiagnosticSink>,
    renderer: Renderer,
    importer: PageImporter,
}

impl Assembly {
    /// Create an assembly using the standard fonts.
    ///
    /// # Errors
    ///
    /// Returns [`RoverError::InvalidConfig`] if `config` does not validate.
    pub fn new(config: AssemblyConfig) -> Result<Self> {
        Self::with_fonts(config, Arc::new(FontSet::standard()))
    }

    /// Create an assembly drawing page numbers from `fonts`.
    ///
    /// # Errors
    ///
    /// Returns [`RoverError::InvalidConfig`] if `config` does not validate
    /// against `fonts`.
    pub fn with_fonts(config: AssemblyConfig, fonts: Arc<FontSet>) -> Result<Self> {
        config.validate(&fonts)?;
        Ok(Self {
            registry: SourceRegistry::new(),
            config,
            fonts,
            sink: Arc::new(TracingSink),
            renderer: Renderer::new(),
            importer: PageImporter::new(),
        })
    }

    /// Send per-entry failures to `sink` instead of the log.
    pub fn with_sink(mut self, sink: Arc<dyn DiagnosticSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Active configuration.
    pub fn config(&self) -> &AssemblyConfig {
        &self.config
    }

    /// Registered entries.
    pub fn registry(&self) -> &SourceRegistry {
        &self.registry
    }

    /// Number of registered entries.
    pub fn count(&self) -> usize {
        self.registry.count()
    }

    /// Register an in-memory PDF. Its bytes are only checked at save time.
    pub fn add_bytes(&mut self, pdf: impl Into<Bytes>, bookmark_title: Option<String>) {
        self.registry.add_bytes(pdf, bookmark_title);
    }

    /// Register a PDF or image file.
    ///
    /// A refused file is reported to the diagnostic sink and also returned,
    /// so callers may either ignore the result or act on it. The registry
    /// is unchanged in that case.
    ///
    /// # Errors
    ///
    /// Returns an admission error if `mime` is not allowed or `path` is not
    /// an existing file.
    pub fn add_file(
        &mut self,
        path: impl AsRef<Path>,
        mime: &str,
        bookmark_title: Option<String>,
    ) -> Result<()> {
        let path = path.as_ref();
        self.registry
            .add_file(path, mime, bookmark_title)
            .inspect_err(|err| {
                self.sink.report(&Diagnostic::from_error(
                    err,
                    None,
                    path.display().to_string(),
                ));
            })
    }

    /// Append every entry of `other`, in order.
    pub fn add_assembly(&mut self, other: &Assembly) {
        self.registry.extend(&other.registry);
    }

    /// Build the output document in memory.
    ///
    /// Returns `None` when nothing was ever registered. Entries that fail
    /// to render or import are reported and skipped, so a registry in
    /// which every entry fails still yields a (page-less) document.
    ///
    /// The registry is not consumed; assembling twice gives the same pages
    /// and bookmarks.
    ///
    /// # Errors
    ///
    /// Returns an error if finalizing the document fails, including any
    /// page-number stamping failure.
    pub async fn assemble(&self) -> Result<Option<AssembledDocument>> {
        if self.registry.is_empty() {
            tracing::debug!("Registry is empty, nothing to assemble");
            return Ok(None);
        }

        let start = Instant::now();
        let jobs = self.config.effective_jobs();
        let renderer = self.renderer;

        tracing::debug!(entries = self.registry.count(), jobs, "Starting assembly");

        let mut rendered = stream::iter(self.registry.entries().iter().enumerate())
            .map(|(index, entry)| async move { (index, entry, renderer.render(entry).await) })
            .buffered(jobs);

        let mut run = AssemblyRun::new();
        while let Some((index, entry, buffer)) = rendered.next().await {
            run.accept(index, entry, buffer, &self.importer, self.sink.as_ref());
        }

        let assembled = run.finalize(&self.config, &self.fonts)?;

        tracing::debug!(
            pages = assembled.result.page_count,
            bookmarks = assembled.result.bookmarks.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Assembly finished"
        );

        Ok(Some(assembled))
    }

    /// Assemble and write the output to `path`.
    ///
    /// The file is written atomically and missing parent directories are
    /// created. Nothing is written when the registry is empty.
    ///
    /// # Errors
    ///
    /// Returns an error if assembling fails or the file cannot be written.
    pub async fn save_to_path(&self, path: &Path) -> Result<AssemblyResult> {
        let Some(assembled) = self.assemble().await? else {
            return Ok(AssemblyResult::default());
        };
        let (document, result) = assembled.into_parts();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| RoverError::FailedToCreateOutput {
                    path: parent.to_path_buf(),
                    source,
                })?;
        }

        let stats = PdfWriter::with_compression(self.config.compression)
            .save(document, path)
            .await?;

        tracing::info!(
            path = %path.display(),
            pages = result.page_count,
            bookmarks = result.bookmarks.len(),
            size = %stats.format_file_size(),
            "Saved assembled PDF"
        );

        Ok(result)
    }

    /// Assemble and write the output to `sink`.
    ///
    /// When `close_stream` is true the sink is shut down after writing. An
    /// empty registry writes nothing and leaves the sink untouched.
    ///
    /// # Errors
    ///
    /// Returns an error if assembling fails or the sink rejects the data.
    pub async fn save_to_writer<W>(&self, sink: &mut W, close_stream: bool) -> Result<AssemblyResult>
    where
        W: AsyncWrite + Unpin + ?Sized,
    {
        let Some(assembled) = self.assemble().await? else {
            return Ok(AssemblyResult::default());
        };
        let (document, result) = assembled.into_parts();

        let stats = PdfWriter::with_compression(self.config.compression)
            .write_to(document, sink, close_stream)
            .await?;

        tracing::info!(
            pages = result.page_count,
            bookmarks = result.bookmarks.len(),
            size = %stats.format_file_size(),
            "Wrote assembled PDF to stream"
        );

        Ok(result)
    }

    /// Assemble and serialize into memory.
    ///
    /// Returns `None` when the registry is empty.
    pub async fn to_bytes(&self) -> Result<Option<(Vec<u8>, AssemblyResult)>> {
        if self.registry.is_empty() {
            return Ok(None);
        }
        let mut buffer = Vec::new();
        let result = self.save_to_writer(&mut buffer, false).await?;
        Ok(Some((buffer, result)))
    }
}

impl std::fmt::Debug for Assembly {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Assembly")
            .field("entries", &self.registry.count())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Mutable state of one pass over the registry.
struct AssemblyRun {
    state: AssemblyState,
    output: OutputAccumulator,
    outline: OutlineTree,
    scope: OutlineScope,
    bookmarks: Vec<BookmarkRecord>,
}

impl AssemblyRun {
    fn new() -> Self {
        Self {
            state: AssemblyState::Empty,
            output: OutputAccumulator::new(),
            outline: OutlineTree::new(),
            scope: OutlineScope::Root,
            bookmarks: Vec::new(),
        }
    }

    fn transition(&mut self, next: AssemblyState) {
        if self.state != next {
            tracing::trace!(from = ?self.state, to = ?next, "Assembly state");
            self.state = next;
        }
    }

    /// Import one rendered entry and bookmark it. Failures skip the entry.
    fn accept(
        &mut self,
        index: usize,
        entry: &DocumentEntry,
        buffer: Result<RenderedBuffer>,
        importer: &PageImporter,
        sink: &dyn DiagnosticSink,
    ) {
        self.transition(AssemblyState::Accumulating);

        let report = |err: &RoverError| {
            sink.report(&Diagnostic::from_error(err, Some(index), entry.origin().describe()));
        };

        let buffer = match buffer {
            Ok(buffer) => buffer,
            Err(err) => return report(&err),
        };

        let source = match PageSource::open(buffer.bytes(), buffer.origin()) {
            Ok(source) => source,
            Err(err) => return report(&err),
        };

        let range = match importer.import(source, &mut self.output) {
            Ok(range) => range,
            Err(err) => return report(&err),
        };

        tracing::debug!(
            entry = index,
            source = %describe_entry(entry),
            pages = range.count,
            "Imported entry"
        );

        if let (Some(title), Some(first_page)) = (entry.bookmark_title(), range.first_page()) {
            let record = self.outline.add_bookmark(&mut self.scope, title, first_page);
            tracing::debug!(entry = index, page = record.page, title = %record.title, "Added bookmark");
            self.bookmarks.push(record);
        }
    }

    fn finalize(mut self, config: &AssemblyConfig, fonts: &FontSet) -> Result<AssembledDocument> {
        self.transition(AssemblyState::Finalized);

        let page_ids = self.output.page_ids().to_vec();
        let mut document = self.output.into_document();

        self.outline.write_to(&mut document, &page_ids)?;

        if config.include_page_numbers {
            PageNumberOverlay::new(fonts, &config.page_number_font, config.page_number_size)?
                .apply(&mut document, &page_ids, config.first_page_number)?;
        }

        metadata::set_metadata(&mut document, &config.metadata);
        metadata::set_page_layout(&mut document, config.page_layout)?;

        // Drops whatever imported sources carried that no page refers to.
        document.prune_objects();

        Ok(AssembledDocument {
            document,
            result: AssemblyResult {
                bookmarks: self.bookmarks,
                page_count: page_ids.len(),
            },
        })
    }
}

/// Describe an entry for logs.
fn describe_entry(entry: &DocumentEntry) -> String {
    match entry.origin() {
        DocumentOrigin::InlineBytes(_) => entry.origin().describe(),
        DocumentOrigin::FileReference { mime, .. } => {
            format!("{} ({mime})", entry.origin().describe())
        }
    }
}
