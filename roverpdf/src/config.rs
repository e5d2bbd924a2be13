//! Configuration for an assembly run.
//!
//! Covers page numbering, output compression, document metadata and how
//! many entries may be rendered concurrently.

use std::str::FromStr;

use crate::error::{Result, RoverError};
use crate::fonts::FontSet;

/// Compression level for the output PDF.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompressionLevel {
    /// No stream compression.
    None,
    /// Compress content streams.
    #[default]
    Standard,
    /// Compress streams and drop every unreferenced object.
    Maximum,
}

impl FromStr for CompressionLevel {
    type Err = RoverError;

    /// Parse "none", "standard" or "maximum" (any case).
    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "none" => Ok(Self::None),
            "standard" => Ok(Self::Standard),
            "maximum" => Ok(Self::Maximum),
            _ => Err(RoverError::invalid_config(format!(
                "Invalid compression level: {s}. Must be one of: none, standard, maximum"
            ))),
        }
    }
}

/// Initial page layout written to the output catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PageLayout {
    /// One page at a time.
    #[default]
    SinglePage,
    /// Pages in one continuous column.
    OneColumn,
}

impl PageLayout {
    /// Value of the catalog's `/PageLayout` name.
    pub fn as_pdf_name(&self) -> &'static str {
        match self {
            Self::SinglePage => "SinglePage",
            Self::OneColumn => "OneColumn",
        }
    }
}

/// Document information written to the output Info dictionary.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Metadata {
    /// Document title.
    pub title: Option<String>,
    /// Document author.
    pub author: Option<String>,
    /// Document subject.
    pub subject: Option<String>,
    /// Document keywords (comma-separated).
    pub keywords: Option<String>,
}

impl Metadata {
    /// Check if any metadata fields are set.
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.author.is_none()
            && self.subject.is_none()
            && self.keywords.is_none()
    }

    /// Create metadata from optional strings, trimming whitespace.
    pub fn new(
        title: Option<String>,
        author: Option<String>,
        subject: Option<String>,
        keywords: Option<String>,
    ) -> Self {
        let to_string_opt = |opt: Option<String>| {
            opt.filter(|s| !s.trim().is_empty())
                .map(|s| s.trim().to_string())
        };

        Self {
            title: to_string_opt(title),
            author: to_string_opt(author),
            subject: to_string_opt(subject),
            keywords: to_string_opt(keywords),
        }
    }
}

/// Settings for one assembly.
#[derive(Debug, Clone)]
pub struct AssemblyConfig {
    /// First page (1-based) that receives a page-number label.
    pub first_page_number: u32,

    /// Stamp "Page X of Y" onto the output pages.
    pub include_page_numbers: bool,

    /// Font face used for page numbers, looked up in the [`FontSet`].
    pub page_number_font: String,

    /// Page-number font size in points.
    pub page_number_size: f32,

    /// Entries rendered concurrently (None = available parallelism).
    pub jobs: Option<usize>,

    /// Output compression.
    pub compression: CompressionLevel,

    /// Info dictionary contents.
    pub metadata: Metadata,

    /// Catalog page layout.
    pub page_layout: PageLayout,
}

impl Default for AssemblyConfig {
    fn default() -> Self {
        Self {
            first_page_number: 1,
            include_page_numbers: false,
            page_number_font: crate::fonts::HELVETICA.to_string(),
            page_number_size: 8.0,
            jobs: None,
            compression: CompressionLevel::default(),
            metadata: Metadata::default(),
            page_layout: PageLayout::default(),
        }
    }
}

impl AssemblyConfig {
    /// Validate the configuration against the fonts that will be used.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `first_page_number` is zero
    /// - `jobs` is zero
    /// - the page-number font size is not positive
    /// - page numbers are enabled and the font is not in `fonts`
    pub fn validate(&self, fonts: &FontSet) -> Result<()> {
        if self.first_page_number == 0 {
            return Err(RoverError::invalid_config(
                "First page number must be at least 1",
            ));
        }

        if let Some(jobs) = self.jobs
            && jobs == 0
        {
            return Err(RoverError::invalid_config(
                "Number of jobs must be at least 1",
            ));
        }

        if self.page_number_size.is_nan() || self.page_number_size <= 0.0 {
            return Err(RoverError::invalid_config(format!(
                "Page number font size must be positive, got {}",
                self.page_number_size
            )));
        }

        if self.include_page_numbers && fonts.get(&self.page_number_font).is_none() {
            return Err(RoverError::invalid_config(format!(
                "Unknown page number font: {}",
                self.page_number_font
            )));
        }

        Ok(())
    }

    /// Get the effective number of concurrent render jobs.
    pub fn effective_jobs(&self) -> usize {
        self.jobs.unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        })
    }
}
