//! CLI argument parsing for roverpdf.
//!
//! This module defines the command-line interface using `clap` and turns
//! the parsed arguments into an [`AssemblyConfig`] plus an ordered list of
//! [`InputSpec`]s. It is also compiled by `build.rs` to render the man page,
//! so it only depends on the library and plain parsing crates.

use clap::Parser;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use roverpdf::error::{Result, RoverError};
use roverpdf::mime::MimeType;
use roverpdf::{AssemblyConfig, CompressionLevel, Metadata};

/// Path argument that stands for stdin or stdout.
pub const STDIO: &str = "-";

/// Assemble PDFs and images into a single bookmarked PDF document.
///
/// Inputs are added in the order given: first the positional inputs, then
/// the entries of --manifest, then those of --input-list. PDF pages are
/// copied as-is; PNG, JPEG and BMP images each become one A4 page.
#[derive(Parser, Debug)]
#[command(name = "roverpdf")]
#[command(version)]
#[command(about = "Assemble PDFs and images into a single bookmarked PDF document", long_about = None)]
#[command(author)]
#[command(arg_required_else_help = true)]
pub struct Cli {
    /// Input PDF or image files (in order)
    ///
    /// Glob patterns are expanded; matches are added in path order.
    /// The file type is taken from the extension.
    ///
    /// Examples:
    ///   roverpdf cover.pdf scans/*.png -o bundle.pdf
    #[arg(value_name = "FILE")]
    pub inputs: Vec<String>,

    /// Output PDF file path, or '-' for stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: PathBuf,

    /// Read inputs from a JSON manifest
    ///
    /// The manifest is an array of objects with a required "path" and
    /// optional "mime" and "bookmark" fields. A bookmark starting with '+'
    /// is nested under the previous top-level bookmark.
    #[arg(long, value_name = "FILE")]
    pub manifest: Option<PathBuf>,

    /// Read inputs from a file (one path per line)
    ///
    /// Lines starting with '#' are ignored. A tab separates the path from
    /// an optional bookmark title. Use '-' to read from stdin.
    #[arg(long, value_name = "FILE")]
    pub input_list: Option<PathBuf>,

    /// Bookmark each input that has no explicit title by its file name
    #[arg(short, long)]
    pub bookmarks: bool,

    /// Stamp "Page X of Y" on the output pages
    #[arg(short = 'p', long)]
    pub page_numbers: bool,

    /// First page (1-based) that gets a page number
    #[arg(long, value_name = "N", default_value_t = 1)]
    pub first_page_number: u32,

    /// Font for page numbers (Helvetica or Courier)
    #[arg(long, value_name = "NAME", default_value = roverpdf::fonts::HELVETICA)]
    pub font: String,

    /// Font size for page numbers, in points
    #[arg(long, value_name = "PT", default_value_t = 8.0)]
    pub font_size: f32,

    /// Number of inputs rendered concurrently
    ///
    /// Default is the number of CPU cores. Use 1 for sequential processing.
    #[arg(short, long, value_name = "N")]
    pub jobs: Option<usize>,

    /// Compression level for output PDF
    ///
    /// - none: No compression
    /// - standard: Compress content streams (default)
    /// - maximum: Also drop unused objects and renumber
    #[arg(short, long, value_name = "LEVEL", default_value = "standard")]
    #[arg(value_parser = ["none", "standard", "maximum"])]
    pub compression: String,

    /// Set title metadata for output PDF
    #[arg(long, value_name = "TEXT")]
    pub title: Option<String>,

    /// Set author metadata for output PDF
    #[arg(long, value_name = "TEXT")]
    pub author: Option<String>,

    /// Set subject metadata for output PDF
    #[arg(long, value_name = "TEXT")]
    pub subject: Option<String>,

    /// Set keywords metadata for output PDF (comma-separated)
    #[arg(long, value_name = "TEXT")]
    pub keywords: Option<String>,

    /// Assemble in memory and report the result without writing anything
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Print the result (bookmarks, page count, skipped inputs) as JSON
    #[arg(long)]
    pub json: bool,

    /// Force overwrite of existing output file without confirmation
    #[arg(short, long)]
    pub force: bool,

    /// Never overwrite existing output file
    #[arg(long, conflicts_with = "force")]
    pub no_clobber: bool,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Suppress all non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

/// What to do when the output file already exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverwriteMode {
    /// Ask on the terminal.
    Prompt,
    /// Overwrite silently.
    Force,
    /// Refuse.
    NoClobber,
}

/// One input as given on the command line, in a manifest or in a list.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct InputSpec {
    /// File to add.
    pub path: PathBuf,
    /// Declared MIME type; inferred from the extension when absent.
    #[serde(default)]
    pub mime: Option<String>,
    /// Bookmark title, possibly starting with `+`.
    #[serde(default)]
    pub bookmark: Option<String>,
}

impl InputSpec {
    /// An input with neither a declared type nor a title.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            mime: None,
            bookmark: None,
        }
    }

    /// MIME type to register the input with.
    ///
    /// Unknown extensions yield `application/octet-stream`, which admission
    /// then refuses with a proper diagnostic.
    pub fn resolved_mime(&self) -> String {
        match &self.mime {
            Some(mime) => mime.clone(),
            None => MimeType::from_path(&self.path)
                .map(|mime| mime.as_str().to_string())
                .unwrap_or_else(|| "application/octet-stream".to_string()),
        }
    }

    /// Bookmark title, falling back to the file stem when `default_to_stem`.
    pub fn resolved_bookmark(&self, default_to_stem: bool) -> Option<String> {
        self.bookmark.clone().or_else(|| {
            default_to_stem
                .then(|| self.path.file_stem())
                .flatten()
                .map(|stem| stem.to_string_lossy().into_owned())
        })
    }
}

impl Cli {
    /// Convert CLI arguments into a validated [`AssemblyConfig`].
    ///
    /// # Errors
    ///
    /// Returns an error if the compression level is unknown or the
    /// resulting configuration does not validate.
    pub fn to_config(&self) -> Result<AssemblyConfig> {
        let compression = CompressionLevel::from_str(&self.compression)?;

        let metadata = Metadata::new(
            self.title.clone(),
            self.author.clone(),
            self.subject.clone(),
            self.keywords.clone(),
        );

        let config = AssemblyConfig {
            first_page_number: self.first_page_number,
            include_page_numbers: self.page_numbers,
            page_number_font: self.font.clone(),
            page_number_size: self.font_size,
            jobs: self.jobs,
            compression,
            metadata,
            ..AssemblyConfig::default()
        };

        config.validate(&roverpdf::fonts::FontSet::standard())?;

        Ok(config)
    }

    /// Resolve the overwrite mode from `--force` / `--no-clobber`.
    pub fn overwrite_mode(&self) -> OverwriteMode {
        if self.force {
            OverwriteMode::Force
        } else if self.no_clobber {
            OverwriteMode::NoClobber
        } else {
            OverwriteMode::Prompt
        }
    }

    /// True when the output goes to stdout.
    pub fn writes_to_stdout(&self) -> bool {
        self.output.as_os_str() == STDIO
    }

    /// Validate CLI arguments before touching the filesystem.
    ///
    /// # Errors
    ///
    /// Returns an error if no input source was given or a numeric argument
    /// is out of range.
    pub fn validate(&self) -> Result<()> {
        if self.inputs.is_empty() && self.manifest.is_none() && self.input_list.is_none() {
            return Err(RoverError::invalid_config("No input files specified"));
        }

        if let Some(jobs) = self.jobs
            && jobs == 0
        {
            return Err(RoverError::invalid_config(
                "Number of jobs must be at least 1",
            ));
        }

        if self.first_page_number == 0 {
            return Err(RoverError::invalid_config(
                "First page number must be at least 1",
            ));
        }

        if self.json && self.writes_to_stdout() {
            return Err(RoverError::invalid_config(
                "--json cannot be combined with writing the PDF to stdout",
            ));
        }

        if self.manifest.as_deref().is_some_and(is_stdin)
            && self.input_list.as_deref().is_some_and(is_stdin)
        {
            return Err(RoverError::invalid_config(
                "Only one of --manifest and --input-list can read from stdin",
            ));
        }

        Ok(())
    }

    /// Collect every input in order: positional, manifest, input list.
    ///
    /// # Errors
    ///
    /// Returns an error if a glob pattern is malformed or the manifest or
    /// input list cannot be read or parsed.
    pub async fn collect_inputs(&self) -> Result<Vec<InputSpec>> {
        let mut inputs: Vec<InputSpec> = expand_patterns(&self.inputs)?
            .into_iter()
            .map(InputSpec::from_path)
            .collect();

        if let Some(ref manifest) = self.manifest {
            let text = read_text(manifest).await?;
            inputs.extend(parse_manifest(&text, manifest)?);
        }

        if let Some(ref list) = self.input_list {
            let text = read_text(list).await?;
            inputs.extend(parse_input_list(&text, list)?);
        }

        Ok(inputs)
    }
}

fn is_stdin(path: &Path) -> bool {
    path.as_os_str() == STDIO
}

/// Read a whole file, or stdin for `-`.
async fn read_text(path: &Path) -> Result<String> {
    use tokio::io::AsyncReadExt;

    if is_stdin(path) {
        let mut text = String::new();
        tokio::io::stdin().read_to_string(&mut text).await?;
        return Ok(text);
    }

    tokio::fs::read_to_string(path)
        .await
        .map_err(|source| RoverError::FailedToReadSource {
            path: path.to_path_buf(),
            source,
        })
}

/// Expand glob patterns in order.
///
/// A pattern without any match is kept as a literal path so that a missing
/// file is still reported when it is added.
pub fn expand_patterns<T>(patterns: T) -> Result<Vec<PathBuf>>
where
    T: IntoIterator,
    T::Item: AsRef<str>,
{
    let mut resolved = Vec::new();

    for pattern in patterns {
        let pattern = pattern.as_ref();
        let paths = glob::glob(pattern).map_err(|err| {
            RoverError::invalid_config(format!("Invalid glob pattern {pattern}: {err}"))
        })?;

        let mut matched = false;
        for entry in paths {
            let path = entry.map_err(|err| RoverError::other(err.to_string()))?;
            resolved.push(path);
            matched = true;
        }

        if !matched {
            resolved.push(PathBuf::from(pattern));
        }
    }

    Ok(resolved)
}

/// Parse a JSON manifest: an array of `{ path, mime?, bookmark? }`.
pub fn parse_manifest(text: &str, source: &Path) -> Result<Vec<InputSpec>> {
    serde_json::from_str(text).map_err(|err| {
        RoverError::invalid_config(format!("Invalid manifest {}: {err}", source.display()))
    })
}

/// Parse an input list: one path per line, `#` comments, optional
/// `path<TAB>bookmark`.
pub fn parse_input_list(text: &str, source: &Path) -> Result<Vec<InputSpec>> {
    let mut inputs = Vec::new();

    for (index, line) in text.lines().enumerate() {
        let line = line.trim_end_matches('\r');
        if line.trim().is_empty() || line.trim_start().starts_with('#') {
            continue;
        }

        let (path, bookmark) = match line.split_once('\t') {
            Some((path, bookmark)) => (path.trim(), Some(bookmark.trim())),
            None => (line.trim(), None),
        };

        if path.is_empty() {
            return Err(RoverError::invalid_config(format!(
                "Invalid input list {} at line {}: empty path",
                source.display(),
                index + 1
            )));
        }

        inputs.push(InputSpec {
            path: PathBuf::from(path),
            mime: None,
            bookmark: bookmark.filter(|b| !b.is_empty()).map(str::to_string),
        });
    }

    Ok(inputs)
}
