//! Writing the assembled document.
//!
//! This module provides:
//! - Atomic file writes (write to a temp file, then rename)
//! - Compression according to [`CompressionLevel`]
//! - Writing to any async byte sink, optionally closing it afterwards
//! - Write statistics
//!
//! Serialization runs on the blocking thread pool.
//!
//! # Examples
//!
//! ```no_run
//! use roverpdf::io::PdfWriter;
//! use lopdf::Document;
//! use std::path::Path;
//!
//! # async fn example(doc: Document) -> Result<(), Box<dyn std::error::Error>> {
//! let writer = PdfWriter::new();
//! writer.save(doc, Path::new("output.pdf")).await?;
//! # Ok(())
//! # }
//! ```

use lopdf::Document;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::task;

use crate::config::CompressionLevel;
use crate::error::{Result, RoverError};

/// Options for writing PDF files.
#[derive(Debug, Clone)]
pub struct WriteOptions {
    /// Use atomic writes (write to temp file, then rename).
    pub atomic: bool,

    /// Stream compression applied before serializing.
    pub compression: CompressionLevel,

    /// Buffer size for writing (in bytes).
    pub buffer_size: usize,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            atomic: true,
            compression: CompressionLevel::default(),
            buffer_size: 8192,
        }
    }
}

/// Statistics about a write operation.
#[derive(Debug, Clone)]
pub struct WriteStatistics {
    /// Time taken to write.
    pub write_time: Duration,

    /// Bytes written.
    pub file_size: u64,

    /// Destination, or `-` for a stream.
    pub output_path: PathBuf,
}

impl WriteStatistics {
    /// Format file size as human-readable string.
    pub fn format_file_size(&self) -> String {
        format_file_size(self.file_size)
    }
}

/// PDF writer with configurable behavior.
#[derive(Debug, Clone, Default)]
pub struct PdfWriter {
    options: WriteOptions,
}

impl PdfWriter {
    /// Create a new PDF writer with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a writer with custom options.
    pub fn with_options(options: WriteOptions) -> Self {
        Self { options }
    }

    /// Create a writer with the given compression and otherwise default options.
    pub fn with_compression(compression: CompressionLevel) -> Self {
        Self {
            options: WriteOptions {
                compression,
                ..Default::default()
            },
        }
    }

    /// Save a document to a file.
    ///
    /// With atomic writes enabled the document is written next to `path`
    /// first and renamed into place, so a failed save never leaves a
    /// truncated file at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Output directory doesn't exist
    /// - Insufficient permissions
    /// - Disk full
    pub async fn save(&self, doc: Document, path: &Path) -> Result<WriteStatistics> {
        let path_buf = path.to_path_buf();
        let options = self.options.clone();

        task::spawn_blocking(move || {
            let start = Instant::now();
            let mut doc = doc;
            prepare(&mut doc, options.compression);

            let write_path = if options.atomic {
                temp_path(&path_buf)
            } else {
                path_buf.clone()
            };

            let result = write_file(&mut doc, &write_path, options.buffer_size).and_then(|()| {
                if options.atomic {
                    std::fs::rename(&write_path, &path_buf).map_err(|e| {
                        RoverError::FailedToWrite {
                            path: path_buf.clone(),
                            source: e,
                        }
                    })?;
                }
                Ok(())
            });

            if let Err(err) = result {
                if options.atomic {
                    let _ = std::fs::remove_file(&write_path);
                }
                return Err(err);
            }

            let file_size = std::fs::metadata(&path_buf).map(|m| m.len()).unwrap_or(0);

            Ok(WriteStatistics {
                write_time: start.elapsed(),
                file_size,
                output_path: path_buf,
            })
        })
        .await
        .map_err(|e| RoverError::other(format!("Write task failed: {e}")))?
    }

    /// Serialize a document to bytes.
    pub async fn to_bytes(&self, doc: Document) -> Result<Vec<u8>> {
        let compression = self.options.compression;

        task::spawn_blocking(move || {
            let mut doc = doc;
            prepare(&mut doc, compression);

            let mut buffer = Vec::new();
            doc.save_to(&mut buffer).map_err(|e| RoverError::FailedToWrite {
                path: PathBuf::from("-"),
                source: std::io::Error::other(e),
            })?;
            Ok(buffer)
        })
        .await
        .map_err(|e| RoverError::other(format!("Serialize task failed: {e}")))?
    }

    /// Write a document to an async sink.
    ///
    /// The sink is flushed, and shut down as well when `close_stream` is
    /// true. Otherwise it stays open for the caller.
    ///
    /// # Errors
    ///
    /// Returns [`RoverError::FailedToWrite`] if the sink rejects the data.
    pub async fn write_to<W>(
        &self,
        doc: Document,
        sink: &mut W,
        close_stream: bool,
    ) -> Result<WriteStatistics>
    where
        W: AsyncWrite + Unpin + ?Sized,
    {
        let start = Instant::now();
        let bytes = self.to_bytes(doc).await?;

        let stream_err = |source| RoverError::FailedToWrite {
            path: PathBuf::from("-"),
            source,
        };
        sink.write_all(&bytes).await.map_err(stream_err)?;
        sink.flush().await.map_err(stream_err)?;
        if close_stream {
            sink.shutdown().await.map_err(stream_err)?;
        }

        Ok(WriteStatistics {
            write_time: start.elapsed(),
            file_size: bytes.len() as u64,
            output_path: PathBuf::from("-"),
        })
    }
}

/// Apply compression before serializing.
fn prepare(doc: &mut Document, compression: CompressionLevel) {
    match compression {
        CompressionLevel::None => {}
        CompressionLevel::Standard => doc.compress(),
        CompressionLevel::Maximum => {
            doc.delete_zero_length_streams();
            doc.prune_objects();
            doc.renumber_objects();
            doc.compress();
        }
    }
}

fn write_file(doc: &mut Document, path: &Path, buffer_size: usize) -> Result<()> {
    let file = std::fs::File::create(path).map_err(|e| RoverError::FailedToCreateOutput {
        path: path.to_path_buf(),
        source: e,
    })?;

    let mut writer = std::io::BufWriter::with_capacity(buffer_size, file);

    doc.save_to(&mut writer)
        .map_err(|e| RoverError::FailedToWrite {
            path: path.to_path_buf(),
            source: std::io::Error::other(e),
        })?;

    writer.flush().map_err(|e| RoverError::FailedToWrite {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Sibling temp file, so the final rename never crosses filesystems.
fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Format file size as human-readable string.
pub fn format_file_size(size: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if size >= GB {
        format!("{:.2} GB", size as f64 / GB as f64)
    } else if size >= MB {
        format!("{:.2} MB", size as f64 / MB as f64)
    } else if size >= KB {
        format!("{:.2} KB", size as f64 / KB as f64)
    } else {
        format!("{size} bytes")
    }
}
