//! roverpdf - Assemble PDFs and images into a single bookmarked PDF.
//!
//! This library combines an ordered list of sources into one document. It
//! supports:
//!
//! - PDF sources, from memory or from disk
//! - PNG, JPEG and BMP images, each placed on its own A4 page
//! - A two-level bookmark outline driven by per-entry titles
//! - Optional "Page X of Y" labels
//! - Output to a file or any async writer
//!
//! Entries that cannot be loaded are reported and skipped; the rest of the
//! document is still produced.
//!
//! # Examples
//!
//! ## Basic Assembly
//!
//! ```no_run
//! use roverpdf::{Assembly, AssemblyConfig, mime};
//! use std::path::Path;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = AssemblyConfig {
//!     include_page_numbers: true,
//!     ..AssemblyConfig::default()
//! };
//!
//! let mut assembly = Assembly::new(config)?;
//! assembly.add_file("itinerary.pdf", mime::PDF, Some("Trip".to_string()))?;
//! assembly.add_file("ticket.png", mime::PNG, Some("+Ticket".to_string()))?;
//!
//! let result = assembly.save_to_path(Path::new("trip.pdf")).await?;
//! println!("Created {} page document", result.page_count);
//! # Ok(())
//! # }
//! ```
//!
//! ## Writing to a Stream
//!
//! ```no_run
//! use roverpdf::{Assembly, AssemblyConfig};
//!
//! # async fn example(pdf: Vec<u8>) -> Result<(), Box<dyn std::error::Error>> {
//! let mut assembly = Assembly::new(AssemblyConfig::default())?;
//! assembly.add_bytes(pdf, None);
//!
//! let mut stdout = tokio::io::stdout();
//! assembly.save_to_writer(&mut stdout, false).await?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod assemble;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod fonts;
pub mod io;
pub mod mime;
pub mod registry;
pub mod render;

// Re-export commonly used types
pub use assemble::{Assembly, AssemblyResult, BookmarkRecord};
pub use config::{AssemblyConfig, CompressionLevel, Metadata, PageLayout};
pub use diagnostics::{CollectingSink, Diagnostic, DiagnosticSink, TracingSink};
pub use error::{ErrorKind, Result, RoverError};
pub use registry::{DocumentEntry, DocumentOrigin, SourceRegistry};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name.
pub const NAME: &str = env!("CARGO_PKG_NAME");
