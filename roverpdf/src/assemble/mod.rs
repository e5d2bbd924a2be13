//! Assembling registry entries into one output document.
//!
//! The pieces, in the order an assembly uses them:
//!
//! - [`pages`] imports a rendered source into the [`accumulator`]
//! - [`outline`] builds the bookmark tree as entries are imported
//! - [`page_numbers`] stamps "Page X of Y" labels once all pages are in
//! - [`metadata`] writes the Info dictionary and page layout
//!
//! [`Assembly`] drives all of them.

pub mod accumulator;
pub mod assembler;
pub mod metadata;
pub mod outline;
pub mod page_numbers;
pub mod pages;

pub use accumulator::OutputAccumulator;
pub use assembler::{AssembledDocument, Assembly, AssemblyResult, AssemblyState};
pub use outline::{BookmarkRecord, OutlineScope, OutlineTree};
pub use page_numbers::PageNumberOverlay;
pub use pages::{ImportedRange, PageImporter};
