//! PDF input and output.
//!
//! [`reader`] opens rendered bytes as a [`PageSource`]; [`writer`] saves the
//! finished document to a file or stream.

pub mod reader;
pub mod writer;

pub use reader::{Orientation, PageInfo, PageSource};
pub use writer::{PdfWriter, WriteOptions, WriteStatistics};
