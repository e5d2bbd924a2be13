//! Document-level dictionaries of the output.
//!
//! This module writes:
//! - the Info dictionary (Title, Author, Subject, Keywords)
//! - Creator, Producer and the creation date
//! - the catalog's initial page layout

use lopdf::{Dictionary, Document, Object, StringFormat};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::assemble::outline::pdf_text_string;
use crate::config::{Metadata, PageLayout};
use crate::error::{Result, RoverError};

/// Value written to `/Creator` and `/Producer`.
pub const PRODUCER: &str = concat!("roverpdf ", env!("CARGO_PKG_VERSION"));

/// Write the Info dictionary.
///
/// Producer, Creator and the dates are always set; the remaining fields
/// only when present in `metadata`.
pub fn set_metadata(doc: &mut Document, metadata: &Metadata) {
    let mut info = Dictionary::new();

    let fields = [
        ("Title", &metadata.title),
        ("Author", &metadata.author),
        ("Subject", &metadata.subject),
        ("Keywords", &metadata.keywords),
    ];
    for (key, value) in fields {
        if let Some(value) = value {
            info.set(key, pdf_text_string(value));
        }
    }

    info.set("Creator", literal(PRODUCER));
    info.set("Producer", literal(PRODUCER));

    let date = format_pdf_date(SystemTime::now());
    info.set("CreationDate", literal(&date));
    info.set("ModDate", literal(&date));

    let info_id = doc.add_object(info);
    doc.trailer.set("Info", Object::Reference(info_id));
}

/// Read the Info dictionary back into [`Metadata`].
pub fn get_metadata(doc: &Document) -> Metadata {
    let Some(info) = doc
        .trailer
        .get(b"Info")
        .and_then(Object::as_reference)
        .and_then(|id| doc.get_dictionary(id))
        .ok()
    else {
        return Metadata::default();
    };

    Metadata::new(
        text_field(info, b"Title"),
        text_field(info, b"Author"),
        text_field(info, b"Subject"),
        text_field(info, b"Keywords"),
    )
}

/// Set the catalog's `/PageLayout`.
///
/// # Errors
///
/// Returns an error if the document has no catalog.
pub fn set_page_layout(doc: &mut Document, layout: PageLayout) -> Result<()> {
    let catalog = doc
        .catalog_mut()
        .map_err(|e| RoverError::other(format!("Failed to get catalog: {e}")))?;
    catalog.set("PageLayout", Object::Name(layout.as_pdf_name().as_bytes().to_vec()));
    Ok(())
}

fn literal(text: &str) -> Object {
    Object::String(text.as_bytes().to_vec(), StringFormat::Literal)
}

/// Decode a text string written as PDFDocEncoding/ASCII or UTF-16BE.
fn text_field(dict: &Dictionary, key: &[u8]) -> Option<String> {
    let Ok(Object::String(bytes, _)) = dict.get(key) else {
        return None;
    };

    match bytes.strip_prefix(&[0xFE, 0xFF]) {
        Some(utf16) => {
            let units: Vec<u16> = utf16
                .chunks_exact(2)
                .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
                .collect();
            String::from_utf16(&units).ok()
        }
        None => String::from_utf8(bytes.clone()).ok(),
    }
}

/// Format a SystemTime as a PDF date string (UTC).
///
/// PDF date format: D:YYYYMMDDHHmmSSZ
pub fn format_pdf_date(time: SystemTime) -> String {
    let secs = time
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();

    let days = (secs / 86_400) as i64;
    let time_of_day = secs % 86_400;
    let (year, month, day) = civil_from_days(days);

    format!(
        "D:{:04}{:02}{:02}{:02}{:02}{:02}Z",
        year,
        month,
        day,
        time_of_day / 3_600,
        (time_of_day % 3_600) / 60,
        time_of_day % 60
    )
}

/// Gregorian date for a count of days since 1970-01-01.
fn civil_from_days(days: i64) -> (i64, u32, u32) {
    let z = days + 719_468;
    let era = z.div_euclid(146_097);
    let doe = z.rem_euclid(146_097);
    let yoe = (doe - doe / 1_460 + doe / 36_524 - doe / 146_096) / 365;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let day = (doy - (153 * mp + 2) / 5 + 1) as u32;
    let month = (if mp < 10 { mp + 3 } else { mp - 9 }) as u32;
    let year = yoe + era * 400 + i64::from(month <= 2);
    (year, month, day)
}
