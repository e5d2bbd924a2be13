//! Fixtures for the integration tests.
//!
//! Nothing is checked in: PDFs are built with lopdf and images are encoded
//! with the `image` crate into a per-test temporary directory.

#![allow(dead_code)]

use image::{ImageFormat, Rgb, RgbImage};
use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, ObjectId, Stream, dictionary};
use std::path::{Path, PathBuf};

/// US Letter portrait.
pub const LETTER: (i64, i64) = (612, 792);

/// A4 landscape.
pub const A4_LANDSCAPE: (i64, i64) = (842, 595);

/// Build a PDF with one page per entry of `sizes`, each showing "Source N".
pub fn pdf_bytes(sizes: &[(i64, i64)]) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let kids: Vec<Object> = sizes
        .iter()
        .enumerate()
        .map(|(index, &(width, height))| {
            let content = Content {
                operations: vec![
                    Operation::new("BT", vec![]),
                    Operation::new("Tf", vec!["F1".into(), 12.into()]),
                    Operation::new("Td", vec![72.into(), 72.into()]),
                    Operation::new(
                        "Tj",
                        vec![Object::string_literal(format!("Source {}", index + 1))],
                    ),
                    Operation::new("ET", vec![]),
                ],
            };
            let content_id =
                doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));

            doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
                "MediaBox" => vec![0.into(), 0.into(), width.into(), height.into()],
            })
            .into()
        })
        .collect();

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => sizes.len() as i64,
            "Resources" => resources_id,
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).unwrap();
    bytes
}

/// `count` Letter pages.
pub fn letter_pdf(count: usize) -> Vec<u8> {
    pdf_bytes(&vec![LETTER; count])
}

/// Write a PDF fixture into `dir`.
pub fn write_pdf(dir: &Path, name: &str, sizes: &[(i64, i64)]) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, pdf_bytes(sizes)).unwrap();
    path
}

/// Write a gradient image of the given size and format into `dir`.
pub fn write_image(dir: &Path, name: &str, width: u32, height: u32, format: ImageFormat) -> PathBuf {
    let image = RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    });
    let path = dir.join(name);
    image.save_with_format(&path, format).unwrap();
    path
}

/// Write arbitrary bytes into `dir`.
pub fn write_bytes(dir: &Path, name: &str, bytes: &[u8]) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, bytes).unwrap();
    path
}

/// Page ids in page order.
pub fn page_ids(doc: &Document) -> Vec<ObjectId> {
    doc.get_pages().into_values().collect()
}

/// `/Rotate` of a page, 0 when absent.
pub fn rotation(doc: &Document, page_id: ObjectId) -> i64 {
    doc.get_dictionary(page_id)
        .unwrap()
        .get(b"Rotate")
        .and_then(Object::as_i64)
        .unwrap_or(0)
}

/// `/MediaBox` of a page as floats.
pub fn media_box(doc: &Document, page_id: ObjectId) -> [f32; 4] {
    let values = doc
        .get_dictionary(page_id)
        .unwrap()
        .get(b"MediaBox")
        .and_then(Object::as_array)
        .unwrap();
    let mut rect = [0.0; 4];
    for (slot, value) in rect.iter_mut().zip(values) {
        *slot = value.as_float().unwrap();
    }
    rect
}

/// An outline entry as read back from a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutlineEntry {
    pub title: String,
    /// 1-based page the entry points at.
    pub page: usize,
    pub children: Vec<OutlineEntry>,
}

/// Read the document outline.
pub fn read_outline(doc: &Document) -> Vec<OutlineEntry> {
    let Ok(outlines) = doc
        .catalog()
        .and_then(|catalog| catalog.get(b"Outlines"))
        .and_then(Object::as_reference)
    else {
        return Vec::new();
    };

    let pages = page_ids(doc);
    read_siblings(doc, doc.get_dictionary(outlines).unwrap(), &pages)
}

fn read_siblings(doc: &Document, parent: &lopdf::Dictionary, pages: &[ObjectId]) -> Vec<OutlineEntry> {
    let mut entries = Vec::new();
    let mut next = parent.get(b"First").and_then(Object::as_reference).ok();

    while let Some(id) = next {
        let item = doc.get_dictionary(id).unwrap();

        let title = match item.get(b"Title").unwrap() {
            Object::String(bytes, _) => decode_text(bytes),
            other => panic!("unexpected title {other:?}"),
        };
        let target = item
            .get(b"Dest")
            .and_then(Object::as_array)
            .unwrap()
            .first()
            .unwrap()
            .as_reference()
            .unwrap();
        let page = pages.iter().position(|&p| p == target).unwrap() + 1;

        entries.push(OutlineEntry {
            title,
            page,
            children: read_siblings(doc, item, pages),
        });
        next = item.get(b"Next").and_then(Object::as_reference).ok();
    }

    entries
}

/// Decode a PDF text string (UTF-16BE with BOM, or single byte).
pub fn decode_text(bytes: &[u8]) -> String {
    match bytes.strip_prefix(&[0xFE, 0xFF]) {
        Some(utf16) => {
            let units: Vec<u16> = utf16
                .chunks_exact(2)
                .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
                .collect();
            String::from_utf16(&units).unwrap()
        }
        None => bytes.iter().map(|&b| b as char).collect(),
    }
}

/// Text shown on a 1-based page.
pub fn page_text(doc: &Document, page: u32) -> String {
    doc.extract_text(&[page]).unwrap_or_default()
}
