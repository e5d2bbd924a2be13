//! "Page X of Y" labels on the assembled output.

use image::ImageFormat;
use lopdf::Document;
use roverpdf::{Assembly, AssemblyConfig};
use tempfile::TempDir;

use crate::common::{A4_LANDSCAPE, LETTER, letter_pdf, page_text, pdf_bytes, write_image};

fn numbered(first_page_number: u32) -> Assembly {
    Assembly::new(AssemblyConfig {
        include_page_numbers: true,
        first_page_number,
        ..AssemblyConfig::default()
    })
    .unwrap()
}

async fn render(assembly: &Assembly) -> Document {
    let (bytes, _) = assembly.to_bytes().await.unwrap().unwrap();
    Document::load_mem(&bytes).unwrap()
}

#[tokio::test]
async fn test_every_page_numbered_against_total() {
    let mut assembly = numbered(1);
    assembly.add_bytes(letter_pdf(2), None);
    assembly.add_bytes(letter_pdf(1), None);

    let doc = render(&assembly).await;

    for page in 1..=3 {
        assert!(
            page_text(&doc, page).contains(&format!("Page {page} of 3")),
            "page {page}: {:?}",
            page_text(&doc, page)
        );
    }
}

#[tokio::test]
async fn test_first_page_number_skips_leading_pages() {
    let mut assembly = numbered(3);
    assembly.add_bytes(letter_pdf(2), None);
    assembly.add_bytes(letter_pdf(3), None);

    let doc = render(&assembly).await;

    assert!(!page_text(&doc, 1).contains("Page"));
    assert!(!page_text(&doc, 2).contains("Page"));
    for page in 3..=5 {
        assert!(page_text(&doc, page).contains(&format!("Page {page} of 5")));
    }
}

#[tokio::test]
async fn test_disabled_by_default() {
    let mut assembly = Assembly::new(AssemblyConfig::default()).unwrap();
    assembly.add_bytes(letter_pdf(1), None);

    let doc = render(&assembly).await;
    assert!(!page_text(&doc, 1).contains("Page 1 of 1"));
}

#[tokio::test]
async fn test_rotated_and_image_pages_numbered() {
    let dir = TempDir::new().unwrap();
    let image = write_image(dir.path(), "wide.png", 300, 100, ImageFormat::Png);

    let mut assembly = numbered(1);
    assembly.add_bytes(pdf_bytes(&[A4_LANDSCAPE, LETTER]), None);
    assembly
        .add_file(&image, roverpdf::mime::PNG, None)
        .unwrap();

    let doc = render(&assembly).await;

    assert!(page_text(&doc, 1).contains("Page 1 of 3"));
    assert!(page_text(&doc, 2).contains("Page 2 of 3"));
    assert!(page_text(&doc, 3).contains("Page 3 of 3"));
}

#[tokio::test]
async fn test_source_text_kept_next_to_label() {
    let mut assembly = numbered(1);
    assembly.add_bytes(letter_pdf(1), None);

    let text = page_text(&render(&assembly).await, 1);
    assert!(text.contains("Source 1"));
    assert!(text.contains("Page 1 of 1"));
}
