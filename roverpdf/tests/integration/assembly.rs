//! End-to-end assembly of PDFs and images.

use image::ImageFormat;
use lopdf::Document;
use roverpdf::assemble::metadata::get_metadata;
use roverpdf::render::raster::{A4_HEIGHT, A4_WIDTH};
use roverpdf::{Assembly, AssemblyConfig, CollectingSink, CompressionLevel, Metadata, mime};
use rstest::rstest;
use std::sync::Arc;
use tempfile::TempDir;

use crate::common::{
    A4_LANDSCAPE, LETTER, letter_pdf, media_box, page_ids, page_text, pdf_bytes, rotation,
    write_image, write_pdf,
};

fn assembly() -> (Arc<CollectingSink>, Assembly) {
    let sink = Arc::new(CollectingSink::new());
    let assembly = Assembly::new(AssemblyConfig::default())
        .unwrap()
        .with_sink(sink.clone());
    (sink, assembly)
}

#[tokio::test]
async fn test_trip_bundle() {
    let dir = TempDir::new().unwrap();
    let itinerary = write_pdf(dir.path(), "itinerary.pdf", &[LETTER, LETTER, LETTER]);
    let boarding = write_image(dir.path(), "boarding.png", 400, 200, ImageFormat::Png);
    let hotel = write_pdf(dir.path(), "hotel.pdf", &[LETTER, LETTER]);
    let output = dir.path().join("trip.pdf");

    let (sink, mut assembly) = assembly();
    assembly
        .add_file(&itinerary, mime::PDF, Some("Trip".to_string()))
        .unwrap();
    assembly
        .add_file(&boarding, mime::PNG, Some("+Boarding Pass".to_string()))
        .unwrap();
    assembly
        .add_file(&hotel, mime::PDF, Some("+Hotel".to_string()))
        .unwrap();
    assembly.add_bytes(letter_pdf(1), Some("Appendix".to_string()));

    let result = assembly.save_to_path(&output).await.unwrap();

    assert_eq!(result.page_count, 7);
    let pages: Vec<(usize, &str)> = result
        .bookmarks
        .iter()
        .map(|b| (b.page, b.title.as_str()))
        .collect();
    assert_eq!(
        pages,
        vec![
            (1, "Trip"),
            (4, "+Boarding Pass"),
            (5, "+Hotel"),
            (7, "Appendix")
        ]
    );
    assert!(sink.diagnostics().is_empty());

    let doc = Document::load(&output).unwrap();
    assert_eq!(doc.get_pages().len(), 7);

    // The image page is A4 portrait and needs no /Rotate.
    let image_page = page_ids(&doc)[3];
    let [_, _, width, height] = media_box(&doc, image_page);
    assert!((width - A4_WIDTH).abs() < 0.01);
    assert!((height - A4_HEIGHT).abs() < 0.01);
    assert_eq!(rotation(&doc, image_page), 0);
}

#[tokio::test]
async fn test_pdf_then_bookmarked_photo() {
    let dir = TempDir::new().unwrap();
    let pdf = write_pdf(dir.path(), "a.pdf", &[LETTER, LETTER]);
    let photo = write_image(dir.path(), "b.jpg", 64, 48, ImageFormat::Jpeg);

    let (_, mut assembly) = assembly();
    assembly.add_file(&pdf, mime::PDF, None).unwrap();
    assembly
        .add_file(&photo, mime::JPEG, Some("Trip".to_string()))
        .unwrap();

    let (_, result) = assembly.to_bytes().await.unwrap().unwrap();

    assert_eq!(result.page_count, 3);
    assert_eq!(result.bookmarks.len(), 1);
    assert_eq!(result.bookmarks[0].page, 3);
    assert_eq!(result.bookmarks[0].title, "Trip");
}

#[tokio::test]
async fn test_source_content_survives_import() {
    let (_, mut assembly) = assembly();
    assembly.add_bytes(letter_pdf(2), None);
    assembly.add_bytes(letter_pdf(1), None);

    let (bytes, _) = assembly.to_bytes().await.unwrap().unwrap();
    let doc = Document::load_mem(&bytes).unwrap();

    assert!(page_text(&doc, 2).contains("Source 2"));
    assert!(page_text(&doc, 3).contains("Source 1"));
}

#[rstest]
#[case("scan.png", ImageFormat::Png, mime::PNG)]
#[case("photo.jpg", ImageFormat::Jpeg, mime::JPEG)]
#[case("fax.bmp", ImageFormat::Bmp, mime::BMP)]
#[tokio::test]
async fn test_each_image_becomes_one_a4_page(
    #[case] name: &str,
    #[case] format: ImageFormat,
    #[case] mime: &str,
) {
    let dir = TempDir::new().unwrap();
    let path = write_image(dir.path(), name, 120, 160, format);

    let (sink, mut assembly) = assembly();
    assembly.add_file(&path, mime, None).unwrap();

    let assembled = assembly.assemble().await.unwrap().unwrap();
    let doc = assembled.document();
    let pages = page_ids(doc);

    assert_eq!(pages.len(), 1);
    let [llx, lly, urx, ury] = media_box(doc, pages[0]);
    assert_eq!((llx, lly), (0.0, 0.0));
    assert!((urx - A4_WIDTH).abs() < 0.01);
    assert!((ury - A4_HEIGHT).abs() < 0.01);
    assert!(sink.diagnostics().is_empty());
}

#[tokio::test]
async fn test_landscape_pages_are_turned() {
    let (_, mut assembly) = assembly();
    assembly.add_bytes(pdf_bytes(&[LETTER, A4_LANDSCAPE, LETTER]), None);

    let assembled = assembly.assemble().await.unwrap().unwrap();
    let doc = assembled.document();
    let rotations: Vec<i64> = page_ids(doc).into_iter().map(|id| rotation(doc, id)).collect();

    assert_eq!(rotations, vec![0, 90, 0]);
}

#[tokio::test]
async fn test_jobs_do_not_change_order() {
    let dir = TempDir::new().unwrap();
    let mut results = Vec::new();

    for jobs in [1, 4] {
        let config = AssemblyConfig {
            jobs: Some(jobs),
            ..AssemblyConfig::default()
        };
        let mut assembly = Assembly::new(config).unwrap();
        for index in 0..6 {
            let name = format!("part{index}-{jobs}.png");
            let image = write_image(dir.path(), &name, 50 + index * 10, 80, ImageFormat::Png);
            assembly
                .add_file(&image, mime::PNG, Some(format!("Part {index}")))
                .unwrap();
            assembly.add_bytes(letter_pdf(index as usize + 1), None);
        }
        results.push(assembly.assemble().await.unwrap().unwrap().into_parts().1);
    }

    assert_eq!(results[0], results[1]);
    let pages: Vec<usize> = results[0].bookmarks.iter().map(|b| b.page).collect();
    assert_eq!(pages, vec![1, 3, 6, 10, 15, 21]);
}

#[rstest]
#[case(CompressionLevel::None)]
#[case(CompressionLevel::Standard)]
#[case(CompressionLevel::Maximum)]
#[tokio::test]
async fn test_compression_levels_produce_valid_output(#[case] compression: CompressionLevel) {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("nested").join("dir").join("out.pdf");

    let config = AssemblyConfig {
        compression,
        include_page_numbers: true,
        ..AssemblyConfig::default()
    };
    let mut assembly = Assembly::new(config).unwrap();
    assembly.add_bytes(letter_pdf(2), Some("Doc".to_string()));

    let result = assembly.save_to_path(&output).await.unwrap();
    assert_eq!(result.page_count, 2);

    let doc = Document::load(&output).unwrap();
    assert_eq!(doc.get_pages().len(), 2);
    assert!(page_text(&doc, 2).contains("Page 2 of 2"));
}

#[tokio::test]
async fn test_metadata_written() {
    let config = AssemblyConfig {
        metadata: Metadata::new(
            Some("Trip to Zürich".to_string()),
            Some("Travel Desk".to_string()),
            None,
            None,
        ),
        ..AssemblyConfig::default()
    };
    let mut assembly = Assembly::new(config).unwrap();
    assembly.add_bytes(letter_pdf(1), None);

    let (bytes, _) = assembly.to_bytes().await.unwrap().unwrap();
    let metadata = get_metadata(&Document::load_mem(&bytes).unwrap());

    assert_eq!(metadata.title.as_deref(), Some("Trip to Zürich"));
    assert_eq!(metadata.author.as_deref(), Some("Travel Desk"));
    assert_eq!(metadata.subject, None);
}

#[tokio::test]
async fn test_stream_and_file_output_match_in_pages() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("out.pdf");

    let (_, mut assembly) = assembly();
    assembly.add_bytes(letter_pdf(3), Some("A".to_string()));
    assembly.add_bytes(letter_pdf(1), Some("+B".to_string()));

    let from_file = assembly.save_to_path(&output).await.unwrap();

    let mut buffer: Vec<u8> = Vec::new();
    let from_stream = assembly.save_to_writer(&mut buffer, false).await.unwrap();

    assert_eq!(from_file, from_stream);
    assert_eq!(
        Document::load(&output).unwrap().get_pages().len(),
        Document::load_mem(&buffer).unwrap().get_pages().len()
    );
}
