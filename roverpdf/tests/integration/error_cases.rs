//! Refused and failing entries.

use roverpdf::{Assembly, AssemblyConfig, CollectingSink, ErrorKind, RoverError, mime};
use std::sync::Arc;
use tempfile::TempDir;

use crate::common::{LETTER, letter_pdf, write_bytes, write_pdf};

fn assembly() -> (Arc<CollectingSink>, Assembly) {
    let sink = Arc::new(CollectingSink::new());
    let assembly = Assembly::new(AssemblyConfig::default())
        .unwrap()
        .with_sink(sink.clone());
    (sink, assembly)
}

#[test]
fn test_unsupported_mime_type_refused() {
    let dir = TempDir::new().unwrap();
    let path = write_bytes(dir.path(), "notes.txt", b"hello");

    let (sink, mut assembly) = assembly();
    let err = assembly.add_file(&path, "text/plain", None).unwrap_err();

    assert!(matches!(err, RoverError::UnsupportedMimeType { .. }));
    assert_eq!(assembly.count(), 0);
    assert_eq!(sink.count(ErrorKind::Admission), 1);
}

#[test]
fn test_missing_file_refused() {
    let dir = TempDir::new().unwrap();

    let (sink, mut assembly) = assembly();
    let err = assembly
        .add_file(dir.path().join("missing.pdf"), mime::PDF, None)
        .unwrap_err();

    assert!(matches!(err, RoverError::FileNotFound { .. }));
    assert_eq!(err.exit_code(), 2);
    assert_eq!(sink.diagnostics()[0].entry, None);
}

#[test]
fn test_directory_refused() {
    let dir = TempDir::new().unwrap();

    let (_, mut assembly) = assembly();
    let err = assembly.add_file(dir.path(), mime::PDF, None).unwrap_err();

    assert!(matches!(err, RoverError::NotAFile { .. }));
    assert_eq!(assembly.count(), 0);
}

#[test]
fn test_mime_type_must_match_exactly() {
    let dir = TempDir::new().unwrap();
    let path = write_pdf(dir.path(), "a.pdf", &[LETTER]);

    let (sink, mut assembly) = assembly();
    let err = assembly.add_file(&path, " IMAGE/PNG ", None).unwrap_err();
    assert!(matches!(err, RoverError::UnsupportedMimeType { .. }));

    assembly.add_file(&path, mime::PDF, None).unwrap();
    assert_eq!(assembly.count(), 1);
    assert_eq!(sink.count(ErrorKind::Admission), 1);
}

#[tokio::test]
async fn test_corrupt_image_skipped() {
    let dir = TempDir::new().unwrap();
    let image = write_bytes(dir.path(), "broken.png", b"\x89PNG\r\n\x1a\nnot really");

    let (sink, mut assembly) = assembly();
    assembly.add_bytes(letter_pdf(1), Some("Good".to_string()));
    assembly
        .add_file(&image, mime::PNG, Some("+Broken".to_string()))
        .unwrap();

    let (_, result) = assembly.to_bytes().await.unwrap().unwrap();

    assert_eq!(result.page_count, 1);
    assert_eq!(result.bookmarks.len(), 1);
    let diagnostics = sink.diagnostics();
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].kind, ErrorKind::Render);
    assert_eq!(diagnostics[0].entry, Some(1));
}

#[tokio::test]
async fn test_corrupt_pdf_file_skipped() {
    let dir = TempDir::new().unwrap();
    let broken = write_bytes(dir.path(), "broken.pdf", b"this is not a pdf");

    let (sink, mut assembly) = assembly();
    assembly.add_file(&broken, mime::PDF, None).unwrap();
    assembly.add_bytes(letter_pdf(2), None);

    let (_, result) = assembly.to_bytes().await.unwrap().unwrap();

    assert_eq!(result.page_count, 2);
    assert_eq!(sink.count(ErrorKind::Import), 1);
}

#[tokio::test]
async fn test_file_removed_after_admission_skipped() {
    let dir = TempDir::new().unwrap();
    let path = write_pdf(dir.path(), "gone.pdf", &[LETTER]);

    let (sink, mut assembly) = assembly();
    assembly.add_file(&path, mime::PDF, None).unwrap();
    std::fs::remove_file(&path).unwrap();

    let (_, result) = assembly.to_bytes().await.unwrap().unwrap();

    assert_eq!(result.page_count, 0);
    assert_eq!(sink.count(ErrorKind::Render), 1);
}

#[tokio::test]
async fn test_refused_files_leave_nothing_to_save() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("out.pdf");

    let (_, mut assembly) = assembly();
    let _ = assembly.add_file(dir.path().join("missing.pdf"), mime::PDF, None);

    let result = assembly.save_to_path(&output).await.unwrap();

    assert_eq!(result.page_count, 0);
    assert!(!output.exists());
}

#[tokio::test]
async fn test_unwritable_output_is_fatal() {
    let dir = TempDir::new().unwrap();
    let blocker = write_bytes(dir.path(), "file", b"not a directory");

    let (_, mut assembly) = assembly();
    assembly.add_bytes(letter_pdf(1), None);

    let err = assembly
        .save_to_path(&blocker.join("out.pdf"))
        .await
        .unwrap_err();
    assert!(!err.is_recoverable());
}

#[test]
fn test_unknown_page_number_font_rejected() {
    let config = AssemblyConfig {
        include_page_numbers: true,
        page_number_font: "Wingdings".to_string(),
        ..AssemblyConfig::default()
    };

    let err = Assembly::new(config).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Config);
}
