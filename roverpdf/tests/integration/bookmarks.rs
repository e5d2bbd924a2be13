//! Outline structure produced from bookmark titles.

use lopdf::{Document, Object};
use roverpdf::{Assembly, AssemblyConfig};

use crate::common::{OutlineEntry, letter_pdf, read_outline};

fn entry(title: &str, page: usize, children: Vec<OutlineEntry>) -> OutlineEntry {
    OutlineEntry {
        title: title.to_string(),
        page,
        children,
    }
}

async fn assemble(titles: &[Option<&str>]) -> Document {
    let mut assembly = Assembly::new(AssemblyConfig::default()).unwrap();
    for title in titles {
        assembly.add_bytes(letter_pdf(2), title.map(str::to_string));
    }
    let (bytes, _) = assembly.to_bytes().await.unwrap().unwrap();
    Document::load_mem(&bytes).unwrap()
}

#[tokio::test]
async fn test_plus_titles_nest_under_last_top_level() {
    let doc = assemble(&[Some("A"), Some("+B"), Some("+C"), Some("D"), Some("+E")]).await;

    assert_eq!(
        read_outline(&doc),
        vec![
            entry(
                "A",
                1,
                vec![entry("B", 3, vec![]), entry("C", 5, vec![])]
            ),
            entry("D", 7, vec![entry("E", 9, vec![])]),
        ]
    );
}

#[tokio::test]
async fn test_leading_plus_title_is_top_level() {
    let doc = assemble(&[Some("+Orphan"), Some("A"), Some("+Child")]).await;

    assert_eq!(
        read_outline(&doc),
        vec![
            entry("Orphan", 1, vec![]),
            entry("A", 3, vec![entry("Child", 5, vec![])]),
        ]
    );
}

#[tokio::test]
async fn test_untitled_entries_do_not_move_scope() {
    let doc = assemble(&[Some("A"), None, Some("+B")]).await;

    assert_eq!(
        read_outline(&doc),
        vec![entry("A", 1, vec![entry("B", 5, vec![])])]
    );
}

#[tokio::test]
async fn test_no_titles_no_outline() {
    let doc = assemble(&[None, None]).await;
    let catalog = doc.catalog().unwrap();

    assert!(!catalog.has(b"Outlines"));
    assert!(!catalog.has(b"PageMode"));
}

#[tokio::test]
async fn test_outline_opens_in_viewer() {
    let doc = assemble(&[Some("A")]).await;
    let page_mode = doc.catalog().unwrap().get(b"PageMode").unwrap();

    assert!(matches!(page_mode, Object::Name(name) if name == b"UseOutlines"));
}

#[tokio::test]
async fn test_unicode_titles() {
    let doc = assemble(&[Some("Überblick"), Some("+日本旅行")]).await;

    assert_eq!(
        read_outline(&doc),
        vec![entry("Überblick", 1, vec![entry("日本旅行", 3, vec![])])]
    );
}

#[tokio::test]
async fn test_failed_entry_gets_no_bookmark_but_keeps_scope() {
    let mut assembly = Assembly::new(AssemblyConfig::default()).unwrap();
    assembly.add_bytes(letter_pdf(1), Some("A".to_string()));
    assembly.add_bytes(b"garbage".to_vec(), Some("Broken".to_string()));
    assembly.add_bytes(letter_pdf(1), Some("+B".to_string()));

    let (bytes, result) = assembly.to_bytes().await.unwrap().unwrap();
    let doc = Document::load_mem(&bytes).unwrap();

    assert_eq!(result.bookmarks.len(), 2);
    assert_eq!(
        read_outline(&doc),
        vec![entry("A", 1, vec![entry("B", 2, vec![])])]
    );
}
