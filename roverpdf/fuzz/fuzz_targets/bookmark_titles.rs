#![no_main]

use libfuzzer_sys::fuzz_target;
use roverpdf::assemble::{OutlineScope, OutlineTree};
use roverpdf::assemble::outline::NESTED_PREFIX;

fuzz_target!(|data: &[u8]| {
    let text = String::from_utf8_lossy(data);
    let mut tree = OutlineTree::new();
    let mut scope = OutlineScope::Root;

    let titles: Vec<&str> = text.split('\n').collect();
    for (page, title) in titles.iter().enumerate() {
        let record = tree.add_bookmark(&mut scope, title, page);
        assert_eq!(record.page, page + 1);
        assert_eq!(&record.title, title);
    }

    assert_eq!(tree.len(), titles.len());

    // Nesting never goes deeper than one level.
    for &root in tree.roots() {
        let node = tree.node(root).unwrap();
        for &child in node.children() {
            assert!(tree.node(child).unwrap().children().is_empty());
        }
    }

    let top_level = titles
        .iter()
        .filter(|title| !title.starts_with(NESTED_PREFIX))
        .count();
    assert!(tree.roots().len() >= top_level);
});
