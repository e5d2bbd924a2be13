#![no_main]

use libfuzzer_sys::fuzz_target;
use roverpdf::{Assembly, AssemblyConfig, CollectingSink};
use std::sync::{Arc, OnceLock};
use tokio::runtime::{Builder, Runtime};

static RUNTIME: OnceLock<Runtime> = OnceLock::new();

fn runtime() -> &'static Runtime {
    RUNTIME.get_or_init(|| Builder::new_current_thread().enable_all().build().unwrap())
}

fuzz_target!(|data: &[u8]| {
    let sink = Arc::new(CollectingSink::new());
    let config = AssemblyConfig {
        include_page_numbers: true,
        ..AssemblyConfig::default()
    };
    let mut assembly = Assembly::new(config).unwrap().with_sink(sink.clone());
    assembly.add_bytes(data.to_vec(), Some("Fuzz".to_string()));

    // Arbitrary bytes are either imported or skipped with a diagnostic,
    // never a panic.
    let result = runtime().block_on(assembly.assemble());

    if let Ok(Some(assembled)) = result {
        let result = assembled.result();
        if result.page_count == 0 {
            assert!(result.bookmarks.is_empty());
        } else {
            assert_eq!(result.bookmarks.len(), 1);
            assert_eq!(result.bookmarks[0].page, 1);
            assert!(sink.diagnostics().is_empty());
        }
    }
});
