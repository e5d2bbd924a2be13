//! Reporting of per-entry failures.
//!
//! Entries that cannot be admitted, rendered or imported are skipped rather
//! than failing the whole assembly. Each such failure is handed to a
//! [`DiagnosticSink`] exactly once. The default sink forwards to `tracing`;
//! [`CollectingSink`] keeps them for inspection.

use serde::Serialize;
use std::sync::{Mutex, PoisonError};

use crate::error::{ErrorKind, RoverError};

/// A reported failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    /// Pipeline stage.
    pub kind: ErrorKind,
    /// Registry position of the entry, when it made it into the registry.
    pub entry: Option<usize>,
    /// Path or description of the source.
    pub origin: String,
    /// Rendered error message.
    pub message: String,
}

impl Diagnostic {
    /// Build a diagnostic from an error.
    pub fn from_error(error: &RoverError, entry: Option<usize>, origin: impl Into<String>) -> Self {
        Self {
            kind: error.kind(),
            entry,
            origin: origin.into(),
            message: error.to_string(),
        }
    }
}

/// Receiver for per-entry failures.
pub trait DiagnosticSink: Send + Sync {
    /// Handle one diagnostic.
    fn report(&self, diagnostic: &Diagnostic);
}

/// Forwards diagnostics to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn report(&self, diagnostic: &Diagnostic) {
        match diagnostic.kind {
            ErrorKind::Admission | ErrorKind::Render | ErrorKind::Import => {
                tracing::warn!(
                    kind = %diagnostic.kind,
                    entry = ?diagnostic.entry,
                    origin = %diagnostic.origin,
                    "{}",
                    diagnostic.message
                );
            }
            _ => {
                tracing::error!(
                    kind = %diagnostic.kind,
                    entry = ?diagnostic.entry,
                    origin = %diagnostic.origin,
                    "{}",
                    diagnostic.message
                );
            }
        }
    }
}

/// Keeps every diagnostic in memory.
#[derive(Debug, Default)]
pub struct CollectingSink {
    diagnostics: Mutex<Vec<Diagnostic>>,
}

impl CollectingSink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of everything reported so far.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.diagnostics
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of diagnostics of the given kind.
    pub fn count(&self, kind: ErrorKind) -> usize {
        self.diagnostics
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|d| d.kind == kind)
            .count()
    }
}

impl DiagnosticSink for CollectingSink {
    fn report(&self, diagnostic: &Diagnostic) {
        self.diagnostics
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(diagnostic.clone());
    }
}
