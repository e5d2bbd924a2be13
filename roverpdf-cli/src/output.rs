//! Message formatting and display.
//!
//! Status lines go to stdout and are suppressed in quiet mode. Warnings go
//! to stderr and are always shown.

use roverpdf::{BookmarkRecord, Diagnostic};
use std::io::{self, IsTerminal};

/// Level of output message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageLevel {
    /// Informational message.
    Info,
    /// Success message.
    Success,
    /// Warning message.
    Warning,
    /// Debug/verbose message.
    Debug,
}

/// Output formatter with configurable verbosity.
pub struct OutputFormatter {
    quiet: bool,
    verbose: bool,
    colored: bool,
}

impl OutputFormatter {
    /// Create a new output formatter.
    pub fn new(quiet: bool, verbose: bool) -> Self {
        Self {
            quiet,
            verbose,
            colored: io::stdout().is_terminal() && std::env::var("TERM").is_ok(),
        }
    }

    /// Create a quiet formatter (only warnings and errors).
    pub fn quiet() -> Self {
        Self::new(true, false)
    }

    /// Print an informational message.
    pub fn info(&self, message: &str) {
        if !self.quiet {
            self.print_message(MessageLevel::Info, message);
        }
    }

    /// Print a success message.
    pub fn success(&self, message: &str) {
        if !self.quiet {
            self.print_message(MessageLevel::Success, message);
        }
    }

    /// Print a warning message.
    pub fn warning(&self, message: &str) {
        self.print_message(MessageLevel::Warning, message);
    }

    /// Print a message only in verbose mode.
    pub fn debug(&self, message: &str) {
        if self.verbose {
            self.print_message(MessageLevel::Debug, message);
        }
    }

    fn print_message(&self, level: MessageLevel, message: &str) {
        let (prefix, color_code) = match level {
            MessageLevel::Info => ("", ""),
            MessageLevel::Success => ("✓ ", "\x1b[32m"),
            MessageLevel::Warning => ("⚠ ", "\x1b[33m"),
            MessageLevel::Debug => ("→ ", "\x1b[36m"),
        };

        let line = if self.colored && !color_code.is_empty() {
            format!("{color_code}{prefix}{message}\x1b[0m")
        } else {
            format!("{prefix}{message}")
        };

        match level {
            MessageLevel::Warning => eprintln!("{line}"),
            _ => println!("{line}"),
        }
    }

    /// Print a section header.
    pub fn section(&self, title: &str) {
        if !self.quiet {
            println!("\n{title}");
        }
    }

    /// Print a labelled value in verbose mode.
    pub fn detail(&self, label: &str, value: &str) {
        if self.verbose {
            println!("  {label}: {value}");
        }
    }

    /// Print a blank line.
    pub fn blank_line(&self) {
        if !self.quiet {
            println!();
        }
    }

    /// Print the bookmark list, nested titles indented.
    pub fn bookmarks(&self, bookmarks: &[BookmarkRecord]) {
        if self.quiet || bookmarks.is_empty() {
            return;
        }

        self.section("Bookmarks");
        for bookmark in bookmarks {
            println!("  {}", bookmark_line(bookmark));
        }
    }

    /// Print one warning per skipped input.
    pub fn diagnostics(&self, diagnostics: &[Diagnostic]) {
        for diagnostic in diagnostics {
            self.warning(&format!("Skipped {}: {}", diagnostic.origin, diagnostic.message));
        }
    }

    /// Check if output should be shown.
    pub fn should_print(&self) -> bool {
        !self.quiet
    }

    /// Check if verbose output should be shown.
    pub fn is_verbose(&self) -> bool {
        self.verbose
    }

    /// Check if quiet mode is enabled.
    pub fn is_quiet(&self) -> bool {
        self.quiet
    }
}

impl Default for OutputFormatter {
    fn default() -> Self {
        Self::new(false, false)
    }
}

/// `p. 3  Title`, with child bookmarks indented.
fn bookmark_line(bookmark: &BookmarkRecord) -> String {
    match bookmark.title.strip_prefix('+') {
        Some(child) => format!("    p. {:<4} {child}", bookmark.page),
        None => format!("p. {:<4} {}", bookmark.page, bookmark.title),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_formatter() {
        let formatter = OutputFormatter::new(false, false);
        assert!(!formatter.is_quiet());
        assert!(!formatter.is_verbose());
        assert!(formatter.should_print());
    }

    #[test]
    fn test_quiet_formatter() {
        let formatter = OutputFormatter::quiet();
        assert!(formatter.is_quiet());
        assert!(!formatter.should_print());

        // Suppressed but must not panic
        formatter.info("hidden");
        formatter.bookmarks(&[BookmarkRecord {
            page: 1,
            title: "Trip".to_string(),
        }]);
    }

    #[test]
    fn test_bookmark_line() {
        let top = BookmarkRecord {
            page: 1,
            title: "Trip".to_string(),
        };
        let child = BookmarkRecord {
            page: 12,
            title: "+Hotel".to_string(),
        };

        assert_eq!(bookmark_line(&top), "p. 1    Trip");
        assert_eq!(bookmark_line(&child), "    p. 12   Hotel");
    }
}
