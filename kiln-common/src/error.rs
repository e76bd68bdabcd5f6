//! Error handling for the Kiln IR
//!
//! This module defines the two error tiers used while building IR:
//! recoverable diagnostics collected in an [`ErrorReporter`], and internal
//! compiler errors raised through [`internal_error`], which abort at once.

use crate::source_loc::SourceLocation;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Top-level error type returned by IR consumers and the driver
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CompilerError {
    #[error("IR construction failed: {summary}")]
    IrConstruction { summary: String },

    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    #[error("IO error: {message}")]
    IoError { message: String },

    #[error("Internal compiler error: {message}")]
    InternalError { message: String },
}

/// Abort on a broken IR invariant.
///
/// Only code that builds IR can trigger these, never user source, so the
/// process stops instead of handing a malformed graph to later passes.
#[track_caller]
pub fn internal_error(message: impl fmt::Display) -> ! {
    log::error!("internal compiler error: {message}");
    panic!("internal compiler error: {message}");
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    Error,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

/// A diagnostic message with optional location and severity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
    pub location: Option<SourceLocation>,
    pub notes: Vec<String>,
}

impl Diagnostic {
    pub fn error(message: String, location: Option<SourceLocation>) -> Self {
        Self {
            severity: Severity::Error,
            message,
            location,
            notes: Vec::new(),
        }
    }

    pub fn warning(message: String, location: Option<SourceLocation>) -> Self {
        Self {
            severity: Severity::Warning,
            message,
            location,
            notes: Vec::new(),
        }
    }

    pub fn with_note(mut self, note: String) -> Self {
        self.notes.push(note);
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(location) = &self.location {
            write!(f, "{location}: ")?;
        }
        write!(f, "{}: {}", self.severity, self.message)?;

        for note in &self.notes {
            write!(f, "\n  note: {note}")?;
        }

        Ok(())
    }
}

/// Diagnostics sink: collects every recoverable problem found while
/// building a module so a single run can surface all of them.
#[derive(Debug, Default)]
pub struct ErrorReporter {
    diagnostics: Vec<Diagnostic>,
    error_count: usize,
    warning_count: usize,
}

impl ErrorReporter {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, diagnostic: Diagnostic) -> &mut Diagnostic {
        log::warn!("{diagnostic}");
        let index = self.diagnostics.len();
        self.diagnostics.push(diagnostic);
        &mut self.diagnostics[index]
    }

    /// Report an error diagnostic
    pub fn error(&mut self, message: String, location: Option<SourceLocation>) -> &mut Diagnostic {
        self.error_count += 1;
        self.push(Diagnostic::error(message, location))
    }

    /// Report a warning diagnostic
    pub fn warning(&mut self, message: String, location: Option<SourceLocation>) -> &mut Diagnostic {
        self.warning_count += 1;
        self.push(Diagnostic::warning(message, location))
    }

    /// Check if any errors have been reported
    pub fn has_errors(&self) -> bool {
        self.error_count > 0
    }

    pub fn error_count(&self) -> usize {
        self.error_count
    }

    pub fn warning_count(&self) -> usize {
        self.warning_count
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Iterate over error-severity diagnostics only
    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| d.severity == Severity::Error)
    }

    /// Clear all diagnostics
    pub fn clear(&mut self) {
        self.diagnostics.clear();
        self.error_count = 0;
        self.warning_count = 0;
    }

    /// Print all diagnostics to stderr
    pub fn print_diagnostics(&self) {
        for diagnostic in &self.diagnostics {
            eprintln!("{diagnostic}");
        }
    }

    /// Fail if any error was reported
    pub fn check(&self) -> Result<(), CompilerError> {
        if self.has_errors() {
            Err(CompilerError::IrConstruction { summary: self.summary() })
        } else {
            Ok(())
        }
    }

    /// Create a summary string
    pub fn summary(&self) -> String {
        match (self.error_count, self.warning_count) {
            (0, 0) => "No errors or warnings".to_string(),
            (0, w) => format!("{} warning{}", w, if w == 1 { "" } else { "s" }),
            (e, 0) => format!("{} error{}", e, if e == 1 { "" } else { "s" }),
            (e, w) => format!(
                "{} error{} and {} warning{}",
                e,
                if e == 1 { "" } else { "s" },
                w,
                if w == 1 { "" } else { "s" }
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_diagnostic_creation() {
        let loc = SourceLocation::new("test.kl", 1, 1);
        let diag = Diagnostic::error("Test error".to_string(), Some(loc.clone()));
        assert_eq!(diag.severity, Severity::Error);
        assert_eq!(diag.message, "Test error");
        assert_eq!(diag.location, Some(loc));
        assert_eq!(diag.to_string(), "test.kl:1:1: error: Test error");
    }

    #[test]
    fn test_error_reporter() {
        let mut reporter = ErrorReporter::new();
        assert!(!reporter.has_errors());
        assert!(reporter.check().is_ok());

        reporter.error("type not matched".to_string(), None);
        assert!(reporter.has_errors());
        assert_eq!(reporter.error_count(), 1);
        assert_eq!(reporter.errors().count(), 1);
        assert_eq!(
            reporter.check(),
            Err(CompilerError::IrConstruction { summary: "1 error".to_string() })
        );
    }

    #[test]
    fn test_diagnostic_with_notes() {
        let mut reporter = ErrorReporter::new();
        reporter
            .warning("operand types differ".to_string(), None)
            .notes
            .push("lhs is i32".to_string());

        let diag = &reporter.diagnostics()[0];
        assert_eq!(diag.notes, vec!["lhs is i32".to_string()]);
        assert_eq!(diag.to_string(), "warning: operand types differ\n  note: lhs is i32");

        let built = Diagnostic::warning("operand types differ".to_string(), None)
            .with_note("lhs is i32".to_string());
        assert_eq!(&built, diag);
    }

    #[test]
    fn test_summary() {
        let mut reporter = ErrorReporter::new();
        assert_eq!(reporter.summary(), "No errors or warnings");

        reporter.error("Error 1".to_string(), None);
        assert_eq!(reporter.summary(), "1 error");

        reporter.error("Error 2".to_string(), None);
        assert_eq!(reporter.summary(), "2 errors");

        reporter.warning("Warning 1".to_string(), None);
        assert_eq!(reporter.summary(), "2 errors and 1 warning");

        reporter.clear();
        assert_eq!(reporter.summary(), "No errors or warnings");
    }

    #[test]
    #[should_panic(expected = "internal compiler error: broken invariant")]
    fn test_internal_error_panics() {
        internal_error("broken invariant");
    }
}
