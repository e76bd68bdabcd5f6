//! Kiln IR - Common Types and Utilities
//! 
//! This crate contains the error definitions, diagnostics sink and
//! source locations shared by the IR crate and the driver.

pub mod error;
pub mod source_loc;

pub use error::{internal_error, CompilerError, Diagnostic, ErrorReporter, Severity};
pub use source_loc::SourceLocation;
