//! Errors returned by IR utilities
//!
//! Broken builder invariants abort through `internal_error`; everything here
//! is a recoverable failure a caller can report.

use kiln_common::CompilerError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum IrError {
    #[error("invalid type descriptor '{descriptor}' at {position}: {message}")]
    InvalidTypeDescriptor {
        descriptor: String,
        position: usize,
        message: String,
    },

    #[error("malformed function '{function}': {message}")]
    Verification { function: String, message: String },

    #[error("cannot write '{path}': {message}")]
    Io { path: String, message: String },
}

impl From<IrError> for CompilerError {
    fn from(err: IrError) -> Self {
        match err {
            IrError::InvalidTypeDescriptor { .. } => CompilerError::InvalidInput {
                message: err.to_string(),
            },
            IrError::Verification { .. } => CompilerError::InternalError {
                message: err.to_string(),
            },
            IrError::Io { .. } => CompilerError::IoError {
                message: err.to_string(),
            },
        }
    }
}
