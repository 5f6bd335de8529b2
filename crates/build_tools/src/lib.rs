//! # Build Order Tools
//!
//! Command-line plumbing around the engine:
//! - Loading catalog and build order files
//! - Catalog validation
//! - Report rendering as text, RON or JSON
//!
//! The engine itself never touches the filesystem; everything that reads
//! a file lives here.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod load;
pub mod render;
pub mod validate;

use build_core::error::BuildError;
use thiserror::Error;

/// Errors raised by the tools.
#[derive(Debug, Error)]
pub enum ToolError {
    /// Failed to read a file.
    #[error("Failed to read file '{path}': {source}")]
    Io {
        /// Path to the file.
        path: String,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The engine rejected the input or could not schedule it.
    #[error(transparent)]
    Build(#[from] BuildError),

    /// The catalog has integrity problems.
    #[error("Catalog '{path}' has {} problem(s):\n  {}", .problems.len(), .problems.join("\n  "))]
    InvalidCatalog {
        /// Path to the catalog.
        path: String,
        /// Every problem found.
        problems: Vec<String>,
    },

    /// A report could not be encoded.
    #[error("Failed to encode report as {format}: {message}")]
    Encode {
        /// Output format.
        format: &'static str,
        /// Encoder message.
        message: String,
    },
}

impl ToolError {
    /// Long-form explanation, when the engine gave one.
    #[must_use]
    pub fn long_description(&self) -> Option<&str> {
        match self {
            Self::Build(err) => err.long_description(),
            _ => None,
        }
    }
}

/// Result type for the tools.
pub type ToolResult<T> = Result<T, ToolError>;
