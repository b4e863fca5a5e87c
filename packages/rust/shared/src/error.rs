//! Error types for glossimport.
//!
//! Library crates use [`GlossImportError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all glossimport operations.
#[derive(Debug, thiserror::Error)]
pub enum GlossImportError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// A source row does not have the fixed column layout.
    #[error("invalid row #{row}: {raw}")]
    MalformedRow { row: usize, raw: String },

    /// A header row was expected but does not match the fixed column layout.
    #[error("unexpected header row: {found}")]
    MalformedHeader { found: String },

    /// A row was extracted but the resulting concept failed validation.
    #[error("invalid concept at row #{row} ({reasons}): {raw}")]
    InvalidConcept {
        row: usize,
        raw: String,
        reasons: String,
    },

    /// The CSV reader failed before a row could be inspected.
    #[error("CSV error at row #{row}: {message}")]
    Csv { row: usize, message: String },

    /// Writing an output record failed.
    #[error("failed to write record {path:?}: {source}")]
    WriteFailure {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// YAML, JSON or TOML serialization error.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// The run was interrupted between rows.
    #[error("import cancelled after {completed} concept(s)")]
    Cancelled { completed: usize },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, GlossImportError>;

impl GlossImportError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Wrap a failed record write.
    pub fn write_failure(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::WriteFailure {
            path: path.into(),
            source,
        }
    }

    /// The 1-based source row this error refers to, if any.
    pub fn row(&self) -> Option<usize> {
        match self {
            Self::MalformedRow { row, .. }
            | Self::InvalidConcept { row, .. }
            | Self::Csv { row, .. } => Some(*row),
            _ => None,
        }
    }
}
