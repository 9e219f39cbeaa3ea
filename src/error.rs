//! Error types for pdfmeld.
//!
//! Every failure carries the offending specifier, path, or path plus page
//! index so a caller can diagnose without re-running the merge.

use std::io;
use std::path::PathBuf;

/// Result type alias for pdfmeld operations.
pub type Result<T> = std::result::Result<T, MergeError>;

/// Stable classification of a [`MergeError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Caller-fixable input problem: empty list, blank specifier or path,
    /// a specifier that matches nothing, or a malformed pattern.
    InvalidInput,
    /// A source document that cannot be opened, has no pages, or is
    /// missing an expected page.
    CorruptOrEmptyDocument,
    /// The final save failed; no output was left at the target path.
    Persistence,
    /// The post-merge display step failed; the merge itself succeeded.
    Display,
}

/// Main error type for pdfmeld operations.
#[derive(Debug, thiserror::Error)]
pub enum MergeError {
    #[error("no input specifiers were provided")]
    EmptySpecifierList,

    #[error("input specifier at position {position} is blank")]
    BlankSpecifier {
        /// Zero-based position in the caller-supplied list.
        position: usize,
    },

    #[error("invalid input pattern '{specifier}': {source}")]
    MalformedSpecifier {
        specifier: String,
        source: glob::PatternError,
    },

    #[error("failed to read a path matched by '{specifier}': {source}")]
    UnreadableMatch {
        specifier: String,
        source: glob::GlobError,
    },

    #[error("input '{specifier}' matched no documents")]
    NoMatches { specifier: String },

    #[error("input '{specifier}' resolved to a blank path")]
    BlankResolvedPath { specifier: String },

    #[error("failed to open PDF document {}: {reason}", path.display())]
    FailedToOpen { path: PathBuf, reason: String },

    #[error("PDF document {} has no pages", path.display())]
    EmptyDocument { path: PathBuf },

    #[error("page {index} is missing from PDF document {}", path.display())]
    MissingPage { path: PathBuf, index: usize },

    #[error("failed to create output file {}: {source}", path.display())]
    FailedToCreateOutput { path: PathBuf, source: io::Error },

    #[error("failed to write output file {}: {source}", path.display())]
    FailedToWrite { path: PathBuf, source: io::Error },

    #[error("failed to open a viewer for {}: {reason}", path.display())]
    DisplayFailed { path: PathBuf, reason: String },
}

impl MergeError {
    /// Stable kind for this error, independent of its message.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::EmptySpecifierList
            | Self::BlankSpecifier { .. }
            | Self::MalformedSpecifier { .. }
            | Self::UnreadableMatch { .. }
            | Self::NoMatches { .. }
            | Self::BlankResolvedPath { .. } => ErrorKind::InvalidInput,
            Self::FailedToOpen { .. } | Self::EmptyDocument { .. } | Self::MissingPage { .. } => {
                ErrorKind::CorruptOrEmptyDocument
            }
            Self::FailedToCreateOutput { .. } | Self::FailedToWrite { .. } => {
                ErrorKind::Persistence
            }
            Self::DisplayFailed { .. } => ErrorKind::Display,
        }
    }

    /// Process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self.kind() {
            ErrorKind::InvalidInput => 1,
            ErrorKind::CorruptOrEmptyDocument => 3,
            ErrorKind::Persistence => 5,
            ErrorKind::Display => 0,
        }
    }
}
