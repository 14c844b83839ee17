use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by [`crate::Source`]'s line-buffer operations.
#[derive(Error, Debug)]
pub enum SourceError {
    /// An index passed to `get`/`insert`/`remove` is out of range.
    #[error("line {0} is out of range")]
    LineOutOfRange(usize),
    /// Reading or writing a source file failed.
    #[error("cannot access {path}: {source}")]
    FileAccessError {
        /// Path that could not be accessed.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

/// Errors raised while assembling a [`crate::Source`] into an object image.
#[derive(Error, Debug)]
pub enum AssembleError {
    /// A line failed to parse or violated a semantic rule, e.g. a duplicate
    /// symbol or an unknown mnemonic.
    #[error("line {line}: {reason}")]
    ParseError {
        /// 1-based line number in the fully expanded source.
        line: usize,
        /// Human-readable description of the failure.
        reason: String,
    },
    /// An `.include` or on-disk source file could not be read.
    #[error(transparent)]
    Source(#[from] SourceError),
}

pub type SourceResult<T> = Result<T, SourceError>;
pub type AssembleResult<T> = Result<T, AssembleError>;
