//! Error types for the ETL run.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, EtlError>;

/// Every failure the pipeline can hit. None of them are recovered; the
/// orchestrator halts on the first one.
#[derive(Error, Debug)]
pub enum EtlError {
    /// A source file or the source directory could not be read or parsed.
    #[error("failed to read source {}: {reason}", .path.display())]
    SourceRead { path: PathBuf, reason: String },

    /// A record is missing a required field or holds a value that cannot be
    /// coerced into the declared field type.
    #[error("schema error in {}: {reason}", .path.display())]
    Schema { path: PathBuf, reason: String },

    /// The output file or the progress log could not be written.
    #[error("failed to write {}: {source}", .path.display())]
    SinkWrite {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Coarse classification used when reporting failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    SourceRead,
    Schema,
    SinkWrite,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::SourceRead => "SourceReadError",
            ErrorKind::Schema => "SchemaError",
            ErrorKind::SinkWrite => "SinkWriteError",
        };
        f.write_str(name)
    }
}

impl EtlError {
    pub fn source_read(path: &Path, reason: impl fmt::Display) -> Self {
        EtlError::SourceRead {
            path: path.to_path_buf(),
            reason: reason.to_string(),
        }
    }

    pub fn schema(path: &Path, reason: impl fmt::Display) -> Self {
        EtlError::Schema {
            path: path.to_path_buf(),
            reason: reason.to_string(),
        }
    }

    pub fn sink_write(path: &Path, source: impl Into<io::Error>) -> Self {
        EtlError::SinkWrite {
            path: path.to_path_buf(),
            source: source.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            EtlError::SourceRead { .. } => ErrorKind::SourceRead,
            EtlError::Schema { .. } => ErrorKind::Schema,
            EtlError::SinkWrite { .. } => ErrorKind::SinkWrite,
        }
    }
}
