//! Error types for torrent creation.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while creating a torrent.
///
/// Every failure aborts the whole operation; no partial metainfo is ever
/// produced or written.
#[derive(Debug, Error)]
pub enum Error {
    /// A caller-supplied value is malformed or out of range.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The input directory or the output directory does not exist.
    #[error("Path not found: {}", .0.display())]
    PathNotFound(PathBuf),

    /// A file could not be read or written.
    #[error("I/O failure on {}: {source}", path.display())]
    Io {
        /// The file being accessed
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: io::Error,
    },

    /// The metainfo could not be bencoded.
    #[error("Failed to encode metainfo: {0}")]
    Encode(#[from] serde_bencode::Error),
}

impl Error {
    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        Error::InvalidArgument(reason.into())
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
