//! Error types for OS-touching path operations.

use std::io;

use thiserror::Error;

use crate::path::Path;

/// Errors from filesystem-delegating path operations.
///
/// Pure path algebra never fails; only operations that touch the OS produce
/// these. Two-path operations always carry both endpoints so callers can
/// build a precise message.
#[derive(Error, Debug)]
pub enum FileError {
    #[error("Source does not exist: {path}")]
    SourceMissing { path: Path },

    #[error("Destination already exists: {dest} (from {source_path})")]
    DestinationExists { source_path: Path, dest: Path },

    #[error("Not a directory: {path}")]
    NotADirectory { path: Path },

    #[error("Operation on {path} failed: {source}")]
    Io {
        path: Path,
        #[source]
        source: io::Error,
    },

    #[error("Operation from {source_path} to {dest} failed: {source}")]
    TwoPathIo {
        source_path: Path,
        dest: Path,
        #[source]
        source: io::Error,
    },
}

impl FileError {
    /// Attach single-path context to an I/O error.
    pub(crate) fn io(path: &Path, source: io::Error) -> Self {
        FileError::Io {
            path: path.clone(),
            source,
        }
    }

    /// Attach two-path context to an I/O error.
    pub(crate) fn two_path_io(source_path: &Path, dest: &Path, source: io::Error) -> Self {
        FileError::TwoPathIo {
            source_path: source_path.clone(),
            dest: dest.clone(),
            source,
        }
    }
}
