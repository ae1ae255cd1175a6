use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Recoverable per-file failures collected during a run.
///
/// Fatal setup problems are reported with `anyhow` instead,
/// since the run cannot continue after them.
#[derive(Error, Debug)]
pub enum DedupeError {
    #[error("Failed to read metadata for '{path}': {source}")]
    Metadata {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("'{path}' is not inside the collection root '{root}'")]
    OutsideRoot { path: PathBuf, root: PathBuf },

    #[error("Destination already exists: '{path}'")]
    DestinationExists { path: PathBuf },

    #[error("Failed to create directory '{path}': {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to move '{from}' to '{to}': {source}")]
    Move {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: io::Error,
    },
}
