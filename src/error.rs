use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Hard, file-level failure. Field absence is never an error.
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("failed to read {path}: {source}")]
    Read { path: PathBuf, source: io::Error },
    #[error("failed to parse {path} as JSON: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

impl DocumentError {
    pub fn path(&self) -> &Path {
        match self {
            DocumentError::Read { path, .. } | DocumentError::Parse { path, .. } => path,
        }
    }
}

/// Failure of a scan as a whole, as opposed to one of its documents.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("archive root {0} is not a directory")]
    NotADirectory(PathBuf),
    #[error(transparent)]
    Walk(#[from] walkdir::Error),
}
