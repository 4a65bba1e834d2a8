// src/error.rs

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("failed to parse {path}: {reason}")]
    Parse { path: String, reason: String },

    #[error("commit {oldest} is not reachable from {latest} on the current branch")]
    RangeNotFound { oldest: String, latest: String },

    #[error("cannot resolve commit `{spec}`: {reason}")]
    UnknownCommit { spec: String, reason: String },

    #[error("git error: {0}")]
    Git(#[from] git2::Error),

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to walk directory: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("malformed row at line {line}: {reason}")]
    InvalidRow { line: usize, reason: String },
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
