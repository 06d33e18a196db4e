use std::fmt;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// The two ways a search request can fail outright.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchErrorKind {
    InvalidPattern,
    PathNotFound,
}

impl fmt::Display for SearchErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SearchErrorKind::InvalidPattern => write!(f, "invalid_pattern"),
            SearchErrorKind::PathNotFound => write!(f, "path_not_found"),
        }
    }
}

/// Fail-fast search error. `Display` is the message sent back on the wire.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct SearchError {
    pub kind: SearchErrorKind,
    pub message: String,
}

impl SearchError {
    pub fn invalid_pattern(err: &regex::Error) -> Self {
        Self {
            kind: SearchErrorKind::InvalidPattern,
            message: format!("Invalid regex pattern: {err}"),
        }
    }

    pub fn path_not_found(path: &str) -> Self {
        Self {
            kind: SearchErrorKind::PathNotFound,
            message: format!("Search path does not exist: {path}"),
        }
    }
}

#[derive(Error, Debug)]
pub enum ListError {
    #[error("Directory does not exist: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    #[error("Failed to read directory {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

#[derive(Error, Debug)]
pub enum CodeseekError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Metrics error: {0}")]
    Metrics(#[from] prometheus::Error),

    #[error(transparent)]
    Search(#[from] SearchError),

    #[error(transparent)]
    List(#[from] ListError),

    #[error("An unexpected error occurred: {0}")]
    Other(String),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, CodeseekError>;
