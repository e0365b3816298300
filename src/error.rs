use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by the scrolling core and its sensor sources
#[derive(Debug, Error)]
pub enum Error {
    #[error("attempted to render before text was set")]
    MissingText,
    #[error("attempted to render before bounds were set")]
    MissingBounds,
    #[error("attempted to render before max width was set")]
    MissingMaxWidth,
    #[error("text to scroll must not be empty")]
    EmptyText,
    #[error("{path}:{line}: expected three numbers, got {content:?}")]
    ReplayParse {
        path: PathBuf,
        line: usize,
        content: String,
    },
    #[error("{path}: not a usable TrueType or OpenType font")]
    InvalidFont { path: PathBuf },
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
