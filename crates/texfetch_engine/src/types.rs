use std::fmt;
use std::io;
use std::path::PathBuf;

use texfetch_core::UnknownFormat;

use crate::{CompileError, PersistError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchError {
    pub kind: FailureKind,
    pub message: String,
}

impl FetchError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl std::error::Error for FetchError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    HttpStatus(u16),
    Timeout,
    RedirectLimitExceeded,
    TooLarge { max_bytes: u64, actual: Option<u64> },
    Network,
    Write,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::RedirectLimitExceeded => write!(f, "redirect limit exceeded"),
            FailureKind::TooLarge { max_bytes, actual } => {
                write!(f, "response too large (max {max_bytes}, actual {actual:?})")
            }
            FailureKind::Network => write!(f, "network error"),
            FailureKind::Write => write!(f, "write error"),
        }
    }
}

/// Errors that end a run. Tool failures never show up here; they are logged
/// and surface later as a missing file.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("unknown format of {}: {source}", .path.display())]
    UnknownFormat { path: PathBuf, source: UnknownFormat },
    #[error("can't find a DVI file in {listing:?}")]
    NoDviFound { listing: Vec<String> },
    #[error("can't find a TeX file in {listing:?}")]
    NoTexFound { listing: Vec<String> },
    #[error("nothing was downloaded to {}", .0.display())]
    ArchiveMissing(PathBuf),
    #[error("work directory {}: {source}", .path.display())]
    WorkDir { path: PathBuf, source: PersistError },
    #[error(transparent)]
    Compile(#[from] CompileError),
    #[error("io error at {}: {source}", .path.display())]
    Io { path: PathBuf, source: io::Error },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// A PDF exists at this path; the viewer has been asked to open it.
    Built(PathBuf),
    /// The repository only holds a withdrawal notice for this identifier.
    Withdrawn,
}
