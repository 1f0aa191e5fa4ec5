use std::path::PathBuf;
use thiserror::Error;

/// Rejected command line input. Raised before any file is touched.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("string is empty")]
    Empty,

    #[error("{0:?} contains non-printable characters")]
    NotPrintable(String),

    #[error("{0:?} is not a valid directory path")]
    NotADirectory(String),

    #[error("{0:?} is not a valid file path")]
    NotAFile(String),

    #[error("{pattern:?} is not a valid file glob path: {matches} matches")]
    GlobMatches { pattern: String, matches: usize },

    #[error("{pattern:?} is not a valid glob: {reason}")]
    BadGlob { pattern: String, reason: String },

    #[error("{0:?} is not a number")]
    NotANumber(String),

    #[error("port {0} out of range (1-65535)")]
    PortOutOfRange(i64),

    #[error("unsupported fork {0:?} (expected paper, tuinity or airplane)")]
    UnsupportedFork(String),

    #[error("unsupported version {0:?}")]
    UnsupportedVersion(String),
}

/// Failures while talking to the release API or writing the server directory.
#[derive(Debug, Error)]
pub enum SetupError {
    // ── Network ─────────────────────────────────────────
    #[error("papermc api lookup failed for {url}: HTTP {status}")]
    Connectivity { url: String, status: u16 },

    #[error("download failed for {url}: HTTP {status}")]
    Download { url: String, status: u16 },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("no builds published for version {0}")]
    NoBuilds(String),

    #[error("refusing artifact name {0:?}: not a plain file name")]
    BadArtifactName(String),

    // ── Filesystem ──────────────────────────────────────
    #[error("IO error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("refusing to replace directory {0:?} with a link")]
    LinkIsDirectory(PathBuf),
}

impl SetupError {
    pub fn io(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.into();
        move |source| SetupError::Io { path, source }
    }
}

pub type SetupResult<T> = Result<T, SetupError>;
