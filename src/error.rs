use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while reading the rover header
#[derive(Debug, Error)]
pub enum ParsingError {
    #[error("\"TIME OF FIRST OBS\" line not found in RINEX header")]
    MissingMarker,

    #[error("could not parse date from \"TIME OF FIRST OBS\" line: {0}")]
    BadTimestamp(String),

    #[error("invalid calendar date {year:04}-{month:02}-{day:02} {hour:02}:{minute:02}:{second:02}")]
    InvalidDate {
        year: i32,
        month: u8,
        day: u8,
        hour: u8,
        minute: u8,
        second: u8,
    },
}

/// Network failure categories
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkErrorKind {
    /// Server answered with a non 2xx status code
    HttpStatus(u16),

    /// Could not reach the server
    Connection,

    /// Request did not complete in time
    Timeout,

    /// Any other request failure
    Request,
}

impl std::fmt::Display for NetworkErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::HttpStatus(code) => write!(f, "HTTP error {}", code),
            Self::Connection => write!(f, "connection error"),
            Self::Timeout => write!(f, "timeout"),
            Self::Request => write!(f, "request error"),
        }
    }
}

#[derive(Debug, Error)]
#[error("{kind} occurred: {details} (URL: {url})")]
pub struct NetworkError {
    pub url: String,
    pub kind: NetworkErrorKind,
    pub details: String,
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("file access error \"{}\": {source}", .path.display())]
    FileAccess {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parsing error: {0}")]
    Parse(#[from] ParsingError),

    #[error(transparent)]
    Network(#[from] NetworkError),

    #[error("failed to initialize HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("could not decompress \"{}\": {source}", .path.display())]
    Decompression {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    /// Wraps an I/O error on given file
    pub fn file_access(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::FileAccess {
            path: path.into(),
            source,
        }
    }
}
