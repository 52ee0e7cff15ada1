//! Error types for vpvp-common.

use thiserror::Error;

/// Common error type for VPVP stream reading.
#[derive(Debug, Error)]
pub enum Error {
    /// The stream ended before the requested number of bytes was read.
    #[error("unexpected end of stream: needed {needed} bytes but only {available} available")]
    UnexpectedEof { needed: usize, available: usize },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Whether this error was caused by the stream running out of data.
    pub fn is_eof(&self) -> bool {
        match self {
            Self::UnexpectedEof { .. } => true,
            Self::Io(e) => e.kind() == std::io::ErrorKind::UnexpectedEof,
        }
    }
}

/// Result type alias using the common Error type.
pub type Result<T> = std::result::Result<T, Error>;
