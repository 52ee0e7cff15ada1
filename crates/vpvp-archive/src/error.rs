//! Error types for the VPVP archive crate.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur when working with VPVP archives.
#[derive(Debug, Error)]
pub enum Error {
    /// The archive file could not be opened.
    #[error("failed to open archive {path}: {source}")]
    FileOpen {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The header ended early.
    #[error("truncated archive header")]
    TruncatedHeader,

    /// Invalid magic bytes.
    #[error("invalid archive magic: expected \"VPVP\", got {actual:?}")]
    MagicMismatch { actual: [u8; 4] },

    /// An index record ended early.
    #[error("truncated index record {index} of {count}")]
    TruncatedIndexEntry { index: u32, count: u32 },

    /// The archive has been closed or was never opened.
    #[error("archive is closed")]
    Closed,

    /// Entry not found.
    #[error("entry not found: {0}")]
    EntryNotFound(String),

    /// Seeking to an entry failed.
    #[error("failed to seek to {name} at offset {offset}: {source}")]
    Seek {
        name: String,
        offset: u32,
        #[source]
        source: std::io::Error,
    },

    /// Fewer bytes than recorded in the index were available.
    #[error("short read for {name}: expected {expected} bytes, got {actual}")]
    ShortRead {
        name: String,
        expected: usize,
        actual: usize,
    },

    /// Decompression error.
    #[error("failed to decompress {name}: {message}")]
    Decompression { name: String, message: String },

    /// A request URL did not address an archive entry.
    #[error("invalid request {url}: {reason}")]
    InvalidRequest { url: String, reason: &'static str },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Numeric code of an Open failure.
    ///
    /// `1` file open, `2` truncated header, `3` magic mismatch,
    /// `4` truncated index entry. Per-entry errors have no code.
    pub fn code(&self) -> Option<u8> {
        match self {
            Self::FileOpen { .. } => Some(1),
            Self::TruncatedHeader => Some(2),
            Self::MagicMismatch { .. } => Some(3),
            Self::TruncatedIndexEntry { .. } => Some(4),
            _ => None,
        }
    }

    /// Whether the entry simply does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::EntryNotFound(_))
    }
}

/// Result type for VPVP archive operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_codes() {
        let open = Error::FileOpen {
            path: PathBuf::from("missing.vp"),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        };

        assert_eq!(open.code(), Some(1));
        assert_eq!(Error::TruncatedHeader.code(), Some(2));
        assert_eq!(Error::MagicMismatch { actual: *b"ABCD" }.code(), Some(3));
        assert_eq!(Error::TruncatedIndexEntry { index: 0, count: 1 }.code(), Some(4));
        assert_eq!(Error::EntryNotFound("x".into()).code(), None);
        assert_eq!(Error::Closed.code(), None);
    }

    #[test]
    fn test_not_found_is_distinct() {
        assert!(Error::EntryNotFound("a.txt".into()).is_not_found());
        assert!(!Error::ShortRead {
            name: "a.txt".into(),
            expected: 4,
            actual: 1,
        }
        .is_not_found());
    }
}
