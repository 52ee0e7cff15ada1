//! Chunked entry reading for resource-serving layers.
//!
//! A request URL is mapped to an entry name by stripping a fixed prefix.
//! The entry is loaded and decompressed in full when the stream is opened;
//! the caller then copies it out in chunks of whatever size it likes.

use std::io::Read;

use tracing::info;

use crate::mime::mime_for;
use crate::{Error, Result, VpvpArchive};

/// Maps request URLs to entry names.
#[derive(Debug, Clone)]
pub struct RequestResolver {
    prefix: String,
}

impl RequestResolver {
    /// Create a resolver for URLs starting with `prefix`.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// URL prefix handled by this resolver.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Entry name addressed by `url`.
    pub fn resolve<'a>(&self, url: &'a str) -> Result<&'a str> {
        url.strip_prefix(self.prefix.as_str())
            .ok_or_else(|| Error::InvalidRequest {
                url: url.to_string(),
                reason: "URL does not start with the archive prefix",
            })
    }

    /// Resolve `url` and open a stream for the entry.
    pub fn open(&self, archive: &VpvpArchive, url: &str) -> Result<EntryStream> {
        let name = self.resolve(url)?;
        let stream = EntryStream::open(archive, name)?;

        info!("Loaded {} of size {} from archive", url, stream.len());
        Ok(stream)
    }
}

/// A fully loaded entry read out in chunks.
#[derive(Debug, Clone)]
pub struct EntryStream {
    name: String,
    mime: &'static str,
    data: Vec<u8>,
    pos: usize,
}

impl EntryStream {
    /// Load an entry.
    pub fn open(archive: &VpvpArchive, name: &str) -> Result<Self> {
        let data = archive.read_entry(name)?;

        Ok(Self {
            name: name.to_string(),
            mime: mime_for(name),
            data,
            pos: 0,
        })
    }

    /// Entry name.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Content type derived from the entry name.
    #[inline]
    pub fn mime(&self) -> &'static str {
        self.mime
    }

    /// Total size in bytes.
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the entry has no content.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Bytes not yet read.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    /// Copy the next chunk into `buf`.
    ///
    /// Returns the number of bytes copied; 0 once everything has been read.
    pub fn read_chunk(&mut self, buf: &mut [u8]) -> usize {
        let count = self.remaining().min(buf.len());
        buf[..count].copy_from_slice(&self.data[self.pos..self.pos + count]);
        self.pos += count;
        count
    }

    /// Take the whole content, regardless of the read position.
    pub fn into_inner(self) -> Vec<u8> {
        self.data
    }
}

impl Read for EntryStream {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        Ok(self.read_chunk(buf))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stream(data: &[u8]) -> EntryStream {
        EntryStream {
            name: "page.html".into(),
            mime: mime_for("page.html"),
            data: data.to_vec(),
            pos: 0,
        }
    }

    #[test]
    fn test_chunked_read() {
        let mut stream = stream(b"hello world");
        let mut buf = [0u8; 4];

        assert_eq!(stream.read_chunk(&mut buf), 4);
        assert_eq!(&buf, b"hell");
        assert_eq!(stream.read_chunk(&mut buf), 4);
        assert_eq!(&buf, b"o wo");
        assert_eq!(stream.read_chunk(&mut buf), 3);
        assert_eq!(&buf[..3], b"rld");
        assert_eq!(stream.read_chunk(&mut buf), 0);
        assert_eq!(stream.remaining(), 0);
    }

    #[test]
    fn test_single_large_read() {
        let mut stream = stream(b"abc");
        let mut buf = [0u8; 64];

        assert_eq!(stream.read_chunk(&mut buf), 3);
        assert_eq!(stream.read_chunk(&mut buf), 0);
        assert_eq!(stream.mime(), "text/html");
    }

    #[test]
    fn test_io_read() {
        let mut stream = stream(b"streamed");
        let mut out = Vec::new();

        stream.read_to_end(&mut out).unwrap();
        assert_eq!(out, b"streamed");
    }

    #[test]
    fn test_resolver() {
        let resolver = RequestResolver::new("https://app/");

        assert_eq!(resolver.resolve("https://app/ui/index.html").unwrap(), "ui/index.html");
        assert!(matches!(
            resolver.resolve("https://ap"),
            Err(Error::InvalidRequest { .. })
        ));
    }
}
