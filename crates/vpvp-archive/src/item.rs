//! Resolved archive entries.

/// File metadata resolved from the index, keyed by full path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArchiveItem {
    /// Byte position of the payload
    pub offset: u32,
    /// Bytes on disk
    pub size: u32,
    /// Bytes after decompression, 0 if stored raw
    pub dec_size: u32,
    /// Record timestamp (never 0 for files)
    pub timestamp: u32,
}

impl ArchiveItem {
    /// Whether the payload is brotli-compressed.
    #[inline]
    pub fn is_compressed(&self) -> bool {
        self.dec_size != 0
    }

    /// Size of the data returned by a read.
    #[inline]
    pub fn data_size(&self) -> u32 {
        if self.is_compressed() {
            self.dec_size
        } else {
            self.size
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_size() {
        let raw = ArchiveItem {
            offset: 16,
            size: 5,
            dec_size: 0,
            timestamp: 1,
        };
        assert!(!raw.is_compressed());
        assert_eq!(raw.data_size(), 5);

        let packed = ArchiveItem { dec_size: 120, ..raw };
        assert!(packed.is_compressed());
        assert_eq!(packed.data_size(), 120);
    }
}
