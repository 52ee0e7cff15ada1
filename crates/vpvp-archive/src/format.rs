//! On-disk structures of the VPVP format.
//!
//! All integers are little-endian 32-bit values. The file starts with a
//! 16-byte header; the index table lives at `index_offset` and holds
//! `index_count` records of [`RECORD_SIZE`] bytes each.

use zerocopy::byteorder::little_endian::U32;
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout, Unaligned};

/// Magic bytes at the start of every archive.
pub const MAGIC: [u8; 4] = *b"VPVP";

/// Size of the header in bytes.
pub const HEADER_SIZE: u64 = 16;

/// Width of the NUL-padded name field of an index record.
pub const NAME_SIZE: usize = 32;

/// Size of one index record in bytes.
pub const RECORD_SIZE: usize = std::mem::size_of::<RawIndexRecord>();

/// Name of the directory marker that pops the current directory.
pub const PARENT_DIR: &str = "..";

/// Archive header following the magic bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArchiveHeader {
    /// Format version (not validated)
    pub version: u32,
    /// Absolute byte offset of the index table
    pub index_offset: u32,
    /// Number of index records
    pub index_count: u32,
}

/// Index record as stored in the file.
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout, Unaligned)]
#[repr(C)]
pub struct RawIndexRecord {
    /// Byte position of the entry payload
    pub offset: U32,
    /// Stored byte length
    pub size: U32,
    /// Decompressed byte length, 0 for raw entries
    pub dec_size: U32,
    /// NUL-padded name
    pub name: [u8; NAME_SIZE],
    /// Timestamp, 0 for directory markers
    pub timestamp: U32,
}

const _: () = assert!(RECORD_SIZE == 48);

impl RawIndexRecord {
    /// Decoded record name.
    pub fn name(&self) -> String {
        vpvp_common::fixed_str(&self.name).into_owned()
    }

    /// Classify the record.
    ///
    /// A zero timestamp marks a directory instruction. Such records must
    /// have a zero size; anything else is [`IndexRecord::InvalidDirectory`].
    pub fn classify(&self) -> IndexRecord {
        let name = self.name();
        let timestamp = self.timestamp.get();

        if timestamp != 0 {
            return IndexRecord::File {
                name,
                offset: self.offset.get(),
                size: self.size.get(),
                dec_size: self.dec_size.get(),
                timestamp,
            };
        }

        if self.size.get() != 0 {
            IndexRecord::InvalidDirectory { name }
        } else if name == PARENT_DIR {
            IndexRecord::Directory(DirectoryMarker::Pop)
        } else {
            IndexRecord::Directory(DirectoryMarker::Push(name))
        }
    }
}

/// Directory stack instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DirectoryMarker {
    /// Enter a directory
    Push(String),
    /// Leave the current directory
    Pop,
}

/// Decoded index record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexRecord {
    /// Path stack instruction
    Directory(DirectoryMarker),
    /// Real file entry
    File {
        name: String,
        offset: u32,
        size: u32,
        dec_size: u32,
        timestamp: u32,
    },
    /// Directory marker with a non-zero size
    InvalidDirectory { name: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(name: &str, size: u32, timestamp: u32) -> RawIndexRecord {
        let mut field = [0u8; NAME_SIZE];
        field[..name.len()].copy_from_slice(name.as_bytes());
        RawIndexRecord {
            offset: U32::new(64),
            size: U32::new(size),
            dec_size: U32::new(0),
            name: field,
            timestamp: U32::new(timestamp),
        }
    }

    #[test]
    fn test_record_layout() {
        let record = raw("hi.txt", 5, 1);
        let bytes = record.as_bytes();

        assert_eq!(bytes.len(), 48);
        assert_eq!(&bytes[0..4], &64u32.to_le_bytes());
        assert_eq!(&bytes[4..8], &5u32.to_le_bytes());
        assert_eq!(&bytes[12..18], b"hi.txt");
        assert_eq!(&bytes[44..48], &1u32.to_le_bytes());
    }

    #[test]
    fn test_classify() {
        assert_eq!(
            raw("data", 0, 0).classify(),
            IndexRecord::Directory(DirectoryMarker::Push("data".into()))
        );
        assert_eq!(
            raw("..", 0, 0).classify(),
            IndexRecord::Directory(DirectoryMarker::Pop)
        );
        assert_eq!(
            raw("bad", 3, 0).classify(),
            IndexRecord::InvalidDirectory { name: "bad".into() }
        );
        assert!(matches!(
            raw("hi.txt", 5, 1).classify(),
            IndexRecord::File { size: 5, offset: 64, .. }
        ));
    }
}
