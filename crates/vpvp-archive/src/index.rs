//! Index parsing.
//!
//! The index is a flat list of records processed strictly in file order.
//! Directory markers push or pop path segments on a stack, and every file
//! record is keyed by the current stack joined with `/` plus its own name.

use std::io::{Read, Seek, SeekFrom};

use byteorder::{LittleEndian, ReadBytesExt};
use rustc_hash::FxHashMap;
use tracing::{debug, warn};
use vpvp_common::ReadExt;

use crate::format::{ArchiveHeader, DirectoryMarker, IndexRecord, RawIndexRecord, MAGIC};
use crate::item::ArchiveItem;
use crate::{Error, Result};

/// Counters collected while parsing the index.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IndexStats {
    /// File records seen (including overwritten duplicates)
    pub files: usize,
    /// Directory push markers
    pub directories: usize,
    /// Directory markers with a non-zero size
    pub invalid_directories: usize,
    /// Pop markers with an empty directory stack
    pub orphan_pops: usize,
    /// File records that replaced an earlier entry with the same path
    pub duplicates: usize,
}

/// Parsed archive index.
#[derive(Debug, Clone, Default)]
pub struct Index {
    pub header: Option<ArchiveHeader>,
    pub items: FxHashMap<String, ArchiveItem>,
    pub stats: IndexStats,
}

/// Read and validate the header.
pub fn read_header<R: Read>(reader: &mut R) -> Result<ArchiveHeader> {
    let magic = reader.read_array::<4>().map_err(|_| Error::TruncatedHeader)?;
    if magic != MAGIC {
        return Err(Error::MagicMismatch { actual: magic });
    }

    let mut field = || {
        reader
            .read_u32::<LittleEndian>()
            .map_err(|_| Error::TruncatedHeader)
    };

    Ok(ArchiveHeader {
        version: field()?,
        index_offset: field()?,
        index_count: field()?,
    })
}

/// Parse the header and the index table.
///
/// Any truncation aborts the whole parse; a partially read index is never
/// returned.
pub fn parse_index<R: Read + Seek>(reader: &mut R) -> Result<Index> {
    let header = read_header(reader)?;

    reader.seek(SeekFrom::Start(header.index_offset as u64))?;

    let mut builder = PathBuilder::default();
    for index in 0..header.index_count {
        let raw: RawIndexRecord = reader.read_struct().map_err(|_| Error::TruncatedIndexEntry {
            index,
            count: header.index_count,
        })?;

        builder.apply(raw.classify());
    }

    let (items, stats) = builder.finish();
    Ok(Index {
        header: Some(header),
        items,
        stats,
    })
}

/// Directory stack state machine.
#[derive(Debug, Default)]
struct PathBuilder {
    stack: Vec<String>,
    items: FxHashMap<String, ArchiveItem>,
    stats: IndexStats,
}

impl PathBuilder {
    fn apply(&mut self, record: IndexRecord) {
        match record {
            IndexRecord::Directory(DirectoryMarker::Push(name)) => {
                self.stack.push(name);
                self.stats.directories += 1;
            }
            IndexRecord::Directory(DirectoryMarker::Pop) => {
                if self.stack.pop().is_none() {
                    warn!("Ignoring directory pop with an empty directory stack");
                    self.stats.orphan_pops += 1;
                }
            }
            IndexRecord::InvalidDirectory { name } => {
                warn!("Invalid directory entry \"{}\"", name);
                self.stats.invalid_directories += 1;
            }
            IndexRecord::File {
                name,
                offset,
                size,
                dec_size,
                timestamp,
            } => {
                let path = self.full_path(&name);
                debug!("Found \"{}\" [{}, {}]", path, size, dec_size);

                let item = ArchiveItem {
                    offset,
                    size,
                    dec_size,
                    timestamp,
                };
                if self.items.insert(path, item).is_some() {
                    self.stats.duplicates += 1;
                }
                self.stats.files += 1;
            }
        }
    }

    fn full_path(&self, name: &str) -> String {
        let mut path = String::with_capacity(
            self.stack.iter().map(|s| s.len() + 1).sum::<usize>() + name.len(),
        );
        for segment in &self.stack {
            path.push_str(segment);
            path.push('/');
        }
        path.push_str(name);
        path
    }

    fn finish(self) -> (FxHashMap<String, ArchiveItem>, IndexStats) {
        (self.items, self.stats)
    }
}
