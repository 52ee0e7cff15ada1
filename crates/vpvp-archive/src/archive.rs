//! VPVP archive reader.
//!
//! The path→item mapping is built once by [`VpvpArchive::open`] and never
//! mutated afterwards, so lookups need no lock. Payload reads go through a
//! single shared file handle guarded by a mutex (the file has one cursor),
//! or through a fresh handle per read with [`HandleMode::PerRead`].
//! Decompression runs after the handle is released.

use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use tracing::{error, info, warn};

use crate::codec;
use crate::format::ArchiveHeader;
use crate::index::{self, IndexStats};
use crate::item::ArchiveItem;
use crate::{Error, Result};

/// How entry payloads are read from disk.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum HandleMode {
    /// One handle for the whole archive; reads are serialized.
    #[default]
    Shared,
    /// A new handle for every read; reads proceed in parallel.
    PerRead,
}

/// Options for opening an archive.
#[derive(Debug, Clone, Default)]
pub struct OpenOptions {
    handle_mode: HandleMode,
}

impl OpenOptions {
    /// Create options with the default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set how payloads are read.
    pub fn handle_mode(mut self, mode: HandleMode) -> Self {
        self.handle_mode = mode;
        self
    }

    /// Open an archive with these options.
    pub fn open<P: AsRef<Path>>(&self, path: P) -> Result<VpvpArchive> {
        VpvpArchive::open_with(path, self)
    }
}

/// Read-only VPVP archive.
///
/// Open once, serve many [`read_entry`](Self::read_entry) calls from any
/// number of threads, then [`close`](Self::close). Closing takes `&mut self`,
/// so it cannot race with reads.
pub struct VpvpArchive {
    /// Archive file path
    path: PathBuf,
    /// Archive file name
    name: String,
    header: Option<ArchiveHeader>,
    stats: IndexStats,
    items: FxHashMap<String, ArchiveItem>,
    handle_mode: HandleMode,
    /// Shared handle; `None` once closed
    file: Mutex<Option<File>>,
}

impl VpvpArchive {
    /// Open an archive and parse its index.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with(path, &OpenOptions::default())
    }

    /// Open an archive with explicit options.
    pub fn open_with<P: AsRef<Path>>(path: P, options: &OpenOptions) -> Result<Self> {
        let path = path.as_ref();
        let mut file = open_file(path)?;

        let index = {
            let mut reader = BufReader::new(&mut file);
            index::parse_index(&mut reader)?
        };

        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("unknown")
            .to_string();

        info!(
            "Found {} files and {} directories in {}",
            index.items.len(),
            index.stats.directories,
            path.display()
        );

        let file = match options.handle_mode {
            HandleMode::Shared => Some(file),
            HandleMode::PerRead => None,
        };

        Ok(Self {
            path: path.to_path_buf(),
            name,
            header: index.header,
            stats: index.stats,
            items: index.items,
            handle_mode: options.handle_mode,
            file: Mutex::new(file),
        })
    }

    /// Get the archive name.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the archive path.
    #[inline]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Header of the open archive.
    #[inline]
    pub fn header(&self) -> Option<ArchiveHeader> {
        self.header
    }

    /// Counters collected while parsing the index.
    #[inline]
    pub fn stats(&self) -> IndexStats {
        self.stats
    }

    /// Whether the archive can serve reads.
    #[inline]
    pub fn is_open(&self) -> bool {
        self.header.is_some()
    }

    /// Number of files.
    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the archive holds no files.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Whether a file exists at `name`.
    #[inline]
    pub fn contains(&self, name: &str) -> bool {
        self.items.contains_key(name)
    }

    /// Look up file metadata.
    #[inline]
    pub fn get(&self, name: &str) -> Option<ArchiveItem> {
        self.items.get(name).copied()
    }

    /// Iterate over all files, sorted by path.
    pub fn iter(&self) -> impl Iterator<Item = (&str, ArchiveItem)> + '_ {
        let mut entries: Vec<(&str, ArchiveItem)> = self
            .items
            .iter()
            .map(|(path, item)| (path.as_str(), *item))
            .collect();
        entries.sort_unstable_by(|a, b| a.0.cmp(b.0));
        entries.into_iter()
    }

    /// Read and, if needed, decompress an entry.
    pub fn read_entry(&self, name: &str) -> Result<Vec<u8>> {
        if !self.is_open() {
            return Err(Error::Closed);
        }

        let item = self.items.get(name).ok_or_else(|| {
            warn!(
                "Tried to access \"{}\" but couldn't find it ({} items present)",
                name,
                self.items.len()
            );
            Error::EntryNotFound(name.to_string())
        })?;

        let raw = self.read_raw(name, item).map_err(|e| {
            error!("Error while reading {} from archive: {}", name, e);
            e
        })?;

        if !item.is_compressed() {
            return Ok(raw);
        }

        codec::decompress_brotli_sized(&raw, item.dec_size as usize).map_err(|e| {
            error!("Error while decompressing {} from archive: {}", name, e);
            Error::Decompression {
                name: name.to_string(),
                message: e.to_string(),
            }
        })
    }

    /// Read an entry, returning an empty buffer on any failure.
    ///
    /// Failures are logged. Use [`read_entry`](Self::read_entry) to tell a
    /// missing entry apart from an I/O or decompression error.
    pub fn read_entry_or_empty(&self, name: &str) -> Vec<u8> {
        self.read_entry(name).unwrap_or_default()
    }

    /// Read several entries in parallel.
    #[cfg(feature = "parallel")]
    pub fn read_parallel(&self, names: &[&str]) -> Vec<Result<Vec<u8>>> {
        use rayon::prelude::*;

        names.par_iter().map(|name| self.read_entry(name)).collect()
    }

    /// Drop the index and release the file handle.
    ///
    /// Calling this on a closed archive does nothing. Later reads fail with
    /// [`Error::Closed`].
    pub fn close(&mut self) {
        self.items.clear();
        self.header = None;
        self.file.get_mut().take();
    }

    fn read_raw(&self, name: &str, item: &ArchiveItem) -> Result<Vec<u8>> {
        match self.handle_mode {
            HandleMode::Shared => {
                let mut guard = self.file.lock();
                let file = guard.as_mut().ok_or(Error::Closed)?;
                read_payload(file, name, item)
            }
            HandleMode::PerRead => {
                let mut file = open_file(&self.path)?;
                read_payload(&mut file, name, item)
            }
        }
    }
}

impl Default for VpvpArchive {
    /// A closed archive that rejects every read.
    fn default() -> Self {
        Self {
            path: PathBuf::new(),
            name: String::new(),
            header: None,
            stats: IndexStats::default(),
            items: FxHashMap::default(),
            handle_mode: HandleMode::default(),
            file: Mutex::new(None),
        }
    }
}

impl std::fmt::Debug for VpvpArchive {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VpvpArchive")
            .field("name", &self.name)
            .field("entries", &self.items.len())
            .field("handle_mode", &self.handle_mode)
            .field("open", &self.is_open())
            .finish()
    }
}

fn open_file(path: &Path) -> Result<File> {
    File::open(path).map_err(|source| Error::FileOpen {
        path: path.to_path_buf(),
        source,
    })
}

fn read_payload<R: Read + Seek>(reader: &mut R, name: &str, item: &ArchiveItem) -> Result<Vec<u8>> {
    reader
        .seek(SeekFrom::Start(item.offset as u64))
        .map_err(|source| Error::Seek {
            name: name.to_string(),
            offset: item.offset,
            source,
        })?;

    let expected = item.size as usize;
    let mut data = Vec::new();
    reader.take(expected as u64).read_to_end(&mut data)?;

    if data.len() != expected {
        return Err(Error::ShortRead {
            name: name.to_string(),
            expected,
            actual: data.len(),
        });
    }

    Ok(data)
}
