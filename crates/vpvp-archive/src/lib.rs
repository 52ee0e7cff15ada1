//! Read-only VPVP archive reader.
//!
//! A VPVP archive packs a directory tree into one seekable file. The index
//! at the end of the file is a flat list of 48-byte records: directory
//! markers push and pop path segments, and file records point at payloads
//! that are either stored raw or brotli-compressed.
//!
//! - Index parsing with directory-stack path reconstruction
//! - Brotli decompression into a buffer of known size
//! - Thread-safe entry reads on a shared or per-read file handle
//! - Chunked streaming with MIME types for resource servers
//!
//! # Example
//!
//! ```no_run
//! use vpvp_archive::VpvpArchive;
//!
//! let archive = VpvpArchive::open("launcher.vp")?;
//!
//! for (path, item) in archive.iter() {
//!     println!("{}: {} bytes", path, item.data_size());
//! }
//!
//! let html = archive.read_entry("ui/index.html")?;
//! # Ok::<(), vpvp_archive::Error>(())
//! ```

mod archive;
pub mod codec;
mod error;
pub mod format;
mod index;
mod item;
pub mod mime;
mod stream;

pub use archive::{HandleMode, OpenOptions, VpvpArchive};
pub use error::{Error, Result};
pub use format::ArchiveHeader;
pub use index::{parse_index, read_header, Index, IndexStats};
pub use item::ArchiveItem;
pub use mime::mime_for;
pub use stream::{EntryStream, RequestResolver};
