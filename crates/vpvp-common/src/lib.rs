//! Common utilities for VPVP.
//!
//! This crate provides the small building blocks shared by the VPVP crates:
//!
//! - [`ReadExt`] - Reading exact byte counts and fixed-layout structs from streams
//! - [`fixed_str`] - Decoding NUL-padded fixed-width name fields

mod error;
mod read;
mod string;

pub use error::{Error, Result};
pub use read::ReadExt;
pub use string::{fixed_str, fixed_str_len};

/// Re-export zerocopy traits for convenience
pub use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout, Unaligned};
