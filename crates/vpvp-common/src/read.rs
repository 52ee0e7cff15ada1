//! Stream reading helpers.
//!
//! [`ReadExt`] extends [`Read`] with exact-size reads that report how much
//! data was actually available when the stream runs short.

use std::io::Read;

use zerocopy::FromBytes;

use crate::{Error, Result};

/// Extension trait for reading binary data from streams.
pub trait ReadExt: Read {
    /// Read exactly `count` bytes.
    ///
    /// Unlike [`Read::read_exact`], a short stream yields
    /// [`Error::UnexpectedEof`] carrying the number of bytes that were there.
    fn read_bytes_exact(&mut self, count: usize) -> Result<Vec<u8>> {
        let mut bytes = Vec::new();
        Read::take(&mut *self, count as u64).read_to_end(&mut bytes)?;

        if bytes.len() < count {
            return Err(Error::UnexpectedEof {
                needed: count,
                available: bytes.len(),
            });
        }
        Ok(bytes)
    }

    /// Read a fixed-size array.
    fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let bytes = self.read_bytes_exact(N)?;
        let mut out = [0u8; N];
        out.copy_from_slice(&bytes);
        Ok(out)
    }

    /// Read a structure from the stream.
    ///
    /// The struct must implement `FromBytes` from the zerocopy crate.
    fn read_struct<T: FromBytes>(&mut self) -> Result<T> {
        let size = std::mem::size_of::<T>();
        let bytes = self.read_bytes_exact(size)?;
        T::read_from_bytes(&bytes).map_err(|_| Error::UnexpectedEof {
            needed: size,
            available: bytes.len(),
        })
    }
}

impl<R: Read> ReadExt for R {}
