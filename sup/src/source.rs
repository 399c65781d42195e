/*
 * Copyright 2022 William Swartzendruber
 *
 * This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0. If a
 * copy of the MPL was not distributed with this file, You can obtain one at
 * https://mozilla.org/MPL/2.0/.
 *
 * SPDX-License-Identifier: MPL-2.0
 */

//! Random access to the bytes of a subtitle stream.

#[cfg(test)]
mod tests;

use byteorder::{BigEndian, ByteOrder, LittleEndian};
use thiserror::Error as ThisError;

/// A specialized [`Result`](std::result::Result) type for byte source access.
pub type SourceResult<T> = Result<T, SourceError>;

/// The error type for [`ByteSource`].
#[derive(ThisError, Clone, Copy, Debug, Eq, PartialEq)]
pub enum SourceError {
    /// A read reached past the end of the source.
    #[error("read past end of source at offset {offset:#010x}")]
    OutOfRange {
        /// The first offset that could not be read.
        offset: u64,
    },
}

/// Random access, read-only view of a stream.
///
/// Multi-byte values are big-endian unless stated otherwise. Only [`size`](Self::size) and
/// [`bytes`](Self::bytes) need to be provided.
pub trait ByteSource {

    /// Returns the total number of bytes available.
    fn size(&self) -> u64;

    /// Returns `len` bytes starting at `offset`.
    fn bytes(&self, offset: u64, len: usize) -> SourceResult<&[u8]>;

    fn byte(&self, offset: u64) -> SourceResult<u8> {
        Ok(self.bytes(offset, 1)?[0])
    }

    fn word(&self, offset: u64) -> SourceResult<u16> {
        Ok(BigEndian::read_u16(self.bytes(offset, 2)?))
    }

    fn dword(&self, offset: u64) -> SourceResult<u32> {
        Ok(BigEndian::read_u32(self.bytes(offset, 4)?))
    }

    /// Reads a little-endian 32-bit value, as found in HD-DVD packet headers.
    fn dword_le(&self, offset: u64) -> SourceResult<u32> {
        Ok(LittleEndian::read_u32(self.bytes(offset, 4)?))
    }
}

impl ByteSource for [u8] {

    fn size(&self) -> u64 {
        self.len() as u64
    }

    fn bytes(&self, offset: u64, len: usize) -> SourceResult<&[u8]> {

        let start = usize::try_from(offset).map_err(|_| SourceError::OutOfRange { offset })?;
        let end = start.checked_add(len).ok_or(SourceError::OutOfRange { offset })?;

        if end > self.len() {
            return Err(SourceError::OutOfRange { offset: self.len().max(start) as u64 })
        }

        Ok(&self[start..end])
    }
}

impl ByteSource for Vec<u8> {

    fn size(&self) -> u64 {
        self.as_slice().size()
    }

    fn bytes(&self, offset: u64, len: usize) -> SourceResult<&[u8]> {
        self.as_slice().bytes(offset, len)
    }
}

impl<T: ByteSource + ?Sized> ByteSource for &T {

    fn size(&self) -> u64 {
        (**self).size()
    }

    fn bytes(&self, offset: u64, len: usize) -> SourceResult<&[u8]> {
        (**self).bytes(offset, len)
    }
}
