/*
 * Copyright 2022 William Swartzendruber
 *
 * This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0. If a
 * copy of the MPL was not distributed with this file, You can obtain one at
 * https://mozilla.org/MPL/2.0/.
 *
 * SPDX-License-Identifier: MPL-2.0
 */

use super::{Segment, SegmentKind, HEADER_SIZE, MAGIC};
use super::super::source::{ByteSource, SourceError};
use byteorder::{BigEndian, ByteOrder};
use thiserror::Error as ThisError;

/// A specialized [`Result`](std::result::Result) type for segment-reading operations.
pub type ReadResult<T> = Result<T, ReadError>;

/// The error type for [`read_segment`].
#[derive(ThisError, Clone, Copy, Debug, Eq, PartialEq)]
pub enum ReadError {
    /// The segment header could not be read from the source.
    #[error("segment source error")]
    SourceError {
        #[from]
        source: SourceError,
    },
    /// The segment does not start with `PG`.
    #[error("segment has unrecognized magic number at offset {offset:#010x}")]
    UnrecognizedMagicNumber {
        offset: u64,
    },
}

/// Reads the header of the segment starting at `offset`.
///
/// The DTS is skipped as it carries no information needed for decoding. The payload is not
/// checked against the size of the source.
pub fn read_segment<S: ByteSource + ?Sized>(source: &S, offset: u64) -> ReadResult<Segment> {

    let header = source.bytes(offset, HEADER_SIZE as usize)?;

    if BigEndian::read_u16(&header[0..2]) != MAGIC {
        return Err(ReadError::UnrecognizedMagicNumber { offset })
    }

    let pts = BigEndian::read_u32(&header[2..6]);
    let kind = SegmentKind::from_id(header[10]);
    let size = BigEndian::read_u16(&header[11..13]);

    Ok(
        Segment {
            kind,
            size,
            pts,
            offset: offset + HEADER_SIZE,
        }
    )
}
