/*
 * Copyright 2022 William Swartzendruber
 *
 * This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0. If a
 * copy of the MPL was not distributed with this file, You can obtain one at
 * https://mozilla.org/MPL/2.0/.
 *
 * SPDX-License-Identifier: MPL-2.0
 */

use super::{SegmentKind, MAGIC};
use std::io::{
    Error as IoError,
    Write,
};
use byteorder::{BigEndian, WriteBytesExt};
use thiserror::Error as ThisError;

/// A specialized [`Result`](std::result::Result) type for segment-writing operations.
pub type WriteResult<T> = Result<T, WriteError>;

/// The error type for [`WriteSegmentExt`].
///
/// Errors are caused by either invalid state or by an underlying I/O error.
#[derive(ThisError, Debug)]
pub enum WriteError {
    /// The segment could not be written because of an underlying I/O error.
    #[error("segment IO error")]
    IoError {
        /// The underlying I/O error.
        #[from]
        source: IoError,
    },
    /// The payload is larger than the 16-bit size field allows.
    #[error("segment payload is too large")]
    PayloadTooLarge,
}

/// Allows writing segments to a destination.
pub trait WriteSegmentExt {
    /// Writes a segment header followed by its payload.
    fn write_segment(
        &mut self,
        kind: SegmentKind,
        pts: u32,
        dts: u32,
        payload: &[u8],
    ) -> WriteResult<()>;
}

impl<T> WriteSegmentExt for T where
    T: Write,
{

    fn write_segment(
        &mut self,
        kind: SegmentKind,
        pts: u32,
        dts: u32,
        payload: &[u8],
    ) -> WriteResult<()> {

        if payload.len() > u16::MAX as usize {
            return Err(WriteError::PayloadTooLarge)
        }

        self.write_u16::<BigEndian>(MAGIC)?;
        self.write_u32::<BigEndian>(pts)?;
        self.write_u32::<BigEndian>(dts)?;
        self.write_u8(kind.id())?;
        self.write_u16::<BigEndian>(payload.len() as u16)?;
        self.write_all(payload)?;

        Ok(())
    }
}
