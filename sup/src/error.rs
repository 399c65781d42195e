/*
 * Copyright 2022 William Swartzendruber
 *
 * This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0. If a
 * copy of the MPL was not distributed with this file, You can obtain one at
 * https://mozilla.org/MPL/2.0/.
 *
 * SPDX-License-Identifier: MPL-2.0
 */

//! Errors raised while scanning and decoding whole streams.

use super::{
    segment::ReadError as SegmentReadError,
    source::SourceError,
};
use thiserror::Error as ThisError;

/// A specialized [`Result`](std::result::Result) type for stream-level operations.
pub type ReadResult<T> = Result<T, ReadError>;

/// The error type for the demuxers.
///
/// During the initial scan, every error other than [`ReadError::Cancelled`] is downgraded to a
/// logged error once at least one caption has been collected.
#[derive(ThisError, Clone, Copy, Debug, Eq, PartialEq)]
pub enum ReadError {
    /// A read went past the end of the stream.
    #[error("stream source error")]
    SourceError {
        #[from]
        source: SourceError,
    },
    /// A PGS segment header is malformed.
    #[error("malformed segment")]
    SegmentError {
        #[from]
        source: SegmentReadError,
    },
    /// An HD-DVD packet does not start with `SP`.
    #[error("ID 'SP' missing at offset {offset:#010x}")]
    UnrecognizedMagicNumber {
        offset: u64,
    },
    /// An HD-DVD display control sequence contains an unknown command.
    #[error("unexpected command {command:#04x} at offset {offset:#010x}")]
    UnexpectedCommand {
        command: u8,
        offset: u64,
    },
    /// The stream ended without a single caption.
    #[error("no captions found")]
    NoCaptions,
    /// The scan was cancelled by the caller.
    #[error("cancelled by user")]
    Cancelled,
    /// A caption image is larger than its screen.
    #[error("subpicture too large: {width}x{height}")]
    CorruptGeometry {
        width: u16,
        height: u16,
    },
    /// The even and odd field offsets of an HD-DVD caption are inconsistent.
    #[error("corrupt buffer offset information")]
    CorruptBufferOffsets,
    /// A caption references a palette slot that does not exist.
    #[error("palette ID out of bounds")]
    PaletteIdOutOfRange,
    /// A caption has no object with image data.
    #[error("missing image object")]
    MissingObject,
    /// An HD-DVD caption lacks its palette or alpha table.
    #[error("missing palette or alpha table")]
    MissingPalette,
    /// A caption index past the end of the stream was requested.
    #[error("index {index} out of bounds")]
    IndexOutOfRange {
        index: usize,
    },
}

impl ReadError {
    /// Returns `true` if this error was caused by cancellation rather than by the stream.
    pub fn is_cancellation(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}
