/*
 * Copyright 2022 William Swartzendruber
 *
 * This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0. If a
 * copy of the MPL was not distributed with this file, You can obtain one at
 * https://mozilla.org/MPL/2.0/.
 *
 * SPDX-License-Identifier: MPL-2.0
 */

//! Run-length coding of indexed bitmaps.
//!
//! # Overview
//!
//! Two unrelated schemes are supported:
//!
//! - The PGS scheme used by BD-SUP is byte oriented. Any non-zero byte is a single pixel of
//!   that color, and a zero byte introduces an escape describing a run or the end of a line.
//!   It can be both decoded ([`decode_pgs`]) and encoded ([`encode_pgs`]).
//! - The HD-DVD scheme is bit oriented and stores the even and odd lines of a frame in two
//!   separate streams. It can only be decoded ([`decode_hd`]).
//!
//! Decoders write into a caller-provided [`Bitmap`](super::Bitmap). When the data runs past
//! either the input or the bitmap, an [`RleError`] is returned and the bitmap keeps whatever
//! was decoded up to that point.

#[cfg(test)]
mod tests;

mod bits;
mod hddvd;
mod pgs;

pub use hddvd::*;
pub use pgs::*;

use thiserror::Error as ThisError;

/// A specialized [`Result`](std::result::Result) type for RLE decoding.
pub type RleResult<T> = Result<T, RleError>;

#[derive(ThisError, Clone, Copy, Debug, Eq, PartialEq)]
pub enum RleError {
    /// Decoding ran past the end of either the input or the bitmap.
    #[error("RLE data overruns buffer at input position {position}")]
    Overrun {
        /// The input position (in bytes) at which decoding stopped.
        position: usize,
    },
}

/// Fills `len` pixels at `offset`, writing as many as fit before reporting an overrun.
fn fill(pixels: &mut [u8], offset: usize, color: u8, len: usize, position: usize) -> RleResult<()> {

    if len == 0 {
        return Ok(())
    }

    let start = offset.min(pixels.len());
    let end = offset.saturating_add(len);

    if end > pixels.len() {
        pixels[start..].fill(color);
        return Err(RleError::Overrun { position })
    }

    pixels[start..end].fill(color);

    Ok(())
}
