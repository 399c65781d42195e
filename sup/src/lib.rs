/*
 * Copyright 2022 William Swartzendruber
 *
 * This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0. If a
 * copy of the MPL was not distributed with this file, You can obtain one at
 * https://mozilla.org/MPL/2.0/.
 *
 * SPDX-License-Identifier: MPL-2.0
 */

//! Reads and writes subtitle picture streams used by optical disc authoring.
//!
//! # Overview
//!
//! Two stream formats can be read:
//!
//! 1. BD-SUP, the Presentation Graphics Stream (PGS) demuxed from Blu-ray transport streams
//!    ([`supbd::SupBd`]).
//! 2. HD-DVD-SUP, the interlaced caption stream demuxed from HD-DVD EVO files
//!    ([`suphd::SupHd`]).
//!
//! Both demuxers scan a [`ByteSource`] once, collecting a list of captions that only hold
//! offsets back into the source. Pixel and palette data is copied out and decoded on demand,
//! one caption at a time, through the [`Substream`] trait.
//!
//! Captions can be written back out as BD-SUP with [`supbd::write::write_caption`], which
//! re-encodes the bitmap and emits a complete display set pair for each caption.

pub mod bitmap;
pub mod color;
pub mod config;
pub mod error;
pub mod palette;
pub mod rle;
pub mod segment;
pub mod source;
pub mod subpicture;
pub mod substream;
pub mod supbd;
pub mod suphd;

pub use bitmap::Bitmap;
pub use config::{Config, FrameRate};
pub use error::{ReadError, ReadResult};
pub use palette::Palette;
pub use source::ByteSource;
pub use subpicture::SubPicture;
pub use substream::{BitmapWithPalette, Substream};


/// Formats a 90 kHz timestamp as `hh:mm:ss.mmm`.
pub fn pts_to_timestamp(pts: u64) -> String {

    let ms = pts / 90;
    let hours = ms / 3_600_000;
    let minutes = (ms / 60_000) % 60;
    let seconds = (ms / 1_000) % 60;
    let millis = ms % 1_000;

    format!("{:02}:{:02}:{:02}.{:03}", hours, minutes, seconds, millis)
}
