/*
 * Copyright 2022 William Swartzendruber
 *
 * This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0. If a
 * copy of the MPL was not distributed with this file, You can obtain one at
 * https://mozilla.org/MPL/2.0/.
 *
 * SPDX-License-Identifier: MPL-2.0
 */

//! Operates on individual segments.
//!
//! # Overview
//!
//! A segment is the most fundamental data structure within a PGS bitstream. Each one starts
//! with a fixed 13-byte header:
//!
//! | Bytes | Field                                   |
//! |-------|-----------------------------------------|
//! | 2     | magic number `PG`                       |
//! | 4     | presentation timestamp (PTS, 90 kHz)    |
//! | 4     | decoding timestamp (DTS, 90 kHz)        |
//! | 1     | segment type                            |
//! | 2     | payload size                            |
//!
//! There are five types that typically appear in this order within a display set:
//!
//! 1. Presentation Composition Segment (PCS)
//! 2. Window Definition Segment (WDS)
//! 3. Palette Definition Segment (PDS)
//! 4. Object Definition Segment (ODS)
//! 5. End Segment (ES)
//!
//! Reading only decodes the header. The payload is left in the source and interpreted by
//! whoever needs it, using [`Segment::offset`].


mod segmentread;
mod segmentwrite;

pub use segmentread::*;
pub use segmentwrite::*;

/// Size of the segment header in bytes.
pub const HEADER_SIZE: u64 = 13;

/// The magic number at the start of every segment.
pub const MAGIC: u16 = 0x5047;

/// The kind of a PGS segment.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum SegmentKind {
    /// Palette Definition Segment (PDS).
    PaletteDefinition,
    /// Object Definition Segment (ODS).
    ObjectDefinition,
    /// Presentation Composition Segment (PCS).
    PresentationComposition,
    /// Window Definition Segment (WDS).
    WindowDefinition,
    /// End Segment (ES).
    End,
    /// Any other value.
    Unknown(u8),
}

impl SegmentKind {

    pub fn from_id(id: u8) -> Self {
        match id {
            0x14 => Self::PaletteDefinition,
            0x15 => Self::ObjectDefinition,
            0x16 => Self::PresentationComposition,
            0x17 => Self::WindowDefinition,
            0x80 => Self::End,
            id => Self::Unknown(id),
        }
    }

    pub fn id(self) -> u8 {
        match self {
            Self::PaletteDefinition => 0x14,
            Self::ObjectDefinition => 0x15,
            Self::PresentationComposition => 0x16,
            Self::WindowDefinition => 0x17,
            Self::End => 0x80,
            Self::Unknown(id) => id,
        }
    }
}

/// A segment header along with the location of its payload.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Segment {
    pub kind: SegmentKind,
    /// Payload size in bytes.
    pub size: u16,
    /// The presentation timestamp.
    pub pts: u32,
    /// Offset of the payload within the source.
    pub offset: u64,
}

impl Segment {
    /// Offset of the segment following this one.
    pub fn next_offset(&self) -> u64 {
        self.offset + self.size as u64
    }
}
