/*
 * Copyright 2022 William Swartzendruber
 *
 * This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0. If a
 * copy of the MPL was not distributed with this file, You can obtain one at
 * https://mozilla.org/MPL/2.0/.
 *
 * SPDX-License-Identifier: MPL-2.0
 */

//! Interprets segment payloads and records what they define on the open caption.

use super::super::{
    config::FrameRate,
    error::ReadResult,
    palette::{PaletteInfo, PALETTE_SLOTS},
    segment::Segment,
    source::ByteSource,
    subpicture::{BdSubPicture, ImageObjectFragment},
};

/// Size of a PCS payload that carries one complete composition object.
pub const PCS_OBJECT_SIZE: u16 = 0x13;

/// The composition state of a presentation composition segment.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum CompositionState {
    Normal,
    AcquisitionPoint,
    EpochStart,
    EpochContinue,
    Invalid(u8),
}

impl CompositionState {
    pub fn from_id(id: u8) -> Self {
        match id {
            0x00 => Self::Normal,
            0x40 => Self::AcquisitionPoint,
            0x80 => Self::EpochStart,
            0xC0 => Self::EpochContinue,
            id => Self::Invalid(id),
        }
    }
}

/// The fields of a PCS that drive the composition state machine.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct CompositionHeader {
    pub number: u16,
    pub state: CompositionState,
    /// Set if the display set only updates the palette.
    pub palette_update: bool,
    /// Number of composition objects, as far as they are supported.
    pub object_count: u8,
}

pub fn read_composition_header<S: ByteSource + ?Sized>(
    source: &S,
    segment: &Segment,
) -> ReadResult<CompositionHeader> {
    Ok(
        CompositionHeader {
            number: source.word(segment.offset + 5)?,
            state: CompositionState::from_id(source.byte(segment.offset + 7)?),
            palette_update: source.byte(segment.offset + 8)? == 0x80,
            object_count: if segment.size >= PCS_OBJECT_SIZE { 1 } else { 0 },
        }
    )
}

/// Applies the screen and composition object fields of a PCS to `picture`.
pub fn parse_pcs<S: ByteSource + ?Sized>(
    source: &S,
    segment: &Segment,
    picture: &mut BdSubPicture,
) -> ReadResult<()> {

    let offset = segment.offset;

    if segment.size < 4 {
        return Ok(())
    }

    picture.width = source.word(offset)?;
    picture.height = source.word(offset + 2)?;

    if segment.size < 11 || source.byte(offset + 10)? == 0 {
        return Ok(())
    }

    let palette_id = source.byte(offset + 9)?;
    let object_id = source.word(offset + 11)?;
    let object = picture.objects.entry(object_id).or_default();

    object.palette_id = palette_id;
    picture.object_id = object_id;

    if segment.size >= PCS_OBJECT_SIZE {

        object.x_offset = source.word(offset + 15)?;
        object.y_offset = source.word(offset + 17)?;

        picture.frame_rate = FrameRate::from_id(source.byte(offset + 4)?);
        picture.composition_number = source.word(offset + 5)?;
        // The cropped flag (0x80) is not supported.
        picture.forced = source.byte(offset + 14)? & 0x40 == 0x40;
    }

    log::info!(
        "palette ID: {}, object ID: {}, forced: {}",
        palette_id,
        object_id,
        picture.forced,
    );

    Ok(())
}

/// Applies the geometry of the first window in a WDS to `picture`.
pub fn parse_wds<S: ByteSource + ?Sized>(
    source: &S,
    segment: &Segment,
    picture: &mut BdSubPicture,
) -> ReadResult<()> {

    let offset = segment.offset;

    if segment.size >= 10 {
        picture.window_x = source.word(offset + 2)?;
        picture.window_y = source.word(offset + 4)?;
        picture.window_width = source.word(offset + 6)?;
        picture.window_height = source.word(offset + 8)?;
    }

    Ok(())
}

/// Records an ODS fragment on the object it belongs to.
///
/// Returns `true` if the segment started a new, valid object. Objects larger than the screen
/// are rejected.
pub fn parse_ods<S: ByteSource + ?Sized>(
    source: &S,
    segment: &Segment,
    picture: &mut BdSubPicture,
) -> ReadResult<bool> {

    let offset = segment.offset;
    let size = segment.size as usize;
    let object_id = source.word(offset)?;
    let version = source.byte(offset + 2)?;
    let sequence = source.byte(offset + 3)?;
    let first = sequence & 0x80 == 0x80;
    let last = sequence & 0x40 == 0x40;
    let (screen_width, screen_height) = (picture.width, picture.height);
    let object = picture.objects.entry(object_id).or_default();

    log::info!(
        "ID: {}, update: {}, first: {}, last: {}",
        object_id,
        version,
        first,
        last,
    );

    if object.fragments.is_empty() || first {

        // Skipped: 24-bit object data length
        let width = source.word(offset + 7)?;
        let height = source.word(offset + 9)?;

        if width > screen_width || height > screen_height {
            log::warn!("invalid image size {}x{} - ignored", width, height);
            return Ok(false)
        }

        let fragment = ImageObjectFragment {
            offset: offset + 11,
            len: size.saturating_sub(11),
        };

        object.width = width;
        object.height = height;
        object.buffer_size = fragment.len;
        object.fragments = vec![fragment];

        log::info!("image size: {}x{}", width, height);

        Ok(true)
    } else {

        let fragment = ImageObjectFragment {
            offset: offset + 4,
            len: size.saturating_sub(4),
        };

        object.buffer_size += fragment.len;
        object.fragments.push(fragment);

        Ok(false)
    }
}

/// Appends a PDS to the list of its palette slot.
///
/// Returns the number of entries, or `None` if the palette ID is out of range.
pub fn parse_pds<S: ByteSource + ?Sized>(
    source: &S,
    segment: &Segment,
    picture: &mut BdSubPicture,
) -> ReadResult<Option<usize>> {

    let offset = segment.offset;
    let palette_id = source.byte(offset)? as usize;
    let version = source.byte(offset + 1)?;

    if palette_id >= PALETTE_SLOTS {
        log::warn!("illegal palette ID {} at offset {:#010x}", palette_id, offset);
        return Ok(None)
    }

    let info = PaletteInfo {
        offset: offset + 2,
        size: (segment.size as usize).saturating_sub(2) / 5,
    };

    picture.palettes[palette_id].push(info);

    log::info!("ID: {}, update: {}, {} entries", palette_id, version, info.size);

    Ok(Some(info.size))
}
