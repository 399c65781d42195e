/*
 * Copyright 2022 William Swartzendruber
 *
 * This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0. If a
 * copy of the MPL was not distributed with this file, You can obtain one at
 * https://mozilla.org/MPL/2.0/.
 *
 * SPDX-License-Identifier: MPL-2.0
 */

//! Writes captions as BD-SUP display sets.
//!
//! # Overview
//!
//! Every caption becomes two display sets. The first one shows it:
//!
//! 1. PCS (epoch start)
//! 2. WDS
//! 3. PDS
//! 4. one or more ODS
//! 5. END
//!
//! The second one, starting at the end time, clears it again with an empty PCS, the same WDS
//! and another END.
//!
//! Decoding timestamps are derived from the pixel rates a player must support: screen and
//! window clears run at 256 Mbit/s and object decoding at 128 Mbit/s. Each of these durations
//! is subtracted from the presentation time so the work is finished before the caption is due.

#[cfg(test)]
mod tests;

use super::super::{
    bitmap::Bitmap,
    color::ColorMatrix,
    config::Config,
    palette::Palette,
    rle::encode_pgs,
    segment::{SegmentKind, WriteError as SegmentWriteError, WriteSegmentExt},
    subpicture::SubPicture,
};
use std::io::{
    Error as IoError,
    Write,
};
use byteorder::{BigEndian, WriteBytesExt};
use thiserror::Error as ThisError;

/// RLE bytes that fit into the first ODS of an object.
pub const FIRST_ODS_CAPACITY: usize = 0xFFE4;

/// RLE bytes that fit into every following ODS.
pub const NEXT_ODS_CAPACITY: usize = 0xFFEB;

/// A specialized [`Result`](std::result::Result) type for caption writing.
pub type WriteResult<T> = Result<T, WriteError>;

#[derive(ThisError, Debug)]
pub enum WriteError {
    /// The caption could not be written because of an underlying I/O error.
    #[error("caption IO error")]
    IoError {
        #[from]
        source: IoError,
    },
    /// A segment could not be written.
    #[error("segment write error")]
    SegmentError {
        #[from]
        source: SegmentWriteError,
    },
    /// The palette uses all 256 entries but no quantizer was provided.
    #[error("palette needs to be quantized but no quantizer was given")]
    QuantizerRequired,
    /// The quantizer returned a different number of pixels than it was given.
    #[error("quantizer returned {actual} pixels instead of {expected}")]
    QuantizerFailed {
        expected: usize,
        actual: usize,
    },
}

/// Reduces the colors of an image.
pub trait Quantize {
    /// Maps ARGB pixels to at most `max_colors` colors.
    ///
    /// Returns one index per pixel and the ARGB color table the indices refer to.
    fn quantize(
        &self,
        argb: &[u32],
        width: u16,
        height: u16,
        max_colors: usize,
    ) -> (Vec<u8>, Vec<u32>);
}

/// Encodes one caption and writes both of its display sets to `output`.
pub fn write_caption<W, P>(
    output: &mut W,
    picture: &P,
    bitmap: &Bitmap,
    palette: &Palette,
    config: &Config,
    quantizer: Option<&dyn Quantize>,
) -> WriteResult<()> where
    W: Write,
    P: SubPicture + ?Sized,
{
    let buffer = encode_caption(picture, bitmap, palette, config, quantizer)?;

    output.write_all(&buffer)?;

    Ok(())
}

/// Encodes one caption into both of its display sets.
pub fn encode_caption<P: SubPicture + ?Sized>(
    picture: &P,
    bitmap: &Bitmap,
    palette: &Palette,
    config: &Config,
    quantizer: Option<&dyn Quantize>,
) -> WriteResult<Vec<u8>> {

    // Index 255 must stay free for transparency.
    let quantized;
    let (bitmap, palette) = if palette.alpha(255) > 0 {
        quantized = quantize(bitmap, palette, config, quantizer)?;
        (&quantized.0, &quantized.1)
    } else {
        (bitmap, palette)
    };

    let rle = encode_pgs(bitmap);
    let screen_width = picture.screen_width() as u64;
    let screen_height = picture.screen_height() as u64;
    let image_width = bitmap.width() as u64;
    let image_height = bitmap.height() as u64;
    let frame_init = ((screen_width * screen_height * 9 + 3199) / 3200) as u32;
    let window_init = ((image_width * image_height * 9 + 3199) / 3200) as u32;
    let image_decode = ((image_width * image_height * 9 + 1599) / 1600) as u32;
    let crop = config.crop_offset_y;
    let height = picture.screen_height().saturating_sub(crop.saturating_mul(2));
    let y_max = picture.screen_height() as i32
        - picture.image_height() as i32
        - 2 * crop as i32;
    let y_offset = (picture.y_offset() as i32 - crop as i32).min(y_max).max(0) as u16;
    let x_offset = picture.x_offset();
    let frame_rate = config.frame_rate.id();
    let start = picture.start_time();
    let end = picture.end_time();
    let mut output: Vec<u8> = Vec::new();

    //
    // DISPLAY SET SHOWING THE CAPTION
    //

    let dts = start.wrapping_sub(frame_init + window_init);
    let mut pcs = Vec::<u8>::with_capacity(19);

    pcs.write_u16::<BigEndian>(picture.screen_width())?;
    pcs.write_u16::<BigEndian>(height)?;
    pcs.write_u8(frame_rate)?;
    pcs.write_u16::<BigEndian>(picture.composition_number())?;
    pcs.extend_from_slice(&[
        0x80, // epoch start
        0x00, // no palette update
        0x00, // palette ID
        0x01, // one composition object
        0x00, 0x00, // object ID
        0x00, // window ID
        if picture.is_forced() { 0x40 } else { 0x00 },
    ]);
    pcs.write_u16::<BigEndian>(x_offset)?;
    pcs.write_u16::<BigEndian>(y_offset)?;
    output.write_segment(SegmentKind::PresentationComposition, start, dts, &pcs)?;

    let wds = window_payload(x_offset, y_offset, bitmap)?;
    output.write_segment(
        SegmentKind::WindowDefinition,
        start.wrapping_sub(window_init),
        dts,
        &wds,
    )?;

    let palette_size = bitmap.highest_visible_index(palette).map_or(0, |index| index as usize + 1);
    let mut pds = Vec::<u8>::with_capacity(2 + 5 * palette_size);

    pds.extend_from_slice(&[0x00, 0x00]);
    for (index, entry) in palette.entries().iter().take(palette_size).enumerate() {
        pds.extend_from_slice(&[index as u8, entry.y, entry.cr, entry.cb, entry.alpha]);
    }
    output.write_segment(SegmentKind::PaletteDefinition, dts, 0, &pds)?;

    let ods_pts = dts.wrapping_add(image_decode);
    let first_len = rle.len().min(FIRST_ODS_CAPACITY);
    let remaining = &rle[first_len..];
    let mut ods = Vec::<u8>::with_capacity(11 + first_len);

    ods.extend_from_slice(&[
        0x00, 0x00, // object ID
        0x00, // version
        if remaining.is_empty() { 0xC0 } else { 0x80 },
    ]);
    ods.write_u24::<BigEndian>(rle.len() as u32 + 4)?;
    ods.write_u16::<BigEndian>(bitmap.width())?;
    ods.write_u16::<BigEndian>(bitmap.height())?;
    ods.extend_from_slice(&rle[..first_len]);
    output.write_segment(SegmentKind::ObjectDefinition, ods_pts, dts, &ods)?;

    let fragment_count = (remaining.len() + NEXT_ODS_CAPACITY - 1) / NEXT_ODS_CAPACITY;

    for (i, fragment) in remaining.chunks(NEXT_ODS_CAPACITY).enumerate() {

        let mut ods = Vec::<u8>::with_capacity(4 + fragment.len());

        ods.extend_from_slice(&[
            0x00, 0x00,
            0x00,
            if i + 1 == fragment_count { 0x40 } else { 0x00 },
        ]);
        ods.extend_from_slice(fragment);
        output.write_segment(SegmentKind::ObjectDefinition, ods_pts, dts, &ods)?;
    }

    output.write_segment(SegmentKind::End, ods_pts, 0, &[])?;

    //
    // DISPLAY SET CLEARING THE CAPTION
    //

    let dts = start.wrapping_sub(1);
    let mut pcs = Vec::<u8>::with_capacity(11);

    pcs.write_u16::<BigEndian>(picture.screen_width())?;
    pcs.write_u16::<BigEndian>(height)?;
    pcs.write_u8(frame_rate)?;
    pcs.write_u16::<BigEndian>(picture.composition_number().wrapping_add(1))?;
    pcs.extend_from_slice(&[
        0x00, // normal
        0x00, // no palette update
        0x00, // palette ID
        0x00, // no composition objects
    ]);
    output.write_segment(SegmentKind::PresentationComposition, end, dts, &pcs)?;
    output.write_segment(
        SegmentKind::WindowDefinition,
        end.wrapping_sub(window_init),
        dts,
        &wds,
    )?;
    output.write_segment(SegmentKind::End, dts, 0, &[])?;

    Ok(output)
}

fn window_payload(x_offset: u16, y_offset: u16, bitmap: &Bitmap) -> WriteResult<Vec<u8>> {

    let mut wds = Vec::<u8>::with_capacity(10);

    wds.extend_from_slice(&[
        0x01, // one window
        0x00, // window ID
    ]);
    wds.write_u16::<BigEndian>(x_offset)?;
    wds.write_u16::<BigEndian>(y_offset)?;
    wds.write_u16::<BigEndian>(bitmap.width())?;
    wds.write_u16::<BigEndian>(bitmap.height())?;

    Ok(wds)
}

fn quantize(
    bitmap: &Bitmap,
    palette: &Palette,
    config: &Config,
    quantizer: Option<&dyn Quantize>,
) -> WriteResult<(Bitmap, Palette)> {

    let quantizer = quantizer.ok_or(WriteError::QuantizerRequired)?;
    let expected = bitmap.pixels().len();
    let (pixels, mut colors) = quantizer.quantize(
        &bitmap.to_argb(palette),
        bitmap.width(),
        bitmap.height(),
        255,
    );

    if colors.len() > 255 {
        log::warn!("quantizer failed");
        colors.truncate(255);
    }

    log::info!(
        "palette had to be reduced from {} to {} entries",
        palette.visible_count(),
        colors.len(),
    );

    let mut quantized = Palette::new(ColorMatrix::new(config.bt601));

    for (index, &argb) in colors.iter().enumerate() {
        quantized.set_argb(index as u8, argb);
    }

    let actual = pixels.len();
    let bitmap = Bitmap::from_pixels(
        bitmap.width(),
        bitmap.height(),
        quantized.most_transparent_index(),
        pixels,
    ).ok_or(WriteError::QuantizerFailed { expected, actual })?;

    Ok((bitmap, quantized))
}
