/*
 * Copyright 2022 William Swartzendruber
 *
 * This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0. If a
 * copy of the MPL was not distributed with this file, You can obtain one at
 * https://mozilla.org/MPL/2.0/.
 *
 * SPDX-License-Identifier: MPL-2.0
 */

//! Reads HD-DVD-SUP streams.
//!
//! # Overview
//!
//! Every caption is a single packet:
//!
//! | Offset | Size | Field                                              |
//! |--------|------|----------------------------------------------------|
//! | 0      | 2    | Magic number `SP`                                  |
//! | 2      | 4    | PTS (little endian)                                |
//! | 12     | 4    | Packet size, counted from offset 10                |
//! | 16     | 4    | Offset of the first command sequence               |
//! | 20     | n    | Image buffer (even lines, then odd lines)          |
//!
//! Offsets inside a packet are relative to its byte 10. The command area holds a chain of
//! display control sequences (DCSQ), each with a delay and a link to the next one. The first
//! sequence sets up palette, alpha table, area and image buffers; a later one carries the stop
//! command that ends the caption.
//!
//! The format does not store a screen size; captions are assumed to be placed on a 1920x1080
//! screen.


use super::{
    bitmap::Bitmap,
    config::Config,
    error::{ReadError, ReadResult},
    palette::decode_hd_palette,
    pts_to_timestamp,
    rle::decode_hd,
    source::ByteSource,
    subpicture::{close_open_captions, SubPicture},
    substream::{BitmapWithPalette, Substream},
};
use std::sync::atomic::{AtomicBool, Ordering};

pub const SCREEN_WIDTH: u16 = 1920;
pub const SCREEN_HEIGHT: u16 = 1080;

const MAGIC: u16 = 0x5350;

/// Delays are stored in units of 1024 ticks.
const DELAY_UNIT: u32 = 1024;

/// A caption read from an HD-DVD-SUP stream.
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
pub struct HdSubPicture {
    pub start_time: u32,
    pub end_time: u32,
    pub x_offset: u16,
    pub y_offset: u16,
    pub image_width: u16,
    pub image_height: u16,
    /// Size of the image buffer holding both fields.
    pub image_buffer_size: u64,
    pub even_offset: u64,
    pub odd_offset: u64,
    pub palette_offset: Option<u64>,
    pub alpha_offset: Option<u64>,
}

impl SubPicture for HdSubPicture {

    fn start_time(&self) -> u32 {
        self.start_time
    }

    fn end_time(&self) -> u32 {
        self.end_time
    }

    fn set_end_time(&mut self, end_time: u32) {
        self.end_time = end_time;
    }

    fn screen_width(&self) -> u16 {
        SCREEN_WIDTH
    }

    fn screen_height(&self) -> u16 {
        SCREEN_HEIGHT
    }

    fn x_offset(&self) -> u16 {
        self.x_offset
    }

    fn y_offset(&self) -> u16 {
        self.y_offset
    }

    fn image_width(&self) -> u16 {
        self.image_width
    }

    fn image_height(&self) -> u16 {
        self.image_height
    }
}

/// A scanned HD-DVD-SUP stream.
#[derive(Debug)]
pub struct SupHd<S: ByteSource> {
    source: S,
    config: Config,
    pictures: Vec<HdSubPicture>,
}

impl<S: ByteSource> SupHd<S> {

    /// Scans the whole stream.
    pub fn open(source: S, config: Config) -> ReadResult<Self> {
        Self::open_cancellable(source, config, &AtomicBool::new(false))
    }

    /// Scans the whole stream, checking `cancel` before every packet.
    ///
    /// Once at least one caption has been found, stream errors only end the scan early.
    pub fn open_cancellable(source: S, config: Config, cancel: &AtomicBool) -> ReadResult<Self> {

        let mut pictures = Vec::new();

        if let Err(err) = scan(&source, &mut pictures, cancel) {
            if err.is_cancellation() || pictures.is_empty() {
                return Err(err)
            }
            log::error!("{}", err);
            log::info!("probably not all captions imported due to error");
        }

        if pictures.is_empty() {
            return Err(ReadError::NoCaptions)
        }

        close_open_captions(&mut pictures, config.min_display_time);

        Ok(Self { source, config, pictures })
    }

    pub fn pictures(&self) -> &[HdSubPicture] {
        &self.pictures
    }

    pub fn into_source(self) -> S {
        self.source
    }
}

impl<S: ByteSource> Substream for SupHd<S> {

    fn len(&self) -> usize {
        self.pictures.len()
    }

    fn sub_picture(&self, index: usize) -> Option<&dyn SubPicture> {
        self.pictures.get(index).map(|picture| picture as &dyn SubPicture)
    }

    fn decode(&self, index: usize) -> ReadResult<BitmapWithPalette> {

        let picture = self.pictures.get(index).ok_or(ReadError::IndexOutOfRange { index })?;
        let palette = match (picture.palette_offset, picture.alpha_offset) {
            (Some(palette_offset), Some(alpha_offset)) => {
                decode_hd_palette(&self.source, palette_offset, alpha_offset, &self.config)?
            }
            _ => return Err(ReadError::MissingPalette),
        };
        let width = picture.image_width;
        let height = picture.image_height;

        if width > SCREEN_WIDTH || height > SCREEN_HEIGHT {
            return Err(ReadError::CorruptGeometry { width, height })
        }

        let even_size = picture.odd_offset as i64 - picture.even_offset as i64;
        let odd_size = picture.image_buffer_size as i64
            + picture.even_offset as i64
            - picture.odd_offset as i64;

        if even_size <= 0 || odd_size <= 0 {
            return Err(ReadError::CorruptBufferOffsets)
        }

        let even = read_clamped(&self.source, picture.even_offset, even_size as u64);
        let odd = read_clamped(&self.source, picture.odd_offset, odd_size as u64);
        let mut bitmap = Bitmap::new(width, height, palette.most_transparent_index());

        if let Err(err) = decode_hd(&even, &odd, &mut bitmap) {
            log::warn!(
                "problems during RLE decoding of picture at offset {:#010x}: {}",
                picture.even_offset,
                err,
            );
        }

        Ok(BitmapWithPalette { bitmap, palette })
    }
}

fn scan<S: ByteSource + ?Sized>(
    source: &S,
    pictures: &mut Vec<HdSubPicture>,
    cancel: &AtomicBool,
) -> ReadResult<()> {

    let size = source.size();
    let mut offset = 0;

    while offset < size {

        if cancel.load(Ordering::Relaxed) {
            return Err(ReadError::Cancelled)
        }

        log::info!("#{}", pictures.len() + 1);

        let (picture, next) = read_packet(source, offset)?;

        pictures.push(picture);
        offset = next;
    }

    Ok(())
}

/// Parses one packet, returning its caption and the offset of the following packet.
fn read_packet<S: ByteSource + ?Sized>(source: &S, start: u64) -> ReadResult<(HdSubPicture, u64)> {

    if source.word(start)? != MAGIC {
        return Err(ReadError::UnrecognizedMagicNumber { offset: start })
    }

    let base = start + 10;
    let packet_size = source.dword(start + 12)? as u64;
    let command_offset = source.dword(start + 16)? as u64 + base;
    let mut delay = source.word(command_offset)? as u32;
    let mut picture = HdSubPicture {
        start_time: source.dword_le(start + 2)?.wrapping_add(delay * DELAY_UNIT),
        image_buffer_size: command_offset.saturating_sub(start + 20),
        ..Default::default()
    };

    log::info!(
        "DCSQ start    offset: {:#010x}  ({})",
        command_offset,
        pts_to_timestamp(picture.start_time as u64),
    );

    let mut dcsq = command_offset;
    let mut next = source.dword(dcsq + 2)? as u64 + base;
    let mut offset = dcsq + 7;
    let mut last = false;
    let mut min_alpha_sum = 256 * 256;

    loop {

        let command = source.byte(offset)?;

        offset += 1;

        match command {
            0x01 => {
                log::warn!("DCSQ start ignored due to missing DCSQ stop");
            }
            0x02 => {
                picture.end_time = picture.start_time.wrapping_add(delay * DELAY_UNIT);
                log::info!(
                    "DCSQ stop     offset: {:#010x}  ({})",
                    offset,
                    pts_to_timestamp(picture.end_time as u64),
                );
                break
            }
            0x83 => {
                log::info!("palette info  offset: {:#010x}", offset);
                picture.palette_offset = Some(offset);
                offset += 0x300;
            }
            0x84 => {
                log::info!("alpha info    offset: {:#010x}", offset);
                let sum = source.bytes(offset, 0x100)?
                    .iter()
                    .map(|&alpha| alpha as u32)
                    .sum::<u32>();
                // Stored values are inverted, so a fading caption has a growing sum.
                if sum < min_alpha_sum {
                    picture.alpha_offset = Some(offset);
                    min_alpha_sum = sum;
                } else {
                    log::warn!("found faded alpha buffer -> alpha buffer skipped");
                }
                offset += 0x100;
            }
            0x85 => {
                let area = source.bytes(offset, 6)?;
                let x1 = (area[0] as u16) << 4 | (area[1] as u16) >> 4;
                let x2 = ((area[1] & 0x0F) as u16) << 8 | area[2] as u16;
                let y1 = (area[3] as u16) << 4 | (area[4] as u16) >> 4;
                let y2 = ((area[4] & 0x0F) as u16) << 8 | area[5] as u16;
                picture.x_offset = x1;
                picture.y_offset = y1;
                picture.image_width = (x2 + 1).saturating_sub(x1);
                picture.image_height = (y2 + 1).saturating_sub(y1);
                log::info!(
                    "area info     offset: {:#010x}  ({}, {}) - ({}, {})",
                    offset,
                    x1,
                    y1,
                    x1 + picture.image_width,
                    y1 + picture.image_height,
                );
                offset += 6;
            }
            0x86 => {
                picture.even_offset = source.dword(offset)? as u64 + base;
                picture.odd_offset = source.dword(offset + 4)? as u64 + base;
                log::info!(
                    "RLE buffers   offset: {:#010x}  (even: {:#010x}, odd: {:#010x})",
                    offset,
                    picture.even_offset,
                    picture.odd_offset,
                );
                offset += 8;
            }
            0xFF => {
                if last {
                    log::warn!("DCSQ stop missing");
                    break
                }
                dcsq = next;
                delay = source.word(dcsq)? as u32;
                next = source.dword(dcsq + 2)? as u64 + base;
                // The last sequence links to itself; a backward link would never end.
                last = next <= dcsq;
                log::info!(
                    "DCSQ          offset: {:#010x}  ({}ms), next DCSQ at offset: {:#010x}",
                    dcsq,
                    delay * DELAY_UNIT / 90,
                    next,
                );
                offset = dcsq + 6;
            }
            command => {
                return Err(ReadError::UnexpectedCommand { command, offset: offset - 1 })
            }
        }
    }

    Ok((picture, base + packet_size))
}

/// Reads up to `len` bytes, stopping early at the end of the source.
fn read_clamped<S: ByteSource + ?Sized>(source: &S, offset: u64, len: u64) -> Vec<u8> {

    let available = source.size().saturating_sub(offset).min(len);

    if available < len {
        log::warn!("RLE buffer at offset {:#010x} is truncated", offset);
    }

    source.bytes(offset, available as usize)
        .map(|bytes| bytes.to_vec())
        .unwrap_or_default()
}
