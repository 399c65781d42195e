/*
 * Copyright 2022 William Swartzendruber
 *
 * This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0. If a
 * copy of the MPL was not distributed with this file, You can obtain one at
 * https://mozilla.org/MPL/2.0/.
 *
 * SPDX-License-Identifier: MPL-2.0
 */

//! Reads and writes BD-SUP streams.
//!
//! # Overview
//!
//! A BD-SUP file is the PGS stream of a Blu-ray disc demuxed from its transport stream: a flat
//! sequence of segments. [`SupBd::open`] scans all of them once, handing each one to the
//! composition state machine, and keeps the resulting captions. Image and palette data stay in
//! the source until a caption is decoded.


pub mod assembler;
pub mod composition;
pub mod write;

use composition::Composer;
use super::{
    bitmap::Bitmap,
    config::{Config, FrameRate},
    error::{ReadError, ReadResult},
    palette::decode_pgs_palette,
    rle::decode_pgs,
    segment::read_segment,
    source::ByteSource,
    subpicture::{close_open_captions, BdSubPicture, SubPicture},
    substream::{BitmapWithPalette, Substream},
};
use std::sync::atomic::{AtomicBool, Ordering};

/// A scanned BD-SUP stream.
#[derive(Debug)]
pub struct SupBd<S: ByteSource> {
    source: S,
    config: Config,
    pictures: Vec<BdSubPicture>,
}

impl<S: ByteSource> SupBd<S> {

    /// Scans the whole stream.
    pub fn open(source: S, config: Config) -> ReadResult<Self> {
        Self::open_cancellable(source, config, &AtomicBool::new(false))
    }

    /// Scans the whole stream, checking `cancel` before every segment.
    ///
    /// Once at least one caption has been found, stream errors only end the scan early.
    /// Cancellation always fails.
    pub fn open_cancellable(source: S, config: Config, cancel: &AtomicBool) -> ReadResult<Self> {

        let mut composer = Composer::new(config.merge_threshold);

        if let Err(err) = scan(&source, &mut composer, cancel) {
            if err.is_cancellation() || composer.is_empty() {
                return Err(err)
            }
            log::error!("{}", err);
            log::info!("probably not all captions imported due to error");
        }

        let mut pictures = composer.finish();

        if pictures.is_empty() {
            return Err(ReadError::NoCaptions)
        }

        close_open_captions(&mut pictures, config.min_display_time);

        let supbd = Self { source, config, pictures };

        log::info!("detected {} forced captions", supbd.forced_count());

        Ok(supbd)
    }

    pub fn pictures(&self) -> &[BdSubPicture] {
        &self.pictures
    }

    /// Returns the frame rate signaled by a caption.
    pub fn frame_rate(&self, index: usize) -> Option<FrameRate> {
        self.pictures.get(index).map(|picture| picture.frame_rate)
    }

    pub fn into_source(self) -> S {
        self.source
    }
}

impl<S: ByteSource> Substream for SupBd<S> {

    fn len(&self) -> usize {
        self.pictures.len()
    }

    fn sub_picture(&self, index: usize) -> Option<&dyn SubPicture> {
        self.pictures.get(index).map(|picture| picture as &dyn SubPicture)
    }

    fn decode(&self, index: usize) -> ReadResult<BitmapWithPalette> {

        let picture = self.pictures.get(index).ok_or(ReadError::IndexOutOfRange { index })?;
        let object = picture.object().ok_or(ReadError::MissingObject)?;
        let infos = picture.palettes
            .get(object.palette_id as usize)
            .ok_or(ReadError::PaletteIdOutOfRange)?;
        let palette = decode_pgs_palette(&self.source, infos, &self.config)?;

        if object.width > picture.width || object.height > picture.height {
            return Err(
                ReadError::CorruptGeometry {
                    width: object.width,
                    height: object.height,
                }
            )
        }

        let mut bitmap = Bitmap::new(
            object.width,
            object.height,
            palette.most_transparent_index(),
        );
        let data = object.read_buffer(&self.source)?;

        if let Err(err) = decode_pgs(&data, &mut bitmap) {
            log::warn!(
                "problems during RLE decoding of picture OBJ at offset {:#010x}: {}",
                object.fragments.first().map_or(0, |fragment| fragment.offset),
                err,
            );
        }

        Ok(BitmapWithPalette { bitmap, palette })
    }
}

fn scan<S: ByteSource + ?Sized>(
    source: &S,
    composer: &mut Composer,
    cancel: &AtomicBool,
) -> ReadResult<()> {

    let size = source.size();
    let mut offset = 0;

    while offset < size {

        if cancel.load(Ordering::Relaxed) {
            return Err(ReadError::Cancelled)
        }

        let segment = read_segment(source, offset)?;

        composer.segment(source, &segment)?;
        offset = segment.next_offset();
    }

    Ok(())
}
