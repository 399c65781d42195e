/*
 * Copyright 2022 William Swartzendruber
 *
 * This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0. If a
 * copy of the MPL was not distributed with this file, You can obtain one at
 * https://mozilla.org/MPL/2.0/.
 *
 * SPDX-License-Identifier: MPL-2.0
 */

//! Caption metadata collected while scanning a stream.


use super::{
    config::FrameRate,
    palette::{PaletteInfo, PALETTE_SLOTS},
    source::{ByteSource, SourceResult},
};
use std::collections::BTreeMap;

/// Timing and placement of a single caption.
///
/// Times are 90 kHz presentation timestamps. An end time of zero means the caption has not been
/// closed yet.
pub trait SubPicture {

    fn start_time(&self) -> u32;

    fn end_time(&self) -> u32;

    fn set_end_time(&mut self, end_time: u32);

    fn screen_width(&self) -> u16;

    fn screen_height(&self) -> u16;

    /// Horizontal position of the image on the screen.
    fn x_offset(&self) -> u16;

    /// Vertical position of the image on the screen.
    fn y_offset(&self) -> u16;

    fn image_width(&self) -> u16;

    fn image_height(&self) -> u16;

    fn composition_number(&self) -> u16 {
        0
    }

    fn is_forced(&self) -> bool {
        false
    }
}

/// Gives every caption without a valid end time one.
///
/// The end is the start of the next caption if that is later, or else the start plus
/// `min_display_time`.
pub fn close_open_captions<P: SubPicture>(pictures: &mut [P], min_display_time: u32) {

    for i in 0..pictures.len() {

        let start_time = pictures[i].start_time();

        if pictures[i].end_time() > start_time {
            continue
        }

        let next_start = pictures.get(i + 1).map(|next| next.start_time());

        pictures[i].set_end_time(match next_start {
            Some(next_start) if next_start > start_time => next_start,
            _ => start_time.saturating_add(min_display_time),
        });

        log::info!("caption {} has no end time -> closed", i + 1);
    }
}

/// One contiguous piece of RLE data within the source.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct ImageObjectFragment {
    pub offset: u64,
    pub len: usize,
}

/// An image assembled from one or more object definition segments.
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
pub struct ImageObject {
    pub width: u16,
    pub height: u16,
    /// The palette slot this object is drawn with.
    pub palette_id: u8,
    pub x_offset: u16,
    pub y_offset: u16,
    /// Sum of all fragment lengths.
    pub buffer_size: usize,
    /// Fragments in arrival order.
    pub fragments: Vec<ImageObjectFragment>,
}

impl ImageObject {

    /// Copies all fragments out of the source into one contiguous RLE buffer.
    pub fn read_buffer<S: ByteSource + ?Sized>(&self, source: &S) -> SourceResult<Vec<u8>> {

        let mut buffer = Vec::with_capacity(self.buffer_size);

        for fragment in self.fragments.iter() {
            buffer.extend_from_slice(source.bytes(fragment.offset, fragment.len)?);
        }

        Ok(buffer)
    }
}

/// A caption read from a BD-SUP stream.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct BdSubPicture {
    pub start_time: u32,
    pub end_time: u32,
    pub width: u16,
    pub height: u16,
    pub frame_rate: FrameRate,
    pub composition_number: u16,
    pub forced: bool,
    /// The object shown by this caption.
    pub object_id: u16,
    pub window_x: u16,
    pub window_y: u16,
    pub window_width: u16,
    pub window_height: u16,
    pub objects: BTreeMap<u16, ImageObject>,
    /// Palette definitions received for each slot, in arrival order.
    pub palettes: [Vec<PaletteInfo>; PALETTE_SLOTS],
}

impl BdSubPicture {

    pub fn new(start_time: u32) -> Self {
        Self {
            start_time,
            ..Default::default()
        }
    }

    /// Returns the shown object, provided it has received image data.
    pub fn object(&self) -> Option<&ImageObject> {
        self.objects
            .get(&self.object_id)
            .filter(|object| !object.fragments.is_empty())
    }
}

impl SubPicture for BdSubPicture {

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
        self.width
    }

    fn screen_height(&self) -> u16 {
        self.height
    }

    fn x_offset(&self) -> u16 {
        self.objects.get(&self.object_id).map_or(0, |object| object.x_offset)
    }

    fn y_offset(&self) -> u16 {
        self.objects.get(&self.object_id).map_or(0, |object| object.y_offset)
    }

    fn image_width(&self) -> u16 {
        self.object().map_or(0, |object| object.width)
    }

    fn image_height(&self) -> u16 {
        self.object().map_or(0, |object| object.height)
    }

    fn composition_number(&self) -> u16 {
        self.composition_number
    }

    fn is_forced(&self) -> bool {
        self.forced
    }
}
