/*
 * Copyright 2022 William Swartzendruber
 *
 * This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0. If a
 * copy of the MPL was not distributed with this file, You can obtain one at
 * https://mozilla.org/MPL/2.0/.
 *
 * SPDX-License-Identifier: MPL-2.0
 */

//! Conversion parameters shared by the readers and the writer.

#[cfg(test)]
mod tests;

/// Parameters that influence how streams are read and written.
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    /// Two captions with identical objects are merged if the gap between them, in 90 kHz
    /// ticks, is below this value.
    pub merge_threshold: u32,
    /// Palette entries with an alpha value below this are made black so that scaling filters
    /// are not contaminated by the color of invisible pixels.
    pub alpha_crop: u8,
    /// Swaps the Cr and Cb components when reading palettes.
    pub swap_cr_cb: bool,
    /// Uses the BT.601 matrix instead of BT.709 for RGB conversion.
    pub bt601: bool,
    /// Frame rate written into output presentation composition segments.
    pub frame_rate: FrameRate,
    /// Vertical crop, in pixels, applied to the top and bottom of the screen when writing.
    pub crop_offset_y: u16,
    /// Duration, in 90 kHz ticks, given to a caption whose end is unknown when the stream ends.
    pub min_display_time: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            merge_threshold: 18_000,
            alpha_crop: 14,
            swap_cr_cb: false,
            bt601: false,
            frame_rate: FrameRate::Film,
            crop_offset_y: 0,
            min_display_time: 45_000,
        }
    }
}

/// Frame rates that can be signaled in a presentation composition segment.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum FrameRate {
    /// 23.976 (or 24) progressive frames per second. Also used for unknown IDs.
    Film,
    /// 24 Hz.
    Film24,
    /// 25 frames per second.
    Pal,
    /// 29.97 frames per second.
    Ntsc,
    /// 50 fields per second.
    PalInterlaced,
    /// 59.94 fields per second.
    NtscInterlaced,
}

impl FrameRate {

    pub fn from_id(id: u8) -> Self {
        match id {
            0x20 => Self::Film24,
            0x30 => Self::Pal,
            0x40 => Self::Ntsc,
            0x60 => Self::PalInterlaced,
            0x70 => Self::NtscInterlaced,
            _ => Self::Film,
        }
    }

    pub fn id(self) -> u8 {
        match self {
            Self::Film => 0x10,
            Self::Film24 => 0x20,
            Self::Pal => 0x30,
            Self::Ntsc => 0x40,
            Self::PalInterlaced => 0x60,
            Self::NtscInterlaced => 0x70,
        }
    }

    pub fn fps(self) -> f64 {
        match self {
            Self::Film => 24_000.0 / 1_001.0,
            Self::Film24 => 24.0,
            Self::Pal => 25.0,
            Self::Ntsc => 30_000.0 / 1_001.0,
            Self::PalInterlaced => 50.0,
            Self::NtscInterlaced => 60_000.0 / 1_001.0,
        }
    }
}

impl Default for FrameRate {
    fn default() -> Self {
        Self::Film
    }
}
