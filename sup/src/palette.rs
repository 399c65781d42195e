/*
 * Copyright 2022 William Swartzendruber
 *
 * This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0. If a
 * copy of the MPL was not distributed with this file, You can obtain one at
 * https://mozilla.org/MPL/2.0/.
 *
 * SPDX-License-Identifier: MPL-2.0
 */

//! Resolves color palettes from palette definitions stored in a stream.
//!
//! # Overview
//!
//! A BD-SUP caption can receive several palette definition segments (PDS) for the same palette
//! slot during a single epoch. Each one only carries the entries that changed, so the final
//! palette is obtained by replaying every definition in order on top of a fully transparent
//! table. While doing so, the alpha value of an entry may only ever grow: a lower value means
//! the authoring tool is fading the caption out, and keeping the highest value preserves the
//! fully visible caption.
//!
//! HD-DVD captions carry one complete palette and one complete alpha table instead.

#[cfg(test)]
mod tests;

pub mod profile;

use super::{
    color::{rgb_pixel, ycbcr_pixel, ColorMatrix, RgbPixel, YcbcrPixel, BLACK},
    config::Config,
    source::{ByteSource, SourceResult},
};

/// Number of palette slots a BD-SUP caption can address.
pub const PALETTE_SLOTS: usize = 8;

/// One palette entry in studio-range YCbCr with 8-bit alpha.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct PaletteEntry {
    pub y: u8,
    pub cr: u8,
    pub cb: u8,
    pub alpha: u8,
}

impl Default for PaletteEntry {
    fn default() -> Self {
        Self {
            y: BLACK.y,
            cr: BLACK.cr,
            cb: BLACK.cb,
            alpha: 0,
        }
    }
}

/// A reference to one palette definition within the stream.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct PaletteInfo {
    /// Offset of the first 5-byte entry.
    pub offset: u64,
    /// Number of entries.
    pub size: usize,
}

/// A resolved table of 256 colors.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Palette {
    entries: Vec<PaletteEntry>,
    matrix: ColorMatrix,
}

impl Palette {

    /// Creates a palette where every entry is fully transparent black.
    pub fn new(matrix: ColorMatrix) -> Self {
        Self {
            entries: vec![PaletteEntry::default(); 256],
            matrix,
        }
    }

    pub fn entries(&self) -> &[PaletteEntry] {
        &self.entries
    }

    pub fn entry(&self, index: u8) -> PaletteEntry {
        self.entries[index as usize]
    }

    pub fn alpha(&self, index: u8) -> u8 {
        self.entries[index as usize].alpha
    }

    pub fn set_alpha(&mut self, index: u8, alpha: u8) {
        self.entries[index as usize].alpha = alpha;
    }

    pub fn set_ycbcr(&mut self, index: u8, ycbcr: YcbcrPixel) {
        let entry = &mut self.entries[index as usize];
        entry.y = ycbcr.y;
        entry.cb = ycbcr.cb;
        entry.cr = ycbcr.cr;
    }

    pub fn ycbcr(&self, index: u8) -> YcbcrPixel {
        let entry = &self.entries[index as usize];
        YcbcrPixel { y: entry.y, cb: entry.cb, cr: entry.cr }
    }

    pub fn set_rgb(&mut self, index: u8, rgb: RgbPixel) {
        self.set_ycbcr(index, ycbcr_pixel(rgb, self.matrix));
    }

    pub fn rgb(&self, index: u8) -> RgbPixel {
        rgb_pixel(self.ycbcr(index), self.matrix)
    }

    pub fn argb(&self, index: u8) -> u32 {
        let rgb = self.rgb(index);
        (self.alpha(index) as u32) << 24
            | (rgb.red as u32) << 16
            | (rgb.green as u32) << 8
            | rgb.blue as u32
    }

    pub fn set_argb(&mut self, index: u8, argb: u32) {
        self.set_rgb(
            index,
            RgbPixel {
                red: (argb >> 16) as u8,
                green: (argb >> 8) as u8,
                blue: argb as u8,
            },
        );
        self.set_alpha(index, (argb >> 24) as u8);
    }

    /// Returns the index of the entry with the lowest alpha value, preferring lower indices.
    pub fn most_transparent_index(&self) -> u8 {
        let mut index = 0;
        for (i, entry) in self.entries.iter().enumerate() {
            if entry.alpha < self.entries[index].alpha {
                index = i;
            }
        }
        index as u8
    }

    /// Returns the number of entries that are not fully transparent.
    pub fn visible_count(&self) -> usize {
        self.entries.iter().filter(|entry| entry.alpha > 0).count()
    }
}

/// Replays a list of PGS palette definitions into a single palette.
///
/// Each entry is five bytes: index, Y, Cr, Cb, alpha (Cr and Cb trade places if
/// [`Config::swap_cr_cb`] is set).
pub fn decode_pgs_palette<S: ByteSource + ?Sized>(
    source: &S,
    infos: &[PaletteInfo],
    config: &Config,
) -> SourceResult<Palette> {

    let mut palette = Palette::new(ColorMatrix::new(config.bt601));
    let mut fade_out = false;

    for info in infos {
        for i in 0..info.size {

            let entry = source.bytes(info.offset + 5 * i as u64, 5)?;
            let index = entry[0];
            let (cr, cb) = if config.swap_cr_cb {
                (entry[3], entry[2])
            } else {
                (entry[2], entry[3])
            };
            let mut alpha = entry[4];
            let old_alpha = palette.alpha(index);

            if alpha < old_alpha {
                fade_out = true;
                alpha = old_alpha;
            }

            palette.set_alpha(index, alpha);
            palette.set_ycbcr(
                index,
                if alpha < config.alpha_crop {
                    BLACK
                } else {
                    YcbcrPixel { y: entry[1], cb, cr }
                },
            );
        }
    }

    if fade_out {
        log::warn!("fade out detected -> patched palette");
    }

    Ok(palette)
}

/// Reads an HD-DVD palette: 256 three-byte Y/Cr/Cb entries and 256 inverted alpha bytes.
pub fn decode_hd_palette<S: ByteSource + ?Sized>(
    source: &S,
    palette_offset: u64,
    alpha_offset: u64,
    config: &Config,
) -> SourceResult<Palette> {

    let mut palette = Palette::new(ColorMatrix::new(config.bt601));
    let colors = source.bytes(palette_offset, 3 * 256)?;
    let alphas = source.bytes(alpha_offset, 256)?;

    for index in 0..=255u8 {

        let color = &colors[3 * index as usize..3 * index as usize + 3];
        let (cr, cb) = if config.swap_cr_cb {
            (color[2], color[1])
        } else {
            (color[1], color[2])
        };
        let alpha = 0xFF - alphas[index as usize];

        palette.set_ycbcr(
            index,
            if alpha < config.alpha_crop {
                BLACK
            } else {
                YcbcrPixel { y: color[0], cb, cr }
            },
        );
        palette.set_alpha(index, alpha);
    }

    Ok(palette)
}
