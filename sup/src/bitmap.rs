/*
 * Copyright 2022 William Swartzendruber
 *
 * This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0. If a
 * copy of the MPL was not distributed with this file, You can obtain one at
 * https://mozilla.org/MPL/2.0/.
 *
 * SPDX-License-Identifier: MPL-2.0
 */

#[cfg(test)]
mod tests;

use super::palette::Palette;

/// An image with one palette index per pixel, stored row by row.
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
pub struct Bitmap {
    width: u16,
    height: u16,
    transparent: u8,
    pixels: Vec<u8>,
}

impl Bitmap {

    /// Creates a bitmap filled with the given transparent index.
    pub fn new(width: u16, height: u16, transparent: u8) -> Self {
        Self {
            width,
            height,
            transparent,
            pixels: vec![transparent; width as usize * height as usize],
        }
    }

    /// Wraps existing pixel data, returning `None` if its length does not match the dimensions.
    pub fn from_pixels(width: u16, height: u16, transparent: u8, pixels: Vec<u8>) -> Option<Self> {
        if pixels.len() == width as usize * height as usize {
            Some(Self { width, height, transparent, pixels })
        } else {
            None
        }
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    /// The palette index designated as fully transparent.
    pub fn transparent(&self) -> u8 {
        self.transparent
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn pixels_mut(&mut self) -> &mut [u8] {
        &mut self.pixels
    }

    pub fn pixel(&self, x: u16, y: u16) -> Option<u8> {
        if x < self.width && y < self.height {
            Some(self.pixels[y as usize * self.width as usize + x as usize])
        } else {
            None
        }
    }

    /// Returns the highest palette index used by a pixel that is not fully transparent.
    pub fn highest_visible_index(&self, palette: &Palette) -> Option<u8> {

        let mut used = [false; 256];

        for &pixel in &self.pixels {
            used[pixel as usize] = true;
        }

        (0..=255u8).rev().find(|&index| used[index as usize] && palette.alpha(index) > 0)
    }

    /// Expands the bitmap into 32-bit ARGB pixels.
    pub fn to_argb(&self, palette: &Palette) -> Vec<u32> {
        self.pixels.iter().map(|&pixel| palette.argb(pixel)).collect()
    }
}
