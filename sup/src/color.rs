/*
 * Copyright 2022 William Swartzendruber
 *
 * This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0. If a
 * copy of the MPL was not distributed with this file, You can obtain one at
 * https://mozilla.org/MPL/2.0/.
 *
 * SPDX-License-Identifier: MPL-2.0
 */

//! Conversion between studio-range YCbCr and full-range RGB.


#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ColorMatrix {
    Bt601,
    Bt709,
}

impl ColorMatrix {
    pub fn new(bt601: bool) -> Self {
        if bt601 {
            Self::Bt601
        } else {
            Self::Bt709
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct YcbcrPixel {
    pub y: u8,
    pub cb: u8,
    pub cr: u8,
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct RgbPixel {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
}

/// Black as it is stored in a palette: Y=16, Cr=Cb=128.
pub const BLACK: YcbcrPixel = YcbcrPixel { y: 16, cb: 128, cr: 128 };

pub fn rgb_pixel(input: YcbcrPixel, matrix: ColorMatrix) -> RgbPixel {

    let y = 1.164 * (input.y as f64 - 16.0);
    let cb = input.cb as f64 - 128.0;
    let cr = input.cr as f64 - 128.0;

    match matrix {
        ColorMatrix::Bt601 => RgbPixel {
            red:   clamp(y + 1.596 * cr),
            green: clamp(y - 0.392 * cb - 0.813 * cr),
            blue:  clamp(y + 2.017 * cb),
        },
        ColorMatrix::Bt709 => RgbPixel {
            red:   clamp(y + 1.793 * cr),
            green: clamp(y - 0.213 * cb - 0.533 * cr),
            blue:  clamp(y + 2.112 * cb),
        },
    }
}

pub fn ycbcr_pixel(input: RgbPixel, matrix: ColorMatrix) -> YcbcrPixel {

    let r = input.red as f64;
    let g = input.green as f64;
    let b = input.blue as f64;

    match matrix {
        ColorMatrix::Bt601 => YcbcrPixel {
            y:  clamp(16.0 + 0.257 * r + 0.504 * g + 0.098 * b),
            cb: clamp(128.0 - 0.148 * r - 0.291 * g + 0.439 * b),
            cr: clamp(128.0 + 0.439 * r - 0.368 * g - 0.071 * b),
        },
        ColorMatrix::Bt709 => YcbcrPixel {
            y:  clamp(16.0 + 0.183 * r + 0.614 * g + 0.062 * b),
            cb: clamp(128.0 - 0.101 * r - 0.339 * g + 0.439 * b),
            cr: clamp(128.0 + 0.439 * r - 0.399 * g - 0.040 * b),
        },
    }
}

fn clamp(value: f64) -> u8 {
    value.round().max(0.0).min(255.0) as u8
}
