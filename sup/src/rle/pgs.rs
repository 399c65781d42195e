/*
 * Copyright 2022 William Swartzendruber
 *
 * This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0. If a
 * copy of the MPL was not distributed with this file, You can obtain one at
 * https://mozilla.org/MPL/2.0/.
 *
 * SPDX-License-Identifier: MPL-2.0
 */

use super::{fill, RleError, RleResult};
use super::super::bitmap::Bitmap;

/// The longest run a single escape sequence can describe.
pub const MAX_RUN: usize = 0x3FFF;

/// Decodes PGS run-length data into `bitmap`, starting at its top-left pixel.
pub fn decode_pgs(data: &[u8], bitmap: &mut Bitmap) -> RleResult<()> {

    let width = bitmap.width() as usize;

    if width == 0 {
        return Ok(())
    }

    let pixels = bitmap.pixels_mut();
    let mut input = Input { data, position: 0 };
    let mut offset = 0;
    let mut x = 0;

    while input.position < data.len() {

        let byte = input.next()?;

        if byte != 0x00 {
            fill(pixels, offset, byte, 1, input.position)?;
            offset += 1;
            x += 1;
            continue
        }

        let (color, len) = match input.next()? {
            0x00 => {
                offset = (offset / width) * width;
                if x < width {
                    offset += width;
                }
                x = 0;
                continue
            }
            flag @ 0x01..=0x3F => {
                (0x00, flag as usize)
            }
            flag @ 0x40..=0x7F => {
                (0x00, ((flag as usize & 0x3F) << 8) | input.next()? as usize)
            }
            flag @ 0x80..=0xBF => {
                let len = flag as usize & 0x3F;
                (input.next()?, len)
            }
            flag => {
                let len = ((flag as usize & 0x3F) << 8) | input.next()? as usize;
                (input.next()?, len)
            }
        };

        fill(pixels, offset, color, len, input.position)?;
        offset += len;
        x += len;
    }

    Ok(())
}

/// Encodes a bitmap using PGS run-length coding.
///
/// Every line is terminated by an end-of-line marker.
pub fn encode_pgs(bitmap: &Bitmap) -> Vec<u8> {

    let width = bitmap.width() as usize;
    let mut output = Vec::<u8>::new();

    if width == 0 {
        return output
    }

    for line in bitmap.pixels().chunks(width) {

        let mut x = 0;

        while x < line.len() {

            let color = line[x];
            let mut count = 1;

            while x + count < line.len() && line[x + count] == color && count < MAX_RUN {
                count += 1;
            }

            output_rle_sequence(&mut output, color, count);
            x += count;
        }

        output.push(0x00);
        output.push(0x00);
    }

    output
}

fn output_rle_sequence(output: &mut Vec<u8>, color: u8, count: usize) {
    if color == 0x00 {
        match count {
            0 => { }
            1 ..= 63 => {
                output.push(0x00);
                output.push(count as u8);
            }
            _ => {
                output.push(0x00);
                output.push(0x40 | (count >> 8) as u8);
                output.push((count & 0xFF) as u8);
            }
        }
    } else {
        match count {
            0 => { }
            1 => {
                output.push(color);
            }
            2 => {
                output.push(color);
                output.push(color);
            }
            3 ..= 63 => {
                output.push(0x00);
                output.push(0x80 | count as u8);
                output.push(color);
            }
            _ => {
                output.push(0x00);
                output.push(0xC0 | (count >> 8) as u8);
                output.push((count & 0xFF) as u8);
                output.push(color);
            }
        }
    }
}

struct Input<'a> {
    data: &'a [u8],
    position: usize,
}

impl<'a> Input<'a> {
    fn next(&mut self) -> RleResult<u8> {
        match self.data.get(self.position) {
            Some(&byte) => {
                self.position += 1;
                Ok(byte)
            }
            None => Err(RleError::Overrun { position: self.position }),
        }
    }
}
