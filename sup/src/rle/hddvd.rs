/*
 * Copyright 2022 William Swartzendruber
 *
 * This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0. If a
 * copy of the MPL was not distributed with this file, You can obtain one at
 * https://mozilla.org/MPL/2.0/.
 *
 * SPDX-License-Identifier: MPL-2.0
 */

use super::{bits::BitReader, fill, RleResult};
use super::super::bitmap::Bitmap;

/// Decodes the even and odd line streams of an HD-DVD caption into `bitmap`.
///
/// Both fields are always attempted; if either overruns, the first error is returned.
pub fn decode_hd(even: &[u8], odd: &[u8], bitmap: &mut Bitmap) -> RleResult<()> {

    let width = bitmap.width() as usize;
    let height = bitmap.height() as usize;
    let pixels = bitmap.pixels_mut();

    let even_result = decode_field(
        pixels,
        0,
        width,
        width * (height / 2 + (height & 1)),
        &mut BitReader::new(even),
    );
    let odd_result = decode_field(
        pixels,
        width,
        width,
        width * (height / 2),
        &mut BitReader::new(odd),
    );

    even_result.and(odd_result)
}

/// Decodes every other line of a frame, starting at `offset`.
///
/// Each token is a run flag, a color depth flag, a 2 or 8 bit color and, for runs, a length.
/// Runs may cross the end of a line, in which case the remainder continues on the next line
/// of the same field.
fn decode_field(
    pixels: &mut [u8],
    mut offset: usize,
    width: usize,
    max_pixels: usize,
    input: &mut BitReader,
) -> RleResult<()> {

    let mut x = 0;
    let mut total = 0;

    while input.bits_left() > 0 && total < max_pixels {

        let run = input.read_bit()?;
        let color = (
            if input.read_bit()? {
                input.read_bits(8)?
            } else {
                input.read_bits(2)?
            }
        ) as u8;
        let mut count = if run {
            if input.read_bit()? {
                match input.read_bits(7)? as usize + 9 {
                    9 => width.saturating_sub(x),
                    count => count,
                }
            } else {
                input.read_bits(3)? as usize + 2
            }
        } else {
            1
        };
        let mut line_feed = false;

        if x + count == width {
            input.sync_to_byte();
            line_feed = true;
        }

        total += count;

        let carry = if x + count > width {
            let carry = x + count - width;
            count = width.saturating_sub(x);
            line_feed = true;
            carry
        } else {
            0
        };

        fill(pixels, offset + x, color, count, input.position())?;

        if line_feed {
            offset += 2 * width;
            x = carry;
        } else {
            x += count;
        }

        fill(pixels, offset, color, carry, input.position())?;
    }

    Ok(())
}
