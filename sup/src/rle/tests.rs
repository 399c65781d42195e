/*
 * Copyright 2022 William Swartzendruber
 *
 * Any copyright is dedicated to the Public Domain.
 *
 * SPDX-License-Identifier: CC0-1.0
 */

use super::*;
use super::super::bitmap::Bitmap;
use rand::{thread_rng, Rng};

#[test]
fn test_pgs_decode_escapes() {

    let data = [
        0x07,                   // one pixel of 7
        0x00, 0x03,             // three zeros
        0x00, 0x84, 0x09,       // four pixels of 9
        0x00, 0x00,             // end of line
        0x00, 0x40, 0x02,       // two zeros, long form
        0x00, 0xC0, 0x06, 0x05, // six pixels of 5, long form
        0x00, 0x00,             // end of line
    ];
    let mut bitmap = Bitmap::new(8, 2, 0xFF);

    decode_pgs(&data, &mut bitmap).unwrap();

    assert_eq!(
        bitmap.pixels(),
        &[
            7, 0, 0, 0, 9, 9, 9, 9,
            0, 0, 5, 5, 5, 5, 5, 5,
        ],
    );
}

#[test]
fn test_pgs_decode_short_line() {

    // The first line ends early; the end-of-line marker moves to the start of the next one.
    let data = [0x01, 0x00, 0x00, 0x02, 0x02, 0x00, 0x00];
    let mut bitmap = Bitmap::new(2, 2, 0xFF);

    decode_pgs(&data, &mut bitmap).unwrap();

    assert_eq!(bitmap.pixels(), &[1, 0xFF, 2, 2]);
}

#[test]
fn test_pgs_decode_overrun_keeps_pixels() {

    let data = [0x03, 0x03, 0x00, 0x8A, 0x04];
    let mut bitmap = Bitmap::new(2, 2, 0xFF);

    assert_eq!(decode_pgs(&data, &mut bitmap), Err(RleError::Overrun { position: 5 }));
    assert_eq!(bitmap.pixels(), &[3, 3, 4, 4]);
}

#[test]
fn test_pgs_decode_truncated_escape() {

    let data = [0x03, 0x00];
    let mut bitmap = Bitmap::new(2, 1, 0xFF);

    assert_eq!(decode_pgs(&data, &mut bitmap), Err(RleError::Overrun { position: 2 }));
    assert_eq!(bitmap.pixels(), &[3, 0xFF]);
}

#[test]
fn test_pgs_encode_line() {

    let bitmap = Bitmap::from_pixels(
        10,
        1,
        0,
        vec![4, 4, 0, 6, 6, 6, 1, 0, 0, 0],
    ).unwrap();

    assert_eq!(
        encode_pgs(&bitmap),
        vec![
            0x04, 0x04,
            0x00, 0x01,
            0x00, 0x83, 0x06,
            0x01,
            0x00, 0x03,
            0x00, 0x00,
        ],
    );
}

#[test]
fn test_pgs_encode_long_runs() {

    let mut pixels = vec![0u8; 100];
    pixels.extend(vec![8u8; 0x3FFF + 3]);

    let bitmap = Bitmap::from_pixels(pixels.len() as u16, 1, 0, pixels).unwrap();

    assert_eq!(
        encode_pgs(&bitmap),
        vec![
            0x00, 0x40, 100,
            0x00, 0xFF, 0xFF, 0x08,
            0x00, 0x83, 0x08,
            0x00, 0x00,
        ],
    );
}

#[test]
fn test_pgs_cycle_solid() {

    let bitmap = Bitmap::from_pixels(2, 2, 0, vec![1; 4]).unwrap();
    let mut decoded = Bitmap::new(2, 2, 0);

    decode_pgs(&encode_pgs(&bitmap), &mut decoded).unwrap();

    assert_eq!(decoded, bitmap);
}

#[test]
fn test_pgs_cycle_random() {

    let mut rng = thread_rng();

    for _ in 0..20 {

        let width = rng.gen_range(1..300);
        let height = rng.gen_range(1..40);
        let colors = rng.gen_range(1..=255u8);
        let mut pixels = Vec::with_capacity(width as usize * height as usize);

        while pixels.len() < width as usize * height as usize {
            let color = rng.gen_range(0..=colors);
            let run = rng.gen_range(1..80);
            for _ in 0..run {
                pixels.push(color);
            }
        }
        pixels.truncate(width as usize * height as usize);

        let bitmap = Bitmap::from_pixels(width, height, 0xFF, pixels).unwrap();
        let mut decoded = Bitmap::new(width, height, 0xFF);

        decode_pgs(&encode_pgs(&bitmap), &mut decoded).unwrap();

        assert_eq!(decoded, bitmap);
    }
}

/// Packs bit fields for building HD-DVD test streams.
#[derive(Default)]
struct BitWriter {
    data: Vec<u8>,
    bits: usize,
}

impl BitWriter {

    fn write(&mut self, value: u32, count: u32) {
        for i in (0..count).rev() {
            if self.bits % 8 == 0 {
                self.data.push(0);
            }
            if (value >> i) & 1 == 1 {
                let last = self.data.len() - 1;
                self.data[last] |= 0x80 >> (self.bits % 8);
            }
            self.bits += 1;
        }
    }

    fn sync(&mut self) {
        self.bits = (self.bits + 7) / 8 * 8;
    }
}

#[test]
fn test_hd_decode_fields() {

    let mut even = BitWriter::default();
    let mut odd = BitWriter::default();

    // Even: a run of color 1 to the end of the line.
    even.write(0b1, 1);
    even.write(0b0, 1);
    even.write(0b01, 2);
    even.write(0b1, 1);
    even.write(0, 7);
    even.sync();

    // Odd: four single pixels with 8-bit colors.
    for color in [5, 6, 7, 8] {
        odd.write(0b0, 1);
        odd.write(0b1, 1);
        odd.write(color, 8);
    }
    odd.sync();

    let mut bitmap = Bitmap::new(4, 2, 0xFF);

    decode_hd(&even.data, &odd.data, &mut bitmap).unwrap();

    assert_eq!(bitmap.pixels(), &[1, 1, 1, 1, 5, 6, 7, 8]);
}

#[test]
fn test_hd_decode_carries_into_next_line() {

    let mut even = BitWriter::default();

    // Six pixels of color 3 on a four pixel line.
    even.write(0b1, 1);
    even.write(0b0, 1);
    even.write(0b11, 2);
    even.write(0b0, 1);
    even.write(4, 3);

    // Two pixels of color 2 complete the third line.
    even.write(0b1, 1);
    even.write(0b0, 1);
    even.write(0b10, 2);
    even.write(0b0, 1);
    even.write(0, 3);
    even.sync();

    let mut bitmap = Bitmap::new(4, 4, 0xFF);

    decode_hd(&even.data, &[], &mut bitmap).unwrap();

    assert_eq!(
        bitmap.pixels(),
        &[
            3, 3, 3, 3,
            0xFF, 0xFF, 0xFF, 0xFF,
            3, 3, 2, 2,
            0xFF, 0xFF, 0xFF, 0xFF,
        ],
    );
}

#[test]
fn test_hd_decode_truncated() {

    let mut even = BitWriter::default();

    // A single pixel token cut off in the middle of its color.
    even.write(0b0, 1);
    even.write(0b1, 1);
    even.write(0b11, 2);

    let mut bitmap = Bitmap::new(4, 2, 0xFF);

    assert!(decode_hd(&even.data, &[], &mut bitmap).is_err());
    assert_eq!(bitmap.pixels(), &[0xFF; 8]);
}
