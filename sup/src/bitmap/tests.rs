/*
 * Copyright 2022 William Swartzendruber
 *
 * Any copyright is dedicated to the Public Domain.
 *
 * SPDX-License-Identifier: CC0-1.0
 */

use super::*;
use super::super::color::ColorMatrix;

#[test]
fn test_new_bitmap_is_transparent() {

    let bitmap = Bitmap::new(3, 2, 255);

    assert_eq!(bitmap.pixels(), &[255; 6]);
    assert_eq!(bitmap.transparent(), 255);
    assert_eq!(bitmap.pixel(2, 1), Some(255));
    assert_eq!(bitmap.pixel(3, 0), None);
}

#[test]
fn test_from_pixels_checks_size() {
    assert!(Bitmap::from_pixels(2, 2, 0, vec![1, 2, 3, 4]).is_some());
    assert!(Bitmap::from_pixels(2, 2, 0, vec![1, 2, 3]).is_none());
}

#[test]
fn test_highest_visible_index() {

    let mut palette = Palette::new(ColorMatrix::Bt709);
    let bitmap = Bitmap::from_pixels(4, 1, 0, vec![0, 3, 9, 200]).unwrap();

    assert_eq!(bitmap.highest_visible_index(&palette), None);

    palette.set_alpha(3, 0xFF);
    palette.set_alpha(9, 0x10);
    palette.set_alpha(100, 0xFF);

    assert_eq!(bitmap.highest_visible_index(&palette), Some(9));
}

#[test]
fn test_to_argb() {

    let mut palette = Palette::new(ColorMatrix::Bt709);

    palette.set_argb(1, 0xFFFF_FFFF);

    let bitmap = Bitmap::from_pixels(2, 1, 0, vec![0, 1]).unwrap();

    assert_eq!(bitmap.to_argb(&palette), vec![0x0000_0000, 0xFFFF_FFFF]);
}
