/*
 * Copyright 2022 William Swartzendruber
 *
 * Any copyright is dedicated to the Public Domain.
 *
 * SPDX-License-Identifier: CC0-1.0
 */

use super::*;

fn pds_entries(entries: &[[u8; 5]]) -> Vec<u8> {
    entries.iter().flat_map(|entry| entry.iter().copied()).collect()
}

#[test]
fn test_new_palette_is_transparent() {

    let palette = Palette::new(ColorMatrix::Bt709);

    assert_eq!(palette.entries().len(), 256);
    assert_eq!(palette.visible_count(), 0);
    assert_eq!(palette.most_transparent_index(), 0);
    assert_eq!(palette.entry(255), PaletteEntry { y: 16, cr: 128, cb: 128, alpha: 0 });
}

#[test]
fn test_later_definitions_override_earlier() {

    let mut data = pds_entries(&[[1, 100, 110, 120, 0xFF], [2, 50, 128, 128, 0x80]]);
    data.extend(pds_entries(&[[1, 200, 90, 80, 0xFF]]));

    let infos = [
        PaletteInfo { offset: 0, size: 2 },
        PaletteInfo { offset: 10, size: 1 },
    ];
    let palette = decode_pgs_palette(&data, &infos, &Config::default()).unwrap();

    assert_eq!(palette.entry(1), PaletteEntry { y: 200, cr: 90, cb: 80, alpha: 0xFF });
    assert_eq!(palette.entry(2), PaletteEntry { y: 50, cr: 128, cb: 128, alpha: 0x80 });
    assert_eq!(palette.visible_count(), 2);
}

#[test]
fn test_alpha_never_decreases() {

    let data = pds_entries(&[
        [7, 100, 110, 120, 0x40],
        [7, 100, 110, 120, 0xF0],
        [7, 100, 110, 120, 0x20],
        [7, 100, 110, 120, 0x80],
    ]);
    let infos = [
        PaletteInfo { offset: 0, size: 1 },
        PaletteInfo { offset: 5, size: 1 },
        PaletteInfo { offset: 10, size: 1 },
        PaletteInfo { offset: 15, size: 1 },
    ];
    let palette = decode_pgs_palette(&data, &infos, &Config::default()).unwrap();

    assert_eq!(palette.alpha(7), 0xF0);
}

#[test]
fn test_cropped_alpha_is_black() {

    let data = pds_entries(&[[3, 180, 60, 200, 10], [4, 180, 60, 200, 14]]);
    let infos = [PaletteInfo { offset: 0, size: 2 }];
    let palette = decode_pgs_palette(&data, &infos, &Config::default()).unwrap();

    assert_eq!(palette.entry(3), PaletteEntry { y: 16, cr: 128, cb: 128, alpha: 10 });
    assert_eq!(palette.entry(4), PaletteEntry { y: 180, cr: 60, cb: 200, alpha: 14 });
}

#[test]
fn test_swapped_chroma() {

    let data = pds_entries(&[[0, 180, 60, 200, 0xFF]]);
    let infos = [PaletteInfo { offset: 0, size: 1 }];
    let config = Config { swap_cr_cb: true, ..Config::default() };
    let palette = decode_pgs_palette(&data, &infos, &config).unwrap();

    assert_eq!(palette.entry(0), PaletteEntry { y: 180, cr: 200, cb: 60, alpha: 0xFF });
}

#[test]
fn test_truncated_definition() {

    let data = pds_entries(&[[0, 180, 60, 200, 0xFF]]);
    let infos = [PaletteInfo { offset: 0, size: 2 }];

    assert!(decode_pgs_palette(&data, &infos, &Config::default()).is_err());
}

#[test]
fn test_hd_palette() {

    let mut data = vec![0u8; 3 * 256 + 256];

    data[3] = 120;
    data[4] = 100;
    data[5] = 140;
    data[768] = 0xFF; // index 0 transparent
    data[769] = 0x00; // index 1 opaque
    for alpha in data[770..].iter_mut() {
        *alpha = 0xFF;
    }

    let palette = decode_hd_palette(&data, 0, 768, &Config::default()).unwrap();

    assert_eq!(palette.entry(0), PaletteEntry { y: 16, cr: 128, cb: 128, alpha: 0 });
    assert_eq!(palette.entry(1), PaletteEntry { y: 120, cr: 100, cb: 140, alpha: 0xFF });
    assert_eq!(palette.visible_count(), 1);
}

#[test]
fn test_argb_cycle() {

    let mut palette = Palette::new(ColorMatrix::Bt709);

    palette.set_argb(9, 0xFF00_0000);
    palette.set_argb(10, 0x80FF_FFFF);

    assert_eq!(palette.argb(9), 0xFF00_0000);
    assert_eq!(palette.argb(10), 0x80FF_FFFF);
    assert_eq!(palette.most_transparent_index(), 0);
}
