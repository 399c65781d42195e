/*
 * Copyright 2022 William Swartzendruber
 *
 * Any copyright is dedicated to the Public Domain.
 *
 * SPDX-License-Identifier: CC0-1.0
 */

use super::*;

#[test]
fn test_frame_rate_ids() {
    for rate in [
        FrameRate::Film,
        FrameRate::Film24,
        FrameRate::Pal,
        FrameRate::Ntsc,
        FrameRate::PalInterlaced,
        FrameRate::NtscInterlaced,
    ] {
        assert_eq!(FrameRate::from_id(rate.id()), rate);
    }
}

#[test]
fn test_unknown_frame_rate_is_film() {
    assert_eq!(FrameRate::from_id(0x50), FrameRate::Film);
    assert_eq!(FrameRate::from_id(0x00).id(), 0x10);
}
