/*
 * Copyright 2022 William Swartzendruber
 *
 * Any copyright is dedicated to the Public Domain.
 *
 * SPDX-License-Identifier: CC0-1.0
 */

use super::*;

#[test]
fn test_big_endian_reads() {

    let data = vec![0x50, 0x47, 0x00, 0x01, 0x5F, 0x90];

    assert_eq!(data.size(), 6);
    assert_eq!(data.byte(1).unwrap(), 0x47);
    assert_eq!(data.word(0).unwrap(), 0x5047);
    assert_eq!(data.dword(2).unwrap(), 0x0001_5F90);
}

#[test]
fn test_little_endian_dword() {

    let data = [0x90u8, 0x5F, 0x01, 0x00];

    assert_eq!(data[..].dword_le(0).unwrap(), 90_000);
}

#[test]
fn test_read_past_end() {

    let data = vec![0u8; 4];

    assert_eq!(data.word(3), Err(SourceError::OutOfRange { offset: 4 }));
    assert_eq!(data.byte(9), Err(SourceError::OutOfRange { offset: 9 }));
}
