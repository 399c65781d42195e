/*
 * Copyright 2022 William Swartzendruber
 *
 * This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0. If a
 * copy of the MPL was not distributed with this file, You can obtain one at
 * https://mozilla.org/MPL/2.0/.
 *
 * SPDX-License-Identifier: MPL-2.0
 */

use super::{RleError, RleResult};

/// Reads big-endian bit fields from a byte slice, most significant bit first.
pub struct BitReader<'a> {
    data: &'a [u8],
    byte_offset: usize,
    bit_offset: u8,
}

impl<'a> BitReader<'a> {

    pub fn new(data: &'a [u8]) -> Self {
        BitReader {
            data,
            byte_offset: 0,
            bit_offset: 0,
        }
    }

    pub fn bits_left(&self) -> usize {
        (self.data.len() * 8).saturating_sub(self.byte_offset * 8 + self.bit_offset as usize)
    }

    /// The byte position of the next bit.
    pub fn position(&self) -> usize {
        self.byte_offset
    }

    pub fn read_bit(&mut self) -> RleResult<bool> {

        let byte = match self.data.get(self.byte_offset) {
            Some(&byte) => byte,
            None => return Err(RleError::Overrun { position: self.byte_offset }),
        };
        let bit = (byte >> (7 - self.bit_offset)) & 1;

        self.bit_offset += 1;

        if self.bit_offset == 8 {
            self.bit_offset = 0;
            self.byte_offset += 1;
        }

        Ok(bit == 1)
    }

    /// Reads up to 32 bits as an unsigned number.
    pub fn read_bits(&mut self, count: u32) -> RleResult<u32> {

        debug_assert!(count <= 32);

        let mut value = 0u32;

        for _ in 0..count {
            value = (value << 1) | self.read_bit()? as u32;
        }

        Ok(value)
    }

    /// Skips to the start of the next byte unless already there.
    pub fn sync_to_byte(&mut self) {
        if self.bit_offset != 0 {
            self.bit_offset = 0;
            self.byte_offset += 1;
        }
    }
}
