/*
 * Copyright 2022 William Swartzendruber
 *
 * This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0. If a
 * copy of the MPL was not distributed with this file, You can obtain one at
 * https://mozilla.org/MPL/2.0/.
 *
 * SPDX-License-Identifier: MPL-2.0
 */

//! Reads and writes palette profiles.
//!
//! A profile is a text file starting with `#COL`, followed by one `Color_<n>=r,g,b` line per
//! color. Lines that are not color assignments are ignored.


use super::super::color::RgbPixel;
use std::io::{BufRead, Error as IoError, Write};
use thiserror::Error as ThisError;

const MAGIC: &[u8; 4] = b"#COL";

pub type ProfileResult<T> = Result<T, ProfileError>;

#[derive(ThisError, Debug)]
pub enum ProfileError {
    #[error("palette profile IO error")]
    IoError {
        #[from]
        source: IoError,
    },
    #[error("palette profile has unrecognized magic number")]
    UnrecognizedMagicNumber,
    #[error("palette profile has invalid color value on line {line}")]
    InvalidColor {
        line: usize,
    },
}

/// Reads `count` colors from a profile. Colors the profile does not define are black.
pub fn read_profile<R: BufRead>(input: R, count: usize) -> ProfileResult<Vec<RgbPixel>> {

    let mut colors = vec![RgbPixel { red: 0, green: 0, blue: 0 }; count];
    let mut lines = input.lines();

    let header = match lines.next() {
        Some(line) => line?,
        None => String::new(),
    };

    if !header.as_bytes().starts_with(MAGIC) {
        return Err(ProfileError::UnrecognizedMagicNumber)
    }

    for (number, line) in lines.enumerate() {

        let line = line?;
        let (key, value) = match line.split_once('=') {
            Some(pair) => pair,
            None => continue,
        };
        let index = match key.trim().strip_prefix("Color_").map(str::parse::<usize>) {
            Some(Ok(index)) if index < count => index,
            _ => continue,
        };
        let components = value.split(',')
            .map(|component| component.trim().parse::<i32>())
            .collect::<Result<Vec<i32>, _>>()
            .map_err(|_| ProfileError::InvalidColor { line: number + 2 })?;

        if components.len() >= 3 {
            colors[index] = RgbPixel {
                red: (components[0] & 0xFF) as u8,
                green: (components[1] & 0xFF) as u8,
                blue: (components[2] & 0xFF) as u8,
            };
        }
    }

    Ok(colors)
}

pub fn write_profile<W: Write>(output: &mut W, colors: &[RgbPixel]) -> ProfileResult<()> {

    output.write_all(MAGIC)?;
    writeln!(output, " - created by {}", env!("CARGO_PKG_NAME"))?;

    for (index, color) in colors.iter().enumerate() {
        writeln!(output, "Color_{}={},{},{}", index, color.red, color.green, color.blue)?;
    }

    Ok(())
}
