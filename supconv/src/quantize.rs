/*
 * Copyright 2022 William Swartzendruber
 *
 * This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0. If a
 * copy of the MPL was not distributed with this file, You can obtain one at
 * https://mozilla.org/MPL/2.0/.
 *
 * SPDX-License-Identifier: MPL-2.0
 */


use sup::supbd::write::Quantize;
use std::collections::HashMap;

/// Keeps the most frequent colors of an image and maps every other color to the closest one.
///
/// Fully transparent pixels are treated as a single color regardless of their RGB value.
pub struct NearestColor;

impl Quantize for NearestColor {

    fn quantize(
        &self,
        argb: &[u32],
        _width: u16,
        _height: u16,
        max_colors: usize,
    ) -> (Vec<u8>, Vec<u32>) {

        let mut histogram = HashMap::<u32, usize>::new();

        for &pixel in argb {
            *histogram.entry(normalize(pixel)).or_insert(0) += 1;
        }

        let mut colors = histogram.into_iter().collect::<Vec<_>>();

        // Most frequent first, ties broken by color for a stable result.
        colors.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        colors.truncate(max_colors.min(256));

        let colors = colors.into_iter().map(|(color, _)| color).collect::<Vec<_>>();
        let mut cache = HashMap::<u32, u8>::new();
        let indices = argb
            .iter()
            .map(|&pixel| {
                let pixel = normalize(pixel);
                *cache.entry(pixel).or_insert_with(|| nearest(&colors, pixel))
            })
            .collect();

        (indices, colors)
    }
}

fn normalize(argb: u32) -> u32 {
    if argb >> 24 == 0 {
        0
    } else {
        argb
    }
}

fn nearest(colors: &[u32], argb: u32) -> u8 {
    colors
        .iter()
        .enumerate()
        .min_by_key(|&(_, &color)| distance(color, argb))
        .map_or(0, |(index, _)| index as u8)
}

fn distance(a: u32, b: u32) -> u32 {
    (0..4)
        .map(|channel| {
            let a = (a >> (8 * channel)) as u8 as i32;
            let b = (b >> (8 * channel)) as u8 as i32;
            ((a - b) * (a - b)) as u32
        })
        .sum()
}
