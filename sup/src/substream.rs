/*
 * Copyright 2022 William Swartzendruber
 *
 * This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0. If a
 * copy of the MPL was not distributed with this file, You can obtain one at
 * https://mozilla.org/MPL/2.0/.
 *
 * SPDX-License-Identifier: MPL-2.0
 */

use super::{
    bitmap::Bitmap,
    error::ReadResult,
    palette::Palette,
    subpicture::SubPicture,
};

/// A decoded caption image along with the palette it indexes into.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BitmapWithPalette {
    pub bitmap: Bitmap,
    pub palette: Palette,
}

/// A scanned stream of captions that can be decoded one at a time.
pub trait Substream {

    /// Returns the number of captions.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn sub_picture(&self, index: usize) -> Option<&dyn SubPicture>;

    /// Decodes the image and palette of one caption.
    ///
    /// Nothing is cached; every call reads the source again.
    fn decode(&self, index: usize) -> ReadResult<BitmapWithPalette>;

    /// Returns the number of captions flagged as forced.
    fn forced_count(&self) -> usize {
        (0..self.len())
            .filter_map(|index| self.sub_picture(index))
            .filter(|picture| picture.is_forced())
            .count()
    }
}
