/*
 * Copyright 2022 William Swartzendruber
 *
 * This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0. If a
 * copy of the MPL was not distributed with this file, You can obtain one at
 * https://mozilla.org/MPL/2.0/.
 *
 * SPDX-License-Identifier: MPL-2.0
 */

//! Groups display sets into captions.
//!
//! # Overview
//!
//! Authoring tools rarely emit one epoch per caption. A caption may be redrawn by several
//! epochs carrying the same bitmap, and a single epoch may show several captions one after the
//! other by changing its composition number. The [`Composer`] follows the presentation
//! composition segments and decides at every end segment whether the display set just read:
//!
//! 1. repeats the previous caption and is merged back into it,
//! 2. starts a new caption, splitting the open one at the current PCS, or
//! 3. only extends the open caption.
//!
//! Captions that never receive both a palette and an object are dropped.

use super::assembler::{
    parse_ods,
    parse_pcs,
    parse_pds,
    parse_wds,
    read_composition_header,
    CompositionState,
};
use super::super::{
    error::ReadResult,
    pts_to_timestamp,
    segment::{Segment, SegmentKind, HEADER_SIZE},
    source::ByteSource,
    subpicture::BdSubPicture,
};

/// Returns `true` if `b` shows the same object as `a` shortly after it.
///
/// Objects are compared by buffer size and dimensions only.
pub fn mergeable(a: Option<&BdSubPicture>, b: &BdSubPicture, threshold: u32) -> bool {

    let a = match a {
        Some(a) => a,
        None => return false,
    };

    if a.end_time != 0 && b.start_time as i64 - a.end_time as i64 >= threshold as i64 {
        return false
    }

    match (a.object(), b.object()) {
        (Some(a), Some(b)) => {
            a.buffer_size == b.buffer_size && a.width == b.width && a.height == b.height
        }
        _ => false,
    }
}

/// ODS and PDS counts of an epoch.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
struct Counters {
    ods: u32,
    pds: u32,
}

impl Counters {
    fn complete(&self) -> bool {
        self.ods > 0 && self.pds > 0
    }
}

/// The composition state machine.
#[derive(Debug)]
pub struct Composer {
    merge_threshold: u32,
    /// Captions that will not change anymore, except for a backfilled end time.
    done: Vec<BdSubPicture>,
    /// The caption of the current epoch.
    current: Option<BdSubPicture>,
    /// The open caption as it was before the last composition number change.
    snapshot: Option<BdSubPicture>,
    counters: Counters,
    /// Counters as of the last split.
    counters_old: Counters,
    number: Option<u16>,
    number_old: Option<u16>,
    object_count: u8,
    pts_pcs: u32,
    palette_update: bool,
    state: Option<CompositionState>,
}

impl Composer {

    pub fn new(merge_threshold: u32) -> Self {
        Self {
            merge_threshold,
            done: Vec::new(),
            current: None,
            snapshot: None,
            counters: Counters::default(),
            counters_old: Counters::default(),
            number: None,
            number_old: None,
            object_count: 0,
            pts_pcs: 0,
            palette_update: false,
            state: None,
        }
    }

    /// Returns `true` if no caption has been started yet or all were dropped.
    pub fn is_empty(&self) -> bool {
        self.done.is_empty() && self.current.is_none()
    }

    /// Feeds one segment to the state machine.
    pub fn segment<S: ByteSource + ?Sized>(
        &mut self,
        source: &S,
        segment: &Segment,
    ) -> ReadResult<()> {

        let offset = segment.offset - HEADER_SIZE;

        match segment.kind {
            SegmentKind::PaletteDefinition => {
                log::info!("PDS offset: {:#010x}, size: {:#06x}", offset, segment.size);
                self.palette_definition(source, segment)
            }
            SegmentKind::ObjectDefinition => {
                log::info!("ODS offset: {:#010x}, size: {:#06x}", offset, segment.size);
                self.object_definition(source, segment)
            }
            SegmentKind::PresentationComposition => {
                log::info!("PCS offset: {:#010x}, size: {:#06x}", offset, segment.size);
                self.presentation_composition(source, segment)
            }
            SegmentKind::WindowDefinition => {
                log::info!("WDS offset: {:#010x}, size: {:#06x}", offset, segment.size);
                match self.current.as_mut() {
                    Some(current) => parse_wds(source, segment, current),
                    None => {
                        log::warn!("missing PTS start -> ignored");
                        Ok(())
                    }
                }
            }
            SegmentKind::End => {
                log::info!("END offset: {:#010x}", offset);
                self.end();
                Ok(())
            }
            SegmentKind::Unknown(id) => {
                log::warn!("<unknown> {:#04x} offset: {:#010x}", id, offset);
                Ok(())
            }
        }
    }

    fn palette_definition<S: ByteSource + ?Sized>(
        &mut self,
        source: &S,
        segment: &Segment,
    ) -> ReadResult<()> {

        if self.number == self.number_old {
            log::info!("composition number unchanged -> PDS ignored");
            return Ok(())
        }

        match self.current.as_mut() {
            Some(current) => {
                // Empty palettes are not counted.
                if let Some(size) = parse_pds(source, segment, current)? {
                    if size > 0 {
                        self.counters.pds += 1;
                    }
                }
            }
            None => log::warn!("missing PTS start -> ignored"),
        }

        Ok(())
    }

    fn object_definition<S: ByteSource + ?Sized>(
        &mut self,
        source: &S,
        segment: &Segment,
    ) -> ReadResult<()> {

        if self.number == self.number_old {
            log::info!("composition number unchanged -> ODS ignored");
            return Ok(())
        }

        if self.palette_update {
            log::warn!("palette update only -> ignored");
            return Ok(())
        }

        match self.current.as_mut() {
            Some(current) => {
                if parse_ods(source, segment, current)? {
                    self.counters.ods += 1;
                }
            }
            None => log::warn!("missing PTS start -> ignored"),
        }

        Ok(())
    }

    fn presentation_composition<S: ByteSource + ?Sized>(
        &mut self,
        source: &S,
        segment: &Segment,
    ) -> ReadResult<()> {

        let header = read_composition_header(source, segment)?;

        if let CompositionState::Invalid(id) = header.state {
            log::warn!(
                "illegal composition state {:#04x} at offset {:#010x}",
                id,
                segment.offset - HEADER_SIZE,
            );
            return Ok(())
        }

        self.number = Some(header.number);
        self.state = Some(header.state);
        self.palette_update = header.palette_update;
        self.pts_pcs = segment.pts;
        self.object_count = header.object_count;

        if header.state == CompositionState::EpochStart {
            return self.epoch_start(source, segment)
        }

        let current = match self.current.as_mut() {
            Some(current) => current,
            None => {
                log::warn!(
                    "missing start of epoch at offset {:#010x}",
                    segment.offset - HEADER_SIZE,
                );
                return Ok(())
            }
        };

        log::info!(
            "{:?}, composition number: {}, palette update: {}, PTS: {}",
            header.state,
            header.number,
            header.palette_update,
            pts_to_timestamp(segment.pts as u64),
        );

        if self.number != self.number_old {
            let mut snapshot = current.clone();
            snapshot.end_time = self.pts_pcs;
            self.snapshot = Some(snapshot);
            parse_pcs(source, segment, current)?;
        }

        Ok(())
    }

    fn epoch_start<S: ByteSource + ?Sized>(
        &mut self,
        source: &S,
        segment: &Segment,
    ) -> ReadResult<()> {

        if let Some(previous) = self.current.take() {
            if self.counters.complete() {
                self.done.push(previous);
            } else {
                log::warn!("missing PDS/ODS: last epoch is discarded");
                self.number_old = self.number.map(|number| number.wrapping_sub(1));
            }
        }

        let mut current = BdSubPicture::new(segment.pts);

        parse_pcs(source, segment, &mut current)?;

        if let Some(last) = self.done.last_mut() {
            if last.end_time == 0 {
                last.end_time = current.start_time;
            }
        }

        log::info!(
            "#> {} ({}), screen size: {}x{}",
            self.done.len() + 1,
            pts_to_timestamp(current.start_time as u64),
            current.width,
            current.height,
        );

        self.current = Some(current);
        self.snapshot = None;
        self.counters = Counters::default();
        self.counters_old = Counters::default();

        Ok(())
    }

    fn end(&mut self) {

        let changed = self.object_count > 0
            && self.counters.ods > self.counters_old.ods
            && self.number != self.number_old;

        if self.state == Some(CompositionState::EpochStart) {
            if let Some(current) = self.current.as_ref() {
                if changed && mergeable(self.done.last(), current, self.merge_threshold) {
                    // The epoch repeats the previous caption, which is reopened.
                    if let Some(mut previous) = self.done.pop() {
                        previous.end_time = 0;
                        self.current = Some(previous);
                        // Everything in `done` is complete, and so is the reopened caption.
                        self.counters.pds = self.counters.pds.max(1);
                        log::info!("#< caption merged");
                    }
                }
            }
        } else if let Some(current) = self.current.as_mut() {

            let start_time = current.start_time;

            current.start_time = self.pts_pcs;

            let split = changed
                && self.snapshot.is_some()
                && !mergeable(self.snapshot.as_ref(), current, self.merge_threshold);

            if split {

                if self.counters.ods - self.counters_old.ods > 1
                    || self.counters.pds - self.counters_old.pds > 1
                {
                    log::warn!("multiple PDS/ODS definitions: result may be erratic");
                }

                if let Some(snapshot) = self.snapshot.take() {
                    self.done.push(snapshot);
                }
                current.end_time = 0;
                self.counters_old.ods = self.counters.ods;

                log::info!(
                    "#< {} ({})",
                    self.done.len() + 1,
                    pts_to_timestamp(current.start_time as u64),
                );
            } else {

                current.start_time = start_time;
                current.end_time = self.pts_pcs;

                if self.snapshot.as_ref().map_or(false, |snapshot| snapshot.forced) {
                    current.forced = true;
                }

                if self.counters.pds > self.counters_old.pds || self.palette_update {
                    log::warn!("palette animation: result may be erratic");
                }
            }
        } else {
            log::warn!("end without at least one epoch start");
        }

        self.counters_old.pds = self.counters.pds;
        self.number_old = self.number;
    }

    /// Drops the last caption if it is incomplete and returns all remaining captions.
    pub fn finish(mut self) -> Vec<BdSubPicture> {

        if let Some(current) = self.current.take() {
            if self.counters.complete() {
                self.done.push(current);
            } else {
                log::warn!("missing PDS/ODS: last epoch is discarded");
            }
        }

        self.done
    }
}
