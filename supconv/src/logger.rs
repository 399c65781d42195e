/*
 * Copyright 2022 William Swartzendruber
 *
 * This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0. If a
 * copy of the MPL was not distributed with this file, You can obtain one at
 * https://mozilla.org/MPL/2.0/.
 *
 * SPDX-License-Identifier: MPL-2.0
 */

#[cfg(test)]
mod tests;

use std::sync::atomic::{AtomicUsize, Ordering};
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError};

/// Writes log records to STDERR and counts warnings and errors.
pub struct CountingLogger {
    warnings: AtomicUsize,
    errors: AtomicUsize,
}

impl CountingLogger {

    pub const fn new() -> Self {
        Self {
            warnings: AtomicUsize::new(0),
            errors: AtomicUsize::new(0),
        }
    }

    pub fn warnings(&self) -> usize {
        self.warnings.load(Ordering::Relaxed)
    }

    pub fn errors(&self) -> usize {
        self.errors.load(Ordering::Relaxed)
    }

    fn count(&self, level: Level) {
        match level {
            Level::Warn => { self.warnings.fetch_add(1, Ordering::Relaxed); }
            Level::Error => { self.errors.fetch_add(1, Ordering::Relaxed); }
            _ => { }
        }
    }

    /// Returns the summary line for everything counted so far and starts counting anew.
    pub fn take_summary(&self) -> Option<String> {
        summary(
            self.warnings.swap(0, Ordering::Relaxed),
            self.errors.swap(0, Ordering::Relaxed),
        )
    }
}

impl Log for CountingLogger {

    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {

        if !self.enabled(record.metadata()) {
            return
        }

        self.count(record.level());

        match record.level() {
            Level::Error => eprintln!("ERROR: {}", record.args()),
            Level::Warn => eprintln!("WARNING: {}", record.args()),
            _ => eprintln!("{}", record.args()),
        }
    }

    fn flush(&self) { }
}

static LOGGER: CountingLogger = CountingLogger::new();

/// Installs the counting logger, showing the per-segment trace if `verbose` is set.
pub fn init(verbose: bool) -> Result<&'static CountingLogger, SetLoggerError> {

    log::set_logger(&LOGGER)?;
    log::set_max_level(if verbose { LevelFilter::Info } else { LevelFilter::Warn });

    Ok(&LOGGER)
}

/// Formats the warning and error counts, e.g. "There were 2 warnings and 1 error".
///
/// The verb agrees with the first count mentioned.
pub fn summary(warnings: usize, errors: usize) -> Option<String> {

    let parts = [(warnings, "warning"), (errors, "error")]
        .iter()
        .filter(|(count, _)| *count > 0)
        .map(|&(count, noun)| (count, format!("{} {}{}", count, noun, plural(count))))
        .collect::<Vec<_>>();
    let first = parts.first()?.0;
    let verb = if first == 1 { "was" } else { "were" };
    let counts = parts.into_iter().map(|(_, part)| part).collect::<Vec<_>>().join(" and ");

    Some(format!("There {} {}", verb, counts))
}

fn plural(count: usize) -> &'static str {
    if count == 1 { "" } else { "s" }
}
