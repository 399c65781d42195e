/*
 * Copyright 2022 William Swartzendruber
 *
 * Any copyright is dedicated to the Public Domain.
 *
 * SPDX-License-Identifier: CC0-1.0
 */

use super::*;

#[test]
fn test_summary_none() {
    assert_eq!(summary(0, 0), None);
}

#[test]
fn test_summary_one_warning() {
    assert_eq!(summary(1, 0).unwrap(), "There was 1 warning");
}

#[test]
fn test_summary_warnings() {
    assert_eq!(summary(3, 0).unwrap(), "There were 3 warnings");
}

#[test]
fn test_summary_one_error() {
    assert_eq!(summary(0, 1).unwrap(), "There was 1 error");
}

#[test]
fn test_summary_both() {
    assert_eq!(summary(2, 1).unwrap(), "There were 2 warnings and 1 error");
    assert_eq!(summary(1, 4).unwrap(), "There was 1 warning and 4 errors");
}

#[test]
fn test_counting() {

    let logger = CountingLogger::new();

    logger.count(Level::Warn);
    logger.count(Level::Warn);
    logger.count(Level::Error);
    logger.count(Level::Info);

    assert_eq!(logger.warnings(), 2);
    assert_eq!(logger.errors(), 1);
    assert_eq!(logger.take_summary().unwrap(), "There were 2 warnings and 1 error");
    assert_eq!(logger.warnings(), 0);
    assert_eq!(logger.errors(), 0);
    assert_eq!(logger.take_summary(), None);
}
