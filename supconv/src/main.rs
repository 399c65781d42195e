/*
 * Copyright 2022 William Swartzendruber
 *
 * This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0. If a
 * copy of the MPL was not distributed with this file, You can obtain one at
 * https://mozilla.org/MPL/2.0/.
 *
 * SPDX-License-Identifier: MPL-2.0
 */


mod logger;
mod quantize;

use quantize::NearestColor;
use sup::{
    supbd::{
        write::{write_caption, WriteError},
        SupBd,
    },
    suphd::SupHd,
    Config,
    FrameRate,
    ReadError,
    Substream,
};
use std::{
    fs::{read, File},
    io::{stdin, stdout, BufWriter, Error as IoError, Read, Write},
    process::exit,
};
use clap::{app_from_crate, crate_authors, crate_description, crate_name, crate_version, Arg};
use thiserror::Error as ThisError;

#[derive(ThisError, Debug)]
enum ConvertError {
    #[error("IO error: {source}")]
    IoError {
        #[from]
        source: IoError,
    },
    #[error("could not read input stream: {source}")]
    ReadError {
        #[from]
        source: ReadError,
    },
    #[error("could not write caption: {source}")]
    WriteError {
        #[from]
        source: WriteError,
    },
    #[error("input is neither a BD-SUP nor an HD-DVD-SUP stream")]
    UnknownFormat,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Format {
    BdSup,
    HdSup,
}

fn main() {

    let matches = app_from_crate!()
        .arg(Arg::with_name("merge-time")
            .long("merge-time")
            .short("m")
            .value_name("MS")
            .help("Merges identical captions separated by less than this many milliseconds")
            .takes_value(true)
            .required(false)
            .default_value("200")
            .validator(|value| {
                if value.parse::<u32>().map_or(false, |ms| ms <= u32::MAX / 90) {
                    Ok(())
                } else {
                    Err("must be an unsigned integer".to_string())
                }
            })
        )
        .arg(Arg::with_name("alpha-crop")
            .long("alpha-crop")
            .short("a")
            .value_name("ALPHA")
            .help("Palette entries more transparent than this are made black")
            .takes_value(true)
            .required(false)
            .default_value("14")
            .validator(|value| {
                if value.parse::<u8>().is_ok() {
                    Ok(())
                } else {
                    Err("must be an integer between 0 and 255".to_string())
                }
            })
        )
        .arg(Arg::with_name("swap-cr-cb")
            .long("swap-cr-cb")
            .help("Swaps the Cr and Cb components of input palettes")
        )
        .arg(Arg::with_name("bt601")
            .long("bt601")
            .help("Uses BT.601 instead of BT.709 to convert colors")
        )
        .arg(Arg::with_name("fps")
            .long("fps")
            .short("f")
            .value_name("RATE")
            .help("Frame rate written to the output stream")
            .takes_value(true)
            .required(false)
            .possible_values(&["24p", "24", "25", "30", "50", "60"])
            .default_value("24p")
        )
        .arg(Arg::with_name("crop-y")
            .long("crop-y")
            .short("y")
            .value_name("PIXELS")
            .help("Lines cropped from both the top and the bottom of the screen")
            .takes_value(true)
            .required(false)
            .default_value("0")
            .validator(|value| {
                if value.parse::<u16>().is_ok() {
                    Ok(())
                } else {
                    Err("must be an unsigned integer".to_string())
                }
            })
        )
        .arg(Arg::with_name("min-time")
            .long("min-time")
            .short("t")
            .value_name("MS")
            .help("Display time given to a final caption without an end")
            .takes_value(true)
            .required(false)
            .default_value("500")
            .validator(|value| {
                if value.parse::<u32>().map_or(false, |ms| ms <= u32::MAX / 90) {
                    Ok(())
                } else {
                    Err("must be an unsigned integer".to_string())
                }
            })
        )
        .arg(Arg::with_name("verbose")
            .long("verbose")
            .short("v")
            .help("Traces every segment and packet that is read")
        )
        .arg(Arg::with_name("input")
            .index(1)
            .value_name("INPUT-FILE")
            .help("Input BD-SUP or HD-DVD-SUP file; use - for STDIN")
            .required(true)
        )
        .arg(Arg::with_name("output")
            .index(2)
            .value_name("OUTPUT-FILE")
            .help("Output BD-SUP file; use - for STDOUT")
            .required(true)
        )
        .after_help(format!("This utility converts the subtitle picture streams of HD-DVD and \
            Blu-ray discs into Blu-ray SUP streams. Captions repeated across several epochs \
            are merged and every caption is written out as a single, fully-timed display set \
            pair.\n\n\
            Copyright © 2022 William Swartzendruber\n\
            Licensed under the Mozilla Public License 2.0\n\
            <{}>", env!("CARGO_PKG_REPOSITORY")).as_str())
        .get_matches();
    let config = Config {
        merge_threshold: matches.value_of("merge-time").unwrap().parse::<u32>().unwrap() * 90,
        alpha_crop: matches.value_of("alpha-crop").unwrap().parse::<u8>().unwrap(),
        swap_cr_cb: matches.is_present("swap-cr-cb"),
        bt601: matches.is_present("bt601"),
        frame_rate: frame_rate(matches.value_of("fps").unwrap()).unwrap(),
        crop_offset_y: matches.value_of("crop-y").unwrap().parse::<u16>().unwrap(),
        min_display_time: matches.value_of("min-time").unwrap().parse::<u32>().unwrap() * 90,
    };
    let logger = match logger::init(matches.is_present("verbose")) {
        Ok(logger) => logger,
        Err(err) => {
            eprintln!("Could not install logger: {}", err);
            exit(1)
        }
    };
    let input_value = matches.value_of("input").unwrap();
    let input = if input_value == "-" {
        let mut buffer = Vec::new();
        stdin().read_to_end(&mut buffer).map(|_| buffer)
    } else {
        read(input_value)
    };
    let input = match input {
        Ok(input) => input,
        Err(err) => {
            eprintln!("Could not read input file: {}", err);
            exit(1)
        }
    };
    let output_value = matches.value_of("output").unwrap();
    let (mut stdout_write, mut file_write);
    let mut output = BufWriter::<&mut dyn Write>::new(
        if output_value == "-" {
            stdout_write = stdout();
            &mut stdout_write
        } else {
            file_write = match File::create(output_value) {
                Ok(file) => file,
                Err(err) => {
                    eprintln!("Could not open output file for writing: {}", err);
                    exit(1)
                }
            };
            &mut file_write
        }
    );
    let result = convert(input, &mut output, &config)
        .and_then(|count| output.flush().map(|_| count).map_err(ConvertError::from));

    match result {
        Ok(count) => log::info!("{} captions written", count),
        Err(ref err) => log::error!("{}", err),
    }

    if let Some(summary) = logger.take_summary() {
        eprintln!("{}", summary);
    }

    if result.is_err() {
        exit(1)
    }
}

/// Maps a `--fps` value to the frame rate it names.
fn frame_rate(value: &str) -> Option<FrameRate> {
    match value {
        "24p" => Some(FrameRate::Film),
        "24" => Some(FrameRate::Film24),
        "25" => Some(FrameRate::Pal),
        "30" => Some(FrameRate::Ntsc),
        "50" => Some(FrameRate::PalInterlaced),
        "60" => Some(FrameRate::NtscInterlaced),
        _ => None,
    }
}

/// Identifies a stream by the magic number of its first segment or packet.
fn detect(input: &[u8]) -> Option<Format> {
    match input.get(0..2) {
        Some(b"PG") => Some(Format::BdSup),
        Some(b"SP") => Some(Format::HdSup),
        _ => None,
    }
}

/// Converts a whole stream, returning the number of captions written.
fn convert<W: Write>(
    input: Vec<u8>,
    output: &mut W,
    config: &Config,
) -> Result<usize, ConvertError> {
    match detect(&input).ok_or(ConvertError::UnknownFormat)? {
        Format::BdSup => {
            log::info!("detected BD-SUP stream");
            write_substream(&SupBd::open(input, config.clone())?, output, config)
        }
        Format::HdSup => {
            log::info!("detected HD-DVD-SUP stream");
            write_substream(&SupHd::open(input, config.clone())?, output, config)
        }
    }
}

/// Decodes every caption and writes it out, skipping captions that fail to decode.
fn write_substream<W: Write>(
    substream: &dyn Substream,
    output: &mut W,
    config: &Config,
) -> Result<usize, ConvertError> {

    let mut written = 0;

    for index in 0..substream.len() {

        let picture = match substream.sub_picture(index) {
            Some(picture) => picture,
            None => continue,
        };
        let decoded = match substream.decode(index) {
            Ok(decoded) => decoded,
            Err(err) => {
                log::error!("caption {} skipped: {}", index + 1, err);
                continue
            }
        };

        write_caption(
            output,
            picture,
            &decoded.bitmap,
            &decoded.palette,
            config,
            Some(&NearestColor),
        )?;
        written += 1;
    }

    Ok(written)
}
