/*
 * Copyright 2022 William Swartzendruber
 *
 * Any copyright is dedicated to the Public Domain.
 *
 * SPDX-License-Identifier: CC0-1.0
 */

use super::{
    *,
    super::{
        SupBd,
        super::{
            color::YcbcrPixel,
            segment::{read_segment, Segment},
            subpicture::{BdSubPicture, ImageObject, ImageObjectFragment},
            substream::Substream,
        },
    },
};
use rand::{thread_rng, Rng};

fn picture(width: u16, height: u16) -> BdSubPicture {

    let mut picture = BdSubPicture::new(90_000);

    picture.end_time = 180_000;
    picture.width = 1920;
    picture.height = 1080;
    picture.composition_number = 5;
    picture.forced = true;
    picture.objects.insert(
        0,
        ImageObject {
            width,
            height,
            x_offset: 100,
            y_offset: 900,
            buffer_size: 1,
            fragments: vec![ImageObjectFragment { offset: 0, len: 1 }],
            ..Default::default()
        },
    );

    picture
}

fn palette(visible: &[u8]) -> Palette {

    let mut palette = Palette::new(ColorMatrix::Bt709);

    for &index in visible {
        palette.set_ycbcr(index, YcbcrPixel { y: 235, cb: 128, cr: 128 });
        palette.set_alpha(index, 0xFF);
    }

    palette
}

/// Splits written display sets into segments along with their DTS values.
fn segments(buffer: &[u8]) -> Vec<(Segment, u32)> {

    let mut segments = vec![];
    let mut offset = 0;

    while offset < buffer.len() as u64 {
        let segment = read_segment(buffer, offset).unwrap();
        let payload = segment.offset as usize;
        let dts = u32::from_be_bytes([
            buffer[payload - 7],
            buffer[payload - 6],
            buffer[payload - 5],
            buffer[payload - 4],
        ]);
        segments.push((segment, dts));
        offset = segment.next_offset();
    }

    segments
}

fn payload<'a>(buffer: &'a [u8], segment: &Segment) -> &'a [u8] {
    &buffer[segment.offset as usize..segment.next_offset() as usize]
}

#[test]
fn test_display_set_layout() {

    let bitmap = Bitmap::from_pixels(4, 2, 0, vec![1, 1, 1, 1, 0, 0, 0, 0]).unwrap();
    let buffer = encode_caption(
        &picture(4, 2),
        &bitmap,
        &palette(&[1]),
        &Config::default(),
        None,
    ).unwrap();
    let segments = segments(&buffer);

    assert_eq!(
        segments.iter().map(|(segment, _)| segment.kind).collect::<Vec<_>>(),
        vec![
            SegmentKind::PresentationComposition,
            SegmentKind::WindowDefinition,
            SegmentKind::PaletteDefinition,
            SegmentKind::ObjectDefinition,
            SegmentKind::End,
            SegmentKind::PresentationComposition,
            SegmentKind::WindowDefinition,
            SegmentKind::End,
        ],
    );
    assert_eq!(
        segments.iter().map(|(segment, dts)| (segment.pts, *dts)).collect::<Vec<_>>(),
        vec![
            (90_000, 84_167),
            (89_999, 84_167),
            (84_167, 0),
            (84_168, 84_167),
            (84_168, 0),
            (180_000, 89_999),
            (179_999, 89_999),
            (89_999, 0),
        ],
    );
    assert_eq!(
        payload(&buffer, &segments[0].0),
        &[
            0x07, 0x80, 0x04, 0x38,
            0x10,
            0x00, 0x05,
            0x80, 0x00, 0x00, 0x01,
            0x00, 0x00, 0x00,
            0x40,
            0x00, 0x64, 0x03, 0x84,
        ],
    );
    assert_eq!(
        payload(&buffer, &segments[1].0),
        &[0x01, 0x00, 0x00, 0x64, 0x03, 0x84, 0x00, 0x04, 0x00, 0x02],
    );
    assert_eq!(
        payload(&buffer, &segments[2].0),
        &[
            0x00, 0x00,
            0x00, 0x10, 0x80, 0x80, 0x00,
            0x01, 0xEB, 0x80, 0x80, 0xFF,
        ],
    );
    assert_eq!(
        payload(&buffer, &segments[3].0),
        &[
            0x00, 0x00, 0x00, 0xC0,
            0x00, 0x00, 0x0D,
            0x00, 0x04, 0x00, 0x02,
            0x00, 0x84, 0x01, 0x00, 0x00,
            0x00, 0x04, 0x00, 0x00,
        ],
    );
    assert_eq!(
        payload(&buffer, &segments[5].0),
        &[0x07, 0x80, 0x04, 0x38, 0x10, 0x00, 0x06, 0x00, 0x00, 0x00, 0x00],
    );
    assert_eq!(payload(&buffer, &segments[6].0), payload(&buffer, &segments[1].0));
}

#[test]
fn test_vertical_crop() {

    let config = Config { crop_offset_y: 10, ..Default::default() };
    let bitmap = Bitmap::from_pixels(4, 2, 0, vec![1; 8]).unwrap();
    let mut picture = picture(4, 2);

    let buffer = encode_caption(&picture, &bitmap, &palette(&[1]), &config, None).unwrap();
    let pcs = segments(&buffer)[0].0;

    assert_eq!(&payload(&buffer, &pcs)[2..4], &1060u16.to_be_bytes());
    assert_eq!(&payload(&buffer, &pcs)[17..19], &890u16.to_be_bytes());

    picture.objects.get_mut(&0).unwrap().y_offset = 1079;

    let buffer = encode_caption(&picture, &bitmap, &palette(&[1]), &config, None).unwrap();
    let pcs = segments(&buffer)[0].0;

    assert_eq!(&payload(&buffer, &pcs)[17..19], &1058u16.to_be_bytes());
}

#[test]
fn test_object_fragmentation() {

    // Alternating colors take one byte per pixel, plus two for the end of line.
    let width = FIRST_ODS_CAPACITY as u16 - 1;
    let pixels = (0..width).map(|x| 1 + (x % 2) as u8).collect::<Vec<_>>();
    let bitmap = Bitmap::from_pixels(width, 1, 0, pixels).unwrap();
    let buffer = encode_caption(
        &picture(width, 1),
        &bitmap,
        &palette(&[1, 2]),
        &Config::default(),
        None,
    ).unwrap();
    let objects = segments(&buffer)
        .into_iter()
        .map(|(segment, _)| segment)
        .filter(|segment| segment.kind == SegmentKind::ObjectDefinition)
        .collect::<Vec<_>>();

    assert_eq!(objects.len(), 2);
    assert_eq!(objects[0].size as usize, 11 + FIRST_ODS_CAPACITY);
    assert_eq!(objects[1].size as usize, 4 + 1);
    assert_eq!(payload(&buffer, &objects[0])[3], 0x80);
    assert_eq!(&payload(&buffer, &objects[0])[4..7], &[0x00, 0xFF, 0xE9]);
    assert_eq!(payload(&buffer, &objects[1])[3], 0x40);
    assert_eq!(objects[0].pts, objects[1].pts);
}

#[test]
fn test_object_fills_first_segment() {

    let width = FIRST_ODS_CAPACITY as u16 - 2;
    let pixels = (0..width).map(|x| 1 + (x % 2) as u8).collect::<Vec<_>>();
    let bitmap = Bitmap::from_pixels(width, 1, 0, pixels).unwrap();
    let buffer = encode_caption(
        &picture(width, 1),
        &bitmap,
        &palette(&[1, 2]),
        &Config::default(),
        None,
    ).unwrap();
    let objects = segments(&buffer)
        .into_iter()
        .map(|(segment, _)| segment)
        .filter(|segment| segment.kind == SegmentKind::ObjectDefinition)
        .collect::<Vec<_>>();

    assert_eq!(objects.len(), 1);
    assert_eq!(objects[0].size as usize, 11 + FIRST_ODS_CAPACITY);
    assert_eq!(payload(&buffer, &objects[0])[3], 0xC0);
}

#[test]
fn test_quantizer_required() {

    let bitmap = Bitmap::from_pixels(2, 1, 0, vec![0, 255]).unwrap();
    let palette = palette(&(0..=255).collect::<Vec<_>>());

    assert!(matches!(
        encode_caption(&picture(2, 1), &bitmap, &palette, &Config::default(), None),
        Err(WriteError::QuantizerRequired),
    ));
}

#[test]
fn test_visible_last_index_requires_quantizer() {

    let bitmap = Bitmap::from_pixels(2, 1, 0, vec![0, 255]).unwrap();
    let palette = palette(&(1..=255).collect::<Vec<_>>());

    assert_eq!(palette.visible_count(), 255);
    assert!(matches!(
        encode_caption(&picture(2, 1), &bitmap, &palette, &Config::default(), None),
        Err(WriteError::QuantizerRequired),
    ));
}

#[test]
fn test_transparent_last_index_skips_quantizer() {

    let bitmap = Bitmap::from_pixels(2, 1, 0, vec![0, 254]).unwrap();
    let palette = palette(&(0..=254).collect::<Vec<_>>());

    assert!(encode_caption(&picture(2, 1), &bitmap, &palette, &Config::default(), None).is_ok());
}

struct SingleColor;

impl Quantize for SingleColor {

    fn quantize(
        &self,
        argb: &[u32],
        _width: u16,
        _height: u16,
        max_colors: usize,
    ) -> (Vec<u8>, Vec<u32>) {

        assert_eq!(max_colors, 255);

        (vec![0; argb.len()], vec![0xFFEB_EBEB])
    }
}

#[test]
fn test_quantizer_used() {

    let bitmap = Bitmap::from_pixels(2, 1, 0, vec![0, 255]).unwrap();
    let palette = palette(&(0..=255).collect::<Vec<_>>());
    let buffer = encode_caption(
        &picture(2, 1),
        &bitmap,
        &palette,
        &Config::default(),
        Some(&SingleColor),
    ).unwrap();
    let pds = segments(&buffer)[2].0;

    assert_eq!(pds.kind, SegmentKind::PaletteDefinition);
    assert_eq!(pds.size, 2 + 5);
    assert_eq!(payload(&buffer, &pds)[6], 0xFF);
}

#[test]
fn test_write_caption() {

    let bitmap = Bitmap::from_pixels(4, 2, 0, vec![1; 8]).unwrap();
    let picture = picture(4, 2);
    let palette = palette(&[1]);
    let config = Config::default();
    let mut output = vec![];

    write_caption(&mut output, &picture, &bitmap, &palette, &config, None).unwrap();

    assert_eq!(output, encode_caption(&picture, &bitmap, &palette, &config, None).unwrap());
}

#[test]
fn test_caption_cycle() {

    let mut rng = thread_rng();

    for _ in 0..10 {

        let width: u16 = rng.gen_range(1..200);
        let height: u16 = rng.gen_range(1..50);
        let pixels = (0..width as usize * height as usize)
            .map(|_| rng.gen_range(0..8))
            .collect::<Vec<u8>>();
        let bitmap = Bitmap::from_pixels(width, height, 0, pixels).unwrap();
        let palette = palette(&[1, 2, 3, 4, 5, 6, 7]);
        let picture = picture(width, height);
        let buffer = encode_caption(
            &picture,
            &bitmap,
            &palette,
            &Config::default(),
            None,
        ).unwrap();
        let supbd = SupBd::open(buffer, Config::default()).unwrap();

        assert_eq!(supbd.len(), 1);

        let read = supbd.sub_picture(0).unwrap();

        assert_eq!(read.start_time(), picture.start_time);
        assert_eq!(read.end_time(), picture.end_time);
        assert_eq!(read.image_width(), width);
        assert_eq!(read.image_height(), height);
        assert!(read.is_forced());

        let decoded = supbd.decode(0).unwrap();

        assert_eq!(decoded.bitmap.pixels(), bitmap.pixels());
        for &index in bitmap.pixels() {
            assert_eq!(decoded.palette.entry(index), palette.entry(index));
        }
    }
}
