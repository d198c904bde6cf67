#![allow(dead_code)]

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use image::codecs::jpeg::JpegEncoder;
use image::{ImageFormat, Rgb, RgbImage};
use std::io::Cursor;

use presstest_core::{
    FixedClock, Photo, Pressure, RasterImage, ReportBuilder, Slot, TestResult,
};

pub fn day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()
}

pub fn at(h: u32, m: u32) -> NaiveDateTime {
    day().and_hms_opt(h, m, 0).unwrap()
}

pub fn time(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

pub fn clock(h: u32, m: u32) -> FixedClock {
    FixedClock(at(h, m))
}

fn pattern(w: u32, h: u32) -> RgbImage {
    RgbImage::from_fn(w, h, |x, y| Rgb([(x * 7 % 256) as u8, (y * 5 % 256) as u8, 128]))
}

pub fn png_bytes(w: u32, h: u32) -> Vec<u8> {
    let mut out = Cursor::new(Vec::new());
    pattern(w, h).write_to(&mut out, ImageFormat::Png).unwrap();
    out.into_inner()
}

/// A JPEG whose APP1 segment carries `DateTimeOriginal`.
pub fn jpeg_with_exif(w: u32, h: u32, stamp: &str) -> Vec<u8> {
    let mut plain = Vec::new();
    JpegEncoder::new_with_quality(&mut plain, 90)
        .encode_image(&pattern(w, h))
        .unwrap();

    let field = exif::Field {
        tag: exif::Tag::DateTimeOriginal,
        ifd_num: exif::In::PRIMARY,
        value: exif::Value::Ascii(vec![stamp.as_bytes().to_vec()]),
    };
    let mut writer = exif::experimental::Writer::new();
    writer.push_field(&field);
    let mut tiff = Cursor::new(Vec::new());
    writer.write(&mut tiff, false).unwrap();
    let tiff = tiff.into_inner();

    let length = (2 + 6 + tiff.len()) as u16;
    let mut out = Vec::with_capacity(plain.len() + tiff.len() + 10);
    out.extend_from_slice(&plain[..2]);
    out.extend_from_slice(&[0xFF, 0xE1]);
    out.extend_from_slice(&length.to_be_bytes());
    out.extend_from_slice(b"Exif\0\0");
    out.extend_from_slice(&tiff);
    out.extend_from_slice(&plain[2..]);
    out
}

pub fn signature_image() -> RasterImage {
    RasterImage::decode(&png_bytes(300, 90)).unwrap()
}

/// Every section filled for one compartment: 10 to 9.5 bar, 09:00 to 10:00.
pub fn complete_builder() -> ReportBuilder {
    let mut builder = ReportBuilder::new(day());
    builder
        .set_project_name("Harbour line 3")
        .set_manufacturer("Acme Tanks")
        .set_work_order("WO-1182")
        .set_drawing("DRW-220")
        .set_revision("B")
        .set_part_line("Line 3 / Tank 2")
        .set_test_pressure(Pressure::bar(10.0))
        .set_notes("Hold for 60 minutes")
        .set_instrument_id("PG-77")
        .set_calibration_date(Some(NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()))
        .set_global_start(Some(at(9, 0)))
        .set_global_end(Some(at(10, 0)))
        .set_signer_name("J. de Vries")
        .set_signer_company("Acme Tanks")
        .set_signing_date(Some(day()))
        .set_signature_image(Some(signature_image()));

    let start = Photo::ingest_camera(&png_bytes(640, 480), &clock(9, 0)).unwrap();
    let end = Photo::ingest_camera(&png_bytes(640, 480), &clock(10, 0)).unwrap();
    builder
        .set_start_time(0, time(9, 0))
        .unwrap()
        .set_end_time(0, time(10, 0))
        .unwrap()
        .set_start_pressure(0, Some(Pressure::bar(10.0)))
        .unwrap()
        .set_end_pressure(0, Some(Pressure::bar(9.5)))
        .unwrap()
        .set_result(0, TestResult::Pass)
        .unwrap()
        .set_photo(0, Slot::Start, start)
        .unwrap()
        .set_photo(0, Slot::End, end)
        .unwrap();
    builder
}
