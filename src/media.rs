//! Media - decoded images, photo timestamps and print normalization
//!
//! Decoding failures are fatal (the operator must re-upload). Metadata
//! failures never are: they degrade to wall-clock substitution.

use std::io::Cursor;

use chrono::{Local, NaiveDate, NaiveDateTime, Timelike};
use exif::{In, Tag, Value};
use image::codecs::jpeg::JpegEncoder;
use image::imageops::{self, FilterType};
use image::{Rgb, RgbImage};
use serde::{Serialize, Serializer};
use thiserror::Error;

use crate::hashing::sha256_hex;
use crate::profile::PhotoLayout;

const JPEG_QUALITY: u8 = 85;

#[derive(Debug, Error)]
pub enum MediaError {
    #[error("image could not be decoded: {0}")]
    Decode(#[from] image::ImageError),

    #[error("image could not be encoded: {0}")]
    Encode(image::ImageError),

    #[error("image is empty")]
    Empty,
}

/// A decoded RGB raster plus the digest of its pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct RasterImage {
    pixels: RgbImage,
    digest: String,
}

impl RasterImage {
    pub fn decode(bytes: &[u8]) -> Result<Self, MediaError> {
        if bytes.is_empty() {
            return Err(MediaError::Empty);
        }
        let decoded = image::load_from_memory(bytes)?;
        Self::from_rgb(decoded.to_rgb8())
    }

    pub fn from_rgb(pixels: RgbImage) -> Result<Self, MediaError> {
        if pixels.width() == 0 || pixels.height() == 0 {
            return Err(MediaError::Empty);
        }
        let digest = sha256_hex(pixels.as_raw());
        Ok(Self { pixels, digest })
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn pixels(&self) -> &RgbImage {
        &self.pixels
    }

    pub fn digest(&self) -> &str {
        &self.digest
    }
}

impl Serialize for RasterImage {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct Summary<'a> {
            width: u32,
            height: u32,
            sha256: &'a str,
        }
        Summary {
            width: self.width(),
            height: self.height(),
            sha256: &self.digest,
        }
        .serialize(serializer)
    }
}

/// Wall-clock source for photos that carry no capture time.
pub trait Clock {
    fn now(&self) -> NaiveDateTime;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// Always returns the same instant.
pub struct FixedClock(pub NaiveDateTime);

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}

fn truncate_to_minute(at: NaiveDateTime) -> NaiveDateTime {
    at.with_second(0)
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(at)
}

/// Capture time from embedded EXIF (`DateTimeOriginal`, else `DateTime`).
pub fn exif_timestamp(bytes: &[u8]) -> Option<NaiveDateTime> {
    let exif = exif::Reader::new()
        .read_from_container(&mut Cursor::new(bytes))
        .ok()?;
    let field = exif
        .get_field(Tag::DateTimeOriginal, In::PRIMARY)
        .or_else(|| exif.get_field(Tag::DateTime, In::PRIMARY))?;
    let raw = match field.value {
        Value::Ascii(ref parts) => parts.first()?,
        _ => return None,
    };
    let stamp = exif::DateTime::from_ascii(raw).ok()?;
    NaiveDate::from_ymd_opt(stamp.year.into(), stamp.month.into(), stamp.day.into())?
        .and_hms_opt(stamp.hour.into(), stamp.minute.into(), stamp.second.into())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TimestampSource {
    /// Read from the file's embedded capture metadata.
    Exif,
    /// Taken live; wall-clock time is the capture time.
    Camera,
    /// Uploaded without metadata; wall-clock time substituted.
    UploadTime,
}

impl TimestampSource {
    /// True when the document must disclose the substitution.
    pub fn is_synthetic(&self) -> bool {
        matches!(self, TimestampSource::UploadTime)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Photo {
    pub image: RasterImage,
    pub timestamp: NaiveDateTime,
    pub source: TimestampSource,
}

impl Photo {
    pub fn ingest_upload(bytes: &[u8], clock: &dyn Clock) -> Result<Self, MediaError> {
        let image = RasterImage::decode(bytes)?;
        let photo = match exif_timestamp(bytes) {
            Some(timestamp) => Self { image, timestamp, source: TimestampSource::Exif },
            None => {
                tracing::debug!("no capture time in upload, substituting wall clock");
                Self {
                    image,
                    timestamp: truncate_to_minute(clock.now()),
                    source: TimestampSource::UploadTime,
                }
            }
        };
        Ok(photo)
    }

    pub fn ingest_camera(bytes: &[u8], clock: &dyn Clock) -> Result<Self, MediaError> {
        Ok(Self {
            image: RasterImage::decode(bytes)?,
            timestamp: truncate_to_minute(clock.now()),
            source: TimestampSource::Camera,
        })
    }

    pub fn is_synthetic(&self) -> bool {
        self.source.is_synthetic()
    }
}

fn scaled(value: u32, scale: f64) -> u32 {
    ((value as f64 * scale) as u32).max(1)
}

/// Scale an image for print according to the profile's photo layout.
///
/// `max_height` bounds shrink-mode photos; fixed-aspect blocks have a set
/// height that the renderer checks against the frame up front.
pub fn normalize(image: &RgbImage, layout: &PhotoLayout, max_height: u32) -> RgbImage {
    match *layout {
        PhotoLayout::ShrinkToWidth { max_width } => shrink_to_fit(image, max_width, max_height),
        PhotoLayout::FixedAspect { width, aspect } => fixed_aspect(image, width, aspect),
    }
}

/// Height of a fixed-aspect block `width` wide.
pub fn fixed_aspect_height(width: u32, aspect: [u32; 2]) -> u32 {
    let [aw, ah] = [aspect[0].max(1), aspect[1].max(1)];
    ((width.max(1) as f64 * ah as f64 / aw as f64).round() as u32).max(1)
}

/// Keeps the aspect ratio and never enlarges.
pub fn shrink_to_fit(image: &RgbImage, max_width: u32, max_height: u32) -> RgbImage {
    let (w, h) = image.dimensions();
    let scale = (max_width.max(1) as f64 / w as f64)
        .min(max_height.max(1) as f64 / h as f64)
        .min(1.0);
    if scale < 1.0 {
        imageops::resize(image, scaled(w, scale), scaled(h, scale), FilterType::Triangle)
    } else {
        image.clone()
    }
}

/// Output is always exactly the target frame.
///
/// Images covering the frame are center-cropped to its aspect and scaled
/// down. Smaller images are shrunk to fit if needed, then centered on white.
pub fn fixed_aspect(image: &RgbImage, width: u32, aspect: [u32; 2]) -> RgbImage {
    let target_w = width.max(1);
    let target_h = fixed_aspect_height(target_w, aspect);
    let (w, h) = image.dimensions();

    if w >= target_w && h >= target_h {
        let ratio = target_w as f64 / target_h as f64;
        let (crop_w, crop_h) = if w as f64 / h as f64 > ratio {
            (((h as f64 * ratio).round() as u32).clamp(1, w), h)
        } else {
            (w, ((w as f64 / ratio).round() as u32).clamp(1, h))
        };
        let cropped = imageops::crop_imm(image, (w - crop_w) / 2, (h - crop_h) / 2, crop_w, crop_h)
            .to_image();
        return imageops::resize(&cropped, target_w, target_h, FilterType::Triangle);
    }

    let scale = (target_w as f64 / w as f64)
        .min(target_h as f64 / h as f64)
        .min(1.0);
    let fitted = if scale < 1.0 {
        imageops::resize(image, scaled(w, scale), scaled(h, scale), FilterType::Triangle)
    } else {
        image.clone()
    };
    let mut canvas = RgbImage::from_pixel(target_w, target_h, Rgb([255, 255, 255]));
    let x = (target_w - fitted.width()) / 2;
    let y = (target_h - fitted.height()) / 2;
    imageops::overlay(&mut canvas, &fitted, x.into(), y.into());
    canvas
}

/// Baseline JPEG at a fixed quality, used for PDF image streams.
pub fn encode_jpeg(image: &RgbImage) -> Result<Vec<u8>, MediaError> {
    let mut buffer = Vec::new();
    JpegEncoder::new_with_quality(&mut buffer, JPEG_QUALITY)
        .encode_image(image)
        .map_err(MediaError::Encode)?;
    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::ImageFormat;

    fn png_bytes(w: u32, h: u32) -> Vec<u8> {
        let img = RgbImage::from_pixel(w, h, Rgb([10, 120, 200]));
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, ImageFormat::Png).unwrap();
        out.into_inner()
    }

    fn clock() -> FixedClock {
        let at = NaiveDate::from_ymd_opt(2024, 5, 1)
            .unwrap()
            .and_hms_milli_opt(14, 37, 52, 250)
            .unwrap();
        FixedClock(at)
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(matches!(RasterImage::decode(b"not an image"), Err(MediaError::Decode(_))));
        assert!(matches!(RasterImage::decode(&[]), Err(MediaError::Empty)));
    }

    #[test]
    fn test_upload_without_exif_is_synthetic_and_truncated() {
        let photo = Photo::ingest_upload(&png_bytes(8, 6), &clock()).unwrap();
        assert_eq!(photo.source, TimestampSource::UploadTime);
        assert!(photo.is_synthetic());
        assert_eq!(photo.timestamp.format("%Y-%m-%d %H:%M:%S%.f").to_string(), "2024-05-01 14:37:00");
    }

    #[test]
    fn test_camera_capture_not_flagged() {
        let photo = Photo::ingest_camera(&png_bytes(8, 6), &clock()).unwrap();
        assert_eq!(photo.source, TimestampSource::Camera);
        assert!(!photo.is_synthetic());
    }

    #[test]
    fn test_exif_absent_returns_none() {
        assert_eq!(exif_timestamp(&png_bytes(4, 4)), None);
        assert_eq!(exif_timestamp(b"garbage"), None);
    }

    #[test]
    fn test_shrink_only_shrinks() {
        let small = RgbImage::new(200, 100);
        assert_eq!(shrink_to_fit(&small, 420, 780).dimensions(), (200, 100));
        let large = RgbImage::new(840, 1000);
        assert_eq!(shrink_to_fit(&large, 420, 780).dimensions(), (420, 500));
    }

    #[test]
    fn test_tall_portrait_capped_by_height() {
        let portrait = RgbImage::new(1080, 2400);
        let layout = PhotoLayout::ShrinkToWidth { max_width: 420 };
        let (w, h) = normalize(&portrait, &layout, 781).dimensions();
        assert!(h <= 781, "height {h}");
        assert!(h >= 780, "height {h}");
        assert!((350..=352).contains(&w), "width {w}");
    }

    #[test]
    fn test_fixed_aspect_uniform_blocks() {
        for (w, h) in [(960, 540), (600, 800), (200, 100), (1000, 50), (420, 236)] {
            let out = fixed_aspect(&RgbImage::new(w, h), 420, [16, 9]);
            assert_eq!(out.dimensions(), (420, 236), "input {w}x{h}");
        }
    }

    #[test]
    fn test_letterbox_pads_white() {
        let dark = RgbImage::from_pixel(100, 50, Rgb([0, 0, 0]));
        let out = fixed_aspect(&dark, 420, [16, 9]);
        assert_eq!(out.get_pixel(0, 0), &Rgb([255, 255, 255]));
        assert_eq!(out.get_pixel(210, 118), &Rgb([0, 0, 0]));
    }

    #[test]
    fn test_serializes_as_summary() {
        let raster = RasterImage::from_rgb(RgbImage::new(3, 2)).unwrap();
        let json = serde_json::to_value(&raster).unwrap();
        assert_eq!(json["width"], 3);
        assert_eq!(json["height"], 2);
        assert_eq!(json["sha256"].as_str().unwrap().len(), 64);
    }

    #[test]
    fn test_jpeg_encoding_deterministic() {
        let img = RgbImage::from_fn(32, 16, |x, y| Rgb([(x * 8) as u8, (y * 16) as u8, 90]));
        let a = encode_jpeg(&img).unwrap();
        let b = encode_jpeg(&img).unwrap();
        assert_eq!(a, b);
        assert_eq!(&a[..2], &[0xFF, 0xD8]);
    }
}
