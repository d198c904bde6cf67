//! Report Drafts - the form as a JSON file
//!
//! Image entries point at files relative to the draft, or carry the bytes
//! inline as base64.

use base64::Engine as _;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::builder::{BuilderError, ReportBuilder};
use crate::media::{Clock, MediaError, Photo, RasterImage};
use crate::record::{ProjectMeta, Slot, TestResult};
use crate::units::Pressure;

#[derive(Debug, Error)]
pub enum DraftError {
    #[error("cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid draft: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid base64 image data: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("image entry has neither a path nor inline data")]
    EmptyImage,

    #[error("invalid time '{0}', expected HH:MM")]
    Time(String),

    #[error("{0}")]
    Builder(#[from] BuilderError),

    #[error("{context}: {source}")]
    Image {
        context: String,
        source: MediaError,
    },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PhotoOrigin {
    #[default]
    Upload,
    Camera,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImageRef {
    #[serde(default)]
    pub path: Option<PathBuf>,
    #[serde(default)]
    pub data_base64: Option<String>,
    #[serde(default)]
    pub source: PhotoOrigin,
}

impl ImageRef {
    fn bytes(&self, base_dir: &Path) -> Result<Vec<u8>, DraftError> {
        if let Some(data) = &self.data_base64 {
            return Ok(base64::engine::general_purpose::STANDARD.decode(data.trim())?);
        }
        let relative = self.path.as_ref().ok_or(DraftError::EmptyImage)?;
        let path = base_dir.join(relative);
        fs::read(&path).map_err(|source| DraftError::Read { path, source })
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RequirementsEntry {
    pub test_pressure: Option<Pressure>,
    pub notes: String,
    pub instrument_id: String,
    pub calibration_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingEntry {
    pub start: Option<NaiveDateTime>,
    pub end: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CompartmentEntry {
    pub date: Option<NaiveDate>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub start_pressure: Option<Pressure>,
    pub end_pressure: Option<Pressure>,
    pub result: TestResult,
    pub remarks: String,
    pub start_photo: Option<ImageRef>,
    pub end_photo: Option<ImageRef>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SignatureEntry {
    pub name: String,
    pub company: String,
    pub date: Option<NaiveDate>,
    pub image: Option<ImageRef>,
}

/// The whole form. Every part may be absent; validation reports the gaps.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportDraft {
    pub project: ProjectMeta,
    pub requirements: RequirementsEntry,
    pub timing: TimingEntry,
    pub compartments: Vec<CompartmentEntry>,
    pub signature: SignatureEntry,
}

fn parse_time(raw: &str) -> Result<NaiveTime, DraftError> {
    let raw = raw.trim();
    NaiveTime::parse_from_str(raw, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
        .map_err(|_| DraftError::Time(raw.to_string()))
}

impl ReportDraft {
    pub fn load(path: &Path) -> Result<Self, DraftError> {
        let content = fs::read_to_string(path).map_err(|source| DraftError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Replay the draft through the builder setters.
    pub fn into_builder(self, base_dir: &Path, today: NaiveDate, clock: &dyn Clock) -> Result<ReportBuilder, DraftError> {
        let mut builder = ReportBuilder::new(today);

        let project = self.project;
        builder
            .set_project_name(project.project_name)
            .set_manufacturer(project.manufacturer)
            .set_work_order(project.work_order)
            .set_drawing(project.drawing)
            .set_revision(project.revision)
            .set_part_line(project.part_line);

        let req = self.requirements;
        if let Some(pressure) = req.test_pressure {
            builder.set_test_pressure(pressure);
        }
        builder
            .set_notes(req.notes)
            .set_instrument_id(req.instrument_id)
            .set_calibration_date(req.calibration_date)
            .set_global_start(self.timing.start)
            .set_global_end(self.timing.end);

        if !self.compartments.is_empty() {
            builder.set_compartment_count(self.compartments.len())?;
        }
        for (index, entry) in self.compartments.into_iter().enumerate() {
            if let Some(date) = entry.date {
                builder.set_date(index, date)?;
            }
            if let Some(raw) = &entry.start_time {
                builder.set_start_time(index, parse_time(raw)?)?;
            }
            if let Some(raw) = &entry.end_time {
                builder.set_end_time(index, parse_time(raw)?)?;
            }
            builder
                .set_start_pressure(index, entry.start_pressure)?
                .set_end_pressure(index, entry.end_pressure)?
                .set_result(index, entry.result)?
                .set_remarks(index, entry.remarks)?;

            for (slot, image) in [(Slot::Start, entry.start_photo), (Slot::End, entry.end_photo)] {
                let Some(image) = image else { continue };
                let bytes = image.bytes(base_dir)?;
                let ingested = match image.source {
                    PhotoOrigin::Upload => Photo::ingest_upload(&bytes, clock),
                    PhotoOrigin::Camera => Photo::ingest_camera(&bytes, clock),
                };
                let photo = ingested.map_err(|source| DraftError::Image {
                    context: format!("compartment {} {:?} photo", index + 1, slot),
                    source,
                })?;
                builder.set_photo(index, slot, photo)?;
            }
        }

        let sig = self.signature;
        let image = match sig.image {
            Some(image) => {
                let bytes = image.bytes(base_dir)?;
                let decoded = RasterImage::decode(&bytes).map_err(|source| DraftError::Image {
                    context: "signature".to_string(),
                    source,
                })?;
                Some(decoded)
            }
            None => None,
        };
        builder
            .set_signer_name(sig.name)
            .set_signer_company(sig.company)
            .set_signing_date(sig.date)
            .set_signature_image(image);

        tracing::debug!(compartments = builder.compartments().len(), "draft loaded into builder");
        Ok(builder)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::{FixedClock, TimestampSource};
    use image::{ImageFormat, Rgb, RgbImage};
    use std::io::Cursor;

    fn png_bytes() -> Vec<u8> {
        let img = RgbImage::from_pixel(8, 6, Rgb([40, 90, 160]));
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, ImageFormat::Png).unwrap();
        out.into_inner()
    }

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()
    }

    fn clock() -> FixedClock {
        FixedClock(day().and_hms_opt(14, 7, 33).unwrap())
    }

    #[test]
    fn test_parse_time_formats() {
        assert_eq!(parse_time("09:30").unwrap(), NaiveTime::from_hms_opt(9, 30, 0).unwrap());
        assert_eq!(parse_time("23:59:00").unwrap(), NaiveTime::from_hms_opt(23, 59, 0).unwrap());
        assert!(matches!(parse_time("9h30"), Err(DraftError::Time(_))));
    }

    #[test]
    fn test_empty_draft_is_blank_builder() {
        let builder = ReportDraft::default()
            .into_builder(Path::new("."), day(), &clock())
            .unwrap();
        assert_eq!(builder, ReportBuilder::new(day()));
    }

    #[test]
    fn test_photo_from_file_and_inline_camera() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("start.png"), png_bytes()).unwrap();
        let inline = base64::engine::general_purpose::STANDARD.encode(png_bytes());

        let json = format!(
            r#"{{
                "compartments": [{{
                    "start_time": "08:15",
                    "start_pressure": {{"value": 145.0, "unit": "psi"}},
                    "result": "pass",
                    "start_photo": {{"path": "start.png"}},
                    "end_photo": {{"data_base64": "{inline}", "source": "camera"}}
                }}]
            }}"#
        );
        let draft: ReportDraft = serde_json::from_str(&json).unwrap();
        let builder = draft.into_builder(dir.path(), day(), &clock()).unwrap();

        let comp = &builder.compartments()[0];
        assert_eq!(comp.start_time, NaiveTime::from_hms_opt(8, 15, 0).unwrap());
        assert!((comp.start_bar.unwrap() - 10.0).abs() < 0.01);
        assert_eq!(comp.result, TestResult::Pass);

        let start = comp.photos.get(Slot::Start).unwrap();
        assert_eq!(start.source, TimestampSource::UploadTime);
        assert_eq!(start.timestamp, day().and_hms_opt(14, 7, 0).unwrap());
        let end = comp.photos.get(Slot::End).unwrap();
        assert_eq!(end.source, TimestampSource::Camera);
    }

    #[test]
    fn test_missing_image_file() {
        let dir = tempfile::tempdir().unwrap();
        let draft: ReportDraft =
            serde_json::from_str(r#"{"signature": {"image": {"path": "sig.png"}}}"#).unwrap();
        let err = draft.into_builder(dir.path(), day(), &clock()).unwrap_err();
        assert!(matches!(err, DraftError::Read { .. }));
    }

    #[test]
    fn test_too_many_compartments() {
        let draft = ReportDraft {
            compartments: vec![CompartmentEntry::default(); 5],
            ..ReportDraft::default()
        };
        let err = draft.into_builder(Path::new("."), day(), &clock()).unwrap_err();
        assert!(matches!(err, DraftError::Builder(BuilderError::CompartmentCount { count: 5, .. })));
    }
}
