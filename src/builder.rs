//! Record Assembler
//!
//! `ReportBuilder` is the caller-owned form state. The operator fills it
//! field by field (possibly over many partial submissions); `assemble`
//! validates it and either returns an immutable [`ReportRecord`] or the
//! sections that still need work. Nothing is ever partially assembled.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use thiserror::Error;

use crate::media::{Photo, RasterImage};
use crate::profile::{ReportProfile, TimingMode, MAX_COMPARTMENTS};
use crate::record::{
    CompartmentRecord, GlobalTiming, Instrument, PhotoSlots, ProjectMeta, ReportRecord,
    Requirements, SignatureRecord, Slot, TestResult,
};
use crate::units::Pressure;
use crate::validation::{Section, ValidationResult, Validator};

#[derive(Debug, Error)]
pub enum BuilderError {
    #[error("compartment count {count} outside 1..={max}")]
    CompartmentCount { count: usize, max: u8 },

    #[error("no compartment {index} (have {count})")]
    NoSuchCompartment { index: usize, count: usize },
}

#[derive(Debug, Error)]
pub enum AssemblyError {
    #[error("report incomplete, missing: {}", format_sections(.0.missing_sections()))]
    Incomplete(ValidationResult),
}

impl AssemblyError {
    pub fn validation(&self) -> &ValidationResult {
        match self {
            AssemblyError::Incomplete(result) => result,
        }
    }
}

fn format_sections(sections: Vec<Section>) -> String {
    sections
        .iter()
        .map(|s| format!("{:?}", s))
        .collect::<Vec<_>>()
        .join(", ")
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequirementsDraft {
    pub test_pressure: Option<Pressure>,
    pub notes: String,
    pub instrument_id: String,
    pub calibration_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimingDraft {
    pub start: Option<NaiveDateTime>,
    pub end: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompartmentDraft {
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    /// Canonical bar(g).
    pub start_bar: Option<f64>,
    pub end_bar: Option<f64>,
    pub result: TestResult,
    pub remarks: String,
    pub photos: PhotoSlots,
}

impl CompartmentDraft {
    /// Form defaults: today, 09:00 to 10:00.
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            start_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap_or_default(),
            end_time: NaiveTime::from_hms_opt(10, 0, 0).unwrap_or_default(),
            start_bar: None,
            end_bar: None,
            result: TestResult::Unset,
            remarks: String::new(),
            photos: PhotoSlots::default(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SignatureDraft {
    pub name: String,
    pub company: String,
    pub date: Option<NaiveDate>,
    pub image: Option<RasterImage>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReportBuilder {
    today: NaiveDate,
    meta: ProjectMeta,
    requirements: RequirementsDraft,
    timing: TimingDraft,
    compartments: Vec<CompartmentDraft>,
    signature: SignatureDraft,
}

impl ReportBuilder {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            today,
            meta: ProjectMeta::default(),
            requirements: RequirementsDraft::default(),
            timing: TimingDraft::default(),
            compartments: vec![CompartmentDraft::new(today)],
            signature: SignatureDraft::default(),
        }
    }

    /// Clear the whole form back to a single empty compartment.
    pub fn reset(&mut self) {
        *self = Self::new(self.today);
    }

    pub fn meta(&self) -> &ProjectMeta {
        &self.meta
    }

    pub fn requirements(&self) -> &RequirementsDraft {
        &self.requirements
    }

    pub fn timing(&self) -> &TimingDraft {
        &self.timing
    }

    pub fn compartments(&self) -> &[CompartmentDraft] {
        &self.compartments
    }

    pub fn signature(&self) -> &SignatureDraft {
        &self.signature
    }

    // --- Project metadata ---

    pub fn set_project_name(&mut self, value: impl Into<String>) -> &mut Self {
        self.meta.project_name = value.into();
        self
    }

    pub fn set_manufacturer(&mut self, value: impl Into<String>) -> &mut Self {
        self.meta.manufacturer = value.into();
        self
    }

    pub fn set_work_order(&mut self, value: impl Into<String>) -> &mut Self {
        self.meta.work_order = value.into();
        self
    }

    pub fn set_drawing(&mut self, value: impl Into<String>) -> &mut Self {
        self.meta.drawing = value.into();
        self
    }

    pub fn set_revision(&mut self, value: impl Into<String>) -> &mut Self {
        self.meta.revision = value.into();
        self
    }

    pub fn set_part_line(&mut self, value: impl Into<String>) -> &mut Self {
        self.meta.part_line = value.into();
        self
    }

    // --- Requirements ---

    pub fn set_test_pressure(&mut self, pressure: Pressure) -> &mut Self {
        self.requirements.test_pressure = Some(pressure);
        self
    }

    pub fn set_notes(&mut self, value: impl Into<String>) -> &mut Self {
        self.requirements.notes = value.into();
        self
    }

    pub fn set_instrument_id(&mut self, value: impl Into<String>) -> &mut Self {
        self.requirements.instrument_id = value.into();
        self
    }

    pub fn set_calibration_date(&mut self, date: Option<NaiveDate>) -> &mut Self {
        self.requirements.calibration_date = date;
        self
    }

    pub fn set_global_start(&mut self, at: Option<NaiveDateTime>) -> &mut Self {
        self.timing.start = at;
        self
    }

    pub fn set_global_end(&mut self, at: Option<NaiveDateTime>) -> &mut Self {
        self.timing.end = at;
        self
    }

    // --- Compartments ---

    /// Changing the count discards all compartment entries, as the form does.
    pub fn set_compartment_count(&mut self, count: usize) -> Result<&mut Self, BuilderError> {
        if count == 0 || count > usize::from(MAX_COMPARTMENTS) {
            return Err(BuilderError::CompartmentCount { count, max: MAX_COMPARTMENTS });
        }
        if count != self.compartments.len() {
            self.compartments = (0..count).map(|_| CompartmentDraft::new(self.today)).collect();
        }
        Ok(self)
    }

    fn compartment_mut(&mut self, index: usize) -> Result<&mut CompartmentDraft, BuilderError> {
        let count = self.compartments.len();
        self.compartments
            .get_mut(index)
            .ok_or(BuilderError::NoSuchCompartment { index, count })
    }

    pub fn set_date(&mut self, index: usize, date: NaiveDate) -> Result<&mut Self, BuilderError> {
        self.compartment_mut(index)?.date = date;
        Ok(self)
    }

    pub fn set_start_time(&mut self, index: usize, time: NaiveTime) -> Result<&mut Self, BuilderError> {
        self.compartment_mut(index)?.start_time = time;
        Ok(self)
    }

    pub fn set_end_time(&mut self, index: usize, time: NaiveTime) -> Result<&mut Self, BuilderError> {
        self.compartment_mut(index)?.end_time = time;
        Ok(self)
    }

    pub fn set_start_pressure(&mut self, index: usize, pressure: Option<Pressure>) -> Result<&mut Self, BuilderError> {
        self.compartment_mut(index)?.start_bar = pressure.map(|p| p.to_bar());
        Ok(self)
    }

    pub fn set_end_pressure(&mut self, index: usize, pressure: Option<Pressure>) -> Result<&mut Self, BuilderError> {
        self.compartment_mut(index)?.end_bar = pressure.map(|p| p.to_bar());
        Ok(self)
    }

    pub fn set_result(&mut self, index: usize, result: TestResult) -> Result<&mut Self, BuilderError> {
        self.compartment_mut(index)?.result = result;
        Ok(self)
    }

    pub fn set_remarks(&mut self, index: usize, remarks: impl Into<String>) -> Result<&mut Self, BuilderError> {
        self.compartment_mut(index)?.remarks = remarks.into();
        Ok(self)
    }

    pub fn set_photo(&mut self, index: usize, slot: Slot, photo: Photo) -> Result<&mut Self, BuilderError> {
        *self.compartment_mut(index)?.photos.slot_mut(slot) = Some(photo);
        Ok(self)
    }

    pub fn clear_photo(&mut self, index: usize, slot: Slot) -> Result<&mut Self, BuilderError> {
        *self.compartment_mut(index)?.photos.slot_mut(slot) = None;
        Ok(self)
    }

    // --- Signature ---

    pub fn set_signer_name(&mut self, value: impl Into<String>) -> &mut Self {
        self.signature.name = value.into();
        self
    }

    pub fn set_signer_company(&mut self, value: impl Into<String>) -> &mut Self {
        self.signature.company = value.into();
        self
    }

    pub fn set_signing_date(&mut self, date: Option<NaiveDate>) -> &mut Self {
        self.signature.date = date;
        self
    }

    pub fn set_signature_image(&mut self, image: Option<RasterImage>) -> &mut Self {
        self.signature.image = image;
        self
    }

    // --- Assembly ---

    pub fn validate(&self, profile: &ReportProfile) -> ValidationResult {
        Validator::new().validate(self, profile)
    }

    /// Validate, then freeze into a record. Fails closed.
    pub fn assemble(&self, profile: &ReportProfile) -> Result<ReportRecord, AssemblyError> {
        let validation = self.validate(profile);
        if !validation.valid {
            return Err(AssemblyError::Incomplete(validation));
        }
        self.freeze(profile)
            .ok_or(AssemblyError::Incomplete(validation))
    }

    fn freeze(&self, profile: &ReportProfile) -> Option<ReportRecord> {
        let meta = ProjectMeta {
            project_name: self.meta.project_name.trim().to_string(),
            manufacturer: self.meta.manufacturer.trim().to_string(),
            work_order: self.meta.work_order.trim().to_string(),
            drawing: self.meta.drawing.trim().to_string(),
            revision: self.meta.revision.trim().to_string(),
            part_line: self.meta.part_line.trim().to_string(),
        };

        let instrument = if profile.instrument_tracking {
            Some(Instrument {
                id: self.requirements.instrument_id.trim().to_string(),
                calibration_date: self.requirements.calibration_date?,
            })
        } else {
            None
        };
        let requirements = Requirements {
            test_pressure: self.requirements.test_pressure?,
            notes: self.requirements.notes.clone(),
            instrument,
        };

        let timing = match profile.timing {
            TimingMode::Global => Some(GlobalTiming {
                start: self.timing.start?,
                end: self.timing.end?,
            }),
            TimingMode::PerCompartment => None,
        };

        let compartments = self
            .compartments
            .iter()
            .map(|c| {
                Some(CompartmentRecord {
                    date: c.date,
                    start_time: c.start_time,
                    end_time: c.end_time,
                    start_bar: c.start_bar?,
                    end_bar: c.end_bar?,
                    result: c.result,
                    remarks: c.remarks.clone(),
                    photos: c.photos.clone(),
                })
            })
            .collect::<Option<Vec<_>>>()?;

        let signature = SignatureRecord {
            name: self.signature.name.trim().to_string(),
            company: self.signature.company.trim().to_string(),
            date: self.signature.date?,
            image: self.signature.image.clone()?,
        };

        Some(ReportRecord::new(meta, requirements, timing, compartments, signature))
    }
}
