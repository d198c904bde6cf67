//! Report Record - the immutable snapshot handed to the renderer
//!
//! Only [`crate::builder::ReportBuilder::assemble`] constructs a record, and
//! only after every section passed validation.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::locale::Strings;
use crate::media::{Photo, RasterImage};
use crate::timing::{self, DecayRate};
use crate::units::{bar_to_psi, Pressure};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectMeta {
    pub project_name: String,
    pub manufacturer: String,
    pub work_order: String,
    pub drawing: String,
    pub revision: String,
    pub part_line: String,
}

impl ProjectMeta {
    /// Required fields in document order, with their labels.
    pub fn fields<'a>(&'a self, strings: &'static Strings) -> [(&'static str, &'a str); 6] {
        [
            (strings.project_name, self.project_name.as_str()),
            (strings.manufacturer, self.manufacturer.as_str()),
            (strings.work_order, self.work_order.as_str()),
            (strings.drawing, self.drawing.as_str()),
            (strings.revision, self.revision.as_str()),
            (strings.part_line, self.part_line.as_str()),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Instrument {
    pub id: String,
    pub calibration_date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Requirements {
    pub test_pressure: Pressure,
    pub notes: String,
    pub instrument: Option<Instrument>,
}

impl Requirements {
    pub fn test_pressure_bar(&self) -> f64 {
        self.test_pressure.to_bar()
    }
}

/// One start/end window shared by all compartments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GlobalTiming {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl GlobalTiming {
    pub fn elapsed(&self) -> Duration {
        timing::elapsed_instants(self.start, self.end)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestResult {
    /// Not yet chosen; never valid for submission.
    #[default]
    Unset,
    Pass,
    Fail,
}

impl TestResult {
    pub fn is_decided(&self) -> bool {
        !matches!(self, TestResult::Unset)
    }

    pub fn label(&self, strings: &Strings) -> &'static str {
        match self {
            TestResult::Unset => "",
            TestResult::Pass => strings.pass,
            TestResult::Fail => strings.fail,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Slot {
    Start,
    End,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PhotoSlots {
    pub start: Option<Photo>,
    pub end: Option<Photo>,
}

impl PhotoSlots {
    pub fn get(&self, slot: Slot) -> Option<&Photo> {
        match slot {
            Slot::Start => self.start.as_ref(),
            Slot::End => self.end.as_ref(),
        }
    }

    pub fn slot_mut(&mut self, slot: Slot) -> &mut Option<Photo> {
        match slot {
            Slot::Start => &mut self.start,
            Slot::End => &mut self.end,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompartmentRecord {
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub start_bar: f64,
    pub end_bar: f64,
    pub result: TestResult,
    pub remarks: String,
    pub photos: PhotoSlots,
}

impl CompartmentRecord {
    pub fn start_psi(&self) -> f64 {
        self.start_bar * crate::units::PSI_PER_BAR
    }

    pub fn end_psi(&self) -> f64 {
        self.end_bar * crate::units::PSI_PER_BAR
    }

    /// Hold time: the shared window when there is one, otherwise this
    /// compartment's own times (rolling past midnight).
    pub fn elapsed(&self, global: Option<&GlobalTiming>) -> Duration {
        match global {
            Some(window) => window.elapsed(),
            None => timing::elapsed_between(self.date, self.start_time, self.end_time),
        }
    }

    pub fn decay_rate(&self, global: Option<&GlobalTiming>) -> Option<DecayRate> {
        timing::decay_rate(self.start_bar, self.end_bar, self.elapsed(global))
    }

    /// Span between the start and end photo timestamps.
    pub fn photo_duration(&self) -> Option<Duration> {
        let start = self.photos.start.as_ref()?;
        let end = self.photos.end.as_ref()?;
        Some(end.timestamp - start.timestamp)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SignatureRecord {
    pub name: String,
    pub company: String,
    pub date: NaiveDate,
    pub image: RasterImage,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportRecord {
    meta: ProjectMeta,
    requirements: Requirements,
    timing: Option<GlobalTiming>,
    compartments: Vec<CompartmentRecord>,
    signature: SignatureRecord,
}

impl ReportRecord {
    pub(crate) fn new(
        meta: ProjectMeta,
        requirements: Requirements,
        timing: Option<GlobalTiming>,
        compartments: Vec<CompartmentRecord>,
        signature: SignatureRecord,
    ) -> Self {
        Self { meta, requirements, timing, compartments, signature }
    }

    pub fn meta(&self) -> &ProjectMeta {
        &self.meta
    }

    pub fn requirements(&self) -> &Requirements {
        &self.requirements
    }

    pub fn timing(&self) -> Option<&GlobalTiming> {
        self.timing.as_ref()
    }

    pub fn compartments(&self) -> &[CompartmentRecord] {
        &self.compartments
    }

    pub fn signature(&self) -> &SignatureRecord {
        &self.signature
    }

    pub fn decay_rates(&self) -> Vec<Option<DecayRate>> {
        self.compartments
            .iter()
            .map(|c| c.decay_rate(self.timing.as_ref()))
            .collect()
    }

    /// Test pressure in both units, `(bar, psi)`.
    pub fn test_pressure_pair(&self) -> (f64, f64) {
        let bar = self.requirements.test_pressure_bar();
        (bar, bar_to_psi(Some(bar)).unwrap_or_default())
    }
}
