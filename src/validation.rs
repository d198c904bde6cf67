//! Validation System - one rule per report section
//!
//! Rules produce structured violations.
//! The validator folds them into the list of sections that block rendering.

use serde::{Deserialize, Serialize};

use crate::builder::ReportBuilder;
use crate::locale::Strings;
use crate::profile::{ReportProfile, TimingMode};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    ProjectInfo,
    Requirements,
    Compartments,
    Signature,
}

impl Section {
    pub const ALL: [Section; 4] = [
        Section::ProjectInfo,
        Section::Requirements,
        Section::Compartments,
        Section::Signature,
    ];

    pub fn label(&self, strings: &Strings) -> String {
        match self {
            Section::ProjectInfo => strings.project_info.to_string(),
            Section::Requirements => strings.requirements.to_string(),
            Section::Compartments => format!("{} / {}", strings.equipment, strings.photos),
            Section::Signature => strings.signature.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Violation {
    pub section: Section,
    pub field: String,
    pub message: String,
}

impl Violation {
    fn new(section: Section, field: impl Into<String>, message: impl Into<String>) -> Self {
        Self { section, field: field.into(), message: message.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub valid: bool,
    pub violations: Vec<Violation>,
}

impl ValidationResult {
    pub fn success() -> Self {
        Self { valid: true, violations: vec![] }
    }

    pub fn failure(violations: Vec<Violation>) -> Self {
        Self { valid: false, violations }
    }

    /// Failing sections, each once, in document order.
    pub fn missing_sections(&self) -> Vec<Section> {
        Section::ALL
            .into_iter()
            .filter(|s| self.violations.iter().any(|v| v.section == *s))
            .collect()
    }

    pub fn missing_labels(&self, strings: &Strings) -> Vec<String> {
        self.missing_sections().iter().map(|s| s.label(strings)).collect()
    }

    /// Operator prompt naming the sections still to fill in. Empty when valid.
    pub fn prompt(&self, strings: &Strings) -> String {
        if self.valid {
            return String::new();
        }
        format!("{} {}", strings.need_all, self.missing_labels(strings).join(", "))
    }
}

/// Section rule trait - produces violations
pub trait SectionRule {
    fn section(&self) -> Section;
    fn validate(&self, draft: &ReportBuilder, profile: &ReportProfile) -> Vec<Violation>;
}

fn blank(value: &str) -> bool {
    value.trim().is_empty()
}

// --- Concrete Rules ---

pub struct MetaRule;

impl SectionRule for MetaRule {
    fn section(&self) -> Section { Section::ProjectInfo }

    fn validate(&self, draft: &ReportBuilder, _profile: &ReportProfile) -> Vec<Violation> {
        let meta = draft.meta();
        [
            ("project_name", &meta.project_name),
            ("manufacturer", &meta.manufacturer),
            ("work_order", &meta.work_order),
            ("drawing", &meta.drawing),
            ("revision", &meta.revision),
            ("part_line", &meta.part_line),
        ]
        .into_iter()
        .filter(|(_, value)| blank(value))
        .map(|(field, _)| Violation::new(self.section(), field, "Required field is empty"))
        .collect()
    }
}

pub struct RequirementsRule;

impl SectionRule for RequirementsRule {
    fn section(&self) -> Section { Section::Requirements }

    fn validate(&self, draft: &ReportBuilder, profile: &ReportProfile) -> Vec<Violation> {
        let mut violations = vec![];
        let req = draft.requirements();

        match req.test_pressure {
            None => violations.push(Violation::new(self.section(), "test_pressure", "Test pressure is missing")),
            Some(p) if !profile.pressure_policy.accepts(p.value) => violations.push(Violation::new(
                self.section(),
                "test_pressure",
                format!("Test pressure {} is not allowed by the {:?} policy", p.value, profile.pressure_policy),
            )),
            Some(_) => {}
        }

        if profile.instrument_tracking {
            if blank(&req.instrument_id) {
                violations.push(Violation::new(self.section(), "instrument_id", "Instrument ID is empty"));
            }
            if req.calibration_date.is_none() {
                violations.push(Violation::new(self.section(), "calibration_date", "Calibration date is missing"));
            }
        }

        if profile.timing == TimingMode::Global {
            let timing = draft.timing();
            if timing.start.is_none() {
                violations.push(Violation::new(self.section(), "test_start", "Test start is missing"));
            }
            if timing.end.is_none() {
                violations.push(Violation::new(self.section(), "test_end", "Test end is missing"));
            }
            if let (Some(start), Some(end)) = (timing.start, timing.end) {
                if end <= start {
                    violations.push(Violation::new(self.section(), "test_end", "Test end must be after test start"));
                }
            }
        }

        violations
    }
}

pub struct CompartmentsRule;

impl SectionRule for CompartmentsRule {
    fn section(&self) -> Section { Section::Compartments }

    fn validate(&self, draft: &ReportBuilder, profile: &ReportProfile) -> Vec<Violation> {
        let mut violations = vec![];
        let compartments = draft.compartments();
        let limit = usize::from(profile.compartment_limit());

        if compartments.is_empty() || compartments.len() > limit {
            violations.push(Violation::new(
                self.section(),
                "count",
                format!("{} compartments, expected 1 to {}", compartments.len(), limit),
            ));
        }

        for (i, c) in compartments.iter().enumerate() {
            let n = i + 1;
            for (field, value) in [("start_pressure", c.start_bar), ("end_pressure", c.end_bar)] {
                match value {
                    None => violations.push(Violation::new(
                        self.section(),
                        format!("{n}.{field}"),
                        "Pressure is missing",
                    )),
                    Some(v) if !v.is_finite() || v < 0.0 => violations.push(Violation::new(
                        self.section(),
                        format!("{n}.{field}"),
                        format!("Pressure {v} is negative or not a number"),
                    )),
                    Some(_) => {}
                }
            }
            if !c.result.is_decided() {
                violations.push(Violation::new(self.section(), format!("{n}.result"), "Result must be PASS or FAIL"));
            }
            if profile.require_photos {
                if c.photos.start.is_none() {
                    violations.push(Violation::new(self.section(), format!("{n}.start_photo"), "Start photo is missing"));
                }
                if c.photos.end.is_none() {
                    violations.push(Violation::new(self.section(), format!("{n}.end_photo"), "End photo is missing"));
                }
            }
        }

        violations
    }
}

pub struct SignatureRule;

impl SectionRule for SignatureRule {
    fn section(&self) -> Section { Section::Signature }

    fn validate(&self, draft: &ReportBuilder, _profile: &ReportProfile) -> Vec<Violation> {
        let mut violations = vec![];
        let sig = draft.signature();
        if blank(&sig.name) {
            violations.push(Violation::new(self.section(), "name", "Signer name is empty"));
        }
        if blank(&sig.company) {
            violations.push(Violation::new(self.section(), "company", "Company is empty"));
        }
        if sig.date.is_none() {
            violations.push(Violation::new(self.section(), "date", "Signing date is missing"));
        }
        // Presence only; a blank canvas still counts as signed.
        if sig.image.is_none() {
            violations.push(Violation::new(self.section(), "image", "Signature image is missing"));
        }
        violations
    }
}

/// Validator runs every section rule
pub struct Validator {
    rules: Vec<Box<dyn SectionRule>>,
}

impl Validator {
    pub fn new() -> Self {
        Self {
            rules: vec![
                Box::new(MetaRule),
                Box::new(RequirementsRule),
                Box::new(CompartmentsRule),
                Box::new(SignatureRule),
            ],
        }
    }

    pub fn validate(&self, draft: &ReportBuilder, profile: &ReportProfile) -> ValidationResult {
        let mut all_violations = vec![];

        for rule in &self.rules {
            let violations = rule.validate(draft, profile);
            if !violations.is_empty() {
                tracing::debug!(section = ?rule.section(), count = violations.len(), "section incomplete");
            }
            all_violations.extend(violations);
        }

        if all_violations.is_empty() {
            ValidationResult::success()
        } else {
            ValidationResult::failure(all_violations)
        }
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new()
    }
}
