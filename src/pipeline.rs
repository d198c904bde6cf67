//! Report Pipeline - Single Entry Point
//!
//! CRITICAL: generate MUST validate first. No bypass, no partial PDF.

use chrono::NaiveDate;
use serde::Serialize;
use thiserror::Error;

use crate::builder::{AssemblyError, ReportBuilder};
use crate::hashing::{compute_record_hash, sha256_hex};
use crate::media::RasterImage;
use crate::print::PageSpec;
use crate::profile::ReportProfile;
use crate::render::{render_report, RenderError, RenderOptions};
use crate::validation::{Section, ValidationResult};

#[cfg(feature = "test-hooks")]
use std::sync::atomic::{AtomicU32, Ordering};

#[cfg(feature = "test-hooks")]
static VALIDATION_CALL_COUNT: AtomicU32 = AtomicU32::new(0);

#[cfg(feature = "test-hooks")]
pub fn get_validation_call_count() -> u32 {
    VALIDATION_CALL_COUNT.load(Ordering::SeqCst)
}

#[cfg(feature = "test-hooks")]
pub fn reset_validation_call_count() {
    VALIDATION_CALL_COUNT.store(0, Ordering::SeqCst);
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Report incomplete: {missing:?}")]
    Incomplete {
        missing: Vec<Section>,
        validation: ValidationResult,
    },

    #[error("Rendering failed: {0}")]
    Render(#[from] RenderError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<AssemblyError> for PipelineError {
    fn from(e: AssemblyError) -> Self {
        let validation = e.validation().clone();
        PipelineError::Incomplete {
            missing: validation.missing_sections(),
            validation,
        }
    }
}

/// A rendered certificate and the digests that identify it.
#[derive(Debug, Clone, Serialize)]
pub struct GeneratedReport {
    pub filename: String,
    #[serde(skip)]
    pub pdf: Vec<u8>,
    pub pdf_sha256: String,
    pub record_hash: String,
    pub page_count: usize,
    pub compartments: usize,
}

/// `YYYY-MM-DD_<project>_Report.pdf`, whitespace in the name as underscores.
pub fn suggested_filename(date: NaiveDate, project_name: &str) -> String {
    let trimmed = project_name.trim();
    let project = if trimmed.is_empty() {
        "Project".to_string()
    } else {
        trimmed
            .chars()
            .map(|c| if c.is_whitespace() { '_' } else { c })
            .collect()
    };
    format!("{}_{}_Report.pdf", date.format("%Y-%m-%d"), project)
}

/// The report pipeline - validate, assemble, render
pub struct ReportPipeline {
    profile: ReportProfile,
    page: PageSpec,
    logo: Option<RasterImage>,
}

impl ReportPipeline {
    pub fn new(profile: ReportProfile) -> Self {
        Self {
            profile,
            page: PageSpec::default(),
            logo: None,
        }
    }

    pub fn with_page(mut self, page: PageSpec) -> Self {
        self.page = page;
        self
    }

    pub fn with_logo(mut self, logo: Option<RasterImage>) -> Self {
        self.logo = logo;
        self
    }

    pub fn profile(&self) -> &ReportProfile {
        &self.profile
    }

    /// This is the ONLY validation entry point.
    pub fn validate(&self, draft: &ReportBuilder) -> ValidationResult {
        #[cfg(feature = "test-hooks")]
        VALIDATION_CALL_COUNT.fetch_add(1, Ordering::SeqCst);

        draft.validate(&self.profile)
    }

    /// Validate, assemble and render.
    ///
    /// `today` only feeds the suggested filename; it never reaches the PDF.
    pub fn generate(&self, draft: &ReportBuilder, today: NaiveDate) -> Result<GeneratedReport, PipelineError> {
        let validation = self.validate(draft);
        if !validation.valid {
            let missing = validation.missing_sections();
            tracing::info!(?missing, "report incomplete, not rendering");
            return Err(PipelineError::Incomplete { missing, validation });
        }

        let record = draft.assemble(&self.profile)?;
        let record_hash = compute_record_hash(&record)?;

        let options = RenderOptions {
            profile: self.profile.clone(),
            page: self.page,
            logo: self.logo.clone(),
            record_hash: Some(record_hash.clone()),
        };
        let rendered = render_report(&record, &options)?;
        let pdf_sha256 = sha256_hex(&rendered.bytes);

        tracing::info!(
            profile = %self.profile.id,
            compartments = record.compartments().len(),
            pages = rendered.page_count,
            %pdf_sha256,
            "certificate generated"
        );

        Ok(GeneratedReport {
            filename: suggested_filename(today, &record.meta().project_name),
            pdf: rendered.bytes,
            pdf_sha256,
            record_hash,
            page_count: rendered.page_count,
            compartments: record.compartments().len(),
        })
    }
}

impl Default for ReportPipeline {
    fn default() -> Self {
        Self::new(ReportProfile::default())
    }
}
