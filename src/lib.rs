//! PressTest Core - Pressure Test Certificate Engine
//!
//! # The Rules (Non-Negotiable)
//! 1. Validation Runs First (no partial or draft PDF, ever)
//! 2. One Record, One Render (no state survives a call)
//! 3. Deterministic Output (same record, same bytes)
//! 4. One Document Language
//! 5. Profiles Select Variants, Code Does Not Fork

pub mod units;
pub mod timing;
pub mod locale;
pub mod profile;
pub mod print;
pub mod media;
pub mod record;
pub mod validation;
pub mod builder;
pub mod hashing;
pub mod render;
pub mod pipeline;
pub mod config;
pub mod draft;

pub use units::{bar_to_psi, psi_to_bar, Pressure, PressureUnit, PSI_PER_BAR};
pub use timing::{fmt_duration, DecayRate};
pub use locale::{Language, Strings};
pub use profile::{ProfileRegistry, ReportProfile, PhotoLayout, TimingMode, PressurePolicy};
pub use print::{PageAuthority, PageSpec};
pub use media::{Clock, FixedClock, Photo, RasterImage, SystemClock, TimestampSource};
pub use record::{ReportRecord, Slot, TestResult};
pub use validation::{Section, ValidationResult, Validator};
pub use builder::{AssemblyError, BuilderError, ReportBuilder};
pub use hashing::{canonical_json, compute_record_hash, sha256_hex};
pub use render::{render_report, RenderError, RenderOptions};
pub use pipeline::{suggested_filename, GeneratedReport, PipelineError, ReportPipeline};
pub use config::GeneratorConfig;
pub use draft::ReportDraft;

pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");
