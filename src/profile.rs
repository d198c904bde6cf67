//! Report Profiles - one configuration instead of per-variant copies
//!
//! A profile decides which optional fields and sections a certificate
//! carries, how photos are laid out and how the hold time is measured.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

pub type ProfileId = String;

/// Hard ceiling on compartments per certificate.
pub const MAX_COMPARTMENTS: u8 = 4;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReportProfile {
    pub id: ProfileId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub instrument_tracking: bool,
    #[serde(default)]
    pub timing: TimingMode,
    #[serde(default = "default_true")]
    pub require_photos: bool,
    #[serde(default)]
    pub show_decay_rate: bool,
    #[serde(default)]
    pub photo_layout: PhotoLayout,
    #[serde(default)]
    pub pressure_policy: PressurePolicy,
    #[serde(default = "default_max_compartments")]
    pub max_compartments: u8,
}

fn default_true() -> bool { true }

fn default_max_compartments() -> u8 { MAX_COMPARTMENTS }

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum TimingMode {
    /// Each compartment's own date and start/end time drive its decay rate.
    #[default]
    PerCompartment,
    /// One start/end pair shared by every compartment.
    Global,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum PressurePolicy {
    /// Test pressure must be strictly greater than zero.
    #[default]
    Positive,
    NonNegative,
}

impl PressurePolicy {
    pub fn accepts(&self, value: f64) -> bool {
        if !value.is_finite() {
            return false;
        }
        match self {
            PressurePolicy::Positive => value > 0.0,
            PressurePolicy::NonNegative => value >= 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "mode", rename_all = "camelCase")]
pub enum PhotoLayout {
    /// Keep aspect ratio, only ever shrink to `max_width`.
    #[serde(rename_all = "camelCase")]
    ShrinkToWidth { max_width: u32 },
    /// Exact `width` x `width * aspect[1] / aspect[0]` blocks: center-crop or
    /// white letterbox.
    #[serde(rename_all = "camelCase")]
    FixedAspect { width: u32, aspect: [u32; 2] },
}

impl Default for PhotoLayout {
    fn default() -> Self {
        PhotoLayout::ShrinkToWidth { max_width: 420 }
    }
}

impl ReportProfile {
    /// Photo-driven certificate: both photos per compartment, per-compartment
    /// durations from the photo timestamps.
    pub fn standard() -> Self {
        Self {
            id: "standard".to_string(),
            name: "Standard".to_string(),
            description: "Per-compartment photos, durations from photo timestamps".to_string(),
            instrument_tracking: false,
            timing: TimingMode::PerCompartment,
            require_photos: true,
            show_decay_rate: false,
            photo_layout: PhotoLayout::default(),
            pressure_policy: PressurePolicy::Positive,
            max_compartments: MAX_COMPARTMENTS,
        }
    }

    /// Instrument registration with one overall test window, no photos.
    pub fn instrumented() -> Self {
        Self {
            id: "instrumented".to_string(),
            name: "Instrumented".to_string(),
            description: "Instrument and calibration tracking, one overall test window".to_string(),
            instrument_tracking: true,
            timing: TimingMode::Global,
            require_photos: false,
            show_decay_rate: true,
            photo_layout: PhotoLayout::default(),
            pressure_policy: PressurePolicy::Positive,
            max_compartments: MAX_COMPARTMENTS,
        }
    }

    /// Photo-driven certificate with uniform 16:9 photo blocks.
    pub fn uniform_photos() -> Self {
        Self {
            id: "uniform-photos".to_string(),
            name: "Uniform photos".to_string(),
            description: "Per-compartment photos cropped or letterboxed to 16:9".to_string(),
            instrument_tracking: false,
            timing: TimingMode::PerCompartment,
            require_photos: true,
            show_decay_rate: true,
            photo_layout: PhotoLayout::FixedAspect { width: 420, aspect: [16, 9] },
            pressure_policy: PressurePolicy::Positive,
            max_compartments: MAX_COMPARTMENTS,
        }
    }

    /// Upper bound on compartments, never above [`MAX_COMPARTMENTS`].
    pub fn compartment_limit(&self) -> u8 {
        self.max_compartments.clamp(1, MAX_COMPARTMENTS)
    }
}

impl Default for ReportProfile {
    fn default() -> Self {
        Self::standard()
    }
}

/// Profile registry - built-in presets plus JSON overrides
pub struct ProfileRegistry {
    profiles: BTreeMap<ProfileId, ReportProfile>,
}

impl ProfileRegistry {
    pub fn new() -> Self {
        Self { profiles: BTreeMap::new() }
    }

    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry.register(ReportProfile::standard());
        registry.register(ReportProfile::instrumented());
        registry.register(ReportProfile::uniform_photos());
        registry
    }

    /// Built-ins, then every `*.json` profile in `dir` (same id replaces).
    pub fn load_from_dir(dir: &Path) -> Result<Self, std::io::Error> {
        let mut registry = Self::builtin();
        if dir.exists() {
            let mut paths: Vec<_> = fs::read_dir(dir)?
                .filter_map(|entry| entry.ok().map(|e| e.path()))
                .filter(|path| path.extension().map_or(false, |e| e == "json"))
                .collect();
            paths.sort();
            for path in paths {
                let parsed = fs::read_to_string(&path)
                    .map_err(|e| e.to_string())
                    .and_then(|content| {
                        serde_json::from_str::<ReportProfile>(&content).map_err(|e| e.to_string())
                    });
                match parsed {
                    Ok(profile) => {
                        tracing::debug!(id = %profile.id, path = %path.display(), "loaded profile");
                        registry.register(profile);
                    }
                    Err(error) => {
                        tracing::warn!(path = %path.display(), %error, "skipping unreadable profile");
                    }
                }
            }
        }
        Ok(registry)
    }

    pub fn get(&self, id: &str) -> Option<&ReportProfile> {
        self.profiles.get(id)
    }

    pub fn list(&self) -> Vec<&ReportProfile> {
        self.profiles.values().collect()
    }

    pub fn register(&mut self, profile: ReportProfile) {
        self.profiles.insert(profile.id.clone(), profile);
    }
}

impl Default for ProfileRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}
