//! Pressure Units
//!
//! Pressures are held canonically in bar(g). PSI is always derived.

use serde::{Deserialize, Serialize};

/// Fixed conversion factor between the two gauge units.
pub const PSI_PER_BAR: f64 = 14.5037738;

/// Absence propagates: `None` stays `None`, it is never read as zero.
pub fn bar_to_psi(value: Option<f64>) -> Option<f64> {
    value.map(|v| v * PSI_PER_BAR)
}

pub fn psi_to_bar(value: Option<f64>) -> Option<f64> {
    value.map(|v| v / PSI_PER_BAR)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PressureUnit {
    #[default]
    Bar,
    Psi,
}

impl PressureUnit {
    pub fn label(&self) -> &'static str {
        match self {
            PressureUnit::Bar => "bar(g)",
            PressureUnit::Psi => "PSI(g)",
        }
    }

    pub fn parse(tag: &str) -> Option<Self> {
        match tag.trim().to_ascii_lowercase().as_str() {
            "bar" => Some(PressureUnit::Bar),
            "psi" => Some(PressureUnit::Psi),
            _ => None,
        }
    }
}

/// A pressure reading as entered, in whichever unit the operator chose.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pressure {
    pub value: f64,
    #[serde(default)]
    pub unit: PressureUnit,
}

impl Pressure {
    pub fn bar(value: f64) -> Self {
        Self { value, unit: PressureUnit::Bar }
    }

    pub fn psi(value: f64) -> Self {
        Self { value, unit: PressureUnit::Psi }
    }

    pub fn to_bar(&self) -> f64 {
        match self.unit {
            PressureUnit::Bar => self.value,
            PressureUnit::Psi => self.value / PSI_PER_BAR,
        }
    }

    pub fn to_psi(&self) -> f64 {
        match self.unit {
            PressureUnit::Bar => self.value * PSI_PER_BAR,
            PressureUnit::Psi => self.value,
        }
    }
}

/// Two decimals, or an empty cell for a missing value.
pub fn fmt_pressure(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:.2}", v),
        None => String::new(),
    }
}

/// Renders `bar/psi` the way the registration table shows it.
pub fn fmt_pressure_pair(bar: Option<f64>, psi: Option<f64>) -> String {
    format!("{}/{}", fmt_pressure(bar), fmt_pressure(psi))
}
