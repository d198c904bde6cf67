//! Page Authority System
//!
//! Defines where page geometry comes from so the renderer never guesses.

use serde::{Deserialize, Serialize};

/// Widest fixed table on the certificate (label column plus value columns).
pub const TABLE_WIDTH_PT: f32 = 520.0;

/// PageAuthority records which layer fixed the page geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageAuthority {
    /// System defaults (A4, 30 pt margins)
    System,
    /// Operator configuration file (validated)
    Config,
}

impl Default for PageAuthority {
    fn default() -> Self {
        Self::System
    }
}

/// Page geometry in PDF points
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageSpec {
    #[serde(default)]
    pub authority: PageAuthority,
    pub width_pt: f32,
    pub height_pt: f32,
    pub margin_pt: f32,
}

impl Default for PageSpec {
    fn default() -> Self {
        Self {
            authority: PageAuthority::System,
            width_pt: 595.2756,
            height_pt: 841.8898,
            margin_pt: 30.0,
        }
    }
}

impl PageSpec {
    /// Create from configuration with validation
    pub fn from_config(width_pt: f32, height_pt: f32, margin_pt: f32) -> Result<Self, &'static str> {
        if !(144.0..=2000.0).contains(&width_pt) || !(144.0..=2000.0).contains(&height_pt) {
            return Err("Page size must be between 144 and 2000 pt");
        }
        if !(0.0..=144.0).contains(&margin_pt) {
            return Err("Margin must be between 0 and 144 pt");
        }
        if width_pt - 2.0 * margin_pt < TABLE_WIDTH_PT + 20.0 {
            return Err("Frame is too narrow for the certificate tables");
        }
        Ok(Self {
            authority: PageAuthority::Config,
            width_pt,
            height_pt,
            margin_pt,
        })
    }

    pub fn frame_left(&self) -> f32 {
        self.margin_pt
    }

    pub fn frame_top(&self) -> f32 {
        self.height_pt - self.margin_pt
    }

    pub fn frame_bottom(&self) -> f32 {
        self.margin_pt
    }

    pub fn frame_width(&self) -> f32 {
        self.width_pt - 2.0 * self.margin_pt
    }

    pub fn frame_height(&self) -> f32 {
        self.height_pt - 2.0 * self.margin_pt
    }
}
