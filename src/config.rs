//! Generator Configuration
//!
//! Every field has a default, so an empty `{}` file is a valid config.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::locale::Language;
use crate::media::RasterImage;
use crate::print::PageSpec;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("invalid page geometry: {0}")]
    Page(&'static str),
}

/// Page geometry as written in the config file.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageConfig {
    pub width_pt: f32,
    pub height_pt: f32,
    pub margin_pt: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub profile: String,
    pub profiles_dir: PathBuf,
    /// `None` keeps the system A4 default.
    pub page: Option<PageConfig>,
    pub logo_path: PathBuf,
    pub output_dir: PathBuf,
    pub operator_language: Language,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            profile: "standard".to_string(),
            profiles_dir: PathBuf::from("profiles"),
            page: None,
            logo_path: PathBuf::from("assets/logo.png"),
            output_dir: PathBuf::from("."),
            operator_language: Language::Nl,
        }
    }
}

impl GeneratorConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.page_spec()?;
        Ok(config)
    }

    pub fn page_spec(&self) -> Result<PageSpec, ConfigError> {
        match self.page {
            Some(page) => PageSpec::from_config(page.width_pt, page.height_pt, page.margin_pt)
                .map_err(ConfigError::Page),
            None => Ok(PageSpec::default()),
        }
    }

    /// The letterhead logo, if one is present and decodable.
    pub fn load_logo(&self) -> Option<RasterImage> {
        let bytes = match fs::read(&self.logo_path) {
            Ok(bytes) => bytes,
            Err(error) => {
                tracing::debug!(path = %self.logo_path.display(), %error, "no logo, rendering without");
                return None;
            }
        };
        match RasterImage::decode(&bytes) {
            Ok(logo) => Some(logo),
            Err(error) => {
                tracing::warn!(path = %self.logo_path.display(), %error, "logo unreadable, rendering without");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::print::PageAuthority;

    #[test]
    fn test_empty_object_is_default() {
        let config: GeneratorConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, GeneratorConfig::default());
        assert_eq!(config.page_spec().unwrap(), PageSpec::default());
    }

    #[test]
    fn test_load_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("presstest.json");
        fs::write(
            &path,
            r#"{"profile": "instrumented", "operator_language": "en",
                "page": {"width_pt": 612, "height_pt": 792, "margin_pt": 36}}"#,
        )
        .unwrap();

        let config = GeneratorConfig::load(&path).unwrap();
        assert_eq!(config.profile, "instrumented");
        assert_eq!(config.operator_language, Language::En);
        assert_eq!(config.logo_path, PathBuf::from("assets/logo.png"));
        assert_eq!(config.page_spec().unwrap().authority, PageAuthority::Config);
    }

    #[test]
    fn test_rejects_narrow_page() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("presstest.json");
        fs::write(&path, r#"{"page": {"width_pt": 400, "height_pt": 600, "margin_pt": 20}}"#).unwrap();
        assert!(matches!(GeneratorConfig::load(&path), Err(ConfigError::Page(_))));
    }

    #[test]
    fn test_missing_file_is_read_error() {
        let err = GeneratorConfig::load(Path::new("/nonexistent/presstest.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn test_missing_logo_is_none() {
        let config = GeneratorConfig {
            logo_path: PathBuf::from("/nonexistent/logo.png"),
            ..GeneratorConfig::default()
        };
        assert!(config.load_logo().is_none());
    }

    #[test]
    fn test_corrupt_logo_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logo.png");
        fs::write(&path, b"not an image").unwrap();
        let config = GeneratorConfig { logo_path: path, ..GeneratorConfig::default() };
        assert!(config.load_logo().is_none());
    }
}
