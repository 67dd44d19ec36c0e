//! Export configuration: stock defaults, optional `redact.toml`, CLI flags.
//!
//! Three layers, later wins:
//!
//! 1. Stock defaults — the tool's historical behavior: quality 80, floor 70,
//!    step 3, size limit 4 MB.
//! 2. `redact.toml` in the input directory. Photographers batch-process the
//!    same shoot folder repeatedly; keeping its export settings next to the
//!    photos beats retyping flags.
//! 3. CLI flags for one-off overrides.
//!
//! ```toml
//! # All options are optional - defaults shown below
//! quality = 80        # First encode attempt (1-100)
//! quality_floor = 70  # Lowest quality the size search may reach
//! quality_step = 3    # Quality decrement per search step
//! limit_mb = 4.0      # Output size cap in MB; 0 disables the cap
//! ```
//!
//! Validation happens once, at startup — a bad value or a missing output
//! directory is fatal before any image is touched, never per-document.

use crate::document::ExportOptions;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const CONFIG_FILE: &str = "redact.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse {path}: {source}")]
    Toml {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("input directory does not exist: {0}")]
    InputDirMissing(PathBuf),
    #[error("output directory does not exist: {0}")]
    OutputDirMissing(PathBuf),
    #[error("quality must be between 1 and 100, got {0}")]
    InvalidQuality(u32),
    #[error("quality floor {floor} exceeds start quality {quality}")]
    FloorAboveQuality { floor: u32, quality: u32 },
    #[error("quality step must be at least 1")]
    InvalidStep,
    #[error("size limit must not be negative, got {0}")]
    InvalidLimit(f64),
}

/// Export settings as loaded from defaults + `redact.toml`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RedactConfig {
    pub quality: u32,
    pub quality_floor: u32,
    pub quality_step: u32,
    /// Output size cap in decimal megabytes. `0` disables the cap.
    pub limit_mb: f64,
}

impl Default for RedactConfig {
    fn default() -> Self {
        Self {
            quality: 80,
            quality_floor: 70,
            quality_step: 3,
            limit_mb: 4.0,
        }
    }
}

/// One-off overrides from the command line.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub quality: Option<u32>,
    pub limit_mb: Option<f64>,
    pub no_limit: bool,
}

impl RedactConfig {
    /// Load `redact.toml` from the input directory, or stock defaults if
    /// there is none.
    pub fn load(input_dir: &Path) -> Result<Self, ConfigError> {
        let path = input_dir.join(CONFIG_FILE);
        let contents = match std::fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(e.into()),
        };
        toml::from_str(&contents).map_err(|source| ConfigError::Toml { path, source })
    }

    /// Apply CLI flags on top. `--no-limit` beats `--limit`.
    pub fn merged(mut self, cli: &CliOverrides) -> Self {
        if let Some(quality) = cli.quality {
            self.quality = quality;
        }
        if let Some(limit) = cli.limit_mb {
            self.limit_mb = limit;
        }
        if cli.no_limit {
            self.limit_mb = 0.0;
        }
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for q in [self.quality, self.quality_floor] {
            if !(1..=100).contains(&q) {
                return Err(ConfigError::InvalidQuality(q));
            }
        }
        if self.quality_floor > self.quality {
            return Err(ConfigError::FloorAboveQuality {
                floor: self.quality_floor,
                quality: self.quality,
            });
        }
        if self.quality_step == 0 {
            return Err(ConfigError::InvalidStep);
        }
        if self.limit_mb < 0.0 {
            return Err(ConfigError::InvalidLimit(self.limit_mb));
        }
        Ok(())
    }

    pub fn export_options(&self) -> ExportOptions {
        ExportOptions {
            start_quality: self.quality,
            size_limit: (self.limit_mb > 0.0).then(|| (self.limit_mb * 1_000_000.0) as u64),
            quality_floor: self.quality_floor,
            quality_step: self.quality_step,
        }
    }
}

/// Startup check for the export command: both directories must exist.
pub fn check_directories(input: &Path, output: &Path) -> Result<(), ConfigError> {
    if !input.is_dir() {
        return Err(ConfigError::InputDirMissing(input.to_path_buf()));
    }
    if !output.is_dir() {
        return Err(ConfigError::OutputDirMissing(output.to_path_buf()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_historical_behavior() {
        let config = RedactConfig::default();
        assert_eq!(config.quality, 80);
        assert_eq!(config.quality_floor, 70);
        assert_eq!(config.quality_step, 3);
        assert_eq!(config.limit_mb, 4.0);
        config.validate().unwrap();
    }

    #[test]
    fn missing_config_file_yields_defaults() {
        let tmp = tempfile::TempDir::new().unwrap();
        assert_eq!(
            RedactConfig::load(tmp.path()).unwrap(),
            RedactConfig::default()
        );
    }

    #[test]
    fn loads_partial_config_file() {
        let tmp = tempfile::TempDir::new().unwrap();
        std::fs::write(tmp.path().join(CONFIG_FILE), "quality = 92\nlimit_mb = 1.5\n").unwrap();

        let config = RedactConfig::load(tmp.path()).unwrap();
        assert_eq!(config.quality, 92);
        assert_eq!(config.limit_mb, 1.5);
        assert_eq!(config.quality_floor, 70); // untouched default
    }

    #[test]
    fn unknown_key_is_a_parse_error() {
        let tmp = tempfile::TempDir::new().unwrap();
        std::fs::write(tmp.path().join(CONFIG_FILE), "qualty = 92\n").unwrap();
        assert!(matches!(
            RedactConfig::load(tmp.path()),
            Err(ConfigError::Toml { .. })
        ));
    }

    #[test]
    fn cli_overrides_win() {
        let config = RedactConfig::default().merged(&CliOverrides {
            quality: Some(90),
            limit_mb: Some(2.0),
            no_limit: false,
        });
        assert_eq!(config.quality, 90);
        assert_eq!(config.limit_mb, 2.0);
    }

    #[test]
    fn no_limit_beats_explicit_limit() {
        let config = RedactConfig::default().merged(&CliOverrides {
            quality: None,
            limit_mb: Some(2.0),
            no_limit: true,
        });
        assert_eq!(config.export_options().size_limit, None);
    }

    #[test]
    fn export_options_conversion() {
        let options = RedactConfig::default().export_options();
        assert_eq!(options.start_quality, 80);
        assert_eq!(options.size_limit, Some(4_000_000));
        assert_eq!(options.quality_floor, 70);
        assert_eq!(options.quality_step, 3);
    }

    #[test]
    fn zero_limit_disables_cap() {
        let config = RedactConfig {
            limit_mb: 0.0,
            ..Default::default()
        };
        config.validate().unwrap();
        assert_eq!(config.export_options().size_limit, None);
    }

    #[test]
    fn validation_rejects_bad_values() {
        let bad_quality = RedactConfig {
            quality: 0,
            ..Default::default()
        };
        assert!(matches!(
            bad_quality.validate(),
            Err(ConfigError::InvalidQuality(0))
        ));

        let floor_above = RedactConfig {
            quality: 60,
            quality_floor: 70,
            ..Default::default()
        };
        assert!(matches!(
            floor_above.validate(),
            Err(ConfigError::FloorAboveQuality { .. })
        ));

        let zero_step = RedactConfig {
            quality_step: 0,
            ..Default::default()
        };
        assert!(matches!(zero_step.validate(), Err(ConfigError::InvalidStep)));

        let negative_limit = RedactConfig {
            limit_mb: -1.0,
            ..Default::default()
        };
        assert!(matches!(
            negative_limit.validate(),
            Err(ConfigError::InvalidLimit(_))
        ));
    }

    #[test]
    fn check_directories_requires_both() {
        let tmp = tempfile::TempDir::new().unwrap();
        let input = tmp.path().join("in");
        let output = tmp.path().join("out");
        std::fs::create_dir(&input).unwrap();

        assert!(matches!(
            check_directories(&input, &output),
            Err(ConfigError::OutputDirMissing(_))
        ));

        std::fs::create_dir(&output).unwrap();
        check_directories(&input, &output).unwrap();

        assert!(matches!(
            check_directories(&tmp.path().join("missing"), &output),
            Err(ConfigError::InputDirMissing(_))
        ));
    }
}
