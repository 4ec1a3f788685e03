use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::constants::{
    MASK_PADDING_PROPORTIONAL, MAX_FEATURES, MAX_FEATURE_ERROR, MIN_BACK_AND_FORTH_COUNT,
    MIN_FEATURES, MIN_FEATURE_DISTANCE, MIN_FEATURE_QUALITY, MIN_NOD_DIST_PROPORTIONAL,
    MIN_SHAKE_DIST_PROPORTIONAL,
};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config from {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write config to {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Tuning values for face tracking and gesture detection.
///
/// Defaults are the game's fixed constants; a settings file may override
/// any subset of fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GestureConfig {
    pub min_features: usize,
    pub max_features: usize,
    pub min_feature_quality: f64,
    pub min_feature_distance: f64,
    pub max_feature_error: f64,
    pub mask_padding: f64,
    pub min_back_and_forth_count: u32,
    pub shake_dist_proportional: f64,
    pub nod_dist_proportional: f64,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            min_features: MIN_FEATURES,
            max_features: MAX_FEATURES,
            min_feature_quality: MIN_FEATURE_QUALITY,
            min_feature_distance: MIN_FEATURE_DISTANCE,
            max_feature_error: MAX_FEATURE_ERROR,
            mask_padding: MASK_PADDING_PROPORTIONAL,
            min_back_and_forth_count: MIN_BACK_AND_FORTH_COUNT,
            shake_dist_proportional: MIN_SHAKE_DIST_PROPORTIONAL,
            nod_dist_proportional: MIN_NOD_DIST_PROPORTIONAL,
        }
    }
}

impl GestureConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_features == 0 || self.min_features > self.max_features {
            return Err(ConfigError::Invalid(format!(
                "feature bounds [{}, {}] are empty",
                self.min_features, self.max_features
            )));
        }
        if !(0.0..0.5).contains(&self.mask_padding) {
            return Err(ConfigError::Invalid(format!(
                "mask_padding must be in [0, 0.5), got {}",
                self.mask_padding
            )));
        }
        if !(0.0..=1.0).contains(&self.min_feature_quality) {
            return Err(ConfigError::Invalid(format!(
                "min_feature_quality must be in [0, 1], got {}",
                self.min_feature_quality
            )));
        }
        if !(0.0..).contains(&self.min_feature_distance) {
            return Err(ConfigError::Invalid(format!(
                "min_feature_distance must not be negative, got {}",
                self.min_feature_distance
            )));
        }
        if !(0.0..).contains(&self.max_feature_error) {
            return Err(ConfigError::Invalid(format!(
                "max_feature_error must not be negative, got {}",
                self.max_feature_error
            )));
        }
        if !(self.shake_dist_proportional > 0.0 && self.nod_dist_proportional > 0.0) {
            return Err(ConfigError::Invalid(
                "gesture distance proportions must be positive".into(),
            ));
        }
        if self.min_back_and_forth_count == 0 {
            return Err(ConfigError::Invalid(
                "min_back_and_forth_count must be at least 1".into(),
            ));
        }
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let write_err = |source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(write_err)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json).map_err(write_err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::rstest;

    #[test]
    fn test_defaults_match_constants() {
        let config = GestureConfig::default();
        assert_eq!(config.min_features, 10);
        assert_eq!(config.max_features, 80);
        assert_relative_eq!(config.max_feature_error, 200.0);
        assert_relative_eq!(config.mask_padding, 0.15);
        assert_eq!(config.min_back_and_forth_count, 2);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_file_falls_back_to_defaults() {
        let config: GestureConfig = serde_json::from_str(r#"{"max_features": 40}"#).unwrap();
        assert_eq!(config.max_features, 40);
        assert_eq!(config.min_features, MIN_FEATURES);
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.json");
        let config = GestureConfig {
            min_back_and_forth_count: 3,
            ..GestureConfig::default()
        };
        config.save(&path).unwrap();
        assert_eq!(GestureConfig::load(&path).unwrap(), config);
    }

    #[test]
    fn test_load_missing_file_is_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = GestureConfig::load(&dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn test_load_rejects_invalid_bounds() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, r#"{"min_features": 90, "max_features": 80}"#).unwrap();
        let err = GestureConfig::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_validate_rejects_full_padding() {
        let config = GestureConfig {
            mask_padding: 0.5,
            ..GestureConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_distance() {
        let config = GestureConfig {
            nod_dist_proportional: 0.0,
            ..GestureConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[rstest]
    #[case::negative_error(|c: &mut GestureConfig| c.max_feature_error = -1.0)]
    #[case::negative_quality(|c: &mut GestureConfig| c.min_feature_quality = -0.1)]
    #[case::quality_above_one(|c: &mut GestureConfig| c.min_feature_quality = 1.5)]
    #[case::negative_spacing(|c: &mut GestureConfig| c.min_feature_distance = -4.0)]
    #[case::nan_distance(|c: &mut GestureConfig| c.shake_dist_proportional = f64::NAN)]
    fn test_validate_rejects_out_of_range_tracking_values(#[case] tweak: fn(&mut GestureConfig)) {
        let mut config = GestureConfig::default();
        tweak(&mut config);
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_validate_accepts_zero_error_and_spacing() {
        let config = GestureConfig {
            max_feature_error: 0.0,
            min_feature_distance: 0.0,
            ..GestureConfig::default()
        };
        assert!(config.validate().is_ok());
    }
}
