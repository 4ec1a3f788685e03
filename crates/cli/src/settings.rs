use std::path::{Path, PathBuf};

use goldgesture_core::shared::constants::{SETTINGS_DIR_NAME, SETTINGS_FILE_NAME};
use goldgesture_core::shared::gesture_config::{ConfigError, GestureConfig};

pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(SETTINGS_DIR_NAME).join(SETTINGS_FILE_NAME))
}

/// Loads the gesture configuration.
///
/// An explicit path must exist and parse. The default location is optional:
/// when it is missing the built-in defaults apply.
pub fn load(explicit: Option<&Path>) -> Result<GestureConfig, ConfigError> {
    if let Some(path) = explicit {
        return GestureConfig::load(path);
    }
    match default_config_path() {
        Some(path) if path.exists() => {
            log::info!("Loading settings from {}", path.display());
            GestureConfig::load(&path)
        }
        _ => Ok(GestureConfig::default()),
    }
}
