/// Fewest feature points that still count as a tracked face.
pub const MIN_FEATURES: usize = 10;
pub const MAX_FEATURES: usize = 80;

/// Tracked points with an error above this are discarded.
pub const MAX_FEATURE_ERROR: f64 = 200.0;

pub const MIN_FEATURE_QUALITY: f64 = 0.05;
pub const MIN_FEATURE_DISTANCE: f64 = 4.0;

/// Portion of the face excluded from feature selection on each side,
/// relative to the smaller side of the face rectangle.
pub const MASK_PADDING_PROPORTIONAL: f64 = 0.15;

/// Back-and-forth cycles required on one axis before a gesture is declared.
pub const MIN_BACK_AND_FORTH_COUNT: u32 = 2;

/// Gesture distance thresholds, relative to the smaller side of the frame.
pub const MIN_SHAKE_DIST_PROPORTIONAL: f64 = 0.01;
pub const MIN_NOD_DIST_PROPORTIONAL: f64 = 0.0025;

pub const SETTINGS_DIR_NAME: &str = "Goldgesture";
pub const SETTINGS_FILE_NAME: &str = "settings.json";
