use serde::{Deserialize, Serialize};

use crate::shared::frame::Frame;
use crate::shared::point::Point;

/// Per-point output of frame-to-frame feature tracking.
///
/// All three sequences run parallel to the points that were tracked.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TrackResult {
    pub points: Vec<Point>,
    pub statuses: Vec<bool>,
    pub errors: Vec<f64>,
}

impl TrackResult {
    pub fn is_parallel_to(&self, len: usize) -> bool {
        self.points.len() == len && self.statuses.len() == len && self.errors.len() == len
    }

    /// Points that were found and whose error does not exceed `max_error`.
    pub fn reliable_points(&self, max_error: f64) -> Vec<Point> {
        self.points
            .iter()
            .zip(&self.statuses)
            .zip(&self.errors)
            .filter(|&((_, &found), &error)| found && error <= max_error)
            .map(|((&p, _), _)| p)
            .collect()
    }
}

/// Domain interface for propagating feature points from one frame to the
/// next (sparse optical flow).
pub trait FeatureTracker: Send {
    fn track(
        &mut self,
        prev_frame: &Frame,
        frame: &Frame,
        prev_points: &[Point],
    ) -> Result<TrackResult, Box<dyn std::error::Error>>;
}
