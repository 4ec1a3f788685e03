use crate::shared::frame::Frame;
use crate::shared::point::Point;
use crate::shared::region::Region;

/// Domain interface for picking trackable corner-like points inside a
/// region of a frame.
pub trait FeatureSelector: Send {
    /// Returns up to `max_count` points, strongest first. Points scoring
    /// below `min_quality` or closer than `min_spacing` to a stronger point
    /// are left out.
    fn select(
        &mut self,
        frame: &Frame,
        region: &Region,
        max_count: usize,
        min_quality: f64,
        min_spacing: f64,
    ) -> Result<Vec<Point>, Box<dyn std::error::Error>>;
}
