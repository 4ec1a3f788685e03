use crate::shared::frame::Frame;
use crate::shared::region::Region;

/// Domain interface for locating the subject's face.
///
/// Only one subject is tracked, so at most one rectangle is returned.
/// Implementations may be stateful, hence `&mut self`.
pub trait FaceDetector: Send {
    fn detect(&mut self, frame: &Frame) -> Result<Option<Region>, Box<dyn std::error::Error>>;
}
