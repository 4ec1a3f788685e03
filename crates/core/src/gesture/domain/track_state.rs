use crate::shared::point::{centroid, Point};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackMode {
    /// No reliable point set; the next frame needs a detected face.
    Searching,
    /// Points from the previous frame are being propagated.
    Tracking,
}

/// The feature points of the current tracking episode.
///
/// In `Tracking` mode the point set always holds at least `min_features`
/// points; anything smaller is dropped and the state falls back to
/// `Searching`.
#[derive(Debug, Clone)]
pub struct TrackState {
    mode: TrackMode,
    points: Vec<Point>,
    min_features: usize,
}

impl TrackState {
    pub fn new(min_features: usize) -> Self {
        Self {
            mode: TrackMode::Searching,
            points: Vec::new(),
            min_features,
        }
    }

    pub fn mode(&self) -> TrackMode {
        self.mode
    }

    pub fn is_tracking(&self) -> bool {
        self.mode == TrackMode::Tracking
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Replaces the point set. Returns the new centroid while tracking, or
    /// `None` if the set was too small and tracking was lost.
    pub fn replace(&mut self, points: Vec<Point>) -> Option<Point> {
        if points.len() < self.min_features {
            self.lose();
            return None;
        }
        let center = centroid(&points)?;
        self.points = points;
        self.mode = TrackMode::Tracking;
        Some(center)
    }

    pub fn lose(&mut self) {
        self.points.clear();
        self.mode = TrackMode::Searching;
    }
}
