use serde::{Deserialize, Serialize};

use super::point::Point;

/// An axis-aligned rectangle in frame coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Region {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn smaller_side(&self) -> f64 {
        self.width.min(self.height)
    }

    /// Shrinks the rectangle by `proportion` of its smaller side on every
    /// edge, dropping the band where background tends to show through.
    ///
    /// Returns `None` when the padding would consume the whole rectangle.
    pub fn inset(&self, proportion: f64) -> Option<Region> {
        let padding = self.smaller_side() * proportion;
        let width = self.width - 2.0 * padding;
        let height = self.height - 2.0 * padding;
        if width <= 0.0 || height <= 0.0 {
            return None;
        }
        Some(Region {
            x: self.x + padding,
            y: self.y + padding,
            width,
            height,
        })
    }

    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x < self.x + self.width && p.y >= self.y && p.y < self.y + self.height
    }
}
