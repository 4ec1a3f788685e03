use ndarray::{Array2, Axis};
use serde::{Deserialize, Serialize};

/// A 2-D feature location in frame coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Mean position of a point set, or `None` for an empty set.
pub fn centroid(points: &[Point]) -> Option<Point> {
    let flat: Vec<f64> = points.iter().flat_map(|p| [p.x, p.y]).collect();
    let coords = Array2::from_shape_vec((points.len(), 2), flat).ok()?;
    let mean = coords.mean_axis(Axis(0))?;
    Some(Point::new(mean[0], mean[1]))
}
