use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::gesture::domain::face_detector::FaceDetector;
use crate::gesture::domain::feature_selector::FeatureSelector;
use crate::gesture::domain::feature_tracker::{FeatureTracker, TrackResult};
use crate::shared::frame::Frame;
use crate::shared::point::Point;
use crate::shared::region::Region;

#[derive(Error, Debug)]
pub enum TraceError {
    #[error("failed to read trace {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed trace: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("trace frame size {width}x{height} is empty")]
    EmptyFrame { width: u32, height: u32 },
}

/// Recorded collaborator output for one frame.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TraceFrame {
    pub face: Option<Region>,
    /// Candidate features found on the face, strongest first.
    pub features: Vec<Point>,
    /// Optical-flow result when no face was detected.
    pub tracked: Option<TrackResult>,
}

/// A recorded camera session: detection and tracking results per frame,
/// without the pixels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trace {
    pub width: u32,
    pub height: u32,
    pub frames: Vec<TraceFrame>,
}

impl Trace {
    pub fn load(path: &Path) -> Result<Self, TraceError> {
        let json = fs::read_to_string(path).map_err(|source| TraceError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    pub fn from_json(json: &str) -> Result<Self, TraceError> {
        let trace: Trace = serde_json::from_str(json)?;
        if trace.width == 0 || trace.height == 0 {
            return Err(TraceError::EmptyFrame {
                width: trace.width,
                height: trace.height,
            });
        }
        Ok(trace)
    }

    /// Blank stand-in frames, one per recorded frame.
    pub fn blank_frames(&self) -> impl Iterator<Item = Frame> + '_ {
        (0..self.frames.len()).map(|i| Frame::blank(self.width, self.height, i))
    }
}

/// Plays a [`Trace`] back through the detector, selector and tracker
/// interfaces, keyed by frame index.
#[derive(Clone)]
pub struct TraceReplay {
    trace: Arc<Trace>,
}

impl TraceReplay {
    pub fn new(trace: Trace) -> Self {
        Self {
            trace: Arc::new(trace),
        }
    }

    fn frame(&self, frame: &Frame) -> Option<&TraceFrame> {
        self.trace.frames.get(frame.index())
    }
}

impl FaceDetector for TraceReplay {
    fn detect(&mut self, frame: &Frame) -> Result<Option<Region>, Box<dyn std::error::Error>> {
        Ok(self.frame(frame).and_then(|f| f.face))
    }
}

impl FeatureSelector for TraceReplay {
    fn select(
        &mut self,
        frame: &Frame,
        region: &Region,
        max_count: usize,
        _min_quality: f64,
        _min_spacing: f64,
    ) -> Result<Vec<Point>, Box<dyn std::error::Error>> {
        let Some(recorded) = self.frame(frame) else {
            return Ok(Vec::new());
        };
        Ok(recorded
            .features
            .iter()
            .copied()
            .filter(|&p| region.contains(p))
            .take(max_count)
            .collect())
    }
}

impl FeatureTracker for TraceReplay {
    /// Frames without a recorded flow result report every point as lost.
    fn track(
        &mut self,
        _prev_frame: &Frame,
        frame: &Frame,
        prev_points: &[Point],
    ) -> Result<TrackResult, Box<dyn std::error::Error>> {
        match self.frame(frame).and_then(|f| f.tracked.clone()) {
            Some(result) => Ok(result),
            None => Ok(TrackResult {
                points: prev_points.to_vec(),
                statuses: vec![false; prev_points.len()],
                errors: vec![0.0; prev_points.len()],
            }),
        }
    }
}
