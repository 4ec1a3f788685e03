use thiserror::Error;

use crate::gesture::domain::axis_oscillation_counter::AxisOscillationCounter;
use crate::gesture::domain::face_detector::FaceDetector;
use crate::gesture::domain::feature_selector::FeatureSelector;
use crate::gesture::domain::feature_tracker::FeatureTracker;
use crate::gesture::domain::gesture_event::GestureEvent;
use crate::gesture::domain::track_state::TrackState;
use crate::shared::frame::Frame;
use crate::shared::gesture_config::{ConfigError, GestureConfig};
use crate::shared::point::{centroid, Point};

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("face detection failed on frame {frame}: {source}")]
    Detection {
        frame: usize,
        #[source]
        source: Box<dyn std::error::Error>,
    },
    #[error("feature selection failed on frame {frame}: {source}")]
    Selection {
        frame: usize,
        #[source]
        source: Box<dyn std::error::Error>,
    },
    #[error("feature tracking failed on frame {frame}: {source}")]
    Tracking {
        frame: usize,
        #[source]
        source: Box<dyn std::error::Error>,
    },
    #[error("tracker returned {got} results for {expected} points on frame {frame}")]
    MalformedTrack {
        frame: usize,
        expected: usize,
        got: usize,
    },
    #[error("frame size {width}x{height} is empty")]
    EmptyFrame { width: u32, height: u32 },
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// What the collaborators reported for one frame, before any state changes.
enum Observation {
    Detected(Vec<Point>),
    Tracked(Vec<Point>),
    /// No face, and nothing to track from.
    Idle,
}

/// Per-frame use case: turns detector/selector/tracker output into nod and
/// shake gestures.
///
/// When a face is visible its region is re-acquired every frame, keeping
/// the feature points anchored to the face. When detection misses, the
/// previous frame's points are carried forward by the tracker until too
/// few reliable points remain.
pub struct GesturePipeline {
    detector: Box<dyn FaceDetector>,
    selector: Box<dyn FeatureSelector>,
    tracker: Box<dyn FeatureTracker>,
    config: GestureConfig,
    state: TrackState,
    /// Horizontal motion of the feature centroid.
    shake: AxisOscillationCounter,
    /// Vertical motion of the feature centroid.
    nod: AxisOscillationCounter,
    previous_frame: Option<Frame>,
}

impl GesturePipeline {
    /// Gesture distance thresholds scale with the smaller side of the
    /// camera frame, so both sides must be non-zero.
    pub fn new(
        detector: Box<dyn FaceDetector>,
        selector: Box<dyn FeatureSelector>,
        tracker: Box<dyn FeatureTracker>,
        frame_width: u32,
        frame_height: u32,
        config: GestureConfig,
    ) -> Result<Self, PipelineError> {
        if frame_width == 0 || frame_height == 0 {
            return Err(PipelineError::EmptyFrame {
                width: frame_width,
                height: frame_height,
            });
        }
        config.validate()?;

        let smaller_side = frame_width.min(frame_height) as f64;
        let shake = AxisOscillationCounter::new(smaller_side * config.shake_dist_proportional);
        let nod = AxisOscillationCounter::new(smaller_side * config.nod_dist_proportional);
        Ok(Self {
            detector,
            selector,
            tracker,
            state: TrackState::new(config.min_features),
            config,
            shake,
            nod,
            previous_frame: None,
        })
    }

    /// Processes one frame and reports the gesture it completed, if any.
    ///
    /// On a collaborator error nothing is changed: the track state,
    /// gesture counters and the previous frame all stay as they were.
    pub fn process_frame(&mut self, frame: Frame) -> Result<GestureEvent, PipelineError> {
        let observation = self.observe(&frame)?;
        let was_tracking = self.state.is_tracking();

        let event = match observation {
            Observation::Detected(points) => match self.state.replace(points) {
                Some(center) if was_tracking => self.update_gestures(center),
                Some(center) => {
                    log::debug!(
                        "Frame {}: face acquired with {} points",
                        frame.index(),
                        self.state.points().len()
                    );
                    self.start_gestures(center);
                    GestureEvent::None
                }
                None => {
                    log::debug!("Frame {}: too few features on detected face", frame.index());
                    GestureEvent::None
                }
            },
            Observation::Tracked(points) => match self.state.replace(points) {
                Some(center) => self.update_gestures(center),
                None => {
                    log::debug!("Frame {}: tracking lost", frame.index());
                    GestureEvent::None
                }
            },
            Observation::Idle => GestureEvent::None,
        };

        self.previous_frame = Some(frame);
        Ok(event)
    }

    /// Clears gesture counts without re-baselining, e.g. when the session
    /// pauses.
    pub fn reset_gestures(&mut self) {
        self.shake.reset_counts();
        self.nod.reset_counts();
    }

    /// Drops the tracking episode and the stored previous frame.
    pub fn reset(&mut self) {
        self.state.lose();
        self.reset_gestures();
        self.previous_frame = None;
    }

    pub fn state(&self) -> &TrackState {
        &self.state
    }

    pub fn shake_counter(&self) -> &AxisOscillationCounter {
        &self.shake
    }

    pub fn nod_counter(&self) -> &AxisOscillationCounter {
        &self.nod
    }

    /// Mean feature position of the current tracking episode, if any.
    pub fn tracked_center(&self) -> Option<Point> {
        centroid(self.state.points())
    }

    fn observe(&mut self, frame: &Frame) -> Result<Observation, PipelineError> {
        let index = frame.index();
        let face = self
            .detector
            .detect(frame)
            .map_err(|source| PipelineError::Detection {
                frame: index,
                source,
            })?;

        if let Some(face) = face {
            let Some(mask) = face.inset(self.config.mask_padding) else {
                return Ok(Observation::Detected(Vec::new()));
            };
            let points = self
                .selector
                .select(
                    frame,
                    &mask,
                    self.config.max_features,
                    self.config.min_feature_quality,
                    self.config.min_feature_distance,
                )
                .map_err(|source| PipelineError::Selection {
                    frame: index,
                    source,
                })?;
            return Ok(Observation::Detected(points));
        }

        let prev_frame = match &self.previous_frame {
            Some(prev) if self.state.is_tracking() => prev,
            _ => return Ok(Observation::Idle),
        };
        let prev_points = self.state.points();
        let result = self
            .tracker
            .track(prev_frame, frame, prev_points)
            .map_err(|source| PipelineError::Tracking {
                frame: index,
                source,
            })?;
        if !result.is_parallel_to(prev_points.len()) {
            return Err(PipelineError::MalformedTrack {
                frame: index,
                expected: prev_points.len(),
                got: result
                    .points
                    .len()
                    .min(result.statuses.len())
                    .min(result.errors.len()),
            });
        }
        Ok(Observation::Tracked(
            result.reliable_points(self.config.max_feature_error),
        ))
    }

    fn start_gestures(&mut self, center: Point) {
        self.shake.start(center.x);
        self.nod.start(center.y);
    }

    fn update_gestures(&mut self, center: Point) -> GestureEvent {
        self.shake.update(center.x);
        self.nod.update(center.y);

        let min_count = self.config.min_back_and_forth_count;
        let shaking = self.shake.oscillation_count() >= min_count;
        let nodding = self.nod.oscillation_count() >= min_count;
        let event = GestureEvent::from_axes(shaking, nodding);
        if event != GestureEvent::None {
            log::debug!("Gesture detected: {event}");
            self.reset_gestures();
        }
        event
    }
}
