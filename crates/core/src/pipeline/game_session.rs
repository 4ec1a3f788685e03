use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError};

use crate::dialogue::domain::audio_player::{AudioPlayer, DialogueEvent};
use crate::dialogue::domain::dialogue_tree::DialogueTree;
use crate::dialogue::domain::script::Script;
use crate::gesture::domain::gesture_event::GestureEvent;
use crate::shared::frame::Frame;

use super::gesture_pipeline::GesturePipeline;

/// One game: the gesture pipeline feeding the dialogue tree.
///
/// The session is the single consumer of playback completions. They are
/// queued by the player and applied here, between frames, so gesture
/// answers and completions never interleave inside a transition.
pub struct GameSession {
    pipeline: GesturePipeline,
    dialogue: DialogueTree,
    events_rx: Receiver<DialogueEvent>,
    stopped: bool,
}

impl GameSession {
    pub fn new(pipeline: GesturePipeline, script: Script, player: Box<dyn AudioPlayer>) -> Self {
        let (events_tx, events_rx) = crossbeam_channel::unbounded();
        Self {
            pipeline,
            dialogue: DialogueTree::new(script, player, events_tx),
            events_rx,
            stopped: true,
        }
    }

    /// Starts a new round. Restarting a running session first silences the
    /// current cue.
    pub fn start(&mut self) {
        self.dialogue.stop();
        self.stopped = false;
        self.discard_pending();
        self.pipeline.reset();
        if let Err(e) = self.dialogue.start() {
            log::error!("{e}");
        }
    }

    /// Stops playback and drops any pending completions and tracking state.
    /// Idempotent.
    pub fn stop(&mut self) {
        if !self.stopped {
            log::info!("Session stopped");
        }
        self.stopped = true;
        self.dialogue.stop();
        self.pipeline.reset();
        self.discard_pending();
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    /// Applies queued completions, then runs one frame through the gesture
    /// pipeline and answers the current question if a gesture completed.
    ///
    /// Collaborator failures are logged and the frame yields
    /// [`GestureEvent::None`].
    pub fn process_frame(&mut self, frame: Frame) -> GestureEvent {
        if self.stopped {
            return GestureEvent::None;
        }
        self.pump_events();

        let event = match self.pipeline.process_frame(frame) {
            Ok(event) => event,
            Err(e) => {
                log::warn!("{e}");
                GestureEvent::None
            }
        };

        let answered = match event {
            GestureEvent::Yes => self.dialogue.on_yes(),
            GestureEvent::No => self.dialogue.on_no(),
            GestureEvent::Ambiguous => {
                log::debug!("Ambiguous gesture ignored");
                Ok(())
            }
            GestureEvent::None => Ok(()),
        };
        if let Err(e) = answered {
            log::error!("{e}");
        }
        event
    }

    /// Applies every completion already queued. Returns how many were applied.
    pub fn pump_events(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(event) = self.events_rx.try_recv() {
            self.apply(event);
            applied += 1;
        }
        applied
    }

    /// Blocks up to `timeout` for the next completion and applies it.
    /// Returns `false` on timeout.
    pub fn wait_for_event(&mut self, timeout: Duration) -> bool {
        match self.events_rx.recv_timeout(timeout) {
            Ok(event) => {
                self.apply(event);
                true
            }
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => false,
        }
    }

    pub fn dialogue(&self) -> &DialogueTree {
        &self.dialogue
    }

    pub fn pipeline(&self) -> &GesturePipeline {
        &self.pipeline
    }

    fn apply(&mut self, event: DialogueEvent) {
        if self.stopped {
            return;
        }
        if let Err(e) = self.dialogue.handle_event(event) {
            log::error!("{e}");
        }
    }

    fn discard_pending(&mut self) {
        let discarded = self.events_rx.try_iter().count();
        if discarded > 0 {
            log::debug!("Discarded {discarded} pending completions");
        }
    }
}

/// Thread-safe handle to a session.
///
/// Frames are offered rather than queued: if the previous frame is still
/// being processed the new one is dropped, since a stale frame is of no
/// use. Other calls only wait for the lock. `stop` waits for any in-flight
/// frame and can be called from any thread.
#[derive(Clone)]
pub struct SessionHandle {
    inner: Arc<Mutex<GameSession>>,
    in_flight: Arc<AtomicBool>,
}

/// Clears the in-flight flag when the frame is done, even on panic.
struct InFlight<'a>(&'a AtomicBool);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl SessionHandle {
    pub fn new(session: GameSession) -> Self {
        Self {
            inner: Arc::new(Mutex::new(session)),
            in_flight: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn start(&self) {
        self.lock().start();
    }

    /// Returns `None` when the frame was dropped because another frame is
    /// in flight.
    pub fn offer_frame(&self, frame: Frame) -> Option<GestureEvent> {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            log::debug!(
                "Dropping frame {}: previous frame still in flight",
                frame.index()
            );
            return None;
        }
        let _in_flight = InFlight(&self.in_flight);
        Some(self.lock().process_frame(frame))
    }

    pub fn pump_events(&self) -> usize {
        self.lock().pump_events()
    }

    pub fn stop(&self) {
        self.lock().stop();
    }

    pub fn is_stopped(&self) -> bool {
        self.lock().is_stopped()
    }

    fn lock(&self) -> MutexGuard<'_, GameSession> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialogue::domain::audio_player::CompletionNotifier;
    use crate::dialogue::domain::cue::{Affiliation, Cue};
    use crate::dialogue::infrastructure::simulated_player::SimulatedPlayer;
    use crate::gesture::domain::face_detector::FaceDetector;
    use crate::gesture::domain::feature_selector::FeatureSelector;
    use crate::gesture::domain::feature_tracker::{FeatureTracker, TrackResult};
    use crate::shared::gesture_config::GestureConfig;
    use crate::shared::point::Point;
    use crate::shared::region::Region;

    // --- Stubs ---

    /// Reports a face every frame, with a feature cluster centred on the
    /// position scheduled for that frame index.
    struct ScheduledFace {
        centers: Vec<(f64, f64)>,
    }

    impl FaceDetector for ScheduledFace {
        fn detect(&mut self, frame: &Frame) -> Result<Option<Region>, Box<dyn std::error::Error>> {
            Ok(self
                .centers
                .get(frame.index())
                .map(|_| Region::new(0.0, 0.0, 400.0, 400.0)))
        }
    }

    impl FeatureSelector for ScheduledFace {
        fn select(
            &mut self,
            frame: &Frame,
            _region: &Region,
            _max_count: usize,
            _min_quality: f64,
            _min_spacing: f64,
        ) -> Result<Vec<Point>, Box<dyn std::error::Error>> {
            let (cx, cy) = self.centers[frame.index()];
            Ok((0..10)
                .flat_map(|i| {
                    let d = i as f64;
                    [Point::new(cx - d, cy - d), Point::new(cx + d, cy + d)]
                })
                .collect())
        }
    }

    struct NoTracking;

    impl FeatureTracker for NoTracking {
        fn track(
            &mut self,
            _prev_frame: &Frame,
            _frame: &Frame,
            _prev_points: &[Point],
        ) -> Result<TrackResult, Box<dyn std::error::Error>> {
            Ok(TrackResult::default())
        }
    }

    /// Never completes on its own; the test posts completions by hand.
    struct SilentPlayer;

    impl AudioPlayer for SilentPlayer {
        fn play(
            &mut self,
            _cue: Cue,
            _on_complete: CompletionNotifier,
        ) -> Result<(), Box<dyn std::error::Error>> {
            Ok(())
        }

        fn is_playing(&self) -> bool {
            false
        }

        fn stop(&mut self) {}
    }

    /// Reports completion of a cue as soon as it is replaced or stopped,
    /// like a device whose callback races the stop request.
    #[derive(Default)]
    struct EagerStopPlayer {
        playing: Option<CompletionNotifier>,
    }

    impl AudioPlayer for EagerStopPlayer {
        fn play(
            &mut self,
            _cue: Cue,
            on_complete: CompletionNotifier,
        ) -> Result<(), Box<dyn std::error::Error>> {
            self.stop();
            self.playing = Some(on_complete);
            Ok(())
        }

        fn is_playing(&self) -> bool {
            self.playing.is_some()
        }

        fn stop(&mut self) {
            if let Some(notifier) = self.playing.take() {
                notifier.notify();
            }
        }
    }

    // --- Helpers ---

    const SIDE: u32 = 400; // nod threshold 1.0

    fn nod_centers() -> Vec<(f64, f64)> {
        vec![
            (200.0, 200.0),
            (200.0, 203.0),
            (200.0, 197.0),
            (200.0, 203.0),
            (200.0, 197.0),
        ]
    }

    fn session(centers: Vec<(f64, f64)>, player: Box<dyn AudioPlayer>) -> GameSession {
        let pipeline = GesturePipeline::new(
            Box::new(ScheduledFace {
                centers: centers.clone(),
            }),
            Box::new(ScheduledFace { centers }),
            Box::new(NoTracking),
            SIDE,
            SIDE,
            GestureConfig::default(),
        )
        .unwrap();
        GameSession::new(pipeline, Script::standard(), player)
    }

    fn frames(session: &mut GameSession, n: usize) -> Vec<GestureEvent> {
        (0..n)
            .map(|i| session.process_frame(Frame::blank(SIDE, SIDE, i)))
            .collect()
    }

    // --- Tests ---

    #[test]
    fn test_new_session_is_stopped_until_started() {
        let mut s = session(nod_centers(), Box::new(SilentPlayer));
        assert!(s.is_stopped());
        assert_eq!(frames(&mut s, 5), vec![GestureEvent::None; 5]);
        assert_eq!(s.dialogue().last_cue(), None);
    }

    #[test]
    fn test_nod_answers_question_after_completions() {
        let mut s = session(nod_centers(), Box::new(SimulatedPlayer::new(Duration::ZERO)));
        s.start();
        // intro completes, first question is requested and completes
        assert!(s.wait_for_event(Duration::from_secs(2)));
        assert!(s.wait_for_event(Duration::from_secs(2)));
        assert_eq!(s.dialogue().last_cue(), Some(Cue::QMi6));
        assert!(!s.dialogue().is_busy());

        let events = frames(&mut s, 5);
        assert_eq!(events.last(), Some(&GestureEvent::Yes));
        assert_eq!(s.dialogue().affiliation(), Affiliation::Mi6);
        assert_eq!(s.dialogue().last_cue(), Some(Cue::QMartinis));
        s.stop();
    }

    #[test]
    fn test_gesture_during_playback_is_ignored() {
        let mut s = session(nod_centers(), Box::new(SilentPlayer));
        s.start();
        let events = frames(&mut s, 5);
        assert_eq!(events.last(), Some(&GestureEvent::Yes));
        assert_eq!(s.dialogue().last_cue(), Some(Cue::Intro));
        assert!(s.dialogue().is_busy());
    }

    #[test]
    fn test_stop_discards_pending_completions() {
        let mut s = session(vec![], Box::new(SimulatedPlayer::new(Duration::ZERO)));
        s.start();
        std::thread::sleep(Duration::from_millis(20));
        s.stop();
        s.stop();
        assert_eq!(s.pump_events(), 0);
        assert!(!s.dialogue().is_active());
    }

    #[test]
    fn test_restart_does_not_cut_new_intro_short() {
        let mut s = session(nod_centers(), Box::<EagerStopPlayer>::default());
        s.start();
        s.start();
        s.process_frame(Frame::blank(SIDE, SIDE, 0));

        assert_eq!(s.dialogue().last_cue(), Some(Cue::Intro));
        assert!(s.dialogue().is_busy());
        assert_eq!(s.pump_events(), 0);
    }

    #[test]
    fn test_stale_completion_after_restart_is_ignored() {
        let mut s = session(nod_centers(), Box::new(SilentPlayer));
        s.start();
        let first_intro = s.dialogue().current_request();
        s.start();

        s.apply(DialogueEvent::PlaybackComplete {
            cue: Cue::Intro,
            request: first_intro,
        });
        assert_eq!(s.dialogue().last_cue(), Some(Cue::Intro));
        assert!(s.dialogue().is_busy());
    }

    #[test]
    fn test_handle_drops_frame_while_in_flight() {
        let handle = SessionHandle::new(session(nod_centers(), Box::new(SilentPlayer)));
        handle.start();

        handle.in_flight.store(true, Ordering::Release);
        assert_eq!(handle.offer_frame(Frame::blank(SIDE, SIDE, 0)), None);
        handle.in_flight.store(false, Ordering::Release);

        assert_eq!(
            handle.offer_frame(Frame::blank(SIDE, SIDE, 0)),
            Some(GestureEvent::None)
        );
        assert!(!handle.in_flight.load(Ordering::Acquire));
    }

    #[test]
    fn test_handle_waits_out_short_lock_instead_of_dropping() {
        let handle = SessionHandle::new(session(nod_centers(), Box::new(SilentPlayer)));
        handle.start();

        let guard = handle.inner.lock().unwrap();
        let offered = {
            let handle = handle.clone();
            std::thread::spawn(move || handle.offer_frame(Frame::blank(SIDE, SIDE, 0)))
        };
        std::thread::sleep(Duration::from_millis(20));
        drop(guard);

        assert_eq!(offered.join().unwrap(), Some(GestureEvent::None));
    }

    #[test]
    fn test_handle_stop_from_another_thread() {
        let handle = SessionHandle::new(session(nod_centers(), Box::new(SilentPlayer)));
        handle.start();
        let remote = handle.clone();
        std::thread::spawn(move || remote.stop()).join().unwrap();
        assert!(handle.is_stopped());
        assert_eq!(
            handle.offer_frame(Frame::blank(SIDE, SIDE, 0)),
            Some(GestureEvent::None)
        );
    }
}
