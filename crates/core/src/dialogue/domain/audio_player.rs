use crossbeam_channel::Sender;

use super::cue::Cue;

/// Events delivered to the dialogue from outside the frame loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogueEvent {
    /// `request` identifies which play request finished, so a late
    /// completion from a replaced cue cannot be mistaken for the current one.
    PlaybackComplete { cue: Cue, request: u64 },
}

/// One-shot handle a player uses to report that a cue finished.
///
/// Completion is posted to the session's event queue rather than acted on
/// in the player's own thread, so every dialogue transition happens on the
/// single consumer side.
#[derive(Debug)]
pub struct CompletionNotifier {
    cue: Cue,
    request: u64,
    tx: Sender<DialogueEvent>,
}

impl CompletionNotifier {
    pub fn new(cue: Cue, request: u64, tx: Sender<DialogueEvent>) -> Self {
        Self { cue, request, tx }
    }

    pub fn cue(&self) -> Cue {
        self.cue
    }

    pub fn request(&self) -> u64 {
        self.request
    }

    /// Posts the completion. A closed queue means the session is gone, so
    /// the notification is simply dropped.
    pub fn notify(self) {
        let _ = self.tx.send(DialogueEvent::PlaybackComplete {
            cue: self.cue,
            request: self.request,
        });
    }
}

/// Domain interface for cue playback.
pub trait AudioPlayer: Send {
    /// Starts playing `cue`, replacing anything already playing. The player
    /// must call `on_complete.notify()` once the cue finishes.
    fn play(
        &mut self,
        cue: Cue,
        on_complete: CompletionNotifier,
    ) -> Result<(), Box<dyn std::error::Error>>;

    fn is_playing(&self) -> bool;

    /// Stops and releases the current cue, if any. Safe to call repeatedly.
    fn stop(&mut self);
}
