use std::thread::JoinHandle;
use std::time::Duration;

use crossbeam_channel::{RecvTimeoutError, Sender};

use crate::dialogue::domain::audio_player::{AudioPlayer, CompletionNotifier};
use crate::dialogue::domain::cue::Cue;

struct Playback {
    cue: Cue,
    /// Dropping the sender cancels the playback.
    cancel: Sender<()>,
    handle: JoinHandle<()>,
}

/// Stands in for an audio device: each cue "plays" for a fixed duration on
/// a worker thread, then reports completion.
///
/// Used by the CLI and by tests; stopping a cue cancels its completion.
pub struct SimulatedPlayer {
    cue_duration: Duration,
    current: Option<Playback>,
}

impl SimulatedPlayer {
    pub fn new(cue_duration: Duration) -> Self {
        Self {
            cue_duration,
            current: None,
        }
    }

    pub fn current_cue(&self) -> Option<Cue> {
        self.current
            .as_ref()
            .filter(|p| !p.handle.is_finished())
            .map(|p| p.cue)
    }
}

impl AudioPlayer for SimulatedPlayer {
    fn play(
        &mut self,
        cue: Cue,
        on_complete: CompletionNotifier,
    ) -> Result<(), Box<dyn std::error::Error>> {
        self.stop();

        let (cancel, cancelled) = crossbeam_channel::bounded::<()>(0);
        let duration = self.cue_duration;
        let handle = std::thread::Builder::new()
            .name(format!("cue-{cue}"))
            .spawn(move || match cancelled.recv_timeout(duration) {
                Err(RecvTimeoutError::Timeout) => {
                    log::debug!("Finished {cue}");
                    on_complete.notify();
                }
                _ => log::debug!("Cancelled {cue}"),
            })?;

        self.current = Some(Playback {
            cue,
            cancel,
            handle,
        });
        Ok(())
    }

    fn is_playing(&self) -> bool {
        self.current_cue().is_some()
    }

    fn stop(&mut self) {
        if let Some(Playback { cancel, handle, .. }) = self.current.take() {
            drop(cancel);
            if handle.join().is_err() {
                log::warn!("Playback thread panicked");
            }
        }
    }
}

impl Drop for SimulatedPlayer {
    fn drop(&mut self) {
        self.stop();
    }
}
