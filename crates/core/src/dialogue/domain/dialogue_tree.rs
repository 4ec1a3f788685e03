use crossbeam_channel::Sender;
use thiserror::Error;

use super::audio_player::{AudioPlayer, CompletionNotifier, DialogueEvent};
use super::cue::{Affiliation, Answer, Cue};
use super::script::Script;

#[derive(Error, Debug)]
pub enum DialogueError {
    #[error("failed to play {cue}: {source}")]
    Playback {
        cue: Cue,
        #[source]
        source: Box<dyn std::error::Error>,
    },
}

/// The yes/no question game as a state machine over
/// `(affiliation, last cue)`.
///
/// While a cue is playing the tree is busy and ignores answers. Completion
/// of the introduction moves on to the first question; completion of a win
/// or lose cue starts a new round.
pub struct DialogueTree {
    script: Script,
    player: Box<dyn AudioPlayer>,
    events_tx: Sender<DialogueEvent>,
    affiliation: Affiliation,
    last_cue: Option<Cue>,
    /// Id of the most recent play request; completions must echo it.
    request: u64,
    busy: bool,
    active: bool,
}

impl DialogueTree {
    /// `events_tx` is handed to the player with every cue; completions come
    /// back through the matching receiver and must be fed to
    /// [`DialogueTree::handle_event`].
    pub fn new(
        script: Script,
        player: Box<dyn AudioPlayer>,
        events_tx: Sender<DialogueEvent>,
    ) -> Self {
        Self {
            script,
            player,
            events_tx,
            affiliation: Affiliation::Unknown,
            last_cue: None,
            request: 0,
            busy: false,
            active: false,
        }
    }

    pub fn start(&mut self) -> Result<(), DialogueError> {
        log::info!("Starting a new round");
        self.active = true;
        self.affiliation = Affiliation::Unknown;
        self.request(Cue::Intro)
    }

    /// Stops playback and deactivates the tree. Idempotent.
    pub fn stop(&mut self) {
        if self.active {
            log::info!("Stopping dialogue");
        }
        self.player.stop();
        self.active = false;
        self.busy = false;
    }

    pub fn on_yes(&mut self) -> Result<(), DialogueError> {
        self.answer(Answer::Yes)
    }

    pub fn on_no(&mut self) -> Result<(), DialogueError> {
        self.answer(Answer::No)
    }

    pub fn handle_event(&mut self, event: DialogueEvent) -> Result<(), DialogueError> {
        match event {
            DialogueEvent::PlaybackComplete { cue, request } => {
                self.on_playback_complete(cue, request)
            }
        }
    }

    /// Only the completion of the latest request clears `busy`.
    pub fn on_playback_complete(&mut self, cue: Cue, request: u64) -> Result<(), DialogueError> {
        if !self.active || !self.busy || self.request != request || self.last_cue != Some(cue) {
            log::warn!("Ignoring stale completion of {cue} (request {request})");
            return Ok(());
        }
        self.busy = false;

        if cue == Cue::Intro {
            self.request(Cue::FIRST_QUESTION)
        } else if cue.is_terminal() {
            self.start()
        } else {
            Ok(())
        }
    }

    pub fn affiliation(&self) -> Affiliation {
        self.affiliation
    }

    pub fn last_cue(&self) -> Option<Cue> {
        self.last_cue
    }

    /// Id of the most recent play request.
    pub fn current_request(&self) -> u64 {
        self.request
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    fn answer(&mut self, answer: Answer) -> Result<(), DialogueError> {
        // Do not interrupt a cue that is already playing.
        if !self.active || self.busy {
            return Ok(());
        }
        let Some(cue) = self.last_cue else {
            return Ok(());
        };

        let transition = self.script.next(self.affiliation, cue, answer);
        if let Some(affiliation) = transition.assign {
            log::info!("Affiliation determined: {affiliation}");
            self.affiliation = affiliation;
        }
        if transition.next == Cue::Lose {
            log::debug!("No script entry past ({}, {cue}, {answer:?})", self.affiliation);
        }
        self.request(transition.next)
    }

    fn request(&mut self, cue: Cue) -> Result<(), DialogueError> {
        log::info!("Playing {cue}");
        self.request += 1;
        self.last_cue = Some(cue);
        self.busy = true;
        let notifier = CompletionNotifier::new(cue, self.request, self.events_tx.clone());
        self.player.play(cue, notifier).map_err(|source| {
            self.busy = false;
            DialogueError::Playback { cue, source }
        })
    }
}

impl Drop for DialogueTree {
    fn drop(&mut self) {
        self.player.stop();
    }
}
