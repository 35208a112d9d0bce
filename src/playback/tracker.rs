use crate::dom::NodeId;
use crate::parsing::sentence_splitter::sentence_at;
use crate::playback::engine::EngineEvent;
use crate::segmentation::{Utterance, total_length};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PlaybackPhase {
    Idle,
    Playing,
    Paused,
}

/// What the tracker asks of the engine. `Speak` carries an utterance index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineCommand {
    Speak(usize),
    Cancel,
    Pause,
    Resume,
}

/// Playback state of one widget.
///
/// The tracker never talks to an engine itself; every transition returns the
/// engine commands it implies and the caller carries them out. Positions are
/// char offsets into the whole reading, where neighbouring utterances are
/// separated by one char.
#[derive(Debug, Clone)]
pub struct PlaybackTracker {
    utterances: Vec<Utterance>,
    total_length: usize,
    active: bool,
    current_index: Option<usize>,
    cumulative_offset: usize,
    char_index: usize,
    paused: bool,
    deferred_advance: bool,
    progress: u8,
}

impl PlaybackTracker {
    pub fn new(utterances: Vec<Utterance>) -> Self {
        Self {
            total_length: total_length(&utterances),
            utterances,
            active: false,
            current_index: None,
            cumulative_offset: 0,
            char_index: 0,
            paused: false,
            deferred_advance: false,
            progress: 0,
        }
    }

    pub fn phase(&self) -> PlaybackPhase {
        match (self.active, self.paused) {
            (false, _) => PlaybackPhase::Idle,
            (true, false) => PlaybackPhase::Playing,
            (true, true) => PlaybackPhase::Paused,
        }
    }

    pub fn utterances(&self) -> &[Utterance] {
        &self.utterances
    }

    pub fn total_length(&self) -> usize {
        self.total_length
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current_index
    }

    pub fn current(&self) -> Option<&Utterance> {
        self.current_index.and_then(|i| self.utterances.get(i))
    }

    pub fn cumulative_offset(&self) -> usize {
        self.cumulative_offset
    }

    pub fn char_index(&self) -> usize {
        self.char_index
    }

    pub fn progress(&self) -> u8 {
        self.progress
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn has_deferred_advance(&self) -> bool {
        self.deferred_advance
    }

    /// Node currently being read.
    pub fn spoken_source(&self) -> Option<NodeId> {
        self.current()
            .and_then(|utterance| utterance.source_at(self.char_index))
    }

    /// Sentence of the current utterance containing the last reported
    /// position.
    pub fn spoken_sentence(&self) -> Option<&str> {
        self.current()
            .and_then(|utterance| sentence_at(&utterance.text, self.char_index))
    }

    /// Restarts from the first utterance. Nothing to read means nothing
    /// happens.
    pub fn start(&mut self) -> Vec<EngineCommand> {
        if self.utterances.is_empty() {
            log::debug!("Nothing to read, ignoring play request");
            return Vec::new();
        }
        self.reset();
        self.active = true;

        let mut commands = vec![EngineCommand::Cancel];
        commands.extend(self.advance());
        commands
    }

    /// Moves on to the next utterance, or finishes after the last one. While
    /// paused the advance is held back until resume and the engine is told to
    /// drop what it is doing.
    pub fn advance(&mut self) -> Vec<EngineCommand> {
        if !self.active {
            return Vec::new();
        }
        if self.paused {
            self.deferred_advance = true;
            return vec![EngineCommand::Cancel];
        }

        let next = self.current_index.map_or(0, |i| i + 1);
        if next >= self.utterances.len() {
            log::debug!("Finished reading {} utterances", self.utterances.len());
            self.reset();
            return Vec::new();
        }

        if let Some(finished) = self.current_index {
            self.cumulative_offset += self.utterances[finished].length + 1;
        }
        self.current_index = Some(next);
        self.char_index = 0;
        self.update_progress();
        vec![EngineCommand::Speak(next)]
    }

    pub fn handle_event(&mut self, event: EngineEvent) -> Vec<EngineCommand> {
        if !self.active {
            return Vec::new();
        }
        match event {
            EngineEvent::UtteranceStarted => {
                self.char_index = 0;
                Vec::new()
            }
            EngineEvent::ProgressReported(char_index) => {
                self.char_index = char_index;
                self.update_progress();
                Vec::new()
            }
            EngineEvent::UtteranceCompleted => self.advance(),
            EngineEvent::VoicesChanged => Vec::new(),
        }
    }

    pub fn toggle_pause(&mut self) -> Vec<EngineCommand> {
        if !self.active {
            return Vec::new();
        }
        if !self.paused {
            self.paused = true;
            return vec![EngineCommand::Pause];
        }

        self.paused = false;
        let mut commands = vec![EngineCommand::Resume];
        if self.deferred_advance {
            self.deferred_advance = false;
            commands.extend(self.advance());
        }
        commands
    }

    /// Back to idle. Utterances are kept so the widget can play again.
    pub fn stop(&mut self) -> Vec<EngineCommand> {
        let was_active = self.active;
        self.reset();
        if was_active {
            vec![EngineCommand::Cancel]
        } else {
            Vec::new()
        }
    }

    fn reset(&mut self) {
        self.active = false;
        self.current_index = None;
        self.cumulative_offset = 0;
        self.char_index = 0;
        self.paused = false;
        self.deferred_advance = false;
        self.progress = 0;
    }

    fn update_progress(&mut self) {
        self.progress = progress_percent(self.cumulative_offset + self.char_index, self.total_length);
    }
}

/// `round(100 * position / total)`, clamped to 100; 0 for an empty reading.
pub fn progress_percent(position: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    let percent = (100.0 * position as f64 / total as f64).round();
    percent.clamp(0.0, 100.0) as u8
}
