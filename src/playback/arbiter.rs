use crate::playback::engine::{EngineEvent, SpeechEngine, SpeechRequest};
use crate::playback::tracker::{EngineCommand, PlaybackPhase, PlaybackTracker};
use crate::playback::voice::VoiceResolver;
use crate::segmentation::Utterance;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PlayerId(usize);

/// Owner of the shared speech engine.
///
/// Every widget registers its utterances here and gets a [`PlayerId`] back.
/// At most one player holds the engine at a time: starting a player stops
/// whoever was speaking before. Engine events are routed to the holder.
pub struct PlaybackArbiter {
    engine: Box<dyn SpeechEngine>,
    voices: VoiceResolver,
    players: Vec<PlaybackTracker>,
    active: Option<PlayerId>,
}

impl PlaybackArbiter {
    pub fn new(engine: Box<dyn SpeechEngine>) -> Self {
        Self {
            engine,
            voices: VoiceResolver::new(),
            players: Vec::new(),
            active: None,
        }
    }

    pub fn register(&mut self, utterances: Vec<Utterance>) -> PlayerId {
        let id = PlayerId(self.players.len());
        self.players.push(PlaybackTracker::new(utterances));
        id
    }

    pub fn tracker(&self, id: PlayerId) -> &PlaybackTracker {
        &self.players[id.0]
    }

    pub fn active(&self) -> Option<PlayerId> {
        self.active
    }

    pub fn play(&mut self, id: PlayerId) {
        if let Some(previous) = self.active.filter(|&previous| previous != id) {
            log::info!("Player {previous:?} interrupted by {id:?}");
            let commands = self.players[previous.0].stop();
            self.execute(previous, commands);
            self.active = None;
        }

        let commands = self.players[id.0].start();
        if self.players[id.0].phase() != PlaybackPhase::Idle {
            self.active = Some(id);
        }
        self.execute(id, commands);
    }

    pub fn pause(&mut self, id: PlayerId) {
        let commands = self.players[id.0].toggle_pause();
        self.execute(id, commands);
    }

    pub fn stop(&mut self, id: PlayerId) {
        let commands = self.players[id.0].stop();
        self.execute(id, commands);
        if self.active == Some(id) {
            self.active = None;
        }
    }

    /// Feeds an engine event to whichever player holds the engine.
    pub fn dispatch(&mut self, event: EngineEvent) {
        if event == EngineEvent::VoicesChanged {
            self.voices.invalidate();
        }
        let Some(id) = self.active else {
            log::trace!("Dropping {event:?}, no active player");
            return;
        };

        let commands = self.players[id.0].handle_event(event);
        self.execute(id, commands);
        if self.players[id.0].phase() == PlaybackPhase::Idle {
            self.active = None;
        }
    }

    fn execute(&mut self, id: PlayerId, commands: Vec<EngineCommand>) {
        for command in commands {
            match command {
                EngineCommand::Speak(index) => {
                    let utterance = &self.players[id.0].utterances()[index];
                    let voice = self.voices.resolve(&utterance.language, self.engine.as_ref());
                    let request = SpeechRequest {
                        text: utterance.text.clone(),
                        language: utterance.language.clone(),
                        voice,
                    };
                    log::debug!(
                        "Speaking utterance {index} ({}, {} chars)",
                        request.language,
                        utterance.length
                    );
                    self.engine.speak(request);
                }
                EngineCommand::Cancel => self.engine.cancel(),
                EngineCommand::Pause => self.engine.pause(),
                EngineCommand::Resume => self.engine.resume(),
            }
        }
    }
}
