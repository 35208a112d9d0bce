use serde::{Deserialize, Serialize};

/// A voice as advertised by a synthesis engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Voice {
    pub name: String,
    /// BCP 47 tag, e.g. `en-GB`.
    pub language: String,
    /// Whether the engine flags this voice as its default.
    #[serde(default)]
    pub default: bool,
}

impl Voice {
    pub fn new(name: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            language: language.into(),
            default: false,
        }
    }

    pub fn as_default(mut self) -> Self {
        self.default = true;
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SpeechRequest {
    pub text: String,
    pub language: String,
    /// `None` leaves the choice to the engine.
    pub voice: Option<Voice>,
}

/// What an engine reports back while speaking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineEvent {
    UtteranceStarted,
    /// Char offset reached inside the current utterance.
    ProgressReported(usize),
    UtteranceCompleted,
    VoicesChanged,
}

/// A process-wide speech synthesizer.
///
/// Engines never block: `speak` queues the request and returns, progress is
/// reported later as [`EngineEvent`]s. After `cancel` no further events may
/// be delivered for the cancelled utterance.
pub trait SpeechEngine {
    fn speak(&mut self, request: SpeechRequest);
    fn cancel(&mut self);
    fn pause(&mut self);
    fn resume(&mut self);
    fn voices(&self) -> Vec<Voice>;

    /// Hosts without synthesis support report `false`; nothing gets built
    /// on top of them.
    fn is_available(&self) -> bool {
        true
    }
}
