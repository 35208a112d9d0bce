use crate::playback::engine::{EngineEvent, SpeechEngine, SpeechRequest, Voice};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

#[derive(Debug, Default)]
struct SimulatedState {
    voices: Vec<Voice>,
    spoken: Vec<SpeechRequest>,
    pending: VecDeque<EngineEvent>,
    paused: bool,
}

/// An engine that "speaks" instantly by queueing the events a real
/// synthesizer would emit: a start, one progress report per word and a
/// completion.
///
/// Clones share state, so a host can keep a handle to pump events while the
/// arbiter owns the boxed engine.
#[derive(Debug, Clone, Default)]
pub struct SimulatedEngine {
    state: Rc<RefCell<SimulatedState>>,
}

impl SimulatedEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_voices(voices: Vec<Voice>) -> Self {
        let engine = Self::new();
        engine.state.borrow_mut().voices = voices;
        engine
    }

    /// Next event the engine would deliver, `None` while paused or idle.
    pub fn next_event(&self) -> Option<EngineEvent> {
        let mut state = self.state.borrow_mut();
        if state.paused {
            return None;
        }
        state.pending.pop_front()
    }

    pub fn spoken(&self) -> Vec<SpeechRequest> {
        self.state.borrow().spoken.clone()
    }

    pub fn is_paused(&self) -> bool {
        self.state.borrow().paused
    }
}

impl SpeechEngine for SimulatedEngine {
    fn speak(&mut self, request: SpeechRequest) {
        let mut state = self.state.borrow_mut();
        state.pending.push_back(EngineEvent::UtteranceStarted);
        state
            .pending
            .extend(word_starts(&request.text).map(EngineEvent::ProgressReported));
        state.pending.push_back(EngineEvent::UtteranceCompleted);
        state.spoken.push(request);
    }

    fn cancel(&mut self) {
        let mut state = self.state.borrow_mut();
        state.pending.clear();
        state.paused = false;
    }

    fn pause(&mut self) {
        self.state.borrow_mut().paused = true;
    }

    fn resume(&mut self) {
        self.state.borrow_mut().paused = false;
    }

    fn voices(&self) -> Vec<Voice> {
        self.state.borrow().voices.clone()
    }
}

/// Char offsets where a word begins.
fn word_starts(text: &str) -> impl Iterator<Item = usize> + '_ {
    let mut previous_is_space = true;
    text.chars().enumerate().filter_map(move |(index, c)| {
        let starts_word = previous_is_space && !c.is_whitespace();
        previous_is_space = c.is_whitespace();
        starts_word.then_some(index)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(text: &str) -> SpeechRequest {
        SpeechRequest {
            text: text.to_string(),
            language: "en".to_string(),
            voice: None,
        }
    }

    fn drain(engine: &SimulatedEngine) -> Vec<EngineEvent> {
        std::iter::from_fn(|| engine.next_event()).collect()
    }

    #[test]
    fn test_word_starts() {
        assert_eq!(word_starts("Hi  there, you.").collect::<Vec<_>>(), vec![0, 4, 11]);
        assert_eq!(word_starts("").count(), 0);
        assert_eq!(word_starts("Grüße dich").collect::<Vec<_>>(), vec![0, 6]);
    }

    #[test]
    fn test_speak_queues_events() {
        let mut engine = SimulatedEngine::new();
        engine.speak(request("Hello world."));
        assert_eq!(
            drain(&engine),
            vec![
                EngineEvent::UtteranceStarted,
                EngineEvent::ProgressReported(0),
                EngineEvent::ProgressReported(6),
                EngineEvent::UtteranceCompleted,
            ]
        );
        assert_eq!(engine.spoken().len(), 1);
    }

    #[test]
    fn test_cancel_drops_pending_events() {
        let mut engine = SimulatedEngine::new();
        engine.speak(request("Hello world."));
        assert_eq!(engine.next_event(), Some(EngineEvent::UtteranceStarted));
        engine.cancel();
        assert_eq!(engine.next_event(), None);
    }

    #[test]
    fn test_pause_holds_events_until_resume() {
        let mut engine = SimulatedEngine::new();
        engine.speak(request("Hello."));
        engine.pause();
        assert!(engine.is_paused());
        assert_eq!(engine.next_event(), None);
        engine.resume();
        assert_eq!(engine.next_event(), Some(EngineEvent::UtteranceStarted));
    }

    #[test]
    fn test_clones_share_state() {
        let handle = SimulatedEngine::with_voices(vec![Voice::new("Anna", "de-DE")]);
        let mut boxed: Box<dyn SpeechEngine> = Box::new(handle.clone());
        boxed.speak(request("Hallo."));
        assert_eq!(handle.spoken()[0].text, "Hallo.");
        assert_eq!(boxed.voices().len(), 1);
    }
}
