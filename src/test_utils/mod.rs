use crate::playback::engine::{SpeechEngine, SpeechRequest, Voice};
use std::cell::RefCell;
use std::rc::Rc;

/// What a [`MockSpeechEngine`] was asked to do, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineCall {
    Speak(String),
    Cancel,
    Pause,
    Resume,
}

#[derive(Debug, Default)]
struct MockState {
    voices: Vec<Voice>,
    calls: Vec<EngineCall>,
    spoken: Vec<SpeechRequest>,
}

/// Records every call instead of speaking. Clones share the recording, so a
/// test keeps one handle and boxes another.
#[derive(Debug, Clone)]
pub struct MockSpeechEngine {
    state: Rc<RefCell<MockState>>,
    available: bool,
}

impl Default for MockSpeechEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl MockSpeechEngine {
    pub fn new() -> Self {
        Self {
            state: Rc::new(RefCell::new(MockState::default())),
            available: true,
        }
    }

    pub fn with_voices(voices: Vec<Voice>) -> Self {
        let engine = Self::new();
        engine.state.borrow_mut().voices = voices;
        engine
    }

    /// A host without speech synthesis.
    pub fn unavailable() -> Self {
        Self {
            available: false,
            ..Self::new()
        }
    }

    pub fn set_voices(&mut self, voices: Vec<Voice>) {
        self.state.borrow_mut().voices = voices;
    }

    pub fn calls(&self) -> Vec<EngineCall> {
        self.state.borrow().calls.clone()
    }

    pub fn spoken(&self) -> Vec<SpeechRequest> {
        self.state.borrow().spoken.clone()
    }

    pub fn spoken_texts(&self) -> Vec<String> {
        self.state
            .borrow()
            .spoken
            .iter()
            .map(|request| request.text.clone())
            .collect()
    }

    pub fn clear(&self) {
        let mut state = self.state.borrow_mut();
        state.calls.clear();
        state.spoken.clear();
    }
}

impl SpeechEngine for MockSpeechEngine {
    fn speak(&mut self, request: SpeechRequest) {
        let mut state = self.state.borrow_mut();
        state.calls.push(EngineCall::Speak(request.text.clone()));
        state.spoken.push(request);
    }

    fn cancel(&mut self) {
        self.state.borrow_mut().calls.push(EngineCall::Cancel);
    }

    fn pause(&mut self) {
        self.state.borrow_mut().calls.push(EngineCall::Pause);
    }

    fn resume(&mut self) {
        self.state.borrow_mut().calls.push(EngineCall::Resume);
    }

    fn voices(&self) -> Vec<Voice> {
        self.state.borrow().voices.clone()
    }

    fn is_available(&self) -> bool {
        self.available
    }
}

/// A short bilingual article with a heading, a line break, a skipped aside
/// and a French island.
pub const SAMPLE_ARTICLE: &str = r#"<!DOCTYPE html>
<html lang="en">
<body>
  <article class="spkbl">
    <h1>Reading aloud</h1>
    <p>The widget reads this text<br>line by line.</p>
    <aside data-spkbl-skip>Not read.</aside>
    <p>She said <span lang="fr">bonjour tout le monde</span> and left.</p>
  </article>
</body>
</html>"#;
