pub mod arbiter;
pub mod engine;
pub mod simulated;
pub mod tracker;
pub mod voice;

pub use arbiter::{PlaybackArbiter, PlayerId};
pub use engine::{EngineEvent, SpeechEngine, SpeechRequest, Voice};
pub use simulated::SimulatedEngine;
pub use tracker::{EngineCommand, PlaybackPhase, PlaybackTracker, progress_percent};
pub use voice::{VoiceResolver, choose_voice};
