pub mod config;
pub mod controls;
pub mod dom;
pub mod error;
pub mod parsing;
pub mod playback;
pub mod segmentation;
pub mod speakable;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use config::{InsertPosition, Labels, WidgetOptions};
pub use controls::PlayerControls;
pub use dom::{DomTree, NodeId};
pub use error::{Error, Result};
pub use playback::{
    EngineEvent, PlaybackArbiter, PlaybackPhase, PlaybackTracker, SimulatedEngine, SpeechEngine,
    SpeechRequest, Voice,
};
pub use segmentation::{SourceMapEntry, Utterance, segment};
pub use speakable::{Speakable, Speakables};
