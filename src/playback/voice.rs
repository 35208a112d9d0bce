use crate::playback::engine::{SpeechEngine, Voice};
use std::collections::HashMap;

/// Remembers which voice was picked for each language until the engine's
/// voice list changes.
#[derive(Debug, Default)]
pub struct VoiceResolver {
    cache: HashMap<String, Option<Voice>>,
}

impl VoiceResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn resolve(&mut self, language: &str, engine: &dyn SpeechEngine) -> Option<Voice> {
        let key = normalize_tag(language);
        if let Some(cached) = self.cache.get(&key) {
            return cached.clone();
        }

        let voices = engine.voices();
        let chosen = choose_voice(&voices, language);
        // Engines often publish their voices late; an empty list is not an
        // answer worth keeping.
        if !voices.is_empty() {
            log::debug!(
                "Voice for '{language}': {}",
                chosen.as_ref().map_or("<none>", |v| v.name.as_str())
            );
            self.cache.insert(key, chosen.clone());
        }
        chosen
    }

    pub fn invalidate(&mut self) {
        self.cache.clear();
    }
}

/// Exact tag match, then primary subtag match, then the engine's default
/// voice, then whatever comes first.
pub fn choose_voice(voices: &[Voice], language: &str) -> Option<Voice> {
    let wanted = normalize_tag(language);
    let wanted_primary = primary_subtag(&wanted);

    voices
        .iter()
        .find(|voice| normalize_tag(&voice.language) == wanted)
        .or_else(|| {
            voices
                .iter()
                .find(|voice| primary_subtag(&normalize_tag(&voice.language)) == wanted_primary)
        })
        .or_else(|| voices.iter().find(|voice| voice.default))
        .or_else(|| voices.first())
        .cloned()
}

fn normalize_tag(tag: &str) -> String {
    tag.trim().replace('_', "-").to_ascii_lowercase()
}

fn primary_subtag(tag: &str) -> &str {
    tag.split('-').next().unwrap_or(tag)
}
