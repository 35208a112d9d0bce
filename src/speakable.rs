use crate::config::WidgetOptions;
use crate::controls::PlayerControls;
use crate::dom::{DomTree, NodeId};
use crate::error::Result;
use crate::parsing::tree_walker::TreeWalker;
use crate::playback::arbiter::{PlaybackArbiter, PlayerId};
use crate::playback::engine::{EngineEvent, SpeechEngine};
use crate::playback::tracker::{PlaybackPhase, PlaybackTracker};
use crate::segmentation::{Utterance, document_text, segment};

/// One readable region of the document together with its player.
#[derive(Debug, Clone)]
pub struct Speakable {
    element: NodeId,
    language: String,
    options: WidgetOptions,
    player: PlayerId,
}

impl Speakable {
    pub fn element(&self) -> NodeId {
        self.element
    }

    /// Base language: the element's own, an ancestor's, or the configured
    /// default.
    pub fn language(&self) -> &str {
        &self.language
    }

    /// Options after the element's data attributes were applied.
    pub fn options(&self) -> &WidgetOptions {
        &self.options
    }

    pub fn player(&self) -> PlayerId {
        self.player
    }
}

/// Every widget found in a document, sharing one engine.
///
/// Widgets are addressed by their position in [`Speakables::widgets`].
/// Calls with an unknown index do nothing.
pub struct Speakables {
    widgets: Vec<Speakable>,
    arbiter: Option<PlaybackArbiter>,
}

impl Speakables {
    /// Finds all elements matching `options.selector`, segments each one and
    /// registers it for playback. Without a usable engine nothing is built.
    pub fn init(
        tree: &DomTree,
        options: &WidgetOptions,
        engine: Option<Box<dyn SpeechEngine>>,
    ) -> Result<Self> {
        let engine = match engine {
            Some(engine) if engine.is_available() => engine,
            _ => {
                log::info!("No speech engine available, no widgets created");
                return Ok(Self {
                    widgets: Vec::new(),
                    arbiter: None,
                });
            }
        };

        let mut arbiter = PlaybackArbiter::new(engine);
        let mut widgets = Vec::new();
        for element in tree.select(&options.selector)? {
            let options = options.with_data_attributes(tree, element);
            let language = tree
                .resolve_language(element)
                .unwrap_or(&options.default_language)
                .to_string();

            let walker = TreeWalker::new(tree)
                .multi_voice(options.multi_voice)
                .skip_attribute(options.skip_attribute.as_str())
                .silent_chars(&options.silent_chars);
            let utterances = segment(&walker, element, &language);
            log::info!(
                "Widget {} ({element:?}, {language}): {} utterances",
                widgets.len(),
                utterances.len()
            );

            let player = arbiter.register(utterances);
            widgets.push(Speakable {
                element,
                language,
                options,
                player,
            });
        }

        Ok(Self {
            widgets,
            arbiter: Some(arbiter),
        })
    }

    pub fn widgets(&self) -> &[Speakable] {
        &self.widgets
    }

    pub fn len(&self) -> usize {
        self.widgets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.widgets.is_empty()
    }

    pub fn play(&mut self, index: usize) {
        if let Some((arbiter, player)) = self.lookup_mut(index) {
            arbiter.play(player);
        }
    }

    /// Toggles between paused and playing.
    pub fn pause(&mut self, index: usize) {
        if let Some((arbiter, player)) = self.lookup_mut(index) {
            arbiter.pause(player);
        }
    }

    pub fn stop(&mut self, index: usize) {
        if let Some((arbiter, player)) = self.lookup_mut(index) {
            arbiter.stop(player);
        }
    }

    pub fn handle_event(&mut self, event: EngineEvent) {
        if let Some(arbiter) = self.arbiter.as_mut() {
            arbiter.dispatch(event);
        }
    }

    /// Index of the widget currently holding the engine.
    pub fn active(&self) -> Option<usize> {
        let active = self.arbiter.as_ref()?.active()?;
        self.widgets.iter().position(|w| w.player == active)
    }

    pub fn phase(&self, index: usize) -> PlaybackPhase {
        self.tracker(index)
            .map_or(PlaybackPhase::Idle, PlaybackTracker::phase)
    }

    pub fn progress(&self, index: usize) -> u8 {
        self.tracker(index).map_or(0, PlaybackTracker::progress)
    }

    pub fn utterances(&self, index: usize) -> &[Utterance] {
        self.tracker(index)
            .map(PlaybackTracker::utterances)
            .unwrap_or_default()
    }

    /// The widget's utterances as one string, the way they are read.
    pub fn text(&self, index: usize) -> String {
        document_text(self.utterances(index))
    }

    pub fn spoken_source(&self, index: usize) -> Option<NodeId> {
        self.tracker(index)?.spoken_source()
    }

    pub fn spoken_sentence(&self, index: usize) -> Option<&str> {
        self.tracker(index)?.spoken_sentence()
    }

    pub fn controls(&self, index: usize) -> Option<PlayerControls> {
        let widget = self.widgets.get(index)?;
        let tracker = self.tracker(index)?;
        Some(PlayerControls::new(
            &widget.options,
            tracker.phase(),
            tracker.progress(),
        ))
    }

    pub fn tracker(&self, index: usize) -> Option<&PlaybackTracker> {
        let widget = self.widgets.get(index)?;
        Some(self.arbiter.as_ref()?.tracker(widget.player))
    }

    fn lookup_mut(&mut self, index: usize) -> Option<(&mut PlaybackArbiter, PlayerId)> {
        let player = self.widgets.get(index)?.player;
        Some((self.arbiter.as_mut()?, player))
    }
}
