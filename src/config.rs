use crate::dom::{DomTree, NodeId};
use crate::error::Result;
use crate::parsing::text_normalizer::DEFAULT_SILENT_CHARS;
use crate::parsing::tree_walker::DEFAULT_SKIP_ATTRIBUTE;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub const DEFAULT_SELECTOR: &str = ".spkbl";
pub const DEFAULT_LANGUAGE: &str = "en";

/// Prefix of the per-instance override attributes, e.g. `data-spkbl-hidden`.
pub const DATA_ATTRIBUTE_PREFIX: &str = "data-spkbl-";

/// Where the player markup goes relative to the widget element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InsertPosition {
    #[default]
    Before,
    After,
    Prepend,
}

impl InsertPosition {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "before" => Some(Self::Before),
            "after" => Some(Self::After),
            "prepend" => Some(Self::Prepend),
            _ => None,
        }
    }
}

/// Accessible names of the player controls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Labels {
    pub play: String,
    pub pause: String,
    pub progress: String,
    pub stop: String,
}

impl Default for Labels {
    fn default() -> Self {
        Self {
            play: "Text vorlesen".to_string(),
            pause: "Pause".to_string(),
            progress: "Fortschritt".to_string(),
            stop: "Schließen".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WidgetOptions {
    pub selector: String,
    pub insert: InsertPosition,
    /// Let nested `lang` attributes switch voices mid-text.
    pub multi_voice: bool,
    /// Hide the player from assistive technology.
    pub hidden: bool,
    pub labels: Labels,
    /// Pre-rendered audio for the widget. Carried along, never played.
    pub audio: Option<String>,
    /// Used when neither the widget nor its ancestors declare a language.
    pub default_language: String,
    pub skip_attribute: String,
    pub silent_chars: Vec<char>,
}

impl Default for WidgetOptions {
    fn default() -> Self {
        Self {
            selector: DEFAULT_SELECTOR.to_string(),
            insert: InsertPosition::default(),
            multi_voice: false,
            hidden: false,
            labels: Labels::default(),
            audio: None,
            default_language: DEFAULT_LANGUAGE.to_string(),
            skip_attribute: DEFAULT_SKIP_ATTRIBUTE.to_string(),
            silent_chars: DEFAULT_SILENT_CHARS.to_vec(),
        }
    }
}

impl WidgetOptions {
    pub fn load_or_default(file_path: Option<&str>) -> Self {
        match file_path {
            Some(path) => Self::load_from_file(path).unwrap_or_else(|e| {
                log::error!("Failed to load options from {path}: {e}");
                Self::default()
            }),
            None => Self::default(),
        }
    }

    /// Reads options from a JSON file. Missing keys keep their defaults and a
    /// missing file yields the defaults.
    pub fn load_from_file(file_path: impl AsRef<Path>) -> Result<Self> {
        let path = file_path.as_ref();
        if !path.exists() {
            log::info!("No options file at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)?;
        let options = serde_json::from_str::<Self>(&content)?;
        log::debug!("Loaded options from {}", path.display());
        Ok(options)
    }

    /// A copy of these options with the element's `data-spkbl-*` attributes
    /// applied on top. Unparseable values are ignored.
    pub fn with_data_attributes(&self, tree: &DomTree, element: NodeId) -> Self {
        let mut options = self.clone();
        for (name, value) in tree.attrs(element) {
            let lowered = name.to_ascii_lowercase();
            let Some(key) = lowered.strip_prefix(DATA_ATTRIBUTE_PREFIX) else {
                continue;
            };
            if !options.apply_override(key, value) {
                log::warn!("Ignoring {name}=\"{value}\" on {element:?}");
            }
        }
        options
    }

    fn apply_override(&mut self, key: &str, value: &str) -> bool {
        match key {
            "multi-voice" | "multivoice" => {
                coerce_bool(value).map(|v| self.multi_voice = v).is_some()
            }
            "hidden" => coerce_bool(value).map(|v| self.hidden = v).is_some(),
            "insert" => InsertPosition::parse(value)
                .map(|v| self.insert = v)
                .is_some(),
            "audio" => {
                let value = value.trim();
                self.audio = (!value.is_empty()).then(|| value.to_string());
                true
            }
            "lang" | "default-language" => {
                let value = value.trim();
                if value.is_empty() {
                    return false;
                }
                self.default_language = value.to_string();
                true
            }
            "label-play" => set_label(&mut self.labels.play, value),
            "label-pause" => set_label(&mut self.labels.pause, value),
            "label-progress" => set_label(&mut self.labels.progress, value),
            "label-stop" => set_label(&mut self.labels.stop, value),
            // The skip marker shares the prefix but belongs to the content.
            "skip" => true,
            _ => false,
        }
    }
}

fn set_label(label: &mut String, value: &str) -> bool {
    let value = value.trim();
    if value.is_empty() {
        return false;
    }
    *label = value.to_string();
    true
}

/// `"1"`/`"true"` and `"0"`/`"false"`; a bare attribute counts as true.
pub fn coerce_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "" | "1" | "true" => Some(true),
        "0" | "false" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn element_with(attrs: &[(&str, &str)]) -> (DomTree, NodeId) {
        let mut tree = DomTree::new();
        let root = tree.root();
        let id = tree.append_element(root, "div", attrs);
        (tree, id)
    }

    #[test]
    fn test_defaults() {
        let options = WidgetOptions::default();
        assert_eq!(options.selector, ".spkbl");
        assert_eq!(options.insert, InsertPosition::Before);
        assert!(!options.multi_voice);
        assert!(!options.hidden);
        assert_eq!(options.labels.play, "Text vorlesen");
        assert_eq!(options.labels.stop, "Schließen");
        assert_eq!(options.default_language, "en");
        assert_eq!(options.skip_attribute, "data-spkbl-skip");
    }

    #[test]
    fn test_coerce_bool() {
        assert_eq!(coerce_bool("1"), Some(true));
        assert_eq!(coerce_bool("TRUE"), Some(true));
        assert_eq!(coerce_bool(""), Some(true));
        assert_eq!(coerce_bool("0"), Some(false));
        assert_eq!(coerce_bool(" false "), Some(false));
        assert_eq!(coerce_bool("yes"), None);
    }

    #[test]
    fn test_data_attributes_override() {
        let (tree, id) = element_with(&[
            ("data-spkbl-multi-voice", "1"),
            ("data-spkbl-hidden", "true"),
            ("data-spkbl-insert", "prepend"),
            ("data-spkbl-label-play", "Read aloud"),
            ("data-spkbl-audio", "talk.mp3"),
        ]);
        let options = WidgetOptions::default().with_data_attributes(&tree, id);
        assert!(options.multi_voice);
        assert!(options.hidden);
        assert_eq!(options.insert, InsertPosition::Prepend);
        assert_eq!(options.labels.play, "Read aloud");
        assert_eq!(options.labels.pause, "Pause");
        assert_eq!(options.audio.as_deref(), Some("talk.mp3"));
    }

    #[test]
    fn test_data_attributes_can_switch_off() {
        let base = WidgetOptions {
            multi_voice: true,
            ..WidgetOptions::default()
        };
        let (tree, id) = element_with(&[("data-spkbl-multi-voice", "false")]);
        assert!(!base.with_data_attributes(&tree, id).multi_voice);
    }

    #[test]
    fn test_invalid_data_attributes_are_ignored() {
        let (tree, id) = element_with(&[
            ("data-spkbl-hidden", "maybe"),
            ("data-spkbl-insert", "sideways"),
            ("data-spkbl-unknown", "x"),
        ]);
        let options = WidgetOptions::default().with_data_attributes(&tree, id);
        assert_eq!(options, WidgetOptions::default());
    }

    #[test]
    fn test_load_from_file_fills_missing_keys() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"selector": "article", "multi_voice": true, "insert": "after", "labels": {{"play": "Play"}}}}"#
        )
        .unwrap();

        let options = WidgetOptions::load_from_file(file.path()).unwrap();
        assert_eq!(options.selector, "article");
        assert!(options.multi_voice);
        assert_eq!(options.insert, InsertPosition::After);
        assert_eq!(options.labels.play, "Play");
        assert_eq!(options.labels.progress, "Fortschritt");
        assert_eq!(options.default_language, "en");
    }

    #[test]
    fn test_load_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.json");
        let options = WidgetOptions::load_from_file(&path).unwrap();
        assert_eq!(options, WidgetOptions::default());
    }

    #[test]
    fn test_load_or_default_survives_malformed_json() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{{ not json").unwrap();
        let path = file.path().to_str().unwrap().to_string();

        assert!(WidgetOptions::load_from_file(&path).is_err());
        assert_eq!(
            WidgetOptions::load_or_default(Some(&path)),
            WidgetOptions::default()
        );
    }
}
