use crate::config::{InsertPosition, Labels, WidgetOptions};
use crate::parsing::tree_walker::PLAYER_CLASS;
use crate::playback::tracker::PlaybackPhase;
use html_escape::{encode_double_quoted_attribute, encode_text};
use serde::Serialize;

pub const ACTIVE_MODIFIER: &str = "spkbl-player--active";
pub const INACTIVE_MODIFIER: &str = "spkbl-player--inactive";
pub const PAUSED_MODIFIER: &str = "spkbl-player--paused";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Button {
    pub class: String,
    pub label: String,
    /// `aria-pressed`, only meaningful for toggle buttons.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pressed: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProgressBar {
    pub class: String,
    pub label: String,
    pub value: u8,
    pub max: u8,
    /// Fallback content, e.g. `42%`.
    pub text: String,
}

/// Everything a host needs to draw one widget's player: class names, ARIA
/// state, labels and the progress value. Rebuilt from the tracker state on
/// every change rather than mutated in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlayerControls {
    pub classes: Vec<&'static str>,
    pub aria_hidden: bool,
    pub insert: InsertPosition,
    pub play: Button,
    pub pause: Button,
    pub progress: ProgressBar,
    pub stop: Button,
}

impl PlayerControls {
    pub fn new(options: &WidgetOptions, phase: PlaybackPhase, progress: u8) -> Self {
        let mut classes = vec![PLAYER_CLASS];
        match phase {
            PlaybackPhase::Idle => classes.push(INACTIVE_MODIFIER),
            PlaybackPhase::Playing => classes.push(ACTIVE_MODIFIER),
            PlaybackPhase::Paused => {
                classes.push(ACTIVE_MODIFIER);
                classes.push(PAUSED_MODIFIER);
            }
        }

        let Labels {
            play,
            pause,
            progress: progress_label,
            stop,
        } = options.labels.clone();
        let progress = progress.min(100);

        Self {
            classes,
            aria_hidden: options.hidden,
            insert: options.insert,
            play: button("play", play, None),
            pause: button("pause", pause, Some(phase == PlaybackPhase::Paused)),
            progress: ProgressBar {
                class: control_class("progress"),
                label: progress_label,
                value: progress,
                max: 100,
                text: format!("{progress}%"),
            },
            stop: button("stop", stop, None),
        }
    }

    pub fn class_attribute(&self) -> String {
        self.classes.join(" ")
    }

    pub fn is_active(&self) -> bool {
        self.classes.contains(&ACTIVE_MODIFIER)
    }

    /// Player markup as a host would inject it.
    pub fn to_html(&self) -> String {
        let hidden = if self.aria_hidden {
            r#" aria-hidden="true""#
        } else {
            ""
        };
        let pressed = self.pause.pressed.unwrap_or(false);
        format!(
            concat!(
                r#"<div class="{}" role="group"{}>"#,
                r#"<button type="button" class="{}">{}</button>"#,
                r#"<button type="button" class="{}" aria-pressed="{}">{}</button>"#,
                r#"<progress class="{}" max="{}" value="{}" aria-label="{}" aria-hidden="true" readonly="true">{}</progress>"#,
                r#"<button type="button" class="{}">{}</button>"#,
                "</div>"
            ),
            self.class_attribute(),
            hidden,
            self.play.class,
            encode_text(&self.play.label),
            self.pause.class,
            pressed,
            encode_text(&self.pause.label),
            self.progress.class,
            self.progress.max,
            self.progress.value,
            encode_double_quoted_attribute(&self.progress.label),
            encode_text(&self.progress.text),
            self.stop.class,
            encode_text(&self.stop.label),
        )
    }
}

fn control_class(name: &str) -> String {
    format!("spkbl-ctrl spkbl-ctrl--{name}")
}

fn button(name: &str, label: String, pressed: Option<bool>) -> Button {
    Button {
        class: control_class(name),
        label,
        pressed,
    }
}
