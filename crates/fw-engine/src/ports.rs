//! Ports to the collaborators the engine drives but does not implement.

use std::collections::BTreeMap;

use fw_core::NotificationKind;
use tracing::debug;

/// A scene ready for display, with its text already localized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SceneView {
    /// Scene id.
    pub id: String,
    /// Localized scene text.
    pub text: String,
    /// Background reference.
    pub background: Option<String>,
}

/// A choice ready for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChoiceView {
    /// Choice id, passed back to [`Narrator::select_choice`](crate::Narrator::select_choice).
    pub id: String,
    /// Localized choice text.
    pub text: String,
    /// False for choices shown even though their conditions fail.
    pub enabled: bool,
}

/// An ending ready for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndingView {
    /// Ending id.
    pub id: String,
    /// Localized title.
    pub title: String,
    /// Localized closing text.
    pub text: String,
}

/// The presentation layer.
pub trait UiPort {
    /// Show a scene.
    fn render_scene(&mut self, scene: &SceneView);

    /// Show the choices of the current scene.
    fn display_choices(&mut self, choices: &[ChoiceView]);

    /// Show a transient message.
    fn show_notification(&mut self, message: &str, kind: NotificationKind);

    /// Show the end of the story.
    fn show_ending(&mut self, ending: &EndingView);

    /// Ask the player a yes/no question.
    fn request_confirmation(&mut self, prompt: &str) -> bool;
}

/// Sound and music playback.
pub trait AudioPort {
    /// Play a sound once.
    fn play_sound(&mut self, sound: &str);

    /// Switch the background music.
    fn play_music(&mut self, track: &str);
}

/// An [`AudioPort`] that only logs.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullAudio;

impl AudioPort for NullAudio {
    fn play_sound(&mut self, sound: &str) {
        debug!(sound, "play sound");
    }

    fn play_music(&mut self, track: &str) {
        debug!(track, "play music");
    }
}

/// Resolves text keys to display strings.
pub trait Localizer {
    /// The string for `key` with `{name}` placeholders filled from `vars`.
    fn get_string(&self, key: &str, vars: &BTreeMap<String, String>) -> String;
}

/// A [`Localizer`] backed by a key/template table.
///
/// Keys missing from the table are treated as literal text, so stories
/// without a string table work unchanged.
#[derive(Debug, Clone, Default)]
pub struct StringTable {
    strings: BTreeMap<String, String>,
}

impl StringTable {
    /// Create a table from key/template pairs.
    pub fn new(strings: BTreeMap<String, String>) -> Self {
        Self { strings }
    }
}

impl Localizer for StringTable {
    fn get_string(&self, key: &str, vars: &BTreeMap<String, String>) -> String {
        let template = self.strings.get(key).map_or(key, String::as_str);
        let mut text = template.to_string();
        for (name, value) in vars {
            let placeholder = format!("{{{name}}}");
            if text.contains(&placeholder) {
                text = text.replace(&placeholder, value);
            }
        }
        text
    }
}

/// The collaborators a [`Narrator`](crate::Narrator) is wired to.
pub struct Ports {
    /// Presentation.
    pub ui: Box<dyn UiPort>,
    /// Sound and music.
    pub audio: Box<dyn AudioPort>,
    /// Text lookup.
    pub localizer: Box<dyn Localizer>,
}

impl Ports {
    /// Wire a UI with silent audio and a string table.
    pub fn new(ui: Box<dyn UiPort>, strings: BTreeMap<String, String>) -> Self {
        Self {
            ui,
            audio: Box::new(NullAudio),
            localizer: Box::new(StringTable::new(strings)),
        }
    }

    /// Replace the audio port.
    pub fn with_audio(mut self, audio: Box<dyn AudioPort>) -> Self {
        self.audio = audio;
        self
    }

    /// Replace the localizer.
    pub fn with_localizer(mut self, localizer: Box<dyn Localizer>) -> Self {
        self.localizer = localizer;
        self
    }
}
