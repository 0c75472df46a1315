//! Scenes, choices, and endings.

use serde::{Deserialize, Serialize};

use crate::condition::Condition;
use crate::effect::Effect;

/// A node of the narrative graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    /// Unique identifier for this scene.
    pub id: String,
    /// Scene text or a localization key.
    pub text: String,
    /// Background reference for the presentation layer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background: Option<String>,
    /// Available choices, in display order.
    #[serde(default)]
    pub choices: Vec<Choice>,
    /// Effects run each time the scene is entered.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub on_enter: Vec<Effect>,
    /// Music reference played on entry.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub music: Option<String>,
}

impl Scene {
    /// Create a scene with the given ID and text.
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            background: None,
            choices: Vec::new(),
            on_enter: Vec::new(),
            music: None,
        }
    }

    /// Add a choice.
    pub fn with_choice(mut self, choice: Choice) -> Self {
        self.choices.push(choice);
        self
    }

    /// Add an on-enter effect.
    pub fn with_on_enter(mut self, effect: Effect) -> Self {
        self.on_enter.push(effect);
        self
    }

    /// Set the music reference.
    pub fn with_music(mut self, music: impl Into<String>) -> Self {
        self.music = Some(music.into());
        self
    }

    /// Set the background reference.
    pub fn with_background(mut self, background: impl Into<String>) -> Self {
        self.background = Some(background.into());
        self
    }

    /// Look up a choice by id.
    pub fn choice(&self, id: &str) -> Option<&Choice> {
        self.choices.iter().find(|c| c.id == id)
    }
}

/// An edge out of a scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Choice {
    /// Identifier, unique within its scene.
    pub id: String,
    /// The text shown to the player, or a localization key.
    pub text: String,
    /// Scene or ending to go to after this choice.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    /// Selecting this choice ends the game.
    #[serde(default)]
    pub ends_game: bool,
    /// Which ending is reached when `ends_game` is set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ending: Option<String>,
    /// Conditions that must hold for the choice to be available.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<Condition>,
    /// Effects applied when the choice is selected.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub effects: Vec<Effect>,
    /// Keep the choice visible (but disabled) when its conditions fail.
    #[serde(default)]
    pub show_if_condition_false: bool,
}

impl Choice {
    /// Create a new choice with the given ID and text.
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            target: None,
            ends_game: false,
            ending: None,
            conditions: Vec::new(),
            effects: Vec::new(),
            show_if_condition_false: false,
        }
    }

    /// Set the target scene or ending.
    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }

    /// Mark the choice as ending the game with the given ending.
    pub fn ending_with(mut self, ending: impl Into<String>) -> Self {
        self.ends_game = true;
        self.ending = Some(ending.into());
        self
    }

    /// Add a condition.
    pub fn with_condition(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }

    /// Add an effect.
    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }

    /// Keep the choice visible but disabled when its conditions fail.
    pub fn shown_when_locked(mut self) -> Self {
        self.show_if_condition_false = true;
        self
    }
}

/// A terminal state of the story.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EndingDef {
    /// Unique identifier; shares a namespace with scene ids.
    pub id: String,
    /// Ending title or localization key.
    pub title: String,
    /// Closing text or localization key.
    #[serde(default)]
    pub text: String,
}
