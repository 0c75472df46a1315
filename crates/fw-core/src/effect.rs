//! Effects that modify game state or request side effects.

use serde::{Deserialize, Serialize};

use crate::condition::Condition;
use crate::value::Scalar;

fn default_true() -> bool {
    true
}

fn default_one() -> u32 {
    1
}

/// How a notification should be presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    /// Neutral information.
    #[default]
    Info,
    /// Something good happened.
    Success,
    /// Something needs attention.
    Warning,
    /// Something failed.
    Error,
    /// An achievement was unlocked.
    Achievement,
}

/// An effect with an optional guard.
///
/// The guard is a condition list (implicit AND). When it does not hold, only
/// this effect is skipped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Effect {
    /// What the effect does.
    #[serde(flatten)]
    pub kind: EffectKind,
    /// Guard conditions; empty means always.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<Condition>,
}

impl Effect {
    /// Wrap a kind with no guard.
    pub fn new(kind: EffectKind) -> Self {
        Self {
            kind,
            conditions: Vec::new(),
        }
    }

    /// Add a guard condition.
    pub fn when(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }

    /// Set a flag to true.
    pub fn set_flag(flag: impl Into<String>) -> Self {
        Self::new(EffectKind::SetFlag {
            flag: flag.into(),
            value: true,
        })
    }

    /// Add items to the inventory.
    pub fn add_item(item: impl Into<String>, quantity: u32) -> Self {
        Self::new(EffectKind::AddItem {
            item: item.into(),
            quantity,
        })
    }

    /// Remove items from the inventory.
    pub fn remove_item(item: impl Into<String>, quantity: u32) -> Self {
        Self::new(EffectKind::RemoveItem {
            item: item.into(),
            quantity,
        })
    }

    /// Change a stat by a delta, clamped to its bounds.
    pub fn modify_stat(stat: impl Into<String>, amount: i32) -> Self {
        Self::new(EffectKind::ModifyStat {
            stat: stat.into(),
            amount,
            allow_over_max: false,
            allow_under_min: false,
        })
    }

    /// Advance a progress achievement.
    pub fn progress(achievement: impl Into<String>, amount: u32) -> Self {
        Self::new(EffectKind::ProgressAchievement {
            achievement: achievement.into(),
            amount,
        })
    }
}

impl From<EffectKind> for Effect {
    fn from(kind: EffectKind) -> Self {
        Self::new(kind)
    }
}

/// The operation an effect performs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EffectKind {
    /// Set a flag.
    SetFlag {
        /// Flag name.
        flag: String,
        /// Value to set.
        #[serde(default = "default_true")]
        value: bool,
    },
    /// Invert a flag (absent flags become true).
    ToggleFlag {
        /// Flag name.
        flag: String,
    },
    /// Set a variable.
    SetVariable {
        /// Variable name.
        variable: String,
        /// Value to set.
        value: Scalar,
    },
    /// Add a numeric amount to a variable (missing variables start at 0).
    ModifyVariable {
        /// Variable name.
        variable: String,
        /// Amount to add; may be negative.
        amount: Scalar,
    },
    /// Set a stat's current value.
    SetStat {
        /// Stat id.
        stat: String,
        /// New value.
        value: i32,
        /// Skip clamping at the maximum.
        #[serde(default)]
        allow_over_max: bool,
        /// Skip clamping at the minimum.
        #[serde(default)]
        allow_under_min: bool,
    },
    /// Change a stat's current value by a delta.
    ModifyStat {
        /// Stat id.
        stat: String,
        /// Delta; may be negative.
        amount: i32,
        /// Skip clamping at the maximum.
        #[serde(default)]
        allow_over_max: bool,
        /// Skip clamping at the minimum.
        #[serde(default)]
        allow_under_min: bool,
    },
    /// Give the player items.
    AddItem {
        /// Item id.
        item: String,
        /// How many.
        #[serde(default = "default_one")]
        quantity: u32,
    },
    /// Take items from the player.
    RemoveItem {
        /// Item id.
        item: String,
        /// How many.
        #[serde(default = "default_one")]
        quantity: u32,
    },
    /// Unlock an achievement.
    UnlockAchievement {
        /// Achievement id.
        achievement: String,
        /// Re-emit the unlock even if already unlocked (debug only).
        #[serde(default)]
        force: bool,
    },
    /// Advance a progress achievement.
    ProgressAchievement {
        /// Achievement id.
        achievement: String,
        /// Progress to add.
        #[serde(default = "default_one")]
        amount: u32,
    },
    /// Ask the audio port to play a sound.
    PlaySound {
        /// Sound reference.
        sound: String,
    },
    /// Ask the audio port to switch music.
    PlayMusic {
        /// Music reference.
        track: String,
    },
    /// Show a message once effect application is complete.
    ShowNotification {
        /// Message text or localization key.
        message: String,
        /// Presentation hint.
        #[serde(default)]
        kind: NotificationKind,
    },
    /// An effect kind this engine version does not know. Ignored.
    #[serde(other)]
    Unknown,
}

impl EffectKind {
    /// The snake_case tag of this effect, as written in content.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::SetFlag { .. } => "set_flag",
            Self::ToggleFlag { .. } => "toggle_flag",
            Self::SetVariable { .. } => "set_variable",
            Self::ModifyVariable { .. } => "modify_variable",
            Self::SetStat { .. } => "set_stat",
            Self::ModifyStat { .. } => "modify_stat",
            Self::AddItem { .. } => "add_item",
            Self::RemoveItem { .. } => "remove_item",
            Self::UnlockAchievement { .. } => "unlock_achievement",
            Self::ProgressAchievement { .. } => "progress_achievement",
            Self::PlaySound { .. } => "play_sound",
            Self::PlayMusic { .. } => "play_music",
            Self::ShowNotification { .. } => "show_notification",
            Self::Unknown => "unknown",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserialize_with_guard() {
        let json = r#"{
            "type": "add_item",
            "item": "coin",
            "quantity": 5,
            "conditions": [{ "type": "flag_set", "flag": "generous" }]
        }"#;
        let effect: Effect = serde_json::from_str(json).unwrap();
        assert_eq!(
            effect,
            Effect::add_item("coin", 5).when(Condition::flag("generous"))
        );
    }

    #[test]
    fn defaults_apply() {
        let effect: Effect =
            serde_json::from_str(r#"{ "type": "remove_item", "item": "coin" }"#).unwrap();
        assert_eq!(effect, Effect::remove_item("coin", 1));

        let effect: Effect =
            serde_json::from_str(r#"{ "type": "show_notification", "message": "hi" }"#).unwrap();
        assert_eq!(
            effect.kind,
            EffectKind::ShowNotification {
                message: "hi".into(),
                kind: NotificationKind::Info,
            }
        );
    }

    #[test]
    fn unrecognised_kind_becomes_unknown() {
        let effect: Effect =
            serde_json::from_str(r#"{ "type": "shake_screen", "intensity": 3 }"#).unwrap();
        assert_eq!(effect.kind, EffectKind::Unknown);
        assert!(effect.conditions.is_empty());
    }

    #[test]
    fn serializes_flat() {
        let value = serde_json::to_value(Effect::set_flag("awake")).unwrap();
        assert_eq!(
            value,
            serde_json::json!({ "type": "set_flag", "flag": "awake", "value": true })
        );
    }
}
