//! Static item, stat, and achievement definitions.
//!
//! Catalogs are loaded once with the story and referenced by id. They are
//! never embedded in a [`GameState`](crate::state::GameState), so saves stay
//! small and content updates apply to old saves.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::condition::Condition;
use crate::error::{ContentError, ContentResult};
use crate::value::Scalar;

fn default_true() -> bool {
    true
}

/// An item the player can carry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemDef {
    /// Unique identifier.
    pub id: String,
    /// Display name or localization key.
    pub name: String,
    /// Description or localization key.
    #[serde(default)]
    pub description: String,
    /// Whether several of this item share one inventory slot.
    #[serde(default = "default_true")]
    pub stackable: bool,
}

impl ItemDef {
    /// Create a stackable item.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            stackable: true,
        }
    }

    /// Make the item non-stackable.
    pub fn unique(mut self) -> Self {
        self.stackable = false;
        self
    }
}

/// A bounded numeric attribute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatDef {
    /// Unique identifier.
    pub id: String,
    /// Display name or localization key.
    pub name: String,
    /// Lower bound.
    #[serde(default)]
    pub min: i32,
    /// Upper bound.
    pub max: i32,
    /// Value on a new game.
    pub initial: i32,
}

impl StatDef {
    /// Create a stat with a custom range and starting value.
    pub fn new(id: impl Into<String>, min: i32, max: i32, initial: i32) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            min,
            max,
            initial,
        }
    }
}

/// Whether an achievement unlocks at once or after accumulating progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AchievementKind {
    /// Unlocks the first time its trigger matches.
    #[default]
    Instant,
    /// Each trigger match adds one; unlocks when `target` is reached.
    Progress {
        /// Progress needed to unlock.
        target: u32,
    },
}

impl AchievementKind {
    /// The progress value at which the achievement unlocks.
    pub fn target(self) -> u32 {
        match self {
            Self::Instant => 1,
            Self::Progress { target } => target,
        }
    }
}

/// The semantic events an achievement can listen for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerType {
    /// A scene was entered. Payload: `scene`.
    SceneVisited,
    /// A choice was made. Payload: `scene`, `choice`.
    ChoiceMade,
    /// Items were added to the inventory. Payload: `item`, `quantity`.
    ItemAcquired,
    /// Items were removed from the inventory. Payload: `item`, `quantity`.
    ItemRemoved,
    /// A flag changed. Payload: `flag`, `value`.
    FlagChanged,
    /// A variable changed. Payload: `variable`, `value`.
    VariableChanged,
    /// A stat changed. Payload: `stat`, `value`.
    StatChanged,
    /// A stat reached its minimum or maximum. Payload: `stat`, `bound`.
    StatBoundReached,
    /// Another achievement unlocked. Payload: `achievement`.
    AchievementUnlocked,
    /// An ending was reached. Payload: `ending`.
    EndingReached,
}

/// When an achievement is considered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AchievementTrigger {
    /// The event type to react to.
    pub event: TriggerType,
    /// Payload fields that must be equal for the trigger to match.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub fields: BTreeMap<String, Scalar>,
    /// Conditions on the game state that must also hold.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub game_state_conditions: Vec<Condition>,
}

impl AchievementTrigger {
    /// Trigger on every event of the given type.
    pub fn on(event: TriggerType) -> Self {
        Self {
            event,
            fields: BTreeMap::new(),
            game_state_conditions: Vec::new(),
        }
    }

    /// Require a payload field to equal a value.
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Scalar>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    /// Require a game state condition.
    pub fn with_condition(mut self, condition: Condition) -> Self {
        self.game_state_conditions.push(condition);
        self
    }
}

/// A tracked accomplishment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AchievementDef {
    /// Unique identifier.
    pub id: String,
    /// Display name or localization key.
    pub name: String,
    /// Description or localization key.
    #[serde(default)]
    pub description: String,
    /// Instant or progress-based.
    #[serde(default)]
    pub kind: AchievementKind,
    /// Event trigger; achievements without one unlock only through effects.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trigger: Option<AchievementTrigger>,
    /// Hidden from listings until unlocked.
    #[serde(default)]
    pub hidden: bool,
}

impl AchievementDef {
    /// Create an instant achievement without a trigger.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            kind: AchievementKind::Instant,
            trigger: None,
            hidden: false,
        }
    }

    /// Make this a progress achievement.
    pub fn with_target(mut self, target: u32) -> Self {
        self.kind = AchievementKind::Progress { target };
        self
    }

    /// Attach a trigger.
    pub fn with_trigger(mut self, trigger: AchievementTrigger) -> Self {
        self.trigger = Some(trigger);
        self
    }
}

/// Indexed lookup over the static definitions of a story.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    items: Vec<ItemDef>,
    stats: Vec<StatDef>,
    achievements: Vec<AchievementDef>,

    // Indexes
    item_index: HashMap<String, usize>,
    stat_index: HashMap<String, usize>,
    achievement_index: HashMap<String, usize>,
}

impl Catalog {
    /// Build a catalog, rejecting duplicate ids and inconsistent definitions.
    pub fn new(
        items: Vec<ItemDef>,
        stats: Vec<StatDef>,
        achievements: Vec<AchievementDef>,
    ) -> ContentResult<Self> {
        let item_index = index_by_id("item", items.iter().map(|i| i.id.as_str()))?;
        let stat_index = index_by_id("stat", stats.iter().map(|s| s.id.as_str()))?;
        let achievement_index =
            index_by_id("achievement", achievements.iter().map(|a| a.id.as_str()))?;

        for stat in &stats {
            if stat.initial < stat.min || stat.initial > stat.max {
                return Err(ContentError::InvalidStatRange {
                    id: stat.id.clone(),
                    min: stat.min,
                    initial: stat.initial,
                    max: stat.max,
                });
            }
        }
        for achievement in &achievements {
            if achievement.kind.target() == 0 {
                return Err(ContentError::ZeroTarget(achievement.id.clone()));
            }
        }

        Ok(Self {
            items,
            stats,
            achievements,
            item_index,
            stat_index,
            achievement_index,
        })
    }

    /// Look up an item definition.
    pub fn item(&self, id: &str) -> Option<&ItemDef> {
        self.item_index.get(id).map(|&i| &self.items[i])
    }

    /// Look up a stat definition.
    pub fn stat(&self, id: &str) -> Option<&StatDef> {
        self.stat_index.get(id).map(|&i| &self.stats[i])
    }

    /// Look up an achievement definition.
    pub fn achievement(&self, id: &str) -> Option<&AchievementDef> {
        self.achievement_index.get(id).map(|&i| &self.achievements[i])
    }

    /// All item definitions in declaration order.
    pub fn items(&self) -> &[ItemDef] {
        &self.items
    }

    /// All stat definitions in declaration order.
    pub fn stats(&self) -> &[StatDef] {
        &self.stats
    }

    /// All achievement definitions in declaration order.
    pub fn achievements(&self) -> &[AchievementDef] {
        &self.achievements
    }
}

fn index_by_id<'a>(
    kind: &'static str,
    ids: impl Iterator<Item = &'a str>,
) -> ContentResult<HashMap<String, usize>> {
    let mut index = HashMap::new();
    for (i, id) in ids.enumerate() {
        if index.insert(id.to_string(), i).is_some() {
            return Err(ContentError::DuplicateId {
                kind,
                id: id.to_string(),
            });
        }
    }
    Ok(index)
}
