//! The mutable state of a playthrough.
//!
//! A [`GameState`] is plain data: it knows how to answer questions about
//! itself and how to keep its own invariants (stat bounds, non-negative
//! stacks), but the engine's state store decides when it changes.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::catalog::Catalog;
use crate::error::InventoryError;
use crate::value::Scalar;

/// A stat's live value and bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatValue {
    /// Current value.
    pub current: i32,
    /// Minimum value.
    pub min: i32,
    /// Maximum value.
    pub max: i32,
}

impl StatValue {
    /// Create a stat value, clamping `current` into range.
    pub fn new(current: i32, min: i32, max: i32) -> Self {
        Self {
            current: current.clamp(min, max),
            min,
            max,
        }
    }

    /// Returns true if the stat is at or below its minimum.
    pub fn is_at_min(&self) -> bool {
        self.current <= self.min
    }

    /// Returns true if the stat is at or above its maximum.
    pub fn is_at_max(&self) -> bool {
        self.current >= self.max
    }

    /// Returns the fraction of the range that is filled (0.0 to 1.0).
    pub fn fraction(&self) -> f64 {
        let range = self.max - self.min;
        if range == 0 {
            return 1.0;
        }
        f64::from(self.current - self.min) / f64::from(range)
    }
}

impl fmt::Display for StatValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.current, self.max)
    }
}

/// Items held by the player, keyed by item id.
///
/// Capacity limits the number of distinct stacks, not the total quantity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inventory {
    items: BTreeMap<String, u32>,
    capacity: usize,
}

impl Inventory {
    /// Create an empty inventory with room for `capacity` stacks.
    pub fn new(capacity: usize) -> Self {
        Self {
            items: BTreeMap::new(),
            capacity,
        }
    }

    /// How many of an item are held.
    pub fn count(&self, item: &str) -> u32 {
        self.items.get(item).copied().unwrap_or(0)
    }

    /// Whether at least one of an item is held.
    pub fn contains(&self, item: &str) -> bool {
        self.count(item) > 0
    }

    /// Number of distinct stacks held.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether nothing is held.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Maximum number of distinct stacks.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Whether no new stack can be added.
    pub fn is_full(&self) -> bool {
        self.items.len() >= self.capacity
    }

    /// Iterate over `(item id, quantity)` in id order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> {
        self.items.iter().map(|(id, qty)| (id.as_str(), *qty))
    }

    /// Add `quantity` of an item. Returns the new stack size.
    ///
    /// Stackable items grow an existing stack. A non-stackable item that is
    /// already held is rejected, and so is a new stack once the inventory is
    /// at capacity.
    pub fn add(&mut self, item: &str, quantity: u32, stackable: bool) -> Result<u32, InventoryError> {
        if quantity == 0 {
            return Err(InventoryError::ZeroQuantity);
        }
        if let Some(held) = self.items.get_mut(item) {
            if !stackable {
                return Err(InventoryError::NotStackable(item.to_string()));
            }
            *held = held.saturating_add(quantity);
            return Ok(*held);
        }
        if self.is_full() {
            return Err(InventoryError::Full {
                capacity: self.capacity,
            });
        }
        if !stackable && quantity > 1 {
            return Err(InventoryError::NotStackable(item.to_string()));
        }
        self.items.insert(item.to_string(), quantity);
        Ok(quantity)
    }

    /// Remove up to `quantity` of an item. Returns how many were removed.
    ///
    /// Asking for more than is held removes the whole stack.
    pub fn remove(&mut self, item: &str, quantity: u32) -> u32 {
        let Some(held) = self.items.get_mut(item) else {
            return 0;
        };
        let removed = quantity.min(*held);
        *held -= removed;
        if *held == 0 {
            self.items.remove(item);
        }
        removed
    }
}

/// Unlock status of one achievement.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AchievementState {
    /// Whether the achievement is unlocked.
    pub unlocked: bool,
    /// When it was first unlocked.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unlocked_at: Option<DateTime<Utc>>,
    /// Accumulated progress; never exceeds the achievement's target.
    #[serde(default)]
    pub progress: u32,
}

/// Bookkeeping about the playthrough and the last save.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveMetadata {
    /// Name the player chose.
    pub player_name: String,
    /// Accumulated play time in seconds.
    pub playtime_secs: u64,
    /// Engine version that wrote the state.
    pub version: String,
    /// Slot the state was last saved to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slot_id: Option<String>,
    /// When the state was last saved.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
    /// Identifies one playthrough across all of its saves.
    pub playthrough: Uuid,
}

impl SaveMetadata {
    /// Metadata for a fresh playthrough.
    pub fn new(player_name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            player_name: player_name.into(),
            playtime_secs: 0,
            version: version.into(),
            slot_id: None,
            timestamp: None,
            playthrough: Uuid::new_v4(),
        }
    }
}

/// The canonical mutable state of a playthrough.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    /// Named booleans; absent means false.
    #[serde(default)]
    pub flags: BTreeMap<String, bool>,
    /// Named scalars.
    #[serde(default)]
    pub variables: BTreeMap<String, Scalar>,
    /// Bounded numeric attributes.
    #[serde(default)]
    pub stats: BTreeMap<String, StatValue>,
    /// Carried items.
    pub inventory: Inventory,
    /// The scene the player is in.
    #[serde(default)]
    pub current_scene_id: Option<String>,
    /// The scene the player came from.
    #[serde(default)]
    pub previous_scene_id: Option<String>,
    /// Achievement status by id.
    #[serde(default)]
    pub achievements: BTreeMap<String, AchievementState>,
    /// The ending reached, once the story is over.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ending: Option<String>,
    /// Playthrough and save bookkeeping.
    pub metadata: SaveMetadata,
}

impl GameState {
    /// A fresh state for a new game: stats at their initial values, every
    /// achievement locked, empty inventory.
    pub fn new_game(catalog: &Catalog, inventory_capacity: usize, metadata: SaveMetadata) -> Self {
        let stats = catalog
            .stats()
            .iter()
            .map(|s| (s.id.clone(), StatValue::new(s.initial, s.min, s.max)))
            .collect();
        let achievements = catalog
            .achievements()
            .iter()
            .map(|a| (a.id.clone(), AchievementState::default()))
            .collect();

        Self {
            flags: BTreeMap::new(),
            variables: BTreeMap::new(),
            stats,
            inventory: Inventory::new(inventory_capacity),
            current_scene_id: None,
            previous_scene_id: None,
            achievements,
            ending: None,
            metadata,
        }
    }

    /// Value of a flag; absent flags are false.
    pub fn flag(&self, name: &str) -> bool {
        self.flags.get(name).copied().unwrap_or(false)
    }

    /// Value of a variable, if set.
    pub fn variable(&self, name: &str) -> Option<&Scalar> {
        self.variables.get(name)
    }

    /// Value of a stat, if defined.
    pub fn stat(&self, id: &str) -> Option<&StatValue> {
        self.stats.get(id)
    }

    /// Status of an achievement, if defined.
    pub fn achievement(&self, id: &str) -> Option<&AchievementState> {
        self.achievements.get(id)
    }

    /// Whether an achievement is unlocked.
    pub fn is_unlocked(&self, id: &str) -> bool {
        self.achievements.get(id).is_some_and(|a| a.unlocked)
    }

    /// Whether the scene is the current one.
    pub fn is_in_scene(&self, scene: &str) -> bool {
        self.current_scene_id.as_deref() == Some(scene)
    }

    /// One-line description for save listings.
    pub fn summary(&self) -> String {
        let scene = self.current_scene_id.as_deref().unwrap_or("-");
        let minutes = self.metadata.playtime_secs / 60;
        match &self.ending {
            Some(ending) => format!("{} | ending: {ending} | {minutes} min", self.metadata.player_name),
            None => format!("{} | {scene} | {minutes} min", self.metadata.player_name),
        }
    }
}
