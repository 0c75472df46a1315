//! The canonical game state and the only way to change it.
//!
//! Every mutation goes through a [`StateStore`] method that keeps the state's
//! invariants and records the semantic events it caused. Readers get a
//! `&GameState` and nothing more.

use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use fw_core::{
    AchievementState, Catalog, GameState, InventoryError, SaveMetadata, Scalar, StatValue,
};
use tracing::{debug, warn};

use crate::config::EngineConfig;
use crate::events::{GameEvent, StatBound};
use crate::persistence::{PersistencePort, PersistenceResult, SlotSummary};

/// Owns the game state of one playthrough and the port it is saved through.
pub struct StateStore {
    state: GameState,
    catalog: Arc<Catalog>,
    inventory_capacity: usize,
    saves: Box<dyn PersistencePort>,
    config: EngineConfig,
    events: Vec<GameEvent>,
    clock: Instant,
}

impl std::fmt::Debug for StateStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateStore")
            .field("state", &self.state)
            .field("pending_events", &self.events.len())
            .finish_non_exhaustive()
    }
}

impl StateStore {
    /// Create a store holding a fresh game.
    pub fn new(
        catalog: Arc<Catalog>,
        inventory_capacity: usize,
        saves: Box<dyn PersistencePort>,
        config: EngineConfig,
    ) -> Self {
        let state = Self::fresh_state(&catalog, inventory_capacity, &config);
        Self {
            state,
            catalog,
            inventory_capacity,
            saves,
            config,
            events: Vec::new(),
            clock: Instant::now(),
        }
    }

    fn fresh_state(catalog: &Catalog, capacity: usize, config: &EngineConfig) -> GameState {
        let metadata = SaveMetadata::new(config.player_name.clone(), config.version.clone());
        GameState::new_game(catalog, capacity, metadata)
    }

    /// Replace the state with a fresh game.
    pub fn reset(&mut self) {
        self.state = Self::fresh_state(&self.catalog, self.inventory_capacity, &self.config);
        self.events.clear();
        self.clock = Instant::now();
        debug!(playthrough = %self.state.metadata.playthrough, "new game state");
    }

    /// Read-only view of the state.
    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// The static definitions the state refers to.
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    // --- Flags and variables ---

    /// Value of a flag; absent flags are false.
    pub fn flag(&self, name: &str) -> bool {
        self.state.flag(name)
    }

    /// Set a flag. Returns whether its value changed.
    pub fn set_flag(&mut self, name: &str, value: bool) -> bool {
        let changed = self.state.flag(name) != value;
        self.state.flags.insert(name.to_string(), value);
        if changed {
            self.emit(GameEvent::FlagChanged {
                flag: name.to_string(),
                value,
            });
        }
        changed
    }

    /// Invert a flag. Returns the new value.
    pub fn toggle_flag(&mut self, name: &str) -> bool {
        let value = !self.state.flag(name);
        self.set_flag(name, value);
        value
    }

    /// Value of a variable, if set.
    pub fn variable(&self, name: &str) -> Option<&Scalar> {
        self.state.variable(name)
    }

    /// Set a variable.
    pub fn set_variable(&mut self, name: &str, value: Scalar) {
        if self.state.variable(name) == Some(&value) {
            return;
        }
        self.state.variables.insert(name.to_string(), value.clone());
        self.emit(GameEvent::VariableChanged {
            variable: name.to_string(),
            value,
        });
    }

    /// Add a numeric amount to a variable; missing variables start at 0.
    ///
    /// Returns the new value, or `None` (leaving the variable alone) when
    /// either side is not numeric.
    pub fn modify_variable(&mut self, name: &str, amount: &Scalar) -> Option<Scalar> {
        let current = self.state.variable(name).cloned().unwrap_or_default();
        let next = current.checked_add(amount)?;
        self.set_variable(name, next.clone());
        Some(next)
    }

    // --- Stats ---

    /// Live value of a stat.
    pub fn stat(&self, id: &str) -> Option<StatValue> {
        self.state.stat(id).copied()
    }

    /// Set a stat's current value, clamped into its range unless an override
    /// lets it pass a bound. Returns `None` for an undefined stat.
    ///
    /// Moving onto a bound from off it emits [`GameEvent::StatBoundReached`];
    /// staying on the bound does not emit again.
    pub fn set_stat_value(
        &mut self,
        id: &str,
        value: i32,
        allow_over_max: bool,
        allow_under_min: bool,
    ) -> Option<StatValue> {
        let prev = *self.state.stats.get(id)?;
        let mut current = value;
        if !allow_over_max {
            current = current.min(prev.max);
        }
        if !allow_under_min {
            current = current.max(prev.min);
        }
        let next = StatValue { current, ..prev };
        self.state.stats.insert(id.to_string(), next);

        if next.current != prev.current {
            self.emit(GameEvent::StatChanged {
                stat: id.to_string(),
                value: next.current,
            });
        }
        if next.is_at_min() && !prev.is_at_min() {
            self.emit(GameEvent::StatBoundReached {
                stat: id.to_string(),
                bound: StatBound::Min,
            });
        }
        if next.is_at_max() && !prev.is_at_max() {
            self.emit(GameEvent::StatBoundReached {
                stat: id.to_string(),
                bound: StatBound::Max,
            });
        }
        Some(next)
    }

    /// Change a stat by a delta. Same clamping and events as
    /// [`set_stat_value`](Self::set_stat_value).
    pub fn modify_stat(
        &mut self,
        id: &str,
        delta: i32,
        allow_over_max: bool,
        allow_under_min: bool,
    ) -> Option<StatValue> {
        let current = self.state.stat(id)?.current;
        self.set_stat_value(
            id,
            current.saturating_add(delta),
            allow_over_max,
            allow_under_min,
        )
    }

    // --- Inventory ---

    /// Whether at least one of an item is held.
    pub fn has_item(&self, item: &str) -> bool {
        self.state.inventory.contains(item)
    }

    /// How many of an item are held.
    pub fn item_count(&self, item: &str) -> u32 {
        self.state.inventory.count(item)
    }

    /// Add items. Returns the new stack size.
    pub fn add_item(&mut self, item: &str, quantity: u32) -> Result<u32, InventoryError> {
        let stackable = self
            .catalog
            .item(item)
            .ok_or_else(|| InventoryError::UnknownItem(item.to_string()))?
            .stackable;
        let count = self.state.inventory.add(item, quantity, stackable)?;
        self.emit(GameEvent::ItemAcquired {
            item: item.to_string(),
            quantity,
        });
        Ok(count)
    }

    /// Remove up to `quantity` items. Returns how many were removed.
    pub fn remove_item(&mut self, item: &str, quantity: u32) -> u32 {
        let removed = self.state.inventory.remove(item, quantity);
        if removed > 0 {
            self.emit(GameEvent::ItemRemoved {
                item: item.to_string(),
                quantity: removed,
            });
        }
        removed
    }

    // --- Achievements ---

    /// Status of an achievement.
    pub fn achievement(&self, id: &str) -> Option<&AchievementState> {
        self.state.achievement(id)
    }

    pub(crate) fn achievement_mut(&mut self, id: &str) -> Option<&mut AchievementState> {
        if self.catalog.achievement(id).is_none() {
            return None;
        }
        Some(self.state.achievements.entry(id.to_string()).or_default())
    }

    // --- Scene position ---

    pub(crate) fn enter_scene(&mut self, id: &str) {
        self.state.previous_scene_id = self.state.current_scene_id.replace(id.to_string());
        self.state.ending = None;
    }

    pub(crate) fn set_ending(&mut self, ending: &str) {
        self.state.ending = Some(ending.to_string());
    }

    // --- Events ---

    pub(crate) fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Take the events recorded since the last call, in order.
    pub(crate) fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    // --- Persistence ---

    /// Whether autosave is enabled.
    pub fn autosave_enabled(&self) -> bool {
        self.config.autosave
    }

    /// Write a stamped copy of the state to a slot. The live metadata and
    /// playtime clock only advance once the write succeeds.
    pub fn save_game(&mut self, slot: &str) -> PersistenceResult<()> {
        let elapsed = self.clock.elapsed().as_secs();
        let mut snapshot = self.state.clone();
        let metadata = &mut snapshot.metadata;
        metadata.slot_id = Some(slot.to_string());
        metadata.timestamp = Some(Utc::now());
        metadata.version = self.config.version.clone();
        metadata.playtime_secs = metadata.playtime_secs.saturating_add(elapsed);

        self.saves.save(slot, &snapshot)?;
        self.state.metadata = snapshot.metadata;
        self.clock = Instant::now();
        debug!(slot, "game saved");
        Ok(())
    }

    /// Save to the autosave slot if autosave is enabled. Returns whether a
    /// save was written.
    pub fn auto_save(&mut self) -> PersistenceResult<bool> {
        if !self.config.autosave {
            return Ok(false);
        }
        let slot = self.config.autosave_slot.clone();
        self.save_game(&slot)?;
        Ok(true)
    }

    /// Replace the state with the one in a slot. On failure the current
    /// state is untouched.
    pub fn load_game(&mut self, slot: &str) -> PersistenceResult<()> {
        let mut loaded = self.saves.load(slot)?;
        if loaded.metadata.version != self.config.version {
            debug!(
                slot,
                saved = %loaded.metadata.version,
                running = %self.config.version,
                "loading save from another version"
            );
        }
        self.reconcile(&mut loaded);
        self.state = loaded;
        self.events.clear();
        self.clock = Instant::now();
        debug!(slot, "game loaded");
        Ok(())
    }

    /// Fill in stats and achievements the catalog defines but an older save
    /// does not know about.
    fn reconcile(&self, state: &mut GameState) {
        for def in self.catalog.stats() {
            state
                .stats
                .entry(def.id.clone())
                .or_insert_with(|| StatValue::new(def.initial, def.min, def.max));
        }
        for def in self.catalog.achievements() {
            state.achievements.entry(def.id.clone()).or_default();
        }
    }

    /// Summaries of the configured slots, followed by any other occupied
    /// slot. Unreadable slots are reported inline.
    pub fn list_saves(&self) -> Vec<SlotSummary> {
        let mut slots = self.config.slot_ids();
        match self.saves.slot_ids() {
            Ok(present) => {
                for slot in present {
                    if !slots.contains(&slot) {
                        slots.push(slot);
                    }
                }
            }
            Err(e) => warn!(error = %e, "cannot enumerate save slots"),
        }
        self.saves.list(&slots)
    }

    /// Remove a slot. Returns whether anything was removed.
    pub fn delete_save(&mut self, slot: &str) -> PersistenceResult<bool> {
        self.saves.delete(slot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::{MemorySaves, PersistenceError};
    use fw_core::{AchievementDef, ItemDef, StatDef};

    fn catalog() -> Arc<Catalog> {
        Arc::new(
            Catalog::new(
                vec![
                    ItemDef::new("coin", "Coin"),
                    ItemDef::new("key", "Key").unique(),
                ],
                vec![StatDef::new("health", 0, 10, 5)],
                vec![AchievementDef::new("brave", "Brave")],
            )
            .unwrap(),
        )
    }

    fn store_with(saves: MemorySaves, config: EngineConfig) -> StateStore {
        StateStore::new(catalog(), 2, Box::new(saves), config)
    }

    fn store() -> StateStore {
        store_with(MemorySaves::new(), EngineConfig::default().with_version("1.0"))
    }

    #[test]
    fn fresh_state() {
        let store = store();
        assert_eq!(store.stat("health").unwrap().current, 5);
        assert!(!store.state().is_unlocked("brave"));
        assert_eq!(store.state().metadata.player_name, "Player");
        assert_eq!(store.state().inventory.capacity(), 2);
    }

    #[test]
    fn flags_emit_on_change_only() {
        let mut store = store();
        assert!(store.set_flag("lamp", true));
        assert!(!store.set_flag("lamp", true));
        assert!(!store.toggle_flag("lamp"));
        assert!(!store.flag("lamp"));

        let events = store.take_events();
        assert_eq!(events.len(), 2);
        assert!(store.take_events().is_empty());
    }

    #[test]
    fn variables() {
        let mut store = store();
        assert_eq!(store.modify_variable("gold", &Scalar::Integer(5)), Some(Scalar::Integer(5)));
        assert_eq!(store.modify_variable("gold", &Scalar::Integer(-2)), Some(Scalar::Integer(3)));
        store.set_variable("name", Scalar::from("Ada"));
        assert_eq!(store.modify_variable("name", &Scalar::Integer(1)), None);
        assert_eq!(store.variable("name"), Some(&Scalar::from("Ada")));
    }

    #[test]
    fn stats_clamp() {
        let mut store = store();
        assert_eq!(store.modify_stat("health", 100, false, false).unwrap().current, 10);
        assert_eq!(store.modify_stat("health", -100, false, false).unwrap().current, 0);
        assert!(store.modify_stat("mana", 1, false, false).is_none());
    }

    #[test]
    fn stat_overrides_pass_bounds() {
        let mut store = store();
        assert_eq!(store.set_stat_value("health", 15, true, false).unwrap().current, 15);
        assert_eq!(store.set_stat_value("health", -3, false, true).unwrap().current, -3);
    }

    #[test]
    fn stat_bound_emitted_once_per_crossing() {
        let mut store = store();
        store.modify_stat("health", -5, false, false);
        store.modify_stat("health", -5, false, false);
        store.modify_stat("health", 1, false, false);
        store.modify_stat("health", -1, false, false);

        let bounds: Vec<_> = store
            .take_events()
            .into_iter()
            .filter(|e| matches!(e, GameEvent::StatBoundReached { .. }))
            .collect();
        assert_eq!(
            bounds,
            vec![
                GameEvent::StatBoundReached {
                    stat: "health".into(),
                    bound: StatBound::Min
                };
                2
            ]
        );
    }

    #[test]
    fn inventory() {
        let mut store = store();
        assert_eq!(store.add_item("coin", 3), Ok(3));
        assert_eq!(store.add_item("key", 1), Ok(1));
        assert_eq!(
            store.add_item("key", 1),
            Err(InventoryError::NotStackable("key".into()))
        );
        assert_eq!(
            store.add_item("sword", 1),
            Err(InventoryError::UnknownItem("sword".into()))
        );
        assert_eq!(store.remove_item("coin", 10), 3);
        assert_eq!(store.remove_item("coin", 1), 0);
        assert!(!store.has_item("coin"));
        assert_eq!(store.item_count("key"), 1);

        let removed: Vec<_> = store
            .take_events()
            .into_iter()
            .filter(|e| matches!(e, GameEvent::ItemRemoved { .. }))
            .collect();
        assert_eq!(removed.len(), 1);
    }

    #[test]
    fn capacity_limits_stacks() {
        let mut store = store_with(MemorySaves::new(), EngineConfig::default());
        store.add_item("coin", 1).unwrap();
        store.add_item("key", 1).unwrap();
        store.remove_item("key", 1);
        store.add_item("key", 1).unwrap();
        assert_eq!(store.state().inventory.len(), 2);
    }

    #[test]
    fn scene_position() {
        let mut store = store();
        store.enter_scene("a");
        store.enter_scene("b");
        assert_eq!(store.state().current_scene_id.as_deref(), Some("b"));
        assert_eq!(store.state().previous_scene_id.as_deref(), Some("a"));
    }

    #[test]
    fn save_stamps_metadata() {
        let mut store = store();
        store.set_flag("lamp", true);
        store.save_game("slot_1").unwrap();
        let meta = &store.state().metadata;
        assert_eq!(meta.slot_id.as_deref(), Some("slot_1"));
        assert!(meta.timestamp.is_some());
        assert_eq!(meta.version, "1.0");
    }

    #[test]
    fn failed_save_leaves_state() {
        let mut store = store();
        store.set_flag("lamp", true);
        let before = store.state().clone();

        assert!(matches!(
            store.save_game("bad slot"),
            Err(PersistenceError::InvalidSlot(_))
        ));
        assert_eq!(store.state(), &before);
        assert_eq!(store.state().metadata.slot_id, None);
        assert_eq!(store.state().metadata.timestamp, None);
    }

    #[test]
    fn save_load_round_trip() {
        let mut store = store();
        store.set_flag("lamp", true);
        store.add_item("coin", 2).unwrap();
        store.modify_stat("health", -2, false, false);
        store.enter_scene("cellar");
        store.save_game("slot_1").unwrap();
        let saved = store.state().clone();

        store.reset();
        assert!(!store.flag("lamp"));
        store.load_game("slot_1").unwrap();
        assert_eq!(store.state(), &saved);
    }

    #[test]
    fn failed_load_leaves_state() {
        let mut saves = MemorySaves::new();
        saves.insert_raw("slot_2", "{ broken");
        let mut store = store_with(saves, EngineConfig::default());
        store.set_flag("lamp", true);
        let before = store.state().clone();

        assert!(matches!(store.load_game("slot_1"), Err(PersistenceError::NotFound(_))));
        assert!(matches!(store.load_game("slot_2"), Err(PersistenceError::Corrupt { .. })));
        assert_eq!(store.state(), &before);
    }

    #[test]
    fn load_fills_missing_catalog_entries() {
        let mut saves = MemorySaves::new();
        let bare = GameState::new_game(
            &Catalog::new(vec![], vec![], vec![]).unwrap(),
            2,
            SaveMetadata::new("Old", "0.1"),
        );
        saves.save("old", &bare).unwrap();
        let mut store = store_with(saves, EngineConfig::default());
        store.load_game("old").unwrap();
        assert_eq!(store.stat("health").unwrap().current, 5);
        assert!(store.achievement("brave").is_some());
    }

    #[test]
    fn autosave_respects_config() {
        let mut store = store_with(MemorySaves::new(), EngineConfig::default().with_autosave(false));
        assert!(!store.auto_save().unwrap());

        let mut store = store_with(MemorySaves::new(), EngineConfig::default());
        assert!(store.auto_save().unwrap());
        assert!(store.load_game("autosave").is_ok());
    }

    #[test]
    fn list_includes_configured_and_extra_slots() {
        let mut saves = MemorySaves::new();
        saves.insert_raw("slot_1", "bad");
        let mut store = store_with(saves, EngineConfig::default().with_slot_count(2));
        store.save_game("named").unwrap();

        let listing = store.list_saves();
        let ids: Vec<_> = listing.iter().map(|s| s.slot.as_str()).collect();
        assert_eq!(ids, vec!["slot_1", "slot_2", "autosave", "named"]);
        assert!(listing[0].error.is_some());
        assert!(listing[1].is_empty);
        assert!(!listing[3].is_empty);

        assert!(store.delete_save("named").unwrap());
        assert_eq!(store.list_saves().len(), 3);
    }

    mod props {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn stat_stays_within_bounds(deltas in prop::collection::vec(any::<i32>(), 0..50)) {
                let mut store = store();
                for delta in deltas {
                    let stat = store.modify_stat("health", delta, false, false).unwrap();
                    prop_assert!(stat.current >= 0 && stat.current <= 10);
                }
            }
        }
    }
}
