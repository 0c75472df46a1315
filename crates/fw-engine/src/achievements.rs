//! Achievement triggers, progress, and unlocks.

use std::cmp::Ordering;
use std::sync::Arc;

use chrono::Utc;
use fw_core::{AchievementDef, AchievementKind, Catalog, GameState};
use tracing::{debug, warn};

use crate::evaluator::ConditionEvaluator;
use crate::events::GameEvent;
use crate::store::StateStore;

/// Matches events against achievement triggers and records unlocks.
#[derive(Debug, Clone)]
pub struct AchievementEngine {
    catalog: Arc<Catalog>,
}

impl AchievementEngine {
    /// Create an engine over the achievements of a catalog.
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self { catalog }
    }

    /// Feed one event to every locked achievement listening for its type.
    ///
    /// Payload fields named by the trigger must equal the event's, and the
    /// trigger's game state conditions must hold. Instant achievements
    /// unlock; progress achievements advance by one. Returns the ids that
    /// unlocked, in catalog order.
    pub fn trigger_event(
        &self,
        event: &GameEvent,
        store: &mut StateStore,
        evaluator: &mut ConditionEvaluator,
    ) -> Vec<String> {
        let Some(kind) = event.trigger_type() else {
            return Vec::new();
        };
        let payload = event.payload();
        let mut unlocked = Vec::new();

        for def in self.catalog.achievements() {
            let Some(trigger) = &def.trigger else {
                continue;
            };
            if trigger.event != kind || store.state().is_unlocked(&def.id) {
                continue;
            }
            let fields_match = trigger.fields.iter().all(|(key, expected)| {
                payload
                    .get(key.as_str())
                    .is_some_and(|actual| actual.compare(expected) == Some(Ordering::Equal))
            });
            if !fields_match || !evaluator.evaluate(&trigger.game_state_conditions, store.state())
            {
                continue;
            }

            let done = match def.kind {
                AchievementKind::Instant => self.unlock_achievement(&def.id, false, store),
                AchievementKind::Progress { .. } => self.progress_achievement(&def.id, 1, store),
            };
            if done {
                unlocked.push(def.id.clone());
            }
        }
        unlocked
    }

    /// Unlock an achievement. Returns whether an unlock event was emitted.
    ///
    /// Unlocking is idempotent: an unlocked achievement stays as it is unless
    /// `force` is set, in which case the event is emitted again but the
    /// original unlock date is kept.
    pub fn unlock_achievement(&self, id: &str, force: bool, store: &mut StateStore) -> bool {
        let Some(def) = self.catalog.achievement(id) else {
            warn!(achievement = %id, "unlock of undefined achievement");
            return false;
        };
        let Some(entry) = store.achievement_mut(id) else {
            return false;
        };
        if entry.unlocked && !force {
            return false;
        }
        if !entry.unlocked {
            entry.unlocked = true;
            entry.unlocked_at = Some(Utc::now());
        }
        entry.progress = def.kind.target();
        debug!(achievement = %id, force, "achievement unlocked");
        store.emit(GameEvent::AchievementUnlocked {
            achievement: id.to_string(),
            definition: Box::new(def.clone()),
        });
        true
    }

    /// Add progress, clamped at the target. Reaching the target unlocks.
    /// Returns whether the achievement unlocked.
    pub fn progress_achievement(&self, id: &str, amount: u32, store: &mut StateStore) -> bool {
        let Some(def) = self.catalog.achievement(id) else {
            warn!(achievement = %id, "progress on undefined achievement");
            return false;
        };
        let target = def.kind.target();
        let Some(entry) = store.achievement_mut(id) else {
            return false;
        };
        if entry.unlocked || amount == 0 {
            return false;
        }
        entry.progress = entry.progress.saturating_add(amount).min(target);
        debug!(achievement = %id, progress = entry.progress, target, "achievement progress");
        if entry.progress >= target {
            return self.unlock_achievement(id, false, store);
        }
        false
    }

    /// Achievements to show in a listing: everything not hidden, plus hidden
    /// ones already unlocked.
    pub fn visible<'a>(&'a self, state: &'a GameState) -> impl Iterator<Item = &'a AchievementDef> {
        self.catalog
            .achievements()
            .iter()
            .filter(move |def| !def.hidden || state.is_unlocked(&def.id))
    }

    /// `(unlocked, total)` achievement counts.
    pub fn unlocked_count(&self, state: &GameState) -> (usize, usize) {
        let total = self.catalog.achievements().len();
        let unlocked = self
            .catalog
            .achievements()
            .iter()
            .filter(|def| state.is_unlocked(&def.id))
            .count();
        (unlocked, total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::persistence::MemorySaves;
    use fw_core::{AchievementTrigger, Comparison, Condition, ItemDef, StatDef, TriggerType};

    fn setup() -> (AchievementEngine, StateStore, ConditionEvaluator) {
        let mut hidden = AchievementDef::new("secret", "Secret")
            .with_trigger(AchievementTrigger::on(TriggerType::FlagChanged).with_field("flag", "secret"));
        hidden.hidden = true;
        let catalog = Arc::new(
            Catalog::new(
                vec![ItemDef::new("gem", "Gem")],
                vec![StatDef::new("health", 0, 10, 10)],
                vec![
                    AchievementDef::new("explorer", "Explorer").with_trigger(
                        AchievementTrigger::on(TriggerType::SceneVisited)
                            .with_field("scene", "tower"),
                    ),
                    AchievementDef::new("collector", "Collector")
                        .with_target(3)
                        .with_trigger(AchievementTrigger::on(TriggerType::ItemAcquired)),
                    AchievementDef::new("survivor", "Survivor").with_trigger(
                        AchievementTrigger::on(TriggerType::SceneVisited).with_condition(
                            Condition::stat("health", Comparison::LessOrEqual, 2),
                        ),
                    ),
                    AchievementDef::new("completionist", "Completionist")
                        .with_target(2)
                        .with_trigger(AchievementTrigger::on(TriggerType::AchievementUnlocked)),
                    hidden,
                ],
            )
            .unwrap(),
        );
        let store = StateStore::new(
            Arc::clone(&catalog),
            10,
            Box::new(MemorySaves::new()),
            EngineConfig::default(),
        );
        (AchievementEngine::new(catalog), store, ConditionEvaluator::seeded(1))
    }

    fn visited(scene: &str) -> GameEvent {
        GameEvent::SceneVisited {
            scene: scene.to_string(),
        }
    }

    #[test]
    fn field_match_required() {
        let (engine, mut store, mut eval) = setup();
        assert!(engine.trigger_event(&visited("cellar"), &mut store, &mut eval).is_empty());
        assert_eq!(
            engine.trigger_event(&visited("tower"), &mut store, &mut eval),
            vec!["explorer"]
        );
        assert!(store.state().is_unlocked("explorer"));
    }

    #[test]
    fn game_state_conditions_gate_trigger() {
        let (engine, mut store, mut eval) = setup();
        engine.trigger_event(&visited("cellar"), &mut store, &mut eval);
        assert!(!store.state().is_unlocked("survivor"));

        store.modify_stat("health", -8, false, false);
        let unlocked = engine.trigger_event(&visited("cellar"), &mut store, &mut eval);
        assert_eq!(unlocked, vec!["survivor"]);
    }

    #[test]
    fn progress_accumulates_and_clamps() {
        let (engine, mut store, mut eval) = setup();
        let event = GameEvent::ItemAcquired {
            item: "gem".into(),
            quantity: 1,
        };
        engine.trigger_event(&event, &mut store, &mut eval);
        engine.trigger_event(&event, &mut store, &mut eval);
        assert_eq!(store.achievement("collector").unwrap().progress, 2);
        assert_eq!(
            engine.trigger_event(&event, &mut store, &mut eval),
            vec!["collector"]
        );
        engine.trigger_event(&event, &mut store, &mut eval);
        assert_eq!(store.achievement("collector").unwrap().progress, 3);

        assert!(!engine.progress_achievement("collector", 5, &mut store));
        assert_eq!(store.achievement("collector").unwrap().progress, 3);
    }

    #[test]
    fn direct_progress_unlocks_at_target() {
        let (engine, mut store, _) = setup();
        assert!(!engine.progress_achievement("collector", 2, &mut store));
        assert!(engine.progress_achievement("collector", 10, &mut store));
        assert_eq!(store.achievement("collector").unwrap().progress, 3);
    }

    #[test]
    fn unlock_is_idempotent() {
        let (engine, mut store, _) = setup();
        assert!(engine.unlock_achievement("explorer", false, &mut store));
        let first = store.achievement("explorer").unwrap().unlocked_at;
        assert!(!engine.unlock_achievement("explorer", false, &mut store));

        let unlocks = store
            .take_events()
            .into_iter()
            .filter(|e| matches!(e, GameEvent::AchievementUnlocked { .. }))
            .count();
        assert_eq!(unlocks, 1);

        assert!(engine.unlock_achievement("explorer", true, &mut store));
        assert_eq!(store.achievement("explorer").unwrap().unlocked_at, first);
        assert_eq!(store.take_events().len(), 1);
    }

    #[test]
    fn unlock_event_carries_definition() {
        let (engine, mut store, _) = setup();
        engine.unlock_achievement("explorer", false, &mut store);
        match store.take_events().as_slice() {
            [GameEvent::AchievementUnlocked {
                achievement,
                definition,
            }] => {
                assert_eq!(achievement, "explorer");
                assert_eq!(definition.name, "Explorer");
            }
            other => panic!("expected one unlock event, got {other:?}"),
        }
    }

    #[test]
    fn unknown_achievement_is_ignored() {
        let (engine, mut store, _) = setup();
        assert!(!engine.unlock_achievement("ghost", false, &mut store));
        assert!(!engine.progress_achievement("ghost", 1, &mut store));
    }

    #[test]
    fn unlocks_chain_through_achievement_events() {
        let (engine, mut store, mut eval) = setup();
        engine.unlock_achievement("explorer", false, &mut store);
        engine.unlock_achievement("survivor", false, &mut store);
        for event in store.take_events() {
            engine.trigger_event(&event, &mut store, &mut eval);
        }
        assert!(store.state().is_unlocked("completionist"));
    }

    #[test]
    fn hidden_achievements_are_listed_once_unlocked() {
        let (engine, mut store, mut eval) = setup();
        assert_eq!(engine.visible(store.state()).count(), 4);
        store.set_flag("secret", true);
        for event in store.take_events() {
            engine.trigger_event(&event, &mut store, &mut eval);
        }
        assert_eq!(engine.visible(store.state()).count(), 5);
        assert_eq!(engine.unlocked_count(store.state()), (1, 5));
    }
}
