//! The scene orchestrator.
//!
//! A [`Narrator`] owns every engine component and runs the visit cycle:
//!
//! ```text
//! Idle -> SceneLoading -> OnEnterEffects -> ChoicesFiltered -> AwaitingInput
//!      -> OnChoiceEffects -> Resolving -> SceneLoading | EndingReached
//! ```
//!
//! Events raised while effects run are queued and dispatched once the
//! effect list has finished, first to the achievement engine and then to
//! subscribed listeners. The UI port is called only after that.

use std::collections::BTreeMap;
use std::sync::Arc;

use fw_core::{
    Catalog, Effect, GameState, LoadedStory, NotificationKind, Scene, SceneGraph, Story,
};
use tracing::{debug, warn};

use crate::achievements::AchievementEngine;
use crate::applicator::{ApplyOutcome, EffectApplicator, EffectContext};
use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};
use crate::evaluator::{ConditionEvaluator, RandomSource, SeededRandom};
use crate::events::{EventListener, EventQueue, GameEvent};
use crate::persistence::{PersistencePort, SlotSummary};
use crate::ports::{AudioPort, ChoiceView, EndingView, Localizer, Ports, SceneView, UiPort};
use crate::store::StateStore;

/// Dispatched events kept for inspection.
const EVENT_HISTORY: usize = 256;

/// Title shown for endings the content does not define.
const DEFAULT_ENDING_TITLE: &str = "The End";

/// Where the narrator is in the visit cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisitPhase {
    /// No scene loaded yet.
    Idle,
    /// Looking up the next scene.
    SceneLoading,
    /// Running the scene's on-enter effects.
    OnEnterEffects,
    /// Evaluating which choices to show.
    ChoicesFiltered,
    /// Waiting for the player to pick a choice.
    AwaitingInput,
    /// Running the picked choice's effects.
    OnChoiceEffects,
    /// Working out where the choice leads.
    Resolving,
    /// The story is over.
    EndingReached,
}

/// Where a choice led.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChoiceOutcome {
    /// A new scene was loaded.
    Moved {
        /// The scene entered.
        scene: String,
    },
    /// The story ended.
    Ended {
        /// The ending reached.
        ending: String,
    },
    /// The current scene was re-filtered without re-entering it.
    Refreshed,
}

/// Drives a story from scene to scene.
pub struct Narrator {
    title: String,
    start: String,
    graph: SceneGraph,
    store: StateStore,
    evaluator: ConditionEvaluator,
    applicator: EffectApplicator,
    achievements: AchievementEngine,
    ui: Box<dyn UiPort>,
    audio: Box<dyn AudioPort>,
    localizer: Box<dyn Localizer>,
    events: EventQueue,
    listeners: Vec<Box<dyn EventListener>>,
    notices: Vec<(String, NotificationKind)>,
    phase: VisitPhase,
    visible: Vec<ChoiceView>,
}

impl std::fmt::Debug for Narrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Narrator")
            .field("title", &self.title)
            .field("phase", &self.phase)
            .field("scene", &self.store.state().current_scene_id)
            .finish_non_exhaustive()
    }
}

impl Narrator {
    /// Wire a narrator for a validated story.
    ///
    /// Nothing is shown until [`new_game`](Self::new_game) or
    /// [`load_game`](Self::load_game) is called.
    pub fn new(
        story: LoadedStory,
        config: EngineConfig,
        ports: Ports,
        saves: Box<dyn PersistencePort>,
    ) -> Self {
        let catalog = Arc::new(story.catalog);
        let rng: Box<dyn RandomSource> = match config.seed {
            Some(seed) => Box::new(SeededRandom::new(seed)),
            None => Box::new(SeededRandom::from_entropy()),
        };
        let store = StateStore::new(
            Arc::clone(&catalog),
            story.inventory_capacity,
            saves,
            config,
        );

        Self {
            title: story.title,
            start: story.start,
            graph: story.graph,
            store,
            evaluator: ConditionEvaluator::new(rng),
            applicator: EffectApplicator,
            achievements: AchievementEngine::new(catalog),
            ui: ports.ui,
            audio: ports.audio,
            localizer: ports.localizer,
            events: EventQueue::new(EVENT_HISTORY),
            listeners: Vec::new(),
            notices: Vec::new(),
            phase: VisitPhase::Idle,
            visible: Vec::new(),
        }
    }

    /// Validate a story and wire a narrator with silent audio and the
    /// story's own string table.
    pub fn from_story(
        story: Story,
        config: EngineConfig,
        ui: Box<dyn UiPort>,
        saves: Box<dyn PersistencePort>,
    ) -> EngineResult<Self> {
        let loaded = story.load()?;
        let ports = Ports::new(ui, loaded.strings.clone());
        Ok(Self::new(loaded, config, ports, saves))
    }

    /// Replace the random source used by `random_chance` conditions.
    pub fn with_random_source(mut self, rng: Box<dyn RandomSource>) -> Self {
        self.evaluator = ConditionEvaluator::new(rng);
        self
    }

    /// Register a listener for every dispatched event.
    pub fn subscribe(&mut self, listener: impl EventListener + 'static) {
        self.listeners.push(Box::new(listener));
    }

    // --- Accessors ---

    /// Story title.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Current phase of the visit cycle.
    pub fn phase(&self) -> VisitPhase {
        self.phase
    }

    /// Read-only view of the game state.
    pub fn state(&self) -> &GameState {
        self.store.state()
    }

    /// The scene graph.
    pub fn graph(&self) -> &SceneGraph {
        &self.graph
    }

    /// Item, stat, and achievement definitions.
    pub fn catalog(&self) -> &Catalog {
        self.store.catalog()
    }

    /// The achievement engine.
    pub fn achievements(&self) -> &AchievementEngine {
        &self.achievements
    }

    /// The scene the player is in.
    pub fn current_scene(&self) -> Option<&Scene> {
        self.store
            .state()
            .current_scene_id
            .as_deref()
            .and_then(|id| self.graph.get(id))
    }

    /// Choices shown for the current scene.
    pub fn visible_choices(&self) -> &[ChoiceView] {
        &self.visible
    }

    /// Recently dispatched events, oldest first.
    pub fn event_history(&self) -> &[GameEvent] {
        self.events.history()
    }

    /// Whether the story has ended.
    pub fn is_finished(&self) -> bool {
        self.phase == VisitPhase::EndingReached
    }

    /// Resolve a text key with the current state's variables, stats, and
    /// player name available as placeholders.
    pub fn localize(&self, key: &str) -> String {
        self.localizer.get_string(key, &self.text_vars())
    }

    fn text_vars(&self) -> BTreeMap<String, String> {
        let state = self.store.state();
        let mut vars: BTreeMap<String, String> = state
            .stats
            .iter()
            .map(|(id, stat)| (id.clone(), stat.current.to_string()))
            .collect();
        vars.extend(
            state
                .variables
                .iter()
                .map(|(name, value)| (name.clone(), value.to_string())),
        );
        vars.insert("player_name".to_string(), state.metadata.player_name.clone());
        vars
    }

    // --- The visit cycle ---

    /// Start a fresh game at the story's first scene.
    pub fn new_game(&mut self) -> EngineResult<()> {
        self.store.reset();
        self.events.clear();
        self.visible.clear();
        self.notices.clear();
        self.phase = VisitPhase::Idle;
        debug!(title = %self.title, "new game");
        let start = self.start.clone();
        self.load_scene(&start)
    }

    /// Enter a scene: run its on-enter effects, play its music, filter its
    /// choices, render it, and autosave.
    ///
    /// An unknown id is reported to the UI and leaves the player where they
    /// were.
    pub fn load_scene(&mut self, id: &str) -> EngineResult<()> {
        let resume = self.phase;
        self.phase = VisitPhase::SceneLoading;
        let Some(scene) = self.graph.get(id).cloned() else {
            warn!(scene = %id, "scene not found");
            self.phase = match resume {
                VisitPhase::Idle | VisitPhase::EndingReached => resume,
                _ if self.current_scene().is_some() => VisitPhase::AwaitingInput,
                _ => VisitPhase::Idle,
            };
            self.ui
                .show_notification(&format!("Scene not found: {id}"), NotificationKind::Error);
            return Err(EngineError::SceneNotFound(id.to_string()));
        };

        debug!(scene = %id, "entering scene");
        self.store.enter_scene(id);

        self.phase = VisitPhase::OnEnterEffects;
        let outcome = self.apply_effects(&scene.on_enter);
        if let Some(track) = &scene.music {
            self.audio.play_music(track);
        }
        self.emit(GameEvent::SceneVisited {
            scene: id.to_string(),
        });
        self.dispatch_events();
        self.queue_outcome(outcome);

        self.show_scene(&scene);
        self.autosave();
        Ok(())
    }

    /// Pick a choice of the current scene.
    ///
    /// The choice's conditions are checked again first, since the state may
    /// have changed since the choices were shown. A choice that no longer
    /// qualifies is refused without running any effect.
    pub fn select_choice(&mut self, choice_id: &str) -> EngineResult<ChoiceOutcome> {
        if self.phase != VisitPhase::AwaitingInput {
            return Err(EngineError::NoActiveScene);
        }
        let scene = self.current_scene().cloned().ok_or(EngineError::NoActiveScene)?;
        let Some(choice) = scene.choice(choice_id).cloned() else {
            self.ui.show_notification(
                &format!("No such choice: {choice_id}"),
                NotificationKind::Warning,
            );
            return Err(EngineError::ChoiceNotFound(choice_id.to_string()));
        };

        if !self.evaluator.evaluate(&choice.conditions, self.store.state()) {
            debug!(scene = %scene.id, choice = %choice.id, "choice no longer available");
            self.ui.show_notification(
                "That choice is no longer available.",
                NotificationKind::Warning,
            );
            self.visible = self.filter_choices(&scene);
            self.ui.display_choices(&self.visible);
            return Err(EngineError::NoLongerAvailable(choice_id.to_string()));
        }

        self.phase = VisitPhase::OnChoiceEffects;
        let outcome = self.apply_effects(&choice.effects);
        self.emit(GameEvent::ChoiceMade {
            scene: scene.id.clone(),
            choice: choice.id.clone(),
        });
        self.dispatch_events();
        self.queue_outcome(outcome);

        self.phase = VisitPhase::Resolving;
        if let Some(target) = &choice.target {
            if self.graph.is_scene(target) {
                self.load_scene(target)?;
                return Ok(ChoiceOutcome::Moved {
                    scene: target.clone(),
                });
            }
            self.enter_ending(target);
            return Ok(ChoiceOutcome::Ended {
                ending: target.clone(),
            });
        }
        if choice.ends_game {
            let ending = choice.ending.clone().unwrap_or_else(|| choice.id.clone());
            self.enter_ending(&ending);
            return Ok(ChoiceOutcome::Ended { ending });
        }
        self.show_scene(&scene);
        Ok(ChoiceOutcome::Refreshed)
    }

    fn show_scene(&mut self, scene: &Scene) {
        self.phase = VisitPhase::ChoicesFiltered;
        self.visible = self.filter_choices(scene);

        let view = SceneView {
            id: scene.id.clone(),
            text: self.localize(&scene.text),
            background: scene.background.clone(),
        };
        self.ui.render_scene(&view);
        self.ui.display_choices(&self.visible);
        self.flush_notices();
        self.phase = VisitPhase::AwaitingInput;
    }

    fn filter_choices(&mut self, scene: &Scene) -> Vec<ChoiceView> {
        let vars = self.text_vars();
        let mut views = Vec::new();
        for choice in &scene.choices {
            let enabled = self.evaluator.evaluate(&choice.conditions, self.store.state());
            if enabled || choice.show_if_condition_false {
                views.push(ChoiceView {
                    id: choice.id.clone(),
                    text: self.localizer.get_string(&choice.text, &vars),
                    enabled,
                });
            }
        }
        views
    }

    fn enter_ending(&mut self, id: &str) {
        debug!(ending = %id, "ending reached");
        self.store.set_ending(id);
        self.phase = VisitPhase::EndingReached;
        self.visible.clear();
        self.emit(GameEvent::EndingReached {
            ending: id.to_string(),
        });
        self.dispatch_events();
        self.show_ending(id);
    }

    fn show_ending(&mut self, id: &str) {
        let view = match self.graph.ending(id) {
            Some(def) => EndingView {
                id: id.to_string(),
                title: self.localize(&def.title),
                text: self.localize(&def.text),
            },
            None => EndingView {
                id: id.to_string(),
                title: self.localize(DEFAULT_ENDING_TITLE),
                text: String::new(),
            },
        };
        self.ui.show_ending(&view);
        self.flush_notices();
    }

    // --- Effects and events ---

    fn apply_effects(&mut self, effects: &[Effect]) -> ApplyOutcome {
        let mut ctx = EffectContext {
            store: &mut self.store,
            evaluator: &mut self.evaluator,
            achievements: &self.achievements,
            audio: self.audio.as_mut(),
        };
        self.applicator.apply(effects, &mut ctx)
    }

    /// Queue an event after everything the store has recorded so far.
    fn emit(&mut self, event: GameEvent) {
        self.events.extend(self.store.take_events());
        self.events.push(event);
    }

    /// Deliver queued events until none are left. Unlocks raised while
    /// handling an event are queued behind it.
    fn dispatch_events(&mut self) {
        loop {
            self.events.extend(self.store.take_events());
            let Some(event) = self.events.pop() else {
                break;
            };
            self.achievements
                .trigger_event(&event, &mut self.store, &mut self.evaluator);
            if let GameEvent::AchievementUnlocked { definition, .. } = &event {
                let name = self.localize(&definition.name);
                self.notices.push((
                    format!("Achievement unlocked: {name}"),
                    NotificationKind::Achievement,
                ));
            }
            for listener in &mut self.listeners {
                listener.on_event(&event);
            }
        }
    }

    fn queue_outcome(&mut self, outcome: ApplyOutcome) {
        if let Some(message) = outcome.message {
            let text = self.localize(&message);
            self.notices
                .push((text, outcome.message_kind.unwrap_or_default()));
        }
    }

    fn flush_notices(&mut self) {
        for (message, kind) in std::mem::take(&mut self.notices) {
            self.ui.show_notification(&message, kind);
        }
    }

    // --- Saves ---

    fn autosave(&mut self) {
        if !self.store.autosave_enabled() {
            return;
        }
        match self.store.auto_save() {
            Ok(_) => {
                if let Some(slot) = self.store.state().metadata.slot_id.clone() {
                    self.emit(GameEvent::GameSaved { slot });
                    self.dispatch_events();
                }
            }
            Err(e) => {
                warn!(error = %e, "autosave failed");
                self.ui
                    .show_notification(&format!("Autosave failed: {e}"), NotificationKind::Warning);
            }
        }
    }

    /// Save to a slot.
    pub fn save_game(&mut self, slot: &str) -> EngineResult<()> {
        if let Err(e) = self.store.save_game(slot) {
            self.ui
                .show_notification(&format!("Save failed: {e}"), NotificationKind::Error);
            return Err(e.into());
        }
        self.emit(GameEvent::GameSaved {
            slot: slot.to_string(),
        });
        self.dispatch_events();
        self.ui
            .show_notification(&format!("Saved to {slot}."), NotificationKind::Success);
        Ok(())
    }

    /// Restore a slot and show where it left off, without re-running the
    /// scene's on-enter effects. On failure nothing changes.
    pub fn load_game(&mut self, slot: &str) -> EngineResult<()> {
        if let Err(e) = self.store.load_game(slot) {
            self.ui
                .show_notification(&format!("Load failed: {e}"), NotificationKind::Error);
            return Err(e.into());
        }
        self.visible.clear();
        self.notices.clear();
        self.emit(GameEvent::GameLoaded {
            slot: slot.to_string(),
        });
        self.dispatch_events();
        self.notices
            .push((format!("Loaded {slot}."), NotificationKind::Success));

        if let Some(ending) = self.store.state().ending.clone() {
            self.phase = VisitPhase::EndingReached;
            self.show_ending(&ending);
            return Ok(());
        }
        let scene = self
            .store
            .state()
            .current_scene_id
            .as_deref()
            .and_then(|id| self.graph.get(id))
            .cloned();
        match scene {
            Some(scene) => self.show_scene(&scene),
            None => {
                warn!(slot, "saved scene is not in this story, restarting at the first scene");
                self.phase = VisitPhase::Idle;
                let start = self.start.clone();
                self.load_scene(&start)?;
            }
        }
        Ok(())
    }

    /// Summaries of all save slots.
    pub fn list_saves(&self) -> Vec<SlotSummary> {
        self.store.list_saves()
    }

    /// Delete a slot after the player confirms. Returns whether a save was
    /// removed.
    pub fn delete_save(&mut self, slot: &str) -> EngineResult<bool> {
        if !self.ui.request_confirmation(&format!("Delete save {slot}?")) {
            return Ok(false);
        }
        let removed = self.store.delete_save(slot)?;
        if removed {
            self.ui
                .show_notification(&format!("Deleted {slot}."), NotificationKind::Info);
        }
        Ok(removed)
    }
}
