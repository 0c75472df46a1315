//! Narrative state machine for Fabelweg.
//!
//! The [`Narrator`] drives the per-scene cycle: it loads a scene, runs its
//! on-enter effects, filters choices through the [`ConditionEvaluator`],
//! hands them to the UI port, and on selection applies the choice's effects
//! through the [`EffectApplicator`] before resolving the next scene.
//! Semantic events flow through a typed queue to the
//! [`AchievementEngine`] and to any subscribed listeners.
//!
//! Every component is constructed explicitly and owned by the narrator; the
//! canonical [`GameState`](fw_core::GameState) lives in the [`StateStore`].

/// Achievement triggers, progress, and unlocks.
pub mod achievements;
/// Ordered effect application with per-effect guards.
pub mod applicator;
/// Engine configuration.
pub mod config;
/// Error types for the engine.
pub mod error;
/// Condition evaluation and the random source it draws from.
pub mod evaluator;
/// Semantic game events and the queue that carries them.
pub mod events;
/// The scene orchestrator.
pub mod narrator;
/// Save slot storage.
pub mod persistence;
/// Ports to the presentation, audio, and localization collaborators.
pub mod ports;
/// The canonical game state and its scoped accessors.
pub mod store;

pub use achievements::AchievementEngine;
pub use applicator::{ApplyOutcome, EffectApplicator, EffectContext};
pub use config::EngineConfig;
pub use error::{EngineError, EngineResult};
pub use evaluator::{ConditionEvaluator, RandomSource, SeededRandom};
pub use events::{EventListener, EventQueue, GameEvent, StatBound};
pub use narrator::{ChoiceOutcome, Narrator, VisitPhase};
pub use persistence::{
    FileSaves, MemorySaves, PersistenceError, PersistencePort, PersistenceResult, SlotSummary,
};
pub use ports::{
    AudioPort, ChoiceView, EndingView, Localizer, NullAudio, Ports, SceneView, StringTable, UiPort,
};
pub use store::StateStore;
