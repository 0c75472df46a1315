//! Core types for Fabelweg: the content model and the game state model.
//!
//! This crate defines what content authors write (scenes, choices,
//! conditions, effects, and the static item/stat/achievement catalogs) and
//! the mutable [`GameState`] that a playthrough carries. It is independent of
//! the engine. You can build a [`Story`] programmatically or deserialize one
//! from JSON.

/// Static item, stat, and achievement definitions.
pub mod catalog;
/// Condition trees that gate choices, effects, and achievements.
pub mod condition;
/// Effects that mutate game state or request side effects.
pub mod effect;
/// Error types used throughout the crate.
pub mod error;
/// The immutable scene graph store.
pub mod graph;
/// Scenes, choices, and endings.
pub mod scene;
/// The mutable game state of a playthrough.
pub mod state;
/// The story bundle a content author ships.
pub mod story;
/// Scalar values used by variables and comparisons.
pub mod value;

/// Re-export catalog types.
pub use catalog::{
    AchievementDef, AchievementKind, AchievementTrigger, Catalog, ItemDef, StatDef, TriggerType,
};
/// Re-export condition types.
pub use condition::{Comparison, Condition};
/// Re-export effect types.
pub use effect::{Effect, EffectKind, NotificationKind};
/// Re-export error types.
pub use error::{ContentError, ContentResult, InventoryError};
/// Re-export the scene graph store.
pub use graph::SceneGraph;
/// Re-export scene types.
pub use scene::{Choice, EndingDef, Scene};
/// Re-export state types.
pub use state::{AchievementState, GameState, Inventory, SaveMetadata, StatValue};
/// Re-export the story bundle.
pub use story::{LoadedStory, Story};
/// Re-export the scalar value type.
pub use value::Scalar;
