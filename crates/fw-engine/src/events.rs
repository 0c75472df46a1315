//! Semantic game events and the synchronous queue that carries them.

use std::collections::{BTreeMap, VecDeque};
use std::fmt;

use fw_core::{AchievementDef, Scalar, TriggerType};

/// Which end of its range a stat reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatBound {
    /// The minimum.
    Min,
    /// The maximum.
    Max,
}

impl fmt::Display for StatBound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Min => write!(f, "min"),
            Self::Max => write!(f, "max"),
        }
    }
}

/// Something that happened during play.
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    /// A scene was entered and its on-enter effects have run.
    SceneVisited {
        /// The scene entered.
        scene: String,
    },
    /// A choice was made and its effects have run.
    ChoiceMade {
        /// The scene the choice belongs to.
        scene: String,
        /// The choice made.
        choice: String,
    },
    /// Items were added to the inventory.
    ItemAcquired {
        /// Item id.
        item: String,
        /// How many were added.
        quantity: u32,
    },
    /// Items were removed from the inventory.
    ItemRemoved {
        /// Item id.
        item: String,
        /// How many were removed.
        quantity: u32,
    },
    /// A flag changed value.
    FlagChanged {
        /// Flag name.
        flag: String,
        /// New value.
        value: bool,
    },
    /// A variable changed value.
    VariableChanged {
        /// Variable name.
        variable: String,
        /// New value.
        value: Scalar,
    },
    /// A stat's current value changed.
    StatChanged {
        /// Stat id.
        stat: String,
        /// New current value.
        value: i32,
    },
    /// A stat moved onto one of its bounds.
    StatBoundReached {
        /// Stat id.
        stat: String,
        /// Which bound.
        bound: StatBound,
    },
    /// An achievement unlocked.
    AchievementUnlocked {
        /// Achievement id.
        achievement: String,
        /// The achievement's definition.
        definition: Box<AchievementDef>,
    },
    /// The story reached an ending.
    EndingReached {
        /// The ending id.
        ending: String,
    },
    /// The game was written to a save slot.
    GameSaved {
        /// Slot id.
        slot: String,
    },
    /// The game was restored from a save slot.
    GameLoaded {
        /// Slot id.
        slot: String,
    },
}

impl GameEvent {
    /// The achievement trigger type this event matches, if any.
    pub fn trigger_type(&self) -> Option<TriggerType> {
        Some(match self {
            Self::SceneVisited { .. } => TriggerType::SceneVisited,
            Self::ChoiceMade { .. } => TriggerType::ChoiceMade,
            Self::ItemAcquired { .. } => TriggerType::ItemAcquired,
            Self::ItemRemoved { .. } => TriggerType::ItemRemoved,
            Self::FlagChanged { .. } => TriggerType::FlagChanged,
            Self::VariableChanged { .. } => TriggerType::VariableChanged,
            Self::StatChanged { .. } => TriggerType::StatChanged,
            Self::StatBoundReached { .. } => TriggerType::StatBoundReached,
            Self::AchievementUnlocked { .. } => TriggerType::AchievementUnlocked,
            Self::EndingReached { .. } => TriggerType::EndingReached,
            Self::GameSaved { .. } | Self::GameLoaded { .. } => return None,
        })
    }

    /// The payload fields achievement triggers compare against.
    pub fn payload(&self) -> BTreeMap<&'static str, Scalar> {
        let mut fields = BTreeMap::new();
        match self {
            Self::SceneVisited { scene } => {
                fields.insert("scene", Scalar::from(scene.as_str()));
            }
            Self::ChoiceMade { scene, choice } => {
                fields.insert("scene", Scalar::from(scene.as_str()));
                fields.insert("choice", Scalar::from(choice.as_str()));
            }
            Self::ItemAcquired { item, quantity } | Self::ItemRemoved { item, quantity } => {
                fields.insert("item", Scalar::from(item.as_str()));
                fields.insert("quantity", Scalar::Integer(i64::from(*quantity)));
            }
            Self::FlagChanged { flag, value } => {
                fields.insert("flag", Scalar::from(flag.as_str()));
                fields.insert("value", Scalar::Boolean(*value));
            }
            Self::VariableChanged { variable, value } => {
                fields.insert("variable", Scalar::from(variable.as_str()));
                fields.insert("value", value.clone());
            }
            Self::StatChanged { stat, value } => {
                fields.insert("stat", Scalar::from(stat.as_str()));
                fields.insert("value", Scalar::Integer(i64::from(*value)));
            }
            Self::StatBoundReached { stat, bound } => {
                fields.insert("stat", Scalar::from(stat.as_str()));
                fields.insert("bound", Scalar::String(bound.to_string()));
            }
            Self::AchievementUnlocked { achievement, .. } => {
                fields.insert("achievement", Scalar::from(achievement.as_str()));
            }
            Self::EndingReached { ending } => {
                fields.insert("ending", Scalar::from(ending.as_str()));
            }
            Self::GameSaved { slot } | Self::GameLoaded { slot } => {
                fields.insert("slot", Scalar::from(slot.as_str()));
            }
        }
        fields
    }
}

/// Receives every event the narrator dispatches, in order.
pub trait EventListener {
    /// Handle one event.
    fn on_event(&mut self, event: &GameEvent);
}

impl<F: FnMut(&GameEvent)> EventListener for F {
    fn on_event(&mut self, event: &GameEvent) {
        self(event)
    }
}

/// FIFO of events waiting for dispatch, plus a bounded history of the ones
/// already dispatched.
#[derive(Debug, Default)]
pub struct EventQueue {
    pending: VecDeque<GameEvent>,
    history: Vec<GameEvent>,
    max_history: usize,
}

impl EventQueue {
    /// Create a queue keeping at most `max_history` dispatched events (0 = unlimited).
    pub fn new(max_history: usize) -> Self {
        Self {
            pending: VecDeque::new(),
            history: Vec::new(),
            max_history,
        }
    }

    /// Enqueue an event for dispatch.
    pub fn push(&mut self, event: GameEvent) {
        self.pending.push_back(event);
    }

    /// Enqueue several events, keeping their order.
    pub fn extend(&mut self, events: impl IntoIterator<Item = GameEvent>) {
        self.pending.extend(events);
    }

    /// Take the oldest pending event and record it in the history.
    pub fn pop(&mut self) -> Option<GameEvent> {
        let event = self.pending.pop_front()?;
        self.history.push(event.clone());
        if self.max_history > 0 && self.history.len() > self.max_history {
            let drain_count = self.history.len() - self.max_history;
            self.history.drain(..drain_count);
        }
        Some(event)
    }

    /// Number of events waiting for dispatch.
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Dispatched events, oldest first.
    pub fn history(&self) -> &[GameEvent] {
        &self.history
    }

    /// Drop pending events and history.
    pub fn clear(&mut self) {
        self.pending.clear();
        self.history.clear();
    }
}
