//! Save slot storage behind a port, with in-memory and file-backed adapters.

mod file;
mod memory;

use chrono::{DateTime, Utc};
use fw_core::GameState;
use thiserror::Error;

pub use file::FileSaves;
pub use memory::MemorySaves;

/// Result type for persistence operations.
pub type PersistenceResult<T> = Result<T, PersistenceError>;

/// Errors raised by a persistence port.
#[derive(Debug, Error)]
pub enum PersistenceError {
    /// The slot holds no save.
    #[error("no save in slot \"{0}\"")]
    NotFound(String),

    /// The slot holds data that does not decode as a game state.
    #[error("save in slot \"{slot}\" is corrupt: {source}")]
    Corrupt {
        /// Slot id.
        slot: String,
        /// Decoding failure.
        source: serde_json::Error,
    },

    /// The slot id contains characters other than letters, digits, `_` and `-`.
    #[error("invalid slot id \"{0}\"")]
    InvalidSlot(String),

    /// The state could not be encoded.
    #[error("cannot encode save: {0}")]
    Encode(#[source] serde_json::Error),

    /// The underlying storage failed.
    #[error("save storage error: {0}")]
    Io(#[from] std::io::Error),
}

/// One row of a save listing.
#[derive(Debug, Clone, PartialEq)]
pub struct SlotSummary {
    /// Slot id.
    pub slot: String,
    /// When the save was written.
    pub timestamp: Option<DateTime<Utc>>,
    /// One-line description of the saved state.
    pub summary: Option<String>,
    /// Whether the slot holds no save.
    pub is_empty: bool,
    /// Why the slot could not be read, if it could not.
    pub error: Option<String>,
}

impl SlotSummary {
    fn empty(slot: &str) -> Self {
        Self {
            slot: slot.to_string(),
            timestamp: None,
            summary: None,
            is_empty: true,
            error: None,
        }
    }
}

/// Stores serialized game states by slot id.
///
/// Every mutating method takes `&mut self`, so writes to a slot are
/// sequenced by whoever owns the port.
pub trait PersistencePort {
    /// Write a state to a slot, replacing what was there.
    fn save(&mut self, slot: &str, state: &GameState) -> PersistenceResult<()>;

    /// Read the state in a slot.
    fn load(&self, slot: &str) -> PersistenceResult<GameState>;

    /// Remove a slot. Returns whether anything was removed.
    fn delete(&mut self, slot: &str) -> PersistenceResult<bool>;

    /// Ids of all occupied slots, sorted.
    fn slot_ids(&self) -> PersistenceResult<Vec<String>>;

    /// Summarize the given slots. Failures are reported per slot, never as a
    /// whole.
    fn list(&self, slots: &[String]) -> Vec<SlotSummary> {
        slots
            .iter()
            .map(|slot| match self.load(slot) {
                Ok(state) => SlotSummary {
                    slot: slot.clone(),
                    timestamp: state.metadata.timestamp,
                    summary: Some(state.summary()),
                    is_empty: false,
                    error: None,
                },
                Err(PersistenceError::NotFound(_)) => SlotSummary::empty(slot),
                Err(e) => SlotSummary {
                    error: Some(e.to_string()),
                    is_empty: false,
                    ..SlotSummary::empty(slot)
                },
            })
            .collect()
    }
}

/// Slot ids must be non-empty and limited to `[A-Za-z0-9_-]`.
pub(crate) fn check_slot(slot: &str) -> PersistenceResult<()> {
    let valid = !slot.is_empty()
        && slot
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if valid {
        Ok(())
    } else {
        Err(PersistenceError::InvalidSlot(slot.to_string()))
    }
}

pub(crate) fn encode(state: &GameState) -> PersistenceResult<String> {
    serde_json::to_string_pretty(state).map_err(PersistenceError::Encode)
}

/// Invalid UTF-8 is reported as corruption like any other malformed JSON.
pub(crate) fn decode(slot: &str, bytes: &[u8]) -> PersistenceResult<GameState> {
    serde_json::from_slice(bytes).map_err(|source| PersistenceError::Corrupt {
        slot: slot.to_string(),
        source,
    })
}
