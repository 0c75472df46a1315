use std::collections::BTreeMap;

use fw_core::GameState;

use super::{PersistenceError, PersistencePort, PersistenceResult, check_slot, decode, encode};

/// Keeps saves in memory as encoded JSON.
///
/// Saves go through the same encoding as [`FileSaves`](super::FileSaves), so
/// a state that round-trips here round-trips on disk.
#[derive(Debug, Clone, Default)]
pub struct MemorySaves {
    slots: BTreeMap<String, String>,
}

impl MemorySaves {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Put raw text into a slot, bypassing encoding.
    pub fn insert_raw(&mut self, slot: impl Into<String>, text: impl Into<String>) {
        self.slots.insert(slot.into(), text.into());
    }

    /// The raw text in a slot.
    pub fn raw(&self, slot: &str) -> Option<&str> {
        self.slots.get(slot).map(String::as_str)
    }
}

impl PersistencePort for MemorySaves {
    fn save(&mut self, slot: &str, state: &GameState) -> PersistenceResult<()> {
        check_slot(slot)?;
        let text = encode(state)?;
        self.slots.insert(slot.to_string(), text);
        Ok(())
    }

    fn load(&self, slot: &str) -> PersistenceResult<GameState> {
        check_slot(slot)?;
        let text = self
            .slots
            .get(slot)
            .ok_or_else(|| PersistenceError::NotFound(slot.to_string()))?;
        decode(slot, text.as_bytes())
    }

    fn delete(&mut self, slot: &str) -> PersistenceResult<bool> {
        check_slot(slot)?;
        Ok(self.slots.remove(slot).is_some())
    }

    fn slot_ids(&self) -> PersistenceResult<Vec<String>> {
        Ok(self.slots.keys().cloned().collect())
    }
}
