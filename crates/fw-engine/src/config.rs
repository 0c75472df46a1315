//! Configuration for a narrative engine session.

/// Upper bound on numbered save slots.
const MAX_SLOTS: u32 = 99;

/// Configuration for a [`Narrator`](crate::Narrator).
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// RNG seed for reproducible random conditions. `None` seeds from the OS.
    pub seed: Option<u64>,
    /// Save to the autosave slot after every scene change.
    pub autosave: bool,
    /// Name of the autosave slot.
    pub autosave_slot: String,
    /// Number of numbered slots (`slot_1` to `slot_N`).
    pub slot_count: u32,
    /// Player name recorded in save metadata.
    pub player_name: String,
    /// Version string stamped into saves.
    pub version: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            seed: None,
            autosave: true,
            autosave_slot: "autosave".to_string(),
            slot_count: 5,
            player_name: "Player".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

impl EngineConfig {
    /// Set the RNG seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Enable or disable autosave.
    pub fn with_autosave(mut self, autosave: bool) -> Self {
        self.autosave = autosave;
        self
    }

    /// Set the autosave slot name.
    pub fn with_autosave_slot(mut self, slot: impl Into<String>) -> Self {
        self.autosave_slot = slot.into();
        self
    }

    /// Set the number of numbered slots (clamped to 1-99).
    pub fn with_slot_count(mut self, count: u32) -> Self {
        self.slot_count = count.clamp(1, MAX_SLOTS);
        self
    }

    /// Set the player name.
    pub fn with_player_name(mut self, name: impl Into<String>) -> Self {
        self.player_name = name.into();
        self
    }

    /// Set the version stamped into saves.
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    /// The numbered slot ids followed by the autosave slot.
    pub fn slot_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = (1..=self.slot_count).map(|n| format!("slot_{n}")).collect();
        ids.push(self.autosave_slot.clone());
        ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let cfg = EngineConfig::default();
        assert_eq!(cfg.seed, None);
        assert!(cfg.autosave);
        assert_eq!(cfg.autosave_slot, "autosave");
        assert_eq!(cfg.slot_count, 5);
    }

    #[test]
    fn builder_methods() {
        let cfg = EngineConfig::default()
            .with_seed(7)
            .with_autosave(false)
            .with_player_name("Ada")
            .with_version("2.0");
        assert_eq!(cfg.seed, Some(7));
        assert!(!cfg.autosave);
        assert_eq!(cfg.player_name, "Ada");
        assert_eq!(cfg.version, "2.0");
    }

    #[test]
    fn slot_count_clamped() {
        assert_eq!(EngineConfig::default().with_slot_count(0).slot_count, 1);
        assert_eq!(EngineConfig::default().with_slot_count(500).slot_count, 99);
    }

    #[test]
    fn slot_ids_include_autosave() {
        let cfg = EngineConfig::default()
            .with_slot_count(2)
            .with_autosave_slot("quick");
        assert_eq!(cfg.slot_ids(), vec!["slot_1", "slot_2", "quick"]);
    }
}
