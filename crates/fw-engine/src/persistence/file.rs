use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use fw_core::GameState;
use tracing::debug;

use super::{PersistenceError, PersistencePort, PersistenceResult, check_slot, decode, encode};

const EXTENSION: &str = "json";

/// Keeps one JSON file per slot in a directory.
///
/// A save is written to a temporary file first and then renamed over the
/// slot file, so a slot never holds a partial write.
#[derive(Debug, Clone)]
pub struct FileSaves {
    dir: PathBuf,
}

impl FileSaves {
    /// Use `dir` for saves, creating it if needed.
    pub fn new(dir: impl Into<PathBuf>) -> PersistenceResult<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    /// The directory holding the slot files.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, slot: &str) -> PersistenceResult<PathBuf> {
        check_slot(slot)?;
        Ok(self.dir.join(format!("{slot}.{EXTENSION}")))
    }
}

impl PersistencePort for FileSaves {
    fn save(&mut self, slot: &str, state: &GameState) -> PersistenceResult<()> {
        let path = self.path(slot)?;
        let text = encode(state)?;
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, text)?;
        fs::rename(&tmp, &path)?;
        debug!(slot, path = %path.display(), "save written");
        Ok(())
    }

    fn load(&self, slot: &str) -> PersistenceResult<GameState> {
        let path = self.path(slot)?;
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(PersistenceError::NotFound(slot.to_string()));
            }
            Err(e) => return Err(e.into()),
        };
        decode(slot, &bytes)
    }

    fn delete(&mut self, slot: &str) -> PersistenceResult<bool> {
        let path = self.path(slot)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    fn slot_ids(&self) -> PersistenceResult<Vec<String>> {
        let mut ids = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some(EXTENSION) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str())
                && check_slot(stem).is_ok()
            {
                ids.push(stem.to_string());
            }
        }
        ids.sort();
        Ok(ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fw_core::{Catalog, SaveMetadata};

    fn state() -> GameState {
        let catalog = Catalog::new(vec![], vec![], vec![]).unwrap();
        GameState::new_game(&catalog, 5, SaveMetadata::new("Tester", "0.1"))
    }

    #[test]
    fn save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let mut saves = FileSaves::new(dir.path().join("saves")).unwrap();
        let mut s = state();
        s.current_scene_id = Some("cellar".into());

        saves.save("slot_1", &s).unwrap();
        assert!(saves.dir().join("slot_1.json").exists());
        assert!(!saves.dir().join("slot_1.json.tmp").exists());
        assert_eq!(saves.load("slot_1").unwrap(), s);
    }

    #[test]
    fn overwrite_replaces() {
        let dir = tempfile::tempdir().unwrap();
        let mut saves = FileSaves::new(dir.path()).unwrap();
        let mut s = state();
        saves.save("slot_1", &s).unwrap();
        s.flags.insert("second".into(), true);
        saves.save("slot_1", &s).unwrap();
        assert!(saves.load("slot_1").unwrap().flag("second"));
    }

    #[test]
    fn missing_and_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let saves = FileSaves::new(dir.path()).unwrap();
        assert!(matches!(saves.load("slot_9"), Err(PersistenceError::NotFound(_))));

        fs::write(dir.path().join("slot_2.json"), "garbage").unwrap();
        assert!(matches!(saves.load("slot_2"), Err(PersistenceError::Corrupt { .. })));
    }

    #[test]
    fn invalid_utf8_is_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let saves = FileSaves::new(dir.path()).unwrap();
        fs::write(dir.path().join("slot_3.json"), [0xff, 0xfe, 0x7b]).unwrap();

        assert!(matches!(saves.load("slot_3"), Err(PersistenceError::Corrupt { .. })));

        let listing = saves.list(&["slot_3".to_string()]);
        assert!(!listing[0].is_empty);
        assert!(listing[0].error.as_deref().unwrap().contains("corrupt"));
    }

    #[test]
    fn slot_ids_skip_other_files() {
        let dir = tempfile::tempdir().unwrap();
        let mut saves = FileSaves::new(dir.path()).unwrap();
        saves.save("slot_2", &state()).unwrap();
        saves.save("autosave", &state()).unwrap();
        fs::write(dir.path().join("notes.txt"), "hello").unwrap();

        assert_eq!(saves.slot_ids().unwrap(), vec!["autosave", "slot_2"]);
    }

    #[test]
    fn delete_slot() {
        let dir = tempfile::tempdir().unwrap();
        let mut saves = FileSaves::new(dir.path()).unwrap();
        saves.save("slot_1", &state()).unwrap();
        assert!(saves.delete("slot_1").unwrap());
        assert!(!saves.delete("slot_1").unwrap());
        assert!(matches!(
            saves.delete("../x"),
            Err(PersistenceError::InvalidSlot(_))
        ));
    }
}
