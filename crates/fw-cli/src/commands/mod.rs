pub mod check;
pub mod delete;
pub mod init;
pub mod play;
pub mod saves;

use std::path::Path;
use std::sync::Arc;

use fw_core::{Catalog, Story};
use fw_engine::{EngineConfig, FileSaves, StateStore};

/// Read and validate a story file.
fn load_story(path: &Path) -> Result<Story, String> {
    Story::from_path(path).map_err(|e| e.to_string())
}

/// Open (creating if needed) a save directory.
fn open_saves(dir: &Path) -> Result<FileSaves, String> {
    FileSaves::new(dir).map_err(|e| format!("cannot open save directory {}: {e}", dir.display()))
}

/// A store over a save directory, for managing slots outside of play.
fn slot_store(dir: &Path, config: EngineConfig) -> Result<StateStore, String> {
    let saves = open_saves(dir)?;
    Ok(StateStore::new(
        Arc::new(Catalog::default()),
        0,
        Box::new(saves),
        config,
    ))
}
