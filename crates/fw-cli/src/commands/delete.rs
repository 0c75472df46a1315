use std::path::Path;

use fw_engine::EngineConfig;

pub fn run(dir: &Path, slot: &str) -> Result<(), String> {
    let mut store = super::slot_store(dir, EngineConfig::default())?;
    let removed = store.delete_save(slot).map_err(|e| e.to_string())?;

    if removed {
        println!("  Deleted save '{slot}'.");
        Ok(())
    } else {
        Err(format!("no save in slot \"{slot}\""))
    }
}
