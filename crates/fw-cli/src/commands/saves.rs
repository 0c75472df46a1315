use std::path::Path;

use comfy_table::{ContentArrangement, Table};
use fw_engine::EngineConfig;

pub fn run(dir: &Path, slots: u32) -> Result<(), String> {
    let store = super::slot_store(dir, EngineConfig::default().with_slot_count(slots))?;
    let listing = store.list_saves();

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Slot", "Saved", "Summary"]);

    for slot in &listing {
        let saved = slot
            .timestamp
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "—".to_string());
        let summary = match (&slot.error, &slot.summary) {
            (Some(error), _) => format!("unreadable: {error}"),
            (None, Some(summary)) => summary.clone(),
            (None, None) => "empty".to_string(),
        };
        table.add_row(vec![&slot.slot, &saved, &summary]);
    }

    println!("{table}");
    println!();
    let used = listing.iter().filter(|s| !s.is_empty).count();
    println!("  {used} of {} slots in use", listing.len());

    Ok(())
}
