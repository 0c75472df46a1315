use std::path::Path;

pub fn run(path: &Path) -> Result<(), String> {
    let story = super::load_story(path)?;
    let loaded = story.load().map_err(|e| e.to_string())?;

    println!("  All checks passed for '{}'.", loaded.title);
    println!(
        "  {} scenes, {} endings, start: {}",
        loaded.graph.len(),
        loaded.graph.ending_count(),
        loaded.start
    );
    println!(
        "  {} items, {} stats, {} achievements",
        loaded.catalog.items().len(),
        loaded.catalog.stats().len(),
        loaded.catalog.achievements().len()
    );

    Ok(())
}
