use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use fw_core::{
    AchievementDef, AchievementTrigger, Choice, Comparison, Condition, Effect, EndingDef,
    ItemDef, Scene, StatDef, Story, TriggerType,
};

pub fn run(name: &str) -> Result<(), String> {
    let path = PathBuf::from(format!("{name}.json"));

    if path.exists() {
        return Err(format!("'{}' already exists", path.display()));
    }

    let story = template(name);
    story.validate().map_err(|e| format!("template is invalid: {e}"))?;
    let json = serde_json::to_string_pretty(&story)
        .map_err(|e| format!("cannot encode template: {e}"))?;
    fs::write(&path, json).map_err(|e| format!("cannot write {}: {e}", path.display()))?;

    println!("Created story '{name}' in {}", path.display());
    println!();
    println!("Get started:");
    println!("  # Edit {} to write your story", path.display());
    println!("  fw check {}   # Validate the story", path.display());
    println!("  fw play {}    # Play it", path.display());

    Ok(())
}

/// A small story that exercises conditions, effects, stats, items, and an
/// achievement.
fn template(title: &str) -> Story {
    let scenes = vec![
        Scene::new("intro", "You stand at the edge of a dark forest, {player_name}.")
            .with_choice(
                Choice::new("enter", "Step into the forest")
                    .with_target("clearing")
                    .with_effect(Effect::set_flag("entered_forest")),
            )
            .with_choice(Choice::new("leave", "Turn back").ending_with("home")),
        Scene::new("clearing", "A clearing. Something glints in the grass.")
            .with_choice(
                Choice::new("take_lantern", "Pick up the lantern")
                    .with_condition(Condition::negate(Condition::has_item("lantern", 1)))
                    .with_effect(Effect::add_item("lantern", 1)),
            )
            .with_choice(
                Choice::new("go_deeper", "Go deeper")
                    .with_condition(Condition::has_item("lantern", 1))
                    .with_effect(Effect::modify_stat("courage", 1))
                    .with_target("heart")
                    .shown_when_locked(),
            ),
        Scene::new("heart", "The heart of the forest. Courage: {courage}.")
            .with_choice(
                Choice::new("rest", "Rest by the old tree")
                    .with_condition(Condition::stat("courage", Comparison::GreaterOrEqual, 1))
                    .ending_with("peace"),
            ),
    ];

    Story {
        title: title.to_string(),
        author: None,
        start: "intro".to_string(),
        scenes,
        endings: vec![
            EndingDef {
                id: "home".to_string(),
                title: "Home Again".to_string(),
                text: "Some forests are better left alone.".to_string(),
            },
            EndingDef {
                id: "peace".to_string(),
                title: "At Peace".to_string(),
                text: "The forest keeps your secret.".to_string(),
            },
        ],
        items: vec![ItemDef::new("lantern", "Lantern").unique()],
        stats: vec![StatDef::new("courage", 0, 5, 0)],
        achievements: vec![
            AchievementDef::new("explorer", "Explorer").with_trigger(
                AchievementTrigger::on(TriggerType::SceneVisited).with_field("scene", "heart"),
            ),
        ],
        inventory_capacity: 10,
        strings: BTreeMap::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn template_is_valid() {
        let story = template("Forest");
        assert!(story.validate().is_ok());
        let json = serde_json::to_string(&story).unwrap();
        assert!(Story::from_json(&json).is_ok());
    }
}
