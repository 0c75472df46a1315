//! The story bundle: everything a content author ships in one file.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::catalog::{AchievementDef, Catalog, ItemDef, StatDef};
use crate::condition::Condition;
use crate::effect::{Effect, EffectKind};
use crate::error::{ContentError, ContentResult};
use crate::graph::SceneGraph;
use crate::scene::{EndingDef, Scene};

fn default_capacity() -> usize {
    20
}

/// A complete story as authored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Story {
    /// Story title.
    pub title: String,
    /// Author credit.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    /// Id of the first scene of a new game.
    pub start: String,
    /// Scene collection.
    pub scenes: Vec<Scene>,
    /// Ending collection.
    #[serde(default)]
    pub endings: Vec<EndingDef>,
    /// Item catalog.
    #[serde(default)]
    pub items: Vec<ItemDef>,
    /// Stat catalog.
    #[serde(default)]
    pub stats: Vec<StatDef>,
    /// Achievement catalog.
    #[serde(default)]
    pub achievements: Vec<AchievementDef>,
    /// Maximum number of distinct inventory stacks.
    #[serde(default = "default_capacity")]
    pub inventory_capacity: usize,
    /// Localized strings by key.
    #[serde(default)]
    pub strings: BTreeMap<String, String>,
}

/// A validated story, split into the pieces the engine consumes.
#[derive(Debug, Clone)]
pub struct LoadedStory {
    /// Story title.
    pub title: String,
    /// Id of the first scene.
    pub start: String,
    /// The scene graph store.
    pub graph: SceneGraph,
    /// Item, stat, and achievement definitions.
    pub catalog: Catalog,
    /// Maximum number of distinct inventory stacks.
    pub inventory_capacity: usize,
    /// Localized strings by key.
    pub strings: BTreeMap<String, String>,
}

impl Story {
    /// Parse and validate a story from JSON text.
    pub fn from_json(json: &str) -> ContentResult<Self> {
        let story: Story = serde_json::from_str(json)?;
        story.validate()?;
        Ok(story)
    }

    /// Read, parse, and validate a story file.
    pub fn from_path(path: &Path) -> ContentResult<Self> {
        let json = std::fs::read_to_string(path).map_err(|source| ContentError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    /// Check every invariant the engine relies on.
    pub fn validate(&self) -> ContentResult<()> {
        self.clone().load().map(|_| ())
    }

    /// Validate the story and build its scene graph and catalog.
    pub fn load(self) -> ContentResult<LoadedStory> {
        let catalog = Catalog::new(self.items, self.stats, self.achievements)?;
        let graph = SceneGraph::load(self.scenes, self.endings)?;

        if !graph.is_scene(&self.start) {
            return Err(ContentError::UnknownStart(self.start));
        }
        check_references(&graph, &catalog)?;

        Ok(LoadedStory {
            title: self.title,
            start: self.start,
            graph,
            catalog,
            inventory_capacity: self.inventory_capacity,
            strings: self.strings,
        })
    }
}

/// Every item, stat, achievement, and scene named by a condition or effect
/// must exist.
fn check_references(graph: &SceneGraph, catalog: &Catalog) -> ContentResult<()> {
    for scene in graph.scenes() {
        let owner = format!("scene \"{}\"", scene.id);
        check_effects(&owner, &scene.on_enter, graph, catalog)?;
        for choice in &scene.choices {
            let owner = format!("choice \"{}/{}\"", scene.id, choice.id);
            check_conditions(&owner, &choice.conditions, graph, catalog)?;
            check_effects(&owner, &choice.effects, graph, catalog)?;
        }
    }
    for achievement in catalog.achievements() {
        if let Some(trigger) = &achievement.trigger {
            let owner = format!("achievement \"{}\"", achievement.id);
            check_conditions(&owner, &trigger.game_state_conditions, graph, catalog)?;
        }
    }
    Ok(())
}

fn unknown(owner: &str, kind: &'static str, id: &str) -> ContentError {
    ContentError::UnknownReference {
        owner: owner.to_string(),
        kind,
        id: id.to_string(),
    }
}

fn check_conditions(
    owner: &str,
    conditions: &[Condition],
    graph: &SceneGraph,
    catalog: &Catalog,
) -> ContentResult<()> {
    let mut result = Ok(());
    for condition in conditions {
        condition.walk(&mut |c| {
            if result.is_err() {
                return;
            }
            result = match c {
                Condition::HasItem { item, .. } if catalog.item(item).is_none() => {
                    Err(unknown(owner, "item", item))
                }
                Condition::StatCompare { stat, .. } if catalog.stat(stat).is_none() => {
                    Err(unknown(owner, "stat", stat))
                }
                Condition::AchievementUnlocked { achievement }
                    if catalog.achievement(achievement).is_none() =>
                {
                    Err(unknown(owner, "achievement", achievement))
                }
                Condition::CurrentScene { scene } if !graph.is_scene(scene) => {
                    Err(unknown(owner, "scene", scene))
                }
                _ => Ok(()),
            };
        });
    }
    result
}

fn check_effects(
    owner: &str,
    effects: &[Effect],
    graph: &SceneGraph,
    catalog: &Catalog,
) -> ContentResult<()> {
    for effect in effects {
        check_conditions(owner, &effect.conditions, graph, catalog)?;
        match &effect.kind {
            EffectKind::AddItem { item, .. } | EffectKind::RemoveItem { item, .. }
                if catalog.item(item).is_none() =>
            {
                return Err(unknown(owner, "item", item));
            }
            EffectKind::SetStat { stat, .. } | EffectKind::ModifyStat { stat, .. }
                if catalog.stat(stat).is_none() =>
            {
                return Err(unknown(owner, "stat", stat));
            }
            EffectKind::UnlockAchievement { achievement, .. }
            | EffectKind::ProgressAchievement { achievement, .. }
                if catalog.achievement(achievement).is_none() =>
            {
                return Err(unknown(owner, "achievement", achievement));
            }
            _ => {}
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const STORY: &str = r#"{
        "title": "The Cellar",
        "start": "intro",
        "items": [{ "id": "key", "name": "Rusty Key", "stackable": false }],
        "stats": [{ "id": "health", "name": "Health", "min": 0, "max": 10, "initial": 10 }],
        "achievements": [{ "id": "escaped", "name": "Escaped" }],
        "endings": [{ "id": "freedom", "title": "Freedom" }],
        "scenes": [
            {
                "id": "intro",
                "text": "You wake in a cellar.",
                "choices": [
                    {
                        "id": "look_around",
                        "text": "Look around",
                        "target": "cellar_door",
                        "effects": [{ "type": "set_flag", "flag": "awake" }]
                    }
                ]
            },
            {
                "id": "cellar_door",
                "text": "A heavy door.",
                "choices": [
                    {
                        "id": "unlock",
                        "text": "Unlock the door",
                        "conditions": [{ "type": "has_item", "item": "key" }],
                        "effects": [{ "type": "unlock_achievement", "achievement": "escaped" }],
                        "target": "freedom"
                    }
                ]
            }
        ]
    }"#;

    #[test]
    fn parse_valid_story() {
        let story = Story::from_json(STORY).unwrap();
        assert_eq!(story.title, "The Cellar");
        assert_eq!(story.inventory_capacity, 20);

        let loaded = story.load().unwrap();
        assert_eq!(loaded.graph.len(), 2);
        assert!(loaded.catalog.item("key").is_some());
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let result = Story::from_json("{ not json");
        assert!(matches!(result, Err(ContentError::Parse(_))));
    }

    #[test]
    fn unknown_start_rejected() {
        let json = STORY.replace(r#""start": "intro""#, r#""start": "attic""#);
        let result = Story::from_json(&json);
        assert!(matches!(result, Err(ContentError::UnknownStart(s)) if s == "attic"));
    }

    #[test]
    fn unknown_item_reference_rejected() {
        let json = STORY.replace(r#""item": "key""#, r#""item": "crowbar""#);
        let result = Story::from_json(&json);
        assert!(matches!(
            result,
            Err(ContentError::UnknownReference { kind: "item", .. })
        ));
    }

    #[test]
    fn unknown_achievement_reference_rejected() {
        let json = STORY.replace(
            r#""achievement": "escaped""#,
            r#""achievement": "flew_away""#,
        );
        let result = Story::from_json(&json);
        assert!(matches!(
            result,
            Err(ContentError::UnknownReference {
                kind: "achievement",
                ..
            })
        ));
    }

    #[test]
    fn missing_file_is_io_error() {
        let result = Story::from_path(Path::new("/definitely/not/here.json"));
        assert!(matches!(result, Err(ContentError::Io { .. })));
    }
}
