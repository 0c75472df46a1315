//! The scene graph store: scenes and endings indexed by id, with validated choice targets.

use std::collections::HashMap;

use crate::error::{ContentError, ContentResult};
use crate::scene::{EndingDef, Scene};

/// Closest known id must be at least this similar to be suggested.
const SUGGESTION_THRESHOLD: f64 = 0.8;

/// The immutable catalog of scenes and endings, keyed by id.
///
/// Built once with [`SceneGraph::load`], which guarantees that every choice
/// target resolves to a scene or an ending.
#[derive(Debug, Clone, Default)]
pub struct SceneGraph {
    scenes: HashMap<String, Scene>,
    endings: HashMap<String, EndingDef>,
    order: Vec<String>,
}

impl SceneGraph {
    /// Validate and index a scene collection.
    ///
    /// Scene and ending ids share one namespace. Fails on duplicate ids, on
    /// choices whose target is neither a scene nor an ending, and on choices
    /// naming an unknown ending.
    pub fn load(scenes: Vec<Scene>, endings: Vec<EndingDef>) -> ContentResult<Self> {
        let mut graph = Self::default();

        for ending in endings {
            if graph.endings.contains_key(&ending.id) {
                return Err(ContentError::DuplicateId {
                    kind: "ending",
                    id: ending.id,
                });
            }
            graph.endings.insert(ending.id.clone(), ending);
        }

        for scene in scenes {
            if graph.scenes.contains_key(&scene.id) || graph.endings.contains_key(&scene.id) {
                return Err(ContentError::DuplicateId {
                    kind: "scene",
                    id: scene.id,
                });
            }
            graph.order.push(scene.id.clone());
            graph.scenes.insert(scene.id.clone(), scene);
        }

        graph.check_choices()?;
        Ok(graph)
    }

    fn check_choices(&self) -> ContentResult<()> {
        for id in &self.order {
            let scene = &self.scenes[id];
            let mut seen = std::collections::HashSet::new();
            for choice in &scene.choices {
                if !seen.insert(choice.id.as_str()) {
                    return Err(ContentError::DuplicateId {
                        kind: "choice",
                        id: format!("{}/{}", scene.id, choice.id),
                    });
                }
                if let Some(target) = &choice.target
                    && !self.contains(target)
                {
                    return Err(ContentError::UnknownTarget {
                        scene: scene.id.clone(),
                        choice: choice.id.clone(),
                        target: target.clone(),
                        suggestion: self.suggest(target),
                    });
                }
                if let Some(ending) = &choice.ending
                    && !self.endings.contains_key(ending)
                {
                    return Err(ContentError::UnknownEnding {
                        scene: scene.id.clone(),
                        choice: choice.id.clone(),
                        ending: ending.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Get a scene by id.
    pub fn get(&self, id: &str) -> Option<&Scene> {
        self.scenes.get(id)
    }

    /// Get an ending by id.
    pub fn ending(&self, id: &str) -> Option<&EndingDef> {
        self.endings.get(id)
    }

    /// Whether the id names a scene.
    pub fn is_scene(&self, id: &str) -> bool {
        self.scenes.contains_key(id)
    }

    /// Whether the id names an ending.
    pub fn is_ending(&self, id: &str) -> bool {
        self.endings.contains_key(id)
    }

    /// Whether the id names a scene or an ending.
    pub fn contains(&self, id: &str) -> bool {
        self.is_scene(id) || self.is_ending(id)
    }

    /// All scenes in load order.
    pub fn scenes(&self) -> impl Iterator<Item = &Scene> {
        self.order.iter().filter_map(|id| self.scenes.get(id))
    }

    /// All scene ids in load order.
    pub fn scene_ids(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    /// All endings, in no particular order.
    pub fn endings(&self) -> impl Iterator<Item = &EndingDef> {
        self.endings.values()
    }

    /// Number of scenes.
    pub fn len(&self) -> usize {
        self.scenes.len()
    }

    /// Whether the graph has no scenes.
    pub fn is_empty(&self) -> bool {
        self.scenes.is_empty()
    }

    /// Number of endings.
    pub fn ending_count(&self) -> usize {
        self.endings.len()
    }

    /// The known scene or ending id most similar to `id`, if close enough.
    pub fn suggest(&self, id: &str) -> Option<String> {
        self.scenes
            .keys()
            .chain(self.endings.keys())
            .map(|known| (strsim::jaro_winkler(id, known), known))
            .filter(|(score, _)| *score >= SUGGESTION_THRESHOLD)
            .max_by(|a, b| a.0.total_cmp(&b.0))
            .map(|(_, known)| known.clone())
    }
}
