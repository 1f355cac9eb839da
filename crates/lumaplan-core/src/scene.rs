//! Scenes: opaque render contexts with display conditions

use serde::{Deserialize, Serialize};

/// A client-side state condition, e.g. `sun.sun` is `below_horizon`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateCondition {
    pub entity: String,
    pub state: String,
}

impl StateCondition {
    pub fn new(entity: impl Into<String>, state: impl Into<String>) -> Self {
        Self {
            entity: entity.into(),
            state: state.into(),
        }
    }
}

/// A render context. Each scene gets its own base frame and full set of
/// combination frames.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    /// Empty for the implicit single scene
    #[serde(default)]
    pub name: String,
    /// Time of day handed to the renderer, in milliseconds since the epoch
    #[serde(default)]
    pub render_time: Option<i64>,
    #[serde(default)]
    pub conditions: Vec<StateCondition>,
    /// Entities whose furniture is hidden while this scene renders
    #[serde(default)]
    pub hidden_entities: Vec<String>,
}

impl Scene {
    /// Qualify an asset name with this scene's directory
    pub fn asset_name(&self, name: &str) -> String {
        if self.name.is_empty() {
            name.to_string()
        } else {
            format!("{}/{}", self.name, name)
        }
    }

    pub fn hides(&self, entity: &str) -> bool {
        self.hidden_entities.iter().any(|e| e == entity)
    }
}
