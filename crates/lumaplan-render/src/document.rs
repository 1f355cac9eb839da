//! The floor-plan layout document clients build their view from

use lumaplan_core::{ClickableArea, Entity, LightMixingMode, Result, Scene, StateCondition};
use lumaplan_layout::OverlapWarning;
use lumaplan_projection::RoomBounds;
use serde::Serialize;
use std::cmp::Ordering;
use std::fs;
use std::path::Path;

/// One conditionally shown full-frame image
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageLayer {
    pub scene: String,
    pub name: String,
    /// All must hold for the layer to show
    pub conditions: Vec<StateCondition>,
    /// Versioned asset URL
    pub image: String,
    /// Composite with `mix-blend-mode: lighten`
    pub blend_lighten: bool,
    /// Red tint variant of `image` for hue rotation to the light's color
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tint: Option<String>,
}

impl ImageLayer {
    /// The unlit frame of a scene, shown under every light layer
    pub fn base(scene: &Scene, name: String, image: String) -> Self {
        Self {
            scene: scene.name.clone(),
            name,
            conditions: scene.conditions.clone(),
            image,
            blend_lighten: false,
            tint: None,
        }
    }

    /// `on`/`off` for every group member, then the scene's own conditions
    pub fn combination_conditions(members: &[&Entity], lit: &[&Entity], scene: &Scene) -> Vec<StateCondition> {
        members
            .iter()
            .filter(|m| !m.always_on)
            .map(|m| {
                let state = if lit.iter().any(|l| l.name == m.name) {
                    "on"
                } else {
                    "off"
                };
                StateCondition::new(m.name.clone(), state)
            })
            .chain(scene.conditions.iter().cloned())
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClickableRect {
    #[serde(flatten)]
    pub bounds: RoomBounds,
    /// Transparent hit-target image
    pub image: String,
}

/// Where an entity's state icon sits, in viewport percent
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntityPlacement {
    pub entity: String,
    pub left: f64,
    pub top: f64,
    pub pinned: bool,
    pub clickable_area: ClickableArea,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub area: Option<ClickableRect>,
}

impl EntityPlacement {
    pub fn new(entity: &Entity, area: Option<ClickableRect>) -> Self {
        let position = entity.position();
        Self {
            entity: entity.name.clone(),
            left: position.x,
            top: position.y,
            pinned: entity.is_pinned(),
            clickable_area: entity.clickable_area,
            area,
        }
    }
}

/// Room-sized areas first so the smaller tap targets stack above them,
/// then by name and id
pub fn placement_order(a: &Entity, b: &Entity) -> Ordering {
    let entity_sized = |e: &Entity| e.clickable_area != ClickableArea::RoomSize;
    entity_sized(a)
        .cmp(&entity_sized(b))
        .then_with(|| a.name.cmp(&b.name))
        .then_with(|| a.id.cmp(&b.id))
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FloorplanDocument {
    pub width: u32,
    pub height: u32,
    pub light_mixing_mode: LightMixingMode,
    /// Transparent render-sized placeholder
    pub background: String,
    pub layers: Vec<ImageLayer>,
    pub entities: Vec<EntityPlacement>,
    pub overlaps: Vec<OverlapWarning>,
}

impl FloorplanDocument {
    pub fn new(width: u32, height: u32, light_mixing_mode: LightMixingMode, background: String) -> Self {
        Self {
            width,
            height,
            light_mixing_mode,
            background,
            layers: Vec::new(),
            entities: Vec::new(),
            overlaps: Vec::new(),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, self.to_json()?)?;
        Ok(())
    }
}
