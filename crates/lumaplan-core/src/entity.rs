//! Home-automation entities bound to furniture pieces

use crate::house::{House, Piece};
use crate::types::Point2;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

const ENTITY_PREFIXES: &[&str] = &[
    "air_quality.",
    "alarm_control_panel.",
    "assist_satellite.",
    "binary_sensor.",
    "button.",
    "camera.",
    "climate.",
    "cover.",
    "device_tracker.",
    "fan.",
    "humidifier.",
    "input_boolean.",
    "input_button.",
    "lawn_mower.",
    "light.",
    "lock.",
    "media_player.",
    "remote.",
    "sensor.",
    "siren.",
    "switch.",
    "todo.",
    "update.",
    "vacuum.",
    "valve.",
    "water_heater.",
    "weather.",
];

/// Whether a furniture name binds to a home-automation entity
pub fn is_home_assistant_entity(name: &str) -> bool {
    ENTITY_PREFIXES.iter().any(|prefix| name.starts_with(prefix))
}

/// Size of the tap target generated for an entity
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClickableArea {
    #[default]
    EntitySize,
    RoomSize,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Entity {
    /// Id of the first bound piece
    pub id: String,
    /// Domain-qualified identifier, e.g. `light.kitchen`
    pub name: String,
    pub attribute: Option<String>,
    pub piece_ids: Vec<String>,
    pub level: Option<String>,
    pub is_light: bool,
    pub always_on: bool,
    pub is_rgb: bool,
    pub clickable_area: ClickableArea,
    position: Point2,
    pinned: bool,
}

impl Entity {
    fn from_pieces(pieces: &[&Piece]) -> Option<Self> {
        let first = pieces.first()?;
        let (name, attribute) = match first.name.split_once('/') {
            Some((name, attr)) => (name.to_string(), Some(attr.to_string())),
            None => (first.name.clone(), None),
        };
        let is_light = name.starts_with("light.") || name.starts_with("switch.");
        Some(Self {
            id: first.id.clone(),
            name,
            attribute,
            piece_ids: pieces.iter().map(|p| p.id.clone()).collect(),
            level: first.level.clone(),
            is_light,
            always_on: false,
            is_rgb: false,
            clickable_area: ClickableArea::default(),
            position: Point2::new(50.0, 50.0),
            pinned: false,
        })
    }

    /// Key under which per-entity settings are persisted
    pub fn settings_key(&self) -> String {
        format!("{}_{}", self.name, self.id)
    }

    pub fn position(&self) -> Point2 {
        self.position
    }

    pub fn is_pinned(&self) -> bool {
        self.pinned
    }

    /// Set a computed position. Ignored once the user has pinned the entity.
    pub fn set_auto_position(&mut self, position: Point2) {
        if !self.pinned {
            self.position = position;
        }
    }

    /// Shift by a computed offset. Ignored for pinned entities.
    pub fn move_by(&mut self, delta: Point2) {
        if !self.pinned {
            self.position = self.position + delta;
        }
    }

    /// Place the entity at a user-chosen position that automatic layout keeps.
    pub fn pin(&mut self, position: Point2) {
        self.position = position;
        self.pinned = true;
    }

    pub fn unpin(&mut self) {
        self.pinned = false;
    }
}

/// All entities discovered in a house, split the way rendering consumes them
#[derive(Clone, Debug, Default)]
pub struct EntityCatalog {
    /// Lights visible in the current view; these get rendered combinatorially
    pub lights: Vec<Entity>,
    /// Lights whose pieces all sit on hidden levels; forced off while rendering
    pub other_level_lights: Vec<Entity>,
    /// Non-light entities visible in the current view
    pub others: Vec<Entity>,
}

impl EntityCatalog {
    pub fn from_house(house: &House) -> Self {
        let mut grouped_lights: BTreeMap<String, Vec<&Piece>> = BTreeMap::new();
        let mut other_pieces = Vec::new();

        for piece in house.pieces() {
            if !piece.visible || !is_home_assistant_entity(&piece.name) {
                continue;
            }
            if piece.name.starts_with("light.") || piece.name.starts_with("switch.") {
                grouped_lights
                    .entry(piece.name.clone())
                    .or_default()
                    .push(piece);
            } else {
                other_pieces.push(piece);
            }
        }

        let mut catalog = Self::default();
        let on_shown_level = |p: &&Piece| house.is_level_shown(p.level.as_deref());

        for pieces in grouped_lights.values() {
            let Some(entity) = Entity::from_pieces(pieces) else {
                continue;
            };
            let exclusively_elsewhere = pieces.iter().all(|p| p.light)
                && pieces.iter().all(|p| !on_shown_level(p));
            if exclusively_elsewhere {
                catalog.other_level_lights.push(entity);
            } else if pieces.iter().any(on_shown_level) {
                catalog.lights.push(entity);
            }
        }

        for piece in other_pieces {
            if !on_shown_level(&piece) {
                continue;
            }
            if let Some(entity) = Entity::from_pieces(&[piece]) {
                catalog.others.push(entity);
            }
        }

        for list in [
            &mut catalog.lights,
            &mut catalog.other_level_lights,
            &mut catalog.others,
        ] {
            list.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        }
        catalog
    }

    /// Entities shown on the floor plan: lights first, then the others
    pub fn visible(&self) -> impl Iterator<Item = &Entity> {
        self.lights.iter().chain(self.others.iter())
    }

    pub fn visible_mut(&mut self) -> impl Iterator<Item = &mut Entity> {
        self.lights.iter_mut().chain(self.others.iter_mut())
    }

    pub fn all(&self) -> impl Iterator<Item = &Entity> {
        self.lights
            .iter()
            .chain(self.others.iter())
            .chain(self.other_level_lights.iter())
    }

    pub fn all_mut(&mut self) -> impl Iterator<Item = &mut Entity> {
        self.lights
            .iter_mut()
            .chain(self.others.iter_mut())
            .chain(self.other_level_lights.iter_mut())
    }

    pub fn find(&self, name: &str) -> Option<&Entity> {
        self.all().find(|e| e.name == name)
    }

    pub fn find_mut(&mut self, name: &str) -> Option<&mut Entity> {
        self.all_mut().find(|e| e.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn house() -> House {
        House::from_toml(
            r#"
selected_level = "ground"

[[levels]]
id = "ground"

[[levels]]
id = "upper"
elevation = 260.0

[[furniture]]
kind = "piece"
id = "b"
name = "light.kitchen"
x = 0.0
y = 0.0
level = "ground"
light = true

[[furniture]]
kind = "piece"
id = "a"
name = "light.kitchen"
x = 10.0
y = 0.0
level = "ground"
light = true

[[furniture]]
kind = "piece"
id = "c"
name = "light.attic"
x = 0.0
y = 0.0
level = "upper"
light = true

[[furniture]]
kind = "piece"
id = "d"
name = "sensor.temp/temperature"
x = 0.0
y = 0.0
level = "ground"

[[furniture]]
kind = "piece"
id = "e"
name = "sensor.attic"
x = 0.0
y = 0.0
level = "upper"

[[furniture]]
kind = "piece"
id = "f"
name = "sofa"
x = 0.0
y = 0.0
level = "ground"

[[furniture]]
kind = "piece"
id = "g"
name = "fan.hidden"
x = 0.0
y = 0.0
level = "ground"
visible = false
"#,
        )
        .unwrap()
    }

    #[test]
    fn test_prefix_detection() {
        assert!(is_home_assistant_entity("light.kitchen"));
        assert!(is_home_assistant_entity("water_heater.boiler"));
        assert!(!is_home_assistant_entity("lights.kitchen"));
        assert!(!is_home_assistant_entity("sofa"));
    }

    #[test]
    fn test_catalog_classification() {
        let catalog = EntityCatalog::from_house(&house());

        assert_eq!(catalog.lights.len(), 1);
        assert_eq!(catalog.lights[0].name, "light.kitchen");
        assert_eq!(catalog.lights[0].piece_ids, vec!["b", "a"]);

        assert_eq!(catalog.other_level_lights.len(), 1);
        assert_eq!(catalog.other_level_lights[0].name, "light.attic");

        assert_eq!(catalog.others.len(), 1);
        assert_eq!(catalog.others[0].name, "sensor.temp");
        assert_eq!(catalog.others[0].attribute.as_deref(), Some("temperature"));
    }

    #[test]
    fn test_all_levels_visible_keeps_upper_lights() {
        let mut h = house();
        h.all_levels_visible = true;
        let catalog = EntityCatalog::from_house(&h);
        assert!(catalog.other_level_lights.is_empty());
        let names: Vec<&str> = catalog.lights.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["light.attic", "light.kitchen"]);
        assert_eq!(catalog.others.len(), 2);
    }

    #[test]
    fn test_pinned_entity_ignores_auto_layout() {
        let catalog = EntityCatalog::from_house(&house());
        let mut entity = catalog.lights[0].clone();
        assert_eq!(entity.settings_key(), "light.kitchen_b");

        entity.set_auto_position(Point2::new(10.0, 20.0));
        assert_eq!(entity.position(), Point2::new(10.0, 20.0));

        entity.pin(Point2::new(30.0, 40.0));
        entity.set_auto_position(Point2::new(1.0, 1.0));
        entity.move_by(Point2::new(5.0, 5.0));
        assert_eq!(entity.position(), Point2::new(30.0, 40.0));

        entity.unpin();
        entity.move_by(Point2::new(5.0, 5.0));
        assert_eq!(entity.position(), Point2::new(35.0, 45.0));
    }
}
