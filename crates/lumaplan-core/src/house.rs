//! House model: levels, rooms, furniture and the camera

use crate::error::{LumaplanError, Result};
use crate::types::{Point2, WorldPoint};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

fn default_true() -> bool {
    true
}

fn default_wall_height() -> f64 {
    250.0
}

fn default_power() -> f64 {
    0.5
}

fn default_field_of_view() -> f64 {
    std::f64::consts::FRAC_PI_3
}

/// Camera snapshot for one render pass.
///
/// `y` is the plan depth and `z` the eye elevation. Angles are radians;
/// `field_of_view` is horizontal.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CameraPose {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    #[serde(default)]
    pub yaw: f64,
    #[serde(default)]
    pub pitch: f64,
    #[serde(default = "default_field_of_view")]
    pub field_of_view: f64,
}

impl CameraPose {
    pub fn position(&self) -> WorldPoint {
        WorldPoint::new(self.x, self.y, self.z)
    }
}

impl Default for CameraPose {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            z: 1000.0,
            yaw: 0.0,
            pitch: std::f64::consts::FRAC_PI_2,
            field_of_view: default_field_of_view(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Level {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub elevation: f64,
    /// Non-positive heights fall back to the house wall height.
    #[serde(default)]
    pub height: f64,
    #[serde(default = "default_true")]
    pub viewable: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Room {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub level: Option<String>,
    /// Floor polygon in plan coordinates
    #[serde(default)]
    pub points: Vec<[f64; 2]>,
    #[serde(default = "default_true")]
    pub floor_visible: bool,
    #[serde(default = "default_true")]
    pub ceiling_visible: bool,
}

impl Room {
    /// Display name, falling back to the id for unnamed rooms
    pub fn label(&self) -> &str {
        match &self.name {
            Some(name) if !name.is_empty() => name,
            _ => &self.id,
        }
    }

    pub fn is_on_level(&self, level: Option<&str>) -> bool {
        self.level.as_deref() == level
    }

    /// Even-odd point-in-polygon test against the floor polygon.
    pub fn contains_point(&self, point: Point2) -> bool {
        let n = self.points.len();
        if n < 3 {
            return false;
        }
        let mut inside = false;
        let mut j = n - 1;
        for i in 0..n {
            let [xi, yi] = self.points[i];
            let [xj, yj] = self.points[j];
            if (yi > point.y) != (yj > point.y)
                && point.x < (xj - xi) * (point.y - yi) / (yj - yi) + xi
            {
                inside = !inside;
            }
            j = i;
        }
        inside
    }
}

/// A single piece of furniture as placed in the house.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Piece {
    pub id: String,
    pub name: String,
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub elevation: f64,
    #[serde(default)]
    pub height: f64,
    #[serde(default)]
    pub level: Option<String>,
    #[serde(default = "default_true")]
    pub visible: bool,
    /// Light sources carry a power value the renderer honours.
    #[serde(default)]
    pub light: bool,
    #[serde(default = "default_power")]
    pub power: f64,
}

/// Furniture tree node: either a leaf piece or a named group of nodes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FurnitureNode {
    Piece(Piece),
    Group {
        #[serde(default)]
        name: String,
        #[serde(default)]
        children: Vec<FurnitureNode>,
    },
}

impl FurnitureNode {
    /// Depth-first flattening of the tree into its leaf pieces.
    pub fn flatten<'a>(nodes: &'a [FurnitureNode], out: &mut Vec<&'a Piece>) {
        for node in nodes {
            match node {
                FurnitureNode::Piece(piece) => out.push(piece),
                FurnitureNode::Group { children, .. } => Self::flatten(children, out),
            }
        }
    }
}

/// The complete house model supplied by the host application
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct House {
    #[serde(default = "default_wall_height")]
    pub wall_height: f64,
    #[serde(default)]
    pub all_levels_visible: bool,
    #[serde(default)]
    pub selected_level: Option<String>,
    #[serde(default)]
    pub camera: CameraPose,
    #[serde(default)]
    pub levels: Vec<Level>,
    #[serde(default)]
    pub rooms: Vec<Room>,
    #[serde(default)]
    pub furniture: Vec<FurnitureNode>,
}

impl Default for House {
    fn default() -> Self {
        Self {
            wall_height: default_wall_height(),
            all_levels_visible: false,
            selected_level: None,
            camera: CameraPose::default(),
            levels: Vec::new(),
            rooms: Vec::new(),
            furniture: Vec::new(),
        }
    }
}

impl House {
    /// Load a house from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse a house from a TOML string
    pub fn from_toml(content: &str) -> Result<Self> {
        let house: House = toml::from_str(content)?;
        house.check_references()?;
        Ok(house)
    }

    fn check_references(&self) -> Result<()> {
        if let Some(selected) = &self.selected_level {
            if self.level(selected).is_none() {
                return Err(LumaplanError::LevelNotFound(selected.clone()));
            }
        }
        for room in &self.rooms {
            if let Some(level) = &room.level {
                if self.level(level).is_none() {
                    return Err(LumaplanError::ValidationError(format!(
                        "room '{}' references unknown level '{}'",
                        room.id, level
                    )));
                }
            }
        }
        Ok(())
    }

    pub fn level(&self, id: &str) -> Option<&Level> {
        self.levels.iter().find(|l| l.id == id)
    }

    /// All leaf pieces of the furniture tree, in tree order
    pub fn pieces(&self) -> Vec<&Piece> {
        let mut out = Vec::new();
        FurnitureNode::flatten(&self.furniture, &mut out);
        out
    }

    pub fn piece(&self, id: &str) -> Option<&Piece> {
        self.pieces().into_iter().find(|p| p.id == id)
    }

    pub fn piece_mut(&mut self, id: &str) -> Option<&mut Piece> {
        fn find<'a>(nodes: &'a mut [FurnitureNode], id: &str) -> Option<&'a mut Piece> {
            for node in nodes {
                match node {
                    FurnitureNode::Piece(piece) if piece.id == id => return Some(piece),
                    FurnitureNode::Piece(_) => {}
                    FurnitureNode::Group { children, .. } => {
                        if let Some(found) = find(children, id) {
                            return Some(found);
                        }
                    }
                }
            }
            None
        }
        find(&mut self.furniture, id)
    }

    /// Whether rooms and pieces on `level` take part in the current view
    pub fn is_level_shown(&self, level: Option<&str>) -> bool {
        self.all_levels_visible || level == self.selected_level.as_deref()
    }

    /// Elevation and height of a room's level.
    ///
    /// Rooms without a level sit at elevation 0 with the house wall height.
    /// A non-positive level height also falls back to the wall height.
    pub fn room_elevation_and_height(&self, room: &Room) -> (f64, f64) {
        match room.level.as_deref().and_then(|id| self.level(id)) {
            Some(level) => {
                let height = if level.height > 0.0 {
                    level.height
                } else {
                    self.wall_height
                };
                (level.elevation, height)
            }
            None => (0.0, self.wall_height),
        }
    }

    /// Floor corners, followed by ceiling corners when the room has a
    /// positive height and a visible ceiling.
    pub fn room_corners(&self, room: &Room) -> Vec<WorldPoint> {
        let (elevation, height) = self.room_elevation_and_height(room);
        let mut corners: Vec<WorldPoint> = room
            .points
            .iter()
            .map(|[x, y]| WorldPoint::new(*x, *y, elevation))
            .collect();
        if height > 0.0 && room.ceiling_visible {
            corners.extend(
                room.points
                    .iter()
                    .map(|[x, y]| WorldPoint::new(*x, *y, elevation + height)),
            );
        }
        corners
    }

    /// First room on `level` whose floor polygon contains `point`
    pub fn room_at(&self, point: Point2, level: Option<&str>) -> Option<&Room> {
        self.rooms
            .iter()
            .find(|room| room.is_on_level(level) && room.contains_point(point))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HOUSE: &str = r#"
wall_height = 240.0
selected_level = "ground"

[camera]
x = 500.0
y = 1500.0
z = 800.0
pitch = 0.6

[[levels]]
id = "ground"
elevation = 0.0
height = 0.0

[[levels]]
id = "upper"
elevation = 260.0
height = 250.0

[[rooms]]
id = "r1"
name = "Kitchen"
level = "ground"
points = [[0.0, 0.0], [400.0, 0.0], [400.0, 300.0], [0.0, 300.0]]

[[rooms]]
id = "r2"
level = "upper"
points = [[0.0, 0.0], [200.0, 0.0], [200.0, 200.0]]
ceiling_visible = false

[[furniture]]
kind = "group"
name = "ceiling"

[[furniture.children]]
kind = "piece"
id = "p1"
name = "light.kitchen"
x = 100.0
y = 100.0
level = "ground"
light = true

[[furniture.children]]
kind = "group"
name = "nested"

[[furniture.children.children]]
kind = "piece"
id = "p2"
name = "light.kitchen"
x = 300.0
y = 100.0
level = "ground"
light = true

[[furniture]]
kind = "piece"
id = "p3"
name = "sensor.temp"
x = 50.0
y = 50.0
"#;

    #[test]
    fn test_parse_house() {
        let house = House::from_toml(HOUSE).unwrap();
        assert_eq!(house.levels.len(), 2);
        assert_eq!(house.rooms[0].label(), "Kitchen");
        assert_eq!(house.rooms[1].label(), "r2");
        assert_eq!(house.camera.field_of_view, std::f64::consts::FRAC_PI_3);
    }

    #[test]
    fn test_flatten_nested_groups() {
        let house = House::from_toml(HOUSE).unwrap();
        let ids: Vec<&str> = house.pieces().iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["p1", "p2", "p3"]);
    }

    #[test]
    fn test_piece_mut_reaches_nested() {
        let mut house = House::from_toml(HOUSE).unwrap();
        house.piece_mut("p2").unwrap().power = 0.0;
        assert_eq!(house.pieces()[1].power, 0.0);
        assert!(house.piece_mut("missing").is_none());
    }

    #[test]
    fn test_room_height_falls_back_to_wall_height() {
        let house = House::from_toml(HOUSE).unwrap();
        assert_eq!(house.room_elevation_and_height(&house.rooms[0]), (0.0, 240.0));
        assert_eq!(house.room_elevation_and_height(&house.rooms[1]), (260.0, 250.0));
    }

    #[test]
    fn test_room_corners_include_ceiling_when_visible() {
        let house = House::from_toml(HOUSE).unwrap();
        let kitchen = house.room_corners(&house.rooms[0]);
        assert_eq!(kitchen.len(), 8);
        assert_eq!(kitchen[4].elevation, 240.0);
        let upper = house.room_corners(&house.rooms[1]);
        assert_eq!(upper.len(), 3);
    }

    #[test]
    fn test_contains_point() {
        let house = House::from_toml(HOUSE).unwrap();
        let kitchen = &house.rooms[0];
        assert!(kitchen.contains_point(Point2::new(200.0, 150.0)));
        assert!(!kitchen.contains_point(Point2::new(500.0, 150.0)));
        assert_eq!(
            house
                .room_at(Point2::new(10.0, 10.0), Some("ground"))
                .map(|r| r.id.as_str()),
            Some("r1")
        );
        assert!(house.room_at(Point2::new(10.0, 10.0), None).is_none());
    }

    #[test]
    fn test_unknown_selected_level_rejected() {
        let err = House::from_toml("selected_level = \"attic\"").unwrap_err();
        assert!(matches!(err, LumaplanError::LevelNotFound(_)));
    }
}
