//! Room rectangles in viewport percent

use crate::bounds::HouseNdcBounds;
use crate::context::ProjectionContext;
use lumaplan_core::{House, Point2, Room};
use serde::{Deserialize, Serialize};

/// Fraction of the projected extent kept on each axis
const SHRINK_FACTOR: f64 = 0.8;

/// Longer side of a room-sized hit-target image, in pixels
const MARKER_BASE_SIZE: f64 = 20.0;

/// A rectangle in viewport percent
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoomBounds {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl RoomBounds {
    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    pub fn center(&self) -> Point2 {
        Point2::new(self.left + self.width / 2.0, self.top + self.height / 2.0)
    }

    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    /// Scale both sides by `factor`, keeping the same center.
    pub fn shrink(&self, factor: f64) -> Self {
        let width = self.width * factor;
        let height = self.height * factor;
        Self {
            left: self.left + (self.width - width) / 2.0,
            top: self.top + (self.height - height) / 2.0,
            width,
            height,
        }
    }

    pub fn contains(&self, point: Point2) -> bool {
        point.x >= self.left
            && point.x <= self.right()
            && point.y >= self.top
            && point.y <= self.bottom()
    }

    /// Grow the rectangle just enough to contain `point`. Never shrinks.
    pub fn expand_to_include(&self, point: Point2) -> Self {
        if self.contains(point) {
            return *self;
        }
        let left = self.left.min(point.x);
        let top = self.top.min(point.y);
        let right = self.right().max(point.x);
        let bottom = self.bottom().max(point.y);
        Self {
            left,
            top,
            width: (right - left).max(0.0),
            height: (bottom - top).max(0.0),
        }
    }

    /// Axis-aligned overlap; rectangles that only touch do not overlap.
    pub fn overlaps(&self, other: &RoomBounds) -> bool {
        !(self.right() <= other.left
            || self.left >= other.right()
            || self.bottom() <= other.top
            || self.top >= other.bottom())
    }

    /// Pixel size of the transparent hit-target image: the longer side is
    /// 20 px and the other keeps the rectangle's aspect ratio.
    pub fn marker_size(&self) -> (u32, u32) {
        if self.width <= 0.0 && self.height <= 0.0 {
            return (1, 1);
        }
        let (w, h) = if self.width >= self.height {
            let h = MARKER_BASE_SIZE * self.height / self.width.max(0.001);
            (MARKER_BASE_SIZE, h.round())
        } else {
            let w = MARKER_BASE_SIZE * self.width / self.height.max(0.001);
            (w.round(), MARKER_BASE_SIZE)
        };
        ((w as u32).max(1), (h as u32).max(1))
    }
}

/// Raw projected extent of a room before shrinking.
///
/// Each corner is clamped into the house NDC bounds, normalized within
/// them and remapped onto the house's own screen footprint. Corners that do
/// not project are skipped; `None` when none project or the room has no
/// polygon.
pub fn project_room_extent(
    room: &Room,
    house: &House,
    house_bounds: &HouseNdcBounds,
    ctx: &ProjectionContext,
) -> Option<RoomBounds> {
    if room.points.is_empty() {
        return None;
    }
    let hb = house_bounds.clamped();
    let (house_left, house_top, house_width, house_height) = hb.screen_footprint();

    let normalize = |v: f64, min: f64, max: f64| {
        if max == min {
            0.5
        } else {
            (v.clamp(min, max) - min) / (max - min)
        }
    };

    let mut min_x = f64::INFINITY;
    let mut max_x = f64::NEG_INFINITY;
    let mut min_y = f64::INFINITY;
    let mut max_y = f64::NEG_INFINITY;
    for corner in house.room_corners(room) {
        let Some(ndc) = ctx.project_ndc(corner) else {
            continue;
        };
        let x = house_left + normalize(ndc.x, hb.min_x, hb.max_x) * house_width;
        let y = house_top + normalize(ndc.y, hb.min_y, hb.max_y) * house_height;
        min_x = min_x.min(x);
        max_x = max_x.max(x);
        min_y = min_y.min(y);
        max_y = max_y.max(y);
    }

    if [min_x, max_x, min_y, max_y].iter().any(|v| v.is_infinite()) {
        return None;
    }
    Some(RoomBounds {
        left: min_x,
        top: min_y,
        width: (max_x - min_x).max(0.0),
        height: (max_y - min_y).max(0.0),
    })
}

/// Clickable rectangle of a room: its projected extent shrunk to 80% on
/// each axis around the same center.
pub fn compute_room_screen_bounds(
    room: &Room,
    house: &House,
    house_bounds: &HouseNdcBounds,
    ctx: &ProjectionContext,
) -> Option<RoomBounds> {
    project_room_extent(room, house, house_bounds, ctx).map(|raw| raw.shrink(SHRINK_FACTOR))
}

#[cfg(test)]
mod tests {
    use super::*;
    use lumaplan_core::CameraPose;

    fn rect(left: f64, top: f64, width: f64, height: f64) -> RoomBounds {
        RoomBounds {
            left,
            top,
            width,
            height,
        }
    }

    fn setup() -> (House, ProjectionContext) {
        let house = House::from_toml(
            r#"
wall_height = 250.0

[camera]
x = 300.0
y = 150.0
z = 1500.0
pitch = 1.5707963267948966
field_of_view = 1.0

[[rooms]]
id = "living"
points = [[0.0, 0.0], [400.0, 0.0], [400.0, 300.0], [0.0, 300.0]]

[[rooms]]
id = "hall"
points = [[400.0, 0.0], [600.0, 0.0], [600.0, 300.0], [400.0, 300.0]]
ceiling_visible = false

[[rooms]]
id = "empty"
"#,
        )
        .unwrap();
        let ctx = ProjectionContext::build(&house.camera, 1024, 576).unwrap();
        (house, ctx)
    }

    #[test]
    fn test_overlap_examples() {
        assert!(rect(0.0, 0.0, 10.0, 10.0).overlaps(&rect(5.0, 5.0, 10.0, 10.0)));
        assert!(!rect(0.0, 0.0, 5.0, 5.0).overlaps(&rect(10.0, 10.0, 5.0, 5.0)));
        // Shared edge only
        assert!(!rect(0.0, 0.0, 5.0, 5.0).overlaps(&rect(5.0, 0.0, 5.0, 5.0)));
        // Containment
        assert!(rect(0.0, 0.0, 50.0, 50.0).overlaps(&rect(10.0, 10.0, 5.0, 5.0)));
    }

    #[test]
    fn test_shrink_keeps_center() {
        let raw = rect(10.0, 20.0, 50.0, 30.0);
        let shrunk = raw.shrink(0.8);
        assert!((shrunk.width - 40.0).abs() < 1e-12);
        assert!((shrunk.height - 24.0).abs() < 1e-12);
        assert!((shrunk.center().x - raw.center().x).abs() < 1e-12);
        assert!((shrunk.center().y - raw.center().y).abs() < 1e-12);
    }

    #[test]
    fn test_screen_bounds_are_shrunk_extent() {
        let (house, ctx) = setup();
        let hb = HouseNdcBounds::compute(&house, &ctx).bounds;
        for room in &house.rooms[..2] {
            let raw = project_room_extent(room, &house, &hb, &ctx).unwrap();
            let bounds = compute_room_screen_bounds(room, &house, &hb, &ctx).unwrap();

            assert!(raw.area() > 0.0);
            assert!((bounds.area() - raw.area() * 0.64).abs() <= 1e-9 * raw.area());
            assert!((bounds.center().x - raw.center().x).abs() < 1e-9);
            assert!((bounds.center().y - raw.center().y).abs() < 1e-9);
            assert!(bounds.left >= raw.left && bounds.right() <= raw.right());
            assert!(bounds.top >= raw.top && bounds.bottom() <= raw.bottom());
        }
    }

    #[test]
    fn test_rooms_stay_within_house_footprint() {
        let (house, ctx) = setup();
        let hb = HouseNdcBounds::compute(&house, &ctx).bounds;
        let (left, top, width, height) = hb.screen_footprint();
        for room in &house.rooms[..2] {
            let raw = project_room_extent(room, &house, &hb, &ctx).unwrap();
            assert!(raw.left >= left - 1e-9);
            assert!(raw.top >= top - 1e-9);
            assert!(raw.right() <= left + width + 1e-9);
            assert!(raw.bottom() <= top + height + 1e-9);
        }
    }

    #[test]
    fn test_room_without_polygon_has_no_bounds() {
        let (house, ctx) = setup();
        let hb = HouseNdcBounds::compute(&house, &ctx).bounds;
        assert!(compute_room_screen_bounds(&house.rooms[2], &house, &hb, &ctx).is_none());
    }

    #[test]
    fn test_unprojectable_corners_yield_none() {
        let mut house = House::default();
        house.camera = CameraPose {
            x: 0.0,
            y: 0.0,
            z: 0.0,
            ..CameraPose::default()
        };
        house.rooms.push(Room {
            id: "point".into(),
            name: None,
            level: None,
            points: vec![[0.0, 0.0]],
            floor_visible: true,
            ceiling_visible: false,
        });
        let ctx = ProjectionContext::build(&house.camera, 100, 100).unwrap();
        let hb = HouseNdcBounds::FULL_VIEW;
        assert!(compute_room_screen_bounds(&house.rooms[0], &house, &hb, &ctx).is_none());
    }

    #[test]
    fn test_expand_to_include_never_shrinks() {
        let r = rect(10.0, 10.0, 20.0, 20.0);
        assert_eq!(r.expand_to_include(Point2::new(15.0, 15.0)), r);

        let grown = r.expand_to_include(Point2::new(40.0, 5.0));
        assert_eq!(grown, rect(10.0, 5.0, 30.0, 25.0));
        assert!(grown.contains(Point2::new(40.0, 5.0)));
        assert!(grown.area() >= r.area());
    }

    #[test]
    fn test_marker_size() {
        assert_eq!(rect(0.0, 0.0, 40.0, 10.0).marker_size(), (20, 5));
        assert_eq!(rect(0.0, 0.0, 10.0, 30.0).marker_size(), (7, 20));
        assert_eq!(rect(0.0, 0.0, 50.0, 0.0).marker_size(), (20, 1));
        assert_eq!(rect(0.0, 0.0, 0.0, 0.0).marker_size(), (1, 1));
    }
}
