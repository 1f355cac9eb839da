//! Deterministic built-in renderer
//!
//! Paints projected room floors and a radial glow per powered light. Uses
//! the same projection as icon placement, so its frames line up with the
//! layout document.

use crate::progress::CancelToken;
use crate::renderer::{FrameRequest, PhotoRenderer};
use image::{Rgb, RgbImage};
use lumaplan_core::{CameraPose, House, Point2, Quality, Result, WorldPoint};
use lumaplan_projection::ProjectionContext;

const BACKGROUND: [f32; 3] = [24.0, 24.0, 28.0];
const FLOOR: [f32; 3] = [150.0, 140.0, 125.0];
const GLOW: [f32; 3] = [255.0, 200.0, 120.0];

/// Glow radius at full power, as a share of the shorter frame side
const GLOW_RADIUS: f64 = 0.2;

/// Ambient light factor outside 07:00..19:00 (UTC) when the scene fixes a time
const NIGHT_AMBIENT: f32 = 0.35;

const MILLIS_PER_HOUR: i64 = 3_600_000;

pub struct SchematicRenderer {
    house: House,
    /// Projection of the last frame, keyed by camera and frame size
    cached: Option<(CameraPose, u32, u32, ProjectionContext)>,
}

impl SchematicRenderer {
    pub fn new(house: House) -> Self {
        Self {
            house,
            cached: None,
        }
    }

    fn projection(&mut self, camera: &CameraPose, width: u32, height: u32) -> Result<ProjectionContext> {
        if let Some((cam, w, h, ctx)) = &self.cached {
            if cam == camera && *w == width && *h == height {
                return Ok(*ctx);
            }
        }
        let ctx = ProjectionContext::build(camera, width, height)?;
        self.cached = Some((*camera, width, height, ctx));
        Ok(ctx)
    }

    fn paint_floors(&self, frame: &mut RgbImage, ctx: &ProjectionContext, ambient: f32) {
        let (width, height) = frame.dimensions();
        let floor = scale(FLOOR, ambient);
        for room in &self.house.rooms {
            if !room.floor_visible || !self.house.is_level_shown(room.level.as_deref()) {
                continue;
            }
            let (elevation, _) = self.house.room_elevation_and_height(room);
            let polygon: Option<Vec<Point2>> = room
                .points
                .iter()
                .map(|[x, y]| {
                    ctx.project_to_viewport_percent(WorldPoint::new(*x, *y, elevation))
                        .map(|p| to_pixels(p, width, height))
                })
                .collect();
            let Some(polygon) = polygon.filter(|p| p.len() >= 3) else {
                log::debug!("Room {} does not project, skipping", room.label());
                continue;
            };

            let (min, max) = pixel_box(&polygon, width, height);
            for py in min.1..max.1 {
                for px in min.0..max.0 {
                    let center = Point2::new(px as f64 + 0.5, py as f64 + 0.5);
                    if polygon_contains(&polygon, center) {
                        frame.put_pixel(px, py, floor);
                    }
                }
            }
        }
    }

    fn paint_glow(
        &self,
        frame: &mut RgbImage,
        ctx: &ProjectionContext,
        request: &FrameRequest,
        cancel: &CancelToken,
    ) -> Result<()> {
        let (width, height) = frame.dimensions();
        for (piece_id, power) in &request.powered {
            cancel.check()?;
            if request.hidden.contains(piece_id) {
                continue;
            }
            let Some(piece) = self.house.piece(piece_id) else {
                log::debug!("Powered piece {} is not in the house model", piece_id);
                continue;
            };
            let level_offset = piece
                .level
                .as_deref()
                .and_then(|id| self.house.level(id))
                .map_or(0.0, |l| l.elevation);
            let top = WorldPoint::new(piece.x, piece.y, piece.elevation + piece.height + level_offset);
            let Some(center) = ctx.project_to_viewport_percent(top) else {
                continue;
            };
            let center = to_pixels(center, width, height);
            let power = power.clamp(0.0, 1.0) as f32;
            let radius = GLOW_RADIUS * width.min(height) as f64 * (0.5 + power as f64);

            let corners = [
                Point2::new(center.x - radius, center.y - radius),
                Point2::new(center.x + radius, center.y + radius),
            ];
            let (min, max) = pixel_box(&corners, width, height);
            for py in min.1..max.1 {
                for px in min.0..max.0 {
                    let d = Point2::new(px as f64 + 0.5, py as f64 + 0.5).distance_squared(&center).sqrt()
                        / radius;
                    if d >= 1.0 {
                        continue;
                    }
                    let falloff = match request.quality {
                        Quality::High => (1.0 - d).powi(2),
                        Quality::Low => 1.0 - d,
                    } as f32;
                    let px_ref = frame.get_pixel_mut(px, py);
                    for (channel, glow) in px_ref.0.iter_mut().zip(GLOW) {
                        *channel = (*channel as f32 + glow * falloff * power).min(255.0) as u8;
                    }
                }
            }
        }
        Ok(())
    }
}

impl PhotoRenderer for SchematicRenderer {
    fn name(&self) -> &str {
        "schematic"
    }

    fn render(
        &mut self,
        frame: &mut RgbImage,
        camera: &CameraPose,
        request: &FrameRequest,
        cancel: &CancelToken,
    ) -> Result<()> {
        cancel.check()?;
        let (width, height) = frame.dimensions();
        let ctx = self.projection(camera, width, height)?;
        let ambient = ambient_light(request.render_time);

        let background = scale(BACKGROUND, ambient);
        for px in frame.pixels_mut() {
            *px = background;
        }
        self.paint_floors(frame, &ctx, ambient);
        cancel.check()?;
        self.paint_glow(frame, &ctx, request, cancel)
    }

    fn dispose(&mut self) {
        self.cached = None;
    }
}

fn ambient_light(render_time: Option<i64>) -> f32 {
    let Some(millis) = render_time else {
        return 1.0;
    };
    let hour = millis.div_euclid(MILLIS_PER_HOUR).rem_euclid(24);
    if (7..19).contains(&hour) {
        1.0
    } else {
        NIGHT_AMBIENT
    }
}

fn scale(color: [f32; 3], factor: f32) -> Rgb<u8> {
    Rgb(color.map(|c| (c * factor).round().clamp(0.0, 255.0) as u8))
}

fn to_pixels(percent: Point2, width: u32, height: u32) -> Point2 {
    Point2::new(percent.x / 100.0 * width as f64, percent.y / 100.0 * height as f64)
}

/// Pixel range `[min, max)` covering `points`, clipped to the frame
fn pixel_box(points: &[Point2], width: u32, height: u32) -> ((u32, u32), (u32, u32)) {
    let clip = |v: f64, limit: u32| v.clamp(0.0, limit as f64) as u32;
    let (mut lo, mut hi) = (Point2::new(f64::MAX, f64::MAX), Point2::new(f64::MIN, f64::MIN));
    for p in points {
        lo = Point2::new(lo.x.min(p.x), lo.y.min(p.y));
        hi = Point2::new(hi.x.max(p.x), hi.y.max(p.y));
    }
    (
        (clip(lo.x.floor(), width), clip(lo.y.floor(), height)),
        (clip(hi.x.ceil(), width), clip(hi.y.ceil(), height)),
    )
}

/// Even-odd test
fn polygon_contains(polygon: &[Point2], point: Point2) -> bool {
    let mut inside = false;
    let mut j = polygon.len() - 1;
    for i in 0..polygon.len() {
        let (a, b) = (polygon[i], polygon[j]);
        if (a.y > point.y) != (b.y > point.y)
            && point.x < (b.x - a.x) * (point.y - a.y) / (b.y - a.y) + a.x
        {
            inside = !inside;
        }
        j = i;
    }
    inside
}
