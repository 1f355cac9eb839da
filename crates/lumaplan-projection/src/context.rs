//! Camera projection shared by photography and UI placement

use glam::{DMat4, DVec2, DVec4};
use lumaplan_core::{CameraPose, LumaplanError, Point2, Result, WorldPoint};

pub const NEAR_PLANE: f64 = 0.1;
pub const FAR_PLANE: f64 = 100.0;

/// Map one NDC coordinate to a viewport percentage.
///
/// No axis is flipped: NDC -1 maps to 0% and +1 to 100% on both axes.
pub fn ndc_to_percent(ndc: f64) -> f64 {
    (ndc * 0.5 + 0.5) * 100.0
}

/// Projection for one camera pose and output size.
///
/// Rebuilt, never mutated, when the camera or resolution changes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectionContext {
    /// Camera position as (x, elevation, depth, 0)
    translation: DVec4,
    transform: DMat4,
    width: u32,
    height: u32,
}

impl ProjectionContext {
    pub fn build(camera: &CameraPose, width: u32, height: u32) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(LumaplanError::GeometryError(format!(
                "cannot project onto a {}x{} viewport",
                width, height
            )));
        }
        let aspect = width as f64 / height as f64;
        let perspective = perspective(camera.field_of_view, aspect, NEAR_PLANE, FAR_PLANE);
        let pitch = DMat4::from_rotation_x(-camera.pitch);
        let yaw = DMat4::from_rotation_y(camera.yaw);

        Ok(Self {
            translation: DVec4::new(camera.x, camera.z, camera.y, 0.0),
            transform: perspective * pitch * yaw,
            width,
            height,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn transform(&self) -> &DMat4 {
        &self.transform
    }

    /// Homogeneous clip-space position of a world point.
    pub fn clip(&self, point: WorldPoint) -> DVec4 {
        let world = DVec4::new(point.x, point.elevation, point.y, 1.0);
        self.transform * (world - self.translation)
    }

    /// Project to normalized device coordinates.
    ///
    /// Returns `None` when the perspective w is zero, NaN or infinite, i.e.
    /// the point sits in the camera plane.
    pub fn project_ndc(&self, point: WorldPoint) -> Option<DVec2> {
        let clip = self.clip(point);
        if clip.w == 0.0 || !clip.w.is_finite() {
            return None;
        }
        let ndc = DVec2::new(clip.x / clip.w, clip.y / clip.w);
        if ndc.is_finite() {
            Some(ndc)
        } else {
            None
        }
    }

    /// Project to viewport percentages, used for furniture anchors.
    pub fn project_to_viewport_percent(&self, point: WorldPoint) -> Option<Point2> {
        self.project_ndc(point)
            .map(|ndc| Point2::new(ndc_to_percent(ndc.x), ndc_to_percent(ndc.y)))
    }
}

/// Perspective matrix with a horizontal field of view; clip w is -z.
fn perspective(fov: f64, aspect: f64, near: f64, far: f64) -> DMat4 {
    let half = fov * 0.5;
    let cot = half.cos() / half.sin();
    let depth = far - near;

    // Column-major
    DMat4::from_cols_array(&[
        cot,
        0.0,
        0.0,
        0.0,
        0.0,
        cot * aspect,
        0.0,
        0.0,
        0.0,
        0.0,
        (far + near) / depth,
        -1.0,
        0.0,
        0.0,
        2.0 * near * far / depth,
        0.0,
    ])
}
