//! NDC footprint of the visible house

use crate::context::{ndc_to_percent, ProjectionContext};
use lumaplan_core::House;
use serde::{Deserialize, Serialize};

/// Union of all visible rooms' corners in NDC space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HouseNdcBounds {
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
}

impl Default for HouseNdcBounds {
    fn default() -> Self {
        Self::FULL_VIEW
    }
}

/// Why the full-view default was used instead of computed bounds
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BoundsWarning {
    /// No visible room contributed a corner
    NoPoints,
    /// Points existed but none projected, or the box collapsed on an axis
    Degenerate {
        min_x: f64,
        max_x: f64,
        min_y: f64,
        max_y: f64,
    },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HouseBoundsOutcome {
    /// Always clamped to [-1, 1]
    pub bounds: HouseNdcBounds,
    pub warning: Option<BoundsWarning>,
}

impl HouseNdcBounds {
    pub const FULL_VIEW: Self = Self {
        min_x: -1.0,
        max_x: 1.0,
        min_y: -1.0,
        max_y: 1.0,
    };

    /// Project every visible room's floor corners, plus ceiling corners for
    /// rooms with height and a visible ceiling, and take the NDC extent.
    ///
    /// Falls back to `FULL_VIEW` with a warning when nothing projects or the
    /// extent is degenerate.
    pub fn compute(house: &House, ctx: &ProjectionContext) -> HouseBoundsOutcome {
        let points: Vec<_> = house
            .rooms
            .iter()
            .filter(|room| house.is_level_shown(room.level.as_deref()))
            .filter(|room| !room.points.is_empty())
            .flat_map(|room| house.room_corners(room))
            .collect();

        if points.is_empty() {
            log::warn!("No points found to calculate house NDC bounds, defaulting to full view");
            return HouseBoundsOutcome {
                bounds: Self::FULL_VIEW,
                warning: Some(BoundsWarning::NoPoints),
            };
        }

        let mut min_x = f64::INFINITY;
        let mut max_x = f64::NEG_INFINITY;
        let mut min_y = f64::INFINITY;
        let mut max_y = f64::NEG_INFINITY;
        for ndc in points.iter().filter_map(|p| ctx.project_ndc(*p)) {
            min_x = min_x.min(ndc.x);
            max_x = max_x.max(ndc.x);
            min_y = min_y.min(ndc.y);
            max_y = max_y.max(ndc.y);
        }

        let unbounded = [min_x, max_x, min_y, max_y].iter().any(|v| v.is_infinite());
        if unbounded || min_x >= max_x || min_y >= max_y {
            log::warn!(
                "Invalid house NDC bounds (x {}..{}, y {}..{}), defaulting to full view",
                min_x,
                max_x,
                min_y,
                max_y
            );
            return HouseBoundsOutcome {
                bounds: Self::FULL_VIEW,
                warning: Some(BoundsWarning::Degenerate {
                    min_x,
                    max_x,
                    min_y,
                    max_y,
                }),
            };
        }

        log::debug!(
            "House NDC bounds: x {:.4}..{:.4}, y {:.4}..{:.4}",
            min_x,
            max_x,
            min_y,
            max_y
        );
        HouseBoundsOutcome {
            bounds: Self {
                min_x,
                max_x,
                min_y,
                max_y,
            }
            .clamped(),
            warning: None,
        }
    }

    pub fn clamped(&self) -> Self {
        Self {
            min_x: self.min_x.clamp(-1.0, 1.0),
            max_x: self.max_x.clamp(-1.0, 1.0),
            min_y: self.min_y.clamp(-1.0, 1.0),
            max_y: self.max_y.clamp(-1.0, 1.0),
        }
    }

    /// The house footprint in viewport percent as (left, top, width, height)
    pub fn screen_footprint(&self) -> (f64, f64, f64, f64) {
        let b = self.clamped();
        let left = ndc_to_percent(b.min_x);
        let top = ndc_to_percent(b.min_y);
        (
            left,
            top,
            ndc_to_percent(b.max_x) - left,
            ndc_to_percent(b.max_y) - top,
        )
    }
}
