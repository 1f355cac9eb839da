//! Overlap diagnostics for room-sized tap targets

use crate::clickable::entity_room_bounds;
use lumaplan_core::{ClickableArea, EntityCatalog, House};
use lumaplan_projection::{HouseNdcBounds, ProjectionContext, RoomBounds};
use serde::Serialize;

/// Two room-sized entities whose tap targets overlap
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverlapWarning {
    pub first: String,
    pub second: String,
    pub first_bounds: RoomBounds,
    pub second_bounds: RoomBounds,
    pub message: String,
}

#[derive(Debug, Default, Clone, Serialize)]
pub struct OverlapReport {
    pub warnings: Vec<OverlapWarning>,
}

impl OverlapReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.warnings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.warnings.is_empty()
    }

    /// Get a human-readable summary
    pub fn summary(&self) -> String {
        let total = self.warnings.len();
        if total == 0 {
            return "No overlapping room-sized areas.".to_string();
        }
        format!("{} overlapping room-sized area pair(s)", total)
    }
}

/// Compare every pair of room-sized entities' room bounds.
///
/// Entities whose room cannot be resolved are skipped.
pub fn check_room_overlaps(
    catalog: &EntityCatalog,
    house: &House,
    house_bounds: &HouseNdcBounds,
    ctx: &ProjectionContext,
) -> OverlapReport {
    let room_sized: Vec<_> = catalog
        .visible()
        .filter(|e| e.clickable_area == ClickableArea::RoomSize)
        .map(|e| (e, entity_room_bounds(e, house, house_bounds, ctx)))
        .collect();

    let mut report = OverlapReport::new();
    for (i, (a, a_bounds)) in room_sized.iter().enumerate() {
        for (b, b_bounds) in &room_sized[i + 1..] {
            let (Some(a_bounds), Some(b_bounds)) = (a_bounds, b_bounds) else {
                continue;
            };
            if a_bounds.overlaps(b_bounds) {
                let message = format!("Entity '{}' and Entity '{}'", a.name, b.name);
                log::warn!("Overlapping room-sized areas: {}", message);
                report.warnings.push(OverlapWarning {
                    first: a.name.clone(),
                    second: b.name.clone(),
                    first_bounds: *a_bounds,
                    second_bounds: *b_bounds,
                    message,
                });
            }
        }
    }
    report
}
