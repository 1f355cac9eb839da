//! lumaplan Layout - Everything computed from geometry before rendering
//!
//! - `enumerate_combinations` - deterministic subsets of a light group
//! - `LightGroup` - lights rendered together combinatorially
//! - `compute_anchor`, `relax_overlaps` - icon placement
//! - `check_room_overlaps` - diagnostics for room-sized tap targets
//! - `LayoutPlan` - derived state recomputed on explicit changes

mod clickable;
mod combination;
mod groups;
mod icons;
mod overlap;
mod planner;

pub use clickable::{clickable_bounds, entity_room_bounds};
pub use combination::{combination_count, enumerate_combinations};
pub use groups::{build_light_groups, total_renders, LightGroup};
pub use icons::{
    compute_anchor, java_string_hash, position_entities, relax_overlaps, RelaxOutcome,
    ICON_RADIUS_PX, MAX_RELAX_ITERATIONS,
};
pub use overlap::{check_room_overlaps, OverlapReport, OverlapWarning};
pub use planner::{LayoutPlan, PlanChange};
