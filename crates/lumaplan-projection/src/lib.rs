//! lumaplan Projection - World to screen geometry
//!
//! Every generated asset is placed with the same projection the renderer
//! photographs with:
//! - `ProjectionContext` - camera translation plus perspective·pitch·yaw transform
//! - `HouseNdcBounds` - NDC footprint of all visible rooms
//! - `RoomBounds` - a room's clickable rectangle in viewport percent

mod bounds;
mod context;
mod room;

pub use bounds::{BoundsWarning, HouseBoundsOutcome, HouseNdcBounds};
pub use context::{ndc_to_percent, ProjectionContext, FAR_PLANE, NEAR_PLANE};
pub use room::{compute_room_screen_bounds, project_room_extent, RoomBounds};
