//! Room-sized tap targets

use lumaplan_core::{Entity, House, Point2};
use lumaplan_projection::{compute_room_screen_bounds, HouseNdcBounds, ProjectionContext, RoomBounds};

/// Screen bounds of the room holding the entity's first piece.
///
/// `None` when the piece is in no room on its level or the room does not
/// project.
pub fn entity_room_bounds(
    entity: &Entity,
    house: &House,
    house_bounds: &HouseNdcBounds,
    ctx: &ProjectionContext,
) -> Option<RoomBounds> {
    let piece = entity.piece_ids.first().and_then(|id| house.piece(id))?;
    let room = house.room_at(Point2::new(piece.x, piece.y), piece.level.as_deref())?;
    compute_room_screen_bounds(room, house, house_bounds, ctx)
}

/// Room bounds grown to contain the entity's icon anchor.
pub fn clickable_bounds(
    entity: &Entity,
    house: &House,
    house_bounds: &HouseNdcBounds,
    ctx: &ProjectionContext,
) -> Option<RoomBounds> {
    let bounds = entity_room_bounds(entity, house, house_bounds, ctx)?;
    let anchor = entity.position();
    if bounds.contains(anchor) {
        return Some(bounds);
    }
    log::warn!(
        "Icon of {} at ({:.2}%, {:.2}%) lies outside its room area, expanding the area",
        entity.name,
        anchor.x,
        anchor.y
    );
    Some(bounds.expand_to_include(anchor))
}
