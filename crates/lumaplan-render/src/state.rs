//! Entity power and visibility with guaranteed restoration

use lumaplan_core::{Entity, House, LumaplanError, Result};
use std::collections::BTreeMap;

/// The host's mutable furniture state, addressed by piece id.
///
/// A render pass only touches pieces of the entities it was given.
pub trait EntityStateSource {
    /// Current power of a light piece; `None` for pieces that are not lights
    fn light_power(&self, piece_id: &str) -> Option<f64>;

    /// Set a light piece's power. Non-light pieces are left alone.
    fn set_light_power(&mut self, piece_id: &str, power: f64) -> Result<()>;

    /// `None` when the piece does not exist
    fn is_visible(&self, piece_id: &str) -> Option<bool>;

    fn set_visible(&mut self, piece_id: &str, visible: bool) -> Result<()>;
}

impl EntityStateSource for House {
    fn light_power(&self, piece_id: &str) -> Option<f64> {
        self.piece(piece_id).filter(|p| p.light).map(|p| p.power)
    }

    fn set_light_power(&mut self, piece_id: &str, power: f64) -> Result<()> {
        let piece = self
            .piece_mut(piece_id)
            .ok_or_else(|| LumaplanError::EntityNotFound(format!("piece {}", piece_id)))?;
        if piece.light {
            piece.power = power;
        }
        Ok(())
    }

    fn is_visible(&self, piece_id: &str) -> Option<bool> {
        self.piece(piece_id).map(|p| p.visible)
    }

    fn set_visible(&mut self, piece_id: &str, visible: bool) -> Result<()> {
        let piece = self
            .piece_mut(piece_id)
            .ok_or_else(|| LumaplanError::EntityNotFound(format!("piece {}", piece_id)))?;
        piece.visible = visible;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PieceState {
    pub power: Option<f64>,
    pub visible: bool,
}

/// Power and visibility of a set of pieces at one point in time
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StateSnapshot {
    pieces: BTreeMap<String, PieceState>,
}

impl StateSnapshot {
    pub fn capture<S, I>(source: &S, piece_ids: I) -> Result<Self>
    where
        S: EntityStateSource + ?Sized,
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let mut pieces = BTreeMap::new();
        for id in piece_ids {
            let id = id.as_ref();
            let visible = source
                .is_visible(id)
                .ok_or_else(|| LumaplanError::EntityNotFound(format!("piece {}", id)))?;
            pieces.insert(
                id.to_string(),
                PieceState {
                    power: source.light_power(id),
                    visible,
                },
            );
        }
        Ok(Self { pieces })
    }

    pub fn get(&self, piece_id: &str) -> Option<&PieceState> {
        self.pieces.get(piece_id)
    }

    pub fn piece_ids(&self) -> impl Iterator<Item = &str> {
        self.pieces.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.pieces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pieces.is_empty()
    }

    /// Write every captured value back. Keeps going past failures and
    /// reports how many pieces could not be restored.
    pub fn restore<S: EntityStateSource + ?Sized>(&self, source: &mut S) -> usize {
        let mut failures = 0;
        for (id, state) in &self.pieces {
            let mut result = source.set_visible(id, state.visible);
            if let Some(power) = state.power {
                result = result.and(source.set_light_power(id, power));
            }
            if let Err(e) = result {
                log::warn!("Failed to restore piece {}: {}", id, e);
                failures += 1;
            }
        }
        failures
    }
}

/// Scoped mutation of entity state. Dropping the guard restores the
/// snapshot taken at construction, on success, error and interruption alike.
pub struct StateGuard<'a, S: EntityStateSource + ?Sized> {
    source: &'a mut S,
    snapshot: StateSnapshot,
}

impl<'a, S: EntityStateSource + ?Sized> StateGuard<'a, S> {
    /// Snapshot the pieces of `entities` and take over their state
    pub fn new<'e, I>(source: &'a mut S, entities: I) -> Result<Self>
    where
        I: IntoIterator<Item = &'e Entity>,
    {
        let ids: Vec<&str> = entities
            .into_iter()
            .flat_map(|e| e.piece_ids.iter().map(String::as_str))
            .collect();
        let snapshot = StateSnapshot::capture(&*source, ids)?;
        Ok(Self { source, snapshot })
    }

    pub fn source(&self) -> &S {
        &*self.source
    }

    pub fn snapshot(&self) -> &StateSnapshot {
        &self.snapshot
    }

    /// Switch an entity's light pieces to their initial power or off
    pub fn set_entity_power(&mut self, entity: &Entity, on: bool) -> Result<()> {
        for id in &entity.piece_ids {
            let Some(initial) = self.snapshot.get(id).and_then(|s| s.power) else {
                continue;
            };
            self.source.set_light_power(id, if on { initial } else { 0.0 })?;
        }
        Ok(())
    }

    pub fn set_entity_visible(&mut self, entity: &Entity, visible: bool) -> Result<()> {
        for id in &entity.piece_ids {
            self.source.set_visible(id, visible)?;
        }
        Ok(())
    }
}

impl<S: EntityStateSource + ?Sized> Drop for StateGuard<'_, S> {
    fn drop(&mut self) {
        let failures = self.snapshot.restore(&mut *self.source);
        if failures == 0 {
            log::debug!("Restored state of {} pieces", self.snapshot.len());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lumaplan_core::EntityCatalog;

    fn house() -> House {
        House::from_toml(
            r#"
[[furniture]]
kind = "piece"
id = "lamp"
name = "light.lamp"
x = 10.0
y = 10.0
light = true
power = 0.8

[[furniture]]
kind = "piece"
id = "tv"
name = "media_player.tv"
x = 50.0
y = 10.0
"#,
        )
        .unwrap()
    }

    #[test]
    fn test_house_state_source() {
        let mut h = house();
        assert_eq!(h.light_power("lamp"), Some(0.8));
        assert_eq!(h.light_power("tv"), None);
        assert_eq!(h.is_visible("tv"), Some(true));

        h.set_light_power("tv", 1.0).unwrap();
        assert_eq!(h.light_power("tv"), None);
        assert!(h.set_visible("missing", false).is_err());
    }

    #[test]
    fn test_guard_restores_on_drop() {
        let mut h = house();
        let catalog = EntityCatalog::from_house(&h);
        {
            let mut guard = StateGuard::new(&mut h, catalog.all()).unwrap();
            let lamp = catalog.find("light.lamp").unwrap();
            let tv = catalog.find("media_player.tv").unwrap();
            guard.set_entity_power(lamp, false).unwrap();
            guard.set_entity_visible(tv, false).unwrap();
            assert_eq!(guard.source().light_power("lamp"), Some(0.0));
            assert_eq!(guard.source().is_visible("tv"), Some(false));

            guard.set_entity_power(lamp, true).unwrap();
            assert_eq!(guard.source().light_power("lamp"), Some(0.8));
            guard.set_entity_power(lamp, false).unwrap();
        }
        assert_eq!(h.light_power("lamp"), Some(0.8));
        assert_eq!(h.is_visible("tv"), Some(true));
    }

    #[test]
    fn test_guard_restores_after_early_return() {
        fn fail_midway(h: &mut House, catalog: &EntityCatalog) -> Result<()> {
            let mut guard = StateGuard::new(h, catalog.all())?;
            guard.set_entity_power(catalog.find("light.lamp").unwrap(), false)?;
            Err(LumaplanError::Interrupted)
        }

        let mut h = house();
        let catalog = EntityCatalog::from_house(&h);
        assert!(fail_midway(&mut h, &catalog).unwrap_err().is_interrupted());
        assert_eq!(h.light_power("lamp"), Some(0.8));
    }

    #[test]
    fn test_snapshot_rejects_unknown_piece() {
        let h = house();
        let err = StateSnapshot::capture(&h, ["lamp", "ghost"]).unwrap_err();
        assert!(matches!(err, LumaplanError::EntityNotFound(_)));
    }
}
