//! Light groups: the units rendered combinatorially

use crate::combination::{combination_count, enumerate_combinations};
use lumaplan_core::{Entity, EntityCatalog, House, LightMixingMode, Point2};
use serde::Serialize;
use std::collections::BTreeMap;

const HOUSE_GROUP_NAME: &str = "Home";

/// Named set of lights, referenced by entity name
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LightGroup {
    pub name: String,
    pub members: Vec<String>,
}

impl LightGroup {
    /// Member entities, resolved against the catalog in member order
    pub fn resolve<'a>(&self, catalog: &'a EntityCatalog) -> Vec<&'a Entity> {
        self.members
            .iter()
            .filter_map(|name| catalog.lights.iter().find(|e| &e.name == name))
            .collect()
    }

    pub fn controllable_count(&self, catalog: &EntityCatalog) -> usize {
        self.resolve(catalog).iter().filter(|e| !e.always_on).count()
    }

    /// Combinations of this group's controllable lights, in render order
    pub fn combinations<'a>(&self, catalog: &'a EntityCatalog) -> Vec<Vec<&'a Entity>> {
        enumerate_combinations(&self.resolve(catalog), |e| e.always_on)
    }
}

/// Group the catalog's lights according to `mode`.
///
/// Groups come back ordered by name.
pub fn build_light_groups(
    mode: LightMixingMode,
    catalog: &EntityCatalog,
    house: &House,
) -> Vec<LightGroup> {
    let mut groups: BTreeMap<String, Vec<String>> = BTreeMap::new();
    match mode {
        LightMixingMode::Css => {
            for light in &catalog.lights {
                groups.insert(light.name.clone(), vec![light.name.clone()]);
            }
        }
        LightMixingMode::Overlay => {
            for room in &house.rooms {
                if !house.is_level_shown(room.level.as_deref()) {
                    continue;
                }
                for light in &catalog.lights {
                    let Some(piece) = light.piece_ids.first().and_then(|id| house.piece(id)) else {
                        continue;
                    };
                    if room.is_on_level(piece.level.as_deref())
                        && room.contains_point(Point2::new(piece.x, piece.y))
                    {
                        groups
                            .entry(room.label().to_string())
                            .or_default()
                            .push(light.name.clone());
                    }
                }
            }
        }
        LightMixingMode::Full => {
            groups.insert(
                HOUSE_GROUP_NAME.to_string(),
                catalog.lights.iter().map(|e| e.name.clone()).collect(),
            );
        }
    }
    groups
        .into_iter()
        .map(|(name, members)| LightGroup { name, members })
        .collect()
}

/// Exact number of frames a run produces:
/// `scenes * (1 + sum over groups of (2^k - 1))`, `k` being each group's
/// controllable light count.
pub fn total_renders<I>(controllable_counts: I, scene_count: usize) -> usize
where
    I: IntoIterator<Item = usize>,
{
    if scene_count == 0 {
        return 0;
    }
    let per_scene = controllable_counts
        .into_iter()
        .fold(1usize, |acc, k| acc.saturating_add(combination_count(k)));
    per_scene.saturating_mul(scene_count)
}
