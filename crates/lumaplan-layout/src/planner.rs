//! Derived layout state with an explicit recompute graph
//!
//! ```text
//! Camera ──────┐
//! Resolution ──┼─> projection ─> house bounds ─> entity positions
//! Levels ──────┘
//! Levels, MixingMode, Entities ─> light groups
//! Entities, EntityOptions ─> entity positions
//! ```

use crate::groups::{build_light_groups, total_renders, LightGroup};
use crate::icons::{position_entities, RelaxOutcome};
use crate::overlap::{check_room_overlaps, OverlapReport};
use lumaplan_core::{
    CameraPose, Entity, EntityCatalog, House, LightMixingMode, LumaplanConfig, Result,
};
use lumaplan_projection::{HouseBoundsOutcome, HouseNdcBounds, ProjectionContext, RoomBounds};

/// A change reported by the caller
#[derive(Debug, Clone)]
pub enum PlanChange {
    Camera(CameraPose),
    Resolution { width: u32, height: u32 },
    Levels {
        selected: Option<String>,
        all_visible: bool,
    },
    MixingMode(LightMixingMode),
    /// A freshly built catalog replaces the current one
    Entities(EntityCatalog),
    /// Always-on, RGB, area type or pins changed through `catalog_mut`
    EntityOptions,
}

pub struct LayoutPlan {
    house: House,
    catalog: EntityCatalog,
    config: LumaplanConfig,
    ctx: ProjectionContext,
    bounds: HouseBoundsOutcome,
    groups: Vec<LightGroup>,
    relax: Option<RelaxOutcome>,
}

impl LayoutPlan {
    pub fn new(house: House, catalog: EntityCatalog, config: LumaplanConfig) -> Result<Self> {
        let ctx = ProjectionContext::build(&house.camera, config.render.width, config.render.height)?;
        let bounds = HouseNdcBounds::compute(&house, &ctx);
        let mut plan = Self {
            house,
            catalog,
            config,
            ctx,
            bounds,
            groups: Vec::new(),
            relax: None,
        };
        plan.regroup();
        plan.reposition()?;
        Ok(plan)
    }

    /// Apply one change and recompute exactly what depends on it.
    pub fn apply(&mut self, change: PlanChange) -> Result<()> {
        match change {
            PlanChange::Camera(camera) => {
                self.house.camera = camera;
                self.reproject()?;
            }
            PlanChange::Resolution { width, height } => {
                self.config.render.width = width;
                self.config.render.height = height;
                self.reproject()?;
            }
            PlanChange::Levels {
                selected,
                all_visible,
            } => {
                self.house.selected_level = selected;
                self.house.all_levels_visible = all_visible;
                self.reproject()?;
                self.regroup();
            }
            PlanChange::MixingMode(mode) => {
                self.config.render.light_mixing_mode = mode;
                self.regroup();
            }
            PlanChange::Entities(catalog) => {
                self.catalog = catalog;
                self.regroup();
                self.reposition()?;
            }
            PlanChange::EntityOptions => {
                self.reposition()?;
            }
        }
        Ok(())
    }

    fn reproject(&mut self) -> Result<()> {
        self.ctx = ProjectionContext::build(
            &self.house.camera,
            self.config.render.width,
            self.config.render.height,
        )?;
        self.bounds = HouseNdcBounds::compute(&self.house, &self.ctx);
        self.reposition()
    }

    fn regroup(&mut self) {
        self.groups = build_light_groups(
            self.config.render.light_mixing_mode,
            &self.catalog,
            &self.house,
        );
    }

    fn reposition(&mut self) -> Result<()> {
        let relax = self
            .config
            .layout
            .avoid_icon_overlap
            .then_some(self.config.layout.cluster_mode);
        self.relax = position_entities(&mut self.catalog, &self.house, &self.ctx, relax)?;
        Ok(())
    }

    pub fn house(&self) -> &House {
        &self.house
    }

    pub fn catalog(&self) -> &EntityCatalog {
        &self.catalog
    }

    /// Follow edits with `apply(PlanChange::EntityOptions)`.
    pub fn catalog_mut(&mut self) -> &mut EntityCatalog {
        &mut self.catalog
    }

    pub fn config(&self) -> &LumaplanConfig {
        &self.config
    }

    pub fn projection(&self) -> &ProjectionContext {
        &self.ctx
    }

    pub fn house_bounds(&self) -> &HouseBoundsOutcome {
        &self.bounds
    }

    pub fn groups(&self) -> &[LightGroup] {
        &self.groups
    }

    pub fn relax_outcome(&self) -> Option<RelaxOutcome> {
        self.relax
    }

    /// Frames a full run renders across `scene_count` scenes
    pub fn total_renders(&self, scene_count: usize) -> usize {
        total_renders(
            self.groups
                .iter()
                .map(|g| g.controllable_count(&self.catalog)),
            scene_count,
        )
    }

    pub fn overlap_report(&self) -> OverlapReport {
        check_room_overlaps(&self.catalog, &self.house, &self.bounds.bounds, &self.ctx)
    }

    pub fn clickable_bounds(&self, entity: &Entity) -> Option<RoomBounds> {
        crate::clickable::clickable_bounds(entity, &self.house, &self.bounds.bounds, &self.ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lumaplan_core::Point2;

    fn house() -> House {
        House::from_toml(
            r#"
selected_level = "ground"

[camera]
x = 200.0
y = 200.0
z = 1500.0
pitch = 1.5707963267948966
field_of_view = 1.2

[[levels]]
id = "ground"

[[levels]]
id = "upper"
elevation = 300.0

[[rooms]]
id = "kitchen"
level = "ground"
points = [[0.0, 0.0], [200.0, 0.0], [200.0, 400.0], [0.0, 400.0]]

[[rooms]]
id = "dining"
level = "ground"
points = [[200.0, 0.0], [400.0, 0.0], [400.0, 400.0], [200.0, 400.0]]

[[furniture]]
kind = "piece"
id = "p1"
name = "light.kitchen"
x = 100.0
y = 100.0
level = "ground"
light = true

[[furniture]]
kind = "piece"
id = "p2"
name = "light.sink"
x = 100.0
y = 300.0
level = "ground"
light = true

[[furniture]]
kind = "piece"
id = "p3"
name = "light.dining"
x = 300.0
y = 200.0
level = "ground"
light = true
"#,
        )
        .unwrap()
    }

    fn plan() -> LayoutPlan {
        let h = house();
        let catalog = EntityCatalog::from_house(&h);
        LayoutPlan::new(h, catalog, LumaplanConfig::default()).unwrap()
    }

    #[test]
    fn test_initial_plan() {
        let plan = plan();
        assert_eq!(plan.groups().len(), 3);
        assert_eq!(plan.total_renders(1), 4);
        assert_eq!(plan.total_renders(2), 8);
        assert!(plan.house_bounds().warning.is_none());
        assert!(plan.relax_outcome().is_some());
    }

    #[test]
    fn test_mixing_mode_change_regroups() {
        let mut plan = plan();
        plan.apply(PlanChange::MixingMode(LightMixingMode::Overlay))
            .unwrap();
        let names: Vec<&str> = plan.groups().iter().map(|g| g.name.as_str()).collect();
        assert_eq!(names, vec!["dining", "kitchen"]);
        // 1 + (2^1 - 1) + (2^2 - 1)
        assert_eq!(plan.total_renders(1), 5);

        plan.apply(PlanChange::MixingMode(LightMixingMode::Full))
            .unwrap();
        assert_eq!(plan.total_renders(1), 8);
    }

    #[test]
    fn test_resolution_change_rebuilds_projection() {
        let mut plan = plan();
        let before = *plan.projection();
        plan.apply(PlanChange::Resolution {
            width: 800,
            height: 800,
        })
        .unwrap();
        assert_ne!(before, *plan.projection());
        assert_eq!(plan.projection().width(), 800);
    }

    #[test]
    fn test_entity_options_keep_pins() {
        let mut plan = plan();
        {
            let catalog = plan.catalog_mut();
            catalog.find_mut("light.dining").unwrap().always_on = true;
            catalog.find_mut("light.kitchen").unwrap().pin(Point2::new(5.0, 5.0));
        }
        plan.apply(PlanChange::EntityOptions).unwrap();
        assert_eq!(plan.total_renders(1), 3);
        assert_eq!(
            plan.catalog().find("light.kitchen").unwrap().position(),
            Point2::new(5.0, 5.0)
        );

        plan.apply(PlanChange::Camera(CameraPose {
            x: 0.0,
            ..plan.house().camera
        }))
        .unwrap();
        assert_eq!(
            plan.catalog().find("light.kitchen").unwrap().position(),
            Point2::new(5.0, 5.0)
        );
    }

    #[test]
    fn test_hidden_level_falls_back_to_full_view() {
        let mut plan = plan();
        plan.apply(PlanChange::Levels {
            selected: Some("upper".into()),
            all_visible: false,
        })
        .unwrap();
        assert!(plan.house_bounds().warning.is_some());
        assert_eq!(plan.house_bounds().bounds, HouseNdcBounds::FULL_VIEW);
    }
}
