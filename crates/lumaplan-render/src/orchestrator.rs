//! The render pass
//!
//! ```text
//! Idle -> [per scene: Prepare -> RenderBase
//!            -> [per group: [per combination: RenderCombination -> DeriveOverlay]]]
//!      -> Finalize -> Idle
//! ```
//!
//! Entity state is captured before the first scene and restored on every
//! exit path. Frames already written stay on disk after an interruption and
//! are picked up by the next pass when reuse is enabled.

use crate::assets::{AssetStore, TRANSPARENT_IMAGE_NAME};
use crate::compose::{diff_overlay, opaque, red_tint};
use crate::document::{placement_order, ClickableRect, EntityPlacement, FloorplanDocument, ImageLayer};
use crate::progress::{CancelToken, RenderProgress};
use crate::renderer::{FrameRequest, PhotoRenderer};
use crate::state::{EntityStateSource, StateGuard};
use image::RgbImage;
use lumaplan_core::{
    ClickableArea, Entity, ImageFormat, LightMixingMode, LumaplanError, Result, Scene,
};
use lumaplan_layout::{LayoutPlan, LightGroup};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderPhase {
    Idle,
    Prepare,
    RenderBase,
    RenderCombination,
    DeriveOverlay,
    Finalize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderSummary {
    pub total: usize,
    /// Frames produced by the renderer
    pub rendered: usize,
    /// Frames taken from the render cache
    pub reused: usize,
    pub document: PathBuf,
}

/// Values fixed for the duration of one pass
struct Pass<'p> {
    plan: &'p LayoutPlan,
    store: AssetStore,
    width: u32,
    height: u32,
    mode: LightMixingMode,
    frame_format: ImageFormat,
    rendered: usize,
    reused: usize,
    layers: Vec<ImageLayer>,
}

pub struct RenderOrchestrator<R: PhotoRenderer> {
    renderer: R,
    progress: RenderProgress,
    cancel: CancelToken,
    phase: RenderPhase,
}

impl<R: PhotoRenderer> RenderOrchestrator<R> {
    pub fn new(renderer: R) -> Self {
        Self {
            renderer,
            progress: RenderProgress::new(),
            cancel: CancelToken::new(),
            phase: RenderPhase::Idle,
        }
    }

    /// Shares its counters with the orchestrator
    pub fn progress(&self) -> RenderProgress {
        self.progress.clone()
    }

    /// Cancelling it interrupts the active pass
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    pub fn phase(&self) -> RenderPhase {
        self.phase
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    /// Render every scene of the plan and write the layout document.
    ///
    /// `state` is the live entity state the renderer observes; it is
    /// restored before this returns. The renderer is disposed afterwards
    /// and the cancel token cleared, so a cancelled orchestrator can run
    /// again.
    pub fn run<S: EntityStateSource + ?Sized>(
        &mut self,
        plan: &LayoutPlan,
        state: &mut S,
    ) -> Result<RenderSummary> {
        let result = self.run_pass(plan, state);
        self.renderer.dispose();
        self.cancel.reset();
        self.phase = RenderPhase::Idle;
        match &result {
            Ok(summary) => log::info!(
                "Render pass finished: {} rendered, {} reused, document at {}",
                summary.rendered,
                summary.reused,
                summary.document.display()
            ),
            Err(e) if e.is_interrupted() => log::info!(
                "Render pass interrupted after {}/{} frames",
                self.progress.completed(),
                self.progress.total()
            ),
            Err(e) => log::error!("Render pass failed: {}", e),
        }
        result
    }

    fn run_pass<S: EntityStateSource + ?Sized>(
        &mut self,
        plan: &LayoutPlan,
        state: &mut S,
    ) -> Result<RenderSummary> {
        let config = plan.config();
        let catalog = plan.catalog();
        let scenes = config.effective_scenes();
        let total = plan.total_renders(scenes.len());
        self.progress.reset(total);
        log::info!(
            "Rendering {} frames across {} scene(s) with the {} renderer",
            total,
            scenes.len(),
            self.renderer.name()
        );

        let mode = config.render.light_mixing_mode;
        let mut pass = Pass {
            plan,
            store: AssetStore::new(&config.output, config.render.use_existing_renders),
            width: plan.projection().width(),
            height: plan.projection().height(),
            mode,
            frame_format: if mode == LightMixingMode::Overlay {
                ImageFormat::Png
            } else {
                config.render.image_format
            },
            rendered: 0,
            reused: 0,
            layers: Vec::new(),
        };

        let mut guard = StateGuard::new(state, catalog.all())?;
        for light in &catalog.other_level_lights {
            guard.set_entity_power(light, false)?;
        }

        for scene in &scenes {
            self.render_scene(&mut pass, &mut guard, scene)?;
        }

        self.phase = RenderPhase::Finalize;
        let document = self.finalize(&pass)?;
        Ok(RenderSummary {
            total,
            rendered: pass.rendered,
            reused: pass.reused,
            document,
        })
    }

    fn render_scene<S: EntityStateSource + ?Sized>(
        &mut self,
        pass: &mut Pass<'_>,
        guard: &mut StateGuard<'_, S>,
        scene: &Scene,
    ) -> Result<()> {
        self.phase = RenderPhase::Prepare;
        self.cancel.check()?;
        pass.store.prepare_scene_dirs(scene)?;
        let plan = pass.plan;
        let catalog = plan.catalog();
        for entity in catalog.visible() {
            guard.set_entity_visible(entity, !scene.hides(&entity.name))?;
        }
        for light in &catalog.lights {
            guard.set_entity_power(light, light.always_on)?;
        }

        self.phase = RenderPhase::RenderBase;
        let base_name = scene.asset_name("base");
        let base = self.acquire_frame(pass, guard, scene, &base_name)?;
        let extension = pass.store.save_frame(&base_name, &base, pass.frame_format)?;
        let image = pass.store.versioned_url(&base_name, extension)?;
        pass.layers.push(ImageLayer::base(scene, base_name, image));

        for group in plan.groups() {
            self.render_group(pass, guard, scene, group, &base)?;
        }
        Ok(())
    }

    fn render_group<S: EntityStateSource + ?Sized>(
        &mut self,
        pass: &mut Pass<'_>,
        guard: &mut StateGuard<'_, S>,
        scene: &Scene,
        group: &LightGroup,
        base: &RgbImage,
    ) -> Result<()> {
        let plan = pass.plan;
        let catalog = plan.catalog();
        let config = plan.config();
        let members = group.resolve(catalog);

        for lit in group.combinations(catalog) {
            self.phase = RenderPhase::RenderCombination;
            // tint follows the first lit light
            let rgb = lit.first().is_some_and(|e| e.is_rgb);
            let create_overlay = match pass.mode {
                LightMixingMode::Overlay => true,
                LightMixingMode::Css => rgb,
                LightMixingMode::Full => false,
            };
            let names: Vec<&str> = lit.iter().map(|e| e.name.as_str()).collect();
            let name = scene.asset_name(&names.join("_"));
            for light in &catalog.lights {
                let on = light.always_on || lit.iter().any(|e| e.name == light.name);
                guard.set_entity_power(light, on)?;
            }
            let frame = self.acquire_frame(pass, guard, scene, &name)?;

            self.phase = RenderPhase::DeriveOverlay;
            let (derived, extension) = if create_overlay {
                let overlay = diff_overlay(base, &frame, config.render.sensitivity)?;
                pass.store.save_png(&name, &overlay)?;
                (Some(overlay), "png")
            } else {
                (None, pass.store.save_frame(&name, &frame, pass.frame_format)?)
            };
            let image = pass.store.versioned_url(&name, extension)?;

            let tint = if rgb {
                let source = derived.unwrap_or_else(|| opaque(&frame));
                let red_name = format!("{}.red", name);
                pass.store.save_png(&red_name, &red_tint(&source))?;
                Some(pass.store.versioned_url(&red_name, "png")?)
            } else {
                None
            };

            pass.layers.push(ImageLayer {
                scene: scene.name.clone(),
                name,
                conditions: ImageLayer::combination_conditions(&members, &lit, scene),
                image,
                blend_lighten: pass.mode == LightMixingMode::Css,
                tint,
            });
        }
        Ok(())
    }

    /// A cached frame when reuse finds one, else a fresh render written to
    /// the cache. Either way the frame counts toward progress.
    fn acquire_frame<S: EntityStateSource + ?Sized>(
        &mut self,
        pass: &mut Pass<'_>,
        guard: &StateGuard<'_, S>,
        scene: &Scene,
        name: &str,
    ) -> Result<RgbImage> {
        self.cancel.check()?;
        if let Some(frame) = pass.store.load_render(name, pass.width, pass.height) {
            pass.reused += 1;
            let done = self.progress.advance();
            log::info!("[{}/{}] reused {}", done, self.progress.total(), name);
            return Ok(frame);
        }

        let request = FrameRequest::capture(
            guard.source(),
            guard.snapshot(),
            scene,
            pass.plan.config().render.quality,
        );
        let mut frame = RgbImage::new(pass.width, pass.height);
        let camera = pass.plan.house().camera;
        self.renderer
            .render(&mut frame, &camera, &request, &self.cancel)?;
        self.cancel.check()?;
        if frame.dimensions() != (pass.width, pass.height) {
            return Err(LumaplanError::RenderError(format!(
                "{} returned a {}x{} frame for {}, expected {}x{}",
                self.renderer.name(),
                frame.width(),
                frame.height(),
                name,
                pass.width,
                pass.height
            )));
        }

        if let Err(e) = pass.store.save_render(name, &frame) {
            log::warn!("Failed to cache render {}: {}", name, e);
        }
        pass.rendered += 1;
        let done = self.progress.advance();
        log::info!("[{}/{}] rendered {}", done, self.progress.total(), name);
        Ok(frame)
    }

    fn finalize(&self, pass: &Pass<'_>) -> Result<PathBuf> {
        let plan = pass.plan;
        pass.store.write_transparent(pass.width, pass.height)?;
        let background = pass.store.versioned_url(TRANSPARENT_IMAGE_NAME, "png")?;
        let mut document = FloorplanDocument::new(pass.width, pass.height, pass.mode, background);
        document.layers = pass.layers.clone();

        let mut entities: Vec<&Entity> = plan.catalog().visible().filter(|e| !e.always_on).collect();
        entities.sort_by(|a, b| placement_order(a, b));
        for entity in entities {
            let area = match entity.clickable_area {
                ClickableArea::RoomSize => self.clickable_rect(pass, entity)?,
                ClickableArea::EntitySize => None,
            };
            document.entities.push(EntityPlacement::new(entity, area));
        }

        document.overlaps = plan.overlap_report().warnings;
        let path = pass.store.document_path();
        document.write(&path)?;
        Ok(path)
    }

    fn clickable_rect(&self, pass: &Pass<'_>, entity: &Entity) -> Result<Option<ClickableRect>> {
        let Some(bounds) = pass.plan.clickable_bounds(entity) else {
            log::warn!(
                "No room found for room-sized entity {}, falling back to its icon",
                entity.name
            );
            return Ok(None);
        };
        let (width, height) = bounds.marker_size();
        let marker = pass.store.ensure_marker(&entity.name, width, height)?;
        let image = pass.store.versioned_url(&marker, "png")?;
        Ok(Some(ClickableRect { bounds, image }))
    }
}
