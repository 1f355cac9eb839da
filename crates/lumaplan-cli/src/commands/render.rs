//! Render command: every light combination plus the layout document

use super::{build_plan, load_config, load_house};
use anyhow::{Context, Result};
use lumaplan_core::LightMixingMode;
use lumaplan_render::{RenderOrchestrator, SchematicRenderer};
use std::path::PathBuf;

pub struct RenderArgs {
    pub house: String,
    pub config: Option<String>,
    pub output: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub mode: Option<String>,
    pub no_reuse: bool,
}

pub fn run(args: RenderArgs) -> Result<()> {
    let mut config = load_config(args.config.as_deref())?;
    if let Some(output) = &args.output {
        config.output.dir = PathBuf::from(output);
    }
    if let Some(width) = args.width {
        config.render.width = width;
    }
    if let Some(height) = args.height {
        config.render.height = height;
    }
    if let Some(mode) = &args.mode {
        config.render.light_mixing_mode = mode.parse::<LightMixingMode>()?;
    }
    if args.no_reuse {
        config.render.use_existing_renders = false;
    }
    config.validate()?;

    let mut house = load_house(&args.house)?;
    let plan = build_plan(&args.house, house.clone(), config)?;

    let report = plan.overlap_report();
    for warning in &report.warnings {
        log::warn!("{}", warning.message);
    }

    let mut orchestrator = RenderOrchestrator::new(SchematicRenderer::new(house.clone()));
    let summary = orchestrator
        .run(&plan, &mut house)
        .context("Render pass failed")?;

    println!(
        "Rendered {} of {} frame(s) ({} reused)",
        summary.rendered, summary.total, summary.reused
    );
    println!("Floor plan written to {}", summary.document.display());
    Ok(())
}
