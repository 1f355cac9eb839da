//! Render plan summary command

use super::{build_plan, load_config, load_house, print_json};
use anyhow::Result;
use lumaplan_core::LightMixingMode;
use lumaplan_layout::combination_count;

pub struct PlanArgs {
    pub house: String,
    pub config: Option<String>,
    pub mode: Option<String>,
    pub format: String,
}

pub fn run(args: PlanArgs) -> Result<()> {
    let mut config = load_config(args.config.as_deref())?;
    if let Some(mode) = &args.mode {
        config.render.light_mixing_mode = mode.parse::<LightMixingMode>()?;
    }
    let scenes = config.effective_scenes();
    let house = load_house(&args.house)?;
    let plan = build_plan(&args.house, house, config)?;
    let catalog = plan.catalog();
    let total = plan.total_renders(scenes.len());

    if args.format == "json" {
        let groups: Vec<serde_json::Value> = plan
            .groups()
            .iter()
            .map(|g| {
                let controllable = g.controllable_count(catalog);
                serde_json::json!({
                    "name": g.name,
                    "members": g.members,
                    "controllable": controllable,
                    "combinations": combination_count(controllable),
                    "rgb_members": g
                        .resolve(catalog)
                        .iter()
                        .filter(|e| e.is_rgb)
                        .map(|e| e.name.as_str())
                        .collect::<Vec<_>>(),
                })
            })
            .collect();
        let scene_names: Vec<&str> = scenes.iter().map(|s| s.name.as_str()).collect();
        return print_json(&serde_json::json!({
            "light_mixing_mode": plan.config().render.light_mixing_mode,
            "width": plan.config().render.width,
            "height": plan.config().render.height,
            "scenes": scene_names,
            "groups": groups,
            "other_level_lights": catalog.other_level_lights.len(),
            "total_renders": total,
        }));
    }

    let render = &plan.config().render;
    println!(
        "Light mixing mode: {} ({}x{})",
        render.light_mixing_mode, render.width, render.height
    );
    println!();

    if plan.groups().is_empty() {
        println!("No lights to render.");
    } else {
        println!("Groups ({}):", plan.groups().len());
        for group in plan.groups() {
            let controllable = group.controllable_count(catalog);
            println!(
                "  {:<24} {} light(s), {} combination(s)",
                group.name,
                group.members.len(),
                combination_count(controllable)
            );
            for member in group.resolve(catalog) {
                let always_on = if member.always_on { " (always on)" } else { "" };
                let rgb = if member.is_rgb { " [rgb]" } else { "" };
                println!("    - {}{}{}", member.name, always_on, rgb);
            }
        }
    }

    if !catalog.other_level_lights.is_empty() {
        println!();
        println!(
            "{} light(s) on hidden levels will be switched off",
            catalog.other_level_lights.len()
        );
    }

    println!();
    if scenes.len() > 1 {
        let names: Vec<&str> = scenes.iter().map(|s| s.name.as_str()).collect();
        println!("Scenes: {}", names.join(", "));
    }
    println!("Total renders: {}", total);

    Ok(())
}
