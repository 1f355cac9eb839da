//! Icon layout command

use super::{build_plan, load_config, load_house, print_json};
use anyhow::Result;
use lumaplan_core::Entity;
use lumaplan_layout::LayoutPlan;
use lumaplan_projection::BoundsWarning;

pub struct LayoutArgs {
    pub house: String,
    pub config: Option<String>,
    pub no_relax: bool,
    pub format: String,
}

pub fn run(args: LayoutArgs) -> Result<()> {
    let mut config = load_config(args.config.as_deref())?;
    if args.no_relax {
        config.layout.avoid_icon_overlap = false;
    }
    let house = load_house(&args.house)?;
    let plan = build_plan(&args.house, house, config)?;

    if args.format == "json" {
        print_layout_json(&plan)
    } else {
        print_layout_text(&plan);
        Ok(())
    }
}

fn print_layout_text(plan: &LayoutPlan) {
    match plan.house_bounds().warning {
        Some(BoundsWarning::NoPoints) => {
            println!("[WARN ] No visible room; icons are placed against the full view")
        }
        Some(BoundsWarning::Degenerate { .. }) => {
            println!("[WARN ] Visible rooms do not project; icons are placed against the full view")
        }
        None => {}
    }

    let entities: Vec<&Entity> = plan.catalog().visible().collect();
    if entities.is_empty() {
        println!("No entities found in house.");
        return;
    }

    println!("{:<32} {:>8} {:>8}", "ENTITY", "LEFT %", "TOP %");
    for entity in &entities {
        let position = entity.position();
        let pinned = if entity.is_pinned() { " [pinned]" } else { "" };
        println!(
            "{:<32} {:>8.2} {:>8.2}{}",
            entity.name, position.x, position.y, pinned
        );
    }

    println!();
    match plan.relax_outcome() {
        Some(outcome) if outcome.converged => println!(
            "Overlap relaxation converged after {} iteration(s)",
            outcome.iterations
        ),
        Some(outcome) => println!(
            "Overlap relaxation stopped after {} iteration(s) with icons still overlapping",
            outcome.iterations
        ),
        None => println!("Overlap relaxation disabled"),
    }
}

fn print_layout_json(plan: &LayoutPlan) -> Result<()> {
    let entities: Vec<serde_json::Value> = plan
        .catalog()
        .visible()
        .map(|e| {
            let position = e.position();
            serde_json::json!({
                "entity": e.name,
                "id": e.id,
                "left": position.x,
                "top": position.y,
                "pinned": e.is_pinned(),
                "clickable_area": e.clickable_area,
            })
        })
        .collect();
    let relax = plan.relax_outcome().map(|o| {
        serde_json::json!({
            "iterations": o.iterations,
            "converged": o.converged,
        })
    });
    print_json(&serde_json::json!({
        "entities": entities,
        "relaxation": relax,
    }))
}
