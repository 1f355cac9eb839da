//! Room overlap validation command

use super::{build_plan, load_config, load_house, print_json};
use anyhow::Result;
use lumaplan_layout::OverlapReport;

pub struct ValidateArgs {
    pub house: String,
    pub config: Option<String>,
    pub format: String,
}

pub fn run(args: ValidateArgs) -> Result<()> {
    let report = check(&args)?;

    if args.format == "json" {
        print_report_json(&report)?;
    } else {
        print_report_text(&report);
    }

    let code = exit_code(&report);
    if code != 0 {
        std::process::exit(code);
    }
    Ok(())
}

fn check(args: &ValidateArgs) -> Result<OverlapReport> {
    let config = load_config(args.config.as_deref())?;
    let house = load_house(&args.house)?;
    let plan = build_plan(&args.house, house, config)?;
    Ok(plan.overlap_report())
}

/// Any overlap fails validation; rendering still proceeds with overlaps
fn exit_code(report: &OverlapReport) -> i32 {
    if report.is_empty() {
        0
    } else {
        1
    }
}

fn print_report_text(report: &OverlapReport) {
    println!("{}", report.summary());
    if report.is_empty() {
        return;
    }
    println!();

    for warning in &report.warnings {
        println!(
            "  [WARN ] {} / {}: {}",
            warning.first, warning.second, warning.message
        );
    }
}

fn print_report_json(report: &OverlapReport) -> Result<()> {
    print_json(&serde_json::json!({
        "valid": report.is_empty(),
        "summary": report.summary(),
        "overlaps": report.warnings,
    }))
}
