//! lumaplan CLI - floor-plan dashboards from a 3D house model

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{layout, pin, plan, render, validate};

#[derive(Parser)]
#[command(name = "lumaplan")]
#[command(about = "Render light combinations of a house model into a floor-plan dashboard", long_about = None)]
#[command(version)]
struct Cli {
    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file to use instead of the global and project layers
    #[arg(long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show light groups, combination counts and the total render count
    Plan {
        /// Path to house file
        house: String,

        /// Light grouping (css, overlay or full)
        #[arg(long)]
        mode: Option<String>,

        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Compute icon positions
    Layout {
        /// Path to house file
        house: String,

        /// Skip overlap relaxation
        #[arg(long)]
        no_relax: bool,

        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Check room-sized clickable areas for overlaps
    Validate {
        /// Path to house file
        house: String,

        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Render every light combination and write the floor-plan assets
    Render {
        /// Path to house file
        house: String,

        /// Output directory (renders/ and floorplan/ go inside)
        #[arg(short, long)]
        output: Option<String>,

        /// Image width in pixels
        #[arg(long)]
        width: Option<u32>,

        /// Image height in pixels
        #[arg(long)]
        height: Option<u32>,

        /// Light grouping (css, overlay or full)
        #[arg(long)]
        mode: Option<String>,

        /// Render every frame even when a cached one exists
        #[arg(long)]
        no_reuse: bool,
    },

    /// Pin an entity's icon at a position (viewport percent)
    Pin {
        /// Path to house file
        house: String,

        /// Entity name, e.g. light.kitchen
        entity: String,

        /// Left offset in percent
        #[arg(required_unless_present = "clear", allow_negative_numbers = true)]
        left: Option<f64>,

        /// Top offset in percent
        #[arg(required_unless_present = "clear", allow_negative_numbers = true)]
        top: Option<f64>,

        /// Remove the pin and return to automatic placement
        #[arg(long)]
        clear: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter)).init();

    let config = cli.config;
    match cli.command {
        Commands::Plan {
            house,
            mode,
            format,
        } => plan::run(plan::PlanArgs {
            house,
            config,
            mode,
            format,
        }),
        Commands::Layout {
            house,
            no_relax,
            format,
        } => layout::run(layout::LayoutArgs {
            house,
            config,
            no_relax,
            format,
        }),
        Commands::Validate { house, format } => validate::run(validate::ValidateArgs {
            house,
            config,
            format,
        }),
        Commands::Render {
            house,
            output,
            width,
            height,
            mode,
            no_reuse,
        } => render::run(render::RenderArgs {
            house,
            config,
            output,
            width,
            height,
            mode,
            no_reuse,
        }),
        Commands::Pin {
            house,
            entity,
            left,
            top,
            clear,
        } => pin::run(pin::PinArgs {
            house,
            entity,
            left,
            top,
            clear,
        }),
    }
}
