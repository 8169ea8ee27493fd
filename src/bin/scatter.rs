use clap::Parser;
use glam::Vec3;
use strewn::errors::{StrewnError, StrewnResult};
use strewn::{
    get_field_preset, CategoryCatalog, CategoryId, EngineConfig, GridNavigator, PlacementEngine,
    PlacementRun, RunWarning,
};

mod scatter {
    pub mod cli_utils;
}

use scatter::cli_utils::*;

#[derive(Parser, Clone)]
#[command(name = "scatter")]
#[command(about = "Scatter artifact placements across a generated height field")]
struct Args {
    /// Height field resolution in samples (format: WIDTHxLENGTH)
    #[arg(long, default_value = "128x128")]
    resolution: String,

    /// World footprint in units (format: WIDTHxLENGTH)
    #[arg(long, default_value = "400x400")]
    extent: String,

    /// Terrain preset (plains, hills, highlands, dunes)
    #[arg(long, default_value = "hills")]
    terrain: String,

    /// Vertical relief in world units
    #[arg(long, default_value = "60.0")]
    relief: f32,

    /// Base elevation of the field floor
    #[arg(long, default_value = "0.0")]
    base_height: f32,

    /// Seed for terrain generation (random when omitted)
    #[arg(long)]
    terrain_seed: Option<u32>,

    /// Seed for placement (random when omitted; the seed used is recorded
    /// in the output either way)
    #[arg(long)]
    seed: Option<u64>,

    /// Category catalog TOML file (the built-in artifact set when omitted)
    #[arg(long)]
    catalog: Option<String>,

    /// Candidate attempts allowed per requested instance
    #[arg(long, default_value = "200")]
    attempts: u32,

    /// Slope ceiling in degrees for categories without their own limit
    #[arg(long, default_value = "45.0")]
    max_slope: f32,

    /// Keep only instances reachable on foot from the start position
    #[arg(long)]
    reachable: bool,

    /// Walker start position (format: X,Y,Z); field center when omitted
    #[arg(long)]
    start: Option<String>,

    /// Radius used when snapping positions onto navigable space
    #[arg(long, default_value = "10.0")]
    snap_radius: f32,

    /// Navigation grid resolution in cells per side
    #[arg(long, default_value = "96")]
    nav_resolution: u32,

    /// Output layout file path
    #[arg(long, default_value = "layout.bin")]
    output: String,
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();
}

fn main() -> StrewnResult<()> {
    init_tracing();
    let args = Args::parse();

    // Parse and validate all CLI arguments
    let (resolution_x, resolution_z) = parse_resolution(&args.resolution)?;
    let extent = parse_extent(&args.extent, args.base_height, args.relief)?;

    if args.reachable && (!args.snap_radius.is_finite() || args.snap_radius <= 0.0) {
        return Err(StrewnError::InvalidConfig {
            reason: format!("snap_radius must be positive, got {}", args.snap_radius),
        });
    }

    let generator =
        get_field_preset(&args.terrain, args.terrain_seed).ok_or_else(|| {
            StrewnError::InvalidConfig {
                reason: format!(
                    "Unknown terrain preset '{}'. Expected plains, hills, highlands or dunes",
                    args.terrain
                ),
            }
        })?;
    let field = generator.generate(resolution_x, resolution_z, extent)?;

    let catalog = match &args.catalog {
        Some(path) => CategoryCatalog::load_from_file(path)?,
        None => CategoryCatalog::default(),
    };

    let config = EngineConfig {
        max_attempts_per_item: args.attempts,
        default_max_slope: args.max_slope,
    };

    let run = if args.reachable {
        let navigator = GridNavigator::from_field(&field, args.nav_resolution, args.max_slope)?;
        let start = match &args.start {
            Some(text) => parse_position(text)?,
            None => Vec3::new(extent.width / 2.0, 0.0, extent.length / 2.0),
        };
        PlacementEngine::new(&field, config)
            .with_navigation(&navigator, start, args.snap_radius)
            .run(&catalog, args.seed)?
    } else {
        PlacementEngine::new(&field, config).run(&catalog, args.seed)?
    };

    run.save_to_file(&args.output)?;
    print_run_summary(&run, &catalog, &args.output);
    Ok(())
}

fn print_run_summary(run: &PlacementRun, catalog: &CategoryCatalog, output: &str) {
    println!("Layout saved successfully to: {output}");
    println!("\nRun summary:");
    println!("  Seed: {}", run.seed);
    println!(
        "  Instances: {} across {} categories",
        run.total_count(),
        catalog.len()
    );

    for (i, category) in catalog.categories.iter().enumerate() {
        let placed = run.placed_count(CategoryId(i as u32));
        println!(
            "    {}: {} placed (wanted {}..={})",
            category.name, placed, category.min_count, category.max_count
        );
    }

    for deficiency in &run.deficiencies {
        println!(
            "  Short: '{}' placed {} of a minimum {}",
            deficiency.category, deficiency.placed, deficiency.min_count
        );
    }

    for warning in &run.warnings {
        match warning {
            RunWarning::NavigationDisabled { reason } => {
                println!("  Warning: reachability checks were disabled ({reason})");
            }
        }
    }
}
