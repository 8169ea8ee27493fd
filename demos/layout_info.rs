//! Layout Inspection Utility
//!
//! Loads a saved placement layout and prints what ended up where: counts per
//! category, the spatial footprint, and the tightest pair of instances.
//!
//! # Example Usage
//! ```bash
//! # Summarize a layout
//! cargo run --example layout_info -- --input layout.bin
//!
//! # Resolve category names through the catalog that produced the layout
//! cargo run --example layout_info -- --input layout.bin --catalog relics.toml
//!
//! # List every instance
//! cargo run --example layout_info -- --input layout.bin --verbose
//! ```

use std::collections::BTreeMap;

use clap::Parser;
use strewn::errors::StrewnResult;
use strewn::{CategoryCatalog, CategoryId, PlacementRun, RunWarning};

#[derive(Parser)]
#[command(name = "layout_info")]
#[command(about = "Inspect a saved placement layout")]
struct Args {
    /// Layout file to inspect
    #[arg(long)]
    input: String,

    /// Catalog TOML used to resolve category names
    #[arg(long)]
    catalog: Option<String>,

    /// Print every instance, not just the summary
    #[arg(short, long, default_value = "false")]
    verbose: bool,
}

fn category_label(id: CategoryId, catalog: Option<&CategoryCatalog>) -> String {
    catalog
        .and_then(|c| c.get(id))
        .map(|category| category.name.clone())
        .unwrap_or_else(|| format!("category {id}"))
}

fn main() -> StrewnResult<()> {
    let args = Args::parse();

    let run = PlacementRun::load_from_file(&args.input)?;
    let catalog = match &args.catalog {
        Some(path) => Some(CategoryCatalog::load_from_file(path)?),
        None => None,
    };

    println!("Layout: {}", args.input);
    println!("  Seed: {}", run.seed);
    println!("  Instances: {}", run.total_count());

    let mut counts: BTreeMap<CategoryId, usize> = BTreeMap::new();
    for instance in &run.placements {
        *counts.entry(instance.category).or_default() += 1;
    }
    for (id, count) in &counts {
        println!("    {}: {count}", category_label(*id, catalog.as_ref()));
    }

    if let Some(first) = run.placements.first() {
        let mut low = first.position;
        let mut high = first.position;
        for instance in &run.placements {
            low = low.min(instance.position);
            high = high.max(instance.position);
        }
        println!(
            "  Footprint: x [{:.1}, {:.1}], y [{:.1}, {:.1}], z [{:.1}, {:.1}]",
            low.x, high.x, low.y, high.y, low.z, high.z
        );
    }

    let mut tightest: Option<(f32, u32, u32)> = None;
    for (i, a) in run.placements.iter().enumerate() {
        for b in &run.placements[i + 1..] {
            let distance = a.position.distance(b.position);
            let is_tighter = tightest.map(|(best, _, _)| distance < best).unwrap_or(true);
            if is_tighter {
                tightest = Some((distance, a.order, b.order));
            }
        }
    }
    if let Some((distance, a, b)) = tightest {
        println!("  Tightest pair: instances {a} and {b} at {distance:.2} units");
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

    if args.verbose {
        println!("\nInstances:");
        for instance in &run.placements {
            println!(
                "  #{:<4} {:<12} at ({:>7.1}, {:>6.1}, {:>7.1}) yaw {:>5.1} deg",
                instance.order,
                category_label(instance.category, catalog.as_ref()),
                instance.position.x,
                instance.position.y,
                instance.position.z,
                instance.yaw.to_degrees()
            );
        }
    }

    Ok(())
}
