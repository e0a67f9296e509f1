use std::path::PathBuf;

use anyhow::Result;
use districter::{build_districts, io, Districting};
use tracing::info;

use crate::{cli::{Cli, RunArgs}, commands::ensure_writable};

pub fn run(_cli: &Cli, args: &RunArgs) -> Result<()> {
    let mut config = args.input.config()?;
    if let Some(districts) = args.districts { config.run.num_districts = districts }
    config.run.validate()?;

    let out_path = args.output.clone().unwrap_or_else(|| PathBuf::from("./assignments.csv"));
    ensure_writable(&out_path, args.force)?;
    for path in args.geojson.iter().chain(&args.summary) {
        ensure_writable(path, args.force)?;
    }

    let dataset = args.input.load(&config)?;

    let districting = if config.run.num_districts == 1 {
        info!("single district requested, assigning every unit to district 1");
        Districting::whole(&dataset)
    } else {
        build_districts(&dataset, &config.run)?
    };

    println!("[run] threshold {:.1} people per district", districting.threshold());
    for district in districting.districts() {
        println!(
            "[run] district {:>3}: {:>6} units, population {:>10} ({})",
            district.id(), district.member_count(), district.population(), district.status(),
        );
    }
    let unassigned = districting.unassigned();
    if !unassigned.is_empty() {
        println!("[run] {} unit(s) unassigned, population {}", unassigned.len(), districting.unassigned_population());
    }

    io::write_assignments(&districting, &out_path)?;
    println!("[run] wrote assignments to {}", out_path.display());

    if let Some(path) = &args.geojson {
        io::write_geojson(&dataset, &districting, path)?;
        println!("[run] wrote GeoJSON to {}", path.display());
    }
    if let Some(path) = &args.summary {
        io::write_summary(&districting, path)?;
        println!("[run] wrote summary to {}", path.display());
    }

    Ok(())
}
