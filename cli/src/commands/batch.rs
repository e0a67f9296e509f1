use anyhow::{Context, Result};
use districter::{io, run_batch, Districting, RunConfig};
use tracing::{error, info};

use crate::{cli::{BatchArgs, Cli}, commands::ensure_writable};

pub fn run(_cli: &Cli, args: &BatchArgs) -> Result<()> {
    let config = args.input.config()?;
    let jobs = args.districts.iter()
        .map(|&num_districts| RunConfig { num_districts, ..config.run.clone() })
        .collect::<Vec<_>>();
    for job in &jobs { job.validate()? }

    std::fs::create_dir_all(&args.output)
        .with_context(|| format!("[batch] Failed to create output directory: {}", args.output.display()))?;
    let out_paths = jobs.iter()
        .map(|job| args.output.join(format!("assignments_{}.csv", job.num_districts)))
        .collect::<Vec<_>>();
    for path in &out_paths { ensure_writable(path, args.force)? }

    let dataset = args.input.load(&config)?;

    // Single-district jobs need no growth.
    let (whole, grown): (Vec<_>, Vec<_>) = jobs.iter().enumerate().partition(|(_, job)| job.num_districts == 1);
    let grown_jobs = grown.iter().map(|&(_, job)| job.clone()).collect::<Vec<_>>();
    info!(jobs = grown_jobs.len(), "starting batch");

    let mut results = vec![None; jobs.len()];
    for (i, _) in whole { results[i] = Some(Ok(Districting::whole(&dataset))) }
    for ((i, _), result) in grown.into_iter().zip(run_batch(&dataset, &grown_jobs)) { results[i] = Some(result) }

    let mut failures = 0;
    for ((job, path), result) in jobs.iter().zip(&out_paths).zip(results.into_iter().flatten()) {
        match result {
            Ok(districting) => {
                io::write_assignments(&districting, path)?;
                println!(
                    "[batch] {} districts: {} under threshold, {} unassigned -> {}",
                    job.num_districts, districting.under_threshold().count(), districting.unassigned().len(), path.display(),
                );
            }
            Err(err) => {
                error!(districts = job.num_districts, error = %err, "run failed");
                failures += 1;
            }
        }
    }

    anyhow::ensure!(failures == 0, "[batch] {failures} of {} run(s) failed", jobs.len());
    Ok(())
}
