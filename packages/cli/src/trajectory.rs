//! Batch trajectory run driven by a TOML run configuration.

use std::path::{Path, PathBuf};
use std::time::Instant;

use abundance_trends_abundance_models::ExecutionMode;
use abundance_trends_analytics::{compute_batch, compute_richness};
use abundance_trends_cli_utils::{IndicatifProgress, MultiProgress};
use abundance_trends_store::{config, paths, regions, stacks, trajectories};

/// Loads the configured region and stacks, aggregates every species, and
/// writes the trajectory CSV.
///
/// Species whose stack cannot be loaded or whose trajectory fails are
/// reported and skipped; the rest are still written. Any failure makes
/// the command exit with an error after the output is written.
pub fn run(
    multi: &MultiProgress,
    config_path: &Path,
    sequential: bool,
    output: Option<&Path>,
    richness: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let start = Instant::now();
    let (config, base) = config::load_run_config(config_path)?;

    let mode = if sequential {
        ExecutionMode::Sequential
    } else {
        config.execution
    };

    let region = regions::load_region(&config.region, &base)?;
    log::info!(
        "Region {} ({}), {} species, {mode}",
        region.name,
        region.crs,
        config.species.len()
    );

    let mut load_failures = Vec::new();
    let mut loaded = Vec::with_capacity(config.species.len());

    for species in &config.species {
        match stacks::load_species(species, &base) {
            Ok(stack) => loaded.push(stack),
            Err(e) => {
                log::error!("Failed to load {}: {e}", species.name);
                load_failures.push(format!("{}: {e}", species.name));
            }
        }
    }

    let progress = IndicatifProgress::species_bar(multi, "Aggregating trajectories");
    let report = compute_batch(&loaded, &region, mode, &progress);

    let output: PathBuf = output.map_or_else(
        || {
            config.output.as_deref().map_or_else(
                || paths::default_trajectory_path(&region.name),
                |o| paths::resolve(&base, o),
            )
        },
        Path::to_path_buf,
    );
    trajectories::save_trajectories(&output, &report.records)?;

    if let Some(path) = richness {
        trajectories::save_richness(path, &compute_richness(&report.records))?;
    }

    println!();
    println!(
        "{} trajectory records written to {}",
        report.records.len(),
        output.display()
    );

    if !report.undefined.is_empty() {
        println!();
        println!("Undefined weeks (no abundance anywhere in the range):");
        for week in &report.undefined {
            println!("  {} week {} ({})", week.species, week.week, week.date);
        }
    }

    let failure_count = load_failures.len() + report.failures.len();

    if failure_count > 0 {
        println!();
        println!("Failed species:");
        for failure in &load_failures {
            println!("  {failure}");
        }
        for failure in &report.failures {
            println!("  {failure}");
        }
    }

    log::info!("Finished in {:.1}s", start.elapsed().as_secs_f64());

    if failure_count > 0 {
        return Err(format!("{failure_count} species failed").into());
    }

    Ok(())
}
