//! Single-grid analyses and region inspection.

use std::path::Path;

use abundance_trends_analytics::{
    Season, compute_richness, ensure_same_crs, extract_intervals, seasonal_mean, select_sites,
};
use abundance_trends_spatial::RegionMask;
use abundance_trends_store::{config, points, regions, stacks, trajectories};

type CliResult = Result<(), Box<dyn std::error::Error>>;

/// Derives weekly richness from a trajectory CSV.
pub fn richness(input: &Path, output: Option<&Path>) -> CliResult {
    let records = trajectories::load_trajectories(input)?;
    let richness = compute_richness(&records);

    match output {
        Some(path) => trajectories::save_richness(path, &richness)?,
        None => trajectories::write_richness(std::io::stdout().lock(), &richness)?,
    }

    Ok(())
}

/// Arguments of the `season` command.
pub struct SeasonArgs<'a> {
    pub stack: &'a Path,
    pub config: Option<&'a Path>,
    pub name: &'a str,
    pub bounds: Option<(&'a str, &'a str)>,
    pub mask: bool,
    pub output: &'a Path,
}

/// Writes the seasonal mean grid of a stack, optionally masked to the
/// configured region.
pub fn season(args: &SeasonArgs<'_>) -> CliResult {
    let run_config = args
        .config
        .map(config::load_run_config)
        .transpose()?;

    let season = match (args.bounds, &run_config) {
        (Some((start, end)), _) => Season::parse(args.name, start, end)?,
        (None, Some((config, _))) => {
            let season = config
                .season(args.name)
                .ok_or_else(|| format!("Season {} not found in config", args.name))?;
            Season::try_from(season)?
        }
        (None, None) => return Err("Provide --start/--end or a --config with seasons".into()),
    };

    let stack = stacks::load_stack(args.stack)?;
    let mut grid = seasonal_mean(&stack, &season)?;

    if args.mask
        && let Some((config, base)) = &run_config
    {
        let region = regions::load_region(&config.region, base)?;
        ensure_same_crs(&stack.crs, &region.crs)?;
        let mask = RegionMask::new(&region, &grid.geometry);
        log::info!("Masking to {} ({} cells)", region.name, mask.count());
        grid = mask.apply(&grid);
    }

    stacks::write_grid(args.output, &stack.crs, &grid)?;

    println!(
        "{} {} mean over {} cells written to {}",
        stack.species,
        season.name,
        grid.data_cells().count(),
        args.output.display()
    );

    Ok(())
}

/// Selects high-abundance cells of a grid inside the configured region.
pub fn sites(grid_path: &Path, config_path: &Path, quantile: f64, output: Option<&Path>) -> CliResult {
    let (config, base) = config::load_run_config(config_path)?;
    let region = regions::load_region(&config.region, &base)?;
    let (crs, grid) = stacks::load_grid(grid_path)?;
    ensure_same_crs(&crs, &region.crs)?;

    let mask = RegionMask::new(&region, &grid.geometry);
    let selection = select_sites(&grid, &mask, quantile)?;

    println!(
        "{} of {} cells in {} at or above the {quantile} quantile ({})",
        selection.cells.len(),
        selection.candidate_count,
        region.name,
        selection.threshold
    );

    if let Some(path) = output {
        points::save_selection(path, &selection)?;
    } else {
        for cell in selection.cells.iter().take(10) {
            println!("  cell {} ({}, {}): {}", cell.index, cell.x, cell.y, cell.value);
        }
    }

    Ok(())
}

/// Extracts median and bounds at each site of a CSV.
pub fn extract(
    median: &Path,
    lower: &Path,
    upper: &Path,
    sites: &Path,
    output: Option<&Path>,
) -> CliResult {
    let (median_crs, median) = stacks::load_grid(median)?;
    let (lower_crs, lower) = stacks::load_grid(lower)?;
    let (upper_crs, upper) = stacks::load_grid(upper)?;
    ensure_same_crs(&median_crs, &lower_crs)?;
    ensure_same_crs(&median_crs, &upper_crs)?;

    let sites = points::load_sites(sites)?;
    let estimates = extract_intervals(&median, &lower, &upper, &sites)?;

    match output {
        Some(path) => points::save_estimates(path, &estimates)?,
        None => points::write_estimates(std::io::stdout().lock(), &estimates)?,
    }

    Ok(())
}

/// Lists regions, or reports the region containing `point`.
pub fn list_regions(file: &Path, name_property: &str, crs: &str, point: Option<(f64, f64)>) -> CliResult {
    let index = regions::load_regions(file, name_property, crs)?;

    if let Some((x, y)) = point {
        match index.lookup_region(x, y) {
            Some(region) => println!("{}", region.name),
            None => println!("No region contains ({x}, {y})"),
        }
        return Ok(());
    }

    for region in index.regions() {
        println!("{}\t{:.1}", region.name, region.area());
    }

    Ok(())
}
