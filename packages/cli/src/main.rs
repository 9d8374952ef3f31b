#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Command-line front end for the abundance trends toolkit.
//!
//! `trajectory` runs a configured batch of species against one region and
//! writes the trajectory CSV. The other subcommands derive richness from a
//! trajectory file or run the exploratory analyses (seasonal means,
//! quantile sites, point intervals) over single grids and stacks.
//!
//! Logging goes through [`abundance_trends_cli_utils::init_logger`]; set
//! `RUST_LOG=info` or `debug` for more detail.

mod analyses;
mod trajectory;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "abundance_trends",
    about = "Population trajectories and richness from weekly abundance rasters"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute weekly population trajectories for every configured species
    Trajectory {
        /// TOML run configuration
        #[arg(long)]
        config: PathBuf,
        /// Process species and weeks one at a time
        #[arg(long)]
        sequential: bool,
        /// Trajectory CSV path (overrides the config)
        #[arg(long)]
        output: Option<PathBuf>,
        /// Also write weekly richness to this CSV
        #[arg(long)]
        richness: Option<PathBuf>,
    },
    /// Count species present in the region per week from a trajectory CSV
    Richness {
        /// Trajectory CSV
        #[arg(long)]
        input: PathBuf,
        /// Richness CSV path (stdout when omitted)
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Mean abundance grid over the weeks of a season
    Season {
        /// Weekly stack JSON
        #[arg(long)]
        stack: PathBuf,
        /// Run configuration holding named seasons and the region
        #[arg(long)]
        config: Option<PathBuf>,
        /// Season name (looked up in the config when no bounds are given)
        #[arg(long, default_value = "season")]
        name: String,
        /// First day of the season, `MM-DD`
        #[arg(long, requires = "end")]
        start: Option<String>,
        /// Last day of the season, `MM-DD`
        #[arg(long, requires = "start")]
        end: Option<String>,
        /// Blank cells outside the configured region
        #[arg(long, requires = "config")]
        mask: bool,
        /// Output grid JSON
        #[arg(long)]
        output: PathBuf,
    },
    /// Select cells at or above an abundance quantile within the region
    Sites {
        /// Grid JSON (e.g. a seasonal mean)
        #[arg(long)]
        grid: PathBuf,
        /// Run configuration naming the region
        #[arg(long)]
        config: PathBuf,
        /// Quantile in [0, 1]
        #[arg(long, default_value_t = 0.9)]
        quantile: f64,
        /// Selection JSON path (summary only when omitted)
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Extract median and confidence bounds at point sites
    Extract {
        /// Median grid JSON
        #[arg(long)]
        median: PathBuf,
        /// Lower bound grid JSON
        #[arg(long)]
        lower: PathBuf,
        /// Upper bound grid JSON
        #[arg(long)]
        upper: PathBuf,
        /// Site CSV with header `id,x,y`
        #[arg(long)]
        sites: PathBuf,
        /// Estimates CSV path (stdout when omitted)
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// List the regions of a `GeoJSON` file or find the one containing a point
    Regions {
        /// `GeoJSON` `FeatureCollection`
        #[arg(long)]
        file: PathBuf,
        /// Feature property holding the region name
        #[arg(long, default_value = "name")]
        name_property: String,
        /// CRS of the coordinates
        #[arg(long, default_value = "EPSG:8857")]
        crs: String,
        /// X coordinate to look up
        #[arg(long, requires = "y", allow_hyphen_values = true)]
        x: Option<f64>,
        /// Y coordinate to look up
        #[arg(long, requires = "x", allow_hyphen_values = true)]
        y: Option<f64>,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let multi = abundance_trends_cli_utils::init_logger();
    let cli = Cli::parse();

    match cli.command {
        Commands::Trajectory {
            config,
            sequential,
            output,
            richness,
        } => trajectory::run(
            &multi,
            &config,
            sequential,
            output.as_deref(),
            richness.as_deref(),
        )?,
        Commands::Richness { input, output } => analyses::richness(&input, output.as_deref())?,
        Commands::Season {
            stack,
            config,
            name,
            start,
            end,
            mask,
            output,
        } => {
            let bounds = start.zip(end);
            analyses::season(&analyses::SeasonArgs {
                stack: &stack,
                config: config.as_deref(),
                name: &name,
                bounds: bounds.as_ref().map(|(s, e)| (s.as_str(), e.as_str())),
                mask,
                output: &output,
            })?;
        }
        Commands::Sites {
            grid,
            config,
            quantile,
            output,
        } => analyses::sites(&grid, &config, quantile, output.as_deref())?,
        Commands::Extract {
            median,
            lower,
            upper,
            sites,
            output,
        } => analyses::extract(&median, &lower, &upper, &sites, output.as_deref())?,
        Commands::Regions {
            file,
            name_property,
            crs,
            x,
            y,
        } => analyses::list_regions(&file, &name_property, &crs, x.zip(y))?,
    }

    Ok(())
}
