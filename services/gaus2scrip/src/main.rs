//! gaus2scrip
//!
//! Converts the lat/lon cell centers of a Gaussian model grid into a SCRIP
//! grid file, and optionally regrids a field onto the cell centers of an
//! ESMF unstructured mesh.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use regrid::{
    write_mesh_field, BilinearRegridder, MeshCenters, RegridMethod, Regridder, UnmappedAction,
};
use scrip_grid::{
    gaus2scrip, generate_scrip, silence_hdf5_errors, MaskPolicy, ScripConfig, ScripGrid,
    SourceGrid,
};

#[derive(Parser, Debug)]
#[command(name = "gaus2scrip")]
#[command(about = "Convert Gaussian lat/lon grids into SCRIP grid files")]
struct Cli {
    /// Log level (overridden by RUST_LOG)
    #[arg(long, default_value = "info", global = true)]
    log_level: String,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build a SCRIP file from the lat/lon centers of a NetCDF file
    Convert {
        /// Source NetCDF file [env: GAUS2SCRIP_INPUT]
        #[arg(short, long)]
        input: Option<PathBuf>,

        #[command(flatten)]
        output: OutputArgs,

        /// Latitude variable name [env: GAUS2SCRIP_LAT_VAR]
        #[arg(long)]
        lat_var: Option<String>,

        /// Longitude variable name [env: GAUS2SCRIP_LON_VAR]
        #[arg(long)]
        lon_var: Option<String>,
    },

    /// Build a SCRIP file for a synthetic Gaussian grid
    Generate {
        /// Number of longitudes
        #[arg(long)]
        nlon: usize,

        /// Number of Gaussian latitudes
        #[arg(long)]
        nlat: usize,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Regrid a field onto the cell centers of an ESMF mesh
    Regrid {
        /// Source NetCDF file holding lat, lon and the field [env: GAUS2SCRIP_INPUT]
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// ESMF unstructured mesh file
        #[arg(short, long)]
        mesh: PathBuf,

        /// Field to regrid
        #[arg(short, long, default_value = "tmpsfc")]
        field: String,

        /// Regridding method
        #[arg(long, default_value = "bilinear", value_parser = ["bilinear", "conservative"])]
        method: String,

        /// What to do with target points outside the source grid
        #[arg(long, default_value = "ignore", value_parser = ["ignore", "error"])]
        unmapped: String,

        /// Write the regridded field to this file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Args, Debug)]
struct OutputArgs {
    /// Destination SCRIP file [env: GAUS2SCRIP_OUTPUT]
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Reject grids with nlon <= nlat [env: GAUS2SCRIP_REQUIRE_NLON_GT_NLAT]
    #[arg(long)]
    require_nlon_gt_nlat: bool,

    /// Reject mask values other than 0 and 1 [env: GAUS2SCRIP_STRICT_MASK]
    #[arg(long)]
    strict_mask: bool,

    /// Compute the grid without writing it
    #[arg(long)]
    dry_run: bool,

    /// Print the resolved configuration as JSON
    #[arg(long)]
    show_config: bool,
}

impl OutputArgs {
    fn apply(&self, config: &mut ScripConfig) {
        if let Some(output) = &self.output {
            config.output = Some(output.clone());
        }
        if self.require_nlon_gt_nlat {
            config.require_nlon_gt_nlat = true;
        }
        if self.strict_mask {
            config.mask_policy = MaskPolicy::Strict;
        }
        if self.dry_run {
            config.output = None;
        }
    }
}

fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(&cli.log_level, cli.log_json);
    silence_hdf5_errors();

    let mut config = ScripConfig::from_env();

    match cli.command {
        Command::Convert {
            input,
            output,
            lat_var,
            lon_var,
        } => {
            if let Some(input) = input {
                config.input = input;
            }
            if let Some(lat_var) = lat_var {
                config.variables.lat = lat_var;
            }
            if let Some(lon_var) = lon_var {
                config.variables.lon = lon_var;
            }
            output.apply(&mut config);
            show_config(&config, output.show_config)?;

            info!(input = %config.input.display(), "Converting source grid");
            let grid = gaus2scrip(&config)
                .with_context(|| format!("Failed to convert {}", config.input.display()))?;
            report(&grid, &config);
        }

        Command::Generate { nlon, nlat, output } => {
            output.apply(&mut config);
            show_config(&config, output.show_config)?;

            info!(nlon, nlat, "Generating Gaussian grid");
            let grid = generate_scrip(nlon, nlat, &config)
                .with_context(|| format!("Failed to generate {}x{} Gaussian grid", nlon, nlat))?;
            report(&grid, &config);
        }

        Command::Regrid {
            input,
            mesh,
            field,
            method,
            unmapped,
            output,
        } => {
            if let Some(input) = input {
                config.input = input;
            }
            run_regrid(
                &config,
                &mesh,
                &field,
                RegridMethod::from_str(&method),
                UnmappedAction::from_str(&unmapped),
                output,
            )?;
        }
    }

    Ok(())
}

fn init_tracing(log_level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    if json {
        fmt().with_env_filter(filter).with_target(true).json().init();
    } else {
        fmt().with_env_filter(filter).with_target(true).init();
    }
}

fn show_config(config: &ScripConfig, enabled: bool) -> Result<()> {
    if enabled {
        println!("{}", serde_json::to_string_pretty(config)?);
    }
    Ok(())
}

fn report(grid: &ScripGrid, config: &ScripConfig) {
    match &config.output {
        Some(path) => info!(path = %path.display(), title = %grid.title(), "Wrote SCRIP grid"),
        None => info!(title = %grid.title(), cells = grid.grid_size(), "Dry run, nothing written"),
    }
}

fn run_regrid(
    config: &ScripConfig,
    mesh_path: &Path,
    field: &str,
    method: RegridMethod,
    unmapped: UnmappedAction,
    output: Option<PathBuf>,
) -> Result<()> {
    config.validate()?;

    let source = SourceGrid::open(&config.input, &config.variables)
        .with_context(|| format!("Failed to open {}", config.input.display()))?;
    let values = source
        .read_field(field)
        .with_context(|| format!("Failed to read field {}", field))?;
    let mesh = MeshCenters::from_esmf_mesh(mesh_path)
        .with_context(|| format!("Failed to read mesh {}", mesh_path.display()))?;
    if mesh.is_empty() {
        bail!("mesh {} has no elements", mesh_path.display());
    }

    let mut regridder = BilinearRegridder::new();
    regridder.load_source_grid(&source.lat, &source.lon)?;
    regridder.load_target_mesh(mesh.clone())?;

    let out = regridder.regrid(&values, method, unmapped)?;
    match out.range() {
        Some((min, max)) => info!(
            field,
            %method,
            points = out.values.len(),
            unmapped = out.unmapped,
            min,
            max,
            "Regridded field"
        ),
        None => warn!(field, "No target point received a value"),
    }

    if let Some(path) = output {
        write_mesh_field(&path, field, &mesh, &out.values)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        info!(path = %path.display(), "Wrote regridded field");
    }

    Ok(())
}
