//! End-to-end conversion: source grid in, SCRIP file out.

use std::time::Instant;

use tracing::info;

use crate::config::ScripConfig;
use crate::corners::center_to_corner;
use crate::error::Result;
use crate::gaussian::gaussian_grid;
use crate::grid::{CenterGrid, GridMask};
use crate::scrip::{write_scrip, ScripGrid};
use crate::source::SourceGrid;

/// Convert the configured source grid into a SCRIP grid.
///
/// Every cell is marked active. The grid is written to `config.output` when
/// set and returned in either case.
pub fn gaus2scrip(config: &ScripConfig) -> Result<ScripGrid> {
    config.validate()?;

    let source = SourceGrid::open(&config.input, &config.variables)?;
    centers_to_scrip(source.lat, source.lon, config)
}

/// Build a SCRIP grid for a synthetic `nlon x nlat` Gaussian grid.
pub fn generate_scrip(nlon: usize, nlat: usize, config: &ScripConfig) -> Result<ScripGrid> {
    let (lat, lon) = gaussian_grid(nlon, nlat)?;
    centers_to_scrip(lat, lon, config)
}

/// Derive corners for the given centers and write the SCRIP grid.
pub fn centers_to_scrip(lat: CenterGrid, lon: CenterGrid, config: &ScripConfig) -> Result<ScripGrid> {
    let start = Instant::now();

    let (corner_lat, corner_lon) = center_to_corner(&lat, &lon, config.corner_options())?;
    let mask = GridMask::all_active(lat.len());

    let grid = write_scrip(
        config.output.as_deref(),
        lat,
        lon,
        corner_lat,
        corner_lon,
        mask,
        &config.write_options(),
    )?;

    let [nlon, nlat] = grid.grid_dims();
    info!(
        nlon,
        nlat,
        cells = grid.grid_size(),
        written = config.output.is_some(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "SCRIP grid complete"
    );

    Ok(grid)
}
