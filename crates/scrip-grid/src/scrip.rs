//! SCRIP grid description files.
//!
//! The SCRIP convention describes a logically rectangular grid through its
//! cell centers, cell corners and an integer mask:
//!
//! ```text
//! dimensions:
//!     grid_size = nlon * nlat ;
//!     grid_corners = 4 ;
//!     grid_rank = 2 ;
//! variables:
//!     int    grid_dims(grid_rank) ;
//!     double grid_center_lat(grid_size) ;       units = "degrees"
//!     double grid_center_lon(grid_size) ;       units = "degrees"
//!     double grid_corner_lat(grid_size, grid_corners) ;
//!     double grid_corner_lon(grid_size, grid_corners) ;
//!     int    grid_imask(grid_size) ;            units = "unitless"
//! ```
//!
//! No variable carries a `_FillValue`; remapping tools treat any fill marker
//! in a grid file as real data.

use std::path::{Path, PathBuf};

use chrono::Local;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{Result, ScripError};
use crate::grid::{CenterGrid, CornerSet, GridMask, GRID_CORNERS};
use crate::netcdf_io::{
    get_global_str_attr, get_str_attr, has_attr, require_dimension, require_variable,
    silence_hdf5_errors, variable_shape,
};

pub const DIM_GRID_SIZE: &str = "grid_size";
pub const DIM_GRID_CORNERS: &str = "grid_corners";
pub const DIM_GRID_RANK: &str = "grid_rank";

pub const VAR_GRID_DIMS: &str = "grid_dims";
pub const VAR_CENTER_LAT: &str = "grid_center_lat";
pub const VAR_CENTER_LON: &str = "grid_center_lon";
pub const VAR_CORNER_LAT: &str = "grid_corner_lat";
pub const VAR_CORNER_LON: &str = "grid_corner_lon";
pub const VAR_IMASK: &str = "grid_imask";

/// Value of the `conventions` global attribute.
pub const CONVENTIONS: &str = "SCRIP";

/// How mask values are checked before writing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MaskPolicy {
    /// Write whatever the caller supplied.
    #[default]
    Unchecked,
    /// Reject values outside {0, 1}.
    Strict,
}

impl MaskPolicy {
    pub fn check(&self, mask: &GridMask) -> Result<()> {
        match self {
            Self::Unchecked => Ok(()),
            Self::Strict => mask.validate_binary(),
        }
    }
}

/// Options for [`write_scrip`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WriteOptions {
    /// Value of the `created_by` global attribute.
    pub created_by: String,
    pub mask_policy: MaskPolicy,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            created_by: env!("CARGO_PKG_NAME").to_string(),
            mask_policy: MaskPolicy::default(),
        }
    }
}

/// In-memory contents of a SCRIP grid file.
#[derive(Debug, Clone, PartialEq)]
pub struct ScripGrid {
    pub center_lat: CenterGrid,
    pub center_lon: CenterGrid,
    pub corner_lat: CornerSet,
    pub corner_lon: CornerSet,
    pub mask: GridMask,
    pub created_by: String,
    /// Wall-clock generation time; informational only.
    pub date_created: String,
}

impl ScripGrid {
    /// Assemble a grid, checking that every per-cell array has one entry
    /// per cell.
    pub fn new(
        center_lat: CenterGrid,
        center_lon: CenterGrid,
        corner_lat: CornerSet,
        corner_lon: CornerSet,
        mask: GridMask,
        created_by: impl Into<String>,
    ) -> Result<Self> {
        if center_lat.shape() != center_lon.shape() {
            return Err(ScripError::invalid_shape(format!(
                "center lat shape {:?} does not match center lon shape {:?}",
                center_lat.shape(),
                center_lon.shape()
            )));
        }
        let n = center_lat.len();
        for (name, len) in [
            (VAR_CORNER_LAT, corner_lat.len()),
            (VAR_CORNER_LON, corner_lon.len()),
            (VAR_IMASK, mask.len()),
        ] {
            if len != n {
                return Err(ScripError::invalid_shape(format!(
                    "{} has {} cells, expected {}",
                    name, len, n
                )));
            }
        }

        Ok(Self {
            center_lat,
            center_lon,
            corner_lat,
            corner_lon,
            mask,
            created_by: created_by.into(),
            date_created: Local::now().format("%Y-%m-%d %H:%M:%S%.6f").to_string(),
        })
    }

    /// Number of cells.
    pub fn grid_size(&self) -> usize {
        self.center_lat.len()
    }

    /// `[nlon, nlat]`
    pub fn grid_dims(&self) -> [usize; 2] {
        self.center_lat.shape()
    }

    /// Value of the `title` global attribute.
    pub fn title(&self) -> String {
        let [nlon, nlat] = self.grid_dims();
        format!("Rectangular grid with {}x{} dimension", nlon, nlat)
    }

    /// Write the grid to `path`, replacing any existing file.
    ///
    /// The file is assembled next to the destination and renamed into place
    /// once it is complete, so a failed write never leaves a file that looks
    /// valid at `path`.
    pub fn write(&self, path: &Path) -> Result<()> {
        silence_hdf5_errors();

        let partial = partial_path(path);
        info!(path = %path.display(), cells = self.grid_size(), "Writing SCRIP grid");

        let result = self
            .write_netcdf(&partial)
            .and_then(|()| std::fs::rename(&partial, path).map_err(ScripError::from));
        if result.is_err() {
            if let Err(cleanup) = std::fs::remove_file(&partial) {
                debug!(path = %partial.display(), error = %cleanup, "No partial file to remove");
            }
        }
        result
    }

    fn write_netcdf(&self, path: &Path) -> Result<()> {
        let [nlon, nlat] = self.grid_dims();
        let grid_dims = [to_i32(nlon)?, to_i32(nlat)?];

        let mut file = netcdf::create(path)?;

        file.add_dimension(DIM_GRID_SIZE, self.grid_size())?;
        file.add_dimension(DIM_GRID_CORNERS, GRID_CORNERS)?;
        file.add_dimension(DIM_GRID_RANK, 2)?;

        {
            let mut var = file.add_variable::<i32>(VAR_GRID_DIMS, &[DIM_GRID_RANK])?;
            disable_fill(&mut var)?;
            var.put_values(&grid_dims, ..)?;
        }

        for (name, values) in [
            (VAR_CENTER_LAT, self.center_lat.values()),
            (VAR_CENTER_LON, self.center_lon.values()),
        ] {
            let mut var = file.add_variable::<f64>(name, &[DIM_GRID_SIZE])?;
            disable_fill(&mut var)?;
            var.put_attribute("units", "degrees")?;
            var.put_values(values, ..)?;
        }

        for (name, corners) in [
            (VAR_CORNER_LAT, &self.corner_lat),
            (VAR_CORNER_LON, &self.corner_lon),
        ] {
            let mut var = file.add_variable::<f64>(name, &[DIM_GRID_SIZE, DIM_GRID_CORNERS])?;
            disable_fill(&mut var)?;
            var.put_attribute("units", "degrees")?;
            var.put_values(&corners.to_flat(), ..)?;
        }

        {
            let mut var = file.add_variable::<i32>(VAR_IMASK, &[DIM_GRID_SIZE])?;
            disable_fill(&mut var)?;
            var.put_attribute("units", "unitless")?;
            var.put_values(self.mask.values(), ..)?;
        }

        file.add_attribute("title", self.title().as_str())?;
        file.add_attribute("created_by", self.created_by.as_str())?;
        file.add_attribute("date_created", self.date_created.as_str())?;
        file.add_attribute("conventions", CONVENTIONS)?;

        debug!(path = %path.display(), nlon, nlat, "SCRIP variables written");
        Ok(())
    }

    /// Read a SCRIP grid file.
    ///
    /// Rejects files whose variables carry a `_FillValue`.
    pub fn read(path: &Path) -> Result<Self> {
        silence_hdf5_errors();

        let file = netcdf::open(path)?;

        let grid_size = require_dimension(&file, DIM_GRID_SIZE)?;
        let corners = require_dimension(&file, DIM_GRID_CORNERS)?;
        if corners != GRID_CORNERS {
            return Err(ScripError::invalid_shape(format!(
                "{} is {}, expected {}",
                DIM_GRID_CORNERS, corners, GRID_CORNERS
            )));
        }

        for name in [
            VAR_GRID_DIMS,
            VAR_CENTER_LAT,
            VAR_CENTER_LON,
            VAR_CORNER_LAT,
            VAR_CORNER_LON,
            VAR_IMASK,
        ] {
            let var = require_variable(&file, name)?;
            if has_attr(&var, "_FillValue") {
                return Err(ScripError::InvalidFormat(format!(
                    "{} carries a _FillValue attribute",
                    name
                )));
            }
        }

        let dims: Vec<i32> = require_variable(&file, VAR_GRID_DIMS)?.get_values(..)?;
        let [nlon, nlat] = match dims.as_slice() {
            &[nlon, nlat] if nlon > 0 && nlat > 0 => [nlon as usize, nlat as usize],
            other => {
                return Err(ScripError::invalid_shape(format!(
                    "{} must hold two positive values, got {:?}",
                    VAR_GRID_DIMS, other
                )))
            }
        };
        if nlon * nlat != grid_size {
            return Err(ScripError::invalid_shape(format!(
                "{} {}x{} does not match {} {}",
                VAR_GRID_DIMS, nlon, nlat, DIM_GRID_SIZE, grid_size
            )));
        }

        let center_lat = read_centers(&file, VAR_CENTER_LAT, nlon, nlat)?;
        let center_lon = read_centers(&file, VAR_CENTER_LON, nlon, nlat)?;
        let corner_lat = read_corners(&file, VAR_CORNER_LAT, grid_size)?;
        let corner_lon = read_corners(&file, VAR_CORNER_LON, grid_size)?;

        let mask_var = require_variable(&file, VAR_IMASK)?;
        let mask = GridMask::from_values(mask_var.get_values::<i32, _>(..)?);

        let created_by = get_global_str_attr(&file, "created_by").unwrap_or_default();
        let date_created = get_global_str_attr(&file, "date_created").unwrap_or_default();
        match get_global_str_attr(&file, "conventions") {
            Some(c) if c == CONVENTIONS => {}
            other => warn!(path = %path.display(), conventions = ?other, "Unexpected conventions attribute"),
        }

        let grid = Self {
            center_lat,
            center_lon,
            corner_lat,
            corner_lon,
            mask,
            created_by,
            date_created,
        };
        if grid.mask.len() != grid_size {
            return Err(ScripError::invalid_shape(format!(
                "{} has {} values, expected {}",
                VAR_IMASK,
                grid.mask.len(),
                grid_size
            )));
        }
        Ok(grid)
    }
}

/// Assemble a SCRIP grid and, if `output` is given, write it to disk.
///
/// With `output = None` the grid is only computed and returned.
pub fn write_scrip(
    output: Option<&Path>,
    center_lat: CenterGrid,
    center_lon: CenterGrid,
    corner_lat: CornerSet,
    corner_lon: CornerSet,
    mask: GridMask,
    options: &WriteOptions,
) -> Result<ScripGrid> {
    options.mask_policy.check(&mask)?;

    let grid = ScripGrid::new(
        center_lat,
        center_lon,
        corner_lat,
        corner_lon,
        mask,
        options.created_by.clone(),
    )?;

    match output {
        Some(path) => grid.write(path)?,
        None => debug!(cells = grid.grid_size(), "No output path, SCRIP grid kept in memory"),
    }
    Ok(grid)
}

fn read_centers(file: &netcdf::File, name: &str, nlon: usize, nlat: usize) -> Result<CenterGrid> {
    let var = require_variable(file, name)?;
    if let Some(units) = get_str_attr(&var, "units") {
        debug!(variable = name, units = %units, "Reading SCRIP centers");
    }
    CenterGrid::new(nlon, nlat, var.get_values::<f64, _>(..)?)
}

fn read_corners(file: &netcdf::File, name: &str, grid_size: usize) -> Result<CornerSet> {
    let var = require_variable(file, name)?;
    let shape = variable_shape(&var);
    if shape != [grid_size, GRID_CORNERS] {
        return Err(ScripError::invalid_shape(format!(
            "{} has shape {:?}, expected [{}, {}]",
            name, shape, grid_size, GRID_CORNERS
        )));
    }
    CornerSet::from_flat(&var.get_values::<f64, _>(..)?)
}

fn disable_fill(var: &mut netcdf::VariableMut) -> Result<()> {
    // SAFETY: every variable is written in full right after definition, so
    // no unfilled element is ever read back.
    unsafe { var.set_nofill()? };
    Ok(())
}

fn to_i32(n: usize) -> Result<i32> {
    i32::try_from(n)
        .map_err(|_| ScripError::invalid_shape(format!("dimension {} exceeds i32 range", n)))
}

/// Sibling path the file is assembled at before being renamed into place.
fn partial_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "scrip.nc".to_string());
    path.with_file_name(format!(".{}.partial", name))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(nlon: usize, nlat: usize) -> (CenterGrid, CenterGrid, CornerSet, CornerSet) {
        let lat = CenterGrid::from_fn(nlon, nlat, |_, j| j as f64).unwrap();
        let lon = CenterGrid::from_fn(nlon, nlat, |i, _| i as f64).unwrap();
        let corners = CornerSet::new(vec![[0.0; 4]; nlon * nlat]);
        (lat, lon, corners.clone(), corners)
    }

    #[test]
    fn test_title_and_dims() {
        let (lat, lon, clat, clon) = sample(4, 2);
        let grid = ScripGrid::new(lat, lon, clat, clon, GridMask::all_active(8), "test").unwrap();
        assert_eq!(grid.grid_dims(), [4, 2]);
        assert_eq!(grid.grid_size(), 8);
        assert_eq!(grid.title(), "Rectangular grid with 4x2 dimension");
        assert!(!grid.date_created.is_empty());
    }

    #[test]
    fn test_mismatched_lengths_rejected() {
        let (lat, lon, clat, _) = sample(4, 2);
        let short = CornerSet::new(vec![[0.0; 4]; 7]);
        let err = ScripGrid::new(lat, lon, clat, short, GridMask::all_active(8), "test").unwrap_err();
        assert!(matches!(err, ScripError::InvalidShape(_)));
    }

    #[test]
    fn test_write_scrip_without_path_stays_in_memory() {
        let (lat, lon, clat, clon) = sample(3, 2);
        let grid = write_scrip(
            None,
            lat,
            lon,
            clat,
            clon,
            GridMask::all_active(6),
            &WriteOptions::default(),
        )
        .unwrap();
        assert_eq!(grid.grid_size(), 6);
        assert_eq!(grid.created_by, "scrip-grid");
    }

    #[test]
    fn test_strict_mask_policy() {
        let (lat, lon, clat, clon) = sample(3, 2);
        let options = WriteOptions {
            mask_policy: MaskPolicy::Strict,
            ..Default::default()
        };
        let mask = GridMask::from_values(vec![1, 1, 3, 0, 1, 1]);
        let err = write_scrip(None, lat, lon, clat, clon, mask, &options).unwrap_err();
        assert!(matches!(err, ScripError::InvalidMask(_)));
    }

    #[test]
    fn test_unchecked_mask_passes_through() {
        let (lat, lon, clat, clon) = sample(3, 2);
        let mask = GridMask::from_values(vec![1, 1, 3, 0, 1, 1]);
        let grid = write_scrip(None, lat, lon, clat, clon, mask, &WriteOptions::default()).unwrap();
        assert_eq!(grid.mask.values()[2], 3);
    }

    #[test]
    fn test_partial_path_is_hidden_sibling() {
        let p = partial_path(Path::new("/tmp/out/scrip_gaussian.nc"));
        assert_eq!(p, PathBuf::from("/tmp/out/.scrip_gaussian.nc.partial"));
    }
}
