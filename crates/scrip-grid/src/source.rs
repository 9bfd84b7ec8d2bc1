//! Reading cell-center coordinates and scalar fields from a gridded NetCDF file.
//!
//! Model output such as GFS `sfcf*.nc` stores `lat`/`lon` as 2D arrays
//! dimensioned `(grid_yt, grid_xt)`. Read in C order that is exactly the
//! longitude-fastest layout of [`CenterGrid`], so the logical grid is
//! `[nlon, nlat] = [grid_xt, grid_yt]` without any copying transpose.
//! Files with 1D `lat(nlat)` / `lon(nlon)` coordinate vectors are expanded
//! into the equivalent 2D mesh.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{Result, ScripError};
use crate::grid::CenterGrid;
use crate::netcdf_io::{
    read_as_f64, read_extents_as_f64, require_variable, silence_hdf5_errors, variable_shape,
};

/// Names of the coordinate variables in the source file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceVariables {
    pub lat: String,
    pub lon: String,
}

impl Default for SourceVariables {
    fn default() -> Self {
        Self {
            lat: "lat".to_string(),
            lon: "lon".to_string(),
        }
    }
}

/// Cell-center coordinates of a source grid.
#[derive(Debug, Clone)]
pub struct SourceGrid {
    path: PathBuf,
    pub lat: CenterGrid,
    pub lon: CenterGrid,
}

impl SourceGrid {
    /// Read the center coordinates. The file is closed before returning.
    pub fn open(path: impl AsRef<Path>, names: &SourceVariables) -> Result<Self> {
        silence_hdf5_errors();

        let path = path.as_ref();
        let file = netcdf::open(path)?;

        let lat_var = require_variable(&file, &names.lat)?;
        let lon_var = require_variable(&file, &names.lon)?;
        let lat_shape = variable_shape(&lat_var);
        let lon_shape = variable_shape(&lon_var);

        let (lat, lon) = match (lat_shape.as_slice(), lon_shape.as_slice()) {
            (&[ny, nx], &[ny2, nx2]) if ny == ny2 && nx == nx2 => (
                CenterGrid::new(nx, ny, read_as_f64(&lat_var)?)?,
                CenterGrid::new(nx, ny, read_as_f64(&lon_var)?)?,
            ),
            (&[ny], &[nx]) => {
                let lat_1d = read_as_f64(&lat_var)?;
                let lon_1d = read_as_f64(&lon_var)?;
                debug!(nlon = nx, nlat = ny, "Expanding 1D coordinates");
                (
                    CenterGrid::from_fn(nx, ny, |_, j| lat_1d[j])?,
                    CenterGrid::from_fn(nx, ny, |i, _| lon_1d[i])?,
                )
            }
            (a, b) => {
                return Err(ScripError::invalid_shape(format!(
                    "{} has shape {:?} and {} has shape {:?}, expected matching 2D or 1D coordinates",
                    names.lat, a, names.lon, b
                )))
            }
        };

        info!(
            path = %path.display(),
            nlon = lat.nlon(),
            nlat = lat.nlat(),
            "Loaded source grid coordinates"
        );

        Ok(Self {
            path: path.to_path_buf(),
            lat,
            lon,
        })
    }

    /// `[nlon, nlat]`
    pub fn shape(&self) -> [usize; 2] {
        self.lat.shape()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read a scalar field on this grid.
    ///
    /// Accepts `(y, x)` or `(time, y, x)` variables; for the latter the first
    /// record is returned.
    pub fn read_field(&self, name: &str) -> Result<CenterGrid> {
        let file = netcdf::open(&self.path)?;
        let var = require_variable(&file, name)?;
        let shape = variable_shape(&var);
        let [nlon, nlat] = self.shape();

        let (ny, nx, records) = match shape.as_slice() {
            &[ny, nx] => (ny, nx, false),
            &[nt, ny, nx] if nt > 0 => (ny, nx, true),
            other => {
                return Err(ScripError::invalid_shape(format!(
                    "{} has shape {:?}, expected (y, x) or (time, y, x)",
                    name, other
                )))
            }
        };
        if (nx, ny) != (nlon, nlat) {
            return Err(ScripError::invalid_shape(format!(
                "{} is {}x{}, grid is {}x{}",
                name, nx, ny, nlon, nlat
            )));
        }

        let values = if records {
            read_extents_as_f64(&var, (0..1, 0..ny, 0..nx))?
        } else {
            read_as_f64(&var)?
        };
        debug!(field = name, nlon, nlat, "Read source field");
        CenterGrid::new(nlon, nlat, values)
    }
}
