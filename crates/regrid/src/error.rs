//! Error types for regridding.

use thiserror::Error;

use scrip_grid::ScripError;

/// Errors that can occur while regridding a field.
#[derive(Error, Debug)]
pub enum RegridError {
    /// Failure reading or validating grid data.
    #[error(transparent)]
    Grid(#[from] ScripError),

    /// NetCDF library error.
    #[error("NetCDF error: {0}")]
    NetCdf(#[from] netcdf::Error),

    /// Source coordinates are not separable into lon(i) and lat(j) axes.
    #[error("source grid is not rectilinear: {0}")]
    NotRectilinear(String),

    /// Target points received no contribution under an error policy.
    #[error("{count} target points are outside the source grid")]
    Unmapped { count: usize },

    /// Requested method is not implemented by this regridder.
    #[error("unsupported regrid method: {0}")]
    Unsupported(String),

    /// Source grid or target mesh has not been loaded yet.
    #[error("{0} not loaded")]
    NotLoaded(&'static str),

    /// Field shape does not match the loaded source grid.
    #[error("field shape {actual:?} does not match source grid {expected:?}")]
    ShapeMismatch {
        expected: [usize; 2],
        actual: [usize; 2],
    },
}

/// Result type for regridding operations.
pub type Result<T> = std::result::Result<T, RegridError>;
