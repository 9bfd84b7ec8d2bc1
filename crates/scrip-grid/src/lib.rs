//! SCRIP grid descriptions for logically rectangular lat/lon grids.
//!
//! This crate turns the cell-center coordinates of a gridded dataset (for
//! example a Gaussian model grid) into a SCRIP grid file, the NetCDF layout
//! spherical remapping tools read to learn a grid's cell geometry.
//!
//! # Architecture
//!
//! ```text
//! source NetCDF (lat, lon)
//!      │
//!      ▼
//! SourceGrid::open ──► CenterGrid (lat), CenterGrid (lon)
//!      │
//!      ▼
//! center_to_corner ──► CornerSet (lat), CornerSet (lon)
//!      │
//!      ▼
//! write_scrip ──► ScripGrid ──► SCRIP NetCDF on disk (optional)
//! ```
//!
//! # Example
//!
//! ```ignore
//! use scrip_grid::{gaus2scrip, ScripConfig};
//!
//! let config = ScripConfig {
//!     input: "sfcf000.nc".into(),
//!     output: Some("scrip_gaussian.nc".into()),
//!     ..Default::default()
//! };
//! let grid = gaus2scrip(&config)?;
//! println!("{}", grid.title());
//! ```

pub mod config;
pub mod corners;
pub mod error;
pub mod gaussian;
pub mod grid;
pub mod netcdf_io;
pub mod pipeline;
pub mod scrip;
pub mod source;

// Re-export commonly used types at crate root
pub use config::{ScripConfig, DEFAULT_OUTPUT};
pub use corners::{center_to_corner, pad_reflect_odd, CornerOptions};
pub use error::{Result, ScripError};
pub use gaussian::{gaussian_grid, gaussian_latitudes, gaussian_quadrature};
pub use grid::{CenterGrid, Corner, CornerSet, GridMask, GRID_CORNERS};
pub use netcdf_io::silence_hdf5_errors;
pub use pipeline::{centers_to_scrip, gaus2scrip, generate_scrip};
pub use scrip::{write_scrip, MaskPolicy, ScripGrid, WriteOptions};
pub use source::{SourceGrid, SourceVariables};
