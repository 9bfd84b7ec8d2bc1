//! Regridding of lat/lon fields onto unstructured mesh cell centers.
//!
//! The [`Regridder`] trait is the seam to a remapping engine: load a source
//! grid, load a target mesh, then remap fields. [`BilinearRegridder`]
//! implements it for rectilinear, longitude-periodic source grids such as
//! Gaussian grids.
//!
//! # Example
//!
//! ```ignore
//! use regrid::{BilinearRegridder, MeshCenters, RegridMethod, Regridder, UnmappedAction};
//! use scrip_grid::{SourceGrid, SourceVariables};
//!
//! let source = SourceGrid::open("sfcf000.nc", &SourceVariables::default())?;
//! let field = source.read_field("tmpsfc")?;
//!
//! let mut regridder = BilinearRegridder::new();
//! regridder.load_source_grid(&source.lat, &source.lon)?;
//! regridder.load_target_mesh(MeshCenters::from_esmf_mesh("mpas_esmf.nc")?)?;
//! let out = regridder.regrid(&field, RegridMethod::Bilinear, UnmappedAction::Ignore)?;
//! ```

pub mod bilinear;
pub mod error;
pub mod mesh;
pub mod types;

pub use bilinear::BilinearRegridder;
pub use error::{RegridError, Result};
pub use mesh::{write_mesh_field, MeshCenters};
pub use types::{RegridMethod, RegridOutput, Regridder, UnmappedAction, FILL_VALUE};
