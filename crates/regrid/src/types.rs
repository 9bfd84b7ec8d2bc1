//! Regridding capability and its parameter types.

use serde::{Deserialize, Serialize};

use scrip_grid::CenterGrid;

use crate::error::Result;
use crate::mesh::MeshCenters;

/// Value left in target points that receive no source contribution.
pub const FILL_VALUE: f64 = -999.0;

/// Remapping method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RegridMethod {
    /// Bilinear interpolation between the four surrounding centers.
    #[default]
    Bilinear,
    /// First-order conservative remapping (integral preserving).
    Conservative,
}

impl RegridMethod {
    /// Parse from string (case-insensitive).
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "conservative" | "conserve" => Self::Conservative,
            _ => Self::Bilinear,
        }
    }
}

impl std::fmt::Display for RegridMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bilinear => write!(f, "bilinear"),
            Self::Conservative => write!(f, "conservative"),
        }
    }
}

/// What to do with target points that no source cell maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnmappedAction {
    /// Leave them at [`FILL_VALUE`].
    #[default]
    Ignore,
    /// Fail the regrid.
    Error,
}

impl UnmappedAction {
    /// Parse from string (case-insensitive).
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "error" => Self::Error,
            _ => Self::Ignore,
        }
    }
}

/// Field values at the target mesh points.
#[derive(Debug, Clone, PartialEq)]
pub struct RegridOutput {
    /// One value per target point, [`FILL_VALUE`] where unmapped.
    pub values: Vec<f64>,
    /// Number of target points left at [`FILL_VALUE`].
    pub unmapped: usize,
}

impl RegridOutput {
    /// Min and max over mapped points, `None` if nothing was mapped.
    pub fn range(&self) -> Option<(f64, f64)> {
        self.values
            .iter()
            .copied()
            .filter(|&v| v != FILL_VALUE && !v.is_nan())
            .fold(None, |acc, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }
}

/// A remapping engine from a logically rectangular source grid to the cell
/// centers of a target mesh.
pub trait Regridder {
    /// Load the source grid's cell-center coordinates (degrees).
    fn load_source_grid(&mut self, lat: &CenterGrid, lon: &CenterGrid) -> Result<()>;

    /// Load the target mesh.
    fn load_target_mesh(&mut self, mesh: MeshCenters) -> Result<()>;

    /// Remap a field defined on the source grid onto the target mesh.
    fn regrid(
        &self,
        field: &CenterGrid,
        method: RegridMethod,
        unmapped: UnmappedAction,
    ) -> Result<RegridOutput>;
}
