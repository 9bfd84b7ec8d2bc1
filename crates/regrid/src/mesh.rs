//! Target mesh cell centers.

use std::path::Path;

use tracing::{debug, info};

use scrip_grid::netcdf_io::{read_as_f64, require_variable, silence_hdf5_errors, variable_shape};
use scrip_grid::ScripError;

use crate::error::Result;
use crate::types::FILL_VALUE;

/// Cell centers of an unstructured mesh, longitudes in `[0, 360)`.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshCenters {
    lon: Vec<f64>,
    lat: Vec<f64>,
}

impl MeshCenters {
    /// Build from `(lon, lat)` pairs in degrees.
    pub fn new(points: &[(f64, f64)]) -> Self {
        let (lon, lat) = points
            .iter()
            .map(|&(lon, lat)| (normalize_lon(lon), lat))
            .unzip();
        Self { lon, lat }
    }

    /// Read element centers from an ESMF unstructured mesh file
    /// (`centerCoords(elementCount, coordDim)`, longitude first).
    pub fn from_esmf_mesh(path: impl AsRef<Path>) -> Result<Self> {
        silence_hdf5_errors();

        let path = path.as_ref();
        let file = netcdf::open(path)?;
        let var = require_variable(&file, "centerCoords")?;
        let shape = variable_shape(&var);
        if shape.len() != 2 || shape[1] < 2 {
            return Err(ScripError::InvalidFormat(format!(
                "centerCoords has shape {:?}, expected (elementCount, 2)",
                shape
            ))
            .into());
        }

        let coord_dim = shape[1];
        let flat = read_as_f64(&var)?;
        let points: Vec<(f64, f64)> = flat
            .chunks_exact(coord_dim)
            .map(|c| (c[0], c[1]))
            .collect();

        info!(path = %path.display(), elements = points.len(), "Loaded mesh cell centers");
        Ok(Self::new(&points))
    }

    /// Number of target points.
    pub fn len(&self) -> usize {
        self.lon.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lon.is_empty()
    }

    pub fn lon(&self) -> &[f64] {
        &self.lon
    }

    pub fn lat(&self) -> &[f64] {
        &self.lat
    }

    /// `(lon, lat)` pairs.
    pub fn points(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.lon.iter().copied().zip(self.lat.iter().copied())
    }
}

/// Write a regridded field with its mesh coordinates.
///
/// Unmapped points keep [`FILL_VALUE`], which is declared as the field's
/// `_FillValue`.
pub fn write_mesh_field(path: &Path, name: &str, mesh: &MeshCenters, values: &[f64]) -> Result<()> {
    if values.len() != mesh.len() {
        return Err(ScripError::invalid_shape(format!(
            "{} values for {} mesh points",
            values.len(),
            mesh.len()
        ))
        .into());
    }

    let mut file = netcdf::create(path)?;
    file.add_dimension("elementCount", mesh.len())?;

    {
        let mut var = file.add_variable::<f64>("centerLon", &["elementCount"])?;
        var.put_attribute("units", "degrees_east")?;
        var.put_values(mesh.lon(), ..)?;
    }
    {
        let mut var = file.add_variable::<f64>("centerLat", &["elementCount"])?;
        var.put_attribute("units", "degrees_north")?;
        var.put_values(mesh.lat(), ..)?;
    }
    {
        let mut var = file.add_variable::<f64>(name, &["elementCount"])?;
        var.set_fill_value(FILL_VALUE)?;
        var.put_values(values, ..)?;
    }

    debug!(path = %path.display(), field = name, points = mesh.len(), "Wrote mesh field");
    Ok(())
}

fn normalize_lon(lon: f64) -> f64 {
    lon.rem_euclid(360.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_negative_longitudes_are_wrapped() {
        let mesh = MeshCenters::new(&[(-90.0, 10.0), (45.0, -5.0), (360.0, 0.0)]);
        assert_eq!(mesh.lon(), &[270.0, 45.0, 0.0]);
        assert_eq!(mesh.lat(), &[10.0, -5.0, 0.0]);
        assert_eq!(mesh.len(), 3);
    }

    #[test]
    fn test_points_iterator() {
        let mesh = MeshCenters::new(&[(1.0, 2.0), (3.0, 4.0)]);
        let points: Vec<_> = mesh.points().collect();
        assert_eq!(points, vec![(1.0, 2.0), (3.0, 4.0)]);
    }
}
