//! NetCDF fixture writers.
//!
//! These produce small files with the same layout as the real inputs:
//! a model history file with `lat`/`lon` (and optionally a scalar field)
//! dimensioned `(grid_yt, grid_xt)`, and an ESMF unstructured mesh file
//! with `centerCoords`.

use std::path::Path;

/// Common grid sizes.
pub mod grid {
    /// T62 Gaussian grid (192 x 94)
    pub const T62: (usize, usize) = (192, 94);

    /// Small grid for fast tests
    pub const SMALL: (usize, usize) = (12, 6);
}

/// Write a model-history-style file with 2D `lat(grid_yt, grid_xt)` and
/// `lon(grid_yt, grid_xt)`, plus an optional `(time, grid_yt, grid_xt)` field.
///
/// `lat`, `lon` and the field are flattened with `grid_xt` varying fastest.
pub fn write_source_grid(
    path: &Path,
    nlon: usize,
    nlat: usize,
    lat: &[f64],
    lon: &[f64],
    field: Option<(&str, &[f32])>,
) -> Result<(), netcdf::Error> {
    let mut file = netcdf::create(path)?;
    file.add_dimension("time", 1)?;
    file.add_dimension("grid_yt", nlat)?;
    file.add_dimension("grid_xt", nlon)?;

    {
        let mut var = file.add_variable::<f64>("lat", &["grid_yt", "grid_xt"])?;
        var.put_attribute("units", "degrees_north")?;
        var.put_values(lat, ..)?;
    }
    {
        let mut var = file.add_variable::<f64>("lon", &["grid_yt", "grid_xt"])?;
        var.put_attribute("units", "degrees_east")?;
        var.put_values(lon, ..)?;
    }
    if let Some((name, values)) = field {
        let mut var = file.add_variable::<f32>(name, &["time", "grid_yt", "grid_xt"])?;
        var.put_attribute("units", "K")?;
        var.put_values(values, ..)?;
    }
    Ok(())
}

/// Write a file with 1D `lat(lat)` and `lon(lon)` coordinate vectors.
pub fn write_source_grid_1d(path: &Path, lat: &[f64], lon: &[f64]) -> Result<(), netcdf::Error> {
    let mut file = netcdf::create(path)?;
    file.add_dimension("lat", lat.len())?;
    file.add_dimension("lon", lon.len())?;
    file.add_variable::<f64>("lat", &["lat"])?.put_values(lat, ..)?;
    file.add_variable::<f64>("lon", &["lon"])?.put_values(lon, ..)?;
    Ok(())
}

/// Write a minimal ESMF mesh file holding only element centers.
///
/// `centers` are `(lon, lat)` pairs in degrees.
pub fn write_esmf_mesh_centers(path: &Path, centers: &[(f64, f64)]) -> Result<(), netcdf::Error> {
    let mut file = netcdf::create(path)?;
    file.add_dimension("elementCount", centers.len())?;
    file.add_dimension("coordDim", 2)?;

    let flat: Vec<f64> = centers.iter().flat_map(|&(lon, lat)| [lon, lat]).collect();
    let mut var = file.add_variable::<f64>("centerCoords", &["elementCount", "coordDim"])?;
    var.put_attribute("units", "degrees")?;
    var.put_values(&flat, ..)?;
    Ok(())
}
