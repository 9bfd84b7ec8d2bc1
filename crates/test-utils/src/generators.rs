//! Synthetic grid data generators.
//!
//! Every generator returns values flattened with the first (longitude) index
//! varying fastest, i.e. `values[j * nlon + i]`, which is both the C-order
//! layout of a `(lat, lon)` NetCDF variable and the SCRIP cell order.

/// Regular lat/lon cell centers covering the globe.
///
/// Longitudes start at 0 and step by `360 / nlon`; latitudes run north to
/// south through cell centers, so no point sits on a pole.
///
/// ```
/// use test_utils::regular_lat_lon;
///
/// let (lat, lon) = regular_lat_lon(4, 2);
/// assert_eq!(lat.len(), 8);
/// assert_eq!(lat[0], 45.0);
/// assert_eq!(lon[1], 90.0);
/// ```
pub fn regular_lat_lon(nlon: usize, nlat: usize) -> (Vec<f64>, Vec<f64>) {
    let dlon = 360.0 / nlon as f64;
    let dlat = 180.0 / nlat as f64;
    let mut lat = Vec::with_capacity(nlon * nlat);
    let mut lon = Vec::with_capacity(nlon * nlat);
    for j in 0..nlat {
        for i in 0..nlon {
            lat.push(90.0 - (j as f64 + 0.5) * dlat);
            lon.push(i as f64 * dlon);
        }
    }
    (lat, lon)
}

/// A field linear in the logical indices: `a + b * i + c * j`.
pub fn linear_index_field(nlon: usize, nlat: usize, a: f64, b: f64, c: f64) -> Vec<f64> {
    let mut data = Vec::with_capacity(nlon * nlat);
    for j in 0..nlat {
        for i in 0..nlon {
            data.push(a + b * i as f64 + c * j as f64);
        }
    }
    data
}

/// Surface-temperature-like values in Kelvin for the given latitudes.
///
/// Warm at the equator (about 300 K), cold toward the poles (about 240 K).
pub fn temperature_from_latitudes(lat: &[f64]) -> Vec<f64> {
    lat.iter()
        .map(|&phi| 240.0 + 60.0 * phi.to_radians().cos().powi(2))
        .collect()
}
