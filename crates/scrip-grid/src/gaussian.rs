//! Gaussian grid generation.
//!
//! A Gaussian grid has regularly spaced longitudes and latitudes at the
//! Gauss-Legendre quadrature nodes, i.e. `asin` of the roots of the Legendre
//! polynomial `P_nlat`. Spectral models such as GFS output on these grids.

use crate::error::{Result, ScripError};
use crate::grid::CenterGrid;

const MAX_NEWTON_ITERATIONS: usize = 100;
const NEWTON_TOLERANCE: f64 = 1e-15;

/// Gaussian latitudes (degrees, north to south) and their quadrature weights.
///
/// Weights sum to 2.
pub fn gaussian_quadrature(nlat: usize) -> Result<(Vec<f64>, Vec<f64>)> {
    if nlat == 0 {
        return Err(ScripError::invalid_shape("Gaussian grid needs at least one latitude"));
    }

    let n = nlat as f64;
    let mut lats = Vec::with_capacity(nlat);
    let mut weights = Vec::with_capacity(nlat);

    for k in 0..nlat {
        // Tricomi's initial guess, descending in x.
        let mut x = (std::f64::consts::PI * (k as f64 + 0.75) / (n + 0.5)).cos();
        let mut dp = 0.0;
        for _ in 0..MAX_NEWTON_ITERATIONS {
            let (p, d) = legendre(nlat, x);
            dp = d;
            let dx = p / d;
            x -= dx;
            if dx.abs() < NEWTON_TOLERANCE {
                break;
            }
        }
        let (_, d) = legendre(nlat, x);
        if d.is_finite() {
            dp = d;
        }
        lats.push(x.asin().to_degrees());
        weights.push(2.0 / ((1.0 - x * x) * dp * dp));
    }

    Ok((lats, weights))
}

/// Gaussian latitudes in degrees, north to south.
pub fn gaussian_latitudes(nlat: usize) -> Result<Vec<f64>> {
    Ok(gaussian_quadrature(nlat)?.0)
}

/// Center coordinates `(lat, lon)` of an `nlon x nlat` Gaussian grid.
///
/// Longitudes start at 0 and step by `360 / nlon` degrees.
pub fn gaussian_grid(nlon: usize, nlat: usize) -> Result<(CenterGrid, CenterGrid)> {
    let lats = gaussian_latitudes(nlat)?;
    let dlon = 360.0 / nlon.max(1) as f64;
    let lat = CenterGrid::from_fn(nlon, nlat, |_, j| lats[j])?;
    let lon = CenterGrid::from_fn(nlon, nlat, |i, _| i as f64 * dlon)?;
    Ok((lat, lon))
}

/// `P_n(x)` and `P_n'(x)` by the three-term recurrence.
fn legendre(n: usize, x: f64) -> (f64, f64) {
    let mut p_prev = 1.0;
    let mut p = x;
    for k in 2..=n {
        let k = k as f64;
        let next = ((2.0 * k - 1.0) * x * p - (k - 1.0) * p_prev) / k;
        p_prev = p;
        p = next;
    }
    if n == 0 {
        return (1.0, 0.0);
    }
    let dp = n as f64 * (x * p - p_prev) / (x * x - 1.0);
    (p, dp)
}
