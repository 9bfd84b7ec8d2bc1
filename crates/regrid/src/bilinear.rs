//! Bilinear regridding from a rectilinear, longitude-periodic grid.
//!
//! Gaussian and regular lat/lon grids are separable: longitude depends only
//! on the first index and latitude only on the second. Target points are
//! located on the two 1D axes by binary search; longitude wraps around at
//! 360 degrees, latitude does not, so points poleward of the outermost
//! source latitudes are unmapped.

use tracing::{debug, warn};

use scrip_grid::CenterGrid;

use crate::error::{RegridError, Result};
use crate::mesh::MeshCenters;
use crate::types::{RegridMethod, RegridOutput, Regridder, UnmappedAction, FILL_VALUE};

/// Coordinates within one row/column must agree to this tolerance (degrees).
const AXIS_TOLERANCE: f64 = 1e-9;

/// Separable source axes.
#[derive(Debug, Clone)]
struct SourceAxes {
    /// Longitudes relative to the first one, strictly increasing in [0, 360).
    lon_offsets: Vec<f64>,
    lon0: f64,
    /// Latitudes in source order, strictly monotonic.
    lat: Vec<f64>,
}

/// A location on the source grid: lower indices and fractional weights.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Stencil {
    i0: usize,
    i1: usize,
    wx: f64,
    j0: usize,
    j1: usize,
    wy: f64,
}

/// [`Regridder`] for rectilinear lat/lon grids onto mesh cell centers.
#[derive(Debug, Clone, Default)]
pub struct BilinearRegridder {
    axes: Option<SourceAxes>,
    shape: [usize; 2],
    /// One stencil per target point, `None` where unmapped.
    stencils: Option<Vec<Option<Stencil>>>,
    mesh: Option<MeshCenters>,
}

impl BilinearRegridder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of target points that fall outside the source grid.
    pub fn unmapped_count(&self) -> usize {
        self.stencils
            .as_ref()
            .map(|s| s.iter().filter(|p| p.is_none()).count())
            .unwrap_or(0)
    }

    fn build_stencils(&mut self) {
        if let (Some(axes), Some(mesh)) = (&self.axes, &self.mesh) {
            let stencils: Vec<Option<Stencil>> =
                mesh.points().map(|(lon, lat)| axes.locate(lon, lat)).collect();
            debug!(
                points = stencils.len(),
                unmapped = stencils.iter().filter(|s| s.is_none()).count(),
                "Computed bilinear stencils"
            );
            self.stencils = Some(stencils);
        }
    }
}

impl Regridder for BilinearRegridder {
    fn load_source_grid(&mut self, lat: &CenterGrid, lon: &CenterGrid) -> Result<()> {
        self.axes = Some(SourceAxes::from_centers(lat, lon)?);
        self.shape = lat.shape();
        self.build_stencils();
        Ok(())
    }

    fn load_target_mesh(&mut self, mesh: MeshCenters) -> Result<()> {
        self.mesh = Some(mesh);
        self.build_stencils();
        Ok(())
    }

    fn regrid(
        &self,
        field: &CenterGrid,
        method: RegridMethod,
        unmapped: UnmappedAction,
    ) -> Result<RegridOutput> {
        if method != RegridMethod::Bilinear {
            return Err(RegridError::Unsupported(method.to_string()));
        }
        if self.axes.is_none() {
            return Err(RegridError::NotLoaded("source grid"));
        }
        let stencils = self
            .stencils
            .as_ref()
            .ok_or(RegridError::NotLoaded("target mesh"))?;
        if field.shape() != self.shape {
            return Err(RegridError::ShapeMismatch {
                expected: self.shape,
                actual: field.shape(),
            });
        }

        let missing = stencils.iter().filter(|s| s.is_none()).count();
        if missing > 0 {
            match unmapped {
                UnmappedAction::Error => return Err(RegridError::Unmapped { count: missing }),
                UnmappedAction::Ignore => {
                    warn!(count = missing, "Target points outside source grid left at fill value")
                }
            }
        }

        let values = stencils
            .iter()
            .map(|s| match s {
                Some(s) => s.apply(field),
                None => FILL_VALUE,
            })
            .collect();

        Ok(RegridOutput {
            values,
            unmapped: missing,
        })
    }
}

impl SourceAxes {
    fn from_centers(lat: &CenterGrid, lon: &CenterGrid) -> Result<Self> {
        if lat.shape() != lon.shape() {
            return Err(RegridError::ShapeMismatch {
                expected: lat.shape(),
                actual: lon.shape(),
            });
        }
        let [nlon, nlat] = lat.shape();

        let lon_axis: Vec<f64> = (0..nlon).map(|i| lon.get(i, 0)).collect();
        let lat_axis: Vec<f64> = (0..nlat).map(|j| lat.get(0, j)).collect();

        for j in 0..nlat {
            for i in 0..nlon {
                if (lon.get(i, j) - lon_axis[i]).abs() > AXIS_TOLERANCE
                    || (lat.get(i, j) - lat_axis[j]).abs() > AXIS_TOLERANCE
                {
                    return Err(RegridError::NotRectilinear(format!(
                        "coordinates at ({}, {}) break the lon(i) / lat(j) pattern",
                        i, j
                    )));
                }
            }
        }

        let lon0 = lon_axis[0];
        let lon_offsets: Vec<f64> = lon_axis.iter().map(|&l| (l - lon0).rem_euclid(360.0)).collect();
        if lon_offsets.windows(2).any(|w| w[1] <= w[0]) {
            return Err(RegridError::NotRectilinear(
                "longitudes must increase within one 360 degree period".to_string(),
            ));
        }

        let ascending = lat_axis.windows(2).all(|w| w[1] > w[0]);
        let descending = lat_axis.windows(2).all(|w| w[1] < w[0]);
        if !(ascending || descending) {
            return Err(RegridError::NotRectilinear(
                "latitudes must be strictly monotonic".to_string(),
            ));
        }

        Ok(Self {
            lon_offsets,
            lon0,
            lat: lat_axis,
        })
    }

    fn locate(&self, lon: f64, lat: f64) -> Option<Stencil> {
        let (i0, i1, wx) = self.locate_lon(lon);
        let (j0, j1, wy) = self.locate_lat(lat)?;
        Some(Stencil {
            i0,
            i1,
            wx,
            j0,
            j1,
            wy,
        })
    }

    /// Periodic: the interval after the last longitude wraps to the first.
    fn locate_lon(&self, lon: f64) -> (usize, usize, f64) {
        let n = self.lon_offsets.len();
        let t = (lon - self.lon0).rem_euclid(360.0);
        let i0 = self.lon_offsets.partition_point(|&o| o <= t).saturating_sub(1);
        let i1 = (i0 + 1) % n;
        let upper = if i0 + 1 == n { 360.0 } else { self.lon_offsets[i0 + 1] };
        let width = upper - self.lon_offsets[i0];
        let wx = if width > 0.0 { (t - self.lon_offsets[i0]) / width } else { 0.0 };
        (i0, i1, wx)
    }

    fn locate_lat(&self, lat: f64) -> Option<(usize, usize, f64)> {
        let n = self.lat.len();
        if n == 1 {
            return (lat == self.lat[0]).then_some((0, 0, 0.0));
        }
        let descending = self.lat[0] > self.lat[n - 1];
        let (lo, hi) = if descending {
            (self.lat[n - 1], self.lat[0])
        } else {
            (self.lat[0], self.lat[n - 1])
        };
        if lat < lo || lat > hi || lat.is_nan() {
            return None;
        }

        let k = if descending {
            self.lat.partition_point(|&v| v > lat)
        } else {
            self.lat.partition_point(|&v| v < lat)
        };
        // k is the first index at or past `lat`; the bracket is [k-1, k].
        let j1 = k.clamp(1, n - 1);
        let j0 = j1 - 1;
        let wy = (lat - self.lat[j0]) / (self.lat[j1] - self.lat[j0]);
        Some((j0, j1, wy))
    }
}

impl Stencil {
    fn apply(&self, field: &CenterGrid) -> f64 {
        let v00 = field.get(self.i0, self.j0);
        let v10 = field.get(self.i1, self.j0);
        let v01 = field.get(self.i0, self.j1);
        let v11 = field.get(self.i1, self.j1);

        let top = v00 * (1.0 - self.wx) + v10 * self.wx;
        let bottom = v01 * (1.0 - self.wx) + v11 * self.wx;
        top * (1.0 - self.wy) + bottom * self.wy
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scrip_grid::gaussian_grid;

    fn regular(nlon: usize, nlat: usize) -> (CenterGrid, CenterGrid) {
        let dlon = 360.0 / nlon as f64;
        let dlat = 180.0 / nlat as f64;
        let lat = CenterGrid::from_fn(nlon, nlat, |_, j| 90.0 - (j as f64 + 0.5) * dlat).unwrap();
        let lon = CenterGrid::from_fn(nlon, nlat, |i, _| i as f64 * dlon).unwrap();
        (lat, lon)
    }

    fn loaded(nlon: usize, nlat: usize, points: &[(f64, f64)]) -> (BilinearRegridder, CenterGrid, CenterGrid) {
        let (lat, lon) = regular(nlon, nlat);
        let mut r = BilinearRegridder::new();
        r.load_source_grid(&lat, &lon).unwrap();
        r.load_target_mesh(MeshCenters::new(points)).unwrap();
        (r, lat, lon)
    }

    #[test]
    fn test_exact_at_source_centers() {
        let (r, lat, lon) = loaded(8, 4, &[(90.0, 22.5), (315.0, -67.5)]);
        let field = CenterGrid::from_fn(8, 4, |i, j| (i * 10 + j) as f64).unwrap();
        let out = r
            .regrid(&field, RegridMethod::Bilinear, UnmappedAction::Error)
            .unwrap();
        assert_eq!(lon.get(2, 1), 90.0);
        assert_eq!(lat.get(2, 1), 22.5);
        assert_eq!(out.values, vec![21.0, 73.0]);
        assert_eq!(out.unmapped, 0);
    }

    #[test]
    fn test_reproduces_linear_field_between_centers() {
        // Field linear in lat, constant in lon.
        let (r, lat, _) = loaded(8, 4, &[(10.0, 0.0), (200.0, 40.0), (33.0, -50.0)]);
        let field = CenterGrid::from_fn(8, 4, |i, j| 2.0 * lat.get(i, j) + 1.0).unwrap();
        let out = r
            .regrid(&field, RegridMethod::Bilinear, UnmappedAction::Error)
            .unwrap();
        for (got, want) in out.values.iter().zip([1.0, 81.0, -99.0]) {
            assert!((got - want).abs() < 1e-9, "got {} want {}", got, want);
        }
    }

    #[test]
    fn test_longitude_wraps_past_last_column() {
        // Halfway between lon 315 and lon 360 == 0.
        let (r, _, _) = loaded(8, 4, &[(337.5, 22.5), (-22.5, 22.5)]);
        let field = CenterGrid::from_fn(8, 4, |i, _| if i == 0 { 10.0 } else if i == 7 { 20.0 } else { 0.0 })
            .unwrap();
        let out = r
            .regrid(&field, RegridMethod::Bilinear, UnmappedAction::Error)
            .unwrap();
        assert!((out.values[0] - 15.0).abs() < 1e-12);
        assert!((out.values[1] - 15.0).abs() < 1e-12);
    }

    #[test]
    fn test_polar_points_unmapped() {
        let (r, _, _) = loaded(8, 4, &[(0.0, 89.0), (0.0, 0.0), (0.0, -89.0)]);
        let field = CenterGrid::from_fn(8, 4, |_, _| 5.0).unwrap();

        let out = r
            .regrid(&field, RegridMethod::Bilinear, UnmappedAction::Ignore)
            .unwrap();
        assert_eq!(out.values, vec![FILL_VALUE, 5.0, FILL_VALUE]);
        assert_eq!(out.unmapped, 2);
        assert_eq!(r.unmapped_count(), 2);

        let err = r
            .regrid(&field, RegridMethod::Bilinear, UnmappedAction::Error)
            .unwrap_err();
        assert!(matches!(err, RegridError::Unmapped { count: 2 }));
    }

    #[test]
    fn test_ascending_latitudes() {
        let lat = CenterGrid::from_fn(4, 3, |_, j| -30.0 + 30.0 * j as f64).unwrap();
        let lon = CenterGrid::from_fn(4, 3, |i, _| 90.0 * i as f64).unwrap();
        let mut r = BilinearRegridder::new();
        r.load_source_grid(&lat, &lon).unwrap();
        r.load_target_mesh(MeshCenters::new(&[(0.0, 15.0)])).unwrap();
        let field = CenterGrid::from_fn(4, 3, |_, j| j as f64).unwrap();
        let out = r
            .regrid(&field, RegridMethod::Bilinear, UnmappedAction::Error)
            .unwrap();
        assert!((out.values[0] - 1.5).abs() < 1e-12);
    }

    #[test]
    fn test_gaussian_source_grid() {
        let (lat, lon) = gaussian_grid(32, 16).unwrap();
        let mut r = BilinearRegridder::new();
        r.load_source_grid(&lat, &lon).unwrap();
        r.load_target_mesh(MeshCenters::new(&[(100.0, 12.3), (-170.0, -45.6)]))
            .unwrap();
        let field = CenterGrid::from_fn(32, 16, |_, _| 273.15).unwrap();
        let out = r
            .regrid(&field, RegridMethod::Bilinear, UnmappedAction::Error)
            .unwrap();
        assert!(out.values.iter().all(|v| (v - 273.15).abs() < 1e-9));
    }

    #[test]
    fn test_curvilinear_source_rejected() {
        let lat = CenterGrid::from_fn(4, 3, |i, j| j as f64 * 10.0 + i as f64).unwrap();
        let lon = CenterGrid::from_fn(4, 3, |i, _| i as f64 * 90.0).unwrap();
        let err = BilinearRegridder::new()
            .load_source_grid(&lat, &lon)
            .unwrap_err();
        assert!(matches!(err, RegridError::NotRectilinear(_)));
    }

    #[test]
    fn test_conservative_unsupported() {
        let (r, _, _) = loaded(8, 4, &[(0.0, 0.0)]);
        let field = CenterGrid::from_fn(8, 4, |_, _| 1.0).unwrap();
        let err = r
            .regrid(&field, RegridMethod::Conservative, UnmappedAction::Ignore)
            .unwrap_err();
        assert!(matches!(err, RegridError::Unsupported(_)));
    }

    #[test]
    fn test_requires_loaded_grid_and_mesh() {
        let field = CenterGrid::from_fn(8, 4, |_, _| 1.0).unwrap();
        let r = BilinearRegridder::new();
        assert!(matches!(
            r.regrid(&field, RegridMethod::Bilinear, UnmappedAction::Ignore),
            Err(RegridError::NotLoaded("source grid"))
        ));

        let (lat, lon) = regular(8, 4);
        let mut r = BilinearRegridder::new();
        r.load_source_grid(&lat, &lon).unwrap();
        assert!(matches!(
            r.regrid(&field, RegridMethod::Bilinear, UnmappedAction::Ignore),
            Err(RegridError::NotLoaded("target mesh"))
        ));
    }

    #[test]
    fn test_field_shape_must_match() {
        let (r, _, _) = loaded(8, 4, &[(0.0, 0.0)]);
        let field = CenterGrid::from_fn(4, 8, |_, _| 1.0).unwrap();
        assert!(matches!(
            r.regrid(&field, RegridMethod::Bilinear, UnmappedAction::Ignore),
            Err(RegridError::ShapeMismatch { .. })
        ));
    }
}
