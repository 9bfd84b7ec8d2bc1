//! Cell-corner derivation from cell-center coordinates.
//!
//! Each center array is extended by one ring of cells using odd reflection
//! (`2 * edge - neighbour`), so boundary cells get a linear extrapolation of
//! half a cell beyond the domain. Every grid vertex is then the mean of the
//! four centers around it, and each cell picks up its four surrounding
//! vertices.
//!
//! ```text
//!            j-1        j        j+1
//!      i-1    +----------+----------+
//!             |    UL    |    UR    |
//!      i      +--------(i,j)--------+
//!             |    LL    |    LR    |
//!      i+1    +----------+----------+
//! ```
//!
//! "Up" is decreasing `i`, "left" is decreasing `j`. Corners are emitted per
//! cell as `[UL, LL, LR, UR]`.

use tracing::debug;

use crate::error::{Result, ScripError};
use crate::grid::{CenterGrid, CornerSet, GRID_CORNERS};

/// Options for [`center_to_corner`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CornerOptions {
    /// Reject grids where `nlon <= nlat`.
    pub require_nlon_gt_nlat: bool,
}

/// Derive the corner latitudes and longitudes of every cell.
///
/// Both inputs must share the same `[nlon, nlat]` shape. The returned corner
/// sets have shape `[nlon * nlat, 4]` and use the same cell linearization as
/// the inputs.
pub fn center_to_corner(
    center_lat: &CenterGrid,
    center_lon: &CenterGrid,
    options: CornerOptions,
) -> Result<(CornerSet, CornerSet)> {
    if center_lat.shape() != center_lon.shape() {
        return Err(ScripError::invalid_shape(format!(
            "lat shape {:?} does not match lon shape {:?}",
            center_lat.shape(),
            center_lon.shape()
        )));
    }
    if options.require_nlon_gt_nlat && center_lat.nlon() <= center_lat.nlat() {
        return Err(ScripError::invalid_shape(format!(
            "expected nlon > nlat, got {}x{}",
            center_lat.nlon(),
            center_lat.nlat()
        )));
    }

    debug!(
        nlon = center_lat.nlon(),
        nlat = center_lat.nlat(),
        "Deriving cell corners"
    );

    Ok((corners_of(center_lat), corners_of(center_lon)))
}

/// Extend a grid by one cell on every side with odd reflection.
///
/// The first axis is padded first, then the second axis over the already
/// padded rows, so the four outer corners are reflections of reflections.
/// An axis of length 1 is padded with its edge value.
pub fn pad_reflect_odd(grid: &CenterGrid) -> CenterGrid {
    let (nlon, nlat) = (grid.nlon(), grid.nlat());

    let along_i = |ii: usize, j: usize| -> f64 {
        if ii == 0 {
            reflect(grid.get(0, j), grid.get(1.min(nlon - 1), j))
        } else if ii == nlon + 1 {
            reflect(grid.get(nlon - 1, j), grid.get(nlon.saturating_sub(2), j))
        } else {
            grid.get(ii - 1, j)
        }
    };

    let data = (0..nlat + 2)
        .flat_map(|jj| (0..nlon + 2).map(move |ii| (ii, jj)))
        .map(|(ii, jj)| {
            if jj == 0 {
                reflect(along_i(ii, 0), along_i(ii, 1.min(nlat - 1)))
            } else if jj == nlat + 1 {
                reflect(along_i(ii, nlat - 1), along_i(ii, nlat.saturating_sub(2)))
            } else {
                along_i(ii, jj - 1)
            }
        })
        .collect();

    CenterGrid::from_raw(nlon + 2, nlat + 2, data)
}

#[inline]
fn reflect(edge: f64, inner: f64) -> f64 {
    2.0 * edge - inner
}

/// Corners for one coordinate array.
fn corners_of(centers: &CenterGrid) -> CornerSet {
    let padded = pad_reflect_odd(centers);
    let (nlon, nlat) = (centers.nlon(), centers.nlat());

    // Vertex (r, c) sits between padded rows r-1, r and columns c-1, c.
    // Pairwise summation keeps the mean of a constant exact.
    let vlon = nlon + 1;
    let vertices: Vec<f64> = (1..nlat + 2)
        .flat_map(|c| (1..nlon + 2).map(move |r| (r, c)))
        .map(|(r, c)| {
            let upper = padded.get(r - 1, c - 1) + padded.get(r - 1, c);
            let lower = padded.get(r, c - 1) + padded.get(r, c);
            (upper + lower) / 4.0
        })
        .collect();
    let vertex = |r: usize, c: usize| vertices[(c - 1) * vlon + (r - 1)];

    let mut cells = Vec::with_capacity(nlon * nlat);
    for j in 0..nlat {
        for i in 0..nlon {
            let (pi, pj) = (i + 1, j + 1);
            let cell: [f64; GRID_CORNERS] = [
                vertex(pi, pj),         // upper-left
                vertex(pi + 1, pj),     // lower-left
                vertex(pi + 1, pj + 1), // lower-right
                vertex(pi, pj + 1),     // upper-right
            ];
            cells.push(cell);
        }
    }
    CornerSet::new(cells)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Corner;

    fn two_by_two() -> CenterGrid {
        CenterGrid::from_rows(&[vec![1.0, 2.0], vec![3.0, 4.0]]).unwrap()
    }

    #[test]
    fn test_pad_reflect_odd_two_by_two() {
        let padded = pad_reflect_odd(&two_by_two());
        assert_eq!(padded.shape(), [4, 4]);

        let expected = [
            [-2.0, -1.0, 0.0, 1.0],
            [0.0, 1.0, 2.0, 3.0],
            [2.0, 3.0, 4.0, 5.0],
            [4.0, 5.0, 6.0, 7.0],
        ];
        for (ii, row) in expected.iter().enumerate() {
            for (jj, &v) in row.iter().enumerate() {
                assert_eq!(padded.get(ii, jj), v, "padded[{}, {}]", ii, jj);
            }
        }

        // Top reflected row = 2 * boundary row - adjacent interior row.
        for jj in 1..3 {
            assert_eq!(
                padded.get(0, jj),
                2.0 * padded.get(1, jj) - padded.get(2, jj)
            );
        }
    }

    #[test]
    fn test_pad_single_cell_axis_uses_edge() {
        let grid = CenterGrid::from_rows(&[vec![5.0], vec![7.0], vec![9.0]]).unwrap();
        let padded = pad_reflect_odd(&grid);
        assert_eq!(padded.shape(), [5, 3]);
        for ii in 0..5 {
            assert_eq!(padded.get(ii, 0), padded.get(ii, 1));
            assert_eq!(padded.get(ii, 2), padded.get(ii, 1));
        }
        assert_eq!(padded.get(0, 1), 3.0);
        assert_eq!(padded.get(4, 1), 11.0);
    }

    #[test]
    fn test_two_by_two_corners() {
        let grid = two_by_two();
        let (corners, _) = center_to_corner(&grid, &grid, CornerOptions::default()).unwrap();

        // Cell order is lon-fastest: (0,0), (1,0), (0,1), (1,1).
        assert_eq!(corners.cell(0), &[-0.5, 1.5, 2.5, 0.5]);
        assert_eq!(corners.cell(1), &[1.5, 3.5, 4.5, 2.5]);
        assert_eq!(corners.cell(2), &[0.5, 2.5, 3.5, 1.5]);
        assert_eq!(corners.cell(3), &[2.5, 4.5, 5.5, 3.5]);
    }

    #[test]
    fn test_constant_grid_corners_are_exact() {
        let c = 0.1_f64 * 3.0;
        let grid = CenterGrid::from_fn(7, 3, |_, _| c).unwrap();
        let (lat, lon) = center_to_corner(&grid, &grid, CornerOptions::default()).unwrap();
        assert!(lat.cells().iter().flatten().all(|&v| v == c));
        assert!(lon.cells().iter().flatten().all(|&v| v == c));
    }

    #[test]
    fn test_shape_preserved() {
        let lat = CenterGrid::from_fn(8, 5, |i, j| (i * j) as f64).unwrap();
        let lon = CenterGrid::from_fn(8, 5, |i, _| i as f64 * 45.0).unwrap();
        let (clat, clon) = center_to_corner(&lat, &lon, CornerOptions::default()).unwrap();
        assert_eq!(clat.shape(), [40, 4]);
        assert_eq!(clon.shape(), [40, 4]);
    }

    #[test]
    fn test_adjacent_cells_share_edges() {
        // Non-linear field so shared values are not trivially equal.
        let grid = CenterGrid::from_fn(6, 4, |i, j| {
            ((i as f64) * 0.7).sin() * 10.0 + (j as f64).powi(2)
        })
        .unwrap();
        let (corners, _) = center_to_corner(&grid, &grid, CornerOptions::default()).unwrap();

        for j in 0..grid.nlat() {
            for i in 0..grid.nlon() {
                let here = grid.flat_index(i, j);
                if j + 1 < grid.nlat() {
                    let right = grid.flat_index(i, j + 1);
                    assert_eq!(
                        corners.corner(here, Corner::UpperRight),
                        corners.corner(right, Corner::UpperLeft)
                    );
                    assert_eq!(
                        corners.corner(here, Corner::LowerRight),
                        corners.corner(right, Corner::LowerLeft)
                    );
                }
                if i + 1 < grid.nlon() {
                    let below = grid.flat_index(i + 1, j);
                    assert_eq!(
                        corners.corner(here, Corner::LowerLeft),
                        corners.corner(below, Corner::UpperLeft)
                    );
                    assert_eq!(
                        corners.corner(here, Corner::LowerRight),
                        corners.corner(below, Corner::UpperRight)
                    );
                }
            }
        }
    }

    #[test]
    fn test_lat_and_lon_are_independent() {
        let lat = CenterGrid::from_fn(4, 3, |_, j| j as f64).unwrap();
        let lon = CenterGrid::from_fn(4, 3, |i, _| i as f64 * 90.0).unwrap();
        let (clat, clon) = center_to_corner(&lat, &lon, CornerOptions::default()).unwrap();

        // Latitude only varies with j, so left/right corners differ by one step.
        let cell = lat.flat_index(1, 1);
        assert_eq!(clat.corner(cell, Corner::UpperLeft), 0.5);
        assert_eq!(clat.corner(cell, Corner::UpperRight), 1.5);
        assert_eq!(clon.corner(cell, Corner::UpperLeft), 45.0);
        assert_eq!(clon.corner(cell, Corner::LowerLeft), 135.0);
    }

    #[test]
    fn test_shape_mismatch_rejected() {
        let a = CenterGrid::from_fn(4, 3, |_, _| 0.0).unwrap();
        let b = CenterGrid::from_fn(3, 4, |_, _| 0.0).unwrap();
        let err = center_to_corner(&a, &b, CornerOptions::default()).unwrap_err();
        assert!(matches!(err, ScripError::InvalidShape(_)));
    }

    #[test]
    fn test_aspect_ratio_precondition_is_optional() {
        let square = CenterGrid::from_fn(3, 3, |_, _| 1.0).unwrap();
        let strict = CornerOptions {
            require_nlon_gt_nlat: true,
        };
        assert!(center_to_corner(&square, &square, strict).is_err());
        assert!(center_to_corner(&square, &square, CornerOptions::default()).is_ok());

        let wide = CenterGrid::from_fn(4, 3, |_, _| 1.0).unwrap();
        assert!(center_to_corner(&wide, &wide, strict).is_ok());
    }
}
