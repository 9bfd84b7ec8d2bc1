//! Logical grid types: cell centers, derived corners and the validity mask.

use serde::{Deserialize, Serialize};

use crate::error::{Result, ScripError};

/// Number of corners per SCRIP cell.
pub const GRID_CORNERS: usize = 4;

/// A 2D array of per-cell values over an `nlon x nlat` logical grid.
///
/// Values are stored flat with `i` (the longitude-like axis) varying fastest,
/// so `index = j * nlon + i`. This is also the SCRIP linearization, where
/// `grid_dims = [nlon, nlat]` and the first dimension varies fastest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CenterGrid {
    nlon: usize,
    nlat: usize,
    data: Vec<f64>,
}

impl CenterGrid {
    /// Create a grid from flat data laid out with `i` varying fastest.
    pub fn new(nlon: usize, nlat: usize, data: Vec<f64>) -> Result<Self> {
        if nlon == 0 || nlat == 0 {
            return Err(ScripError::invalid_shape(format!(
                "grid dimensions must be non-zero, got {}x{}",
                nlon, nlat
            )));
        }
        if data.len() != nlon * nlat {
            return Err(ScripError::invalid_shape(format!(
                "expected {} values for a {}x{} grid, got {}",
                nlon * nlat,
                nlon,
                nlat,
                data.len()
            )));
        }
        Ok(Self { nlon, nlat, data })
    }

    /// Shape and length must already agree.
    pub(crate) fn from_raw(nlon: usize, nlat: usize, data: Vec<f64>) -> Self {
        debug_assert_eq!(data.len(), nlon * nlat);
        Self { nlon, nlat, data }
    }

    /// Build a grid by evaluating `f(i, j)` for every cell.
    pub fn from_fn(nlon: usize, nlat: usize, mut f: impl FnMut(usize, usize) -> f64) -> Result<Self> {
        let mut data = Vec::with_capacity(nlon * nlat);
        for j in 0..nlat {
            for i in 0..nlon {
                data.push(f(i, j));
            }
        }
        Self::new(nlon, nlat, data)
    }

    /// Build a grid from rows indexed `[i][j]`, i.e. `rows[i]` holds all `nlat`
    /// values of longitude index `i`.
    pub fn from_rows(rows: &[Vec<f64>]) -> Result<Self> {
        let nlon = rows.len();
        let nlat = rows.first().map(Vec::len).unwrap_or(0);
        if rows.iter().any(|r| r.len() != nlat) {
            return Err(ScripError::invalid_shape("ragged rows"));
        }
        Self::from_fn(nlon, nlat, |i, j| rows[i][j])
    }

    /// Number of cells along the first (longitude-like) axis.
    pub fn nlon(&self) -> usize {
        self.nlon
    }

    /// Number of cells along the second (latitude-like) axis.
    pub fn nlat(&self) -> usize {
        self.nlat
    }

    /// `[nlon, nlat]`
    pub fn shape(&self) -> [usize; 2] {
        [self.nlon, self.nlat]
    }

    /// Total number of cells.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Flat index of cell `(i, j)`.
    #[inline]
    pub fn flat_index(&self, i: usize, j: usize) -> usize {
        j * self.nlon + i
    }

    /// Value at cell `(i, j)`.
    #[inline]
    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.data[self.flat_index(i, j)]
    }

    /// Flattened values in SCRIP order.
    pub fn values(&self) -> &[f64] {
        &self.data
    }

    pub fn into_values(self) -> Vec<f64> {
        self.data
    }
}

/// Corner positions within a cell, in the order SCRIP consumers expect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Corner {
    UpperLeft = 0,
    LowerLeft = 1,
    LowerRight = 2,
    UpperRight = 3,
}

/// Per-cell corner coordinates, shape `(ncells, 4)`.
///
/// Rows follow the same linearization as [`CenterGrid::values`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CornerSet {
    cells: Vec<[f64; GRID_CORNERS]>,
}

impl CornerSet {
    pub fn new(cells: Vec<[f64; GRID_CORNERS]>) -> Self {
        Self { cells }
    }

    /// Rebuild from a flat `(ncells * 4)` buffer as stored in a SCRIP file.
    pub fn from_flat(flat: &[f64]) -> Result<Self> {
        if flat.len() % GRID_CORNERS != 0 {
            return Err(ScripError::invalid_shape(format!(
                "corner buffer length {} is not a multiple of {}",
                flat.len(),
                GRID_CORNERS
            )));
        }
        let cells = flat
            .chunks_exact(GRID_CORNERS)
            .map(|c| [c[0], c[1], c[2], c[3]])
            .collect();
        Ok(Self { cells })
    }

    /// Number of cells.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// `[ncells, 4]`
    pub fn shape(&self) -> [usize; 2] {
        [self.cells.len(), GRID_CORNERS]
    }

    /// Corners of the cell at flat index `cell`.
    pub fn cell(&self, cell: usize) -> &[f64; GRID_CORNERS] {
        &self.cells[cell]
    }

    /// A single corner of the cell at flat index `cell`.
    pub fn corner(&self, cell: usize, corner: Corner) -> f64 {
        self.cells[cell][corner as usize]
    }

    pub fn cells(&self) -> &[[f64; GRID_CORNERS]] {
        &self.cells
    }

    /// Row-major `(ncells, 4)` buffer for serialization.
    pub fn to_flat(&self) -> Vec<f64> {
        self.cells.iter().flatten().copied().collect()
    }
}

/// Per-cell validity flags (1 = active, 0 = masked out).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridMask {
    values: Vec<i32>,
}

impl GridMask {
    /// A mask with every cell active.
    pub fn all_active(len: usize) -> Self {
        Self {
            values: vec![1; len],
        }
    }

    /// Wrap arbitrary mask values. Values are not checked here; see
    /// [`GridMask::validate_binary`].
    pub fn from_values(values: Vec<i32>) -> Self {
        Self { values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &[i32] {
        &self.values
    }

    /// Number of active cells.
    pub fn active_count(&self) -> usize {
        self.values.iter().filter(|&&v| v != 0).count()
    }

    /// Reject any value outside {0, 1}.
    pub fn validate_binary(&self) -> Result<()> {
        if let Some((idx, v)) = self
            .values
            .iter()
            .enumerate()
            .find(|(_, &v)| v != 0 && v != 1)
        {
            return Err(ScripError::InvalidMask(format!(
                "cell {} has mask value {}, expected 0 or 1",
                idx, v
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_center_grid_layout_is_lon_fastest() {
        let grid = CenterGrid::from_fn(3, 2, |i, j| (i * 10 + j) as f64).unwrap();
        assert_eq!(grid.shape(), [3, 2]);
        assert_eq!(grid.values(), &[0.0, 10.0, 20.0, 1.0, 11.0, 21.0]);
        assert_eq!(grid.get(2, 1), 21.0);
        assert_eq!(grid.flat_index(2, 1), 5);
    }

    #[test]
    fn test_center_grid_rejects_bad_lengths() {
        assert!(CenterGrid::new(2, 2, vec![0.0; 3]).is_err());
        assert!(CenterGrid::new(0, 2, vec![]).is_err());
        assert!(CenterGrid::from_rows(&[vec![1.0, 2.0], vec![3.0]]).is_err());
    }

    #[test]
    fn test_from_rows_matches_indexing() {
        let grid = CenterGrid::from_rows(&[vec![1.0, 2.0], vec![3.0, 4.0]]).unwrap();
        assert_eq!(grid.get(0, 1), 2.0);
        assert_eq!(grid.get(1, 0), 3.0);
    }

    #[test]
    fn test_corner_set_flat_roundtrip() {
        let flat: Vec<f64> = (0..8).map(|v| v as f64).collect();
        let corners = CornerSet::from_flat(&flat).unwrap();
        assert_eq!(corners.shape(), [2, 4]);
        assert_eq!(corners.corner(1, Corner::LowerLeft), 5.0);
        assert_eq!(corners.to_flat(), flat);
        assert!(CornerSet::from_flat(&flat[..7]).is_err());
    }

    #[test]
    fn test_mask_validation() {
        let mask = GridMask::all_active(4);
        assert_eq!(mask.active_count(), 4);
        assert!(mask.validate_binary().is_ok());

        let bad = GridMask::from_values(vec![1, 0, 2]);
        assert_eq!(bad.active_count(), 2);
        assert!(matches!(
            bad.validate_binary(),
            Err(ScripError::InvalidMask(_))
        ));
    }
}
