//! Regular grid geometry and field helpers
//!
//! Fields are stored as `DMatrix<f64>` with shape `(ny, nx)`: row `j` is the
//! y index, column `i` the x index. Whenever a field is flattened into a
//! vector (for the linear solve or for scattered points) the ordering is
//! row-major, `k = j * nx + i`.

use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};

use crate::error::{FlexureError, FlexureResult};

/// Grid spacing and extent
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Grid {
    /// Spacing along x (columns), m
    pub dx: f64,
    /// Spacing along y (rows), m
    pub dy: f64,
    /// Number of columns
    pub nx: usize,
    /// Number of rows
    pub ny: usize,
}

impl Grid {
    /// Create a new grid
    pub fn new(dx: f64, dy: f64, nx: usize, ny: usize) -> Self {
        Self { dx, dy, nx, ny }
    }

    /// Create a grid matching the shape of a load field
    pub fn for_field(dx: f64, dy: f64, field: &DMatrix<f64>) -> Self {
        Self::new(dx, dy, field.ncols(), field.nrows())
    }

    /// Force `dy` to equal `dx`; the stencil and kernel assume square cells
    pub fn equalize_spacing(&mut self) {
        if self.dy != self.dx {
            log::warn!("dy = {} overwritten with dx = {}", self.dy, self.dx);
        }
        self.dy = self.dx;
    }

    /// Number of cells
    pub fn len(&self) -> usize {
        self.nx * self.ny
    }

    /// True when the grid has no cells
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Shape as `(ny, nx)`
    pub fn shape(&self) -> (usize, usize) {
        (self.ny, self.nx)
    }

    /// Check spacing and extent
    pub fn validate(&self) -> FlexureResult<()> {
        if !(self.dx > 0.0) || !self.dx.is_finite() {
            return Err(FlexureError::InvalidInput(format!(
                "dx must be positive and finite, got {}",
                self.dx
            )));
        }
        if !(self.dy > 0.0) || !self.dy.is_finite() {
            return Err(FlexureError::InvalidInput(format!(
                "dy must be positive and finite, got {}",
                self.dy
            )));
        }
        if self.is_empty() {
            return Err(FlexureError::InvalidInput("grid has no cells".to_string()));
        }
        Ok(())
    }

    /// Cell-centre x coordinates of every cell in row-major order
    pub fn x_coords(&self) -> Vec<f64> {
        (0..self.ny)
            .flat_map(|_| (0..self.nx).map(|i| i as f64 * self.dx))
            .collect()
    }

    /// Cell-centre y coordinates of every cell in row-major order
    pub fn y_coords(&self) -> Vec<f64> {
        (0..self.ny)
            .flat_map(|j| std::iter::repeat(j as f64 * self.dy).take(self.nx))
            .collect()
    }
}

/// Flatten a field into a row-major vector
pub fn flatten_row_major(field: &DMatrix<f64>) -> DVector<f64> {
    let (ny, nx) = field.shape();
    DVector::from_fn(ny * nx, |k, _| field[(k / nx, k % nx)])
}

/// Rebuild a `(ny, nx)` field from a row-major slice
pub fn unflatten_row_major(values: &[f64], ny: usize, nx: usize) -> FlexureResult<DMatrix<f64>> {
    if values.len() != ny * nx {
        return Err(FlexureError::ShapeMismatch(format!(
            "{} values cannot fill a {}x{} field",
            values.len(),
            ny,
            nx
        )));
    }
    Ok(DMatrix::from_row_slice(ny, nx, values))
}

/// Build a field from nested rows (the layout used by JSON parameter files)
pub fn field_from_rows(rows: &[Vec<f64>]) -> FlexureResult<DMatrix<f64>> {
    let ny = rows.len();
    let nx = rows.first().map(|r| r.len()).unwrap_or(0);
    if ny == 0 || nx == 0 {
        return Err(FlexureError::InvalidInput("field is empty".to_string()));
    }
    if let Some((j, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != nx) {
        return Err(FlexureError::InvalidInput(format!(
            "row {} has {} values, expected {}",
            j,
            row.len(),
            nx
        )));
    }
    Ok(DMatrix::from_fn(ny, nx, |j, i| rows[j][i]))
}

/// Nested rows of a field
pub fn field_to_rows(field: &DMatrix<f64>) -> Vec<Vec<f64>> {
    field
        .row_iter()
        .map(|row| row.iter().copied().collect())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equalize_spacing() {
        let mut grid = Grid::new(1000.0, 500.0, 4, 3);
        grid.equalize_spacing();
        assert_eq!(grid.dy, 1000.0);
        assert_eq!(grid.len(), 12);
    }

    #[test]
    fn test_validate_rejects_bad_spacing() {
        assert!(Grid::new(0.0, 1.0, 2, 2).validate().is_err());
        assert!(Grid::new(1.0, f64::NAN, 2, 2).validate().is_err());
        assert!(Grid::new(1.0, 1.0, 0, 2).validate().is_err());
        assert!(Grid::new(1.0, 1.0, 2, 2).validate().is_ok());
    }

    #[test]
    fn test_row_major_flattening() {
        let field = DMatrix::from_row_slice(2, 3, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        let v = flatten_row_major(&field);
        assert_eq!(v.as_slice(), &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);

        let back = unflatten_row_major(v.as_slice(), 2, 3).unwrap();
        assert_eq!(back, field);
        assert!(unflatten_row_major(v.as_slice(), 4, 3).is_err());
    }

    #[test]
    fn test_coordinates_follow_row_major_order() {
        let grid = Grid::new(10.0, 10.0, 3, 2);
        assert_eq!(grid.x_coords(), vec![0.0, 10.0, 20.0, 0.0, 10.0, 20.0]);
        assert_eq!(grid.y_coords(), vec![0.0, 0.0, 0.0, 10.0, 10.0, 10.0]);
    }

    #[test]
    fn test_field_from_rows() {
        let field = field_from_rows(&[vec![1.0, 2.0], vec![3.0, 4.0]]).unwrap();
        assert_eq!(field[(1, 0)], 3.0);
        assert_eq!(field_to_rows(&field), vec![vec![1.0, 2.0], vec![3.0, 4.0]]);

        assert!(field_from_rows(&[vec![1.0, 2.0], vec![3.0]]).is_err());
        assert!(field_from_rows(&[]).is_err());
    }
}
