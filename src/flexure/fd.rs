//! Finite-difference solution of the plate equation
//!
//! Discretizes `∇²(D ∇²w) + drho·g·w = q` (with the Poisson coupling terms
//! for variable `D`) on a regular grid with `dx == dy`. Each cell gets a
//! 13-point stencil: the centre, the four axis neighbours at distance one
//! and two, and the four diagonal neighbours.
//!
//! Neighbour names are compass directions on the `(ny, nx)` field: north is
//! row `j - 1`, south row `j + 1`, west column `i - 1`, east column `i + 1`.

use nalgebra::{DMatrix, DVector};
use nalgebra_sparse::CsrMatrix;

use crate::error::{FlexureError, FlexureResult};
use crate::grid::{flatten_row_major, unflatten_row_major, Grid};
use crate::math::{all_finite, BandedLuSolver, SparseMatrixBuilder};
use crate::params::ElasticParameters;

use super::rigidity::{elasprep, SpacingPowers};

/// The 13 stencil coefficients of every cell, each a `(ny, nx)` field
#[derive(Debug, Clone)]
pub struct StencilCoefficients {
    pub center: DMatrix<f64>,
    pub north: DMatrix<f64>,
    pub south: DMatrix<f64>,
    pub west: DMatrix<f64>,
    pub east: DMatrix<f64>,
    pub north2: DMatrix<f64>,
    pub south2: DMatrix<f64>,
    pub west2: DMatrix<f64>,
    pub east2: DMatrix<f64>,
    pub north_west: DMatrix<f64>,
    pub north_east: DMatrix<f64>,
    pub south_west: DMatrix<f64>,
    pub south_east: DMatrix<f64>,
}

impl StencilCoefficients {
    /// Evaluate the stencil from a halo-padded rigidity field
    ///
    /// `d` must have two more rows and columns than the load field.
    pub fn new(
        d: &DMatrix<f64>,
        drho: f64,
        powers: &SpacingPowers,
        nu: f64,
        g: f64,
    ) -> FlexureResult<Self> {
        let (rows, cols) = d.shape();
        if rows < 3 || cols < 3 {
            return Err(FlexureError::ShapeMismatch(format!(
                "rigidity field {}x{} is too small to carry a one-cell halo",
                rows, cols
            )));
        }
        let (ny, nx) = (rows - 2, cols - 2);
        let SpacingPowers { dx4, dy4, dx2dy2 } = *powers;
        let buoyancy = drho * g;

        let mut c = Self {
            center: DMatrix::zeros(ny, nx),
            north: DMatrix::zeros(ny, nx),
            south: DMatrix::zeros(ny, nx),
            west: DMatrix::zeros(ny, nx),
            east: DMatrix::zeros(ny, nx),
            north2: DMatrix::zeros(ny, nx),
            south2: DMatrix::zeros(ny, nx),
            west2: DMatrix::zeros(ny, nx),
            east2: DMatrix::zeros(ny, nx),
            north_west: DMatrix::zeros(ny, nx),
            north_east: DMatrix::zeros(ny, nx),
            south_west: DMatrix::zeros(ny, nx),
            south_east: DMatrix::zeros(ny, nx),
        };

        for i in 0..nx {
            for j in 0..ny {
                // Halo indices: cell (j, i) sits at (j + 1, i + 1)
                let (r, s) = (j + 1, i + 1);
                let dc = d[(r, s)];
                let dn = d[(r - 1, s)];
                let ds = d[(r + 1, s)];
                let dw = d[(r, s - 1)];
                let de = d[(r, s + 1)];
                let dnw = d[(r - 1, s - 1)];
                let dne = d[(r - 1, s + 1)];
                let dsw = d[(r + 1, s - 1)];
                let dse = d[(r + 1, s + 1)];

                let ddx = de - dw;
                let ddy = ds - dn;
                let twist = ((1.0 - nu) / 8.0) * (dse - dne - dsw + dnw);
                let lap_x = de - 2.0 * dc + dw;
                let lap_y = ds - 2.0 * dc + dn;

                c.south2[(j, i)] = (dc + 0.5 * ddy) / dy4;
                c.north2[(j, i)] = (dc - 0.5 * ddy) / dy4;
                c.east2[(j, i)] = (dc + 0.5 * ddx) / dx4;
                c.west2[(j, i)] = (dc - 0.5 * ddx) / dx4;

                c.south[(j, i)] = (-6.0 * dc + 2.0 * dn) / dy4
                    + nu * lap_x / dx2dy2
                    + (-ds - 4.0 * dc + dn) / dx2dy2;
                c.north[(j, i)] = (2.0 * ds - 6.0 * dc) / dy4
                    + nu * lap_x / dx2dy2
                    + (ds - 4.0 * dc - dn) / dx2dy2;
                c.east[(j, i)] = (-6.0 * dc + 2.0 * dw) / dx4
                    + nu * lap_y / dx2dy2
                    + (-de - 4.0 * dc + dw) / dx2dy2;
                c.west[(j, i)] = (2.0 * de - 6.0 * dc) / dx4
                    + nu * lap_y / dx2dy2
                    + (de - 4.0 * dc - dw) / dx2dy2;

                c.south_east[(j, i)] = (2.0 * dc + 0.5 * (ddx + ddy) + twist) / dx2dy2;
                c.south_west[(j, i)] = (2.0 * dc + 0.5 * (-ddx + ddy) - twist) / dx2dy2;
                c.north_east[(j, i)] = (2.0 * dc + 0.5 * (ddx - ddy) - twist) / dx2dy2;
                c.north_west[(j, i)] = (2.0 * dc + 0.5 * (-ddx - ddy) + twist) / dx2dy2;

                c.center[(j, i)] = (-2.0 * de + 10.0 * dc - 2.0 * dw) / dx4
                    + (-2.0 * ds + 10.0 * dc - 2.0 * dn) / dy4
                    + 8.0 * dc / dx2dy2
                    + nu * (-2.0 * de - 2.0 * dw + 8.0 * dc - 2.0 * ds - 2.0 * dn) / dx2dy2
                    + buoyancy;
            }
        }

        Ok(c)
    }

    /// Shape `(ny, nx)` of the coefficient fields
    pub fn shape(&self) -> (usize, usize) {
        self.center.shape()
    }

    /// Stencil taps grouped by block row: `(row offset, [(column offset, field)])`
    fn bands(&self) -> [(isize, Vec<(isize, &DMatrix<f64>)>); 5] {
        [
            (-2, vec![(0, &self.north2)]),
            (-1, vec![(-1, &self.north_west), (0, &self.north), (1, &self.north_east)]),
            (
                0,
                vec![
                    (-2, &self.west2),
                    (-1, &self.west),
                    (0, &self.center),
                    (1, &self.east),
                    (2, &self.east2),
                ],
            ),
            (1, vec![(-1, &self.south_west), (0, &self.south), (1, &self.south_east)]),
            (2, vec![(0, &self.south2)]),
        ]
    }
}

/// Sparse `(nx·ny) × (nx·ny)` flexure operator in row-major cell order
#[derive(Debug, Clone)]
pub struct CoefficientMatrix {
    pub matrix: CsrMatrix<f64>,
    pub nx: usize,
    pub ny: usize,
}

impl CoefficientMatrix {
    /// Number of unknowns
    pub fn size(&self) -> usize {
        self.nx * self.ny
    }

    /// Factorize for repeated solves with different loads
    pub fn factorize(&self) -> FlexureResult<FdSystem> {
        log::debug!("factorizing {} unknowns", self.size());
        let lu = BandedLuSolver::factorize(&self.matrix)?;
        log::debug!("factorized: bandwidth {:?}", lu.bandwidth());
        Ok(FdSystem {
            lu,
            nx: self.nx,
            ny: self.ny,
        })
    }
}

/// Assemble the sparse operator from the stencil, one block row per grid row
///
/// Block row `j` holds a 5-wide band for row `j`, 3-wide bands for rows
/// `j ± 1` and single diagonals for rows `j ± 2`. Bands that would fall
/// outside the grid, vertically or horizontally, are dropped; the plate
/// sees zero deflection beyond its edges.
pub fn coeff_matrix(
    d: &DMatrix<f64>,
    drho: f64,
    powers: &SpacingPowers,
    nu: f64,
    g: f64,
) -> FlexureResult<CoefficientMatrix> {
    log::debug!("coeff_matrix: assembling");
    let stencil = StencilCoefficients::new(d, drho, powers, nu, g)?;
    let matrix = assemble(&stencil);
    Ok(matrix)
}

/// Scatter stencil coefficients into the sparse operator
pub fn assemble(stencil: &StencilCoefficients) -> CoefficientMatrix {
    let (ny, nx) = stencil.shape();
    let n = nx * ny;
    let mut builder = SparseMatrixBuilder::new(n);
    let bands = stencil.bands();

    for j in 0..ny {
        for (dj, taps) in &bands {
            let Some(jj) = shift(j, *dj, ny) else {
                continue;
            };
            for &(di, coeffs) in taps {
                for i in 0..nx {
                    if let Some(ii) = shift(i, di, nx) {
                        builder.add(j * nx + i, jj * nx + ii, coeffs[(j, i)]);
                    }
                }
            }
        }
    }

    let matrix = builder.to_csr();
    log::debug!(
        "coeff_matrix: {} unknowns, {} triplets, {} non-zeros",
        n,
        builder.nnz(),
        matrix.nnz()
    );
    CoefficientMatrix { matrix, nx, ny }
}

#[inline]
fn shift(index: usize, offset: isize, len: usize) -> Option<usize> {
    let moved = index as isize + offset;
    (moved >= 0 && (moved as usize) < len).then_some(moved as usize)
}

/// A factorized operator, reusable for any load on the same grid and rigidity
#[derive(Debug, Clone)]
pub struct FdSystem {
    lu: BandedLuSolver,
    nx: usize,
    ny: usize,
}

impl FdSystem {
    /// Solve for the deflection under `q0`, returned with the output sign convention
    pub fn solve(&self, q0: &DMatrix<f64>) -> FlexureResult<DMatrix<f64>> {
        if q0.shape() != (self.ny, self.nx) {
            return Err(FlexureError::ShapeMismatch(format!(
                "load field is {}x{}, operator was built for {}x{}",
                q0.nrows(),
                q0.ncols(),
                self.ny,
                self.nx
            )));
        }
        let q: DVector<f64> = flatten_row_major(q0);
        let w = self.lu.solve(&q)?;
        if !all_finite(w.iter()) {
            return Err(FlexureError::NonFiniteSolution(
                "finite-difference solve".to_string(),
            ));
        }
        unflatten_row_major((-w).as_slice(), self.ny, self.nx)
    }
}

/// Solve `C w = q` directly and return `-w` on the grid
pub fn direct_fd_solve(coeff: &CoefficientMatrix, q0: &DMatrix<f64>) -> FlexureResult<DMatrix<f64>> {
    log::debug!("direct_fd_solve: start");
    let w = coeff.factorize()?.solve(q0)?;
    log::debug!("direct_fd_solve: done");
    Ok(w)
}

/// Build the operator for a grid and plate; `grid.dy` must already equal `grid.dx`
pub fn build_operator(grid: &Grid, params: &ElasticParameters) -> FlexureResult<CoefficientMatrix> {
    let (powers, d) = elasprep(grid, params)?;
    coeff_matrix(&d, params.drho, &powers, params.nu, params.g)
}

/// Full finite-difference path: rigidity, operator, solve
pub fn solve(grid: &Grid, params: &ElasticParameters, q0: &DMatrix<f64>) -> FlexureResult<DMatrix<f64>> {
    let coeff = build_operator(grid, params)?;
    direct_fd_solve(&coeff, q0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra_sparse::convert::serial::convert_csr_dense;

    fn uniform_operator(n: usize, drho: f64) -> (CoefficientMatrix, f64) {
        let grid = Grid::new(1000.0, 1000.0, n, n);
        let params = ElasticParameters::uniform(1e4, drho);
        let d = params.uniform_rigidity().unwrap();
        (build_operator(&grid, &params).unwrap(), d)
    }

    #[test]
    fn test_uniform_stencil_is_biharmonic() {
        let (coeff, d) = uniform_operator(7, 1000.0);
        let dense = convert_csr_dense(&coeff.matrix);
        let h4 = 1000.0f64.powi(4);
        let k = 3 * 7 + 3; // centre cell

        assert_relative_eq!(dense[(k, k)], 20.0 * d / h4 + 1000.0 * 9.8, max_relative = 1e-12);
        for off in [1, 7] {
            assert_relative_eq!(dense[(k, k + off)], -8.0 * d / h4, max_relative = 1e-12);
            assert_relative_eq!(dense[(k, k - off)], -8.0 * d / h4, max_relative = 1e-12);
            assert_relative_eq!(dense[(k, k + 2 * off)], d / h4, max_relative = 1e-12);
            assert_relative_eq!(dense[(k, k - 2 * off)], d / h4, max_relative = 1e-12);
        }
        for off in [6, 8] {
            assert_relative_eq!(dense[(k, k + off)], 2.0 * d / h4, max_relative = 1e-12);
            assert_relative_eq!(dense[(k, k - off)], 2.0 * d / h4, max_relative = 1e-12);
        }
        assert_eq!(coeff.matrix.row(k).nnz(), 13);
    }

    #[test]
    fn test_interior_row_sum_is_buoyancy() {
        let (coeff, _) = uniform_operator(7, 1000.0);
        let dense = convert_csr_dense(&coeff.matrix);
        let k = 3 * 7 + 3;
        let sum: f64 = dense.row(k).iter().sum();
        let scale = dense[(k, k)];
        assert!((sum - 1000.0 * 9.8).abs() < 1e-9 * scale);
    }

    #[test]
    fn test_edges_are_truncated() {
        let (coeff, _) = uniform_operator(6, 1000.0);
        // Corner cell keeps centre, 2 + 2 axis, 1 diagonal
        assert_eq!(coeff.matrix.row(0).nnz(), 6);
        // Second cell of the first row: west, 2 east, 2 south, 2 diagonals
        assert_eq!(coeff.matrix.row(1).nnz(), 8);
        assert_eq!(coeff.size(), 36);
    }

    #[test]
    fn test_uniform_operator_is_symmetric() {
        let (coeff, _) = uniform_operator(6, 1000.0);
        let dense = convert_csr_dense(&coeff.matrix);
        let scale = dense.amax();
        assert!((&dense - dense.transpose()).amax() <= 1e-12 * scale);
    }

    #[test]
    fn test_variable_rigidity_operator_is_not_symmetric() {
        let grid = Grid::new(1000.0, 1000.0, 6, 6);
        let te = DMatrix::from_fn(6, 6, |j, i| 5_000.0 + 1_000.0 * (i + 2 * j) as f64);
        let params = ElasticParameters::new(crate::params::Thickness::Field(te), 1000.0);
        let coeff = build_operator(&grid, &params).unwrap();
        let dense = convert_csr_dense(&coeff.matrix);
        let scale = dense.amax();
        assert!((&dense - dense.transpose()).amax() > 1e-6 * scale);
    }

    #[test]
    fn test_variable_rigidity_preserves_linear_fields() {
        // Bending of a constant or linear deflection is zero, leaving only buoyancy
        let (ny, nx, h) = (9, 11, 5000.0);
        let grid = Grid::new(h, h, nx, ny);
        let te = DMatrix::from_fn(ny, nx, |j, i| 10_000.0 + 800.0 * i as f64 + 500.0 * j as f64);
        let params = ElasticParameters::new(crate::params::Thickness::Field(te), 3300.0);
        let coeff = build_operator(&grid, &params).unwrap();
        let buoyancy = 3300.0 * 9.8;

        for j in 2..ny - 2 {
            for i in 2..nx - 2 {
                let row = coeff.matrix.row(j * nx + i);
                assert_eq!(row.nnz(), 13);

                let (mut one, mut x, mut y) = (0.0, 0.0, 0.0);
                for (&col, &v) in row.col_indices().iter().zip(row.values()) {
                    one += v;
                    x += v * (col % nx) as f64 * h;
                    y += v * (col / nx) as f64 * h;
                }
                assert_relative_eq!(one, buoyancy, max_relative = 1e-8);
                assert_relative_eq!(x, buoyancy * i as f64 * h, max_relative = 1e-8);
                assert_relative_eq!(y, buoyancy * j as f64 * h, max_relative = 1e-8);
            }
        }
    }

    #[test]
    fn test_small_rigidity_field_rejected() {
        let d = DMatrix::from_element(2, 5, 1.0);
        let err = coeff_matrix(&d, 1.0, &SpacingPowers::new(1.0, 1.0), 0.25, 9.8).unwrap_err();
        assert!(matches!(err, FlexureError::ShapeMismatch(_)));
    }

    #[test]
    fn test_point_load_deflects_down_as_negative() {
        let grid = Grid::new(1000.0, 1000.0, 9, 9);
        let params = ElasticParameters::uniform(1e3, 3300.0);
        let mut q0 = DMatrix::zeros(9, 9);
        q0[(4, 4)] = 1e6;
        let w = solve(&grid, &params, &q0).unwrap();
        assert!(w[(4, 4)] < 0.0);
        assert!(w[(4, 4)].abs() >= w.amax() * (1.0 - 1e-12));
    }

    #[test]
    fn test_operator_reuse_matches_fresh_solve() {
        let grid = Grid::new(2000.0, 2000.0, 8, 10);
        let params = ElasticParameters::uniform(5e3, 3300.0);
        let coeff = build_operator(&grid, &params).unwrap();
        let system = coeff.factorize().unwrap();

        let q1 = DMatrix::from_fn(10, 8, |j, i| if j == 3 && i == 2 { 5e5 } else { 0.0 });
        let q2 = DMatrix::from_fn(10, 8, |j, i| (j + i) as f64 * 1e3);
        for q in [q1, q2] {
            let reused = system.solve(&q).unwrap();
            let fresh = direct_fd_solve(&coeff, &q).unwrap();
            assert!((&reused - &fresh).amax() <= 1e-12 * fresh.amax().max(1e-300));
        }
        assert!(system.solve(&DMatrix::zeros(8, 10)).is_err());
    }

    #[test]
    fn test_degenerate_plate_is_singular() {
        let grid = Grid::new(1000.0, 1000.0, 5, 5);
        let params = ElasticParameters::uniform(0.0, 0.0);
        let q0 = DMatrix::from_element(5, 5, 1.0);
        let err = solve(&grid, &params, &q0).unwrap_err();
        assert!(matches!(err, FlexureError::SingularMatrix));
    }
}
