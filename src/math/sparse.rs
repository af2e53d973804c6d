//! Sparse matrix utilities for the finite-difference operator
//!
//! The flexure operator couples each cell to at most 12 neighbours, so the
//! `(nx·ny)²` matrix is assembled from triplets and factorized in banded
//! storage. The band half-width is `2·nx`, which keeps the direct solve
//! at `O(n·nx²)` work instead of the dense `O(n³)`.

use nalgebra::DVector;
use nalgebra_sparse::{CooMatrix, CsrMatrix};

use crate::error::{FlexureError, FlexureResult};

/// Sparse matrix builder using COO format
/// More efficient for incremental assembly
pub struct SparseMatrixBuilder {
    size: usize,
    entries: Vec<(usize, usize, f64)>,
}

impl SparseMatrixBuilder {
    /// Create a new builder for a `size × size` matrix
    pub fn new(size: usize) -> Self {
        Self {
            size,
            entries: Vec::with_capacity(size * 13),
        }
    }

    /// Add a value to the matrix (accumulates if already exists)
    #[inline]
    pub fn add(&mut self, row: usize, col: usize, value: f64) {
        if value != 0.0 {
            self.entries.push((row, col, value));
        }
    }

    /// Convert to CSR format for efficient solves
    pub fn to_csr(&self) -> CsrMatrix<f64> {
        let mut coo = CooMatrix::new(self.size, self.size);

        for &(row, col, val) in &self.entries {
            coo.push(row, col, val);
        }

        CsrMatrix::from(&coo)
    }

    /// Number of stored entries (duplicates counted separately)
    pub fn nnz(&self) -> usize {
        self.entries.len()
    }

}

/// Lower and upper bandwidth of a sparse matrix
pub fn bandwidth(csr: &CsrMatrix<f64>) -> (usize, usize) {
    let mut lower = 0;
    let mut upper = 0;
    for (row, col, _) in csr.triplet_iter() {
        if row > col {
            lower = lower.max(row - col);
        } else {
            upper = upper.max(col - row);
        }
    }
    (lower, upper)
}

/// LU factorization with partial pivoting in banded storage
///
/// General direct solver: no symmetry or definiteness is assumed. Row
/// interchanges are recorded per elimination step and replayed on the
/// right-hand side, so the multipliers never move once computed. Pivoting
/// widens the upper band from `ku` to `kl + ku`.
#[derive(Debug, Clone)]
pub struct BandedLuSolver {
    size: usize,
    kl: usize,
    ku: usize,
    // Row i holds columns i - kl ..= i + kl + ku
    width: usize,
    band: Vec<f64>,
    pivots: Vec<usize>,
}

impl BandedLuSolver {
    /// Factorize a square CSR matrix
    pub fn factorize(csr: &CsrMatrix<f64>) -> FlexureResult<Self> {
        if csr.nrows() != csr.ncols() {
            return Err(FlexureError::ShapeMismatch(format!(
                "coefficient matrix must be square, got {}x{}",
                csr.nrows(),
                csr.ncols()
            )));
        }
        let size = csr.nrows();
        let (kl, ku) = bandwidth(csr);
        let width = 2 * kl + ku + 1;

        let mut solver = Self {
            size,
            kl,
            ku,
            width,
            band: vec![0.0; size * width],
            pivots: vec![0; size],
        };

        let mut scale = 0.0f64;
        for (row, col, &val) in csr.triplet_iter() {
            *solver.at_mut(row, col) += val;
            scale = scale.max(val.abs());
        }
        if !scale.is_finite() {
            return Err(FlexureError::NonFiniteSolution(
                "coefficient matrix contains non-finite entries".to_string(),
            ));
        }

        solver.eliminate(scale)?;
        Ok(solver)
    }

    #[inline]
    fn offset(&self, row: usize, col: usize) -> usize {
        debug_assert!(col + self.kl >= row && col <= row + self.kl + self.ku);
        row * self.width + (col + self.kl - row)
    }

    #[inline]
    fn at(&self, row: usize, col: usize) -> f64 {
        self.band[self.offset(row, col)]
    }

    #[inline]
    fn at_mut(&mut self, row: usize, col: usize) -> &mut f64 {
        let idx = self.offset(row, col);
        &mut self.band[idx]
    }

    fn eliminate(&mut self, scale: f64) -> FlexureResult<()> {
        let n = self.size;
        let tiny = scale * f64::EPSILON * (n.max(1) as f64);

        for k in 0..n {
            let last_row = (k + self.kl).min(n - 1);
            let last_col = (k + self.kl + self.ku).min(n - 1);

            // Partial pivoting within the band
            let mut p = k;
            let mut best = self.at(k, k).abs();
            for i in k + 1..=last_row {
                let v = self.at(i, k).abs();
                if v > best {
                    best = v;
                    p = i;
                }
            }
            // Also catches NaN pivots
            if !(best > tiny) {
                return Err(FlexureError::SingularMatrix);
            }
            self.pivots[k] = p;

            if p != k {
                for j in k..=last_col {
                    let a = self.offset(k, j);
                    let b = self.offset(p, j);
                    self.band.swap(a, b);
                }
            }

            let pivot = self.at(k, k);
            for i in k + 1..=last_row {
                let l = self.at(i, k) / pivot;
                *self.at_mut(i, k) = l;
                if l == 0.0 {
                    continue;
                }
                for j in k + 1..=last_col {
                    let u = self.at(k, j);
                    *self.at_mut(i, j) -= l * u;
                }
            }
        }

        Ok(())
    }

    /// Solve `A x = b` with the stored factors
    pub fn solve(&self, b: &DVector<f64>) -> FlexureResult<DVector<f64>> {
        let n = self.size;
        if b.len() != n {
            return Err(FlexureError::ShapeMismatch(format!(
                "right-hand side has {} entries, matrix has {} rows",
                b.len(),
                n
            )));
        }
        let mut x = b.clone();

        // Forward substitution: replay interchanges, apply L
        for k in 0..n {
            let p = self.pivots[k];
            if p != k {
                x.swap_rows(k, p);
            }
            let xk = x[k];
            if xk == 0.0 {
                continue;
            }
            let last_row = (k + self.kl).min(n - 1);
            for i in k + 1..=last_row {
                x[i] -= self.at(i, k) * xk;
            }
        }

        // Backward substitution with U
        for k in (0..n).rev() {
            let last_col = (k + self.kl + self.ku).min(n - 1);
            let mut sum = x[k];
            for j in k + 1..=last_col {
                sum -= self.at(k, j) * x[j];
            }
            x[k] = sum / self.at(k, k);
        }

        Ok(x)
    }

    /// Lower and upper bandwidth of the factorized matrix
    pub fn bandwidth(&self) -> (usize, usize) {
        (self.kl, self.ku)
    }
}
