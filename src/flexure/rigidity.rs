//! Rigidity preparation for the finite-difference operator

use nalgebra::DMatrix;

use crate::error::{FlexureError, FlexureResult};
use crate::grid::Grid;
use crate::params::{flexural_rigidity, ElasticParameters, Thickness};

/// Powers of the grid spacing used by the stencil
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpacingPowers {
    pub dx4: f64,
    pub dy4: f64,
    pub dx2dy2: f64,
}

impl SpacingPowers {
    pub fn new(dx: f64, dy: f64) -> Self {
        Self {
            dx4: dx.powi(4),
            dy4: dy.powi(4),
            dx2dy2: dx * dx * dy * dy,
        }
    }
}

/// Spacing powers and the halo-padded rigidity field for a grid
///
/// The rigidity field has shape `(ny + 2, nx + 2)`: one ghost cell on each
/// side so second differences of `D` exist at the domain edge.
pub fn elasprep(grid: &Grid, params: &ElasticParameters) -> FlexureResult<(SpacingPowers, DMatrix<f64>)> {
    log::debug!("elasprep: {}x{} grid, dx = {}", grid.ny, grid.nx, grid.dx);
    let powers = SpacingPowers::new(grid.dx, grid.dy);
    let d = padded_rigidity(&params.te, params.e, params.nu, grid.ny, grid.nx)?;
    Ok((powers, d))
}

/// Rigidity on a `(ny + 2, nx + 2)` halo grid
///
/// A per-cell thickness of load shape is padded by repeating the edge cells;
/// a thickness field that already carries the halo is used as given.
pub fn padded_rigidity(
    te: &Thickness,
    e: f64,
    nu: f64,
    ny: usize,
    nx: usize,
) -> FlexureResult<DMatrix<f64>> {
    match te {
        Thickness::Uniform(te) => Ok(DMatrix::from_element(ny + 2, nx + 2, flexural_rigidity(e, *te, nu))),
        Thickness::Field(te) => {
            let padded = if te.shape() == (ny, nx) {
                pad_edges(te)
            } else if te.shape() == (ny + 2, nx + 2) {
                te.clone()
            } else {
                return Err(FlexureError::ShapeMismatch(format!(
                    "thickness field is {}x{}, expected {}x{} or {}x{} with halo",
                    te.nrows(),
                    te.ncols(),
                    ny,
                    nx,
                    ny + 2,
                    nx + 2
                )));
            };
            Ok(padded.map(|t| flexural_rigidity(e, t, nu)))
        }
    }
}

/// Surround a field with one ring of ghost cells copied from its edge
pub fn pad_edges(field: &DMatrix<f64>) -> DMatrix<f64> {
    let (ny, nx) = field.shape();
    DMatrix::from_fn(ny + 2, nx + 2, |r, c| {
        let j = r.saturating_sub(1).min(ny - 1);
        let i = c.saturating_sub(1).min(nx - 1);
        field[(j, i)]
    })
}
