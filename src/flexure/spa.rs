//! Superposition of analytical point-load solutions
//!
//! For a uniform plate on an infinite domain the response to a point load
//! `P` at distance `r` is `P · α²/(2πD) · kei(r/α)`. Both paths here sum that
//! Green's function over the loads: on a grid by shifting one precomputed
//! kernel, on scattered points by direct pairwise evaluation.

use std::f64::consts::PI;

use nalgebra::DMatrix;

use crate::error::{FlexureError, FlexureResult};
use crate::grid::Grid;
use crate::math::{all_finite, kei};
use crate::params::ElasticParameters;

/// Rigidity, flexural parameter and Green's function prefactor of a uniform plate
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpatialDomainVars {
    /// Flexural rigidity D, N·m
    pub d: f64,
    /// Flexural parameter α = (D / (drho·g))^¼, m
    pub alpha: f64,
    /// α² / (2πD)
    pub coeff: f64,
}

impl SpatialDomainVars {
    pub fn new(params: &ElasticParameters) -> FlexureResult<Self> {
        let d = params.uniform_rigidity()?;
        let alpha = (d / params.restoring_stiffness()).powf(0.25);
        let coeff = alpha * alpha / (2.0 * PI * d);
        if !(alpha.is_finite() && alpha > 0.0 && coeff.is_finite()) {
            return Err(FlexureError::InvalidInput(format!(
                "flexural parameter undefined for D = {}, drho·g = {}",
                d,
                params.restoring_stiffness()
            )));
        }
        log::debug!("spatial domain vars: D = {:e}, alpha = {:.1} m", d, alpha);
        Ok(Self { d, alpha, coeff })
    }

    /// Deflection at distance `r` from a unit point load
    #[inline]
    pub fn green(&self, r: f64) -> f64 {
        self.coeff * kei(r / self.alpha)
    }
}

/// Unit-load response on a `(2ny + 1) × (2nx + 1)` grid centred on `(ny, nx)`
pub fn green_kernel_grid(grid: &Grid, vars: &SpatialDomainVars) -> DMatrix<f64> {
    let (ny, nx) = (grid.ny, grid.nx);
    DMatrix::from_fn(2 * ny + 1, 2 * nx + 1, |r, c| {
        let dist_x = (c as f64 - nx as f64) * grid.dx;
        let dist_y = (r as f64 - ny as f64) * grid.dy;
        vars.green(dist_x.hypot(dist_y))
    })
}

/// Gridded superposition: every non-zero cell load `q·dx·dy` acts as a point load
pub fn spatial_domain_gridded(
    grid: &Grid,
    vars: &SpatialDomainVars,
    q0: &DMatrix<f64>,
) -> FlexureResult<DMatrix<f64>> {
    if q0.shape() != grid.shape() {
        return Err(FlexureError::ShapeMismatch(format!(
            "load field is {}x{}, grid is {}x{}",
            q0.nrows(),
            q0.ncols(),
            grid.ny,
            grid.nx
        )));
    }
    let (ny, nx) = grid.shape();
    let mut w = DMatrix::zeros(ny, nx);

    let loaded = q0.iter().filter(|&&q| q != 0.0).count();
    log::debug!("spatial_domain_gridded: {} loaded cells of {}", loaded, ny * nx);
    if loaded == 0 {
        return Ok(w);
    }

    // kei is expensive: evaluate it once and slide the window
    let kernel = green_kernel_grid(grid, vars);
    let cell_area = grid.dx * grid.dy;

    for i in 0..nx {
        for j in 0..ny {
            let q = q0[(j, i)];
            if q == 0.0 {
                continue;
            }
            let scale = q * cell_area;
            let window = kernel.view((ny - j, nx - i), (ny, nx));
            for c in 0..nx {
                for r in 0..ny {
                    w[(r, c)] += scale * window[(r, c)];
                }
            }
        }
    }

    if !all_finite(w.iter()) {
        return Err(FlexureError::NonFiniteSolution("gridded superposition".to_string()));
    }
    Ok(w)
}

/// Scattered superposition: each load is a point source at `(x[k], y[k])`
///
/// No cell-area factor is applied. Returns one deflection per point.
pub fn spatial_domain_no_grid(
    x: &[f64],
    y: &[f64],
    q: &[f64],
    vars: &SpatialDomainVars,
) -> FlexureResult<Vec<f64>> {
    if x.len() != q.len() || y.len() != q.len() {
        return Err(FlexureError::ShapeMismatch(format!(
            "{} x and {} y coordinates for {} loads",
            x.len(),
            y.len(),
            q.len()
        )));
    }
    log::debug!("spatial_domain_no_grid: {} points", q.len());

    let mut w = vec![0.0; q.len()];
    for (m, &qm) in q.iter().enumerate() {
        if qm == 0.0 {
            continue;
        }
        let (x0, y0) = (x[m], y[m]);
        for (k, wk) in w.iter_mut().enumerate() {
            let r = (x[k] - x0).hypot(y[k] - y0);
            *wk += qm * vars.green(r);
        }
    }

    if !all_finite(w.iter()) {
        return Err(FlexureError::NonFiniteSolution("scattered superposition".to_string()));
    }
    Ok(w)
}
