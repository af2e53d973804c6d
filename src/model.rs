//! Flexure model - grid, plate, load and the method dispatcher

use nalgebra::DMatrix;

use crate::analysis::Method;
use crate::error::{FlexureError, FlexureResult};
use crate::flexure::{fd, spa, CoefficientMatrix, FdSystem, SpatialDomainVars};
use crate::grid::{flatten_row_major, unflatten_row_major, Grid};
use crate::params::ElasticParameters;
use crate::results::FlexureSummary;

/// Coordinates of scattered load points, one per load value in row-major order
#[derive(Debug, Clone, PartialEq)]
pub struct ScatteredPoints {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
}

/// Operator built by the FD path, kept for repeated loads
///
/// Holds the grid and plate it was built for; any difference rebuilds it.
#[derive(Debug, Clone)]
struct FdCache {
    grid: Grid,
    params: ElasticParameters,
    coeff: CoefficientMatrix,
    system: FdSystem,
}

impl FdCache {
    fn matches(&self, grid: &Grid, params: &ElasticParameters) -> bool {
        self.grid == *grid && self.params == *params
    }
}

/// A plate flexure problem and, once run, its deflection
///
/// ```rust
/// use flexure_solver::prelude::*;
/// use nalgebra::DMatrix;
///
/// let mut q0 = DMatrix::zeros(11, 11);
/// q0[(5, 5)] = 1e6;
///
/// let params = ElasticParameters::uniform(10_000.0, 3300.0);
/// let mut model = FlexureModel::new(5000.0, 5000.0, params, q0, Method::Fd).unwrap();
/// model.run().unwrap();
///
/// let w = model.deflection().unwrap();
/// assert!(w[(5, 5)] < 0.0);
/// ```
#[derive(Debug, Clone)]
pub struct FlexureModel {
    /// Grid spacing and extent
    pub grid: Grid,
    /// Plate and foundation parameters
    pub params: ElasticParameters,
    /// Load field, shape `(ny, nx)`, force per unit area
    pub q0: DMatrix<f64>,
    /// Method run by [`FlexureModel::run`]
    pub method: Method,
    /// Point coordinates for `SPA_NG`
    pub points: Option<ScatteredPoints>,

    w: Option<DMatrix<f64>>,
    solution: Option<Method>,
    fd_cache: Option<FdCache>,
}

impl FlexureModel {
    /// Create a model; the grid extent comes from the load field
    pub fn new(
        dx: f64,
        dy: f64,
        params: ElasticParameters,
        q0: DMatrix<f64>,
        method: Method,
    ) -> FlexureResult<Self> {
        let grid = Grid::for_field(dx, dy, &q0);
        grid.validate()?;
        Ok(Self {
            grid,
            params,
            q0,
            method,
            points: None,
            w: None,
            solution: None,
            fd_cache: None,
        })
    }

    /// Attach scattered point coordinates for `SPA_NG`
    pub fn with_points(mut self, x: Vec<f64>, y: Vec<f64>) -> FlexureResult<Self> {
        let n = self.q0.len();
        if x.len() != n || y.len() != n {
            return Err(FlexureError::ShapeMismatch(format!(
                "{} x and {} y coordinates for {} load values",
                x.len(),
                y.len(),
                n
            )));
        }
        self.points = Some(ScatteredPoints { x, y });
        Ok(self)
    }

    // ========================
    // Model Editing Methods
    // ========================

    /// Replace the plate parameters; the cached operator is discarded
    pub fn set_params(&mut self, params: ElasticParameters) {
        self.params = params;
        self.invalidate();
    }

    /// Change the grid spacing; the cached operator is discarded
    pub fn set_spacing(&mut self, dx: f64, dy: f64) -> FlexureResult<()> {
        let grid = Grid::new(dx, dy, self.grid.nx, self.grid.ny);
        grid.validate()?;
        self.grid = grid;
        self.invalidate();
        Ok(())
    }

    /// Replace the load field; must keep the grid shape
    pub fn set_load(&mut self, q0: DMatrix<f64>) -> FlexureResult<()> {
        if q0.shape() != self.grid.shape() {
            return Err(FlexureError::ShapeMismatch(format!(
                "load field is {}x{}, model grid is {}x{}",
                q0.nrows(),
                q0.ncols(),
                self.grid.ny,
                self.grid.nx
            )));
        }
        self.q0 = q0;
        self.w = None;
        Ok(())
    }

    fn invalidate(&mut self) {
        self.fd_cache = None;
        self.w = None;
    }

    // ========================
    // Solution Methods
    // ========================

    /// Run the configured method and store the deflection field
    pub fn run(&mut self) -> FlexureResult<()> {
        log::info!(
            "flexure run: method {}, {}x{} grid",
            self.method,
            self.grid.ny,
            self.grid.nx
        );
        let method = self.method;
        let w = self.solve_with(method)?;
        self.w = Some(w);
        self.solution = Some(method);
        log::debug!("flexure run: done");
        Ok(())
    }

    /// Solve again for a new load with the method used by the last run
    ///
    /// For `FD` the factorized operator from the previous run is reused.
    pub fn rerun(&mut self, q0: DMatrix<f64>) -> FlexureResult<()> {
        let method = self.solution.ok_or(FlexureError::NotSolved)?;
        self.set_load(q0)?;
        log::debug!("flexure rerun: method {}", method);
        let w = self.solve_with(method)?;
        self.w = Some(w);
        Ok(())
    }

    fn solve_with(&mut self, method: Method) -> FlexureResult<DMatrix<f64>> {
        if method.is_gridded() {
            self.grid.equalize_spacing();
        }
        match method {
            Method::Fd => self.fd(),
            Method::Fft => Err(FlexureError::NotImplemented(Method::Fft.to_string())),
            Method::Spa => self.spa(),
            Method::SpaNg => self.spa_ng(),
        }
    }

    fn fd(&mut self) -> FlexureResult<DMatrix<f64>> {
        let stale = self
            .fd_cache
            .as_ref()
            .map_or(true, |c| !c.matches(&self.grid, &self.params));
        if stale {
            let coeff = fd::build_operator(&self.grid, &self.params)?;
            let system = coeff.factorize()?;
            self.fd_cache = Some(FdCache {
                grid: self.grid,
                params: self.params.clone(),
                coeff,
                system,
            });
        } else {
            log::debug!("fd: reusing cached operator");
        }

        match &self.fd_cache {
            Some(cache) => cache.system.solve(&self.q0),
            None => Err(FlexureError::NotSolved),
        }
    }

    fn spa(&self) -> FlexureResult<DMatrix<f64>> {
        let vars = SpatialDomainVars::new(&self.params)?;
        spa::spatial_domain_gridded(&self.grid, &vars, &self.q0)
    }

    fn spa_ng(&self) -> FlexureResult<DMatrix<f64>> {
        let points = self.points.as_ref().ok_or_else(|| {
            FlexureError::InvalidInput("SPA_NG requires x and y point coordinates".to_string())
        })?;
        let vars = SpatialDomainVars::new(&self.params)?;
        let q = flatten_row_major(&self.q0);
        let w = spa::spatial_domain_no_grid(&points.x, &points.y, q.as_slice(), &vars)?;
        unflatten_row_major(&w, self.q0.nrows(), self.q0.ncols())
    }

    // ========================
    // Results Methods
    // ========================

    /// Deflection field from the last run
    pub fn deflection(&self) -> FlexureResult<&DMatrix<f64>> {
        self.w.as_ref().ok_or(FlexureError::NotSolved)
    }

    /// Take the deflection field out of the model
    pub fn into_deflection(self) -> FlexureResult<DMatrix<f64>> {
        self.w.ok_or(FlexureError::NotSolved)
    }

    /// Method used by the last successful run
    pub fn solution(&self) -> Option<Method> {
        self.solution
    }

    /// Check if the model has been solved
    pub fn is_solved(&self) -> bool {
        self.w.is_some()
    }

    /// Cached finite-difference operator, if the FD path has run
    pub fn coefficient_matrix(&self) -> Option<&CoefficientMatrix> {
        self.fd_cache.as_ref().map(|c| &c.coeff)
    }

    /// Get solution summary
    pub fn summary(&self) -> FlexureResult<FlexureSummary> {
        let w = self.deflection()?;
        let method = self.solution.ok_or(FlexureError::NotSolved)?;
        Ok(FlexureSummary::from_field(method, w))
    }
}
