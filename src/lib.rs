//! Flexure Solver - elastic plate (lithospheric) flexure in native Rust
//!
//! Computes the deflection of a thin elastic plate resting on a fluid
//! foundation under a distributed vertical load, by:
//! - Finite differences (`FD`): sparse 13-point operator, any rigidity distribution
//! - Superposition of analytical solutions on a grid (`SPA`), uniform rigidity
//! - Superposition of analytical solutions on scattered points (`SPA_NG`)
//!
//! `FFT` is recognized but not implemented and reports an error.
//!
//! ## Example
//! ```rust
//! use flexure_solver::prelude::*;
//! use nalgebra::DMatrix;
//!
//! // 21 x 21 cells, 5 km spacing, one loaded cell in the middle
//! let mut q0 = DMatrix::zeros(21, 21);
//! q0[(10, 10)] = 1e6;
//!
//! // 20 km elastic thickness over a 3300 kg/m³ density contrast
//! let params = ElasticParameters::uniform(20_000.0, 3300.0);
//!
//! let mut model = FlexureModel::new(5000.0, 5000.0, params, q0, Method::Fd).unwrap();
//! model.run().unwrap();
//!
//! let summary = model.summary().unwrap();
//! assert_eq!(summary.min_cell, (10, 10));
//! ```

pub mod analysis;
pub mod config;
pub mod error;
pub mod flexure;
pub mod grid;
pub mod math;
pub mod model;
pub mod params;
pub mod results;

// Re-export common types
pub mod prelude {
    pub use crate::analysis::Method;
    pub use crate::config::FlexureConfig;
    pub use crate::error::{FlexureError, FlexureResult};
    pub use crate::grid::Grid;
    pub use crate::model::{FlexureModel, ScatteredPoints};
    pub use crate::params::{ElasticParameters, Thickness};
    pub use crate::results::FlexureSummary;
}
