//! Result types for flexure solutions

use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};

use crate::analysis::Method;

/// Summary of a deflection field
///
/// Deflections follow the solver sign convention: cells beneath a positive
/// load come out negative, the peripheral bulge positive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlexureSummary {
    /// Method that produced the field
    pub method: Method,
    /// Number of columns
    pub nx: usize,
    /// Number of rows
    pub ny: usize,
    /// Largest deflection value
    pub max_deflection: f64,
    /// Cell `(j, i)` of the largest value
    pub max_cell: (usize, usize),
    /// Smallest deflection value
    pub min_deflection: f64,
    /// Cell `(j, i)` of the smallest value
    pub min_cell: (usize, usize),
    /// Mean deflection over all cells
    pub mean_deflection: f64,
}

impl FlexureSummary {
    /// Summarize a deflection field
    pub fn from_field(method: Method, w: &DMatrix<f64>) -> Self {
        let (ny, nx) = w.shape();
        let mut summary = Self {
            method,
            nx,
            ny,
            max_deflection: f64::NEG_INFINITY,
            max_cell: (0, 0),
            min_deflection: f64::INFINITY,
            min_cell: (0, 0),
            mean_deflection: 0.0,
        };

        for j in 0..ny {
            for i in 0..nx {
                let v = w[(j, i)];
                if v > summary.max_deflection {
                    summary.max_deflection = v;
                    summary.max_cell = (j, i);
                }
                if v < summary.min_deflection {
                    summary.min_deflection = v;
                    summary.min_cell = (j, i);
                }
            }
        }

        if !w.is_empty() {
            summary.mean_deflection = w.sum() / w.len() as f64;
        }
        summary
    }

    /// Largest magnitude of deflection
    pub fn max_abs_deflection(&self) -> f64 {
        self.max_deflection.abs().max(self.min_deflection.abs())
    }
}
