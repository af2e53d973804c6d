//! Mathematical utilities: sparse assembly, banded LU, Kelvin functions

pub mod kelvin;
pub mod sparse;

// Re-export sparse utilities
pub use sparse::{bandwidth, BandedLuSolver, SparseMatrixBuilder};

pub use kelvin::{bei, ber, kei};

/// True when every entry is finite
pub fn all_finite<'a>(values: impl IntoIterator<Item = &'a f64>) -> bool {
    values.into_iter().all(|v| v.is_finite())
}
