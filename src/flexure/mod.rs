//! Flexure solution paths
//!
//! - [`fd`]: finite differences on the grid, any rigidity distribution
//! - [`spa`]: superposition of analytical solutions, uniform rigidity only
//! - [`rigidity`]: spacing powers and halo-padded rigidity for `fd`

pub mod fd;
pub mod rigidity;
pub mod spa;

pub use fd::{coeff_matrix, direct_fd_solve, CoefficientMatrix, FdSystem, StencilCoefficients};
pub use rigidity::{elasprep, SpacingPowers};
pub use spa::{green_kernel_grid, spatial_domain_gridded, spatial_domain_no_grid, SpatialDomainVars};
