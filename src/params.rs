//! Elastic plate parameters

use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};

use crate::error::{FlexureError, FlexureResult};
use crate::grid::{field_from_rows, field_to_rows};

/// Elastic thickness of the plate: one value everywhere or one per cell
#[derive(Debug, Clone, PartialEq)]
pub enum Thickness {
    /// Same Te (m) for every cell
    Uniform(f64),
    /// Te (m) per cell; either load-field shape or padded by one ghost cell
    Field(DMatrix<f64>),
}

impl Thickness {
    /// True when the plate has the same thickness everywhere
    pub fn is_uniform(&self) -> bool {
        matches!(self, Thickness::Uniform(_))
    }
}

impl Default for Thickness {
    fn default() -> Self {
        Self::Uniform(0.0)
    }
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum ThicknessRepr {
    Uniform(f64),
    Field(Vec<Vec<f64>>),
}

impl Serialize for Thickness {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Thickness::Uniform(te) => ThicknessRepr::Uniform(*te).serialize(serializer),
            Thickness::Field(te) => ThicknessRepr::Field(field_to_rows(te)).serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for Thickness {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match ThicknessRepr::deserialize(deserializer)? {
            ThicknessRepr::Uniform(te) => Ok(Thickness::Uniform(te)),
            ThicknessRepr::Field(rows) => field_from_rows(&rows)
                .map(Thickness::Field)
                .map_err(serde::de::Error::custom),
        }
    }
}

/// Elastic constants, density contrast and gravity for the plate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElasticParameters {
    /// Young's modulus in Pa
    pub e: f64,
    /// Poisson's ratio
    pub nu: f64,
    /// Elastic thickness
    pub te: Thickness,
    /// Density contrast between mantle and infill, kg/m³
    pub drho: f64,
    /// Gravitational acceleration, m/s²
    pub g: f64,
}

impl ElasticParameters {
    /// Create parameters with the default E, nu and g
    pub fn new(te: Thickness, drho: f64) -> Self {
        Self {
            te,
            drho,
            ..Self::default()
        }
    }

    /// Uniform plate of thickness `te` (m)
    pub fn uniform(te: f64, drho: f64) -> Self {
        Self::new(Thickness::Uniform(te), drho)
    }

    /// Set Young's modulus
    pub fn with_youngs_modulus(mut self, e: f64) -> Self {
        self.e = e;
        self
    }

    /// Set Poisson's ratio
    pub fn with_poisson_ratio(mut self, nu: f64) -> Self {
        self.nu = nu;
        self
    }

    /// Set gravitational acceleration
    pub fn with_gravity(mut self, g: f64) -> Self {
        self.g = g;
        self
    }

    /// Restoring stiffness of the foundation, drho * g (Pa/m)
    pub fn restoring_stiffness(&self) -> f64 {
        self.drho * self.g
    }

    /// Flexural rigidity for a uniform plate, `E Te³ / (12 (1 - nu²))`
    pub fn uniform_rigidity(&self) -> FlexureResult<f64> {
        match &self.te {
            Thickness::Uniform(te) => Ok(flexural_rigidity(self.e, *te, self.nu)),
            Thickness::Field(_) => Err(FlexureError::InvalidInput(
                "analytical solutions require a uniform elastic thickness".to_string(),
            )),
        }
    }
}

impl Default for ElasticParameters {
    fn default() -> Self {
        Self {
            e: 1e11,
            nu: 0.25,
            te: Thickness::default(),
            drho: 0.0,
            g: 9.8,
        }
    }
}

/// Flexural rigidity `D = E Te³ / (12 (1 - nu²))` in N·m
pub fn flexural_rigidity(e: f64, te: f64, nu: f64) -> f64 {
    e * te.powi(3) / (12.0 * (1.0 - nu * nu))
}
