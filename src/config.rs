//! Flat JSON configuration for a flexure run

use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::analysis::Method;
use crate::error::{FlexureError, FlexureResult};
use crate::grid::{field_from_rows, field_to_rows};
use crate::model::FlexureModel;
use crate::params::{ElasticParameters, Thickness};

fn default_method() -> String {
    Method::Fd.as_str().to_string()
}

fn default_youngs_modulus() -> f64 {
    1e11
}

fn default_poisson_ratio() -> f64 {
    0.25
}

fn default_gravity() -> f64 {
    9.8
}

/// Parameters of one run, as read from a JSON file or request body
///
/// ```json
/// {
///   "method": "SPA",
///   "dx": 5000.0,
///   "te": 20000.0,
///   "drho": 3300.0,
///   "q0": [[0.0, 0.0, 0.0], [0.0, 1e6, 0.0], [0.0, 0.0, 0.0]]
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlexureConfig {
    /// Method identifier: `FD`, `FFT`, `SPA` or `SPA_NG`
    #[serde(default = "default_method")]
    pub method: String,
    pub dx: f64,
    /// Defaults to `dx`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dy: Option<f64>,
    /// Elastic thickness: a number or nested rows
    pub te: Thickness,
    #[serde(default = "default_youngs_modulus")]
    pub e: f64,
    #[serde(default = "default_poisson_ratio")]
    pub nu: f64,
    #[serde(default = "default_gravity")]
    pub g: f64,
    pub drho: f64,
    /// Load rows, one per y position
    pub q0: Vec<Vec<f64>>,
    /// Point x coordinates for `SPA_NG`, row-major order of `q0`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<Vec<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<Vec<f64>>,
}

impl FlexureConfig {
    pub fn from_json_str(json: &str) -> FlexureResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> FlexureResult<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        log::debug!("config: read {}", path.as_ref().display());
        Self::from_json_str(&text)
    }

    pub fn to_json_string(&self) -> FlexureResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parsed method identifier
    pub fn method(&self) -> FlexureResult<Method> {
        Method::from_str(&self.method)
    }

    pub fn elastic_parameters(&self) -> ElasticParameters {
        ElasticParameters::new(self.te.clone(), self.drho)
            .with_youngs_modulus(self.e)
            .with_poisson_ratio(self.nu)
            .with_gravity(self.g)
    }

    /// Validate and build a model ready to run
    pub fn into_model(self) -> FlexureResult<FlexureModel> {
        let method = self.method()?;
        let params = self.elastic_parameters();
        let q0 = field_from_rows(&self.q0)?;
        let dy = self.dy.unwrap_or(self.dx);

        let model = FlexureModel::new(self.dx, dy, params, q0, method)?;
        match (self.x, self.y) {
            (Some(x), Some(y)) => model.with_points(x, y),
            (None, None) => Ok(model),
            _ => Err(FlexureError::InvalidInput(
                "x and y coordinates must be given together".to_string(),
            )),
        }
    }

    /// Configuration reproducing a model's inputs
    pub fn from_model(model: &FlexureModel) -> Self {
        let (x, y) = match &model.points {
            Some(p) => (Some(p.x.clone()), Some(p.y.clone())),
            None => (None, None),
        };
        Self {
            method: model.method.as_str().to_string(),
            dx: model.grid.dx,
            dy: Some(model.grid.dy),
            te: model.params.te.clone(),
            e: model.params.e,
            nu: model.params.nu,
            g: model.params.g,
            drho: model.params.drho,
            q0: field_to_rows(&model.q0),
            x,
            y,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"{
        "dx": 5000.0,
        "te": 20000.0,
        "drho": 3300.0,
        "q0": [[0.0, 0.0], [1e6, 0.0]]
    }"#;

    #[test]
    fn test_defaults() {
        let config = FlexureConfig::from_json_str(MINIMAL).unwrap();
        assert_eq!(config.method, "FD");
        assert_eq!(config.dy, None);
        assert_eq!(config.e, 1e11);
        assert_eq!(config.nu, 0.25);
        assert_eq!(config.g, 9.8);
        assert_eq!(config.te, Thickness::Uniform(20000.0));

        let model = config.into_model().unwrap();
        assert_eq!(model.grid.dy, 5000.0);
        assert_eq!(model.grid.shape(), (2, 2));
        assert_eq!(model.q0[(1, 0)], 1e6);
        assert_eq!(model.method, Method::Fd);
    }

    #[test]
    fn test_thickness_field() {
        let json = r#"{
            "method": "FD",
            "dx": 1000.0,
            "te": [[1.0, 2.0], [3.0, 4.0]],
            "drho": 3300.0,
            "q0": [[0.0, 0.0], [0.0, 0.0]]
        }"#;
        let config = FlexureConfig::from_json_str(json).unwrap();
        match &config.te {
            Thickness::Field(te) => assert_eq!(te[(1, 0)], 3.0),
            other => panic!("expected a thickness field, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_method() {
        let mut config = FlexureConfig::from_json_str(MINIMAL).unwrap();
        config.method = "XYZ".to_string();
        assert!(matches!(config.into_model(), Err(FlexureError::UnknownMethod(ref m)) if m == "XYZ"));
    }

    #[test]
    fn test_ragged_load_rejected() {
        let mut config = FlexureConfig::from_json_str(MINIMAL).unwrap();
        config.q0 = vec![vec![0.0, 1.0], vec![0.0]];
        assert!(matches!(config.into_model(), Err(FlexureError::InvalidInput(_))));
    }

    #[test]
    fn test_coordinates_must_pair() {
        let mut config = FlexureConfig::from_json_str(MINIMAL).unwrap();
        config.method = "SPA_NG".to_string();
        config.x = Some(vec![0.0; 4]);
        assert!(config.clone().into_model().is_err());

        config.y = Some(vec![0.0; 4]);
        let model = config.into_model().unwrap();
        assert!(model.points.is_some());
    }

    #[test]
    fn test_malformed_json() {
        let err = FlexureConfig::from_json_str("{\"dx\": 1.0").unwrap_err();
        assert!(matches!(err, FlexureError::SerializationError(_)));
    }

    #[test]
    fn test_missing_file() {
        let err = FlexureConfig::from_file("/nonexistent/flexure.json").unwrap_err();
        assert!(matches!(err, FlexureError::IoError(_)));
    }
}
