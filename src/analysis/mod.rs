//! Solution methods

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::FlexureError;

/// Strategy used to compute the deflection field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    /// Finite differences: sparse 13-point operator and direct solve
    Fd,
    /// Fourier-transform solution (recognized, not implemented)
    Fft,
    /// Superposition of analytical solutions on a regular grid
    Spa,
    /// Superposition of analytical solutions on scattered points
    SpaNg,
}

impl Method {
    /// Identifier used in parameter files and on the wire
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Fd => "FD",
            Method::Fft => "FFT",
            Method::Spa => "SPA",
            Method::SpaNg => "SPA_NG",
        }
    }

    /// Whether the method works on a regular grid (and therefore needs dy == dx)
    pub fn is_gridded(&self) -> bool {
        !matches!(self, Method::SpaNg)
    }
}

impl Default for Method {
    fn default() -> Self {
        Self::Fd
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Method {
    type Err = FlexureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "FD" => Ok(Method::Fd),
            "FFT" => Ok(Method::Fft),
            "SPA" => Ok(Method::Spa),
            "SPA_NG" => Ok(Method::SpaNg),
            other => Err(FlexureError::UnknownMethod(other.to_string())),
        }
    }
}

impl Serialize for Method {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Method {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_methods() {
        assert_eq!("FD".parse::<Method>().unwrap(), Method::Fd);
        assert_eq!("FFT".parse::<Method>().unwrap(), Method::Fft);
        assert_eq!("SPA".parse::<Method>().unwrap(), Method::Spa);
        assert_eq!("SPA_NG".parse::<Method>().unwrap(), Method::SpaNg);
    }

    #[test]
    fn test_parse_unknown_method() {
        let err = "XYZ".parse::<Method>().unwrap_err();
        assert!(matches!(err, FlexureError::UnknownMethod(ref m) if m == "XYZ"));
    }

    #[test]
    fn test_identifier_round_trip() {
        for m in [Method::Fd, Method::Fft, Method::Spa, Method::SpaNg] {
            assert_eq!(m.to_string().parse::<Method>().unwrap(), m);
        }
        assert!(!Method::SpaNg.is_gridded());
        assert!(Method::Spa.is_gridded());
    }

    #[test]
    fn test_serde_uses_identifier() {
        let json = serde_json::to_string(&Method::SpaNg).unwrap();
        assert_eq!(json, "\"SPA_NG\"");
        let m: Method = serde_json::from_str("\"FD\"").unwrap();
        assert_eq!(m, Method::Fd);
        assert!(serde_json::from_str::<Method>("\"fd\"").is_err());
    }
}
