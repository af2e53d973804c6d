//! Error types for the flexure solver

use thiserror::Error;

/// Main error type for flexure operations
#[derive(Error, Debug)]
pub enum FlexureError {
    #[error("Unknown solution method '{0}': expected \"FD\", \"FFT\", \"SPA\" or \"SPA_NG\"")]
    UnknownMethod(String),

    #[error("Solution method '{0}' is not implemented")]
    NotImplemented(String),

    #[error("Singular coefficient matrix - check rigidity, density contrast and gravity")]
    SingularMatrix,

    #[error("Solution contains non-finite values: {0}")]
    NonFiniteSolution(String),

    #[error("Shape mismatch: {0}")]
    ShapeMismatch(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Model not solved - run run() first")]
    NotSolved,

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

/// Result type for flexure operations
pub type FlexureResult<T> = Result<T, FlexureError>;
