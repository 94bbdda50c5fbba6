//! Error types for fetsim-devices.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid device parameter: {0}")]
    InvalidParameter(String),

    #[error("device parameter {name} has invalid value: {value}")]
    InvalidValue { name: String, value: f64 },

    #[error("unknown device parameter: {0}")]
    UnknownParameter(String),

    #[error("operating point {0} has not been evaluated")]
    MissingOperatingPoint(String),

    #[error(transparent)]
    Core(#[from] fetsim_core::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
