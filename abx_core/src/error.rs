//! Error types for the abx_core library.

use std::io;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for abx_core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Formulary dataset is structurally unusable (e.g. no drug code column)
    #[error("Formulary error: {0}")]
    Formulary(String),

    /// Body weight was missing, non-positive or not a finite number
    #[error("Invalid body weight: {0} kg (must be a positive number)")]
    InvalidWeight(f64),

    /// Drug code has no dosing protocol
    #[error("Unknown drug: {0}")]
    UnknownDrug(String),

    /// External image recognition failed or returned an unusable payload
    #[error("Recognition error: {0}")]
    Recognition(String),
}
