//! CLI error types.

use thiserror::Error;

/// CLI error type.
#[derive(Debug, Error)]
pub enum CliError {
    /// The basket file could not be read.
    #[error("Cannot read {path}: {source}")]
    Io {
        /// File path.
        path: String,
        /// Underlying error.
        source: std::io::Error,
    },

    /// The basket file is not valid TOML or has the wrong shape.
    #[error("Invalid basket file {path}: {source}")]
    InvalidBasketFile {
        /// File path.
        path: String,
        /// Parser error.
        source: toml::de::Error,
    },

    /// Calculation error.
    #[error("Calculation error: {0}")]
    Calculation(#[from] siegel_curves::CurveError),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<csv::Error> for CliError {
    fn from(err: csv::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// CLI result type.
pub type CliResult<T> = Result<T, CliError>;
