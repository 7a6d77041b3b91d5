//! Error types for the vax_forecast crate

use polars::prelude::PolarsError;
use thiserror::Error;
use vax_math::MathError;

/// Custom error types for the vax_forecast crate
#[derive(Debug, Error)]
pub enum ForecastError {
    /// The series is empty or too short for the requested model order
    #[error("Insufficient data: need at least {required} observations, got {actual}")]
    InsufficientData { required: usize, actual: usize },

    /// Parameter estimation failed or did not converge
    #[error("Model fit error: {0}")]
    ModelFit(String),

    /// Invalid model order, horizon or other setting
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The series skips years and the gap policy rejects that
    #[error("Series has missing years: {0:?}")]
    GappedSeries(Vec<i32>),

    /// Error related to data validation or processing
    #[error("Data error: {0}")]
    Data(String),

    /// Error from IO operations
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Error from Polars operations
    #[error("Polars error: {0}")]
    Polars(String),

    /// Error writing or reading CSV
    #[error("CSV error: {0}")]
    Csv(String),

    /// Error parsing a configuration file
    #[error("TOML error: {0}")]
    Toml(String),
}

impl ForecastError {
    /// Whether a caller should skip the forecast and show a warning
    /// instead of treating the error as a failure of the whole request
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            ForecastError::InsufficientData { .. }
                | ForecastError::ModelFit(_)
                | ForecastError::GappedSeries(_)
        )
    }
}

/// Result type with our custom error
pub type Result<T> = std::result::Result<T, ForecastError>;

impl From<PolarsError> for ForecastError {
    fn from(err: PolarsError) -> Self {
        ForecastError::Polars(err.to_string())
    }
}

impl From<csv::Error> for ForecastError {
    fn from(err: csv::Error) -> Self {
        ForecastError::Csv(err.to_string())
    }
}

impl From<toml::de::Error> for ForecastError {
    fn from(err: toml::de::Error) -> Self {
        ForecastError::Toml(err.to_string())
    }
}

impl From<MathError> for ForecastError {
    fn from(err: MathError) -> Self {
        ForecastError::ModelFit(err.to_string())
    }
}
