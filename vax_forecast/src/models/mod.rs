//! Forecasting models for yearly count series

use crate::config::GapPolicy;
use crate::error::{ForecastError, Result};
use crate::utils::future_years;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

pub mod arima;
mod state_space;

pub use arima::{Arima, FitSummary, FittedArima};

/// One forecast year
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    /// Calendar year being forecast
    pub year: i32,
    /// Point forecast, kept as a real-valued demand estimate
    pub predicted: f64,
    /// Lower confidence bound, when intervals were requested
    pub lower: Option<f64>,
    /// Upper confidence bound, when intervals were requested
    pub upper: Option<f64>,
}

/// Forecast for the years following a yearly count series
///
/// A result always covers the full horizon; partial forecasts are never
/// constructed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastResult {
    /// Forecast years in ascending order
    points: Vec<ForecastPoint>,
    /// Number of years forecast
    horizon: usize,
    /// Fitted model the forecast came from
    model: FitSummary,
    /// Years missing from the input series
    gap_years: Vec<i32>,
    /// How those missing years were treated
    gap_policy: GapPolicy,
}

impl ForecastResult {
    /// Assemble a result for the years after `last_year`
    pub fn new(
        last_year: i32,
        values: Vec<f64>,
        intervals: Option<Vec<(f64, f64)>>,
        model: FitSummary,
        gap_years: Vec<i32>,
        gap_policy: GapPolicy,
    ) -> Result<Self> {
        let horizon = values.len();
        if horizon == 0 {
            return Err(ForecastError::Configuration(
                "A forecast needs at least one value".to_string(),
            ));
        }

        if let Some(intervals) = &intervals {
            if intervals.len() != horizon {
                return Err(ForecastError::Data(format!(
                    "Values length ({}) doesn't match intervals length ({})",
                    horizon,
                    intervals.len()
                )));
            }
        }

        if values.iter().any(|v| !v.is_finite()) {
            return Err(ForecastError::ModelFit(
                "Forecast produced non-finite values".to_string(),
            ));
        }

        let years = future_years(last_year, horizon)?;
        let points = values
            .into_iter()
            .zip(years)
            .enumerate()
            .map(|(i, (predicted, year))| {
                let bounds = intervals.as_ref().map(|iv| iv[i]);
                ForecastPoint {
                    year,
                    predicted,
                    lower: bounds.map(|b| b.0),
                    upper: bounds.map(|b| b.1),
                }
            })
            .collect();

        Ok(Self {
            points,
            horizon,
            model,
            gap_years,
            gap_policy,
        })
    }

    /// Forecast points in year order
    pub fn points(&self) -> &[ForecastPoint] {
        &self.points
    }

    /// Get the number of years forecast
    pub fn horizon(&self) -> usize {
        self.horizon
    }

    /// Forecast years
    pub fn years(&self) -> Vec<i32> {
        self.points.iter().map(|p| p.year).collect()
    }

    /// Point forecasts
    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.predicted).collect()
    }

    /// Get the confidence intervals, if requested
    pub fn intervals(&self) -> Option<Vec<(f64, f64)>> {
        self.points
            .iter()
            .map(|p| p.lower.zip(p.upper))
            .collect()
    }

    /// Summary of the fitted model
    pub fn model(&self) -> &FitSummary {
        &self.model
    }

    /// Years absent from the input series
    pub fn gap_years(&self) -> &[i32] {
        &self.gap_years
    }

    /// Gap policy the forecast was produced under
    pub fn gap_policy(&self) -> GapPolicy {
        self.gap_policy
    }

    /// Whether the fit used positions rather than real years for a gapped
    /// series
    pub fn fitted_on_positional_index(&self) -> bool {
        self.gap_policy == GapPolicy::Positional && !self.gap_years.is_empty()
    }

    /// Serialize the result as JSON
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| ForecastError::Data(format!("Failed to serialize forecast: {}", e)))
    }
}

/// Model fitted to a series of observations
pub trait FittedForecastModel: Debug {
    /// Point forecasts for the next `horizon` periods
    fn forecast(&self, horizon: usize) -> Result<Vec<f64>>;

    /// Confidence bounds for the next `horizon` periods
    fn forecast_intervals(&self, horizon: usize, confidence_level: f64)
        -> Result<Vec<(f64, f64)>>;

    /// One-step-ahead predictions for the fitted observations
    fn fitted_values(&self) -> Vec<f64>;

    /// Summary of the estimated parameters
    fn summary(&self) -> FitSummary;

    /// Name of the model
    fn name(&self) -> &str;
}

/// Forecast model that can be fitted to equally spaced observations
pub trait ForecastModel: Debug + Clone {
    /// The type of fitted model produced
    type Fitted: FittedForecastModel;

    /// Fit the model, treating observations as consecutive periods
    fn fit(&self, observations: &[f64]) -> Result<Self::Fitted>;

    /// Get the name of the model
    fn name(&self) -> &str;
}
