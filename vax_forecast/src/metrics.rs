//! Metrics for evaluating forecast performance

use crate::config::ForecastConfig;
use crate::engine::ForecastEngine;
use crate::error::{ForecastError, Result};
use crate::models::ForecastResult;
use crate::series::YearlyCountSeries;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Forecast accuracy metrics
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastAccuracy {
    /// Mean Absolute Error
    pub mae: f64,
    /// Mean Squared Error
    pub mse: f64,
    /// Root Mean Squared Error
    pub rmse: f64,
    /// Mean Absolute Percentage Error, over non-zero actual values
    pub mape: f64,
    /// Symmetric Mean Absolute Percentage Error
    pub smape: f64,
}

impl std::fmt::Display for ForecastAccuracy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Forecast Accuracy Metrics:")?;
        writeln!(f, "  MAE:   {:.4}", self.mae)?;
        writeln!(f, "  MSE:   {:.4}", self.mse)?;
        writeln!(f, "  RMSE:  {:.4}", self.rmse)?;
        writeln!(f, "  MAPE:  {:.4}%", self.mape)?;
        writeln!(f, "  SMAPE: {:.4}%", self.smape)?;
        Ok(())
    }
}

/// Calculate accuracy metrics for a forecast vs actual values
pub fn forecast_accuracy(forecast: &[f64], actual: &[f64]) -> Result<ForecastAccuracy> {
    if forecast.len() != actual.len() || forecast.is_empty() {
        return Err(ForecastError::Data(
            "Forecast and actual values must have the same non-zero length".to_string(),
        ));
    }

    let n = forecast.len() as f64;
    let errors: Vec<f64> = forecast
        .iter()
        .zip(actual.iter())
        .map(|(&f, &a)| a - f)
        .collect();

    let mae = errors.iter().map(|e| e.abs()).sum::<f64>() / n;
    let mse = errors.iter().map(|e| e.powi(2)).sum::<f64>() / n;
    let rmse = mse.sqrt();

    let nonzero: Vec<(f64, f64)> = actual
        .iter()
        .zip(errors.iter())
        .filter(|(&a, _)| a != 0.0)
        .map(|(&a, &e)| (a, e))
        .collect();
    let mape = if nonzero.is_empty() {
        0.0
    } else {
        nonzero
            .iter()
            .map(|(a, e)| e.abs() / a.abs() * 100.0)
            .sum::<f64>()
            / nonzero.len() as f64
    };

    let smape = actual
        .iter()
        .zip(forecast.iter())
        .map(|(&a, &f)| {
            let denominator = a.abs() + f.abs();
            if denominator == 0.0 {
                0.0
            } else {
                200.0 * (a - f).abs() / denominator
            }
        })
        .sum::<f64>()
        / n;

    Ok(ForecastAccuracy {
        mae,
        mse,
        rmse,
        mape,
        smape,
    })
}

/// Outcome of fitting on leading years and scoring trailing years
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HoldoutEvaluation {
    /// Forecast made from the training years
    pub forecast: ForecastResult,
    /// Years that were scored
    pub years: Vec<i32>,
    /// Actual counts for those years
    pub actual: Vec<f64>,
    /// Forecast values for those years
    pub predicted: Vec<f64>,
    pub accuracy: ForecastAccuracy,
}

/// Hold back the last `holdout` years, forecast them, and score the result
///
/// The configuration's order, gap policy and optimizer settings are kept;
/// the horizon becomes the span of the held-back years.
pub fn holdout_evaluation(
    series: &YearlyCountSeries,
    config: &ForecastConfig,
    holdout: usize,
) -> Result<HoldoutEvaluation> {
    if holdout == 0 {
        return Err(ForecastError::Configuration(
            "Holdout must cover at least one year".to_string(),
        ));
    }
    if holdout >= series.len() {
        return Err(ForecastError::InsufficientData {
            required: holdout + config.order().min_observations(),
            actual: series.len(),
        });
    }

    let missing = series.missing_year_count();
    if missing > ForecastEngine::MAX_MISSING_YEARS {
        return Err(ForecastError::Data(format!(
            "Series is missing {} years, more than the {} allowed",
            missing,
            ForecastEngine::MAX_MISSING_YEARS
        )));
    }

    let (train, test) = series.split_tail(holdout);
    let (Some(train_end), Some(test_end)) = (train.last_year(), test.last_year()) else {
        return Err(ForecastError::InsufficientData {
            required: holdout + 1,
            actual: series.len(),
        });
    };

    let mut settings = config.to_settings();
    settings.horizon = i64::from(test_end) - i64::from(train_end);
    let engine = ForecastEngine::new(ForecastConfig::try_from(settings)?);
    let forecast = engine.forecast(&train)?;

    let predicted_by_year: HashMap<i32, f64> = forecast
        .points()
        .iter()
        .map(|p| (p.year, p.predicted))
        .collect();

    let mut years = Vec::with_capacity(test.len());
    let mut actual = Vec::with_capacity(test.len());
    let mut predicted = Vec::with_capacity(test.len());
    for point in test.points() {
        if let Some(&value) = predicted_by_year.get(&point.year) {
            years.push(point.year);
            actual.push(point.count as f64);
            predicted.push(value);
        }
    }

    let accuracy = forecast_accuracy(&predicted, &actual)?;

    Ok(HoldoutEvaluation {
        forecast,
        years,
        actual,
        predicted,
        accuracy,
    })
}
