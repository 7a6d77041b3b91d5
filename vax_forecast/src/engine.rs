//! Stateless fit-and-forecast over yearly count series

use crate::config::{ForecastConfig, GapPolicy};
use crate::error::{ForecastError, Result};
use crate::models::{Arima, FittedForecastModel, ForecastModel, ForecastResult};
use crate::series::YearlyCountSeries;
use crate::utils::future_years;

/// Forecast engine
///
/// Holds only its configuration; every call to [`ForecastEngine::forecast`]
/// is an independent fit, so one engine can serve any number of series.
#[derive(Debug, Clone, Default)]
pub struct ForecastEngine {
    config: ForecastConfig,
}

impl ForecastEngine {
    /// Most missing years a series may have before it is refused
    pub const MAX_MISSING_YEARS: u64 = 1_000;

    pub fn new(config: ForecastConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ForecastConfig {
        &self.config
    }

    /// Fit the configured model and forecast the following years
    ///
    /// Either a complete result covering the horizon is returned or an
    /// error; the input series is never modified.
    pub fn forecast(&self, series: &YearlyCountSeries) -> Result<ForecastResult> {
        let order = self.config.order();
        let required = order.min_observations();

        let last_year = series.last_year().ok_or(ForecastError::InsufficientData {
            required,
            actual: 0,
        })?;

        let missing = series.missing_year_count();
        if missing > Self::MAX_MISSING_YEARS {
            return Err(ForecastError::Data(format!(
                "Series is missing {} years between {} and {}, more than the {} allowed",
                missing,
                series.first_year().unwrap_or(last_year),
                last_year,
                Self::MAX_MISSING_YEARS
            )));
        }

        let horizon = self.config.horizon();
        let forecast_years = future_years(last_year, horizon)?;

        let gap_years = series.missing_years();
        let prepared = match self.config.gap_policy() {
            _ if gap_years.is_empty() => series.clone(),
            GapPolicy::ZeroFill => {
                log::info!("Filling {} missing years with zero counts", gap_years.len());
                series.fill_gaps()
            }
            GapPolicy::Reject => return Err(ForecastError::GappedSeries(gap_years)),
            GapPolicy::Positional => {
                log::warn!(
                    "Fitting on positional index; years {:?} are missing and treated as adjacent",
                    gap_years
                );
                series.clone()
            }
        };

        if prepared.len() < required {
            return Err(ForecastError::InsufficientData {
                required,
                actual: prepared.len(),
            });
        }

        let model = Arima::from_config(&self.config);
        let fitted = model.fit(&prepared.values())?;

        let values = fitted.forecast(horizon)?;
        let intervals = self
            .config
            .confidence_level()
            .map(|level| fitted.forecast_intervals(horizon, level))
            .transpose()?;

        log::debug!(
            "{} forecast for {:?}: {:?}",
            fitted.name(),
            forecast_years,
            values
        );

        ForecastResult::new(
            last_year,
            values,
            intervals,
            fitted.summary(),
            gap_years,
            self.config.gap_policy(),
        )
    }
}
