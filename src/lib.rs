//! # Vaxcast
//!
//! Umbrella crate for the vaccination forecasting workspace.
//!
//! ## Example
//!
//! ```
//! use vaxcast_workspace::{forecast_counts, ArimaOrder, ForecastConfig, VaccinationRecord};
//!
//! let records: Vec<VaccinationRecord> = [(2020, 3), (2021, 5), (2022, 4)]
//!     .into_iter()
//!     .flat_map(|(year, n)| {
//!         (0..n).map(move |_| VaccinationRecord::new("Texas", "Austin", year, true, "Influenza"))
//!     })
//!     .collect();
//!
//! let config = ForecastConfig::new(ArimaOrder::new(0, 1, 0).unwrap(), 2).unwrap();
//! let result = forecast_counts(&records, &Default::default(), &config).unwrap();
//! assert_eq!(result.years(), vec![2023, 2024]);
//! ```

pub use vax_dashboard as dashboard;
pub use vax_forecast as forecast;
pub use vax_math as math;

pub use vax_dashboard::{Dashboard, DashboardReport, ForecastOutcome, Session, UserStore};
pub use vax_forecast::{
    ArimaOrder, DataLoader, ForecastConfig, ForecastEngine, ForecastError, ForecastResult,
    RecordFilter, RecordStore, SeriesBuilder, VaccinationRecord, YearlyCountSeries,
};

/// Count the vaccinated records selected by `filter` per year and forecast
/// the following years.
pub fn forecast_counts(
    records: &[VaccinationRecord],
    filter: &RecordFilter,
    config: &ForecastConfig,
) -> vax_forecast::error::Result<ForecastResult> {
    let series = SeriesBuilder::build(records, filter);
    ForecastEngine::new(config.clone()).forecast(&series)
}
