//! # Vax Forecast
//!
//! Vaccination record ingestion, yearly count series and ARIMA forecasting.
//!
//! ## Features
//!
//! - CSV ingestion into a read-only record store (case-insensitive columns)
//! - Filtering by state, city and vaccine description
//! - Yearly counts of vaccinated records
//! - ARIMA(p,d,q) fitted by exact maximum likelihood, with a fixed horizon
//! - Holdout accuracy metrics and demographic summaries
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use vax_forecast::config::{ArimaOrder, ForecastConfig};
//! use vax_forecast::data::DataLoader;
//! use vax_forecast::engine::ForecastEngine;
//! use vax_forecast::series::{RecordFilter, SeriesBuilder};
//!
//! # fn main() -> vax_forecast::error::Result<()> {
//! // Load data
//! let store = DataLoader::from_csv("vaccinations.csv")?;
//!
//! // Count vaccinated records per year for one state
//! let filter = RecordFilter::all().state("Texas");
//! let series = SeriesBuilder::build(store.records(), &filter);
//!
//! // Forecast the next five years
//! let config = ForecastConfig::new(ArimaOrder::FULL_DATASET, 5)?;
//! let result = ForecastEngine::new(config).forecast(&series)?;
//!
//! for point in result.points() {
//!     println!("{}: {:.1}", point.year, point.predicted);
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod data;
pub mod engine;
pub mod error;
pub mod metrics;
pub mod models;
pub mod series;
pub mod summary;
pub mod utils;

// Re-export commonly used types
pub use crate::config::{ArimaOrder, ForecastConfig, GapPolicy};
pub use crate::data::{DataLoader, IngestReport, RecordStore, VaccinationRecord};
pub use crate::engine::ForecastEngine;
pub use crate::error::ForecastError;
pub use crate::models::{ForecastModel, ForecastPoint, ForecastResult};
pub use crate::series::{RecordFilter, SeriesBuilder, YearlyCountSeries};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
