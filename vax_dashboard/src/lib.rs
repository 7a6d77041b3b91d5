//! # Vax Dashboard
//!
//! `vax_dashboard` puts the forecasting core behind a signed-in session.
//! It keeps user credentials, carries the selected filters, and assembles
//! a report of totals, breakdowns and a five-year forecast.
//!
//! ## Usage Example
//!
//! ```no_run
//! use vax_dashboard::{Dashboard, Session, UserStore};
//! use vax_forecast::{DataLoader, ForecastConfig, RecordFilter};
//!
//! let users = UserStore::open("users.json").unwrap();
//! let session = Session::login(&users, "alice", "secret")
//!     .unwrap()
//!     .with_filter(RecordFilter::all().state("Texas"));
//!
//! let store = DataLoader::from_csv("vaccinations.csv").unwrap();
//! let report = Dashboard::run(&session, &store, &ForecastConfig::default());
//! println!("{} vaccinated", report.totals.vaccinated);
//! ```

use thiserror::Error;
use vax_forecast::ForecastError;

pub mod auth;
pub mod dashboard;
pub mod session;

pub use auth::{AuthError, UserStore};
pub use dashboard::{Dashboard, DashboardReport, ForecastOutcome};
pub use session::Session;

/// Errors that can occur in dashboard operations
#[derive(Error, Debug)]
pub enum DashboardError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Forecast(#[from] ForecastError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for dashboard operations
pub type Result<T> = std::result::Result<T, DashboardError>;
