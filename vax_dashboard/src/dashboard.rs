//! Report assembly for one session

use crate::session::Session;
use crate::Result;
use serde::Serialize;
use std::path::Path;
use vax_forecast::error::ForecastError;
use vax_forecast::summary::{
    demographic_breakdown, race_breakdown, BreakdownRow, CoverageComparison, DemographicKey,
    StatusTotals,
};
use vax_forecast::utils::{combined_table, export_combined_csv, CombinedRow, RowKind};
use vax_forecast::{
    ForecastConfig, ForecastEngine, ForecastResult, RecordFilter, RecordStore, SeriesBuilder,
    YearlyCountSeries,
};

/// Forecast part of a report
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ForecastOutcome {
    Ready(ForecastResult),
    /// No forecast could be made; `reason` is shown instead
    Skipped { reason: String },
    /// The report was built without a forecast
    NotRequested,
}

impl ForecastOutcome {
    pub fn is_ready(&self) -> bool {
        matches!(self, ForecastOutcome::Ready(_))
    }

    pub fn result(&self) -> Option<&ForecastResult> {
        match self {
            ForecastOutcome::Ready(result) => Some(result),
            ForecastOutcome::Skipped { .. } | ForecastOutcome::NotRequested => None,
        }
    }
}

/// Everything the dashboard shows for one selection
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardReport {
    pub user: Option<String>,
    pub filter: RecordFilter,
    pub totals: StatusTotals,
    pub history: YearlyCountSeries,
    pub races: Vec<BreakdownRow<String>>,
    pub demographics: Vec<BreakdownRow<DemographicKey>>,
    pub forecast: ForecastOutcome,
}

impl DashboardReport {
    /// History rows followed by forecast rows, when a forecast was made
    pub fn combined_rows(&self) -> Vec<CombinedRow> {
        match &self.forecast {
            ForecastOutcome::Ready(result) => combined_table(&self.history, result),
            ForecastOutcome::Skipped { .. } | ForecastOutcome::NotRequested => self
                .history
                .points()
                .iter()
                .map(|p| CombinedRow {
                    year: p.year,
                    value: p.count as f64,
                    kind: RowKind::Historical,
                })
                .collect(),
        }
    }

    /// Write the combined table as CSV
    pub fn export_csv<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        export_combined_csv(path.as_ref(), &self.combined_rows())?;
        log::info!("Exported forecast table to {}", path.as_ref().display());
        Ok(())
    }

    /// Compare the selection's vaccinated total with externally reported
    /// fully and partially vaccinated counts
    pub fn coverage(
        &self,
        fully: u64,
        partially: u64,
        estimated_population: u64,
    ) -> Option<CoverageComparison> {
        CoverageComparison::new(self.totals.vaccinated, fully, partially, estimated_population)
    }

    /// Serialize the report as JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Builds reports from the record store
#[derive(Debug, Clone, Copy, Default)]
pub struct Dashboard;

impl Dashboard {
    /// Summarize the session's selection and forecast its yearly counts
    ///
    /// Forecast failures end up in [`ForecastOutcome::Skipped`]; the rest of
    /// the report is still produced.
    pub fn run(session: &Session, store: &RecordStore, config: &ForecastConfig) -> DashboardReport {
        let mut report = Self::summarize(session, store);

        report.forecast = match ForecastEngine::new(config.clone()).forecast(&report.history) {
            Ok(result) => ForecastOutcome::Ready(result),
            Err(e) => {
                let reason = skip_reason(&e);
                log::warn!("Forecast skipped: {}", reason);
                ForecastOutcome::Skipped { reason }
            }
        };

        report
    }

    /// Summarize the session's selection without fitting a model
    pub fn summarize(session: &Session, store: &RecordStore) -> DashboardReport {
        let filter = session.filter();
        let selection: Vec<_> = store.query(filter).collect();

        let totals = StatusTotals::from_records(selection.iter().copied());
        let races = race_breakdown(selection.iter().copied());
        let demographics = demographic_breakdown(selection.iter().copied());
        let history = SeriesBuilder::build(selection.iter().copied(), filter);

        DashboardReport {
            user: session.username().map(str::to_string),
            filter: filter.clone(),
            totals,
            history,
            races,
            demographics,
            forecast: ForecastOutcome::NotRequested,
        }
    }
}

fn skip_reason(error: &ForecastError) -> String {
    match error {
        ForecastError::InsufficientData { actual: 0, .. } => {
            "No vaccinated records match the selected filters".to_string()
        }
        ForecastError::InsufficientData { required, actual } => format!(
            "Not enough years to forecast: {} available, {} needed",
            actual, required
        ),
        ForecastError::ModelFit(message) => format!("The model could not be fitted: {}", message),
        other => other.to_string(),
    }
}
