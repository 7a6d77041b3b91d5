//! Utility functions for presenting history and forecast together

use crate::error::{ForecastError, Result};
use crate::models::ForecastResult;
use crate::series::YearlyCountSeries;
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::Path;

/// Years following `last_year`
///
/// Fails when a year would not fit in an `i32`.
pub fn future_years(last_year: i32, horizon: usize) -> Result<Vec<i32>> {
    (1..=horizon)
        .map(|offset| {
            i32::try_from(offset)
                .ok()
                .and_then(|offset| last_year.checked_add(offset))
                .ok_or_else(|| {
                    ForecastError::Data(format!(
                        "Forecast year {} after {} is out of range",
                        offset, last_year
                    ))
                })
        })
        .collect()
}

/// Origin of a row in the combined table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RowKind {
    Historical,
    Forecast,
}

impl std::fmt::Display for RowKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RowKind::Historical => write!(f, "historical"),
            RowKind::Forecast => write!(f, "forecast"),
        }
    }
}

/// One row of the historical-plus-forecast table
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CombinedRow {
    pub year: i32,
    #[serde(rename = "count")]
    pub value: f64,
    pub kind: RowKind,
}

/// Historical counts followed by forecast values, ascending by year
pub fn combined_table(history: &YearlyCountSeries, forecast: &ForecastResult) -> Vec<CombinedRow> {
    let historical = history.points().iter().map(|p| CombinedRow {
        year: p.year,
        value: p.count as f64,
        kind: RowKind::Historical,
    });
    let forecast = forecast.points().iter().map(|p| CombinedRow {
        year: p.year,
        value: p.predicted,
        kind: RowKind::Forecast,
    });

    historical.chain(forecast).collect()
}

/// Write the combined table as CSV with a `year,count,kind` header
pub fn write_combined_csv<W: Write>(writer: W, rows: &[CombinedRow]) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for row in rows {
        csv_writer.serialize(row)?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Write the combined table to a CSV file
pub fn export_combined_csv<P: AsRef<Path>>(path: P, rows: &[CombinedRow]) -> Result<()> {
    let file = std::fs::File::create(path)?;
    write_combined_csv(file, rows)
}
