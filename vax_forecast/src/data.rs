//! Vaccination record ingestion and the in-memory record store

use crate::error::{ForecastError, Result};
use crate::series::RecordFilter;
use chrono::{Datelike, NaiveDate, NaiveDateTime};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs::File;
use std::ops::RangeInclusive;
use std::path::Path;

/// Calendar years accepted at ingestion; rows outside are skipped
pub const YEAR_RANGE: RangeInclusive<i32> = 1..=9999;

/// One vaccination record, immutable once ingested
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VaccinationRecord {
    state: String,
    city: String,
    age_group: String,
    gender: String,
    ethnicity: String,
    vaccinated: bool,
    year: i32,
    description: String,
    lat: Option<f64>,
    lon: Option<f64>,
}

impl VaccinationRecord {
    /// Create a record with empty demographics and no coordinates
    pub fn new(
        state: impl Into<String>,
        city: impl Into<String>,
        year: i32,
        vaccinated: bool,
        description: impl Into<String>,
    ) -> Self {
        Self {
            state: state.into(),
            city: city.into(),
            age_group: String::new(),
            gender: String::new(),
            ethnicity: String::new(),
            vaccinated,
            year,
            description: description.into(),
            lat: None,
            lon: None,
        }
    }

    /// Attach demographic attributes
    pub fn with_demographics(
        mut self,
        age_group: impl Into<String>,
        gender: impl Into<String>,
        ethnicity: impl Into<String>,
    ) -> Self {
        self.age_group = age_group.into();
        self.gender = gender.into();
        self.ethnicity = ethnicity.into();
        self
    }

    /// Attach geocoordinates
    pub fn with_location(mut self, lat: f64, lon: f64) -> Self {
        self.lat = Some(lat);
        self.lon = Some(lon);
        self
    }

    pub fn state(&self) -> &str {
        &self.state
    }

    pub fn city(&self) -> &str {
        &self.city
    }

    pub fn age_group(&self) -> &str {
        &self.age_group
    }

    pub fn gender(&self) -> &str {
        &self.gender
    }

    pub fn ethnicity(&self) -> &str {
        &self.ethnicity
    }

    pub fn vaccinated(&self) -> bool {
        self.vaccinated
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Latitude and longitude, when both are known
    pub fn location(&self) -> Option<(f64, f64)> {
        self.lat.zip(self.lon)
    }
}

/// Row counts from one ingestion run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestReport {
    /// Rows present in the source
    pub rows_read: usize,
    /// Rows normalized into records
    pub rows_loaded: usize,
    /// Rows dropped for a missing or invalid year or vaccination flag
    pub rows_skipped: usize,
}

/// Read-only collection of normalized vaccination records
///
/// A store is built once per ingestion; re-ingesting builds a new store.
#[derive(Debug, Clone, Default)]
pub struct RecordStore {
    records: Vec<VaccinationRecord>,
    report: IngestReport,
}

impl RecordStore {
    /// Wrap already normalized records
    pub fn from_records(records: Vec<VaccinationRecord>) -> Self {
        let report = IngestReport {
            rows_read: records.len(),
            rows_loaded: records.len(),
            rows_skipped: 0,
        };
        Self { records, report }
    }

    /// Ingest a CSV file, see [`DataLoader::from_csv`]
    pub fn from_csv<P: AsRef<Path>>(path: P) -> Result<Self> {
        DataLoader::from_csv(path)
    }

    /// Normalize a DataFrame, see [`DataLoader::from_dataframe`]
    pub fn from_dataframe(df: DataFrame) -> Result<Self> {
        DataLoader::from_dataframe(df)
    }

    /// All records in ingestion order
    pub fn records(&self) -> &[VaccinationRecord] {
        &self.records
    }

    /// Row counts from the ingestion that built this store
    pub fn report(&self) -> IngestReport {
        self.report
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Distinct non-empty states in first-seen order
    pub fn states(&self) -> Vec<&str> {
        distinct(self.records.iter().map(|r| r.state()))
    }

    /// Distinct non-empty cities of a state in first-seen order
    pub fn cities_in(&self, state: &str) -> Vec<&str> {
        distinct(
            self.records
                .iter()
                .filter(|r| r.state() == state)
                .map(|r| r.city()),
        )
    }

    /// Distinct non-empty vaccine descriptions in first-seen order
    pub fn descriptions(&self) -> Vec<&str> {
        distinct(self.records.iter().map(|r| r.description()))
    }

    /// Records matching a filter, regardless of vaccination status
    pub fn query<'a>(
        &'a self,
        filter: &'a RecordFilter,
    ) -> impl Iterator<Item = &'a VaccinationRecord> + 'a {
        self.records.iter().filter(move |r| filter.matches(r))
    }
}

fn distinct<'a>(values: impl Iterator<Item = &'a str>) -> Vec<&'a str> {
    let mut seen = HashSet::new();
    values
        .filter(|v| !v.is_empty() && seen.insert(*v))
        .collect()
}

/// Data loader for vaccination datasets
#[derive(Debug)]
pub struct DataLoader;

/// Resolved source column names
#[derive(Debug, Default)]
struct ColumnMap {
    state: Option<String>,
    city: Option<String>,
    age_group: Option<String>,
    gender: Option<String>,
    ethnicity: Option<String>,
    vaccinated: String,
    year: String,
    description: Option<String>,
    lat: Option<String>,
    lon: Option<String>,
}

impl DataLoader {
    /// Load vaccination records from a CSV file
    pub fn from_csv<P: AsRef<Path>>(path: P) -> Result<RecordStore> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let df = CsvReader::new(file)
            .infer_schema(Some(1000))
            .has_header(true)
            .finish()?;

        log::info!("Read {} rows from {}", df.height(), path.display());
        Self::from_dataframe(df)
    }

    /// Normalize an existing DataFrame into a record store
    ///
    /// Only the year and vaccination columns are required; the other
    /// attributes default to empty strings when the source lacks them.
    pub fn from_dataframe(df: DataFrame) -> Result<RecordStore> {
        let columns = Self::detect_columns(&df)?;
        let height = df.height();

        let states = string_column(&df, columns.state.as_deref())?;
        let cities = string_column(&df, columns.city.as_deref())?;
        let age_groups = string_column(&df, columns.age_group.as_deref())?;
        let genders = string_column(&df, columns.gender.as_deref())?;
        let ethnicities = string_column(&df, columns.ethnicity.as_deref())?;
        let descriptions = string_column(&df, columns.description.as_deref())?;
        let flags = string_column(&df, Some(&columns.vaccinated))?;
        let years = string_column(&df, Some(&columns.year))?;
        let lats = float_column(&df, columns.lat.as_deref())?;
        let lons = float_column(&df, columns.lon.as_deref())?;

        let mut records = Vec::with_capacity(height);
        let mut skipped = 0;

        for i in 0..height {
            let year = years[i].as_deref().and_then(parse_year);
            let vaccinated = flags[i].as_deref().and_then(parse_flag);

            let (year, vaccinated) = match (year, vaccinated) {
                (Some(year), Some(vaccinated)) => (year, vaccinated),
                _ => {
                    skipped += 1;
                    continue;
                }
            };

            let take = |column: &[Option<String>]| column[i].clone().unwrap_or_default();

            records.push(VaccinationRecord {
                state: take(&states),
                city: take(&cities),
                age_group: take(&age_groups),
                gender: take(&genders),
                ethnicity: take(&ethnicities),
                vaccinated,
                year,
                description: take(&descriptions),
                lat: lats[i],
                lon: lons[i],
            });
        }

        if skipped > 0 {
            log::warn!(
                "Skipped {} of {} rows with a missing or invalid year or vaccination flag",
                skipped,
                height
            );
        }

        let report = IngestReport {
            rows_read: height,
            rows_loaded: records.len(),
            rows_skipped: skipped,
        };

        Ok(RecordStore { records, report })
    }

    /// Match source columns to record attributes, ignoring case
    fn detect_columns(df: &DataFrame) -> Result<ColumnMap> {
        let names: Vec<String> = df
            .get_column_names()
            .iter()
            .map(|name| name.to_string())
            .collect();

        let find = |aliases: &[&str]| -> Option<String> {
            names
                .iter()
                .find(|name| {
                    let normalized = name.trim().to_uppercase().replace([' ', '-'], "_");
                    aliases.contains(&normalized.as_str())
                })
                .cloned()
        };

        let year = find(&["YEAR"]).ok_or_else(|| {
            ForecastError::Data("No year column found in data".to_string())
        })?;
        let vaccinated = find(&["VACCINATED"]).ok_or_else(|| {
            ForecastError::Data("No vaccinated column found in data".to_string())
        })?;

        Ok(ColumnMap {
            state: find(&["STATE"]),
            city: find(&["CITY"]),
            age_group: find(&["AGE_GROUP", "AGEGROUP"]),
            gender: find(&["GENDER"]),
            ethnicity: find(&["ETHNICITY"]),
            vaccinated,
            year,
            description: find(&["DESCRIPTION"]),
            lat: find(&["LAT", "LATITUDE"]),
            lon: find(&["LON", "LNG", "LONGITUDE"]),
        })
    }
}

/// Read a column as trimmed strings, `None` for nulls or a missing column
fn string_column(df: &DataFrame, name: Option<&str>) -> Result<Vec<Option<String>>> {
    let Some(name) = name else {
        return Ok(vec![None; df.height()]);
    };

    let series = df.column(name)?.cast(&DataType::Utf8)?;
    let values = series
        .utf8()?
        .into_iter()
        .map(|value| value.map(|v| v.trim().to_string()))
        .collect();

    Ok(values)
}

/// Read a column as floats, `None` for nulls, unparseable values or a
/// missing column
fn float_column(df: &DataFrame, name: Option<&str>) -> Result<Vec<Option<f64>>> {
    let values = string_column(df, name)?
        .into_iter()
        .map(|value| value.and_then(|v| v.parse::<f64>().ok()).filter(|v| v.is_finite()))
        .collect();

    Ok(values)
}

/// Parse a calendar year from an integer, a float or a date
///
/// Years outside [`YEAR_RANGE`] are rejected rather than clamped.
fn parse_year(value: &str) -> Option<i32> {
    let value = value.trim();

    let year = if let Ok(year) = value.parse::<i64>() {
        year
    } else if let Ok(year) = value.parse::<f64>() {
        if !year.is_finite() || year.fract() != 0.0 {
            return None;
        }
        if year < f64::from(*YEAR_RANGE.start()) || year > f64::from(*YEAR_RANGE.end()) {
            return None;
        }
        year as i64
    } else if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        i64::from(date.year())
    } else if let Ok(datetime) = NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S") {
        i64::from(datetime.year())
    } else {
        return None;
    };

    i32::try_from(year)
        .ok()
        .filter(|year| YEAR_RANGE.contains(year))
}

/// Parse a vaccination flag from a boolean, a 0/1 number or a word
fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "t" | "yes" | "y" => Some(true),
        "false" | "f" | "no" | "n" => Some(false),
        other => match other.parse::<f64>() {
            Ok(v) if v == 1.0 => Some(true),
            Ok(v) if v == 0.0 => Some(false),
            _ => None,
        },
    }
}
