//! Yearly count series built from filtered vaccination records

use crate::data::VaccinationRecord;
use crate::error::{ForecastError, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Selection applied to records before counting
///
/// State and city match by equality, the description by set membership.
/// A `None` field does not constrain anything; an empty description set
/// selects nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordFilter {
    pub state: Option<String>,
    pub city: Option<String>,
    pub descriptions: Option<BTreeSet<String>>,
}

impl RecordFilter {
    /// Filter that matches every record
    pub fn all() -> Self {
        Self::default()
    }

    /// Restrict to a state
    pub fn state(mut self, state: impl Into<String>) -> Self {
        self.state = Some(state.into());
        self
    }

    /// Restrict to a city
    pub fn city(mut self, city: impl Into<String>) -> Self {
        self.city = Some(city.into());
        self
    }

    /// Restrict to a set of vaccine descriptions
    pub fn descriptions<I, S>(mut self, descriptions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.descriptions = Some(descriptions.into_iter().map(Into::into).collect());
        self
    }

    /// Whether a record is selected, ignoring its vaccination status
    pub fn matches(&self, record: &VaccinationRecord) -> bool {
        self.state.as_deref().map_or(true, |s| record.state() == s)
            && self.city.as_deref().map_or(true, |c| record.city() == c)
            && self
                .descriptions
                .as_ref()
                .map_or(true, |set| set.contains(record.description()))
    }
}

/// One point of a yearly count series
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearCount {
    pub year: i32,
    pub count: u64,
}

/// Vaccinated record counts per year, strictly increasing by year
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearlyCountSeries {
    points: Vec<YearCount>,
}

impl YearlyCountSeries {
    /// Create a series from `(year, count)` pairs
    ///
    /// Years must be strictly increasing; unsorted or duplicate years are
    /// rejected rather than silently merged.
    pub fn from_points<I>(points: I) -> Result<Self>
    where
        I: IntoIterator<Item = (i32, u64)>,
    {
        let points: Vec<YearCount> = points
            .into_iter()
            .map(|(year, count)| YearCount { year, count })
            .collect();

        for pair in points.windows(2) {
            if pair[1].year <= pair[0].year {
                return Err(ForecastError::Data(format!(
                    "Years must be strictly increasing, found {} after {}",
                    pair[1].year, pair[0].year
                )));
            }
        }

        Ok(Self { points })
    }

    /// Empty series
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn points(&self) -> &[YearCount] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn years(&self) -> Vec<i32> {
        self.points.iter().map(|p| p.year).collect()
    }

    pub fn counts(&self) -> Vec<u64> {
        self.points.iter().map(|p| p.count).collect()
    }

    /// Counts as floating-point observations for model fitting
    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.count as f64).collect()
    }

    pub fn first_year(&self) -> Option<i32> {
        self.points.first().map(|p| p.year)
    }

    pub fn last_year(&self) -> Option<i32> {
        self.points.last().map(|p| p.year)
    }

    /// Total count across all years
    pub fn total(&self) -> u64 {
        self.points.iter().map(|p| p.count).sum()
    }

    /// Years between the first and last year that have no point
    pub fn missing_years(&self) -> Vec<i32> {
        self.points
            .windows(2)
            .flat_map(|pair| (pair[0].year + 1)..pair[1].year)
            .collect()
    }

    /// Number of years between the first and last year that have no point
    ///
    /// Counted without listing them, so it is safe on series spanning
    /// arbitrarily many years.
    pub fn missing_year_count(&self) -> u64 {
        self.points
            .windows(2)
            .map(|pair| (i64::from(pair[1].year) - i64::from(pair[0].year) - 1) as u64)
            .sum()
    }

    /// Whether every year between the first and last is present
    pub fn is_contiguous(&self) -> bool {
        self.points.windows(2).all(|pair| pair[1].year == pair[0].year + 1)
    }

    /// Reindex to contiguous years, giving missing years a zero count
    pub fn fill_gaps(&self) -> Self {
        let mut points = Vec::with_capacity(self.points.len());
        for point in &self.points {
            if let Some(last) = points.last().map(|p: &YearCount| p.year) {
                points.extend(((last + 1)..point.year).map(|year| YearCount { year, count: 0 }));
            }
            points.push(*point);
        }
        Self { points }
    }

    /// Leading and trailing parts, the trailing part holding `tail` points
    pub fn split_tail(&self, tail: usize) -> (Self, Self) {
        let at = self.points.len().saturating_sub(tail);
        let (head, rest) = self.points.split_at(at);
        (
            Self {
                points: head.to_vec(),
            },
            Self {
                points: rest.to_vec(),
            },
        )
    }
}

/// Builds yearly count series from vaccination records
#[derive(Debug, Clone, Copy, Default)]
pub struct SeriesBuilder;

impl SeriesBuilder {
    /// Count vaccinated records matching `filter`, grouped by year
    ///
    /// An empty selection gives an empty series.
    pub fn build<'a, I>(records: I, filter: &RecordFilter) -> YearlyCountSeries
    where
        I: IntoIterator<Item = &'a VaccinationRecord>,
    {
        let mut counts: BTreeMap<i32, u64> = BTreeMap::new();
        for record in records {
            if record.vaccinated() && filter.matches(record) {
                *counts.entry(record.year()).or_insert(0) += 1;
            }
        }

        // BTreeMap iteration is ascending and duplicate-free
        YearlyCountSeries {
            points: counts
                .into_iter()
                .map(|(year, count)| YearCount { year, count })
                .collect(),
        }
    }
}
