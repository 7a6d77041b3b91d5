//! Tabular summaries of a record selection

use crate::data::VaccinationRecord;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Population the coverage comparison is measured against by default
pub const DEFAULT_ESTIMATED_POPULATION: u64 = 13_802;

/// Vaccinated and non-vaccinated counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusTotals {
    pub vaccinated: u64,
    pub non_vaccinated: u64,
    pub total: u64,
}

impl StatusTotals {
    fn add(&mut self, vaccinated: bool) {
        if vaccinated {
            self.vaccinated += 1;
        } else {
            self.non_vaccinated += 1;
        }
        self.total += 1;
    }

    /// Count the records of a selection
    pub fn from_records<'a, I>(records: I) -> Self
    where
        I: IntoIterator<Item = &'a VaccinationRecord>,
    {
        let mut totals = Self::default();
        for record in records {
            totals.add(record.vaccinated());
        }
        totals
    }

    /// Vaccinated share of the selection, in percent
    pub fn vaccinated_percent(&self) -> Option<f64> {
        (self.total > 0).then(|| self.vaccinated as f64 / self.total as f64 * 100.0)
    }
}

/// Race category derived from the recorded ethnicity
pub fn race_for_ethnicity(ethnicity: &str) -> &'static str {
    match ethnicity.trim() {
        "Hispanic or Latino" => "Hispanic",
        "Not Hispanic or Latino" => "White",
        "African American" => "Black",
        "Asian" => "Asian",
        "Native American" => "Native American",
        "Pacific Islander" => "Pacific Islander",
        "Other" => "Other",
        _ => "Unknown",
    }
}

/// One row of a grouped status table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreakdownRow<K> {
    pub key: K,
    pub totals: StatusTotals,
}

/// Status counts per race, sorted by race, followed by a `Total` row
pub fn race_breakdown<'a, I>(records: I) -> Vec<BreakdownRow<String>>
where
    I: IntoIterator<Item = &'a VaccinationRecord>,
{
    let mut groups: BTreeMap<&'static str, StatusTotals> = BTreeMap::new();
    let mut overall = StatusTotals::default();
    for record in records {
        groups
            .entry(race_for_ethnicity(record.ethnicity()))
            .or_default()
            .add(record.vaccinated());
        overall.add(record.vaccinated());
    }

    groups
        .into_iter()
        .map(|(race, totals)| BreakdownRow {
            key: race.to_string(),
            totals,
        })
        .chain(std::iter::once(BreakdownRow {
            key: "Total".to_string(),
            totals: overall,
        }))
        .collect()
}

/// Grouping key of the demographic breakdown
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DemographicKey {
    pub ethnicity: String,
    pub gender: String,
    pub age_group: String,
}

/// Status counts per (ethnicity, gender, age group)
///
/// Every group present on either side appears once; a group with no
/// records of one status counts zero for it.
pub fn demographic_breakdown<'a, I>(records: I) -> Vec<BreakdownRow<DemographicKey>>
where
    I: IntoIterator<Item = &'a VaccinationRecord>,
{
    let mut groups: BTreeMap<DemographicKey, StatusTotals> = BTreeMap::new();
    for record in records {
        let key = DemographicKey {
            ethnicity: record.ethnicity().to_string(),
            gender: record.gender().to_string(),
            age_group: record.age_group().to_string(),
        };
        groups.entry(key).or_default().add(record.vaccinated());
    }

    groups
        .into_iter()
        .map(|(key, totals)| BreakdownRow { key, totals })
        .collect()
}

/// Vaccinated share of an estimated population, from the dataset and from
/// an externally reported total
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CoverageComparison {
    pub estimated_population: u64,
    pub dataset_vaccinated: u64,
    pub reported_vaccinated: u64,
    pub dataset_percent: f64,
    pub reported_percent: f64,
}

impl CoverageComparison {
    /// Compare against an estimated population
    ///
    /// `fully` and `partially` are the externally reported counts; their
    /// sum is the reported total. Returns `None` for a zero population.
    pub fn new(
        dataset_vaccinated: u64,
        fully: u64,
        partially: u64,
        estimated_population: u64,
    ) -> Option<Self> {
        if estimated_population == 0 {
            return None;
        }
        let reported_vaccinated = fully + partially;
        let population = estimated_population as f64;
        Some(Self {
            estimated_population,
            dataset_vaccinated,
            reported_vaccinated,
            dataset_percent: dataset_vaccinated as f64 / population * 100.0,
            reported_percent: reported_vaccinated as f64 / population * 100.0,
        })
    }

    /// Reported minus dataset share, in percentage points
    pub fn difference(&self) -> f64 {
        self.reported_percent - self.dataset_percent
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(ethnicity: &str, gender: &str, age: &str, vaccinated: bool) -> VaccinationRecord {
        VaccinationRecord::new("TX", "Austin", 2021, vaccinated, "Flu")
            .with_demographics(age, gender, ethnicity)
    }

    #[test]
    fn test_race_mapping() {
        assert_eq!(race_for_ethnicity("Hispanic or Latino"), "Hispanic");
        assert_eq!(race_for_ethnicity("Not Hispanic or Latino"), "White");
        assert_eq!(race_for_ethnicity("African American"), "Black");
        assert_eq!(race_for_ethnicity("Pacific Islander"), "Pacific Islander");
        assert_eq!(race_for_ethnicity(""), "Unknown");
        assert_eq!(race_for_ethnicity("Martian"), "Unknown");
    }

    #[test]
    fn test_race_breakdown_has_total_row() {
        let records = vec![
            record("Hispanic or Latino", "F", "18-29", true),
            record("Hispanic or Latino", "M", "18-29", false),
            record("Asian", "F", "30-49", true),
        ];

        let rows = race_breakdown(&records);
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].key, "Asian");
        assert_eq!(rows[1].key, "Hispanic");
        assert_eq!(rows[1].totals.vaccinated, 1);
        assert_eq!(rows[1].totals.non_vaccinated, 1);

        let total = &rows[2];
        assert_eq!(total.key, "Total");
        assert_eq!(total.totals.vaccinated, 2);
        assert_eq!(total.totals.total, 3);
    }

    #[test]
    fn test_demographic_breakdown_zero_for_missing_side() {
        let records = vec![
            record("Asian", "F", "30-49", true),
            record("Other", "M", "65+", false),
        ];

        let rows = demographic_breakdown(&records);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].totals.non_vaccinated, 0);
        assert_eq!(rows[1].totals.vaccinated, 0);
        assert_eq!(rows[1].totals.non_vaccinated, 1);
    }

    #[test]
    fn test_coverage_comparison() {
        let coverage = CoverageComparison::new(1380, 5000, 1901, DEFAULT_ESTIMATED_POPULATION)
            .unwrap();
        assert_eq!(coverage.reported_vaccinated, 6901);
        assert!((coverage.dataset_percent - 9.9986).abs() < 1e-3);
        assert!((coverage.reported_percent - 50.0).abs() < 1e-9);
        assert!(CoverageComparison::new(1, 1, 1, 0).is_none());
    }

    #[test]
    fn test_status_totals_percent() {
        let empty = StatusTotals::default();
        assert_eq!(empty.vaccinated_percent(), None);

        let records = vec![record("Asian", "F", "30-49", true), record("Asian", "F", "30-49", false)];
        let totals = StatusTotals::from_records(&records);
        assert_eq!(totals.vaccinated_percent(), Some(50.0));
    }
}
