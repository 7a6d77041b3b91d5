use pretty_assertions::assert_eq;
use vax_forecast::data::VaccinationRecord;
use vax_forecast::series::{RecordFilter, SeriesBuilder, YearlyCountSeries};

fn create_records() -> Vec<VaccinationRecord> {
    vec![
        VaccinationRecord::new("Texas", "Austin", 2019, true, "Influenza"),
        VaccinationRecord::new("Texas", "Austin", 2019, true, "Measles"),
        VaccinationRecord::new("Texas", "Austin", 2019, false, "Influenza"),
        VaccinationRecord::new("Texas", "Dallas", 2020, true, "Influenza"),
        VaccinationRecord::new("Texas", "Austin", 2021, true, "Influenza"),
        VaccinationRecord::new("Ohio", "Columbus", 2018, true, "Influenza"),
        VaccinationRecord::new("Ohio", "Columbus", 2018, false, "Measles"),
    ]
}

#[test]
fn test_build_counts_vaccinated_by_year() {
    let records = create_records();
    let series = SeriesBuilder::build(&records, &RecordFilter::all());

    assert_eq!(
        series.points().iter().map(|p| (p.year, p.count)).collect::<Vec<_>>(),
        vec![(2018, 1), (2019, 2), (2020, 1), (2021, 1)]
    );
    assert_eq!(series.total(), 5);
}

#[test]
fn test_build_matches_manual_enumeration() {
    let records = create_records();
    let filters = vec![
        RecordFilter::all(),
        RecordFilter::all().state("Texas"),
        RecordFilter::all().state("Texas").city("Austin"),
        RecordFilter::all().descriptions(["Influenza"]),
        RecordFilter::all().state("Ohio").descriptions(["Measles"]),
    ];

    for filter in filters {
        let series = SeriesBuilder::build(&records, &filter);
        for point in series.points() {
            let expected = records
                .iter()
                .filter(|r| r.vaccinated() && r.year() == point.year && filter.matches(r))
                .count() as u64;
            assert_eq!(point.count, expected);
        }
        let expected_total = records
            .iter()
            .filter(|r| r.vaccinated() && filter.matches(r))
            .count() as u64;
        assert_eq!(series.total(), expected_total);
    }
}

#[test]
fn test_empty_selection_gives_empty_series() {
    let records = create_records();

    let series = SeriesBuilder::build(&records, &RecordFilter::all().state("Nevada"));
    assert!(series.is_empty());

    let series = SeriesBuilder::build(&records, &RecordFilter::all().descriptions(Vec::<String>::new()));
    assert!(series.is_empty());

    // Only non-vaccinated records match
    let series = SeriesBuilder::build(
        &records,
        &RecordFilter::all().state("Ohio").descriptions(["Measles"]),
    );
    assert!(series.is_empty());
}

#[test]
fn test_from_points_rejects_unsorted_years() {
    assert!(YearlyCountSeries::from_points(vec![(2020, 1), (2019, 2)]).is_err());
    assert!(YearlyCountSeries::from_points(vec![(2020, 1), (2020, 2)]).is_err());
    assert!(YearlyCountSeries::from_points(Vec::new()).unwrap().is_empty());
}

#[test]
fn test_gaps_and_fill() {
    let series = YearlyCountSeries::from_points(vec![(2018, 5), (2021, 7), (2022, 9)]).unwrap();

    assert!(!series.is_contiguous());
    assert_eq!(series.missing_years(), vec![2019, 2020]);

    let filled = series.fill_gaps();
    assert!(filled.is_contiguous());
    assert_eq!(filled.years(), vec![2018, 2019, 2020, 2021, 2022]);
    assert_eq!(filled.counts(), vec![5, 0, 0, 7, 9]);
    assert_eq!(filled.total(), series.total());
}

#[test]
fn test_split_tail() {
    let series =
        YearlyCountSeries::from_points(vec![(2018, 1), (2019, 2), (2020, 3), (2021, 4)]).unwrap();

    let (head, tail) = series.split_tail(1);
    assert_eq!(head.years(), vec![2018, 2019, 2020]);
    assert_eq!(tail.years(), vec![2021]);

    let (head, tail) = series.split_tail(10);
    assert!(head.is_empty());
    assert_eq!(tail.len(), 4);
}

#[test]
fn test_missing_year_count_on_extreme_spans() {
    let series = YearlyCountSeries::from_points(vec![(2018, 5), (2021, 7), (2022, 9)]).unwrap();
    assert_eq!(series.missing_year_count(), 2);

    let series = YearlyCountSeries::from_points(vec![(i32::MIN, 1), (i32::MAX, 1)]).unwrap();
    assert_eq!(series.missing_year_count(), 4_294_967_294);
}
