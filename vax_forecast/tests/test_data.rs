use std::io::Write;
use tempfile::NamedTempFile;
use vax_forecast::data::{DataLoader, RecordStore, VaccinationRecord};
use vax_forecast::error::ForecastError;
use vax_forecast::series::RecordFilter;

fn create_sample_csv() -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(
        file,
        "State,City,Age_Group,Gender,Ethnicity,Vaccinated,Year,Description,Lat,Lon"
    )
    .unwrap();
    writeln!(file, "Texas,Austin,18-29,F,Hispanic or Latino,true,2019,Influenza,30.27,-97.74").unwrap();
    writeln!(file, "Texas,Austin,30-49,M,Asian,false,2019,Influenza,30.27,-97.74").unwrap();
    writeln!(file, "Texas,Dallas,65+,F,African American,true,2020,Measles,32.78,-96.80").unwrap();
    writeln!(file, "Ohio,Columbus,18-29,M,Other,true,2020,Influenza,,").unwrap();
    writeln!(file, "Ohio,Columbus,18-29,M,Other,true,unknown,Influenza,,").unwrap();
    file
}

#[test]
fn test_data_loader_from_csv() {
    let file = create_sample_csv();
    let store = DataLoader::from_csv(file.path()).unwrap();

    assert_eq!(store.len(), 4);
    assert!(!store.is_empty());

    let report = store.report();
    assert_eq!(report.rows_read, 5);
    assert_eq!(report.rows_loaded, 4);
    assert_eq!(report.rows_skipped, 1);

    let first = &store.records()[0];
    assert_eq!(first.state(), "Texas");
    assert_eq!(first.city(), "Austin");
    assert_eq!(first.age_group(), "18-29");
    assert_eq!(first.ethnicity(), "Hispanic or Latino");
    assert!(first.vaccinated());
    assert_eq!(first.year(), 2019);
    assert_eq!(first.description(), "Influenza");
    assert!(first.location().is_some());

    assert_eq!(store.records()[3].location(), None);
}

#[test]
fn test_column_names_are_case_insensitive() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "year,VACCINATED,state").unwrap();
    writeln!(file, "2021,1,Utah").unwrap();
    writeln!(file, "2022,0,Utah").unwrap();

    let store = DataLoader::from_csv(file.path()).unwrap();
    assert_eq!(store.len(), 2);
    assert!(store.records()[0].vaccinated());
    assert!(!store.records()[1].vaccinated());
    // Absent optional columns become empty strings
    assert_eq!(store.records()[0].city(), "");
    assert_eq!(store.records()[0].description(), "");
}

#[test]
fn test_data_loader_error_handling() {
    let result = DataLoader::from_csv("nonexistent_file.csv");
    assert!(matches!(result, Err(ForecastError::Io(_))));

    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "state,city,year").unwrap();
    writeln!(file, "Texas,Austin,2020").unwrap();

    let result = DataLoader::from_csv(file.path());
    assert!(matches!(result, Err(ForecastError::Data(_))));
}

#[test]
fn test_store_distinct_values() {
    let file = create_sample_csv();
    let store = RecordStore::from_csv(file.path()).unwrap();

    assert_eq!(store.states(), vec!["Texas", "Ohio"]);
    assert_eq!(store.cities_in("Texas"), vec!["Austin", "Dallas"]);
    assert!(store.cities_in("Nevada").is_empty());
    assert_eq!(store.descriptions(), vec!["Influenza", "Measles"]);
}

#[test]
fn test_store_query() {
    let store = RecordStore::from_records(vec![
        VaccinationRecord::new("Texas", "Austin", 2019, true, "Influenza"),
        VaccinationRecord::new("Texas", "Austin", 2019, false, "Influenza"),
        VaccinationRecord::new("Texas", "Dallas", 2020, true, "Measles"),
    ]);

    let filter = RecordFilter::all().state("Texas").city("Austin");
    // Query ignores vaccination status
    assert_eq!(store.query(&filter).count(), 2);

    let filter = RecordFilter::all().descriptions(["Measles"]);
    assert_eq!(store.query(&filter).count(), 1);

    let filter = RecordFilter::all().descriptions(Vec::<String>::new());
    assert_eq!(store.query(&filter).count(), 0);
}

#[test]
fn test_out_of_range_years_are_skipped() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "STATE,CITY,VACCINATED,YEAR,DESCRIPTION").unwrap();
    writeln!(file, "TX,Austin,1,2020,Flu").unwrap();
    writeln!(file, "TX,Austin,1,3000000000,Flu").unwrap();
    writeln!(file, "TX,Austin,1,0,Flu").unwrap();
    writeln!(file, "TX,Austin,1,10000,Flu").unwrap();

    let store = DataLoader::from_csv(file.path()).unwrap();
    let report = store.report();
    assert_eq!(report.rows_read, 4);
    assert_eq!(report.rows_loaded, 1);
    assert_eq!(report.rows_skipped, 3);
    assert_eq!(store.records()[0].year(), 2020);
}

#[test]
fn test_float_years_beyond_i32_are_skipped() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "STATE,CITY,VACCINATED,YEAR,DESCRIPTION").unwrap();
    writeln!(file, "TX,Austin,1,2021.0,Flu").unwrap();
    writeln!(file, "TX,Austin,1,3000000000.0,Flu").unwrap();
    writeln!(file, "TX,Austin,1,2021.5,Flu").unwrap();
    writeln!(file, "TX,Austin,1,1e300,Flu").unwrap();

    let store = DataLoader::from_csv(file.path()).unwrap();
    assert_eq!(store.report().rows_loaded, 1);
    assert_eq!(store.report().rows_skipped, 3);
    assert!(store
        .records()
        .iter()
        .all(|r| vax_forecast::data::YEAR_RANGE.contains(&r.year())));
}
