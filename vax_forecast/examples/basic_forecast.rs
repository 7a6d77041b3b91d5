use vax_forecast::config::{ArimaOrder, ForecastConfig};
use vax_forecast::data::{RecordStore, VaccinationRecord};
use vax_forecast::engine::ForecastEngine;
use vax_forecast::metrics::holdout_evaluation;
use vax_forecast::series::{RecordFilter, SeriesBuilder};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("Vax Forecast: Basic Forecasting Example");
    println!("=======================================\n");

    // Create sample data
    println!("Creating sample records...");
    let store = create_sample_store();
    println!("Sample store created: {} records\n", store.len());

    let filter = RecordFilter::all().state("Texas");
    let series = SeriesBuilder::build(store.records(), &filter);
    println!("Vaccinated per year in Texas:");
    for point in series.points() {
        println!("  {}: {}", point.year, point.count);
    }

    // Forecast with both preset orders
    for order in [ArimaOrder::FULL_DATASET, ArimaOrder::FILTERED_SUBSET] {
        let config = ForecastConfig::new(order, ForecastConfig::DEFAULT_HORIZON)?
            .with_confidence_level(0.95)?;

        match ForecastEngine::new(config).forecast(&series) {
            Ok(result) => {
                println!("\n{} forecast:", order);
                for point in result.points() {
                    println!(
                        "  {}: {:.1} [{:.1}, {:.1}]",
                        point.year,
                        point.predicted,
                        point.lower.unwrap_or(f64::NAN),
                        point.upper.unwrap_or(f64::NAN)
                    );
                }
            }
            Err(e) => println!("\n{} skipped: {}", order, e),
        }
    }

    // Score the full-dataset order on the last two years
    let config = ForecastConfig::new(ArimaOrder::FULL_DATASET, 2)?;
    let evaluation = holdout_evaluation(&series, &config, 2)?;
    println!("\nHoldout on {:?}", evaluation.years);
    println!("{}", evaluation.accuracy);

    Ok(())
}

fn create_sample_store() -> RecordStore {
    let yearly = [
        (2012, 40),
        (2013, 46),
        (2014, 43),
        (2015, 52),
        (2016, 58),
        (2017, 55),
        (2018, 63),
        (2019, 70),
        (2020, 61),
        (2021, 74),
        (2022, 79),
    ];

    let mut records = Vec::new();
    for (year, count) in yearly {
        for i in 0..count {
            records.push(VaccinationRecord::new(
                "Texas",
                if i % 3 == 0 { "Dallas" } else { "Austin" },
                year,
                true,
                "Influenza",
            ));
        }
        records.push(VaccinationRecord::new("Texas", "Austin", year, false, "Influenza"));
    }

    RecordStore::from_records(records)
}
