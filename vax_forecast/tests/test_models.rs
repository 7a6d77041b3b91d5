use assert_approx_eq::assert_approx_eq;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};
use vax_forecast::config::{ArimaOrder, ForecastConfig, GapPolicy};
use vax_forecast::engine::ForecastEngine;
use vax_forecast::error::ForecastError;
use vax_forecast::models::arima::Arima;
use vax_forecast::models::{FittedForecastModel, ForecastModel};
use vax_forecast::series::YearlyCountSeries;

fn create_test_series() -> YearlyCountSeries {
    YearlyCountSeries::from_points(vec![
        (2018, 120),
        (2019, 135),
        (2020, 90),
        (2021, 150),
        (2022, 160),
    ])
    .unwrap()
}

fn simulate_ar1(phi: f64, mean: f64, n: usize, seed: u64) -> Vec<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    let noise = Normal::new(0.0, 1.0).unwrap();

    let mut values = Vec::with_capacity(n);
    let mut deviation = 0.0;
    // Burn-in so the start does not depend on the zero initial value
    for _ in 0..100 {
        deviation = phi * deviation + noise.sample(&mut rng);
    }
    for _ in 0..n {
        deviation = phi * deviation + noise.sample(&mut rng);
        values.push(mean + deviation);
    }
    values
}

#[test]
fn test_five_year_forecast() {
    let series = create_test_series();
    let config = ForecastConfig::new(ArimaOrder::FULL_DATASET, 5).unwrap();
    let result = ForecastEngine::new(config).forecast(&series).unwrap();

    assert_eq!(result.horizon(), 5);
    assert_eq!(result.years(), vec![2023, 2024, 2025, 2026, 2027]);
    assert!(result.values().iter().all(|v| v.is_finite()));
    assert!(result.intervals().is_none());
    assert!(result.gap_years().is_empty());
    assert_eq!(result.model().model, "ARIMA(1,1,1)");
    assert!(result.model().converged);
}

#[test]
fn test_forecast_is_deterministic() {
    let series = create_test_series();
    let engine = ForecastEngine::new(ForecastConfig::default());

    let first = engine.forecast(&series).unwrap();
    let second = engine.forecast(&series).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_empty_series_is_insufficient() {
    let engine = ForecastEngine::new(ForecastConfig::default());
    let result = engine.forecast(&YearlyCountSeries::empty());

    match result {
        Err(ForecastError::InsufficientData { required, actual }) => {
            assert_eq!(required, 4);
            assert_eq!(actual, 0);
        }
        other => panic!("Expected InsufficientData, got {:?}", other),
    }
}

#[test]
fn test_short_series_is_insufficient() {
    let series = YearlyCountSeries::from_points(vec![(2020, 10), (2021, 12), (2022, 15)]).unwrap();
    let engine = ForecastEngine::new(ForecastConfig::default());

    assert!(matches!(
        engine.forecast(&series),
        Err(ForecastError::InsufficientData {
            required: 4,
            actual: 3
        })
    ));

    let config = ForecastConfig::new(ArimaOrder::FILTERED_SUBSET, 5).unwrap();
    let result = ForecastEngine::new(config).forecast(&create_test_series());
    assert!(matches!(
        result,
        Err(ForecastError::InsufficientData {
            required: 7,
            actual: 5
        })
    ));
}

#[test]
fn test_constant_series_fails_to_fit() {
    let series =
        YearlyCountSeries::from_points((2015..2023).map(|year| (year, 100))).unwrap();

    for order in [ArimaOrder::FULL_DATASET, ArimaOrder::new(1, 0, 0).unwrap()] {
        let config = ForecastConfig::new(order, 5).unwrap();
        let first = ForecastEngine::new(config.clone()).forecast(&series);
        let second = ForecastEngine::new(config).forecast(&series);

        assert!(matches!(first, Err(ForecastError::ModelFit(_))));
        assert_eq!(first.unwrap_err().to_string(), second.unwrap_err().to_string());
    }
}

#[test]
fn test_random_walk_forecast_is_last_value() {
    let series = create_test_series();
    let config = ForecastConfig::new(ArimaOrder::new(0, 1, 0).unwrap(), 3).unwrap();
    let result = ForecastEngine::new(config).forecast(&series).unwrap();

    for value in result.values() {
        assert_approx_eq!(value, 160.0, 1e-9);
    }
}

#[test]
fn test_zero_fill_gap_policy() {
    let series = YearlyCountSeries::from_points(vec![
        (2016, 40),
        (2017, 55),
        (2019, 48),
        (2020, 61),
        (2021, 70),
        (2022, 66),
    ])
    .unwrap();

    let config = ForecastConfig::new(ArimaOrder::new(0, 1, 0).unwrap(), 2).unwrap();
    let result = ForecastEngine::new(config).forecast(&series).unwrap();

    assert_eq!(result.gap_years(), &[2018]);
    assert_eq!(result.gap_policy(), GapPolicy::ZeroFill);
    assert!(!result.fitted_on_positional_index());
    assert_eq!(result.years(), vec![2023, 2024]);
    // Seven filled years, one lost to differencing
    assert_eq!(result.model().observations, 6);
}

#[test]
fn test_reject_and_positional_gap_policies() {
    let series = YearlyCountSeries::from_points(vec![
        (2016, 40),
        (2017, 55),
        (2019, 48),
        (2020, 61),
        (2021, 70),
    ])
    .unwrap();
    let base = ForecastConfig::new(ArimaOrder::new(0, 1, 0).unwrap(), 2).unwrap();

    let rejected = ForecastEngine::new(base.clone().with_gap_policy(GapPolicy::Reject))
        .forecast(&series);
    match rejected {
        Err(ForecastError::GappedSeries(years)) => assert_eq!(years, vec![2018]),
        other => panic!("Expected GappedSeries, got {:?}", other),
    }

    let positional = ForecastEngine::new(base.with_gap_policy(GapPolicy::Positional))
        .forecast(&series)
        .unwrap();
    assert!(positional.fitted_on_positional_index());
    assert_eq!(positional.model().observations, 4);
    assert_eq!(positional.years(), vec![2022, 2023]);
}

#[test]
fn test_confidence_intervals_widen() {
    let series = create_test_series();
    let config = ForecastConfig::new(ArimaOrder::new(0, 1, 0).unwrap(), 4)
        .unwrap()
        .with_confidence_level(0.95)
        .unwrap();
    let result = ForecastEngine::new(config).forecast(&series).unwrap();

    let intervals = result.intervals().unwrap();
    assert_eq!(intervals.len(), 4);

    let mut previous_width = 0.0;
    for (point, (lower, upper)) in result.points().iter().zip(intervals) {
        assert!(lower < point.predicted && point.predicted < upper);
        let width = upper - lower;
        assert!(width > previous_width);
        previous_width = width;
    }
}

#[test]
fn test_arima_recovers_ar_coefficient() {
    let values = simulate_ar1(0.6, 50.0, 400, 42);
    let model = Arima::new(ArimaOrder::new(1, 0, 0).unwrap());
    let fitted = model.fit(&values).unwrap();

    assert_approx_eq!(fitted.ar_coefficients()[0], 0.6, 0.15);
    assert_approx_eq!(fitted.sigma2(), 1.0, 0.3);

    let summary = fitted.summary();
    let mean = summary.mean.unwrap();
    assert_approx_eq!(mean, 50.0, 0.75);
    assert!(summary.aic.is_finite());
    assert_eq!(fitted.fitted_values().len(), values.len());
    assert_eq!(fitted.residuals().len(), values.len());
}

#[test]
fn test_ar_forecast_reverts_to_mean() {
    let values = simulate_ar1(0.5, 20.0, 200, 7);
    let model = Arima::new(ArimaOrder::new(1, 0, 0).unwrap());
    let fitted = model.fit(&values).unwrap();

    let forecast = fitted.forecast(60).unwrap();
    let mean = fitted.summary().mean.unwrap();
    assert_approx_eq!(forecast[59], mean, 1e-6);
}

#[test]
fn test_arima_rejects_non_finite_observations() {
    let model = Arima::new(ArimaOrder::new(1, 0, 0).unwrap());
    let result = model.fit(&[1.0, 2.0, f64::NAN, 4.0, 5.0]);
    assert!(matches!(result, Err(ForecastError::Data(_))));
}

#[test]
fn test_last_year_at_i32_max_is_rejected_without_panic() {
    let series = YearlyCountSeries::from_points(vec![
        (i32::MAX - 4, 10),
        (i32::MAX - 3, 14),
        (i32::MAX - 2, 9),
        (i32::MAX - 1, 17),
        (i32::MAX, 15),
    ])
    .unwrap();

    let result = ForecastEngine::new(ForecastConfig::default()).forecast(&series);
    assert!(matches!(result, Err(ForecastError::Data(_))));
}

#[test]
fn test_huge_gap_is_rejected_before_filling() {
    let series = YearlyCountSeries::from_points(vec![
        (2018, 10),
        (2019, 14),
        (2020, 9),
        (2021, 17),
        (2_000_000, 1),
    ])
    .unwrap();

    for policy in [GapPolicy::ZeroFill, GapPolicy::Reject, GapPolicy::Positional] {
        let config = ForecastConfig::default().with_gap_policy(policy);
        let result = ForecastEngine::new(config).forecast(&series);
        assert!(matches!(result, Err(ForecastError::Data(_))));
    }

    let series = YearlyCountSeries::from_points(vec![(1, 3), (i32::MAX, 4)]).unwrap();
    let result = ForecastEngine::new(ForecastConfig::default()).forecast(&series);
    assert!(matches!(result, Err(ForecastError::Data(_))));
}

#[test]
fn test_gap_at_the_limit_is_filled() {
    let last = 2000 + ForecastEngine::MAX_MISSING_YEARS as i32 + 1;
    let series = YearlyCountSeries::from_points(vec![(1998, 5), (1999, 8), (2000, 6), (last, 9)])
        .unwrap();
    let config = ForecastConfig::new(ArimaOrder::new(0, 1, 0).unwrap(), 1).unwrap();

    let result = ForecastEngine::new(config).forecast(&series).unwrap();
    assert_eq!(result.gap_years().len() as u64, ForecastEngine::MAX_MISSING_YEARS);
    assert_eq!(result.years(), vec![last + 1]);
}
