use assert_approx_eq::assert_approx_eq;
use vax_forecast::config::{ArimaOrder, ForecastConfig};
use vax_forecast::error::ForecastError;
use vax_forecast::metrics::{forecast_accuracy, holdout_evaluation};
use vax_forecast::series::YearlyCountSeries;

#[test]
fn test_forecast_accuracy() {
    let actual = vec![10.0, 20.0, 30.0, 40.0, 50.0];
    let predicted = vec![12.0, 18.0, 33.0, 37.0, 52.0];

    let accuracy = forecast_accuracy(&predicted, &actual).unwrap();

    assert_approx_eq!(accuracy.mae, 2.4, 1e-9);
    assert_approx_eq!(accuracy.mse, 6.0, 1e-9);
    assert_approx_eq!(accuracy.rmse, 6.0_f64.sqrt(), 1e-9);
    assert_approx_eq!(accuracy.mape, 10.3, 1e-9);
    assert!(accuracy.smape > 0.0 && accuracy.smape < accuracy.mape + 1.0);

    let display = accuracy.to_string();
    assert!(display.contains("MAE:   2.4000"));
}

#[test]
fn test_forecast_accuracy_perfect_and_zero_actuals() {
    let accuracy = forecast_accuracy(&[0.0, 5.0], &[0.0, 5.0]).unwrap();
    assert_eq!(accuracy.mae, 0.0);
    assert_eq!(accuracy.mape, 0.0);
    assert_eq!(accuracy.smape, 0.0);
}

#[test]
fn test_forecast_accuracy_length_mismatch() {
    assert!(forecast_accuracy(&[1.0, 2.0], &[1.0]).is_err());
    assert!(forecast_accuracy(&[], &[]).is_err());
}

#[test]
fn test_holdout_evaluation() {
    let series = YearlyCountSeries::from_points(vec![
        (2015, 80),
        (2016, 95),
        (2017, 90),
        (2018, 120),
        (2019, 135),
        (2020, 110),
        (2021, 150),
        (2022, 160),
    ])
    .unwrap();
    let config = ForecastConfig::new(ArimaOrder::new(0, 1, 0).unwrap(), 5).unwrap();

    let evaluation = holdout_evaluation(&series, &config, 2).unwrap();

    assert_eq!(evaluation.years, vec![2021, 2022]);
    assert_eq!(evaluation.actual, vec![150.0, 160.0]);
    // Random walk carries the last training value forward
    assert_eq!(evaluation.forecast.horizon(), 2);
    assert_approx_eq!(evaluation.predicted[0], 110.0, 1e-9);
    assert_approx_eq!(evaluation.predicted[1], 110.0, 1e-9);
    assert_approx_eq!(evaluation.accuracy.mae, 45.0, 1e-9);
}

#[test]
fn test_holdout_evaluation_invalid_holdout() {
    let series = YearlyCountSeries::from_points(vec![(2020, 1), (2021, 2), (2022, 3)]).unwrap();
    let config = ForecastConfig::default();

    assert!(matches!(
        holdout_evaluation(&series, &config, 0),
        Err(ForecastError::Configuration(_))
    ));
    assert!(matches!(
        holdout_evaluation(&series, &config, 3),
        Err(ForecastError::InsufficientData { .. })
    ));
}
