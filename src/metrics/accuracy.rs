//! Scalar forecast-accuracy metrics.
//!
//! Every function takes the actual continuation first and the forecast
//! second, both over the same index, and returns a single non-negative
//! score where smaller is better.
//!
//! Division is plain IEEE arithmetic throughout: a zero denominator (zero
//! actual under `mape`, zero range under `marre`, and so on) yields a
//! non-finite score, which the evaluation loop treats as a failed window.
//! Length mismatches are caller bugs and panic.

use crate::series::TimeSeries;

fn check_lengths(actual: &TimeSeries, predicted: &TimeSeries) {
    assert_eq!(
        actual.len(),
        predicted.len(),
        "actual and predicted series must have the same length"
    );
}

/// Mean absolute error.
pub fn mae(actual: &TimeSeries, predicted: &TimeSeries) -> f64 {
    check_lengths(actual, predicted);
    let n = actual.len() as f64;
    actual
        .values()
        .iter()
        .zip(predicted.values())
        .map(|(a, p)| (a - p).abs())
        .sum::<f64>()
        / n
}

/// Mean squared error.
pub fn mse(actual: &TimeSeries, predicted: &TimeSeries) -> f64 {
    check_lengths(actual, predicted);
    let n = actual.len() as f64;
    actual
        .values()
        .iter()
        .zip(predicted.values())
        .map(|(a, p)| (a - p).powi(2))
        .sum::<f64>()
        / n
}

/// Root mean squared error.
pub fn rmse(actual: &TimeSeries, predicted: &TimeSeries) -> f64 {
    mse(actual, predicted).sqrt()
}

/// Root mean squared log error over `ln(1 + x)`.
pub fn rmsle(actual: &TimeSeries, predicted: &TimeSeries) -> f64 {
    check_lengths(actual, predicted);
    let n = actual.len() as f64;
    (actual
        .values()
        .iter()
        .zip(predicted.values())
        .map(|(a, p)| {
            let d = (1.0 + a).ln() - (1.0 + p).ln();
            d * d
        })
        .sum::<f64>()
        / n)
        .sqrt()
}

/// Mean absolute percentage error, in percent of the actual values.
pub fn mape(actual: &TimeSeries, predicted: &TimeSeries) -> f64 {
    check_lengths(actual, predicted);
    let n = actual.len() as f64;
    100.0
        * actual
            .values()
            .iter()
            .zip(predicted.values())
            .map(|(a, p)| ((a - p) / a).abs())
            .sum::<f64>()
        / n
}

/// Symmetric mean absolute percentage error, bounded by 200 when defined.
pub fn smape(actual: &TimeSeries, predicted: &TimeSeries) -> f64 {
    check_lengths(actual, predicted);
    let n = actual.len() as f64;
    200.0
        * actual
            .values()
            .iter()
            .zip(predicted.values())
            .map(|(a, p)| (a - p).abs() / (a.abs() + p.abs()))
            .sum::<f64>()
        / n
}

/// Mean absolute ranged relative error: absolute errors scaled by the range
/// of the actual values.
pub fn marre(actual: &TimeSeries, predicted: &TimeSeries) -> f64 {
    check_lengths(actual, predicted);
    let values = actual.values();
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let range = max - min;
    let n = values.len() as f64;
    100.0
        * values
            .iter()
            .zip(predicted.values())
            .map(|(a, p)| ((a - p) / range).abs())
            .sum::<f64>()
        / n
}

/// Overall percentage error: the totals of the two series compared as a
/// percentage of the actual total.
pub fn ope(actual: &TimeSeries, predicted: &TimeSeries) -> f64 {
    check_lengths(actual, predicted);
    let actual_sum: f64 = actual.values().iter().sum();
    let predicted_sum: f64 = predicted.values().iter().sum();
    (100.0 * (actual_sum - predicted_sum) / actual_sum).abs()
}
