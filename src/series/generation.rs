//! Synthetic series constructors.
//!
//! Deterministic fixtures for tests, demos, and model smoke checks. All
//! constructors build on the default daily index starting
//! [`DEFAULT_START`](super::DEFAULT_START); random draws come from a seeded
//! generator so fixtures reproduce exactly.

use chrono::{Duration, NaiveDate};
use rand::distributions::Distribution;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use statrs::distribution::Normal;
use std::f64::consts::TAU;

use super::{SeriesError, TimeSeries, DEFAULT_START};

/// Daily index of `length` dates starting at [`DEFAULT_START`].
pub(crate) fn daily_index(length: usize) -> Vec<NaiveDate> {
    let mut index = Vec::with_capacity(length);
    let mut date = DEFAULT_START;
    for _ in 0..length {
        index.push(date);
        date += Duration::days(1);
    }
    index
}

/// Series holding the same value at every point.
pub fn constant_series(value: f64, length: usize) -> Result<TimeSeries, SeriesError> {
    TimeSeries::new(daily_index(length), vec![value; length])
}

/// Linear ramp from `start_value` to `end_value` inclusive.
pub fn linear_series(
    start_value: f64,
    end_value: f64,
    length: usize,
) -> Result<TimeSeries, SeriesError> {
    let values = if length == 1 {
        vec![start_value]
    } else {
        let span = end_value - start_value;
        (0..length)
            .map(|i| start_value + span * i as f64 / (length - 1) as f64)
            .collect()
    };
    TimeSeries::new(daily_index(length), values)
}

/// Sine wave sampled once per point: `amplitude * sin(tau * frequency * i)`.
///
/// `frequency` is in cycles per point, so `0.1` completes one full cycle
/// every ten points.
pub fn sine_series(
    frequency: f64,
    amplitude: f64,
    length: usize,
) -> Result<TimeSeries, SeriesError> {
    let values = (0..length)
        .map(|i| amplitude * (TAU * frequency * i as f64).sin())
        .collect();
    TimeSeries::new(daily_index(length), values)
}

/// Gaussian random walk: cumulative sum of `Normal(mean, std_dev)` draws.
///
/// The same seed always produces the same walk.
pub fn random_walk_series(
    mean: f64,
    std_dev: f64,
    length: usize,
    seed: u64,
) -> Result<TimeSeries, SeriesError> {
    let normal = Normal::new(mean, std_dev).map_err(|_| {
        SeriesError::InvalidParameter(format!(
            "random walk requires a positive std_dev, got {std_dev}"
        ))
    })?;
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut level = 0.0;
    let mut values = Vec::with_capacity(length);
    for _ in 0..length {
        level += normal.sample(&mut rng);
        values.push(level);
    }
    TimeSeries::new(daily_index(length), values)
}
