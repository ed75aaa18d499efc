//! Naive baseline models.
//!
//! Cheap references every serious model has to beat: the training mean, the
//! last seasonal cycle repeated, and a straight-line drift.

use serde::{Deserialize, Serialize};

use super::{FitError, Forecaster, PredictError};
use crate::series::TimeSeries;

/// Predicts the mean of the training series at every step.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NaiveMean {
    mean: Option<f64>,
}

impl NaiveMean {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Forecaster for NaiveMean {
    fn fit(&mut self, series: &TimeSeries) -> Result<(), FitError> {
        let values = series.values();
        self.mean = Some(values.iter().sum::<f64>() / values.len() as f64);
        Ok(())
    }

    fn predict(&self, horizon: usize) -> Result<Vec<f64>, PredictError> {
        if horizon == 0 {
            return Err(PredictError::ZeroHorizon);
        }
        let mean = self.mean.ok_or(PredictError::Unfitted)?;
        Ok(vec![mean; horizon])
    }

    fn name(&self) -> &str {
        "naive-mean"
    }
}

/// Repeats the last `k` training values cyclically.
///
/// With `k = 1` this is last-value carry-forward. Fitting fails when the
/// training series is shorter than `k`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NaiveSeasonal {
    k: usize,
    last_cycle: Vec<f64>,
}

impl NaiveSeasonal {
    /// Seasonal naive with period `k`. A `k` of zero is treated as one.
    pub fn new(k: usize) -> Self {
        Self {
            k: k.max(1),
            last_cycle: Vec::new(),
        }
    }

    pub fn period(&self) -> usize {
        self.k
    }
}

impl Default for NaiveSeasonal {
    fn default() -> Self {
        Self::new(1)
    }
}

impl Forecaster for NaiveSeasonal {
    fn fit(&mut self, series: &TimeSeries) -> Result<(), FitError> {
        let n = series.len();
        if n < self.k {
            self.last_cycle.clear();
            return Err(FitError::InsufficientData {
                required: self.k,
                available: n,
            });
        }
        self.last_cycle = series.values()[n - self.k..].to_vec();
        Ok(())
    }

    fn predict(&self, horizon: usize) -> Result<Vec<f64>, PredictError> {
        if horizon == 0 {
            return Err(PredictError::ZeroHorizon);
        }
        if self.last_cycle.is_empty() {
            return Err(PredictError::Unfitted);
        }
        Ok((0..horizon)
            .map(|i| self.last_cycle[i % self.last_cycle.len()])
            .collect())
    }

    fn name(&self) -> &str {
        "naive-seasonal"
    }
}

/// Extrapolates the straight line through the first and last training
/// points. Needs at least two training points.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NaiveDrift {
    fitted: Option<DriftState>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct DriftState {
    last: f64,
    slope: f64,
}

impl NaiveDrift {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Forecaster for NaiveDrift {
    fn fit(&mut self, series: &TimeSeries) -> Result<(), FitError> {
        let n = series.len();
        if n < 2 {
            self.fitted = None;
            return Err(FitError::InsufficientData {
                required: 2,
                available: n,
            });
        }
        let values = series.values();
        let first = values[0];
        let last = values[n - 1];
        self.fitted = Some(DriftState {
            last,
            slope: (last - first) / (n - 1) as f64,
        });
        Ok(())
    }

    fn predict(&self, horizon: usize) -> Result<Vec<f64>, PredictError> {
        if horizon == 0 {
            return Err(PredictError::ZeroHorizon);
        }
        let state = self.fitted.ok_or(PredictError::Unfitted)?;
        Ok((1..=horizon)
            .map(|step| state.last + state.slope * step as f64)
            .collect())
    }

    fn name(&self) -> &str {
        "naive-drift"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_naive_mean_predicts_training_mean() {
        let ts = TimeSeries::from_values(vec![1.0, 2.0, 3.0, 4.0]).unwrap();
        let mut model = NaiveMean::new();
        model.fit(&ts).unwrap();
        assert_eq!(model.predict(3).unwrap(), vec![2.5, 2.5, 2.5]);
    }

    #[test]
    fn test_naive_mean_unfitted() {
        let model = NaiveMean::new();
        assert!(matches!(model.predict(1), Err(PredictError::Unfitted)));
    }

    #[test]
    fn test_naive_seasonal_repeats_last_cycle() {
        let ts = TimeSeries::from_values(vec![1.0, 2.0, 3.0, 10.0, 20.0, 30.0]).unwrap();
        let mut model = NaiveSeasonal::new(3);
        model.fit(&ts).unwrap();
        assert_eq!(
            model.predict(5).unwrap(),
            vec![10.0, 20.0, 30.0, 10.0, 20.0]
        );
    }

    #[test]
    fn test_naive_seasonal_last_value_default() {
        let ts = TimeSeries::from_values(vec![1.0, 2.0, 7.0]).unwrap();
        let mut model = NaiveSeasonal::default();
        model.fit(&ts).unwrap();
        assert_eq!(model.predict(2).unwrap(), vec![7.0, 7.0]);
    }

    #[test]
    fn test_naive_seasonal_insufficient_data() {
        let ts = TimeSeries::from_values(vec![1.0, 2.0]).unwrap();
        let mut model = NaiveSeasonal::new(5);
        assert!(matches!(
            model.fit(&ts),
            Err(FitError::InsufficientData {
                required: 5,
                available: 2
            })
        ));
        assert!(matches!(model.predict(1), Err(PredictError::Unfitted)));
    }

    #[test]
    fn test_naive_seasonal_zero_period_clamped() {
        assert_eq!(NaiveSeasonal::new(0).period(), 1);
    }

    #[test]
    fn test_naive_drift_extrapolates() {
        let ts = TimeSeries::from_values(vec![0.0, 1.0, 2.0, 3.0]).unwrap();
        let mut model = NaiveDrift::new();
        model.fit(&ts).unwrap();
        let forecast = model.predict(3).unwrap();
        assert_eq!(forecast, vec![4.0, 5.0, 6.0]);
    }

    #[test]
    fn test_naive_drift_needs_two_points() {
        let ts = TimeSeries::from_values(vec![5.0]).unwrap();
        let mut model = NaiveDrift::new();
        assert!(matches!(
            model.fit(&ts),
            Err(FitError::InsufficientData {
                required: 2,
                available: 1
            })
        ));
    }

    #[test]
    fn test_refit_replaces_state() {
        let first = TimeSeries::from_values(vec![1.0, 1.0, 1.0]).unwrap();
        let second = TimeSeries::from_values(vec![9.0, 9.0, 9.0]).unwrap();
        let mut model = NaiveSeasonal::default();
        model.fit(&first).unwrap();
        model.fit(&second).unwrap();
        assert_eq!(model.predict(1).unwrap(), vec![9.0]);
    }

    #[test]
    fn test_zero_horizon_rejected() {
        let ts = TimeSeries::from_values(vec![1.0, 2.0]).unwrap();
        let mut model = NaiveMean::new();
        model.fit(&ts).unwrap();
        assert!(matches!(model.predict(0), Err(PredictError::ZeroHorizon)));
    }
}
