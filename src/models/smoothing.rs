//! Exponential smoothing.
//!
//! Smoothed level with optional additive seasonal indices (Holt-Winters
//! form without a trend term). The seasonal variant needs two full cycles
//! of training data to initialize its indices.

use serde::{Deserialize, Serialize};

use super::{FitError, Forecaster, PredictError};
use crate::series::TimeSeries;

/// Exponentially smoothed level forecaster.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpSmoothing {
    /// Level smoothing factor in `(0, 1]`; out-of-range values are clamped.
    alpha: f64,

    /// Seasonal smoothing factor in `(0, 1]`; out-of-range values are clamped.
    gamma: f64,

    /// Season length in points; `None` fits a plain smoothed level.
    seasonal_periods: Option<usize>,

    state: Option<SmoothingState>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct SmoothingState {
    level: f64,
    season: Vec<f64>,
    phase: usize,
}

const MIN_SMOOTHING: f64 = 1e-4;

impl ExpSmoothing {
    pub fn new(alpha: f64) -> Self {
        Self {
            alpha: alpha.clamp(MIN_SMOOTHING, 1.0),
            ..Self::default()
        }
    }

    /// Enable additive seasonality with the given period. Zero disables it.
    pub fn with_seasonal_periods(mut self, periods: usize) -> Self {
        self.seasonal_periods = if periods == 0 { None } else { Some(periods) };
        self
    }

    pub fn with_gamma(mut self, gamma: f64) -> Self {
        self.gamma = gamma.clamp(MIN_SMOOTHING, 1.0);
        self
    }

    pub fn seasonal_periods(&self) -> Option<usize> {
        self.seasonal_periods
    }
}

impl Default for ExpSmoothing {
    fn default() -> Self {
        Self {
            alpha: 0.5,
            gamma: 0.1,
            seasonal_periods: None,
            state: None,
        }
    }
}

impl Forecaster for ExpSmoothing {
    fn fit(&mut self, series: &TimeSeries) -> Result<(), FitError> {
        let values = series.values();
        let n = values.len();

        let sp = match self.seasonal_periods {
            Some(sp) => sp,
            None => {
                let mut level = values[0];
                for &x in &values[1..] {
                    level = self.alpha * x + (1.0 - self.alpha) * level;
                }
                self.state = Some(SmoothingState {
                    level,
                    season: Vec::new(),
                    phase: 0,
                });
                return Ok(());
            }
        };

        // Two full cycles: one to initialize the indices, one to smooth them.
        let required = 2 * sp;
        if n < required {
            self.state = None;
            return Err(FitError::InsufficientData {
                required,
                available: n,
            });
        }

        let mut level = values[..sp].iter().sum::<f64>() / sp as f64;
        let mut season: Vec<f64> = values[..sp].iter().map(|&x| x - level).collect();
        for (t, &x) in values.iter().enumerate().skip(sp) {
            let idx = t % sp;
            let new_level = self.alpha * (x - season[idx]) + (1.0 - self.alpha) * level;
            season[idx] = self.gamma * (x - new_level) + (1.0 - self.gamma) * season[idx];
            level = new_level;
        }
        self.state = Some(SmoothingState {
            level,
            season,
            phase: n % sp,
        });
        Ok(())
    }

    fn predict(&self, horizon: usize) -> Result<Vec<f64>, PredictError> {
        if horizon == 0 {
            return Err(PredictError::ZeroHorizon);
        }
        let state = self.state.as_ref().ok_or(PredictError::Unfitted)?;
        if state.season.is_empty() {
            return Ok(vec![state.level; horizon]);
        }
        let sp = state.season.len();
        Ok((0..horizon)
            .map(|i| state.level + state.season[(state.phase + i) % sp])
            .collect())
    }

    fn name(&self) -> &str {
        "exp-smoothing"
    }
}
