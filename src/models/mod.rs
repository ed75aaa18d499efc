//! Forecasting model contract and reference implementations.
//!
//! Every model implements [`Forecaster`]: fit on a training series, then
//! predict a fixed number of future steps. A call to `fit` replaces any
//! previously fitted state in full, so one instance can be refit across
//! rolling windows without state leaking between them.

use thiserror::Error;

use crate::series::TimeSeries;

pub mod baseline;
pub mod smoothing;

pub use baseline::{NaiveDrift, NaiveMean, NaiveSeasonal};
pub use smoothing::ExpSmoothing;

/// Errors a model can raise while fitting.
#[derive(Debug, Error)]
pub enum FitError {
    #[error("model requires at least {required} training points, got {available}")]
    InsufficientData { required: usize, available: usize },
}

/// Errors a model can raise while predicting.
#[derive(Debug, Error)]
pub enum PredictError {
    #[error("model has not been fitted")]
    Unfitted,

    #[error("forecast horizon must be positive")]
    ZeroHorizon,
}

/// Common interface for all forecasting models.
///
/// Object-safe; boxed trait objects are used throughout candidate selection.
pub trait Forecaster {
    /// Fit the model to a training series, replacing any prior fit.
    fn fit(&mut self, series: &TimeSeries) -> Result<(), FitError>;

    /// Predict the next `horizon` values after the training series.
    fn predict(&self, horizon: usize) -> Result<Vec<f64>, PredictError>;

    /// Display name of the model.
    fn name(&self) -> &str;
}

/// Boxed forecaster trait object.
pub type BoxedForecaster = Box<dyn Forecaster>;

impl Forecaster for BoxedForecaster {
    fn fit(&mut self, series: &TimeSeries) -> Result<(), FitError> {
        self.as_mut().fit(series)
    }

    fn predict(&self, horizon: usize) -> Result<Vec<f64>, PredictError> {
        self.as_ref().predict(horizon)
    }

    fn name(&self) -> &str {
        self.as_ref().name()
    }
}
