//! Rolling-origin evaluation.
//!
//! Repeatedly refits a model on a growing prefix of a series, forecasts a
//! fixed horizon, scores the forecast against the actual continuation, and
//! aggregates the per-window scores into one scalar:
//! - configuration problems (bad stride, impossible origin, unknown metric)
//!   fail fast before any model is trained;
//! - per-window problems (model cannot fit, metric undefined on the window)
//!   score that window as positive infinity and never abort the run.

use chrono::NaiveDate;
use serde::Serialize;
use thiserror::Error;
use tracing::warn;

use crate::metrics::{Metric, MetricFn};
use crate::models::Forecaster;
use crate::series::TimeSeries;

pub mod schedule;
pub mod selection;

pub use schedule::EvaluationSchedule;
pub use selection::{select_best, Candidate, SelectionOutcome, SelectionReport};

/// Errors rejected at configuration time, before any window runs.
#[derive(Debug, Error)]
pub enum EvaluationError {
    #[error("stride must be a positive integer")]
    InvalidStride,

    #[error("forecast horizon must be a positive integer")]
    InvalidHorizon,

    #[error("n_prediction_steps must be a positive integer when given")]
    InvalidPredictionSteps,

    #[error("schedule is unbounded: provide a stride or n_prediction_steps")]
    UnboundedSchedule,

    #[error(
        "first origin {position} out of range: need 1 <= origin <= {len} - {horizon} \
         for a series of length {len} and horizon {horizon}"
    )]
    OriginOutOfRange {
        position: usize,
        len: usize,
        horizon: usize,
    },

    #[error("first origin {date} does not exist in the series index")]
    OriginNotInIndex { date: NaiveDate },

    #[error("unknown metric '{name}'")]
    UnknownMetric { name: String },

    #[error("computed schedule contains no origins")]
    EmptySchedule,

    #[error("candidate list is empty")]
    NoCandidates,
}

/// The cut point between training prefix and evaluation window, by
/// zero-based position or by a date present in the series index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    Position(usize),
    Date(NaiveDate),
}

impl From<usize> for Origin {
    fn from(position: usize) -> Self {
        Origin::Position(position)
    }
}

impl From<NaiveDate> for Origin {
    fn from(date: NaiveDate) -> Self {
        Origin::Date(date)
    }
}

/// Parameters of one rolling-origin evaluation.
#[derive(Debug, Clone)]
pub struct EvaluationConfig {
    /// Error metric; a registered name or a custom function.
    pub metric: Metric,

    /// Step between consecutive origins. Required unless
    /// `n_prediction_steps` is given, in which case it is inferred from the
    /// room left after the first origin.
    pub stride: Option<usize>,

    /// First origin by position or date. Defaults to the series midpoint.
    pub first_origin: Option<Origin>,

    /// Number of scheduled origins. Without it the schedule runs until no
    /// room remains for a full horizon.
    pub n_prediction_steps: Option<usize>,

    /// Steps forecast at each origin.
    pub forecast_horizon: usize,
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            metric: Metric::default(),
            stride: None,
            first_origin: None,
            n_prediction_steps: None,
            forecast_horizon: 1,
        }
    }
}

impl EvaluationConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_metric(mut self, metric: impl Into<Metric>) -> Self {
        self.metric = metric.into();
        self
    }

    pub fn with_stride(mut self, stride: usize) -> Self {
        self.stride = Some(stride);
        self
    }

    pub fn with_first_origin(mut self, origin: impl Into<Origin>) -> Self {
        self.first_origin = Some(origin.into());
        self
    }

    pub fn with_n_prediction_steps(mut self, steps: usize) -> Self {
        self.n_prediction_steps = Some(steps);
        self
    }

    pub fn with_forecast_horizon(mut self, horizon: usize) -> Self {
        self.forecast_horizon = horizon;
        self
    }
}

/// Score of a single evaluation window.
#[derive(Debug, Clone, Serialize)]
pub struct WindowScore {
    /// Origin position of the window.
    pub origin: usize,

    /// Steps actually forecast (trailing windows of a count-bounded
    /// schedule may be shorter than the configured horizon).
    pub horizon: usize,

    /// Metric value, or positive infinity for a contained failure.
    pub score: f64,
}

/// Per-window detail plus the aggregate score.
#[derive(Debug, Clone, Serialize)]
pub struct EvaluationReport {
    pub model: String,
    pub metric: String,
    pub windows: Vec<WindowScore>,
    pub aggregate: f64,
}

/// Run a rolling-origin evaluation and return the mean window score.
///
/// The result is positive infinity as soon as any window fails (model
/// refuses to fit, forecast has the wrong length, or the metric comes back
/// non-finite); remaining windows are skipped since the mean is already
/// determined. Custom metrics signal an undefined window by returning a
/// non-finite value.
pub fn evaluate<F: Forecaster>(
    series: &TimeSeries,
    forecaster: &mut F,
    config: &EvaluationConfig,
) -> Result<f64, EvaluationError> {
    let metric = resolve_metric(&config.metric)?;
    let schedule = EvaluationSchedule::compute(series, config)?;

    let mut total = 0.0;
    for &origin in schedule.origins() {
        let horizon = schedule.effective_horizon(origin, series.len());
        let score = run_window(series, forecaster, metric, origin, horizon);
        if score.is_infinite() {
            return Ok(f64::INFINITY);
        }
        total += score;
    }
    Ok(total / schedule.len() as f64)
}

/// Like [`evaluate`], but runs every scheduled window even after a failure
/// and returns per-window detail alongside the aggregate.
pub fn evaluate_report<F: Forecaster>(
    series: &TimeSeries,
    forecaster: &mut F,
    config: &EvaluationConfig,
) -> Result<EvaluationReport, EvaluationError> {
    let metric = resolve_metric(&config.metric)?;
    let schedule = EvaluationSchedule::compute(series, config)?;

    let mut windows = Vec::with_capacity(schedule.len());
    for &origin in schedule.origins() {
        let horizon = schedule.effective_horizon(origin, series.len());
        let score = run_window(series, forecaster, metric, origin, horizon);
        windows.push(WindowScore {
            origin,
            horizon,
            score,
        });
    }
    let aggregate = windows.iter().map(|w| w.score).sum::<f64>() / windows.len() as f64;
    Ok(EvaluationReport {
        model: forecaster.name().to_string(),
        metric: config.metric.describe().to_string(),
        windows,
        aggregate,
    })
}

fn resolve_metric(metric: &Metric) -> Result<MetricFn, EvaluationError> {
    metric.resolve().ok_or_else(|| EvaluationError::UnknownMetric {
        name: metric.describe().to_string(),
    })
}

/// Fit, forecast, and score one window. Failures are contained: the window
/// scores positive infinity and the caller decides what to do with it.
fn run_window<F: Forecaster>(
    series: &TimeSeries,
    forecaster: &mut F,
    metric: MetricFn,
    origin: usize,
    horizon: usize,
) -> f64 {
    let train = series.slice(0, origin);
    if let Err(err) = forecaster.fit(&train) {
        warn!("window at origin {}: fit failed ({}), scoring as infinite", origin, err);
        return f64::INFINITY;
    }
    let predicted = match forecaster.predict(horizon) {
        Ok(values) => values,
        Err(err) => {
            warn!("window at origin {}: predict failed ({}), scoring as infinite", origin, err);
            return f64::INFINITY;
        }
    };

    let actual = series.slice(origin, origin + horizon);
    let forecast = match TimeSeries::new(actual.index().to_vec(), predicted) {
        Ok(ts) => ts,
        Err(err) => {
            warn!("window at origin {}: unusable forecast ({}), scoring as infinite", origin, err);
            return f64::INFINITY;
        }
    };

    let score = metric(&actual, &forecast);
    if score.is_finite() {
        score
    } else {
        warn!("window at origin {}: metric undefined, scoring as infinite", origin);
        f64::INFINITY
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::{accuracy, MetricFn};
    use crate::models::{
        ExpSmoothing, FitError, Forecaster, NaiveDrift, NaiveMean, NaiveSeasonal, PredictError,
    };
    use crate::series::generation::{constant_series, linear_series, random_walk_series};
    use crate::series::TimeSeries;
    use chrono::NaiveDate;

    fn walk() -> TimeSeries {
        random_walk_series(0.0, 1.0, 50, 42).unwrap()
    }

    #[test]
    fn test_zero_stride_rejected() {
        let result = evaluate(
            &walk(),
            &mut NaiveSeasonal::default(),
            &EvaluationConfig::new().with_stride(0).with_n_prediction_steps(10),
        );
        assert!(matches!(result, Err(EvaluationError::InvalidStride)));
    }

    #[test]
    fn test_missing_stopping_rule_rejected() {
        let result = evaluate(
            &walk(),
            &mut NaiveSeasonal::default(),
            &EvaluationConfig::new(),
        );
        assert!(matches!(result, Err(EvaluationError::UnboundedSchedule)));
    }

    #[test]
    fn test_stride_alone_is_a_valid_stopping_rule() {
        let result = evaluate(
            &walk(),
            &mut NaiveSeasonal::default(),
            &EvaluationConfig::new().with_stride(5),
        );
        assert!(result.is_ok());
    }

    #[test]
    fn test_prediction_steps_alone_is_a_valid_stopping_rule() {
        let result = evaluate(
            &walk(),
            &mut NaiveSeasonal::default(),
            &EvaluationConfig::new().with_n_prediction_steps(9),
        );
        assert!(result.is_ok());
    }

    #[test]
    fn test_integer_origin_bounds() {
        let series = walk();
        for accepted in [2usize, 48, 49] {
            let result = evaluate(
                &series,
                &mut NaiveSeasonal::default(),
                &EvaluationConfig::new().with_stride(1).with_first_origin(accepted),
            );
            assert!(result.is_ok(), "origin {accepted} should be accepted");
        }
        for rejected in [0usize, 50, 52] {
            let result = evaluate(
                &series,
                &mut NaiveSeasonal::default(),
                &EvaluationConfig::new().with_stride(1).with_first_origin(rejected),
            );
            assert!(
                matches!(result, Err(EvaluationError::OriginOutOfRange { .. })),
                "origin {rejected} should be rejected"
            );
        }
    }

    #[test]
    fn test_timestamp_origin_bounds() {
        let series = walk();
        let date = |m: u32, d: u32| NaiveDate::from_ymd_opt(2000, m, d).unwrap();

        for accepted in [date(1, 3), date(2, 18)] {
            let result = evaluate(
                &series,
                &mut NaiveSeasonal::default(),
                &EvaluationConfig::new().with_stride(1).with_first_origin(accepted),
            );
            assert!(result.is_ok(), "origin {accepted} should be accepted");
        }

        // The very first date leaves no training data.
        let result = evaluate(
            &series,
            &mut NaiveSeasonal::default(),
            &EvaluationConfig::new().with_stride(1).with_first_origin(date(1, 1)),
        );
        assert!(matches!(
            result,
            Err(EvaluationError::OriginOutOfRange { position: 0, .. })
        ));

        // Past the end of a 50-point daily index starting 2000-01-01.
        let result = evaluate(
            &series,
            &mut NaiveSeasonal::default(),
            &EvaluationConfig::new().with_stride(1).with_first_origin(date(2, 25)),
        );
        assert!(matches!(result, Err(EvaluationError::OriginNotInIndex { .. })));
    }

    #[test]
    fn test_named_and_custom_metric_agree() {
        let series = walk();
        let config = EvaluationConfig::new().with_stride(5);
        let by_name = evaluate(&series, &mut NaiveSeasonal::default(), &config).unwrap();
        let by_func = evaluate(
            &series,
            &mut NaiveSeasonal::default(),
            &config.clone().with_metric(accuracy::mape as MetricFn),
        )
        .unwrap();
        assert_eq!(by_name, by_func);
    }

    #[test]
    fn test_blended_custom_metric_accepted() {
        fn blended(a: &TimeSeries, p: &TimeSeries) -> f64 {
            0.5 * accuracy::mape(a, p) + 0.5 * accuracy::mae(a, p)
        }
        let result = evaluate(
            &walk(),
            &mut NaiveSeasonal::default(),
            &EvaluationConfig::new().with_stride(5).with_metric(blended as MetricFn),
        );
        assert!(result.unwrap().is_finite());
    }

    #[test]
    fn test_unknown_metric_name_rejected() {
        let result = evaluate(
            &walk(),
            &mut NaiveSeasonal::default(),
            &EvaluationConfig::new().with_stride(5).with_metric("plop"),
        );
        assert!(matches!(
            result,
            Err(EvaluationError::UnknownMetric { name }) if name == "plop"
        ));
    }

    #[test]
    fn test_percentage_metric_on_zero_series_is_infinite() {
        let series = constant_series(0.0, 50).unwrap();
        let score = evaluate(
            &series,
            &mut NaiveSeasonal::default(),
            &EvaluationConfig::new().with_stride(1),
        )
        .unwrap();
        assert_eq!(score, f64::INFINITY);
    }

    #[test]
    fn test_model_fit_failure_is_infinite() {
        let series = walk();
        let mut model = ExpSmoothing::default().with_seasonal_periods(10);
        let score = evaluate(
            &series,
            &mut model,
            &EvaluationConfig::new().with_stride(1).with_first_origin(5usize),
        )
        .unwrap();
        assert_eq!(score, f64::INFINITY);
    }

    #[test]
    fn test_aggregate_is_mean_of_window_scores() {
        // NaiveMean at origins 3, 4, 5 with horizon 1 gives MAE 2, 2.5, 3.
        let series = TimeSeries::from_values(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap();
        let config = EvaluationConfig::new()
            .with_metric("mae")
            .with_stride(1)
            .with_first_origin(3usize);
        let score = evaluate(&series, &mut NaiveMean::new(), &config).unwrap();
        assert_eq!(score, 2.5);
    }

    #[test]
    fn test_last_value_model_on_unit_ramp() {
        // Carrying the last value forward is off by exactly one at each of
        // the three scheduled origins.
        let series = TimeSeries::from_values(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap();
        let config = EvaluationConfig::new()
            .with_metric("mae")
            .with_stride(1)
            .with_first_origin(3usize);
        let score = evaluate(&series, &mut NaiveSeasonal::default(), &config).unwrap();
        assert_eq!(score, 1.0);
    }

    #[test]
    fn test_repeated_calls_are_identical() {
        let series = walk();
        let config = EvaluationConfig::new().with_stride(3).with_forecast_horizon(2);
        let mut model = NaiveSeasonal::default();
        let first = evaluate(&series, &mut model, &config).unwrap();
        let second = evaluate(&series, &mut model, &config).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_position_and_equivalent_date_agree() {
        let series = walk();
        let by_position = EvaluationConfig::new().with_stride(2).with_first_origin(25usize);
        let by_date = EvaluationConfig::new()
            .with_stride(2)
            .with_first_origin(NaiveDate::from_ymd_opt(2000, 1, 26).unwrap());
        let a = evaluate(&series, &mut NaiveSeasonal::default(), &by_position).unwrap();
        let b = evaluate(&series, &mut NaiveSeasonal::default(), &by_date).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_count_bounded_schedule_truncates_trailing_windows() {
        // Drift extrapolation is exact on a unit ramp, so every window of
        // the count-bounded schedule scores zero, truncated ones included.
        let series = linear_series(0.0, 49.0, 50).unwrap();
        let config = EvaluationConfig::new()
            .with_metric("mae")
            .with_first_origin(35usize)
            .with_n_prediction_steps(6)
            .with_forecast_horizon(10);
        let report = evaluate_report(&series, &mut NaiveDrift::new(), &config).unwrap();
        assert_eq!(report.windows.len(), 6);
        let horizons: Vec<usize> = report.windows.iter().map(|w| w.horizon).collect();
        assert_eq!(horizons, vec![10, 10, 10, 9, 7, 5]);
        let origins: Vec<usize> = report.windows.iter().map(|w| w.origin).collect();
        assert_eq!(origins, vec![35, 37, 39, 41, 43, 45]);
        assert_eq!(report.aggregate, 0.0);
    }

    #[test]
    fn test_report_matches_evaluate_on_finite_runs() {
        let series = walk();
        let config = EvaluationConfig::new().with_stride(4).with_forecast_horizon(3);
        let score = evaluate(&series, &mut NaiveSeasonal::default(), &config).unwrap();
        let report = evaluate_report(&series, &mut NaiveSeasonal::default(), &config).unwrap();
        assert!((score - report.aggregate).abs() < 1e-12);
        assert_eq!(report.metric, "mape");
        assert_eq!(report.model, "naive-seasonal");
    }

    #[test]
    fn test_report_runs_all_windows_despite_failure() {
        let series = constant_series(0.0, 20).unwrap();
        let config = EvaluationConfig::new().with_stride(2);
        let report = evaluate_report(&series, &mut NaiveSeasonal::default(), &config).unwrap();
        assert!(report.windows.len() > 1);
        assert_eq!(report.aggregate, f64::INFINITY);
        assert!(report.windows.iter().all(|w| w.score == f64::INFINITY));
    }

    #[test]
    fn test_wrong_length_forecast_is_contained() {
        struct Stubborn;

        impl Forecaster for Stubborn {
            fn fit(&mut self, _series: &TimeSeries) -> Result<(), FitError> {
                Ok(())
            }

            fn predict(&self, _horizon: usize) -> Result<Vec<f64>, PredictError> {
                Ok(vec![1.0])
            }

            fn name(&self) -> &str {
                "stubborn"
            }
        }

        let score = evaluate(
            &walk(),
            &mut Stubborn,
            &EvaluationConfig::new().with_stride(5).with_forecast_horizon(3),
        )
        .unwrap();
        assert_eq!(score, f64::INFINITY);
    }
}
