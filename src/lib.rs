pub mod datasets;
pub mod evaluation;
pub mod metrics;
pub mod models;
pub mod series;

// Re-export commonly used types
pub use series::{SeriesError, TimeSeries};
pub use models::{BoxedForecaster, ExpSmoothing, FitError, Forecaster, NaiveDrift, NaiveMean, NaiveSeasonal, PredictError};
pub use metrics::{Metric, MetricFn};
pub use evaluation::{
    evaluate, evaluate_report, select_best, Candidate, EvaluationConfig, EvaluationError,
    EvaluationReport, EvaluationSchedule, Origin, SelectionOutcome, SelectionReport, WindowScore,
};
pub use datasets::{DatasetError, DatasetLoader, DatasetMetadata};
