//! Parallel candidate selection.
//!
//! Runs the same rolling-origin evaluation over a set of named forecaster
//! factories and ranks them by aggregate score. Candidates evaluate in
//! parallel; each one fits its own fresh model instance, and the windows
//! within one evaluation stay strictly sequential.

use std::cmp::Ordering;

use rayon::prelude::*;
use serde::Serialize;
use statrs::statistics::Statistics;
use tracing::info;

use super::{evaluate, EvaluationConfig, EvaluationError};
use crate::models::{BoxedForecaster, ExpSmoothing, NaiveDrift, NaiveMean, NaiveSeasonal};
use crate::series::TimeSeries;

/// A named forecaster factory entered into selection.
///
/// The factory builds a fresh instance per evaluation, so fitted state
/// never crosses between candidates or between repeated selections.
pub struct Candidate {
    name: String,
    factory: Box<dyn Fn() -> BoxedForecaster + Send + Sync>,
}

impl Candidate {
    pub fn new<F>(name: impl Into<String>, factory: F) -> Self
    where
        F: Fn() -> BoxedForecaster + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            factory: Box::new(factory),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Build a fresh model instance.
    pub fn create(&self) -> BoxedForecaster {
        (self.factory)()
    }

    /// The stock candidate set offered by the CLI: the naive baselines plus
    /// exponential smoothing with and without seasonality. The seasonal
    /// candidates take their period from `seasonal_periods`; zero falls back
    /// to last-value carry-forward and plain smoothing.
    pub fn baseline_set(seasonal_periods: usize) -> Vec<Candidate> {
        vec![
            Candidate::new("naive-mean", || Box::new(NaiveMean::new())),
            Candidate::new("naive-seasonal", move || {
                Box::new(NaiveSeasonal::new(seasonal_periods))
            }),
            Candidate::new("naive-drift", || Box::new(NaiveDrift::new())),
            Candidate::new("exp-smoothing", || Box::new(ExpSmoothing::default())),
            Candidate::new("seasonal-exp-smoothing", move || {
                Box::new(ExpSmoothing::default().with_seasonal_periods(seasonal_periods))
            }),
        ]
    }
}

/// One candidate's aggregate score.
#[derive(Debug, Clone, Serialize)]
pub struct SelectionOutcome {
    pub name: String,
    pub score: f64,
}

/// Ranking of all evaluated candidates.
#[derive(Debug, Clone, Serialize)]
pub struct SelectionReport {
    /// Ranked ascending by score; infinite scores sort last.
    pub outcomes: Vec<SelectionOutcome>,

    /// Mean of the finite scores, when any candidate produced one.
    pub score_mean: Option<f64>,

    /// Sample standard deviation of the finite scores, when at least two
    /// candidates produced one.
    pub score_std: Option<f64>,
}

impl SelectionReport {
    /// The winning candidate. The ranking is never empty.
    pub fn best(&self) -> &SelectionOutcome {
        &self.outcomes[0]
    }
}

/// Evaluate every candidate on `series` under one shared configuration and
/// rank the results.
///
/// Configuration errors surface immediately; a candidate whose model cannot
/// handle the data simply ranks last with an infinite score.
pub fn select_best(
    series: &TimeSeries,
    candidates: &[Candidate],
    config: &EvaluationConfig,
) -> Result<SelectionReport, EvaluationError> {
    if candidates.is_empty() {
        return Err(EvaluationError::NoCandidates);
    }

    info!("Evaluating {} candidates", candidates.len());
    let outcomes: Result<Vec<SelectionOutcome>, EvaluationError> = candidates
        .par_iter()
        .map(|candidate| {
            let mut model = candidate.create();
            let score = evaluate(series, &mut model, config)?;
            info!("Candidate {}: score {}", candidate.name(), score);
            Ok(SelectionOutcome {
                name: candidate.name().to_string(),
                score,
            })
        })
        .collect();
    let mut outcomes = outcomes?;

    outcomes.sort_by(|a, b| a.score.partial_cmp(&b.score).unwrap_or(Ordering::Equal));

    let finite: Vec<f64> = outcomes
        .iter()
        .map(|o| o.score)
        .filter(|s| s.is_finite())
        .collect();
    let score_mean = if finite.is_empty() {
        None
    } else {
        Some(finite.iter().mean())
    };
    let score_std = if finite.len() > 1 {
        Some(finite.iter().std_dev())
    } else {
        None
    };

    info!(
        "Selection complete: best = {} (score {})",
        outcomes[0].name, outcomes[0].score
    );
    Ok(SelectionReport {
        outcomes,
        score_mean,
        score_std,
    })
}
