//! Origin schedule computation.
//!
//! Validates the evaluation parameters against the series and turns them
//! into the ordered list of origin positions to evaluate at. Two stopping
//! modes exist: a count bound (`n_prediction_steps`) that keeps trailing
//! windows and truncates them to the data that remains, and natural
//! exhaustion, which only schedules full-horizon windows.

use serde::Serialize;
use tracing::debug;

use super::{EvaluationConfig, EvaluationError, Origin};
use crate::series::TimeSeries;

/// The immutable list of origins one evaluation will visit, in increasing
/// order, together with the configured horizon.
#[derive(Debug, Clone, Serialize)]
pub struct EvaluationSchedule {
    origins: Vec<usize>,
    horizon: usize,
}

impl EvaluationSchedule {
    /// Validate `config` against `series` and compute the schedule.
    pub fn compute(
        series: &TimeSeries,
        config: &EvaluationConfig,
    ) -> Result<Self, EvaluationError> {
        let len = series.len();
        let horizon = config.forecast_horizon;

        if horizon == 0 {
            return Err(EvaluationError::InvalidHorizon);
        }
        if config.stride == Some(0) {
            return Err(EvaluationError::InvalidStride);
        }
        if config.n_prediction_steps == Some(0) {
            return Err(EvaluationError::InvalidPredictionSteps);
        }

        let first_origin = normalize_origin(series, config)?;
        let leaves_room = first_origin
            .checked_add(horizon)
            .map_or(false, |end| end <= len);
        if first_origin < 1 || !leaves_room {
            return Err(EvaluationError::OriginOutOfRange {
                position: first_origin,
                len,
                horizon,
            });
        }

        let origins = match (config.n_prediction_steps, config.stride) {
            // Count-bounded: schedule up to `n` origins, dropping only the
            // candidates past the end of the series. Windows that start
            // inside the series but lack a full horizon stay scheduled and
            // are truncated at evaluation time.
            (Some(n), stride) => {
                let stride = match stride {
                    Some(s) => s,
                    None => ((len - first_origin) / n).max(1),
                };
                // A schedule can never hold more origins than positions.
                let mut origins = Vec::with_capacity(n.min(len));
                let mut origin = first_origin;
                for _ in 0..n {
                    if origin >= len {
                        break;
                    }
                    origins.push(origin);
                    origin = match origin.checked_add(stride) {
                        Some(next) => next,
                        None => break,
                    };
                }
                origins
            }
            // Natural exhaustion: advance until no room remains for a full
            // horizon.
            (None, Some(stride)) => {
                let mut origins = Vec::new();
                let mut origin = first_origin;
                while origin <= len - horizon {
                    origins.push(origin);
                    origin = match origin.checked_add(stride) {
                        Some(next) => next,
                        None => break,
                    };
                }
                origins
            }
            (None, None) => return Err(EvaluationError::UnboundedSchedule),
        };

        if origins.is_empty() {
            return Err(EvaluationError::EmptySchedule);
        }

        debug!(
            "schedule: {} origins from {} to {}, horizon {}",
            origins.len(),
            origins[0],
            origins[origins.len() - 1],
            horizon
        );
        Ok(Self { origins, horizon })
    }

    /// Scheduled origin positions, in increasing order.
    pub fn origins(&self) -> &[usize] {
        &self.origins
    }

    /// The configured forecast horizon.
    pub fn horizon(&self) -> usize {
        self.horizon
    }

    /// Number of scheduled origins.
    pub fn len(&self) -> usize {
        self.origins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.origins.is_empty()
    }

    /// Steps actually forecast at `origin`: the configured horizon, capped
    /// by the observations remaining in a series of `series_len` points.
    pub fn effective_horizon(&self, origin: usize, series_len: usize) -> usize {
        self.horizon.min(series_len - origin)
    }
}

fn normalize_origin(
    series: &TimeSeries,
    config: &EvaluationConfig,
) -> Result<usize, EvaluationError> {
    match config.first_origin {
        None => Ok(series.len() / 2),
        Some(Origin::Position(position)) => Ok(position),
        Some(Origin::Date(date)) => series
            .position_of(date)
            .ok_or(EvaluationError::OriginNotInIndex { date }),
    }
}
