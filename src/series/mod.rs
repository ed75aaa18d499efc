//! Univariate time series container.
//!
//! A [`TimeSeries`] pairs a strictly increasing date index with one value
//! per date. Construction validates the pairing once; everything downstream
//! (slicing, evaluation windows) relies on those invariants holding.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::ops::Add;
use thiserror::Error;

pub mod generation;

pub use generation::{constant_series, linear_series, random_walk_series, sine_series};

/// Start date used when a series is built from bare values.
pub const DEFAULT_START: NaiveDate = match NaiveDate::from_ymd_opt(2000, 1, 1) {
    Some(d) => d,
    None => NaiveDate::MIN,
};

/// Errors raised when constructing a [`TimeSeries`].
#[derive(Debug, Error)]
pub enum SeriesError {
    #[error("series must contain at least one observation")]
    Empty,

    #[error("index length {index} does not match value length {values}")]
    LengthMismatch { index: usize, values: usize },

    #[error("time index must be strictly increasing (violated at position {position})")]
    UnorderedIndex { position: usize },

    #[error("invalid generation parameter: {0}")]
    InvalidParameter(String),
}

/// An immutable univariate series: unique, strictly increasing dates with
/// one observation per date.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeSeries {
    index: Vec<NaiveDate>,
    values: Vec<f64>,
}

impl TimeSeries {
    /// Build a series from a date index and matching values.
    ///
    /// Rejects empty input, mismatched lengths, and an index that is not
    /// strictly increasing (duplicates included).
    pub fn new(index: Vec<NaiveDate>, values: Vec<f64>) -> Result<Self, SeriesError> {
        if index.is_empty() {
            return Err(SeriesError::Empty);
        }
        if index.len() != values.len() {
            return Err(SeriesError::LengthMismatch {
                index: index.len(),
                values: values.len(),
            });
        }
        for (i, pair) in index.windows(2).enumerate() {
            if pair[1] <= pair[0] {
                return Err(SeriesError::UnorderedIndex { position: i + 1 });
            }
        }
        Ok(Self { index, values })
    }

    /// Build a series on the default daily index starting [`DEFAULT_START`].
    pub fn from_values(values: Vec<f64>) -> Result<Self, SeriesError> {
        let index = generation::daily_index(values.len());
        Self::new(index, values)
    }

    /// Number of observations.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Always false for a constructed series; present for completeness.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// First date in the index.
    pub fn start(&self) -> NaiveDate {
        self.index[0]
    }

    /// Last date in the index.
    pub fn end(&self) -> NaiveDate {
        self.index[self.index.len() - 1]
    }

    /// The date index.
    pub fn index(&self) -> &[NaiveDate] {
        &self.index
    }

    /// The observed values.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Half-open positional slice `[start, end)` as a new series.
    ///
    /// Panics if the range is empty, inverted, or out of bounds. Callers
    /// slice ranges that schedule validation has already bounds-checked.
    pub fn slice(&self, start: usize, end: usize) -> TimeSeries {
        assert!(
            start < end && end <= self.index.len(),
            "slice range {start}..{end} out of bounds for series of length {}",
            self.index.len()
        );
        TimeSeries {
            index: self.index[start..end].to_vec(),
            values: self.values[start..end].to_vec(),
        }
    }

    /// Position of `date` in the index, if present.
    pub fn position_of(&self, date: NaiveDate) -> Option<usize> {
        self.index.binary_search(&date).ok()
    }
}

impl Add for &TimeSeries {
    type Output = TimeSeries;

    /// Element-wise sum of two series sharing the same index.
    ///
    /// Panics if the indexes differ.
    fn add(self, rhs: &TimeSeries) -> TimeSeries {
        assert_eq!(
            self.index, rhs.index,
            "cannot add series with different time indexes"
        );
        let values = self
            .values
            .iter()
            .zip(rhs.values.iter())
            .map(|(a, b)| a + b)
            .collect();
        TimeSeries {
            index: self.index.clone(),
            values,
        }
    }
}
