//! Error metrics and name resolution.
//!
//! A metric is either one of the registered names below or an arbitrary
//! caller-supplied function. Names resolve through a closed registry at
//! configuration time, so a typo fails before any model is trained.

use crate::series::TimeSeries;

pub mod accuracy;

pub use accuracy::{mae, mape, marre, mse, ope, rmse, rmsle, smape};

/// Signature shared by every metric: actual continuation, then forecast.
pub type MetricFn = fn(&TimeSeries, &TimeSeries) -> f64;

/// Metric names accepted by [`Metric::resolve`].
pub const KNOWN_METRICS: &[&str] = &[
    "mae", "mse", "rmse", "rmsle", "mape", "smape", "marre", "ope",
];

/// A metric given by registered name or directly as a function.
#[derive(Debug, Clone)]
pub enum Metric {
    /// Resolved through the registry; unknown names are rejected at
    /// configuration time.
    Named(String),
    /// Used as supplied; runtime behavior (including non-finite outputs)
    /// is tolerated, not validated.
    Custom(MetricFn),
}

impl Metric {
    /// Look the metric up in the registry. `None` means an unknown name;
    /// custom functions always resolve.
    pub fn resolve(&self) -> Option<MetricFn> {
        match self {
            Metric::Custom(f) => Some(*f),
            Metric::Named(name) => registry_lookup(name),
        }
    }

    /// Name for error messages and logs.
    pub fn describe(&self) -> &str {
        match self {
            Metric::Named(name) => name,
            Metric::Custom(_) => "custom",
        }
    }
}

impl Default for Metric {
    fn default() -> Self {
        Metric::Named("mape".to_string())
    }
}

impl From<&str> for Metric {
    fn from(name: &str) -> Self {
        Metric::Named(name.to_string())
    }
}

impl From<String> for Metric {
    fn from(name: String) -> Self {
        Metric::Named(name)
    }
}

impl From<MetricFn> for Metric {
    fn from(f: MetricFn) -> Self {
        Metric::Custom(f)
    }
}

fn registry_lookup(name: &str) -> Option<MetricFn> {
    match name.to_lowercase().as_str() {
        "mae" => Some(accuracy::mae as MetricFn),
        "mse" => Some(accuracy::mse as MetricFn),
        "rmse" => Some(accuracy::rmse as MetricFn),
        "rmsle" => Some(accuracy::rmsle as MetricFn),
        "mape" => Some(accuracy::mape as MetricFn),
        "smape" => Some(accuracy::smape as MetricFn),
        "marre" => Some(accuracy::marre as MetricFn),
        "ope" => Some(accuracy::ope as MetricFn),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_known_name_resolves() {
        for name in KNOWN_METRICS {
            assert!(
                Metric::from(*name).resolve().is_some(),
                "{name} should resolve"
            );
        }
    }

    #[test]
    fn test_resolution_is_case_insensitive() {
        assert!(Metric::from("MAPE").resolve().is_some());
    }

    #[test]
    fn test_unknown_name_fails() {
        assert!(Metric::from("plop").resolve().is_none());
    }

    #[test]
    fn test_named_resolves_to_same_function() {
        let resolved = Metric::from("mae").resolve().unwrap();
        let actual = TimeSeries::from_values(vec![1.0, 2.0]).unwrap();
        let predicted = TimeSeries::from_values(vec![2.0, 3.0]).unwrap();
        assert_eq!(
            resolved(&actual, &predicted),
            accuracy::mae(&actual, &predicted)
        );
    }

    #[test]
    fn test_custom_function_passes_through() {
        fn blended(a: &TimeSeries, p: &TimeSeries) -> f64 {
            0.5 * accuracy::mape(a, p) + 0.5 * accuracy::mae(a, p)
        }
        let metric = Metric::from(blended as MetricFn);
        assert!(metric.resolve().is_some());
        assert_eq!(metric.describe(), "custom");
    }

    #[test]
    fn test_default_is_mape() {
        assert_eq!(Metric::default().describe(), "mape");
    }
}
