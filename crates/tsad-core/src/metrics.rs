// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

/// Number of entries in a [`MetricTuple`].
pub const METRIC_COUNT: usize = 5;

/// Column names in tuple order, as written to the results file.
pub const METRIC_NAMES: [&str; METRIC_COUNT] = ["adj_auroc", "adj_ap", "adj_f1", "adj_p", "adj_r"];

/// Fixed-order detection metrics for one (run, entity) evaluation.
///
/// `f1`, `precision` and `recall` are point-adjusted at the best-F1 threshold.
/// Metrics that are not computable (for example when the labels contain no
/// anomalies) are `NaN`.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MetricTuple {
    pub auroc: f64,
    pub average_precision: f64,
    pub f1: f64,
    pub precision: f64,
    pub recall: f64,
}

impl MetricTuple {
    pub fn nan() -> Self {
        Self::from_array([f64::NAN; METRIC_COUNT])
    }

    pub fn as_array(&self) -> [f64; METRIC_COUNT] {
        [
            self.auroc,
            self.average_precision,
            self.f1,
            self.precision,
            self.recall,
        ]
    }

    pub fn from_array(values: [f64; METRIC_COUNT]) -> Self {
        let [auroc, average_precision, f1, precision, recall] = values;
        Self {
            auroc,
            average_precision,
            f1,
            precision,
            recall,
        }
    }

    pub fn has_nan(&self) -> bool {
        self.as_array().iter().any(|v| v.is_nan())
    }
}

#[cfg(test)]
mod tests {
    use super::{METRIC_NAMES, MetricTuple};

    #[test]
    fn array_order_matches_column_names() {
        let tuple = MetricTuple {
            auroc: 0.1,
            average_precision: 0.2,
            f1: 0.3,
            precision: 0.4,
            recall: 0.5,
        };
        assert_eq!(tuple.as_array(), [0.1, 0.2, 0.3, 0.4, 0.5]);
        assert_eq!(MetricTuple::from_array(tuple.as_array()), tuple);
        assert_eq!(METRIC_NAMES[2], "adj_f1");
    }

    #[test]
    fn nan_tuple_reports_nan() {
        assert!(MetricTuple::nan().has_nan());
        assert!(!MetricTuple::from_array([1.0; 5]).has_nan());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn metric_tuple_serializes_named_fields() {
        let tuple = MetricTuple::from_array([1.0, 0.5, 0.25, 0.125, 1.0]);
        let encoded = serde_json::to_string(&tuple).expect("tuple should serialize");
        assert!(encoded.contains("\"average_precision\":0.5"));
    }
}
