// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use crate::TsadError;

/// Binary ground-truth anomaly labels, one per timestep.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LabelSequence {
    values: Vec<bool>,
}

impl LabelSequence {
    pub fn new(values: Vec<bool>) -> Self {
        Self { values }
    }

    /// Builds labels from 0/1 bytes; any other byte is rejected.
    pub fn from_binary(raw: &[u8]) -> Result<Self, TsadError> {
        if let Some((idx, val)) = raw
            .iter()
            .copied()
            .enumerate()
            .find(|(_, v)| *v != 0 && *v != 1)
        {
            return Err(TsadError::invalid_input(format!(
                "labels must contain only 0/1 values: index {idx} has {val}"
            )));
        }
        Ok(Self {
            values: raw.iter().map(|&v| v == 1).collect(),
        })
    }

    /// Builds labels from numeric cells that must be exactly 0.0 or 1.0.
    pub fn from_f64(raw: &[f64]) -> Result<Self, TsadError> {
        let mut values = Vec::with_capacity(raw.len());
        for (idx, &v) in raw.iter().enumerate() {
            if v == 0.0 {
                values.push(false);
            } else if v == 1.0 {
                values.push(true);
            } else {
                return Err(TsadError::invalid_input(format!(
                    "labels must contain only 0/1 values: index {idx} has {v}"
                )));
            }
        }
        Ok(Self { values })
    }

    pub fn as_slice(&self) -> &[bool] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn n_positive(&self) -> usize {
        self.values.iter().filter(|&&v| v).count()
    }

    /// True when no timestep is labelled anomalous.
    pub fn is_degenerate(&self) -> bool {
        self.n_positive() == 0
    }
}

impl From<Vec<bool>> for LabelSequence {
    fn from(values: Vec<bool>) -> Self {
        Self::new(values)
    }
}

#[cfg(test)]
mod tests {
    use super::LabelSequence;

    #[test]
    fn from_binary_accepts_zero_one_bytes() {
        let labels = LabelSequence::from_binary(&[0, 1, 1, 0]).expect("labels should parse");
        assert_eq!(labels.as_slice(), &[false, true, true, false]);
        assert_eq!(labels.n_positive(), 2);
        assert!(!labels.is_degenerate());
    }

    #[test]
    fn from_binary_rejects_other_bytes() {
        let err = LabelSequence::from_binary(&[0, 2]).expect_err("2 is not a label");
        assert!(err.to_string().contains("index 1 has 2"));
    }

    #[test]
    fn from_f64_rejects_fractional_values() {
        let err = LabelSequence::from_f64(&[0.0, 0.5]).expect_err("0.5 is not a label");
        assert!(err.to_string().contains("index 1 has 0.5"));
    }

    #[test]
    fn all_zero_labels_are_degenerate() {
        let labels = LabelSequence::from_f64(&[0.0, 0.0, 0.0]).expect("labels should parse");
        assert!(labels.is_degenerate());
        assert_eq!(labels.len(), 3);
    }
}
