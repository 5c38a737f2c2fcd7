// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use crate::TsadError;

/// Zero-copy row-major view over `n` timesteps of `d` channels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SeriesView<'a> {
    values: &'a [f64],
    n: usize,
    d: usize,
}

impl<'a> SeriesView<'a> {
    /// Constructs a validated `SeriesView`.
    pub fn new(values: &'a [f64], n: usize, d: usize) -> Result<Self, TsadError> {
        if n == 0 {
            return Err(TsadError::invalid_input("n must be >= 1"));
        }
        if d == 0 {
            return Err(TsadError::invalid_input("d must be >= 1"));
        }

        let expected_len = n
            .checked_mul(d)
            .ok_or_else(|| TsadError::invalid_input("n*d overflow while validating shape"))?;
        if values.len() != expected_len {
            return Err(TsadError::invalid_input(format!(
                "value length mismatch: got {}, expected {expected_len} (n={n}, d={d})",
                values.len()
            )));
        }

        Ok(Self { values, n, d })
    }

    /// Number of timesteps.
    pub fn n(&self) -> usize {
        self.n
    }

    /// Number of channels.
    pub fn d(&self) -> usize {
        self.d
    }

    pub fn values(&self) -> &'a [f64] {
        self.values
    }

    pub fn is_univariate(&self) -> bool {
        self.d == 1
    }

    /// Returns row `t`, or `None` past the end.
    pub fn row(&self, t: usize) -> Option<&'a [f64]> {
        if t >= self.n {
            return None;
        }
        let start = t * self.d;
        Some(&self.values[start..start + self.d])
    }

    pub fn rows(&self) -> std::slice::ChunksExact<'a, f64> {
        self.values.chunks_exact(self.d)
    }

    /// Borrows rows `[start, end)` as a new view.
    pub fn slice_rows(&self, start: usize, end: usize) -> Result<SeriesView<'a>, TsadError> {
        if start >= end || end > self.n {
            return Err(TsadError::invalid_input(format!(
                "row range [{start}, {end}) is empty or out of bounds for n={}",
                self.n
            )));
        }
        Ok(Self {
            values: &self.values[start * self.d..end * self.d],
            n: end - start,
            d: self.d,
        })
    }

    pub fn to_owned_series(&self) -> Series {
        Series {
            values: self.values.to_vec(),
            n: self.n,
            d: self.d,
        }
    }
}

/// Owned row-major multivariate series.
#[derive(Clone, Debug, PartialEq)]
pub struct Series {
    values: Vec<f64>,
    n: usize,
    d: usize,
}

impl Series {
    pub fn new(values: Vec<f64>, n: usize, d: usize) -> Result<Self, TsadError> {
        SeriesView::new(values.as_slice(), n, d)?;
        Ok(Self { values, n, d })
    }

    /// Builds a series from per-timestep rows; every row must share the channel count.
    pub fn from_rows<R: AsRef<[f64]>>(rows: &[R]) -> Result<Self, TsadError> {
        let first = rows
            .first()
            .ok_or_else(|| TsadError::invalid_input("series must contain at least one row"))?;
        let d = first.as_ref().len();
        let mut values = Vec::with_capacity(rows.len() * d);
        for (idx, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            if row.len() != d {
                return Err(TsadError::invalid_input(format!(
                    "row {idx} has {} channels but expected {d}",
                    row.len()
                )));
            }
            values.extend_from_slice(row);
        }
        Self::new(values, rows.len(), d)
    }

    /// Univariate convenience constructor.
    pub fn univariate(values: Vec<f64>) -> Result<Self, TsadError> {
        let n = values.len();
        Self::new(values, n, 1)
    }

    pub fn view(&self) -> SeriesView<'_> {
        SeriesView {
            values: self.values.as_slice(),
            n: self.n,
            d: self.d,
        }
    }

    pub fn n(&self) -> usize {
        self.n
    }

    pub fn d(&self) -> usize {
        self.d
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Stacks `self` followed by `other`; both must have the same channel count.
    pub fn concat(&self, other: &Series) -> Result<Series, TsadError> {
        if self.d != other.d {
            return Err(TsadError::invalid_input(format!(
                "cannot concatenate series with d={} and d={}",
                self.d, other.d
            )));
        }
        let mut values = Vec::with_capacity(self.values.len() + other.values.len());
        values.extend_from_slice(&self.values);
        values.extend_from_slice(&other.values);
        Series::new(values, self.n + other.n, self.d)
    }
}

/// Contiguous fixed-length slice of a series starting at `start`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SubSequence<'a> {
    pub start: usize,
    pub view: SeriesView<'a>,
}

impl SubSequence<'_> {
    /// Exclusive end index in the parent series.
    pub fn end(&self) -> usize {
        self.start + self.view.n()
    }

    pub fn len(&self) -> usize {
        self.view.n()
    }

    pub fn is_empty(&self) -> bool {
        self.view.n() == 0
    }
}
