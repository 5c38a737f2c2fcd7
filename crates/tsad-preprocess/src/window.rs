// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use std::iter::FusedIterator;
use tsad_core::{SeriesView, SubSequence, TsadError};

/// Number of windows of length `seq_len` taken every `stride` rows from `n` rows.
///
/// Returns 0 when `n < seq_len` or either parameter is zero.
pub fn window_count(n: usize, seq_len: usize, stride: usize) -> usize {
    if seq_len == 0 || stride == 0 || n < seq_len {
        return 0;
    }
    (n - seq_len) / stride + 1
}

fn validate_window_params(seq_len: usize, stride: usize) -> Result<(), TsadError> {
    if seq_len == 0 {
        return Err(TsadError::invalid_input("seq_len must be >= 1; got 0"));
    }
    if stride == 0 {
        return Err(TsadError::invalid_input("stride must be >= 1; got 0"));
    }
    Ok(())
}

/// Slices `series` into windows `[i, i + seq_len)` for `i = 0, stride, 2*stride, ...`.
///
/// A trailing remainder shorter than `seq_len` is dropped; a series shorter
/// than `seq_len` yields no windows.
pub fn make_windows<'a>(
    series: &SeriesView<'a>,
    seq_len: usize,
    stride: usize,
) -> Result<Vec<SubSequence<'a>>, TsadError> {
    Ok(sub_sequences(series, seq_len, stride)?.collect())
}

/// Lazy form of [`make_windows`].
pub fn sub_sequences<'a>(
    series: &SeriesView<'a>,
    seq_len: usize,
    stride: usize,
) -> Result<SubSequences<'a>, TsadError> {
    validate_window_params(seq_len, stride)?;
    Ok(SubSequences {
        series: *series,
        seq_len,
        stride,
        next_start: 0,
        remaining: window_count(series.n(), seq_len, stride),
    })
}

/// Iterator over sub-sequence windows in increasing start order.
#[derive(Clone, Debug)]
pub struct SubSequences<'a> {
    series: SeriesView<'a>,
    seq_len: usize,
    stride: usize,
    next_start: usize,
    remaining: usize,
}

impl<'a> Iterator for SubSequences<'a> {
    type Item = SubSequence<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let start = self.next_start;
        let view = self.series.slice_rows(start, start + self.seq_len).ok()?;
        self.remaining -= 1;
        self.next_start += self.stride;
        Some(SubSequence { start, view })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for SubSequences<'_> {}

impl FusedIterator for SubSequences<'_> {}

/// Dense `(count, seq_len, d)` copy of a set of equally shaped windows.
#[derive(Clone, Debug, PartialEq)]
pub struct WindowBatch {
    values: Vec<f64>,
    starts: Vec<usize>,
    seq_len: usize,
    d: usize,
}

impl WindowBatch {
    pub fn from_windows(windows: &[SubSequence<'_>]) -> Result<Self, TsadError> {
        let first = windows
            .first()
            .ok_or_else(|| TsadError::invalid_input("cannot batch an empty window set"))?;
        let seq_len = first.view.n();
        let d = first.view.d();

        let mut values = Vec::with_capacity(windows.len() * seq_len * d);
        let mut starts = Vec::with_capacity(windows.len());
        for (idx, window) in windows.iter().enumerate() {
            if window.view.n() != seq_len || window.view.d() != d {
                return Err(TsadError::invalid_input(format!(
                    "window {idx} has shape ({}, {}) but expected ({seq_len}, {d})",
                    window.view.n(),
                    window.view.d()
                )));
            }
            values.extend_from_slice(window.view.values());
            starts.push(window.start);
        }

        Ok(Self {
            values,
            starts,
            seq_len,
            d,
        })
    }

    pub fn count(&self) -> usize {
        self.starts.len()
    }

    pub fn seq_len(&self) -> usize {
        self.seq_len
    }

    pub fn d(&self) -> usize {
        self.d
    }

    /// Flattened length of a single window (`seq_len * d`).
    pub fn row_width(&self) -> usize {
        self.seq_len * self.d
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn starts(&self) -> &[usize] {
        &self.starts
    }

    pub fn window(&self, idx: usize) -> Option<SeriesView<'_>> {
        if idx >= self.count() {
            return None;
        }
        let width = self.row_width();
        SeriesView::new(
            &self.values[idx * width..(idx + 1) * width],
            self.seq_len,
            self.d,
        )
        .ok()
    }
}

#[cfg(test)]
mod tests {
    use super::{WindowBatch, make_windows, sub_sequences, window_count};
    use tsad_core::Series;

    fn ramp(n: usize, d: usize) -> Series {
        let values = (0..n * d).map(|v| v as f64).collect();
        Series::new(values, n, d).expect("ramp should build")
    }

    #[test]
    fn length_ten_window_three_stride_one_yields_eight_windows() {
        let series = ramp(10, 1);
        let windows = make_windows(&series.view(), 3, 1).expect("windows");

        assert_eq!(windows.len(), 8);
        let starts = windows.iter().map(|w| w.start).collect::<Vec<_>>();
        assert_eq!(starts, (0..8).collect::<Vec<_>>());
        assert_eq!(windows[7].view.values(), &[7.0, 8.0, 9.0]);
    }

    #[test]
    fn trailing_remainder_is_dropped() {
        let series = ramp(10, 2);
        let windows = make_windows(&series.view(), 4, 3).expect("windows");

        let starts = windows.iter().map(|w| w.start).collect::<Vec<_>>();
        assert_eq!(starts, vec![0, 3, 6]);
        assert!(windows.iter().all(|w| w.end() <= 10 && w.len() == 4));
        assert_eq!(windows[1].view.row(0), Some(&[6.0, 7.0][..]));
    }

    #[test]
    fn short_series_yields_no_windows() {
        let series = ramp(2, 1);
        let windows = make_windows(&series.view(), 5, 1).expect("short series is not an error");
        assert!(windows.is_empty());
        assert_eq!(window_count(2, 5, 1), 0);
    }

    #[test]
    fn rejects_zero_seq_len_and_stride() {
        let series = ramp(4, 1);
        let err = make_windows(&series.view(), 0, 1).expect_err("seq_len=0 must fail");
        assert!(err.to_string().contains("seq_len must be >= 1"));
        let err = make_windows(&series.view(), 2, 0).expect_err("stride=0 must fail");
        assert!(err.to_string().contains("stride must be >= 1"));
    }

    #[test]
    fn lazy_iterator_is_exact_size_and_restartable() {
        let series = ramp(9, 1);
        let iter = sub_sequences(&series.view(), 3, 2).expect("iterator");
        assert_eq!(iter.len(), 4);

        let first_pass = iter.clone().map(|w| w.start).collect::<Vec<_>>();
        let second_pass = iter.map(|w| w.start).collect::<Vec<_>>();
        assert_eq!(first_pass, vec![0, 2, 4, 6]);
        assert_eq!(first_pass, second_pass);
    }

    #[test]
    fn window_batch_copies_windows_contiguously() {
        let series = ramp(5, 2);
        let windows = make_windows(&series.view(), 2, 2).expect("windows");
        let batch = WindowBatch::from_windows(&windows).expect("batch");

        assert_eq!(batch.count(), 2);
        assert_eq!(batch.row_width(), 4);
        assert_eq!(batch.starts(), &[0, 2]);
        assert_eq!(batch.values(), &[0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0]);
        let second = batch.window(1).expect("second window");
        assert_eq!(second.row(1), Some(&[6.0, 7.0][..]));
        assert!(batch.window(2).is_none());
    }

    #[test]
    fn window_batch_rejects_empty_input() {
        assert!(WindowBatch::from_windows(&[]).is_err());
    }
}
