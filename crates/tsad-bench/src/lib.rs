// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

//! Deterministic synthetic inputs shared by the benchmarks.

use tsad_core::{Series, TsadError};

pub fn lcg_next(state: &mut u64) -> u64 {
    *state = state
        .wrapping_mul(6364136223846793005)
        .wrapping_add(1442695040888963407);
    *state
}

/// Uniform sample in `[0, 1)` from the top 53 bits of the next LCG state.
pub fn lcg_unit(state: &mut u64) -> f64 {
    (lcg_next(state) >> 11) as f64 / (1u64 << 53) as f64
}

/// Labels with anomaly segments of `segment_len` starting every `period` steps.
pub fn periodic_labels(n: usize, period: usize, segment_len: usize) -> Vec<bool> {
    let period = period.max(1);
    (0..n).map(|t| t % period < segment_len).collect()
}

/// Noise scores, raised by 0.5 inside labelled segments.
pub fn noisy_scores(labels: &[bool], seed: u64) -> Vec<f64> {
    let mut state = seed;
    labels
        .iter()
        .map(|&anomalous| lcg_unit(&mut state) + if anomalous { 0.5 } else { 0.0 })
        .collect()
}

/// `n x d` series of smooth signals plus LCG noise.
pub fn synthetic_series(n: usize, d: usize, seed: u64) -> Result<Series, TsadError> {
    let mut state = seed;
    let mut values = Vec::with_capacity(n * d);
    for t in 0..n {
        for channel in 0..d {
            let x = t as f64 * 0.01 + channel as f64;
            values.push(x.sin() + 0.1 * lcg_unit(&mut state));
        }
    }
    Series::new(values, n, d)
}
