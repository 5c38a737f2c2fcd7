// SPDX-License-Identifier: MIT OR Apache-2.0

#![no_main]

#[path = "common.rs"]
mod common;

use libfuzzer_sys::fuzz_target;
use tsad_eval::{EvalConfig, PadPolicy, RankingBasis, ScoreAlignment, evaluate_run_with};

fn build_score(mode_seed: u8, raw: f64, quantized: i16) -> f64 {
    match mode_seed % 8 {
        0 => f64::NAN,
        1 => f64::INFINITY,
        2 => f64::NEG_INFINITY,
        3 => raw,
        4 => 0.0,
        _ => f64::from(quantized) / 64.0,
    }
}

fn build_pad(seed: u8) -> PadPolicy {
    match seed % 3 {
        0 => PadPolicy::Zero,
        1 => PadPolicy::MinScore,
        _ => PadPolicy::MaxScore,
    }
}

fuzz_target!(|data: &[u8]| {
    let mut cursor = common::ByteCursor::new(data);

    let n = common::bounded(cursor.next_u8(), 0, 160);
    let window_length = common::bounded(cursor.next_u8(), 0, 24);
    let alignment = if cursor.next_u8() & 1 == 0 {
        ScoreAlignment::PointWise
    } else {
        ScoreAlignment::Windowed { window_length }
    };

    // Usually consistent with the alignment, occasionally off by a few.
    let expected = match alignment {
        ScoreAlignment::PointWise => n,
        ScoreAlignment::Windowed { window_length } => {
            n.saturating_sub(window_length.saturating_sub(1))
        }
    };
    let score_count = if cursor.next_u8() % 8 == 0 {
        common::bounded(cursor.next_u8(), 0, 170)
    } else {
        expected
    };

    let raw = common::decode_f64_chunks(&cursor.take_padded(score_count * 8), score_count);
    let scores = raw
        .iter()
        .map(|&value| build_score(cursor.next_u8(), value, cursor.next_i16()))
        .collect::<Vec<_>>();
    let labels = (0..n)
        .map(|_| cursor.next_u8() % 5 == 0)
        .collect::<Vec<_>>();

    let config = EvalConfig {
        ranking: if cursor.next_u8() & 1 == 0 {
            RankingBasis::Raw
        } else {
            RankingBasis::SegmentAdjusted
        },
    };

    if let Ok(report) =
        evaluate_run_with(&scores, alignment, &labels, build_pad(cursor.next_u8()), &config)
    {
        for value in report.metrics.as_array() {
            assert!(value.is_nan() || (-1e-9..=1.0 + 1e-9).contains(&value));
        }
    }
});
