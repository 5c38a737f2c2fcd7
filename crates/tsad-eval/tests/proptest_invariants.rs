// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use proptest::prelude::*;
use proptest::test_runner::{Config as ProptestConfig, FileFailurePersistence};
use tsad_eval::{
    adjusted_f1_sweep, adjusted_metrics_at, anomaly_segments, evaluate, point_adjust,
};

const MIN_PROPTEST_CASES: u32 = 256;

fn proptest_cases() -> u32 {
    std::env::var("PROPTEST_CASES")
        .ok()
        .and_then(|raw| raw.parse::<u32>().ok())
        .map(|parsed| parsed.max(MIN_PROPTEST_CASES))
        .unwrap_or(MIN_PROPTEST_CASES)
}

/// Scores on a coarse grid so ties are common; both signed zeros appear.
fn scores_and_labels() -> impl Strategy<Value = (Vec<f64>, Vec<bool>)> {
    let grid = (0u8..25).prop_map(|v| if v == 24 { -0.0 } else { f64::from(v) / 8.0 - 1.0 });
    (1usize..80).prop_flat_map(move |n| {
        (
            prop::collection::vec(grid.clone(), n),
            prop::collection::vec(prop::bool::weighted(0.3), n),
        )
    })
}

fn same_metric(left: f64, right: f64) -> bool {
    (left.is_nan() && right.is_nan()) || (left - right).abs() <= 1e-12
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: proptest_cases(),
        failure_persistence: Some(Box::new(FileFailurePersistence::Off)),
        ..ProptestConfig::default()
    })]

    #[test]
    fn evaluate_is_invariant_under_increasing_transforms((scores, labels) in scores_and_labels()) {
        let base = evaluate(&scores, &labels).expect("valid input");
        let shifted = scores.iter().map(|s| 3.0 * s + 7.0).collect::<Vec<_>>();
        let squashed = scores.iter().map(|s| s.exp()).collect::<Vec<_>>();

        for transformed in [shifted, squashed] {
            let other = evaluate(&transformed, &labels).expect("valid input");
            for (left, right) in base.as_array().into_iter().zip(other.as_array()) {
                prop_assert!(same_metric(left, right), "{base:?} vs {other:?}");
            }
        }
    }

    #[test]
    fn evaluate_is_idempotent((scores, labels) in scores_and_labels()) {
        let first = evaluate(&scores, &labels).expect("valid input");
        let second = evaluate(&scores, &labels).expect("valid input");
        for (left, right) in first.as_array().into_iter().zip(second.as_array()) {
            prop_assert!(left.to_bits() == right.to_bits());
        }
    }

    #[test]
    fn sweep_matches_materialized_adjustment((scores, labels) in scores_and_labels()) {
        let sweep = adjusted_f1_sweep(&scores, &labels).expect("valid input");
        for point in sweep {
            let direct = adjusted_metrics_at(&scores, &labels, point.threshold).expect("valid input");
            prop_assert_eq!(point.true_positives, direct.true_positives);
            prop_assert_eq!(point.false_positives, direct.false_positives);
            prop_assert_eq!(point.false_negatives, direct.false_negatives);
        }
    }

    #[test]
    fn point_adjust_never_removes_predictions_or_touches_normals(
        (scores, labels) in scores_and_labels(),
        threshold in -1.0f64..2.0,
    ) {
        let predicted = scores.iter().map(|&s| s >= threshold).collect::<Vec<_>>();
        let adjusted = point_adjust(&predicted, &labels).expect("equal lengths");

        for idx in 0..labels.len() {
            if predicted[idx] {
                prop_assert!(adjusted[idx]);
            }
            if !labels[idx] {
                prop_assert_eq!(adjusted[idx], predicted[idx]);
            }
        }
        for (start, end) in anomaly_segments(&labels) {
            let hit = predicted[start..end].iter().any(|&p| p);
            prop_assert!(adjusted[start..end].iter().all(|&a| a == hit));
        }
    }

    #[test]
    fn any_single_hit_credits_full_segment(
        len in 1usize..20,
        prefix in 0usize..10,
        suffix in 0usize..10,
        hit_offset in 0usize..20,
    ) {
        let hit = prefix + hit_offset % len;
        let n = prefix + len + suffix;
        let labels = (0..n).map(|i| i >= prefix && i < prefix + len).collect::<Vec<_>>();
        let scores = (0..n).map(|i| if i == hit { 1.0 } else { 0.0 }).collect::<Vec<_>>();

        let point = adjusted_metrics_at(&scores, &labels, 1.0).expect("valid input");
        prop_assert_eq!(point.true_positives, len);
        prop_assert_eq!(point.recall, 1.0);
    }

    #[test]
    fn metrics_stay_in_unit_interval((scores, labels) in scores_and_labels()) {
        let metrics = evaluate(&scores, &labels).expect("valid input");
        let has_positive = labels.iter().any(|&l| l);
        for value in metrics.as_array() {
            if has_positive && labels.iter().any(|&l| !l) {
                prop_assert!((-1e-12..=1.0 + 1e-12).contains(&value), "{metrics:?}");
            }
        }
        if !has_positive {
            prop_assert!(metrics.f1.is_nan());
            prop_assert!(metrics.auroc.is_nan());
        }
    }
}
