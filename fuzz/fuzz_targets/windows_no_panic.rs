// SPDX-License-Identifier: MIT OR Apache-2.0

#![no_main]

#[path = "common.rs"]
mod common;

use libfuzzer_sys::fuzz_target;
use tsad_core::SeriesView;
use tsad_preprocess::{WindowBatch, make_windows, window_count};

fuzz_target!(|data: &[u8]| {
    let mut cursor = common::ByteCursor::new(data);

    let n = common::bounded(cursor.next_u8(), 0, 64);
    let d = common::bounded(cursor.next_u8(), 1, 6);
    let seq_len = common::bounded(cursor.next_u8(), 0, 70);
    let stride = common::bounded(cursor.next_u8(), 0, 12);

    let values = common::decode_f64_chunks(&cursor.take_padded(n * d * 8), n * d);
    let Ok(view) = SeriesView::new(&values, n, d) else {
        return;
    };

    let Ok(windows) = make_windows(&view, seq_len, stride) else {
        assert!(seq_len == 0 || stride == 0);
        return;
    };
    assert_eq!(windows.len(), window_count(n, seq_len, stride));
    for window in &windows {
        assert_eq!(window.view.n(), seq_len);
        assert!(window.end() <= n);
    }

    if !windows.is_empty() {
        let batch = WindowBatch::from_windows(&windows).expect("uniform windows must batch");
        assert_eq!(batch.count(), windows.len());
    }
});
