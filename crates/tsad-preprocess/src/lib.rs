// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

pub mod window;

pub use window::{SubSequences, WindowBatch, make_windows, sub_sequences, window_count};
