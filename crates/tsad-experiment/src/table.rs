// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

//! Comma-separated numeric rows, shared by the dataset loader and the
//! score/label readers of the binary.
//!
//! Row numbers in error messages count non-blank lines from 1, header included.

/// Numeric table in row-major order.
#[derive(Clone, Debug, PartialEq)]
pub struct NumericTable {
    pub header: Option<Vec<String>>,
    pub values: Vec<f64>,
    pub n: usize,
    pub d: usize,
}

/// Trimmed non-blank lines of `raw`.
pub fn data_rows(raw: &str) -> impl Iterator<Item = &str> {
    raw.lines().map(str::trim).filter(|line| !line.is_empty())
}

pub fn split_cells(row: &str) -> Vec<&str> {
    row.split(',').map(str::trim).collect()
}

pub fn check_width(cells: &[&str], expected: usize, line: usize) -> Result<(), String> {
    if cells.len() != expected {
        return Err(format!(
            "CSV row {line} has {} columns but expected {expected}",
            cells.len()
        ));
    }
    Ok(())
}

/// Parses one cell; `col` is 1-based.
pub fn parse_cell(cell: &str, line: usize, col: usize) -> Result<f64, String> {
    if cell.is_empty() {
        return Err(format!("CSV row {line} column {col} is empty"));
    }
    cell.parse::<f64>()
        .map_err(|_| format!("CSV row {line} column {col} is not a valid float: '{cell}'"))
}

/// Reads a rectangular float table with an optional header row.
///
/// The first row is a header when none of its cells parses as a float.
pub fn parse_numeric_table(raw: &str) -> Result<NumericTable, String> {
    let mut rows = data_rows(raw).enumerate().peekable();
    let first = match rows.peek() {
        Some(&(_, row)) => split_cells(row),
        None => return Err("CSV input is empty".to_string()),
    };

    let header = if is_header(&first) {
        rows.next();
        Some(first.iter().map(|cell| (*cell).to_string()).collect::<Vec<_>>())
    } else {
        None
    };
    let d = first.len();

    let mut values = Vec::new();
    let mut n = 0usize;
    for (idx, row) in rows {
        let line = idx + 1;
        let cells = split_cells(row);
        check_width(&cells, d, line)?;
        for (col, cell) in cells.iter().enumerate() {
            values.push(parse_cell(cell, line, col + 1)?);
        }
        n += 1;
    }
    if n == 0 {
        return Err("CSV input has a header but no data rows".to_string());
    }

    Ok(NumericTable {
        header,
        values,
        n,
        d,
    })
}

fn is_header(cells: &[&str]) -> bool {
    cells
        .iter()
        .all(|cell| !cell.is_empty() && cell.parse::<f64>().is_err())
}
