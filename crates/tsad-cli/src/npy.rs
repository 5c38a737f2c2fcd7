// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

//! Minimal `.npy` reader for 1-D and 2-D numeric arrays, widened to `f64`.

use crate::CliError;

const MAGIC: &[u8] = b"\x93NUMPY";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ByteOrder {
    Little,
    Big,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ElementKind {
    Float,
    Signed,
    Unsigned,
    Bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Element {
    order: ByteOrder,
    kind: ElementKind,
    width: usize,
}

impl Element {
    /// `<f8`, `>i2`, `|u1`, `|b1`, ...
    fn parse(descr: &str) -> Result<Self, CliError> {
        let unsupported = || {
            CliError::not_supported(format!(
                "unsupported NPY dtype '{descr}'; expected f4, f8, i1-i8, u1-u8 or b1"
            ))
        };

        let (order, code) = match descr.split_at_checked(1) {
            Some(("<" | "|", code)) => (ByteOrder::Little, code),
            Some((">", code)) => (ByteOrder::Big, code),
            Some(("=", code)) if cfg!(target_endian = "big") => (ByteOrder::Big, code),
            Some(("=", code)) => (ByteOrder::Little, code),
            Some(_) => (ByteOrder::Little, descr),
            None => return Err(CliError::invalid_input("NPY descr is empty")),
        };
        let (kind, width) = code.split_at_checked(1).ok_or_else(unsupported)?;
        let width = width.parse::<usize>().map_err(|_| unsupported())?;
        let kind = match (kind, width) {
            ("f", 4 | 8) => ElementKind::Float,
            ("i", 1 | 2 | 4 | 8) => ElementKind::Signed,
            ("u", 1 | 2 | 4 | 8) => ElementKind::Unsigned,
            ("b", 1) => ElementKind::Bool,
            _ => return Err(unsupported()),
        };
        Ok(Self { order, kind, width })
    }

    fn to_f64(self, chunk: &[u8]) -> f64 {
        // little-endian, zero-extended to 8 bytes
        let mut le = [0u8; 8];
        match self.order {
            ByteOrder::Little => le[..self.width].copy_from_slice(chunk),
            ByteOrder::Big => le[..self.width]
                .iter_mut()
                .zip(chunk.iter().rev())
                .for_each(|(dst, src)| *dst = *src),
        }

        let unused_bits = 64 - 8 * self.width as u32;
        match self.kind {
            ElementKind::Float if self.width == 4 => {
                f64::from(f32::from_le_bytes([le[0], le[1], le[2], le[3]]))
            }
            ElementKind::Float => f64::from_le_bytes(le),
            ElementKind::Signed => ((i64::from_le_bytes(le) << unused_bits) >> unused_bits) as f64,
            ElementKind::Unsigned => u64::from_le_bytes(le) as f64,
            ElementKind::Bool => f64::from(u8::from(le[0] != 0)),
        }
    }
}

#[derive(Debug, PartialEq)]
struct Header {
    element: Element,
    fortran_order: bool,
    n: usize,
    d: usize,
}

impl Header {
    /// Interprets the Python dict literal stored in the file preamble.
    fn parse(text: &str) -> Result<Self, CliError> {
        let mut descr = None;
        let mut fortran_order = None;
        let mut shape = None;
        for (key, value) in dict_entries(text)? {
            match key {
                "descr" => descr = Some(Element::parse(unquote(value, key)?)?),
                "fortran_order" => {
                    fortran_order = Some(match value {
                        "True" => true,
                        "False" => false,
                        _ => {
                            return Err(CliError::invalid_input(format!(
                                "NPY header field 'fortran_order' must be True or False; got '{value}'"
                            )));
                        }
                    })
                }
                "shape" => shape = Some(parse_shape(value)?),
                _ => {}
            }
        }

        let missing = |key: &str| CliError::invalid_input(format!("NPY header missing '{key}'"));
        let (n, d) = shape.ok_or_else(|| missing("shape"))?;
        Ok(Self {
            element: descr.ok_or_else(|| missing("descr"))?,
            fortran_order: fortran_order.ok_or_else(|| missing("fortran_order"))?,
            n,
            d,
        })
    }
}

/// Splits `{'k': v, ...}` into raw `(k, v)` pairs, respecting quotes and tuples.
fn dict_entries(text: &str) -> Result<Vec<(&str, &str)>, CliError> {
    let body = text
        .trim()
        .strip_prefix('{')
        .and_then(|rest| rest.strip_suffix('}'))
        .ok_or_else(|| CliError::invalid_input("NPY header is not a dict literal"))?;

    let mut items = Vec::new();
    let mut depth = 0usize;
    let mut quoted = false;
    let mut start = 0usize;
    for (idx, ch) in body.char_indices() {
        match ch {
            '\'' | '"' => quoted = !quoted,
            '(' if !quoted => depth += 1,
            ')' if !quoted => depth = depth.saturating_sub(1),
            ',' if !quoted && depth == 0 => {
                items.push(&body[start..idx]);
                start = idx + 1;
            }
            _ => {}
        }
    }
    items.push(&body[start..]);

    items
        .into_iter()
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(|item| {
            let (key, value) = item.split_once(':').ok_or_else(|| {
                CliError::invalid_input(format!("NPY header entry '{item}' has no ':'"))
            })?;
            Ok((unquote(key.trim(), "key")?, value.trim()))
        })
        .collect()
}

fn unquote<'a>(raw: &'a str, what: &str) -> Result<&'a str, CliError> {
    raw.strip_prefix('\'')
        .and_then(|rest| rest.strip_suffix('\''))
        .or_else(|| raw.strip_prefix('"').and_then(|rest| rest.strip_suffix('"')))
        .ok_or_else(|| {
            CliError::invalid_input(format!("NPY header {what} '{raw}' is not a quoted string"))
        })
}

fn parse_shape(raw: &str) -> Result<(usize, usize), CliError> {
    let inner = raw
        .strip_prefix('(')
        .and_then(|rest| rest.strip_suffix(')'))
        .ok_or_else(|| CliError::invalid_input(format!("NPY shape '{raw}' is not a tuple")))?;
    let dims = inner
        .split(',')
        .map(str::trim)
        .filter(|dim| !dim.is_empty())
        .map(|dim| {
            dim.parse::<usize>().map_err(|_| {
                CliError::invalid_input(format!("NPY shape entry '{dim}' is not a dimension"))
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let (n, d) = match dims.as_slice() {
        &[n] => (n, 1),
        &[n, d] => (n, d),
        _ => {
            return Err(CliError::not_supported(format!(
                "NPY shape {raw} is unsupported; expected 1 or 2 dimensions"
            )));
        }
    };
    if n == 0 || d == 0 {
        return Err(CliError::invalid_input(format!(
            "NPY shape {raw} is empty; expected n>=1 and d>=1"
        )));
    }
    Ok((n, d))
}

/// Returns the header text and the payload that follows it.
fn split_preamble(bytes: &[u8]) -> Result<(&str, &[u8]), CliError> {
    let rest = bytes
        .strip_prefix(MAGIC)
        .ok_or_else(|| CliError::invalid_input("not an NPY file (bad magic)"))?;
    let truncated = || CliError::invalid_input("NPY preamble is truncated");

    let (&major, rest) = rest.split_first().ok_or_else(truncated)?;
    let (_minor, rest) = rest.split_first().ok_or_else(truncated)?;
    let (header_len, rest) = match major {
        1 => {
            let (len, rest) = rest.split_at_checked(2).ok_or_else(truncated)?;
            (usize::from(u16::from_le_bytes([len[0], len[1]])), rest)
        }
        2 | 3 => {
            let (len, rest) = rest.split_at_checked(4).ok_or_else(truncated)?;
            let len = u32::from_le_bytes([len[0], len[1], len[2], len[3]]);
            let len = usize::try_from(len).map_err(|_| truncated())?;
            (len, rest)
        }
        other => {
            return Err(CliError::not_supported(format!(
                "unsupported NPY version {other}; expected 1, 2 or 3"
            )));
        }
    };

    let (header, payload) = rest.split_at_checked(header_len).ok_or_else(truncated)?;
    let header = std::str::from_utf8(header)
        .map_err(|_| CliError::invalid_input("NPY header is not valid UTF-8"))?;
    Ok((header, payload))
}

/// Decodes an `.npy` file into row-major `(values, n, d)`.
pub(crate) fn parse_npy_bytes(bytes: &[u8]) -> Result<(Vec<f64>, usize, usize), CliError> {
    let (text, payload) = split_preamble(bytes)?;
    let Header {
        element,
        fortran_order,
        n,
        d,
    } = Header::parse(text)?;

    let expected = n
        .checked_mul(d)
        .and_then(|count| count.checked_mul(element.width))
        .ok_or_else(|| CliError::invalid_input("NPY shape overflows usize"))?;
    if payload.len() != expected {
        return Err(CliError::invalid_input(format!(
            "NPY payload holds {} bytes; shape ({n}, {d}) needs {expected}",
            payload.len()
        )));
    }

    let stored = payload
        .chunks_exact(element.width)
        .map(|chunk| element.to_f64(chunk));
    if !fortran_order || d == 1 {
        return Ok((stored.collect(), n, d));
    }

    // column-major on disk
    let columns = stored.collect::<Vec<_>>();
    let values = (0..n)
        .flat_map(|row| (0..d).map(move |col| (row, col)))
        .map(|(row, col)| columns[col * n + row])
        .collect();
    Ok((values, n, d))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::{Element, ElementKind, Header, parse_npy_bytes, parse_shape};

    pub(crate) fn f64_bytes(values: &[f64]) -> Vec<u8> {
        values.iter().flat_map(|v| v.to_le_bytes()).collect()
    }

    /// Version 1.0 file with the header padded to a 16-byte boundary.
    pub(crate) fn make_npy_v1(
        descr: &str,
        fortran_order: bool,
        shape: &[usize],
        payload: &[u8],
    ) -> Vec<u8> {
        let shape = match shape {
            [n] => format!("({n},)"),
            [n, d] => format!("({n}, {d})"),
            _ => panic!("shape must be 1D or 2D"),
        };
        let order = if fortran_order { "True" } else { "False" };
        let mut header =
            format!("{{'descr': '{descr}', 'fortran_order': {order}, 'shape': {shape}, }}");
        while (10 + header.len() + 1) % 16 != 0 {
            header.push(' ');
        }
        header.push('\n');

        let mut bytes = b"\x93NUMPY\x01\x00".to_vec();
        bytes.extend_from_slice(&(header.len() as u16).to_le_bytes());
        bytes.extend_from_slice(header.as_bytes());
        bytes.extend_from_slice(payload);
        bytes
    }

    #[test]
    fn reads_f64_column() {
        let payload = make_npy_v1("<f8", false, &[3], &f64_bytes(&[0.25, 0.5, 1.0]));
        let (values, n, d) = parse_npy_bytes(&payload).expect("npy should parse");
        assert_eq!((n, d), (3, 1));
        assert_eq!(values, vec![0.25, 0.5, 1.0]);
    }

    #[test]
    fn transposes_fortran_order_to_row_major() {
        let column_major = f64_bytes(&[1.0, 4.0, 2.0, 5.0, 3.0, 6.0]);
        let payload = make_npy_v1("<f8", true, &[2, 3], &column_major);
        let (values, n, d) = parse_npy_bytes(&payload).expect("npy should parse");
        assert_eq!((n, d), (2, 3));
        assert_eq!(values, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    }

    #[test]
    fn widens_integer_and_bool_elements() {
        let ints = [0i64, 1, -3]
            .iter()
            .flat_map(|v| v.to_le_bytes())
            .collect::<Vec<_>>();
        let (values, _, _) =
            parse_npy_bytes(&make_npy_v1("<i8", false, &[3, 1], &ints)).expect("i8");
        assert_eq!(values, vec![0.0, 1.0, -3.0]);

        let (values, _, _) = parse_npy_bytes(&make_npy_v1("|u1", false, &[3], &[0, 1, 255]))
            .expect("u1");
        assert_eq!(values, vec![0.0, 1.0, 255.0]);

        let (values, _, _) =
            parse_npy_bytes(&make_npy_v1("|b1", false, &[2], &[1, 0])).expect("b1");
        assert_eq!(values, vec![1.0, 0.0]);

        let (values, _, _) =
            parse_npy_bytes(&make_npy_v1(">i2", false, &[1], &(-2i16).to_be_bytes()))
                .expect(">i2");
        assert_eq!(values, vec![-2.0]);

        let (values, _, _) =
            parse_npy_bytes(&make_npy_v1("<f4", false, &[1], &1.5f32.to_le_bytes())).expect("f4");
        assert_eq!(values, vec![1.5]);
    }

    #[test]
    fn descr_parsing_checks_kind_and_width() {
        let element = Element::parse(">u4").expect("u4");
        assert_eq!((element.kind, element.width), (ElementKind::Unsigned, 4));
        for bad in ["<c16", "<f2", "|b2", "<i3", "<"] {
            let err = Element::parse(bad).expect_err(bad);
            assert_eq!(err.code(), "not_supported", "{bad}");
        }
        assert_eq!(Element::parse("").expect_err("empty").code(), "invalid_input");
    }

    #[test]
    fn header_accepts_any_key_order() {
        let header =
            Header::parse("{'shape': (4, 2), 'fortran_order': False, 'descr': '<f8'}")
                .expect("header");
        assert_eq!((header.n, header.d), (4, 2));
        assert!(!header.fortran_order);

        let err = Header::parse("{'descr': '<f8', 'shape': (4,)}").expect_err("no order");
        assert!(err.to_string().contains("fortran_order"));
    }

    #[test]
    fn rejects_bad_files() {
        assert!(parse_npy_bytes(b"PK\x03\x04").is_err());

        let mut truncated = make_npy_v1("<f8", false, &[2], &f64_bytes(&[1.0, 2.0]));
        truncated.pop();
        let err = parse_npy_bytes(&truncated).expect_err("short payload");
        assert!(err.to_string().contains("needs 16"), "{err}");

        assert_eq!(parse_shape("()").expect_err("0-d").code(), "not_supported");
        assert_eq!(parse_shape("(2, 3, 4)").expect_err("3-d").code(), "not_supported");
        assert_eq!(parse_shape("(0,)").expect_err("empty").code(), "invalid_input");
    }
}
