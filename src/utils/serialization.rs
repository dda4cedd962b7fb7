//! Canonical JSON encoding used as the hashing pre-image.
//!
//! The byte layout matches a sorted-key `json.dumps` with default separators
//! and ASCII-only output, so identical block fields hash identically across
//! implementations. Non-finite floats are spelled `NaN`, `Infinity` and
//! `-Infinity` there, never `null`.

use crate::error::Result;
use serde::{Serialize, Serializer};
use serde_json::ser::Formatter;
use std::io;

// serde_json turns non-finite f64 into `null` before the formatter sees it,
// so [`CanonicalFloat`] routes them through `u128` markers instead. Canonical
// integers are at most 64 bits wide and never reach `write_u128`.
const NAN_MARKER: u128 = u128::MAX;
const INFINITY_MARKER: u128 = u128::MAX - 1;
const NEG_INFINITY_MARKER: u128 = u128::MAX - 2;

/// A float as it appears in the canonical encoding. Only meaningful when
/// serialized with [`CanonicalFormatter`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanonicalFloat(pub f64);

impl Serialize for CanonicalFloat {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let value = self.0;
        if value.is_nan() {
            serializer.serialize_u128(NAN_MARKER)
        } else if value == f64::INFINITY {
            serializer.serialize_u128(INFINITY_MARKER)
        } else if value == f64::NEG_INFINITY {
            serializer.serialize_u128(NEG_INFINITY_MARKER)
        } else {
            serializer.serialize_f64(value)
        }
    }
}

/// `serde_json` formatter producing the canonical block encoding.
///
/// Key ordering is the caller's responsibility; this only controls the
/// spelling of separators, strings and floats.
#[derive(Debug, Default, Clone, Copy)]
pub struct CanonicalFormatter;

impl Formatter for CanonicalFormatter {
    fn begin_array_value<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_key<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_value<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        writer.write_all(b": ")
    }

    fn write_f64<W>(&mut self, writer: &mut W, value: f64) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        writer.write_all(float_repr(value).as_bytes())
    }

    fn write_u128<W>(&mut self, writer: &mut W, value: u128) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        match value {
            NAN_MARKER => writer.write_all(b"NaN"),
            INFINITY_MARKER => writer.write_all(b"Infinity"),
            NEG_INFINITY_MARKER => writer.write_all(b"-Infinity"),
            _ => write!(writer, "{value}"),
        }
    }

    fn write_string_fragment<W>(&mut self, writer: &mut W, fragment: &str) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        // Quotes, backslashes and C0 controls never reach this point.
        for ch in fragment.chars() {
            if (' '..='~').contains(&ch) {
                writer.write_all(&[ch as u8])?;
            } else {
                let mut units = [0u16; 2];
                for unit in ch.encode_utf16(&mut units) {
                    write!(writer, "\\u{unit:04x}")?;
                }
            }
        }
        Ok(())
    }
}

/// Shortest round-trip rendering of a float, switching to exponent form
/// outside `1e-4 <= |v| < 1e16`. Integral values keep a trailing `.0`.
pub fn float_repr(value: f64) -> String {
    let scientific = format!("{value:e}");
    let exponent = scientific
        .split_once('e')
        .and_then(|(_, exp)| exp.parse::<i32>().ok());

    match exponent {
        Some(exp) if !(-4..16).contains(&exp) => {
            let mantissa = scientific.split('e').next().unwrap_or_default();
            let sign = if exp < 0 { '-' } else { '+' };
            format!("{mantissa}e{sign}{:02}", exp.abs())
        }
        _ => {
            let mut fixed = format!("{value}");
            if !fixed.contains('.') {
                fixed.push_str(".0");
            }
            fixed
        }
    }
}

/// Encode `value` with [`CanonicalFormatter`].
pub fn to_canonical_bytes<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>> {
    let mut buf = Vec::with_capacity(256);
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, CanonicalFormatter);
    value.serialize(&mut serializer)?;
    Ok(buf)
}
