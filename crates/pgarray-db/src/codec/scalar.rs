//! Per-kind rendering and parsing of array elements.

use std::fmt::Write;
use std::num::IntErrorKind;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use pgarray_core::{PgArrayError, PgArrayResult};

use crate::fields::ElementKind;
use crate::value::{format_mac, parse_mac, Value};

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";
const TIMESTAMP_INPUT_FORMATS: [&str; 3] =
    ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M"];
const TIMESTAMPTZ_INPUT_FORMATS: [&str; 2] =
    ["%Y-%m-%d %H:%M:%S%.f%#z", "%Y-%m-%dT%H:%M:%S%.f%#z"];

/// Why a leaf token could not be parsed.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum LeafError {
    /// Not valid input syntax for the kind.
    Invalid(String),
    /// Well-formed but outside the kind's range.
    OutOfRange,
}

fn mismatch(value: &Value, kind: &ElementKind) -> PgArrayError {
    PgArrayError::EncodingError(format!(
        "cannot store {value:?} in a {} array",
        kind.name()
    ))
}

/// Appends the literal form of one scalar to `out`.
pub(crate) fn render(value: &Value, kind: &ElementKind, out: &mut String) -> PgArrayResult<()> {
    if value.is_null() {
        out.push_str("NULL");
        return Ok(());
    }

    match kind {
        ElementKind::Integer | ElementKind::BigInteger | ElementKind::SmallInteger => {
            let Value::Int(i) = value else {
                return Err(mismatch(value, kind));
            };
            if let Some((lo, hi)) = kind.integer_bounds() {
                if !(lo..=hi).contains(i) {
                    return Err(PgArrayError::range(i, kind.name()));
                }
            }
            let _ = write!(out, "{i}");
        }
        ElementKind::Float | ElementKind::Real => {
            let f = match value {
                Value::Float(f) => *f,
                Value::Int(i) => *i as f64,
                _ => return Err(mismatch(value, kind)),
            };
            if *kind == ElementKind::Real {
                if f.is_finite() && f.abs() > f64::from(f32::MAX) {
                    return Err(PgArrayError::range(f, kind.name()));
                }
                push_real(narrow(f), out);
            } else {
                push_float(f, out);
            }
        }
        ElementKind::Text | ElementKind::Varchar { .. } => {
            let Value::String(s) = value else {
                return Err(mismatch(value, kind));
            };
            push_quoted(s, out);
        }
        ElementKind::Bytea => {
            let Value::Bytes(bytes) = value else {
                return Err(mismatch(value, kind));
            };
            let mut hex = String::with_capacity(2 + bytes.len() * 2);
            hex.push_str("\\x");
            for byte in bytes {
                let _ = write!(hex, "{byte:02x}");
            }
            push_quoted(&hex, out);
        }
        ElementKind::Date => {
            let Value::Date(d) = value else {
                return Err(mismatch(value, kind));
            };
            let _ = write!(out, "{}", d.format(DATE_FORMAT));
        }
        ElementKind::Timestamp => {
            let Value::DateTime(dt) = value else {
                return Err(mismatch(value, kind));
            };
            push_quoted(&dt.format(TIMESTAMP_FORMAT).to_string(), out);
        }
        ElementKind::TimestampTz => {
            let Value::DateTimeTz(dt) = value else {
                return Err(mismatch(value, kind));
            };
            push_quoted(&format!("{}+00", dt.format(TIMESTAMP_FORMAT)), out);
        }
        ElementKind::MacAddr => {
            let mac = match value {
                Value::MacAddr(mac) => *mac,
                Value::String(s) => parse_mac(s).ok_or_else(|| {
                    PgArrayError::EncodingError(format!("invalid MAC address '{s}'"))
                })?,
                _ => return Err(mismatch(value, kind)),
            };
            out.push_str(&format_mac(&mac));
        }
    }
    Ok(())
}

fn push_float(f: f64, out: &mut String) {
    if f.is_nan() {
        out.push_str("NaN");
    } else if f.is_infinite() {
        out.push_str(if f > 0.0 { "Infinity" } else { "-Infinity" });
    } else {
        let _ = write!(out, "{f}");
    }
}

/// Renders the shortest digits that identify `f` as a `real`.
fn push_real(f: f32, out: &mut String) {
    if f.is_finite() {
        let _ = write!(out, "{f}");
    } else {
        push_float(f64::from(f), out);
    }
}

#[allow(clippy::cast_possible_truncation)]
const fn narrow(f: f64) -> f32 {
    f as f32
}

/// Double-quotes `s`, escaping `"` and `\`.
fn push_quoted(s: &str, out: &mut String) {
    out.push('"');
    for c in s.chars() {
        if matches!(c, '"' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('"');
}

/// Converts one unescaped, non-null token into a value of the given kind.
pub(crate) fn parse(token: &str, kind: &ElementKind) -> Result<Value, LeafError> {
    match kind {
        ElementKind::Integer | ElementKind::BigInteger | ElementKind::SmallInteger => {
            parse_integer(token.trim(), kind)
        }
        ElementKind::Float | ElementKind::Real => parse_float(token.trim(), kind),
        ElementKind::Text | ElementKind::Varchar { .. } => Ok(Value::String(token.to_string())),
        ElementKind::Bytea => parse_bytea(token).map(Value::Bytes),
        ElementKind::Date => NaiveDate::parse_from_str(token.trim(), DATE_FORMAT)
            .map(Value::Date)
            .map_err(|e| LeafError::Invalid(format!("invalid date \"{token}\": {e}"))),
        ElementKind::Timestamp => parse_timestamp(token.trim()).map(Value::DateTime),
        ElementKind::TimestampTz => parse_timestamptz(token.trim()).map(Value::DateTimeTz),
        ElementKind::MacAddr => parse_mac(token)
            .map(Value::MacAddr)
            .ok_or_else(|| LeafError::Invalid(format!("invalid MAC address \"{token}\""))),
    }
}

fn parse_integer(token: &str, kind: &ElementKind) -> Result<Value, LeafError> {
    match token.parse::<i64>() {
        Ok(i) => match kind.integer_bounds() {
            Some((lo, hi)) if !(lo..=hi).contains(&i) => Err(LeafError::OutOfRange),
            _ => Ok(Value::Int(i)),
        },
        Err(e) if matches!(e.kind(), IntErrorKind::PosOverflow | IntErrorKind::NegOverflow) => {
            Err(LeafError::OutOfRange)
        }
        Err(_) if token.parse::<f64>().is_ok() => Err(LeafError::Invalid(format!(
            "\"{token}\" is not a whole number"
        ))),
        Err(_) => Err(LeafError::Invalid(format!(
            "invalid input syntax for type {}: \"{token}\"",
            kind.name()
        ))),
    }
}

fn parse_float(token: &str, kind: &ElementKind) -> Result<Value, LeafError> {
    let special = match token.to_ascii_lowercase().as_str() {
        "nan" | "+nan" | "-nan" => Some(f64::NAN),
        "infinity" | "+infinity" | "inf" | "+inf" => Some(f64::INFINITY),
        "-infinity" | "-inf" => Some(f64::NEG_INFINITY),
        _ => None,
    };
    if let Some(f) = special {
        return Ok(Value::Float(f));
    }

    let invalid = || {
        LeafError::Invalid(format!(
            "invalid input syntax for type {}: \"{token}\"",
            kind.name()
        ))
    };
    let parsed = if *kind == ElementKind::Real {
        // Round to real precision, then read back the shortest digits of the
        // f32 so that `0.1` stays `0.1` rather than its widened binary value.
        match token.parse::<f32>() {
            Ok(f) if f.is_infinite() => return Err(LeafError::OutOfRange),
            Ok(f) => f.to_string().parse::<f64>().map_err(|_| invalid())?,
            Err(_) => return Err(invalid()),
        }
    } else {
        token.parse::<f64>().map_err(|_| invalid())?
    };
    if parsed.is_infinite() {
        return Err(LeafError::OutOfRange);
    }
    Ok(Value::Float(parsed))
}

/// Accepts both `bytea_output` formats: `\x` hex and the legacy escape form.
fn parse_bytea(token: &str) -> Result<Vec<u8>, LeafError> {
    if let Some(hex) = token.strip_prefix("\\x") {
        let digits: Vec<u32> = hex
            .chars()
            .filter(|c| !c.is_whitespace())
            .map(|c| {
                c.to_digit(16)
                    .ok_or_else(|| LeafError::Invalid(format!("invalid hexadecimal digit '{c}'")))
            })
            .collect::<Result<_, _>>()?;
        if digits.len() % 2 != 0 {
            return Err(LeafError::Invalid(
                "invalid hexadecimal data: odd number of digits".to_string(),
            ));
        }
        return Ok(digits
            .chunks(2)
            .map(|pair| (pair[0] * 16 + pair[1]) as u8)
            .collect());
    }

    let bytes = token.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] != b'\\' {
            out.push(bytes[i]);
            i += 1;
        } else if bytes.get(i + 1) == Some(&b'\\') {
            out.push(b'\\');
            i += 2;
        } else {
            let octal = bytes
                .get(i + 1..i + 4)
                .filter(|d| matches!(d[0], b'0'..=b'3') && d[1..].iter().all(|b| matches!(b, b'0'..=b'7')))
                .ok_or_else(|| LeafError::Invalid("invalid input syntax for type bytea".to_string()))?;
            out.push((octal[0] - b'0') * 64 + (octal[1] - b'0') * 8 + (octal[2] - b'0'));
            i += 4;
        }
    }
    Ok(out)
}

fn parse_timestamp(token: &str) -> Result<NaiveDateTime, LeafError> {
    TIMESTAMP_INPUT_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(token, fmt).ok())
        .ok_or_else(|| LeafError::Invalid(format!("invalid timestamp \"{token}\"")))
}

fn parse_timestamptz(token: &str) -> Result<DateTime<Utc>, LeafError> {
    TIMESTAMPTZ_INPUT_FORMATS
        .iter()
        .find_map(|fmt| DateTime::parse_from_str(token, fmt).ok())
        .or_else(|| DateTime::parse_from_rfc3339(token).ok())
        .map(|dt| dt.with_timezone(&Utc))
        // A value without an offset is taken as UTC.
        .or_else(|| parse_timestamp(token).ok().map(|naive| naive.and_utc()))
        .ok_or_else(|| LeafError::Invalid(format!("invalid timestamp with time zone \"{token}\"")))
}
