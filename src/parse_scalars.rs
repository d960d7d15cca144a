//! Scalar coercion: raw scalar text to the semantic type a property declares.
//!
//! Booleans follow the scene format rather than YAML: any integer converts by a
//! nonzero test (`m_Enabled: 1`), and only then the literals `true` / `false`
//! are tried.

use crate::error::Error;
use crate::value::Value;

/// Semantic scalar types a property can declare.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScalarKind {
    Bool,
    Int,
    /// Integer that must fit in 32 bits.
    Int32,
    Float,
    /// Float that must stay finite in single precision.
    Float32,
    Str,
}

impl ScalarKind {
    pub fn name(self) -> &'static str {
        match self {
            ScalarKind::Bool => "bool",
            ScalarKind::Int => "integer",
            ScalarKind::Int32 => "i32",
            ScalarKind::Float => "float",
            ScalarKind::Float32 => "f32",
            ScalarKind::Str => "string",
        }
    }
}

/// Convert raw scalar text into a [`Value`] of the requested kind.
///
/// Fails with [`Error::UnsupportedScalarCoercion`]; never falls back to a default.
pub fn coerce(raw: &str, kind: ScalarKind) -> Result<Value, Error> {
    match kind {
        ScalarKind::Bool => parse_bool(raw).map(Value::Bool),
        ScalarKind::Int => parse_int(raw).map(Value::Int),
        ScalarKind::Int32 => parse_i32(raw).map(|v| Value::Int(v.into())),
        ScalarKind::Float => parse_float(raw).map(Value::Float),
        ScalarKind::Float32 => parse_f32(raw).map(|v| Value::Float(v.into())),
        ScalarKind::Str => Ok(Value::Str(raw.to_owned())),
    }
}

/// Integer-as-boolean: a signed decimal integer is `true` iff nonzero; otherwise
/// exactly `true` or `false`.
pub fn parse_bool(raw: &str) -> Result<bool, Error> {
    let t = raw.trim();
    if let Some(n) = parse_decimal_i128(t) {
        return Ok(n != 0);
    }
    match t {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(Error::coercion(raw, ScalarKind::Bool.name())),
    }
}

/// Signed 64-bit integer, decimal or with a `0x` / `0o` / `0b` prefix.
pub fn parse_int(raw: &str) -> Result<i64, Error> {
    parse_int_signed(raw).ok_or_else(|| Error::coercion(raw, ScalarKind::Int.name()))
}

/// [`parse_int`] narrowed to 32 bits.
pub fn parse_i32(raw: &str) -> Result<i32, Error> {
    let wide = parse_int(raw)?;
    i32::try_from(wide).map_err(|_| Error::coercion(raw, ScalarKind::Int32.name()))
}

/// [`parse_float`] narrowed to single precision. Infinities and NaN pass
/// through; a finite value beyond the `f32` range is rejected.
pub fn parse_f32(raw: &str) -> Result<f32, Error> {
    let wide = parse_float(raw)?;
    narrow_f64(wide).ok_or_else(|| Error::coercion(raw, ScalarKind::Float32.name()))
}

pub(crate) fn narrow_f64(v: f64) -> Option<f32> {
    let narrow = v as f32;
    (narrow.is_finite() || !v.is_finite()).then_some(narrow)
}

/// Decimal or exponent float, plus YAML `.nan`, `.inf` and `-.inf`.
pub fn parse_float(raw: &str) -> Result<f64, Error> {
    let t = raw.trim();
    match t.to_ascii_lowercase().as_str() {
        ".nan" | "+.nan" | "-.nan" => Ok(f64::NAN),
        ".inf" | "+.inf" => Ok(f64::INFINITY),
        "-.inf" => Ok(f64::NEG_INFINITY),
        _ => t
            .parse::<f64>()
            .map_err(|_| Error::coercion(raw, ScalarKind::Float.name())),
    }
}

fn split_sign(t: &str) -> (bool, &str) {
    match t.strip_prefix('+') {
        Some(r) => (false, r),
        None => match t.strip_prefix('-') {
            Some(r) => (true, r),
            None => (false, t),
        },
    }
}

/// Optional sign followed by decimal digits (underscores allowed between them).
fn parse_decimal_i128(t: &str) -> Option<i128> {
    let (neg, digits) = split_sign(t);
    // Accumulate toward the sign so that i128::MIN is representable.
    let mut val: i128 = 0;
    let mut saw = false;
    for b in digits.as_bytes() {
        match *b {
            b'_' if saw => continue,
            b'0'..=b'9' => {
                let d = (b - b'0') as i128;
                val = val.checked_mul(10)?;
                val = if neg { val.checked_sub(d)? } else { val.checked_add(d)? };
                saw = true;
            }
            _ => return None,
        }
    }
    saw.then_some(val)
}

fn parse_digits_u128(digits: &str, radix: u32) -> Option<u128> {
    let mut val: u128 = 0;
    let mut saw = false;
    for c in digits.chars() {
        if c == '_' && saw {
            continue;
        }
        let d = c.to_digit(radix)?;
        val = val.checked_mul(radix as u128)?;
        val = val.checked_add(d as u128)?;
        saw = true;
    }
    saw.then_some(val)
}

fn parse_int_signed(raw: &str) -> Option<i64> {
    let t = raw.trim();
    let (neg, rest) = split_sign(t);

    let (radix, digits) = if let Some(r) = rest.strip_prefix("0x").or_else(|| rest.strip_prefix("0X")) {
        (16u32, r)
    } else if let Some(r) = rest.strip_prefix("0o").or_else(|| rest.strip_prefix("0O")) {
        (8u32, r)
    } else if let Some(r) = rest.strip_prefix("0b").or_else(|| rest.strip_prefix("0B")) {
        (2u32, r)
    } else {
        return parse_decimal_i128(t).and_then(|v| i64::try_from(v).ok());
    };

    let mag = i128::try_from(parse_digits_u128(digits, radix)?).ok()?;
    let val = if neg { mag.checked_neg()? } else { mag };
    i64::try_from(val).ok()
}
