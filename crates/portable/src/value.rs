// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Dynamic field values and their wire encoding.

use crate::error::{Error, Result};
use crate::object::BinaryObject;
use crate::ser::BufferWriter;
use crate::tag::TypeTag;
use chrono::{DateTime, SubsecRound, Utc};
use std::fmt;
use uuid::Uuid;

/// Arbitrary precision-ish decimal: `unscaled * 10^-scale`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Decimal {
    pub unscaled: i128,
    pub scale: i32,
}

impl Decimal {
    pub const fn new(unscaled: i128, scale: i32) -> Self {
        Self { unscaled, scale }
    }

    /// Minimal big-endian two's complement bytes of the unscaled value.
    pub fn unscaled_be_bytes(&self) -> Vec<u8> {
        let bytes = self.unscaled.to_be_bytes();
        let mut skip = 0;
        while skip < bytes.len() - 1 {
            let redundant = (bytes[skip] == 0x00 && bytes[skip + 1] & 0x80 == 0)
                || (bytes[skip] == 0xFF && bytes[skip + 1] & 0x80 != 0);
            if !redundant {
                break;
            }
            skip += 1;
        }
        bytes[skip..].to_vec()
    }

    /// Inverse of [`Decimal::unscaled_be_bytes`]; `None` for empty or
    /// oversized input.
    pub fn from_be_bytes(scale: i32, bytes: &[u8]) -> Option<Self> {
        if bytes.is_empty() || bytes.len() > 16 {
            return None;
        }
        let fill = if bytes[0] & 0x80 != 0 { 0xFF } else { 0x00 };
        let mut buf = [fill; 16];
        buf[16 - bytes.len()..].copy_from_slice(bytes);
        Some(Self::new(i128::from_be_bytes(buf), scale))
    }
}

impl From<i64> for Decimal {
    fn from(value: i64) -> Self {
        Self::new(i128::from(value), 0)
    }
}

impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.scale <= 0 {
            write!(f, "{}", self.unscaled)?;
            for _ in 0..self.scale.unsigned_abs() {
                f.write_str("0")?;
            }
            return Ok(());
        }
        let digits = self.unscaled.unsigned_abs().to_string();
        let scale = self.scale as usize;
        let sign = if self.unscaled < 0 { "-" } else { "" };
        if digits.len() > scale {
            let (int, frac) = digits.split_at(digits.len() - scale);
            write!(f, "{}{}.{}", sign, int, frac)
        } else {
            write!(f, "{}0.{}{}", sign, "0".repeat(scale - digits.len()), digits)
        }
    }
}

/// A field value, as stored in a portable object.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Byte(i8),
    Bool(bool),
    Short(i16),
    Char(char),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    String(String),
    Uuid(Uuid),
    /// Millisecond precision instant; writers truncate finer instants.
    Date(DateTime<Utc>),
    /// Nanosecond precision instant.
    Timestamp(DateTime<Utc>),
    Decimal(Decimal),
    ByteArray(Vec<u8>),
    Object(BinaryObject),
    Null,
}

impl Value {
    /// A `Date` value, truncated to millisecond precision.
    pub fn date(instant: DateTime<Utc>) -> Self {
        Value::Date(instant.trunc_subsecs(3))
    }

    pub fn type_tag(&self) -> TypeTag {
        match self {
            Value::Byte(_) => TypeTag::Byte,
            Value::Bool(_) => TypeTag::Bool,
            Value::Short(_) => TypeTag::Short,
            Value::Char(_) => TypeTag::Char,
            Value::Int(_) => TypeTag::Int,
            Value::Long(_) => TypeTag::Long,
            Value::Float(_) => TypeTag::Float,
            Value::Double(_) => TypeTag::Double,
            Value::String(_) => TypeTag::String,
            Value::Uuid(_) => TypeTag::Uuid,
            Value::Date(_) => TypeTag::Date,
            Value::Timestamp(_) => TypeTag::Timestamp,
            Value::Decimal(_) => TypeTag::Decimal,
            Value::ByteArray(_) => TypeTag::ByteArray,
            Value::Object(_) => TypeTag::Object,
            Value::Null => TypeTag::Null,
        }
    }

    pub fn type_name(&self) -> &'static str {
        self.type_tag().name()
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_i8(&self) -> Option<i8> {
        match self {
            Value::Byte(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_i16(&self) -> Option<i16> {
        match self {
            Value::Short(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_char(&self) -> Option<char> {
        match self {
            Value::Char(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_i32(&self) -> Option<i32> {
        match self {
            Value::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Long(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_f32(&self) -> Option<f32> {
        match self {
            Value::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Double(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_uuid(&self) -> Option<Uuid> {
        match self {
            Value::Uuid(v) => Some(*v),
            _ => None,
        }
    }

    /// Instant of a `Date` or `Timestamp` value.
    pub fn as_datetime(&self) -> Option<DateTime<Utc>> {
        match self {
            Value::Date(v) | Value::Timestamp(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_decimal(&self) -> Option<Decimal> {
        match self {
            Value::Decimal(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::ByteArray(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&BinaryObject> {
        match self {
            Value::Object(v) => Some(v),
            _ => None,
        }
    }

    /// Append `tag + payload` to `out`.
    pub(crate) fn encode(&self, out: &mut BufferWriter) -> Result<()> {
        out.write_u8(self.type_tag().to_u8());
        match self {
            Value::Byte(v) => out.write_u8(*v as u8),
            Value::Bool(v) => out.write_u8(u8::from(*v)),
            Value::Short(v) => out.write_i16_le(*v),
            Value::Char(v) => out.write_u32_le(u32::from(*v)),
            Value::Int(v) => out.write_i32_le(*v),
            Value::Long(v) => out.write_i64_le(*v),
            Value::Float(v) => out.write_f32_le(*v),
            Value::Double(v) => out.write_f64_le(*v),
            Value::String(v) => out.write_len_prefixed(v.as_bytes())?,
            Value::Uuid(v) => out.write_bytes(v.as_bytes()),
            Value::Date(v) => out.write_i64_le(v.timestamp_millis()),
            Value::Timestamp(v) => {
                out.write_i64_le(v.timestamp_millis());
                out.write_i32_le((v.timestamp_subsec_nanos() % 1_000_000) as i32);
            }
            Value::Decimal(v) => {
                out.write_i32_le(v.scale);
                out.write_len_prefixed(&v.unscaled_be_bytes())?;
            }
            Value::ByteArray(v) => out.write_len_prefixed(v)?,
            // The embedded object starts with its own tag byte.
            Value::Object(v) => {
                let bytes = v.bytes();
                out.write_bytes(&bytes[1..]);
            }
            Value::Null => {}
        }
        Ok(())
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Byte(v) => write!(f, "{}", v),
            Value::Bool(v) => write!(f, "{}", v),
            Value::Short(v) => write!(f, "{}", v),
            Value::Char(v) => write!(f, "{:?}", v),
            Value::Int(v) => write!(f, "{}", v),
            Value::Long(v) => write!(f, "{}", v),
            Value::Float(v) => write!(f, "{}", v),
            Value::Double(v) => write!(f, "{}", v),
            Value::String(v) => write!(f, "{:?}", v),
            Value::Uuid(v) => write!(f, "{}", v),
            Value::Date(v) | Value::Timestamp(v) => write!(f, "{}", v.to_rfc3339()),
            Value::Decimal(v) => write!(f, "{}", v),
            Value::ByteArray(v) => write!(f, "<{} bytes>", v.len()),
            Value::Object(v) => write!(f, "<object {:#010x}, {} bytes>", v.type_id(), v.len()),
            Value::Null => f.write_str("null"),
        }
    }
}

// ============================================================================
// Conversions into Value
// ============================================================================

macro_rules! impl_into_value {
    ($ty:ty, $variant:ident) => {
        impl From<$ty> for Value {
            fn from(v: $ty) -> Self {
                Value::$variant(v)
            }
        }
    };
}

impl_into_value!(i8, Byte);
impl_into_value!(bool, Bool);
impl_into_value!(i16, Short);
impl_into_value!(char, Char);
impl_into_value!(i32, Int);
impl_into_value!(i64, Long);
impl_into_value!(f32, Float);
impl_into_value!(f64, Double);
impl_into_value!(String, String);
impl_into_value!(Uuid, Uuid);
impl_into_value!(Decimal, Decimal);
impl_into_value!(Vec<u8>, ByteArray);
impl_into_value!(BinaryObject, Object);

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_owned())
    }
}

impl From<&[u8]> for Value {
    fn from(v: &[u8]) -> Self {
        Value::ByteArray(v.to_vec())
    }
}

/// Instants convert to `Timestamp`; use [`Value::date`] for `Date`.
impl From<DateTime<Utc>> for Value {
    fn from(v: DateTime<Utc>) -> Self {
        Value::Timestamp(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

// ============================================================================
// Conversions out of Value
// ============================================================================

/// Typed extraction from a [`Value`].
pub trait FromValue: Sized {
    /// Type name reported in [`Error::FieldTypeMismatch`].
    const EXPECTED: &'static str;

    /// Convert, handing the value back when the variant does not match.
    fn from_value(value: Value) -> core::result::Result<Self, Value>;
}

macro_rules! impl_from_value {
    ($ty:ty, $variant:ident) => {
        impl FromValue for $ty {
            const EXPECTED: &'static str = stringify!($variant);

            fn from_value(value: Value) -> core::result::Result<Self, Value> {
                match value {
                    Value::$variant(v) => Ok(v),
                    other => Err(other),
                }
            }
        }
    };
}

impl_from_value!(i8, Byte);
impl_from_value!(bool, Bool);
impl_from_value!(i16, Short);
impl_from_value!(char, Char);
impl_from_value!(i32, Int);
impl_from_value!(i64, Long);
impl_from_value!(f32, Float);
impl_from_value!(f64, Double);
impl_from_value!(String, String);
impl_from_value!(Uuid, Uuid);
impl_from_value!(Decimal, Decimal);
impl_from_value!(Vec<u8>, ByteArray);
impl_from_value!(BinaryObject, Object);

impl FromValue for DateTime<Utc> {
    const EXPECTED: &'static str = "Date or Timestamp";

    fn from_value(value: Value) -> core::result::Result<Self, Value> {
        match value {
            Value::Date(v) | Value::Timestamp(v) => Ok(v),
            other => Err(other),
        }
    }
}

impl FromValue for Value {
    const EXPECTED: &'static str = "any";

    fn from_value(value: Value) -> core::result::Result<Self, Value> {
        Ok(value)
    }
}

/// Convert `value` read from `field`, mapping a mismatch to
/// [`Error::FieldTypeMismatch`].
pub(crate) fn convert<T: FromValue>(field: &str, value: Value) -> Result<T> {
    T::from_value(value).map_err(|other| Error::FieldTypeMismatch {
        field: field.to_owned(),
        expected: T::EXPECTED,
        found: other.type_name(),
    })
}
