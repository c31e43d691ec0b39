// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Scalar widening and narrowing.
//!
//! The host only knows 32-bit integers and doubles, so every Rust number is
//! carried through one of those two representations:
//!
//! | Rust                               | Host      |
//! |------------------------------------|-----------|
//! | `bool`                             | Boolean   |
//! | `i8` `i16` `u8` `u16` `char` `i32` | Integer   |
//! | `i64` `u32` `u64` `f32` `f64`      | Double    |
//! | `str` / `String` / enum variant    | String    |
//!
//! 64-bit integers beyond 2^53 lose precision on the way in. That loss is
//! part of the format and is not compensated for on the way out.

use crate::descriptor::PrimitiveKind;
use crate::host::Value;

/// A scalar leaf about to be written.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Scalar<'a> {
    Bool(bool),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    F32(f32),
    F64(f64),
    Char(char),
    Str(&'a str),
}

impl Scalar<'_> {
    /// Primitive kind before widening.
    pub fn kind(&self) -> PrimitiveKind {
        match self {
            Self::Bool(_) => PrimitiveKind::Bool,
            Self::I8(_) => PrimitiveKind::I8,
            Self::I16(_) => PrimitiveKind::I16,
            Self::I32(_) => PrimitiveKind::I32,
            Self::I64(_) => PrimitiveKind::I64,
            Self::U8(_) => PrimitiveKind::U8,
            Self::U16(_) => PrimitiveKind::U16,
            Self::U32(_) => PrimitiveKind::U32,
            Self::U64(_) => PrimitiveKind::U64,
            Self::F32(_) => PrimitiveKind::F32,
            Self::F64(_) => PrimitiveKind::F64,
            Self::Char(_) => PrimitiveKind::Char,
            Self::Str(_) => PrimitiveKind::String,
        }
    }

    /// Host representation of this scalar.
    pub fn widen<H>(self) -> Value<H> {
        match self {
            Self::Bool(v) => Value::Boolean(v),
            Self::I8(v) => Value::Integer(i32::from(v)),
            Self::I16(v) => Value::Integer(i32::from(v)),
            Self::I32(v) => Value::Integer(v),
            Self::U8(v) => Value::Integer(i32::from(v)),
            Self::U16(v) => Value::Integer(i32::from(v)),
            Self::Char(v) => Value::Integer(v as i32),
            Self::I64(v) => Value::Double(v as f64),
            Self::U32(v) => Value::Double(f64::from(v)),
            Self::U64(v) => Value::Double(v as f64),
            Self::F32(v) => Value::Double(f64::from(v)),
            Self::F64(v) => Value::Double(v),
            Self::Str(v) => Value::String(v.to_owned()),
        }
    }
}

/// Read a host number as a 32-bit integer.
///
/// Doubles are accepted when they hold an integral value in `i32` range,
/// since some engines store small numbers as doubles.
pub fn narrow_integer<H>(value: &Value<H>) -> Option<i32> {
    match *value {
        Value::Integer(v) => Some(v),
        Value::Double(v)
            if v.fract() == 0.0 && v >= f64::from(i32::MIN) && v <= f64::from(i32::MAX) =>
        {
            Some(v as i32)
        }
        _ => None,
    }
}

/// Read a host number as a double.
pub fn narrow_double<H>(value: &Value<H>) -> Option<f64> {
    match *value {
        Value::Integer(v) => Some(f64::from(v)),
        Value::Double(v) => Some(v),
        _ => None,
    }
}

/// Read a host integer as a `char` code point.
pub fn narrow_char(code: i32) -> Option<char> {
    u32::try_from(code).ok().and_then(char::from_u32)
}
