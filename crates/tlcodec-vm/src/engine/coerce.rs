//! Host value to wire primitive conversion.
//!
//! Strong typing accepts exactly one value kind per primitive. Weak typing
//! also accepts any integer that fits, and strings and bytes interchangeably.

use std::borrow::Cow;

use tlcodec_core::Primitive;

use super::codec::Typing;
use super::error::CodecError;
use super::value::Value;

type Result<T> = std::result::Result<T, CodecError>;

fn mismatch(field: &str, expected: Primitive, value: &Value) -> CodecError {
    CodecError::TypeMismatch {
        field: field.to_string(),
        expected: expected.tl_name(),
        found: value.kind(),
    }
}

fn as_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Nat(n) => Some(i64::from(*n)),
        Value::Int(i) => Some(i64::from(*i)),
        Value::Long(l) => Some(*l),
        _ => None,
    }
}

pub(super) fn nat(value: &Value, typing: Typing, field: &str) -> Result<u32> {
    match (value, typing) {
        (Value::Nat(n), _) => Ok(*n),
        (_, Typing::Weak) => as_i64(value)
            .and_then(|v| u32::try_from(v).ok())
            .ok_or_else(|| mismatch(field, Primitive::Nat, value)),
        _ => Err(mismatch(field, Primitive::Nat, value)),
    }
}

pub(super) fn int(value: &Value, typing: Typing, field: &str) -> Result<i32> {
    match (value, typing) {
        (Value::Int(i), _) => Ok(*i),
        (_, Typing::Weak) => as_i64(value)
            .and_then(|v| i32::try_from(v).ok())
            .ok_or_else(|| mismatch(field, Primitive::Int, value)),
        _ => Err(mismatch(field, Primitive::Int, value)),
    }
}

pub(super) fn long(value: &Value, typing: Typing, field: &str) -> Result<i64> {
    match (value, typing) {
        (Value::Long(l), _) => Ok(*l),
        (_, Typing::Weak) => as_i64(value).ok_or_else(|| mismatch(field, Primitive::Long, value)),
        _ => Err(mismatch(field, Primitive::Long, value)),
    }
}

pub(super) fn double(value: &Value, typing: Typing, field: &str) -> Result<f64> {
    match (value, typing) {
        (Value::Double(d), _) => Ok(*d),
        (_, Typing::Weak) => as_i64(value)
            .map(|v| v as f64)
            .ok_or_else(|| mismatch(field, Primitive::Double, value)),
        _ => Err(mismatch(field, Primitive::Double, value)),
    }
}

pub(super) fn string<'v>(value: &'v Value, typing: Typing, field: &str) -> Result<&'v str> {
    match (value, typing) {
        (Value::String(s), _) => Ok(s),
        (Value::Bytes(b), Typing::Weak) => {
            std::str::from_utf8(b).map_err(|_| mismatch(field, Primitive::String, value))
        }
        _ => Err(mismatch(field, Primitive::String, value)),
    }
}

pub(super) fn bytes<'v>(value: &'v Value, typing: Typing, field: &str) -> Result<Cow<'v, [u8]>> {
    match (value, typing) {
        (Value::Bytes(b), _) => Ok(Cow::Borrowed(b)),
        (Value::String(s), Typing::Weak) => Ok(Cow::Borrowed(s.as_bytes())),
        (Value::Array(items), Typing::Weak) => items
            .iter()
            .map(|item| as_i64(item).and_then(|v| u8::try_from(v).ok()))
            .collect::<Option<Vec<u8>>>()
            .map(Cow::Owned)
            .ok_or_else(|| mismatch(field, Primitive::Bytes, value)),
        _ => Err(mismatch(field, Primitive::Bytes, value)),
    }
}
