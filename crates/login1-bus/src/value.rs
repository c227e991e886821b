// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Dynamic wire values.

use crate::error::{BusError, BusResult};
use crate::path::ObjectPath;
use crate::signature::WireType;
use std::fmt;

/// A value that can travel in a message body.
///
/// Containers carry their element types so that empty arrays and dicts
/// still know their signature.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    // Basic
    Byte(u8),
    Bool(bool),
    I16(i16),
    U16(u16),
    I32(i32),
    U32(u32),
    I64(i64),
    U64(u64),
    F64(f64),
    Str(String),
    ObjectPath(ObjectPath),
    Signature(String),

    // Containers
    Variant(Box<Value>),
    Struct(Vec<Value>),
    Array {
        element: WireType,
        items: Vec<Value>,
    },
    Dict {
        key: WireType,
        value: WireType,
        entries: Vec<(Value, Value)>,
    },
}

impl Value {
    /// Wrap a value in a variant.
    pub fn variant(inner: impl Into<Value>) -> Self {
        Self::Variant(Box::new(inner.into()))
    }

    /// Build a struct from its fields.
    pub fn structure(fields: Vec<Value>) -> Self {
        Self::Struct(fields)
    }

    /// Build a typed array, checking every item against `element`.
    pub fn array(element: WireType, items: Vec<Value>) -> BusResult<Self> {
        if let Some(bad) = items.iter().find(|v| v.wire_type() != element) {
            return Err(BusError::failed(format!(
                "array of '{}' cannot hold a '{}' value",
                element,
                bad.signature()
            )));
        }
        Ok(Self::Array { element, items })
    }

    /// Build a typed dict, checking key and value types.
    pub fn dict(key: WireType, value: WireType, entries: Vec<(Value, Value)>) -> BusResult<Self> {
        if !key.is_basic() {
            return Err(BusError::failed(format!("dict key '{}' is not a basic type", key)));
        }
        for (k, v) in &entries {
            if k.wire_type() != key || v.wire_type() != value {
                return Err(BusError::failed(format!(
                    "dict of '{{{}{}}}' cannot hold a '{{{}{}}}' entry",
                    key,
                    value,
                    k.signature(),
                    v.signature()
                )));
            }
        }
        Ok(Self::Dict {
            key,
            value,
            entries,
        })
    }

    /// The complete type of this value.
    pub fn wire_type(&self) -> WireType {
        match self {
            Self::Byte(_) => WireType::Byte,
            Self::Bool(_) => WireType::Boolean,
            Self::I16(_) => WireType::Int16,
            Self::U16(_) => WireType::UInt16,
            Self::I32(_) => WireType::Int32,
            Self::U32(_) => WireType::UInt32,
            Self::I64(_) => WireType::Int64,
            Self::U64(_) => WireType::UInt64,
            Self::F64(_) => WireType::Double,
            Self::Str(_) => WireType::String,
            Self::ObjectPath(_) => WireType::ObjectPath,
            Self::Signature(_) => WireType::Signature,
            Self::Variant(_) => WireType::Variant,
            Self::Struct(fields) => WireType::Struct(fields.iter().map(Value::wire_type).collect()),
            Self::Array { element, .. } => WireType::Array(Box::new(element.clone())),
            Self::Dict { key, value, .. } => WireType::Array(Box::new(WireType::DictEntry(
                Box::new(key.clone()),
                Box::new(value.clone()),
            ))),
        }
    }

    /// Signature string of this value.
    pub fn signature(&self) -> String {
        self.wire_type().signature()
    }

    /// Try to get as string (plain strings only).
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_object_path(&self) -> Option<&ObjectPath> {
        match self {
            Self::ObjectPath(p) => Some(p),
            _ => None,
        }
    }

    /// Unwrap one level of variant.
    pub fn as_variant(&self) -> Option<&Value> {
        match self {
            Self::Variant(inner) => Some(inner),
            _ => None,
        }
    }

    pub fn as_struct(&self) -> Option<&[Value]> {
        match self {
            Self::Struct(fields) => Some(fields),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Self::Array { items, .. } => Some(items),
            _ => None,
        }
    }

    pub fn as_dict(&self) -> Option<&[(Value, Value)]> {
        match self {
            Self::Dict { entries, .. } => Some(entries),
            _ => None,
        }
    }

    /// Look up a string-keyed dict entry.
    pub fn dict_get(&self, key: &str) -> Option<&Value> {
        self.as_dict()?
            .iter()
            .find(|(k, _)| k.as_str() == Some(key))
            .map(|(_, v)| v)
    }
}

impl From<u8> for Value {
    fn from(v: u8) -> Self {
        Self::Byte(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i16> for Value {
    fn from(v: i16) -> Self {
        Self::I16(v)
    }
}

impl From<u16> for Value {
    fn from(v: u16) -> Self {
        Self::U16(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::I32(v)
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Self::U32(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::I64(v)
    }
}

impl From<u64> for Value {
    fn from(v: u64) -> Self {
        Self::U64(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::F64(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::Str(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Str(v.to_string())
    }
}

impl From<ObjectPath> for Value {
    fn from(v: ObjectPath) -> Self {
        Self::ObjectPath(v)
    }
}

/// Text form in the style of `busctl`: strings and paths quoted,
/// containers bracketed, variants prefixed with their signature.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Byte(v) => write!(f, "{}", v),
            Self::Bool(v) => write!(f, "{}", v),
            Self::I16(v) => write!(f, "{}", v),
            Self::U16(v) => write!(f, "{}", v),
            Self::I32(v) => write!(f, "{}", v),
            Self::U32(v) => write!(f, "{}", v),
            Self::I64(v) => write!(f, "{}", v),
            Self::U64(v) => write!(f, "{}", v),
            Self::F64(v) => write!(f, "{}", v),
            Self::Str(v) | Self::Signature(v) => write!(f, "{:?}", v),
            Self::ObjectPath(p) => write!(f, "{:?}", p.as_str()),
            Self::Variant(inner) => write!(f, "{} {}", inner.signature(), inner),
            Self::Struct(fields) => {
                f.write_str("(")?;
                write_joined(f, fields.iter())?;
                f.write_str(")")
            }
            Self::Array { items, .. } => {
                f.write_str("[")?;
                write_joined(f, items.iter())?;
                f.write_str("]")
            }
            Self::Dict { entries, .. } => {
                f.write_str("{")?;
                for (i, (k, v)) in entries.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}: {}", k, v)?;
                }
                f.write_str("}")
            }
        }
    }
}

fn write_joined<'a>(
    f: &mut fmt::Formatter<'_>,
    values: impl Iterator<Item = &'a Value>,
) -> fmt::Result {
    for (i, v) in values.enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{}", v)?;
    }
    Ok(())
}
