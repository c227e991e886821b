// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Runtime description of D-Bus wire types.
//!
//! A [`WireType`] is the parsed form of a single complete type signature
//! such as `u`, `(so)` or `a{sv}`. Property descriptors declare their type
//! as a signature string; parsing it here lets the dispatcher compare the
//! declared type against what a marshaler actually produced.

use crate::error::BusError;
use std::fmt;

/// Maximum signature length in bytes
pub const MAX_SIGNATURE_LEN: usize = 255;

/// Maximum nesting of arrays, and separately of structs
pub const MAX_NESTING: u8 = 32;

/// A single complete D-Bus type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum WireType {
    Byte,
    Boolean,
    Int16,
    UInt16,
    Int32,
    UInt32,
    Int64,
    UInt64,
    Double,
    String,
    ObjectPath,
    Signature,
    Variant,
    /// Array of one element type
    Array(Box<WireType>),
    /// Struct with ordered fields
    Struct(Vec<WireType>),
    /// Dict entry; only valid as an array element
    DictEntry(Box<WireType>, Box<WireType>),
}

impl WireType {
    /// Parse exactly one complete type.
    pub fn parse(signature: &str) -> Result<Self, SignatureError> {
        if signature.is_empty() {
            return Err(SignatureError::Empty);
        }
        if signature.len() > MAX_SIGNATURE_LEN {
            return Err(SignatureError::TooLong(signature.len()));
        }

        let bytes = signature.as_bytes();
        let mut pos = 0;
        let ty = parse_single(bytes, &mut pos, Nesting::default())?;
        if pos != bytes.len() {
            return Err(SignatureError::TrailingTypes(signature.to_string()));
        }
        Ok(ty)
    }

    /// Render this type as a signature string.
    pub fn signature(&self) -> String {
        let mut out = String::new();
        self.write_signature(&mut out);
        out
    }

    /// Append the signature of this type to `out`.
    pub fn write_signature(&self, out: &mut String) {
        match self {
            Self::Array(elem) => {
                out.push('a');
                elem.write_signature(out);
            }
            Self::Struct(fields) => {
                out.push('(');
                for field in fields {
                    field.write_signature(out);
                }
                out.push(')');
            }
            Self::DictEntry(key, value) => {
                out.push('{');
                key.write_signature(out);
                value.write_signature(out);
                out.push('}');
            }
            basic => out.push(basic.code()),
        }
    }

    /// Leading type code character
    pub fn code(&self) -> char {
        match self {
            Self::Byte => 'y',
            Self::Boolean => 'b',
            Self::Int16 => 'n',
            Self::UInt16 => 'q',
            Self::Int32 => 'i',
            Self::UInt32 => 'u',
            Self::Int64 => 'x',
            Self::UInt64 => 't',
            Self::Double => 'd',
            Self::String => 's',
            Self::ObjectPath => 'o',
            Self::Signature => 'g',
            Self::Variant => 'v',
            Self::Array(_) => 'a',
            Self::Struct(_) => '(',
            Self::DictEntry(_, _) => '{',
        }
    }

    /// Wire alignment in bytes.
    pub fn alignment(&self) -> usize {
        match self {
            Self::Byte | Self::Signature | Self::Variant => 1,
            Self::Int16 | Self::UInt16 => 2,
            Self::Boolean
            | Self::Int32
            | Self::UInt32
            | Self::String
            | Self::ObjectPath
            | Self::Array(_) => 4,
            Self::Int64 | Self::UInt64 | Self::Double | Self::Struct(_) | Self::DictEntry(_, _) => {
                8
            }
        }
    }

    /// Basic types can be dict keys.
    pub fn is_basic(&self) -> bool {
        !matches!(
            self,
            Self::Variant | Self::Array(_) | Self::Struct(_) | Self::DictEntry(_, _)
        )
    }
}

impl fmt::Display for WireType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.signature())
    }
}

/// Errors for signature parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignatureError {
    Empty,
    TooLong(usize),
    UnknownTypeCode(char),
    UnexpectedEnd,
    UnterminatedStruct,
    EmptyStruct,
    UnterminatedDict,
    DictEntryOutsideArray,
    InvalidDictKey(String),
    NestingTooDeep,
    TrailingTypes(String),
}

impl fmt::Display for SignatureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "Signature is empty"),
            Self::TooLong(len) => write!(
                f,
                "Signature is {} bytes long, maximum is {}",
                len, MAX_SIGNATURE_LEN
            ),
            Self::UnknownTypeCode(c) => write!(f, "Unknown type code '{}'", c),
            Self::UnexpectedEnd => write!(f, "Signature ends inside a container"),
            Self::UnterminatedStruct => write!(f, "Struct signature lacks a closing ')'"),
            Self::EmptyStruct => write!(f, "Struct signature has no fields"),
            Self::UnterminatedDict => write!(f, "Dict entry signature lacks a closing '}}'"),
            Self::DictEntryOutsideArray => write!(f, "Dict entry outside of an array"),
            Self::InvalidDictKey(sig) => write!(f, "Dict key '{}' is not a basic type", sig),
            Self::NestingTooDeep => write!(f, "Signature nests containers too deeply"),
            Self::TrailingTypes(sig) => {
                write!(f, "Signature '{}' holds more than one complete type", sig)
            }
        }
    }
}

impl std::error::Error for SignatureError {}

impl From<SignatureError> for BusError {
    fn from(e: SignatureError) -> Self {
        BusError::InvalidArgs(e.to_string())
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct Nesting {
    arrays: u8,
    structs: u8,
}

impl Nesting {
    fn array(self) -> Result<Self, SignatureError> {
        if self.arrays >= MAX_NESTING {
            return Err(SignatureError::NestingTooDeep);
        }
        Ok(Self {
            arrays: self.arrays + 1,
            ..self
        })
    }

    fn structure(self) -> Result<Self, SignatureError> {
        if self.structs >= MAX_NESTING {
            return Err(SignatureError::NestingTooDeep);
        }
        Ok(Self {
            structs: self.structs + 1,
            ..self
        })
    }
}

fn parse_single(
    bytes: &[u8],
    pos: &mut usize,
    nesting: Nesting,
) -> Result<WireType, SignatureError> {
    let c = *bytes.get(*pos).ok_or(SignatureError::UnexpectedEnd)?;
    *pos += 1;

    let ty = match c {
        b'y' => WireType::Byte,
        b'b' => WireType::Boolean,
        b'n' => WireType::Int16,
        b'q' => WireType::UInt16,
        b'i' => WireType::Int32,
        b'u' => WireType::UInt32,
        b'x' => WireType::Int64,
        b't' => WireType::UInt64,
        b'd' => WireType::Double,
        b's' => WireType::String,
        b'o' => WireType::ObjectPath,
        b'g' => WireType::Signature,
        b'v' => WireType::Variant,
        b'a' => {
            let inner = nesting.array()?;
            if bytes.get(*pos) == Some(&b'{') {
                *pos += 1;
                let entry = inner.structure()?;
                let key = parse_single(bytes, pos, entry)?;
                if !key.is_basic() {
                    return Err(SignatureError::InvalidDictKey(key.signature()));
                }
                let value = parse_single(bytes, pos, entry)?;
                if bytes.get(*pos) != Some(&b'}') {
                    return Err(SignatureError::UnterminatedDict);
                }
                *pos += 1;
                WireType::Array(Box::new(WireType::DictEntry(Box::new(key), Box::new(value))))
            } else {
                WireType::Array(Box::new(parse_single(bytes, pos, inner)?))
            }
        }
        b'(' => {
            let inner = nesting.structure()?;
            let mut fields = Vec::new();
            loop {
                match bytes.get(*pos) {
                    None => return Err(SignatureError::UnterminatedStruct),
                    Some(b')') => {
                        *pos += 1;
                        break;
                    }
                    Some(_) => fields.push(parse_single(bytes, pos, inner)?),
                }
            }
            if fields.is_empty() {
                return Err(SignatureError::EmptyStruct);
            }
            WireType::Struct(fields)
        }
        b'{' => return Err(SignatureError::DictEntryOutsideArray),
        other => return Err(SignatureError::UnknownTypeCode(char::from(other))),
    };
    Ok(ty)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_basic_types() {
        assert_eq!(WireType::parse("u"), Ok(WireType::UInt32));
        assert_eq!(WireType::parse("s"), Ok(WireType::String));
        assert_eq!(WireType::parse("o"), Ok(WireType::ObjectPath));
        assert_eq!(WireType::parse("v"), Ok(WireType::Variant));
    }

    #[test]
    fn parse_containers() {
        let so = WireType::Struct(vec![WireType::String, WireType::ObjectPath]);
        assert_eq!(WireType::parse("(so)"), Ok(so.clone()));
        assert_eq!(WireType::parse("a(so)"), Ok(WireType::Array(Box::new(so))));
        assert_eq!(
            WireType::parse("a{sv}"),
            Ok(WireType::Array(Box::new(WireType::DictEntry(
                Box::new(WireType::String),
                Box::new(WireType::Variant)
            ))))
        );
    }

    #[test]
    fn signature_renders_back() {
        for sig in ["u", "(so)", "a(so)", "a{sv}", "a{oa(ub)}", "((yy)at)"] {
            assert_eq!(WireType::parse(sig).unwrap().signature(), sig);
        }
    }

    #[test]
    fn parse_single_complete_type() {
        assert_eq!(
            WireType::parse("ss"),
            Err(SignatureError::TrailingTypes("ss".into()))
        );
        assert_eq!(
            WireType::parse("a(so)u"),
            Err(SignatureError::TrailingTypes("a(so)u".into()))
        );
        let long = "a".repeat(MAX_SIGNATURE_LEN) + "y";
        assert_eq!(
            WireType::parse(&long),
            Err(SignatureError::TooLong(MAX_SIGNATURE_LEN + 1))
        );
    }

    #[test]
    fn reject_invalid_signatures() {
        assert_eq!(WireType::parse(""), Err(SignatureError::Empty));
        assert_eq!(
            WireType::parse("z"),
            Err(SignatureError::UnknownTypeCode('z'))
        );
        assert_eq!(WireType::parse("a"), Err(SignatureError::UnexpectedEnd));
        assert_eq!(
            WireType::parse("(so"),
            Err(SignatureError::UnterminatedStruct)
        );
        assert_eq!(WireType::parse("()"), Err(SignatureError::EmptyStruct));
        assert_eq!(
            WireType::parse("{sv}"),
            Err(SignatureError::DictEntryOutsideArray)
        );
        assert_eq!(
            WireType::parse("a{sv"),
            Err(SignatureError::UnterminatedDict)
        );
        assert_eq!(
            WireType::parse("a{vs}"),
            Err(SignatureError::InvalidDictKey("v".into()))
        );
    }

    #[test]
    fn reject_deep_nesting() {
        let deep_array = "a".repeat(33) + "y";
        assert_eq!(
            WireType::parse(&deep_array),
            Err(SignatureError::NestingTooDeep)
        );
        let ok_array = "a".repeat(32) + "y";
        assert!(WireType::parse(&ok_array).is_ok());

        let deep_struct = "(".repeat(33) + "y" + &")".repeat(33);
        assert_eq!(
            WireType::parse(&deep_struct),
            Err(SignatureError::NestingTooDeep)
        );
    }

    #[test]
    fn alignment_rules() {
        assert_eq!(WireType::Byte.alignment(), 1);
        assert_eq!(WireType::Variant.alignment(), 1);
        assert_eq!(WireType::UInt32.alignment(), 4);
        assert_eq!(WireType::parse("a(so)").unwrap().alignment(), 4);
        assert_eq!(WireType::parse("(so)").unwrap().alignment(), 8);
        assert_eq!(WireType::Double.alignment(), 8);
    }
}
