// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! D-Bus body marshaling for [`Value`] trees.
//!
//! Offsets are relative to the start of the body; the body itself always
//! begins on an 8-byte boundary in a message, so alignment computed here is
//! the alignment on the wire.

use crate::error::{BusError, BusResult};
use crate::value::Value;

/// Largest message the bus accepts (128 MiB)
pub const MAX_MESSAGE_SIZE: usize = 134_217_728;

/// Largest array payload the bus accepts (64 MiB)
pub const MAX_ARRAY_SIZE: usize = 67_108_864;

/// Byte order of an encoded body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "yaml", derive(serde::Deserialize))]
#[cfg_attr(feature = "yaml", serde(rename_all = "lowercase"))]
pub enum Endian {
    #[default]
    Little,
    Big,
}

impl Endian {
    /// Endianness marker byte of the message header
    pub fn marker(self) -> u8 {
        match self {
            Self::Little => b'l',
            Self::Big => b'B',
        }
    }
}

/// Concatenated signature of a message body.
pub fn body_signature(values: &[Value]) -> String {
    let mut sig = String::new();
    for v in values {
        v.wire_type().write_signature(&mut sig);
    }
    sig
}

/// Encode a message body.
///
/// Fails with [`BusError::NoMemory`] when the body would exceed `limit`
/// bytes, when an array payload exceeds [`MAX_ARRAY_SIZE`], or when the
/// buffer cannot grow. Nothing is returned on failure.
pub fn encode_body(values: &[Value], endian: Endian, limit: usize) -> BusResult<Vec<u8>> {
    let mut writer = BodyWriter::new(endian, limit.min(MAX_MESSAGE_SIZE));
    for v in values {
        writer.write_value(v)?;
    }
    Ok(writer.into_bytes())
}

struct BodyWriter {
    buf: Vec<u8>,
    endian: Endian,
    limit: usize,
}

impl BodyWriter {
    fn new(endian: Endian, limit: usize) -> Self {
        Self {
            buf: Vec::new(),
            endian,
            limit,
        }
    }

    fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    fn reserve(&mut self, extra: usize) -> BusResult<()> {
        let needed = self.buf.len().checked_add(extra).ok_or(BusError::NoMemory)?;
        if needed > self.limit {
            log::debug!(
                "[wire] body would grow to {} bytes, limit is {}",
                needed,
                self.limit
            );
            return Err(BusError::NoMemory);
        }
        self.buf.try_reserve(extra)?;
        Ok(())
    }

    fn align(&mut self, alignment: usize) -> BusResult<()> {
        let padding = (alignment - (self.buf.len() % alignment)) % alignment;
        self.reserve(padding)?;
        self.buf.extend(std::iter::repeat_n(0, padding));
        Ok(())
    }

    fn put_bytes(&mut self, bytes: &[u8]) -> BusResult<()> {
        self.reserve(bytes.len())?;
        self.buf.extend_from_slice(bytes);
        Ok(())
    }

    fn put_u16(&mut self, v: u16) -> BusResult<()> {
        self.align(2)?;
        match self.endian {
            Endian::Little => self.put_bytes(&v.to_le_bytes()),
            Endian::Big => self.put_bytes(&v.to_be_bytes()),
        }
    }

    fn put_u32(&mut self, v: u32) -> BusResult<()> {
        self.align(4)?;
        match self.endian {
            Endian::Little => self.put_bytes(&v.to_le_bytes()),
            Endian::Big => self.put_bytes(&v.to_be_bytes()),
        }
    }

    fn put_u64(&mut self, v: u64) -> BusResult<()> {
        self.align(8)?;
        match self.endian {
            Endian::Little => self.put_bytes(&v.to_le_bytes()),
            Endian::Big => self.put_bytes(&v.to_be_bytes()),
        }
    }

    fn put_string(&mut self, s: &str) -> BusResult<()> {
        if s.as_bytes().contains(&0) {
            return Err(BusError::invalid_args("string contains an embedded NUL"));
        }
        let len = u32::try_from(s.len()).map_err(|_| BusError::NoMemory)?;
        self.put_u32(len)?;
        self.put_bytes(s.as_bytes())?;
        self.put_bytes(&[0])
    }

    fn put_signature(&mut self, sig: &str) -> BusResult<()> {
        let len = u8::try_from(sig.len())
            .map_err(|_| BusError::invalid_args(format!("signature '{}' too long", sig)))?;
        self.put_bytes(&[len])?;
        self.put_bytes(sig.as_bytes())?;
        self.put_bytes(&[0])
    }

    fn write_value(&mut self, value: &Value) -> BusResult<()> {
        match value {
            Value::Byte(v) => self.put_bytes(&[*v]),
            Value::Bool(v) => self.put_u32(u32::from(*v)),
            Value::I16(v) => self.put_u16(u16::from_ne_bytes(v.to_ne_bytes())),
            Value::U16(v) => self.put_u16(*v),
            Value::I32(v) => self.put_u32(u32::from_ne_bytes(v.to_ne_bytes())),
            Value::U32(v) => self.put_u32(*v),
            Value::I64(v) => self.put_u64(u64::from_ne_bytes(v.to_ne_bytes())),
            Value::U64(v) => self.put_u64(*v),
            Value::F64(v) => self.put_u64(v.to_bits()),
            Value::Str(s) => self.put_string(s),
            Value::ObjectPath(p) => self.put_string(p.as_str()),
            Value::Signature(sig) => self.put_signature(sig),
            Value::Variant(inner) => {
                self.put_signature(&inner.signature())?;
                self.write_value(inner)
            }
            Value::Struct(fields) => {
                self.align(8)?;
                for field in fields {
                    self.write_value(field)?;
                }
                Ok(())
            }
            Value::Array { element, items } => {
                self.write_array(element.alignment(), items.iter(), |w, item| {
                    w.write_value(item)
                })
            }
            Value::Dict { entries, .. } => self.write_array(8, entries.iter(), |w, (k, v)| {
                w.align(8)?;
                w.write_value(k)?;
                w.write_value(v)
            }),
        }
    }

    /// Length prefix, padding to the element alignment (not counted in the
    /// length), then the elements. The prefix is patched once the payload
    /// size is known.
    fn write_array<T>(
        &mut self,
        element_alignment: usize,
        items: impl Iterator<Item = T>,
        mut write_item: impl FnMut(&mut Self, T) -> BusResult<()>,
    ) -> BusResult<()> {
        self.put_u32(0)?;
        let len_pos = self.buf.len() - 4;
        self.align(element_alignment)?;
        let start = self.buf.len();

        for item in items {
            write_item(self, item)?;
        }

        let payload = self.buf.len() - start;
        if payload > MAX_ARRAY_SIZE {
            return Err(BusError::NoMemory);
        }
        let len = u32::try_from(payload).map_err(|_| BusError::NoMemory)?;
        let bytes = match self.endian {
            Endian::Little => len.to_le_bytes(),
            Endian::Big => len.to_be_bytes(),
        };
        self.buf[len_pos..len_pos + 4].copy_from_slice(&bytes);
        Ok(())
    }
}
