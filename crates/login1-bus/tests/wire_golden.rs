// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com
//
// D-Bus body golden vectors for the reply shapes a user object produces.
// Bytes were checked against the marshaling rules by hand: natural
// alignment, u32 length + NUL for strings, u8 length for signatures,
// 8-byte struct/dict-entry boundaries, array length excluding the padding
// that precedes the first element.

#![allow(clippy::unreadable_literal)]

use login1_bus::path::session_path;
use login1_bus::wire::{encode_body, MAX_MESSAGE_SIZE};
use login1_bus::{Endian, ObjectPath, Value, WireType};

fn le(values: &[Value]) -> Vec<u8> {
    encode_body(values, Endian::Little, MAX_MESSAGE_SIZE).unwrap()
}

fn be(values: &[Value]) -> Vec<u8> {
    encode_body(values, Endian::Big, MAX_MESSAGE_SIZE).unwrap()
}

fn so(id: &str, path: ObjectPath) -> Value {
    Value::structure(vec![Value::from(id), Value::from(path)])
}

#[test]
fn golden_get_uid() {
    assert_eq!(
        le(&[Value::variant(1000u32)]),
        [0x01, b'u', 0x00, 0x00, 0xe8, 0x03, 0x00, 0x00]
    );
    assert_eq!(
        be(&[Value::variant(1000u32)]),
        [0x01, b'u', 0x00, 0x00, 0x00, 0x00, 0x03, 0xe8]
    );
}

#[test]
fn golden_get_name() {
    assert_eq!(
        le(&[Value::variant("alice")]),
        [
            0x01, b's', 0x00, 0x00, // signature "s" + pad
            0x05, 0x00, 0x00, 0x00, b'a', b'l', b'i', b'c', b'e', 0x00,
        ]
    );
}

#[test]
fn golden_display_unset() {
    let display = so("", ObjectPath::root());
    assert_eq!(
        le(&[Value::variant(display)]),
        [
            0x04, b'(', b's', b'o', b')', 0x00, // signature "(so)"
            0x00, 0x00, // pad to struct boundary
            0x00, 0x00, 0x00, 0x00, 0x00, // ""
            0x00, 0x00, 0x00, // pad
            0x01, 0x00, 0x00, 0x00, b'/', 0x00, // "/"
        ]
    );
}

#[test]
fn golden_sessions_empty() {
    let element = WireType::parse("(so)").unwrap();
    let sessions = Value::array(element, Vec::new()).unwrap();
    assert_eq!(
        le(&[Value::variant(sessions)]),
        [
            0x05, b'a', b'(', b's', b'o', b')', 0x00, // signature "a(so)"
            0x00, // pad
            0x00, 0x00, 0x00, 0x00, // length 0
            0x00, 0x00, 0x00, 0x00, // pad to element boundary
        ]
    );
}

#[test]
fn golden_sessions_one() {
    let element = WireType::parse("(so)").unwrap();
    let sessions = Value::array(element, vec![so("1", session_path("1"))]).unwrap();
    let mut expected = vec![
        0x00, 0x00, 0x00, 0x00, // length, patched below
        0x00, 0x00, 0x00, 0x00, // pad to struct
        0x01, 0x00, 0x00, 0x00, b'1', 0x00, // "1"
        0x00, 0x00, // pad
    ];
    let path = b"/org/freedesktop/login1/session/_31";
    expected.extend_from_slice(&(path.len() as u32).to_le_bytes());
    expected.extend_from_slice(path);
    expected.push(0);
    let payload = (expected.len() - 8) as u32;
    expected[0..4].copy_from_slice(&payload.to_le_bytes());

    assert_eq!(le(&[sessions]), expected);
}

#[test]
fn golden_machine_id() {
    let id = "0123456789abcdef0123456789abcdef";
    let bytes = le(&[Value::from(id)]);
    assert_eq!(&bytes[..4], &[32, 0, 0, 0]);
    assert_eq!(&bytes[4..36], id.as_bytes());
    assert_eq!(bytes[36], 0);
    assert_eq!(bytes.len(), 37);
}

#[test]
fn golden_empty_body() {
    assert!(le(&[]).is_empty());
}
