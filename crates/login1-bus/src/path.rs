// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Object path codec.
//!
//! Users live under `/org/freedesktop/login1/user/<uid>`, sessions under
//! `/org/freedesktop/login1/session/<escaped-id>`. The two prefixes are
//! disjoint, so a session path never decodes as a user path.

use crate::error::{BusError, BusResult};
use std::fmt;

/// Prefix of every exposed user object
pub const USER_PATH_PREFIX: &str = "/org/freedesktop/login1/user/";

/// Prefix of every session object
pub const SESSION_PATH_PREFIX: &str = "/org/freedesktop/login1/session/";

/// A syntactically valid D-Bus object path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectPath(String);

impl ObjectPath {
    /// Validate and wrap an object path.
    pub fn new(path: impl Into<String>) -> BusResult<Self> {
        let path = path.into();
        if is_valid_object_path(&path) {
            Ok(Self(path))
        } else {
            Err(BusError::InvalidPath(path))
        }
    }

    /// The root path `/`.
    pub fn root() -> Self {
        Self("/".to_string())
    }

    /// Check if this is the root path
    pub fn is_root(&self) -> bool {
        self.0 == "/"
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Caller guarantees `path` is valid (built from a prefix plus an
    /// already-safe label).
    fn from_trusted(path: String) -> Self {
        debug_assert!(is_valid_object_path(&path), "invalid path {}", path);
        Self(path)
    }
}

impl fmt::Display for ObjectPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ObjectPath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<ObjectPath> for String {
    fn from(path: ObjectPath) -> Self {
        path.0
    }
}

impl TryFrom<&str> for ObjectPath {
    type Error = BusError;

    fn try_from(value: &str) -> BusResult<Self> {
        Self::new(value)
    }
}

/// Check the D-Bus object path grammar.
///
/// `/` alone, or `/`-separated non-empty elements of `[A-Za-z0-9_]`,
/// without a trailing slash.
pub fn is_valid_object_path(path: &str) -> bool {
    if path == "/" {
        return true;
    }
    let Some(rest) = path.strip_prefix('/') else {
        return false;
    };
    rest.split('/').all(|element| {
        !element.is_empty()
            && element
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || b == b'_')
    })
}

/// Encode a UID into its user object path.
pub fn user_path(uid: u32) -> ObjectPath {
    ObjectPath::from_trusted(format!("{}{}", USER_PATH_PREFIX, uid))
}

/// Decode the UID embedded in a user object path.
///
/// Fails with [`BusError::InvalidPath`] when the prefix does not match and
/// with [`BusError::MalformedIdentifier`] when the suffix is not a plain
/// decimal number. Signs are rejected, so negative identifiers never
/// decode. A number too large for a UID names no user and fails with
/// [`BusError::UnknownObject`].
pub fn uid_from_path(path: &str) -> BusResult<u32> {
    let suffix = path
        .strip_prefix(USER_PATH_PREFIX)
        .ok_or_else(|| BusError::InvalidPath(path.to_string()))?;

    if suffix.is_empty() || !suffix.bytes().all(|b| b.is_ascii_digit()) {
        return Err(BusError::MalformedIdentifier(suffix.to_string()));
    }

    suffix
        .parse::<u32>()
        .map_err(|_| BusError::UnknownObject("Unknown user".to_string()))
}

/// Escape an arbitrary label into a single object path element.
///
/// ASCII alphanumerics pass through, except a leading digit; every other
/// byte becomes `_xx` with lowercase hex digits. The empty label encodes
/// as `_`.
pub fn escape_path_label(label: &str) -> String {
    if label.is_empty() {
        return "_".to_string();
    }

    let mut out = String::with_capacity(label.len());
    for (i, b) in label.bytes().enumerate() {
        if b.is_ascii_alphabetic() || (i > 0 && b.is_ascii_digit()) {
            out.push(b as char);
        } else {
            out.push('_');
            out.push(hex_digit(b >> 4));
            out.push(hex_digit(b & 0x0f));
        }
    }
    out
}

/// Reverse [`escape_path_label`]. Returns `None` for input that no label
/// escapes to.
pub fn unescape_path_label(escaped: &str) -> Option<String> {
    if escaped == "_" {
        return Some(String::new());
    }

    let bytes = escaped.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'_' => {
                let hi = from_hex_digit(*bytes.get(i + 1)?)?;
                let lo = from_hex_digit(*bytes.get(i + 2)?)?;
                out.push((hi << 4) | lo);
                i += 3;
            }
            b if b.is_ascii_alphanumeric() => {
                out.push(b);
                i += 1;
            }
            _ => return None,
        }
    }
    String::from_utf8(out).ok()
}

/// Encode a session identifier into its session object path.
pub fn session_path(session_id: &str) -> ObjectPath {
    ObjectPath::from_trusted(format!("{}{}", SESSION_PATH_PREFIX, escape_path_label(session_id)))
}

/// Decode the session identifier from a session object path.
pub fn session_id_from_path(path: &str) -> BusResult<String> {
    let label = path
        .strip_prefix(SESSION_PATH_PREFIX)
        .ok_or_else(|| BusError::InvalidPath(path.to_string()))?;

    unescape_path_label(label).ok_or_else(|| BusError::MalformedIdentifier(label.to_string()))
}

fn hex_digit(nibble: u8) -> char {
    char::from(b"0123456789abcdef"[usize::from(nibble & 0x0f)])
}

fn from_hex_digit(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}
