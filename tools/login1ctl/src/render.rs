// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Text rendering of replies.

use colored::*;
use login1_bus::{MethodReturn, Value};
use std::fmt::Write;

/// `SIGNATURE value...` on one line, like `busctl call`. A lone string
/// (introspection XML, machine id) is printed verbatim. Empty replies print
/// nothing.
pub fn method_return(ret: &MethodReturn) -> String {
    match ret.body.as_slice() {
        [] => String::new(),
        [Value::Str(text)] if text.contains('\n') => text.clone(),
        body => {
            let mut out = ret.signature.cyan().to_string();
            for value in body {
                let _ = write!(out, " {}", value);
            }
            out.push('\n');
            out
        }
    }
}

/// Classic 16-bytes-per-line hex dump with an ASCII column.
pub fn hex_dump(bytes: &[u8]) -> String {
    let mut out = String::new();
    for (i, chunk) in bytes.chunks(16).enumerate() {
        let _ = write!(out, "{:08x}  ", i * 16);
        for (j, b) in chunk.iter().enumerate() {
            if j == 8 {
                out.push(' ');
            }
            let _ = write!(out, "{:02x} ", b);
        }
        for _ in chunk.len()..16 {
            out.push_str("   ");
        }
        if chunk.len() <= 8 {
            out.push(' ');
        }
        out.push_str(" |");
        for b in chunk {
            if b.is_ascii_graphic() || *b == b' ' {
                out.push(char::from(*b));
            } else {
                out.push('.');
            }
        }
        out.push_str("|\n");
    }
    out
}
