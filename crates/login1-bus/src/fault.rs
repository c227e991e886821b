// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Translation of internal failures into what the transport sees.

use crate::error::{BusError, BusResult};
use crate::message::{HandlerResult, MethodCall, Reply};

/// Turn `err` into the handler outcome for `call`.
///
/// Resource exhaustion never becomes a fault reply; it is reported as
/// [`HandlerResult::NeedMemory`] so the transport can retry. Every other
/// error becomes exactly one error reply named after the error.
pub fn reply_for_error(call: &MethodCall, err: &BusError) -> HandlerResult {
    if err.is_transient() {
        log::error!(
            "[fault] {} {}.{}: out of memory, deferring",
            call.path(),
            call.interface().unwrap_or("-"),
            call.member()
        );
        return HandlerResult::NeedMemory;
    }

    log::warn!(
        "[fault] {} {}.{}: {} ({})",
        call.path(),
        call.interface().unwrap_or("-"),
        call.member(),
        err,
        err.error_name()
    );
    HandlerResult::Handled(call.error_reply(err.error_name(), err.to_string()))
}

/// Unwrap `result` into a handler outcome, translating the error side.
pub fn handled_or_fault(call: &MethodCall, result: BusResult<Reply>) -> HandlerResult {
    match result {
        Ok(reply) => HandlerResult::Handled(reply),
        Err(err) => reply_for_error(call, &err),
    }
}
