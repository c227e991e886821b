// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Inbound calls, outbound replies, and the handler contract.
//!
//! A handler receives an already-framed [`MethodCall`] and answers with a
//! [`HandlerResult`]: a reply, a request to retry once memory is available,
//! or a note that the call is not for this object.

use crate::config::DispatcherConfig;
use crate::error::{names, BusError, BusResult};
use crate::value::Value;
use crate::wire;

/// A method call as delivered by the transport.
#[derive(Debug, Clone, PartialEq)]
pub struct MethodCall {
    serial: u32,
    sender: Option<String>,
    path: String,
    interface: Option<String>,
    member: String,
    body: Vec<Value>,
}

impl MethodCall {
    /// Create a call. `path` is kept verbatim; whether it is a valid
    /// object path is the handler's concern.
    pub fn new(
        path: impl Into<String>,
        interface: Option<&str>,
        member: impl Into<String>,
    ) -> Self {
        Self {
            serial: 1,
            sender: None,
            path: path.into(),
            interface: interface.map(str::to_string),
            member: member.into(),
            body: Vec::new(),
        }
    }

    /// Append one body argument.
    pub fn arg(mut self, value: impl Into<Value>) -> Self {
        self.body.push(value.into());
        self
    }

    /// Append several body arguments.
    pub fn args(mut self, values: impl IntoIterator<Item = Value>) -> Self {
        self.body.extend(values);
        self
    }

    pub fn serial(mut self, serial: u32) -> Self {
        self.serial = serial;
        self
    }

    pub fn sender(mut self, sender: impl Into<String>) -> Self {
        self.sender = Some(sender.into());
        self
    }

    pub fn get_sender(&self) -> Option<&str> {
        self.sender.as_deref()
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn interface(&self) -> Option<&str> {
        self.interface.as_deref()
    }

    pub fn member(&self) -> &str {
        &self.member
    }

    pub fn body(&self) -> &[Value] {
        &self.body
    }

    /// Signature of the body
    pub fn signature(&self) -> String {
        wire::body_signature(&self.body)
    }

    /// Check member and interface. A call without an interface header
    /// matches on the member alone.
    pub fn is_method_call(&self, interface: &str, member: &str) -> bool {
        self.member == member && self.interface.as_deref().is_none_or(|i| i == interface)
    }

    /// Build a successful reply carrying `body`, encoded as `config` says.
    ///
    /// Fails with [`BusError::NoMemory`] if the body does not fit.
    pub fn method_return(&self, body: Vec<Value>, config: &DispatcherConfig) -> BusResult<Reply> {
        let encoded = wire::encode_body(&body, config.endian, config.max_reply_size)?;
        Ok(Reply::Return(MethodReturn {
            reply_serial: self.serial,
            destination: self.sender.clone(),
            signature: wire::body_signature(&body),
            body,
            encoded,
        }))
    }

    /// Build an error reply.
    pub fn error_reply(&self, name: &str, message: impl Into<String>) -> Reply {
        Reply::Error(ErrorReply {
            reply_serial: self.serial,
            destination: self.sender.clone(),
            name: name.to_string(),
            message: message.into(),
        })
    }
}

/// Successful reply
#[derive(Debug, Clone, PartialEq)]
pub struct MethodReturn {
    pub reply_serial: u32,
    pub destination: Option<String>,
    pub signature: String,
    pub body: Vec<Value>,
    /// Body in wire format
    pub encoded: Vec<u8>,
}

/// Fault reply
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorReply {
    pub reply_serial: u32,
    pub destination: Option<String>,
    /// D-Bus error name, e.g. `org.freedesktop.DBus.Error.UnknownObject`
    pub name: String,
    pub message: String,
}

/// Reply to a method call
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    Return(MethodReturn),
    Error(ErrorReply),
}

impl Reply {
    pub fn as_return(&self) -> Option<&MethodReturn> {
        match self {
            Self::Return(r) => Some(r),
            Self::Error(_) => None,
        }
    }

    pub fn as_error(&self) -> Option<&ErrorReply> {
        match self {
            Self::Error(e) => Some(e),
            Self::Return(_) => None,
        }
    }

    /// Error name, if this is a fault
    pub fn error_name(&self) -> Option<&str> {
        self.as_error().map(|e| e.name.as_str())
    }
}

/// Outcome of offering a call to a handler.
#[derive(Debug, Clone, PartialEq)]
pub enum HandlerResult {
    /// Exactly one reply to send
    Handled(Reply),
    /// Resources ran out; the transport should redeliver the call later
    NeedMemory,
    /// The call is not addressed to anything this handler serves
    NotHandled,
}

impl HandlerResult {
    /// Reply the transport should send, synthesizing `UnknownMethod` for an
    /// unhandled call. `None` for [`HandlerResult::NeedMemory`].
    pub fn into_reply(self, call: &MethodCall) -> Option<Reply> {
        match self {
            Self::Handled(reply) => Some(reply),
            Self::NeedMemory => None,
            Self::NotHandled => {
                let err = BusError::UnknownMethod {
                    interface: call.interface().unwrap_or_default().to_string(),
                    member: call.member().to_string(),
                    signature: call.signature(),
                };
                Some(call.error_reply(names::UNKNOWN_METHOD, err.to_string()))
            }
        }
    }

    pub fn is_handled(&self) -> bool {
        matches!(self, Self::Handled(_))
    }

    pub fn reply(&self) -> Option<&Reply> {
        match self {
            Self::Handled(reply) => Some(reply),
            _ => None,
        }
    }
}

/// Handler for calls addressed to one object subtree.
pub trait MessageHandler: Send + Sync {
    fn handle(&self, call: &MethodCall) -> HandlerResult;
}

/// A function-based message handler.
impl<F> MessageHandler for F
where
    F: Fn(&MethodCall) -> HandlerResult + Send + Sync,
{
    fn handle(&self, call: &MethodCall) -> HandlerResult {
        self(call)
    }
}
