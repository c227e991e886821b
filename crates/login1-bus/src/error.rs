// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Error types for the login1 object dispatcher.
//!
//! Every component returns a [`BusError`]; only the dispatcher and the
//! fault translator (see [`crate::fault`]) decide how it reaches the caller.

use std::fmt;
use std::io;

/// Result type for dispatcher operations
pub type BusResult<T> = Result<T, BusError>;

/// Well-known D-Bus error names used in fault replies.
pub mod names {
    pub const FAILED: &str = "org.freedesktop.DBus.Error.Failed";
    pub const NO_MEMORY: &str = "org.freedesktop.DBus.Error.NoMemory";
    pub const UNKNOWN_OBJECT: &str = "org.freedesktop.DBus.Error.UnknownObject";
    pub const UNKNOWN_INTERFACE: &str = "org.freedesktop.DBus.Error.UnknownInterface";
    pub const UNKNOWN_METHOD: &str = "org.freedesktop.DBus.Error.UnknownMethod";
    pub const UNKNOWN_PROPERTY: &str = "org.freedesktop.DBus.Error.UnknownProperty";
    pub const PROPERTY_READ_ONLY: &str = "org.freedesktop.DBus.Error.PropertyReadOnly";
    pub const INVALID_ARGS: &str = "org.freedesktop.DBus.Error.InvalidArgs";
    pub const ACCESS_DENIED: &str = "org.freedesktop.DBus.Error.AccessDenied";
}

/// Coarse classification of a [`BusError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Transient; the transport is asked to redeliver the call.
    ResourceExhaustion,
    /// The addressed object does not exist.
    EntityNotFound,
    /// The request itself is wrong (path, arguments, names).
    MalformedRequest,
    /// A collaborator or the core failed while serving a valid request.
    InternalFailure,
}

/// Errors that can occur while resolving, marshaling or dispatching a call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BusError {
    /// Allocation or encoding of a reply value failed
    NoMemory,

    /// No entity behind the addressed path
    UnknownObject(String),

    /// Path does not carry the expected prefix, or is not an object path
    InvalidPath(String),

    /// Identifier suffix of a path is not a non-negative integer in range
    MalformedIdentifier(String),

    /// Wrong argument count or types
    InvalidArgs(String),

    /// Interface not implemented by the object
    UnknownInterface(String),

    /// Property not declared on the interface
    UnknownProperty { interface: String, property: String },

    /// Method not declared on the interface
    UnknownMethod {
        interface: String,
        member: String,
        signature: String,
    },

    /// Write attempted on a read-only property
    PropertyReadOnly(String),

    /// Collaborator refused the action
    AccessDenied(String),

    /// Any other failure, with its description
    Failed(String),
}

impl BusError {
    /// Create a generic failure
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed(message.into())
    }

    /// Create an invalid-arguments error
    pub fn invalid_args(message: impl Into<String>) -> Self {
        Self::InvalidArgs(message.into())
    }

    /// Classify the error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NoMemory => ErrorKind::ResourceExhaustion,
            Self::UnknownObject(_) => ErrorKind::EntityNotFound,
            Self::InvalidPath(_)
            | Self::MalformedIdentifier(_)
            | Self::InvalidArgs(_)
            | Self::UnknownInterface(_)
            | Self::UnknownProperty { .. }
            | Self::UnknownMethod { .. }
            | Self::PropertyReadOnly(_) => ErrorKind::MalformedRequest,
            Self::AccessDenied(_) | Self::Failed(_) => ErrorKind::InternalFailure,
        }
    }

    /// Check if the transport should retry the call later
    pub fn is_transient(&self) -> bool {
        self.kind() == ErrorKind::ResourceExhaustion
    }

    /// D-Bus error name used when this error becomes a fault reply
    pub fn error_name(&self) -> &'static str {
        match self {
            Self::NoMemory => names::NO_MEMORY,
            Self::UnknownObject(_) => names::UNKNOWN_OBJECT,
            Self::InvalidPath(_) | Self::MalformedIdentifier(_) | Self::InvalidArgs(_) => {
                names::INVALID_ARGS
            }
            Self::UnknownInterface(_) => names::UNKNOWN_INTERFACE,
            Self::UnknownProperty { .. } => names::UNKNOWN_PROPERTY,
            Self::UnknownMethod { .. } => names::UNKNOWN_METHOD,
            Self::PropertyReadOnly(_) => names::PROPERTY_READ_ONLY,
            Self::AccessDenied(_) => names::ACCESS_DENIED,
            Self::Failed(_) => names::FAILED,
        }
    }
}

impl fmt::Display for BusError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoMemory => write!(f, "Out of memory"),
            Self::UnknownObject(msg) => write!(f, "{}", msg),
            Self::InvalidPath(path) => write!(f, "Invalid object path: {}", path),
            Self::MalformedIdentifier(id) => write!(f, "Malformed identifier: '{}'", id),
            Self::InvalidArgs(msg) => write!(f, "Invalid arguments: {}", msg),
            Self::UnknownInterface(iface) => write!(f, "Unknown interface {}", iface),
            Self::UnknownProperty {
                interface,
                property,
            } => write!(
                f,
                "Unknown interface {} or property {}.",
                interface, property
            ),
            Self::UnknownMethod {
                interface,
                member,
                signature,
            } => write!(
                f,
                "Method \"{}\" with signature \"{}\" on interface \"{}\" doesn't exist",
                member, signature, interface
            ),
            Self::PropertyReadOnly(name) => write!(f, "Property {} is read-only", name),
            Self::AccessDenied(msg) => write!(f, "Access denied: {}", msg),
            Self::Failed(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for BusError {}

impl From<io::Error> for BusError {
    fn from(e: io::Error) -> Self {
        match e.kind() {
            io::ErrorKind::OutOfMemory => Self::NoMemory,
            io::ErrorKind::PermissionDenied => Self::AccessDenied(e.to_string()),
            io::ErrorKind::InvalidInput => Self::InvalidArgs(e.to_string()),
            _ => Self::Failed(e.to_string()),
        }
    }
}

impl From<std::collections::TryReserveError> for BusError {
    fn from(_: std::collections::TryReserveError) -> Self {
        Self::NoMemory
    }
}
