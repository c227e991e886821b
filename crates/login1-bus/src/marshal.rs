// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Property marshalers.
//!
//! Each marshaler reads one piece of user state and returns a complete
//! [`Value`]. Containers are assembled only after every element has been
//! produced, so a failure never leaves a partial value behind.

use crate::backend::{Session, SessionPathCodec, StatusSource, User};
use crate::descriptor::Accessor;
use crate::error::{BusError, BusResult};
use crate::path::ObjectPath;
use crate::signature::WireType;
use crate::value::Value;

/// Collaborators a marshaler may consult.
#[derive(Clone, Copy)]
pub struct MarshalContext<'a> {
    pub sessions: &'a dyn SessionPathCodec,
    pub status: &'a dyn StatusSource,
}

impl<'a> MarshalContext<'a> {
    pub fn new(sessions: &'a dyn SessionPathCodec, status: &'a dyn StatusSource) -> Self {
        Self { sessions, status }
    }
}

impl std::fmt::Debug for MarshalContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MarshalContext").finish_non_exhaustive()
    }
}

/// Element type of `Sessions` and type of `Display`: `(so)`
pub fn session_ref_type() -> WireType {
    WireType::Struct(vec![WireType::String, WireType::ObjectPath])
}

/// Produce the value of the property backed by `accessor`.
pub fn marshal(accessor: Accessor, user: &User, ctx: &MarshalContext<'_>) -> BusResult<Value> {
    match accessor {
        Accessor::Uid => Ok(Value::U32(user.uid())),
        Accessor::Gid => Ok(Value::U32(user.gid())),
        Accessor::Name => Ok(Value::from(user.name())),
        Accessor::RuntimePath => Ok(Value::from(user.runtime_path())),
        Accessor::Service => Ok(Value::from(user.service())),
        Accessor::ControlGroupPath => Ok(Value::from(user.cgroup_path())),
        Accessor::Display => marshal_display(user, ctx),
        Accessor::State => Ok(marshal_state(user, ctx)),
        Accessor::Sessions => marshal_sessions(user, ctx),
    }
}

/// `(so)` naming the display session, or `("", "/")` without one.
pub fn marshal_display(user: &User, ctx: &MarshalContext<'_>) -> BusResult<Value> {
    match user.display() {
        Some(session) => session_ref(session, ctx),
        None => Ok(Value::structure(vec![
            Value::from(""),
            Value::from(ObjectPath::root()),
        ])),
    }
}

/// Current state string. Asked of the status source on every read.
pub fn marshal_state(user: &User, ctx: &MarshalContext<'_>) -> Value {
    Value::from(ctx.status.state(user).as_str())
}

/// `a(so)` with one entry per attached session, in attachment order.
pub fn marshal_sessions(user: &User, ctx: &MarshalContext<'_>) -> BusResult<Value> {
    let mut items = Vec::new();
    items.try_reserve(user.sessions().len())?;
    for session in user.sessions() {
        items.push(session_ref(session, ctx)?);
    }
    Value::array(session_ref_type(), items)
}

fn session_ref(session: &Session, ctx: &MarshalContext<'_>) -> BusResult<Value> {
    let path = ctx.sessions.session_path(session).map_err(|e| {
        log::error!(
            "[marshal] cannot build path for session '{}': {}",
            session.id(),
            e
        );
        BusError::NoMemory
    })?;
    Ok(Value::structure(vec![
        Value::from(session.id()),
        Value::from(path),
    ]))
}
