// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Entity-independent handling of the standard interfaces.
//!
//! Given an object's introspection document, interface list and bound
//! property table, [`default_message_handler`] answers
//! `org.freedesktop.DBus.Properties`, `.Introspectable` and `.Peer`.
//! Anything else is left to the caller.

use crate::config::DispatcherConfig;
use crate::descriptor::PropertyTable;
use crate::error::{BusError, BusResult};
use crate::fault;
use crate::introspect::{
    INTROSPECTABLE_INTERFACE, PEER_INTERFACE, PROPERTIES_INTERFACE, STANDARD_INTERFACES,
};
use crate::marshal::MarshalContext;
use crate::message::{HandlerResult, MethodCall, Reply};
use crate::signature::WireType;
use crate::value::Value;

/// What the generic handler needs to know about one object.
#[derive(Debug, Clone, Copy)]
pub struct ObjectDescription<'a> {
    /// Complete introspection document
    pub introspection: &'a str,
    /// Interfaces implemented, standard ones included
    pub interfaces: &'a [&'a str],
    pub properties: &'a PropertyTable<'a>,
}

impl ObjectDescription<'_> {
    fn implements(&self, interface: &str) -> bool {
        self.interfaces.contains(&interface) || STANDARD_INTERFACES.contains(&interface)
    }
}

/// Answer a standard-interface call on `object`.
///
/// Returns [`HandlerResult::NotHandled`] for any member it does not know.
pub fn default_message_handler(
    call: &MethodCall,
    object: &ObjectDescription<'_>,
    ctx: &MarshalContext<'_>,
    config: &DispatcherConfig,
) -> HandlerResult {
    let result = if call.is_method_call(PROPERTIES_INTERFACE, "Get") {
        properties_get(call, object, ctx, config)
    } else if call.is_method_call(PROPERTIES_INTERFACE, "GetAll") {
        properties_get_all(call, object, ctx, config)
    } else if call.is_method_call(PROPERTIES_INTERFACE, "Set") {
        properties_set(call, object)
    } else if call.is_method_call(INTROSPECTABLE_INTERFACE, "Introspect") {
        expect_signature(call, "")
            .and_then(|_| call.method_return(vec![Value::from(object.introspection)], config))
    } else if call.is_method_call(PEER_INTERFACE, "Ping") {
        expect_signature(call, "")
            .and_then(|_| call.method_return(Vec::new(), config))
    } else if call.is_method_call(PEER_INTERFACE, "GetMachineId") {
        expect_signature(call, "")
            .and_then(|_| call.method_return(vec![Value::from(config.machine_id.as_str())], config))
    } else {
        log::debug!(
            "[dispatch] {} {}.{} not handled",
            call.path(),
            call.interface().unwrap_or("-"),
            call.member()
        );
        return HandlerResult::NotHandled;
    };

    fault::handled_or_fault(call, result)
}

/// Fail with `InvalidArgs` unless the body has exactly `expected` as its
/// signature.
pub fn expect_signature(call: &MethodCall, expected: &str) -> BusResult<()> {
    let actual = call.signature();
    if actual != expected {
        return Err(BusError::invalid_args(format!(
            "{} expects signature '{}', got '{}'",
            call.member(),
            expected,
            actual
        )));
    }
    Ok(())
}

fn string_arg(call: &MethodCall, index: usize) -> &str {
    call.body()
        .get(index)
        .and_then(Value::as_str)
        .unwrap_or_default()
}

fn properties_get(
    call: &MethodCall,
    object: &ObjectDescription<'_>,
    ctx: &MarshalContext<'_>,
    config: &DispatcherConfig,
) -> BusResult<Reply> {
    expect_signature(call, "ss")?;
    let interface = string_arg(call, 0);
    let property = string_arg(call, 1);

    let descriptor = object
        .properties
        .lookup(interface, property)
        .ok_or_else(|| BusError::UnknownProperty {
            interface: interface.to_string(),
            property: property.to_string(),
        })?;

    log::debug!("[dispatch] Get {}.{}", descriptor.interface, property);
    let value = descriptor.marshal(ctx)?;
    call.method_return(vec![Value::variant(value)], config)
}

fn properties_get_all(
    call: &MethodCall,
    object: &ObjectDescription<'_>,
    ctx: &MarshalContext<'_>,
    config: &DispatcherConfig,
) -> BusResult<Reply> {
    expect_signature(call, "s")?;
    let interface = string_arg(call, 0);
    if !interface.is_empty() && !object.implements(interface) {
        return Err(BusError::UnknownInterface(interface.to_string()));
    }

    let mut entries = Vec::new();
    for descriptor in object.properties.iter_interface(interface) {
        let value = descriptor.marshal(ctx)?;
        entries.try_reserve(1)?;
        entries.push((Value::from(descriptor.name()), Value::variant(value)));
    }
    log::debug!(
        "[dispatch] GetAll '{}' -> {} properties",
        interface,
        entries.len()
    );

    let dict = Value::dict(WireType::String, WireType::Variant, entries)?;
    call.method_return(vec![dict], config)
}

fn properties_set(call: &MethodCall, object: &ObjectDescription<'_>) -> BusResult<Reply> {
    expect_signature(call, "ssv")?;
    let interface = string_arg(call, 0);
    let property = string_arg(call, 1);

    match object.properties.lookup(interface, property) {
        Some(descriptor) => Err(BusError::PropertyReadOnly(descriptor.name().to_string())),
        None => Err(BusError::UnknownProperty {
            interface: interface.to_string(),
            property: property.to_string(),
        }),
    }
}
