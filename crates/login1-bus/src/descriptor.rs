// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Declarative property descriptor table.
//!
//! [`USER_INTERFACE`] is the single source of truth for what a user object
//! exposes: the per-call [`PropertyTable`] is bound from it, and the
//! introspection XML is rendered from it. A property therefore cannot be
//! served with one signature and advertised with another.

use crate::backend::User;
use crate::error::{BusError, BusResult};
use crate::marshal::{self, MarshalContext};
use crate::signature::{SignatureError, WireType};
use crate::value::Value;

/// Name of the user interface
pub const USER_INTERFACE_NAME: &str = "org.freedesktop.login1.User";

/// Which piece of user state a property reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Accessor {
    Uid,
    Gid,
    Name,
    RuntimePath,
    Service,
    ControlGroupPath,
    /// Derived `(so)` reference to the display session
    Display,
    /// Derived state string
    State,
    /// Derived `a(so)` list of attached sessions
    Sessions,
}

/// Declaration of a read-only property.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PropertySpec {
    pub name: &'static str,
    /// Single complete type signature
    pub signature: &'static str,
    pub accessor: Accessor,
}

impl PropertySpec {
    /// Parsed form of the declared signature.
    pub fn wire_type(&self) -> Result<WireType, SignatureError> {
        WireType::parse(self.signature)
    }
}

/// Direction of a method argument
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgDirection {
    In,
    Out,
}

impl ArgDirection {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::In => "in",
            Self::Out => "out",
        }
    }
}

/// Declaration of a method argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArgSpec {
    pub name: &'static str,
    pub signature: &'static str,
    pub direction: ArgDirection,
}

/// Declaration of a method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MethodSpec {
    pub name: &'static str,
    pub args: &'static [ArgSpec],
}

impl MethodSpec {
    /// Concatenated signature of the input arguments
    pub fn in_signature(&self) -> String {
        self.args
            .iter()
            .filter(|a| a.direction == ArgDirection::In)
            .map(|a| a.signature)
            .collect()
    }
}

/// Declaration of an interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InterfaceSpec {
    pub name: &'static str,
    pub methods: &'static [MethodSpec],
    pub properties: &'static [PropertySpec],
}

impl InterfaceSpec {
    pub fn property(&self, name: &str) -> Option<&'static PropertySpec> {
        self.properties.iter().find(|p| p.name == name)
    }

    pub fn method(&self, name: &str) -> Option<&'static MethodSpec> {
        self.methods.iter().find(|m| m.name == name)
    }
}

/// `org.freedesktop.login1.User`
pub static USER_INTERFACE: InterfaceSpec = InterfaceSpec {
    name: USER_INTERFACE_NAME,
    methods: &[MethodSpec {
        name: "Terminate",
        args: &[],
    }],
    properties: &[
        PropertySpec {
            name: "UID",
            signature: "u",
            accessor: Accessor::Uid,
        },
        PropertySpec {
            name: "GID",
            signature: "u",
            accessor: Accessor::Gid,
        },
        PropertySpec {
            name: "Name",
            signature: "s",
            accessor: Accessor::Name,
        },
        PropertySpec {
            name: "RuntimePath",
            signature: "s",
            accessor: Accessor::RuntimePath,
        },
        PropertySpec {
            name: "Service",
            signature: "s",
            accessor: Accessor::Service,
        },
        PropertySpec {
            name: "ControlGroupPath",
            signature: "s",
            accessor: Accessor::ControlGroupPath,
        },
        PropertySpec {
            name: "Display",
            signature: "(so)",
            accessor: Accessor::Display,
        },
        PropertySpec {
            name: "State",
            signature: "s",
            accessor: Accessor::State,
        },
        PropertySpec {
            name: "Sessions",
            signature: "a(so)",
            accessor: Accessor::Sessions,
        },
    ],
};

/// One property bound to the user it reads from.
#[derive(Debug, Clone, Copy)]
pub struct PropertyDescriptor<'a> {
    pub interface: &'static str,
    pub spec: &'static PropertySpec,
    source: &'a User,
}

impl<'a> PropertyDescriptor<'a> {
    pub fn name(&self) -> &'static str {
        self.spec.name
    }

    pub fn signature(&self) -> &'static str {
        self.spec.signature
    }

    /// Run the marshaler.
    ///
    /// A value whose type disagrees with the declaration is refused rather
    /// than sent.
    pub fn marshal(&self, ctx: &MarshalContext<'_>) -> BusResult<Value> {
        let declared = self.spec.wire_type().map_err(|e| {
            log::error!(
                "[descriptor] {}.{} declares '{}': {}",
                self.interface,
                self.spec.name,
                self.spec.signature,
                e
            );
            BusError::failed(format!(
                "property {} has an invalid signature: {}",
                self.spec.name, e
            ))
        })?;

        let value = marshal::marshal(self.spec.accessor, self.source, ctx)?;
        let actual = value.wire_type();
        if actual != declared {
            log::error!(
                "[descriptor] {}.{} marshaled as '{}' but declared '{}'",
                self.interface,
                self.spec.name,
                actual,
                declared
            );
            return Err(BusError::failed(format!(
                "property {} produced type '{}' instead of '{}'",
                self.spec.name, actual, declared
            )));
        }
        Ok(value)
    }
}

/// Per-call table of every property an object exposes.
///
/// Borrowing the user for `'a` keeps the table from outliving the call it
/// was built for.
#[derive(Debug, Clone, Default)]
pub struct PropertyTable<'a> {
    entries: Vec<PropertyDescriptor<'a>>,
}

impl<'a> PropertyTable<'a> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Table for a user object.
    pub fn for_user(user: &'a User) -> Self {
        Self::new().bind(&USER_INTERFACE, user)
    }

    /// Append every property of `interface`, reading from `source`.
    pub fn bind(mut self, interface: &'static InterfaceSpec, source: &'a User) -> Self {
        self.entries
            .extend(interface.properties.iter().map(|spec| PropertyDescriptor {
                interface: interface.name,
                spec,
                source,
            }));
        self
    }

    /// Find a property. An empty interface name matches any interface.
    pub fn lookup(&self, interface: &str, property: &str) -> Option<&PropertyDescriptor<'a>> {
        self.entries
            .iter()
            .find(|d| matches_interface(d, interface) && d.spec.name == property)
    }

    /// Properties of one interface (all of them for an empty name), in
    /// table order.
    pub fn iter_interface<'s>(
        &'s self,
        interface: &'s str,
    ) -> impl Iterator<Item = &'s PropertyDescriptor<'a>> + 's {
        self.entries
            .iter()
            .filter(move |d| matches_interface(d, interface))
    }

    pub fn iter(&self) -> impl Iterator<Item = &PropertyDescriptor<'a>> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn matches_interface(descriptor: &PropertyDescriptor<'_>, interface: &str) -> bool {
    interface.is_empty() || descriptor.interface == interface
}
