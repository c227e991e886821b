// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Introspection XML.
//!
//! Object-specific interfaces are rendered from their [`InterfaceSpec`];
//! the standard interfaces are fixed text.

use crate::descriptor::{InterfaceSpec, USER_INTERFACE};
use std::fmt::Write as _;
use std::sync::OnceLock;

pub const PROPERTIES_INTERFACE: &str = "org.freedesktop.DBus.Properties";
pub const PEER_INTERFACE: &str = "org.freedesktop.DBus.Peer";
pub const INTROSPECTABLE_INTERFACE: &str = "org.freedesktop.DBus.Introspectable";

/// Standard interfaces every object implements
pub const STANDARD_INTERFACES: [&str; 3] = [
    PROPERTIES_INTERFACE,
    INTROSPECTABLE_INTERFACE,
    PEER_INTERFACE,
];

/// Every interface a user object answers for
pub const USER_OBJECT_INTERFACES: [&str; 4] = [
    PROPERTIES_INTERFACE,
    INTROSPECTABLE_INTERFACE,
    PEER_INTERFACE,
    crate::descriptor::USER_INTERFACE_NAME,
];

pub const DOCTYPE: &str = concat!(
    "<!DOCTYPE node PUBLIC \"-//freedesktop//DTD D-BUS Object Introspection 1.0//EN\"\n",
    "\"http://www.freedesktop.org/standards/dbus/1.0/introspect.dtd\">\n",
);

pub const PROPERTIES_INTERFACE_XML: &str = concat!(
    " <interface name=\"org.freedesktop.DBus.Properties\">\n",
    "  <method name=\"Get\">\n",
    "   <arg name=\"interface\" direction=\"in\" type=\"s\"/>\n",
    "   <arg name=\"property\" direction=\"in\" type=\"s\"/>\n",
    "   <arg name=\"value\" direction=\"out\" type=\"v\"/>\n",
    "  </method>\n",
    "  <method name=\"GetAll\">\n",
    "   <arg name=\"interface\" direction=\"in\" type=\"s\"/>\n",
    "   <arg name=\"properties\" direction=\"out\" type=\"a{sv}\"/>\n",
    "  </method>\n",
    "  <method name=\"Set\">\n",
    "   <arg name=\"interface\" direction=\"in\" type=\"s\"/>\n",
    "   <arg name=\"property\" direction=\"in\" type=\"s\"/>\n",
    "   <arg name=\"value\" direction=\"in\" type=\"v\"/>\n",
    "  </method>\n",
    "  <signal name=\"PropertiesChanged\">\n",
    "   <arg type=\"s\" name=\"interface\"/>\n",
    "   <arg type=\"a{sv}\" name=\"changed_properties\"/>\n",
    "   <arg type=\"as\" name=\"invalidated_properties\"/>\n",
    "  </signal>\n",
    " </interface>\n",
);

pub const PEER_INTERFACE_XML: &str = concat!(
    " <interface name=\"org.freedesktop.DBus.Peer\">\n",
    "  <method name=\"Ping\"/>\n",
    "  <method name=\"GetMachineId\">\n",
    "   <arg type=\"s\" name=\"machine_uuid\" direction=\"out\"/>\n",
    "  </method>\n",
    " </interface>\n",
);

pub const INTROSPECTABLE_INTERFACE_XML: &str = concat!(
    " <interface name=\"org.freedesktop.DBus.Introspectable\">\n",
    "  <method name=\"Introspect\">\n",
    "   <arg name=\"data\" type=\"s\" direction=\"out\"/>\n",
    "  </method>\n",
    " </interface>\n",
);

/// Render one `<interface>` element.
pub fn interface_xml(spec: &InterfaceSpec) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail
    let _ = writeln!(out, " <interface name=\"{}\">", spec.name);
    for method in spec.methods {
        if method.args.is_empty() {
            let _ = writeln!(out, "  <method name=\"{}\"/>", method.name);
            continue;
        }
        let _ = writeln!(out, "  <method name=\"{}\">", method.name);
        for arg in method.args {
            let _ = writeln!(
                out,
                "   <arg name=\"{}\" type=\"{}\" direction=\"{}\"/>",
                arg.name,
                arg.signature,
                arg.direction.as_str()
            );
        }
        out.push_str("  </method>\n");
    }
    for prop in spec.properties {
        let _ = writeln!(
            out,
            "  <property name=\"{}\" type=\"{}\" access=\"read\"/>",
            prop.name, prop.signature
        );
    }
    out.push_str(" </interface>\n");
    out
}

/// Full document for an object implementing `interfaces` plus the
/// standard ones.
pub fn introspection_xml(interfaces: &[&InterfaceSpec]) -> String {
    let mut out = String::from(DOCTYPE);
    out.push_str("<node>\n");
    for spec in interfaces {
        out.push_str(&interface_xml(spec));
    }
    out.push_str(PROPERTIES_INTERFACE_XML);
    out.push_str(PEER_INTERFACE_XML);
    out.push_str(INTROSPECTABLE_INTERFACE_XML);
    out.push_str("</node>\n");
    out
}

/// Document for a user object. Rendered once per process.
pub fn user_introspection() -> &'static str {
    static XML: OnceLock<String> = OnceLock::new();
    XML.get_or_init(|| introspection_xml(&[&USER_INTERFACE]))
}
