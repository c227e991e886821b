// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Cross-module tests: descriptor table, introspection and wire output.

use super::*;
use crate::introspect::{user_introspection, PROPERTIES_INTERFACE};
use std::collections::HashMap;
use std::sync::Arc;

fn get_all(object: &UserObject, uid: u32) -> HandlerResult {
    let call = MethodCall::new(
        user_path(uid).as_str(),
        Some(PROPERTIES_INTERFACE),
        "GetAll",
    )
    .arg(USER_INTERFACE_NAME);
    object.handle(&call)
}

#[test]
fn test_xml_matches_descriptor_table() {
    let doc = roxmltree::Document::parse_with_options(
        user_introspection(),
        roxmltree::ParsingOptions {
            allow_dtd: true,
            ..Default::default()
        },
    )
    .expect("introspection is well-formed XML");

    let iface = doc
        .descendants()
        .find(|n| n.has_tag_name("interface") && n.attribute("name") == Some(USER_INTERFACE_NAME))
        .expect("user interface present");

    let advertised: Vec<(&str, &str)> = iface
        .children()
        .filter(|n| n.has_tag_name("property"))
        .map(|n| (n.attribute("name").unwrap(), n.attribute("type").unwrap()))
        .collect();
    let declared: Vec<(&str, &str)> = USER_INTERFACE
        .properties
        .iter()
        .map(|p| (p.name, p.signature))
        .collect();
    assert_eq!(advertised, declared);

    for n in iface.children().filter(|n| n.has_tag_name("property")) {
        assert_eq!(n.attribute("access"), Some("read"));
    }
}

#[test]
fn test_marshaled_signatures_match_declarations() {
    let users = Arc::new(InMemoryUsers::new());
    let mut user = User::new(1000, 1000, "alice");
    user.attach_session(Arc::new(Session::new("c1", 1000)));
    user.set_display(Some("c1"));
    users.insert(user);
    let object = UserObject::from_backend(users);

    let result = get_all(&object, 1000);
    let body = &result.reply().and_then(Reply::as_return).unwrap().body;
    for spec in USER_INTERFACE.properties {
        let value = body[0]
            .dict_get(spec.name)
            .and_then(Value::as_variant)
            .unwrap_or_else(|| panic!("{} missing", spec.name));
        assert_eq!(value.signature(), spec.signature, "{}", spec.name);
    }
}

#[test]
fn test_get_all_body_encodes_as_a_sv() {
    let users = Arc::new(InMemoryUsers::new());
    users.insert(User::new(0, 0, "root"));
    let object = UserObject::from_backend(users);

    let result = get_all(&object, 0);
    let ret = result.reply().and_then(Reply::as_return).unwrap();
    assert_eq!(ret.signature, "a{sv}");

    // First entry: "UID" => variant u 0, right after the array length and
    // the padding to the dict entry boundary.
    let e = &ret.encoded;
    let len = u32::from_le_bytes([e[0], e[1], e[2], e[3]]) as usize;
    assert_eq!(len + 8, e.len());
    assert_eq!(&e[4..8], &[0, 0, 0, 0]);
    assert_eq!(&e[8..12], &[3, 0, 0, 0]);
    assert_eq!(&e[12..16], b"UID\0");
    assert_eq!(&e[16..19], &[1, b'u', 0]);
}

#[test]
fn test_big_endian_reply() {
    let users = Arc::new(InMemoryUsers::new());
    users.insert(User::new(1000, 1000, "alice"));
    let object = UserObject::from_backend(users)
        .with_config(DispatcherConfig::default().with_endian(Endian::Big));

    let call = MethodCall::new(user_path(1000).as_str(), Some(PROPERTIES_INTERFACE), "Get")
        .arg(USER_INTERFACE_NAME)
        .arg("UID");
    let result = object.handle(&call);
    let ret = result.reply().and_then(Reply::as_return).unwrap();
    assert_eq!(ret.encoded, [1, b'u', 0, 0, 0x00, 0x00, 0x03, 0xe8]);
}

#[test]
fn test_reply_size_limit_needs_memory() {
    let users = Arc::new(InMemoryUsers::new());
    let mut user = User::new(1000, 1000, "alice");
    for i in 0..64 {
        user.attach_session(Arc::new(Session::new(format!("c{}", i), 1000)));
    }
    users.insert(user);
    let object = UserObject::from_backend(users)
        .with_config(DispatcherConfig::default().with_max_reply_size(256));

    assert_eq!(get_all(&object, 1000), HandlerResult::NeedMemory);
    assert!(HandlerResult::NeedMemory
        .into_reply(&MethodCall::new("/", None, "GetAll"))
        .is_none());
}

#[test]
fn test_custom_session_paths() {
    struct Flat;
    impl SessionPathCodec for Flat {
        fn session_path(&self, session: &Session) -> BusResult<ObjectPath> {
            ObjectPath::new(format!("/sessions/{}", session.id()))
        }
    }

    let mut map: HashMap<Uid, Arc<User>> = HashMap::new();
    let mut user = User::new(1000, 1000, "alice");
    user.attach_session(Arc::new(Session::new("s1", 1000)));
    map.insert(1000, Arc::new(user));

    let status = |_: &User| UserState::Online;
    let actions = |_: &User| -> BusResult<()> { Ok(()) };
    let object = UserObject::new(Arc::new(map), Arc::new(status), Arc::new(actions))
        .with_session_paths(Arc::new(Flat));

    let call = MethodCall::new(user_path(1000).as_str(), Some(PROPERTIES_INTERFACE), "Get")
        .arg(USER_INTERFACE_NAME)
        .arg("Sessions");
    let result = object.handle(&call);
    let body = &result.reply().and_then(Reply::as_return).unwrap().body;
    assert_eq!(body[0].to_string(), "a(so) [(\"s1\", \"/sessions/s1\")]");
}
