// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com
//
// End-to-end behaviour of the user object handler: path routing, property
// reads, Terminate, fault translation and introspection stability.

#![allow(clippy::missing_panics_doc)]

use login1_bus::error::names;
use login1_bus::introspect::{INTROSPECTABLE_INTERFACE, PROPERTIES_INTERFACE};
use login1_bus::{
    uid_from_path, user_path, BusError, HandlerResult, InMemoryUsers, MethodCall, MethodReturn,
    Reply, Session, User, UserObject, UserState, Value, USER_INTERFACE, USER_INTERFACE_NAME,
};
use std::sync::Arc;

fn setup() -> (Arc<InMemoryUsers>, UserObject) {
    let users = Arc::new(InMemoryUsers::new());
    users.insert(User::new(1000, 1000, "alice"));
    (users.clone(), UserObject::from_backend(users))
}

fn get(object: &UserObject, uid: u32, property: &str) -> HandlerResult {
    let call = MethodCall::new(user_path(uid).as_str(), Some(PROPERTIES_INTERFACE), "Get")
        .arg(USER_INTERFACE_NAME)
        .arg(property);
    object.handle(&call)
}

fn returned(result: &HandlerResult) -> &MethodReturn {
    result
        .reply()
        .and_then(Reply::as_return)
        .unwrap_or_else(|| panic!("expected a method return, got {:?}", result))
}

fn error_name(result: &HandlerResult) -> Option<&str> {
    result.reply().and_then(Reply::error_name)
}

fn session_ref(id: &str) -> Value {
    Value::structure(vec![
        Value::from(id),
        Value::from(login1_bus::path::session_path(id)),
    ])
}

#[test]
fn uid_round_trip_boundaries() {
    for uid in [0, 1, 999, 1000, 65_534, 65_535, u32::MAX - 1, u32::MAX] {
        assert_eq!(uid_from_path(user_path(uid).as_str()), Ok(uid));
    }
}

#[test]
fn uid_round_trip_random() {
    let mut rng = fastrand::Rng::with_seed(0x1091e);
    for _ in 0..1000 {
        let uid = rng.u32(..);
        assert_eq!(uid_from_path(user_path(uid).as_str()), Ok(uid));
    }
}

#[test]
fn decode_rejects_bad_paths() {
    assert!(matches!(
        uid_from_path("/org/freedesktop/login1/session/1000"),
        Err(BusError::InvalidPath(_))
    ));
    for bad in ["", "abc", "-5", "+5", "12a"] {
        let path = format!("/org/freedesktop/login1/user/{}", bad);
        assert!(
            matches!(uid_from_path(&path), Err(BusError::MalformedIdentifier(_))),
            "{}",
            path
        );
    }
}

#[test]
fn get_all_returns_every_declared_property() {
    let (_, object) = setup();
    let call = MethodCall::new(
        user_path(1000).as_str(),
        Some(PROPERTIES_INTERFACE),
        "GetAll",
    )
    .arg(USER_INTERFACE_NAME);
    let result = object.handle(&call);
    let dict = &returned(&result).body[0];

    let entries = dict.as_dict().unwrap();
    assert_eq!(entries.len(), 9);
    for ((key, value), spec) in entries.iter().zip(USER_INTERFACE.properties) {
        assert_eq!(key.as_str(), Some(spec.name));
        assert_eq!(value.as_variant().unwrap().signature(), spec.signature);
    }
}

#[test]
fn display_without_session() {
    let (_, object) = setup();
    let result = get(&object, 1000, "Display");
    assert_eq!(
        returned(&result).body,
        vec![Value::variant(Value::structure(vec![
            Value::from(""),
            Value::from(login1_bus::ObjectPath::root()),
        ]))]
    );
}

#[test]
fn sessions_listed_in_attachment_order() {
    let (users, object) = setup();
    users.update(1000, |u| {
        u.attach_session(Arc::new(Session::new("s2", 1000)));
        u.attach_session(Arc::new(Session::new("s1", 1000)));
        u.set_display(Some("s1"));
    });

    let result = get(&object, 1000, "Sessions");
    let sessions = returned(&result).body[0].as_variant().unwrap();
    assert_eq!(
        sessions.as_array().unwrap(),
        &[session_ref("s2"), session_ref("s1")]
    );

    let result = get(&object, 1000, "Display");
    assert_eq!(
        returned(&result).body[0].as_variant(),
        Some(&session_ref("s1"))
    );
}

#[test]
fn state_follows_status_source() {
    let (users, object) = setup();
    let result = get(&object, 1000, "State");
    assert_eq!(returned(&result).body, vec![Value::variant("offline")]);

    users.set_state(1000, UserState::Closing);
    let result = get(&object, 1000, "State");
    assert_eq!(returned(&result).body, vec![Value::variant("closing")]);
}

#[test]
fn unknown_property() {
    let (_, object) = setup();
    let result = get(&object, 1000, "Shell");
    let err = result.reply().and_then(Reply::as_error).unwrap();
    assert_eq!(err.name, names::UNKNOWN_PROPERTY);
    assert_eq!(
        err.message,
        "Unknown interface org.freedesktop.login1.User or property Shell."
    );
}

#[test]
fn unknown_user() {
    let (_, object) = setup();
    let result = get(&object, 4242, "UID");
    let err = result.reply().and_then(Reply::as_error).unwrap();
    assert_eq!(err.name, names::UNKNOWN_OBJECT);
    assert_eq!(err.message, "Unknown user");
}

#[test]
fn out_of_range_uid_is_unknown_user() {
    let (_, object) = setup();
    let call = MethodCall::new(
        "/org/freedesktop/login1/user/4294967296",
        Some(PROPERTIES_INTERFACE),
        "Get",
    )
    .arg(USER_INTERFACE_NAME)
    .arg("UID");
    let result = object.handle(&call);
    let err = result.reply().and_then(Reply::as_error).unwrap();
    assert_eq!(err.name, names::UNKNOWN_OBJECT);
    assert_eq!(err.message, "Unknown user");
}

#[test]
fn malformed_path_is_invalid_args() {
    let (_, object) = setup();
    let call = MethodCall::new("/org/freedesktop/login1/user/alice", None, "Ping");
    assert_eq!(error_name(&object.handle(&call)), Some(names::INVALID_ARGS));
}

#[test]
fn terminate_success_and_failure() {
    let (users, object) = setup();
    let call = MethodCall::new(
        user_path(1000).as_str(),
        Some(USER_INTERFACE_NAME),
        "Terminate",
    );

    users.fail_terminate_with(Some(BusError::failed("stopping user@1000.service failed")));
    let result = object.handle(&call);
    let err = result
        .reply()
        .and_then(Reply::as_error)
        .expect("fault, not success");
    assert_eq!(err.name, names::FAILED);
    assert_eq!(err.message, "stopping user@1000.service failed");

    users.fail_terminate_with(Some(BusError::AccessDenied("interactive auth required".into())));
    assert_eq!(
        error_name(&object.handle(&call)),
        Some(names::ACCESS_DENIED)
    );

    users.fail_terminate_with(None);
    let result = object.handle(&call);
    assert!(returned(&result).body.is_empty());

    // The user is gone now.
    assert_eq!(
        error_name(&object.handle(&call)),
        Some(names::UNKNOWN_OBJECT)
    );
}

#[test]
fn terminate_out_of_memory_needs_memory() {
    let users = Arc::new(InMemoryUsers::new());
    users.insert(User::new(1000, 1000, "alice"));
    let actions = |_: &User| -> login1_bus::BusResult<()> { Err(BusError::NoMemory) };
    let object = UserObject::new(users.clone(), users, Arc::new(actions));
    let call = MethodCall::new(user_path(1000).as_str(), None, "Terminate");
    assert_eq!(object.handle(&call), HandlerResult::NeedMemory);
}

#[test]
fn introspection_is_stable() {
    let (users, object) = setup();
    let call = MethodCall::new(
        user_path(1000).as_str(),
        Some(INTROSPECTABLE_INTERFACE),
        "Introspect",
    );

    let first = returned(&object.handle(&call)).body.clone();
    users.update(1000, |u| {
        u.attach_session(Arc::new(Session::new("c1", 1000)));
        u.set_display(Some("c1"));
    });
    users.set_state(1000, UserState::Active);
    let second = returned(&object.handle(&call)).body.clone();

    assert_eq!(first, second);
    assert_eq!(
        first[0].as_str(),
        Some(login1_bus::introspect::user_introspection())
    );
}

#[test]
fn unknown_member_falls_through() {
    let (_, object) = setup();
    let call = MethodCall::new(user_path(1000).as_str(), Some(USER_INTERFACE_NAME), "Lock");
    let result = object.handle(&call);
    assert_eq!(result, HandlerResult::NotHandled);

    let reply = result.into_reply(&call).unwrap();
    assert_eq!(reply.error_name(), Some(names::UNKNOWN_METHOD));
}
