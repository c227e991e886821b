// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! # login1-bus - declarative D-Bus objects for login users
//!
//! Exposes login users as `org.freedesktop.login1.User` objects under
//! `/org/freedesktop/login1/user/<uid>`. A single static interface table
//! drives property reads, `GetAll`, and the introspection document, so
//! what is served and what is advertised cannot drift apart.
//!
//! ## Quick Start
//!
//! ```rust
//! use login1_bus::{InMemoryUsers, MethodCall, Reply, User, UserObject, Value};
//! use std::sync::Arc;
//!
//! let users = Arc::new(InMemoryUsers::new());
//! users.insert(User::new(1000, 1000, "alice"));
//! let object = UserObject::from_backend(users);
//!
//! let call = MethodCall::new(
//!     "/org/freedesktop/login1/user/1000",
//!     Some("org.freedesktop.DBus.Properties"),
//!     "Get",
//! )
//! .arg("org.freedesktop.login1.User")
//! .arg("UID");
//!
//! let reply = object.handle(&call).into_reply(&call).unwrap();
//! assert_eq!(reply.as_return().unwrap().body, vec![Value::variant(1000u32)]);
//! ```
//!
//! ## Call Flow
//!
//! ```text
//! MethodCall -> path codec (uid) -> UserStore::lookup
//!            -> Terminate        -> UserActions::terminate
//!            -> standard ifaces  -> PropertyTable -> marshalers -> wire body
//!            -> any failure      -> fault translator (reply | NeedMemory)
//! ```
//!
//! ## Modules Overview
//!
//! - [`user_object`] - the object handler (start here)
//! - [`dispatch`] - Properties / Introspectable / Peer handling
//! - [`descriptor`] - static interface table and per-call property table
//! - [`backend`] - entities and collaborator traits
//! - [`wire`] - D-Bus body encoding

pub mod backend;
pub mod config;
pub mod descriptor;
pub mod dispatch;
pub mod error;
pub mod fault;
#[cfg(feature = "yaml")]
pub mod fixture;
pub mod introspect;
pub mod marshal;
pub mod message;
pub mod path;
pub mod signature;
pub mod store;
pub mod user_object;
pub mod value;
pub mod wire;

#[cfg(test)]
mod tests;

pub use backend::{
    Gid, LogindSessionPaths, Session, SessionPathCodec, StatusSource, Uid, User, UserActions,
    UserState, UserStore,
};
pub use config::DispatcherConfig;
pub use descriptor::{PropertyTable, USER_INTERFACE, USER_INTERFACE_NAME};
pub use error::{BusError, BusResult, ErrorKind};
pub use message::{ErrorReply, HandlerResult, MessageHandler, MethodCall, MethodReturn, Reply};
pub use path::{uid_from_path, user_path, ObjectPath};
pub use signature::WireType;
pub use store::InMemoryUsers;
pub use user_object::UserObject;
pub use value::Value;
pub use wire::Endian;

#[cfg(feature = "yaml")]
pub use fixture::{load_fixture, FixtureDocument, FixtureError};
