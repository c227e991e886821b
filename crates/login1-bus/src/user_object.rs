// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! The `org.freedesktop.login1.User` object subtree.
//!
//! One [`UserObject`] serves every path under
//! `/org/freedesktop/login1/user/`. Each call resolves its path to a user
//! snapshot before any property or method code runs.

use crate::backend::{
    LogindSessionPaths, SessionPathCodec, StatusSource, User, UserActions, UserStore,
};
use crate::config::DispatcherConfig;
use crate::descriptor::{PropertyTable, USER_INTERFACE_NAME};
use crate::dispatch::{self, ObjectDescription};
use crate::error::{BusError, BusResult};
use crate::fault;
use crate::introspect::{user_introspection, USER_OBJECT_INTERFACES};
use crate::marshal::MarshalContext;
use crate::message::{HandlerResult, MessageHandler, MethodCall};
use crate::path;
use std::sync::Arc;

/// Message handler for user objects.
///
/// # Example
///
/// ```
/// use login1_bus::{InMemoryUsers, MethodCall, User, UserObject};
/// use std::sync::Arc;
///
/// let users = Arc::new(InMemoryUsers::new());
/// users.insert(User::new(1000, 1000, "alice"));
/// let object = UserObject::from_backend(users);
///
/// let call = MethodCall::new(
///     "/org/freedesktop/login1/user/1000",
///     Some("org.freedesktop.DBus.Properties"),
///     "Get",
/// )
/// .arg("org.freedesktop.login1.User")
/// .arg("Name");
/// assert!(object.handle(&call).is_handled());
/// ```
#[derive(Clone)]
pub struct UserObject {
    users: Arc<dyn UserStore>,
    sessions: Arc<dyn SessionPathCodec>,
    status: Arc<dyn StatusSource>,
    actions: Arc<dyn UserActions>,
    config: DispatcherConfig,
}

impl UserObject {
    pub fn new(
        users: Arc<dyn UserStore>,
        status: Arc<dyn StatusSource>,
        actions: Arc<dyn UserActions>,
    ) -> Self {
        Self {
            users,
            sessions: Arc::new(LogindSessionPaths),
            status,
            actions,
            config: DispatcherConfig::default(),
        }
    }

    /// Use one backend for lookup, state and actions.
    pub fn from_backend<B>(backend: Arc<B>) -> Self
    where
        B: UserStore + StatusSource + UserActions + 'static,
    {
        Self::new(backend.clone(), backend.clone(), backend)
    }

    pub fn with_session_paths(mut self, sessions: Arc<dyn SessionPathCodec>) -> Self {
        self.sessions = sessions;
        self
    }

    pub fn with_config(mut self, config: DispatcherConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &DispatcherConfig {
        &self.config
    }

    /// Resolve an object path to the user behind it.
    pub fn resolve(&self, object_path: &str) -> BusResult<Arc<User>> {
        let uid = path::uid_from_path(object_path)?;
        self.users
            .lookup(uid)
            .ok_or_else(|| BusError::UnknownObject("Unknown user".to_string()))
    }

    /// Handle one call addressed to a user object.
    pub fn handle(&self, call: &MethodCall) -> HandlerResult {
        log::debug!(
            "[user] {} {}.{}({})",
            call.path(),
            call.interface().unwrap_or("-"),
            call.member(),
            call.signature()
        );

        let user = match self.resolve(call.path()) {
            Ok(user) => user,
            Err(err) => return fault::reply_for_error(call, &err),
        };

        if call.is_method_call(USER_INTERFACE_NAME, "Terminate") {
            return self.terminate(call, &user);
        }

        let table = PropertyTable::for_user(&user);
        let object = ObjectDescription {
            introspection: user_introspection(),
            interfaces: &USER_OBJECT_INTERFACES,
            properties: &table,
        };
        let ctx = MarshalContext::new(self.sessions.as_ref(), self.status.as_ref());
        dispatch::default_message_handler(call, &object, &ctx, &self.config)
    }

    fn terminate(&self, call: &MethodCall, user: &User) -> HandlerResult {
        let result = dispatch::expect_signature(call, "")
            .and_then(|_| self.actions.terminate(user))
            .and_then(|_| {
                log::info!("[user] terminated user {}", user.uid());
                call.method_return(Vec::new(), &self.config)
            });
        fault::handled_or_fault(call, result)
    }
}

impl MessageHandler for UserObject {
    fn handle(&self, call: &MethodCall) -> HandlerResult {
        UserObject::handle(self, call)
    }
}

impl std::fmt::Debug for UserObject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserObject")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
