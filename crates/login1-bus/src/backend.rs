// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Entities and the collaborator traits the dispatcher consumes.
//!
//! Users and sessions are owned by whoever manages login state. The
//! dispatcher only reads them for the duration of a call, through the
//! narrow traits below.

use crate::error::BusResult;
use crate::path::{self, ObjectPath};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Numeric user identifier
pub type Uid = u32;
/// Numeric group identifier
pub type Gid = u32;

/// A login session attached to a user.
///
/// Holds the owning UID as a plain association, never a reference to the
/// user itself.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Session {
    id: String,
    uid: Uid,
}

impl Session {
    pub fn new(id: impl Into<String>, uid: Uid) -> Self {
        Self { id: id.into(), uid }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// UID of the owning user
    pub fn uid(&self) -> Uid {
        self.uid
    }
}

/// A user as exposed on the bus.
///
/// The UID is fixed at construction: it is embedded in the object path, so
/// there is no way to change it afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    uid: Uid,
    gid: Gid,
    name: String,
    runtime_path: String,
    cgroup_path: String,
    service: String,
    sessions: Vec<Arc<Session>>,
    display: Option<Arc<Session>>,
}

impl User {
    /// Create a user with the conventional runtime directory, service and
    /// control group for `uid`/`name`.
    pub fn new(uid: Uid, gid: Gid, name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            uid,
            gid,
            runtime_path: format!("/run/user/{}", uid),
            cgroup_path: format!("/user/{}", name),
            service: format!("user@{}.service", uid),
            name,
            sessions: Vec::new(),
            display: None,
        }
    }

    pub fn with_runtime_path(mut self, path: impl Into<String>) -> Self {
        self.runtime_path = path.into();
        self
    }

    pub fn with_cgroup_path(mut self, path: impl Into<String>) -> Self {
        self.cgroup_path = path.into();
        self
    }

    pub fn with_service(mut self, service: impl Into<String>) -> Self {
        self.service = service.into();
        self
    }

    pub fn uid(&self) -> Uid {
        self.uid
    }

    pub fn gid(&self) -> Gid {
        self.gid
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn runtime_path(&self) -> &str {
        &self.runtime_path
    }

    pub fn cgroup_path(&self) -> &str {
        &self.cgroup_path
    }

    pub fn service(&self) -> &str {
        &self.service
    }

    /// Sessions in attachment order
    pub fn sessions(&self) -> &[Arc<Session>] {
        &self.sessions
    }

    /// Session currently owning the display, if any
    pub fn display(&self) -> Option<&Session> {
        self.display.as_deref()
    }

    /// Attach a session at the end of the attachment order.
    ///
    /// Returns `false` (and attaches nothing) when the session belongs to a
    /// different UID or an equal id is already attached.
    pub fn attach_session(&mut self, session: Arc<Session>) -> bool {
        if session.uid() != self.uid || self.session(session.id()).is_some() {
            return false;
        }
        self.sessions.push(session);
        true
    }

    /// Detach a session, clearing the display if it pointed at it.
    pub fn detach_session(&mut self, id: &str) -> Option<Arc<Session>> {
        let idx = self.sessions.iter().position(|s| s.id() == id)?;
        if self.display.as_ref().is_some_and(|d| d.id() == id) {
            self.display = None;
        }
        Some(self.sessions.remove(idx))
    }

    /// Point the display at an attached session, or clear it with `None`.
    ///
    /// Returns `false` when `id` is not attached.
    pub fn set_display(&mut self, id: Option<&str>) -> bool {
        match id {
            None => {
                self.display = None;
                true
            }
            Some(id) => match self.session(id) {
                Some(session) => {
                    self.display = Some(Arc::clone(session));
                    true
                }
                None => false,
            },
        }
    }

    fn session(&self, id: &str) -> Option<&Arc<Session>> {
        self.sessions.iter().find(|s| s.id() == id)
    }
}

/// Human-meaningful state of a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "yaml", derive(serde::Deserialize))]
#[cfg_attr(feature = "yaml", serde(rename_all = "lowercase"))]
pub enum UserState {
    #[default]
    Offline,
    Lingering,
    Online,
    Active,
    Closing,
}

impl UserState {
    /// Wire representation
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Offline => "offline",
            Self::Lingering => "lingering",
            Self::Online => "online",
            Self::Active => "active",
            Self::Closing => "closing",
        }
    }

    /// Parse the wire representation
    pub fn from_str_opt(s: &str) -> Option<Self> {
        match s {
            "offline" => Some(Self::Offline),
            "lingering" => Some(Self::Lingering),
            "online" => Some(Self::Online),
            "active" => Some(Self::Active),
            "closing" => Some(Self::Closing),
            _ => None,
        }
    }
}

impl fmt::Display for UserState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lookup of users by UID.
pub trait UserStore: Send + Sync {
    /// Snapshot of the user, or `None` if no such user exists.
    fn lookup(&self, uid: Uid) -> Option<Arc<User>>;
}

impl UserStore for HashMap<Uid, Arc<User>> {
    fn lookup(&self, uid: Uid) -> Option<Arc<User>> {
        self.get(&uid).cloned()
    }
}

/// Object paths for sessions.
///
/// Must map into a namespace disjoint from the user paths.
pub trait SessionPathCodec: Send + Sync {
    fn session_path(&self, session: &Session) -> BusResult<ObjectPath>;
}

/// Default session paths: `/org/freedesktop/login1/session/<escaped-id>`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogindSessionPaths;

impl SessionPathCodec for LogindSessionPaths {
    fn session_path(&self, session: &Session) -> BusResult<ObjectPath> {
        Ok(path::session_path(session.id()))
    }
}

/// Derivation of a user's state. Must be free of side effects; it is
/// called again on every property read.
pub trait StatusSource: Send + Sync {
    fn state(&self, user: &User) -> UserState;
}

/// A function-based status source.
impl<F> StatusSource for F
where
    F: Fn(&User) -> UserState + Send + Sync,
{
    fn state(&self, user: &User) -> UserState {
        self(user)
    }
}

/// Actions the bus may trigger on a user.
pub trait UserActions: Send + Sync {
    /// Terminate all sessions and processes of the user.
    fn terminate(&self, user: &User) -> BusResult<()>;
}

/// A function-based action handler.
impl<F> UserActions for F
where
    F: Fn(&User) -> BusResult<()> + Send + Sync,
{
    fn terminate(&self, user: &User) -> BusResult<()> {
        self(user)
    }
}
