// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! In-memory user registry.
//!
//! Implements every collaborator trait the dispatcher needs, for tools,
//! tests and embedders without a login manager of their own.

use crate::backend::{StatusSource, Uid, User, UserActions, UserState, UserStore};
use crate::error::{BusError, BusResult};
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

/// Thread-safe map of users, their states, and a scripted terminate outcome.
#[derive(Debug, Default)]
pub struct InMemoryUsers {
    users: RwLock<BTreeMap<Uid, Arc<User>>>,
    states: RwLock<HashMap<Uid, UserState>>,
    terminate_failure: RwLock<Option<BusError>>,
}

impl InMemoryUsers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a user. Returns the previous entry.
    pub fn insert(&self, user: User) -> Option<Arc<User>> {
        let uid = user.uid();
        log::debug!("[store] insert user {} ({})", uid, user.name());
        self.users.write().insert(uid, Arc::new(user))
    }

    /// Remove a user and its recorded state.
    pub fn remove(&self, uid: Uid) -> Option<Arc<User>> {
        self.states.write().remove(&uid);
        self.users.write().remove(&uid)
    }

    /// Apply `f` to a copy of the user and publish the result.
    ///
    /// No lock is held while `f` runs, so it may call back into the store.
    /// Readers holding an earlier snapshot keep seeing the old state.
    /// Returns `false`, publishing nothing, if the user is missing before or
    /// after `f` runs.
    pub fn update<F>(&self, uid: Uid, f: F) -> bool
    where
        F: FnOnce(&mut User),
    {
        let Some(current) = self.lookup(uid) else {
            return false;
        };
        let mut user = User::clone(&current);
        f(&mut user);

        match self.users.write().get_mut(&uid) {
            Some(entry) => {
                *entry = Arc::new(user);
                true
            }
            None => false,
        }
    }

    /// Record the state reported for `uid`.
    pub fn set_state(&self, uid: Uid, state: UserState) {
        self.states.write().insert(uid, state);
    }

    /// Make every following `terminate` fail with `error`, or succeed again
    /// with `None`.
    pub fn fail_terminate_with(&self, error: Option<BusError>) {
        *self.terminate_failure.write() = error;
    }

    /// UIDs in ascending order
    pub fn uids(&self) -> Vec<Uid> {
        self.users.read().keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.users.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.read().is_empty()
    }
}

impl UserStore for InMemoryUsers {
    fn lookup(&self, uid: Uid) -> Option<Arc<User>> {
        self.users.read().get(&uid).cloned()
    }
}

/// Recorded state, or `online`/`offline` depending on attached sessions
/// when nothing was recorded.
impl StatusSource for InMemoryUsers {
    fn state(&self, user: &User) -> UserState {
        if let Some(state) = self.states.read().get(&user.uid()) {
            return *state;
        }
        if user.sessions().is_empty() {
            UserState::Offline
        } else {
            UserState::Online
        }
    }
}

impl UserActions for InMemoryUsers {
    fn terminate(&self, user: &User) -> BusResult<()> {
        if let Some(err) = self.terminate_failure.read().clone() {
            log::warn!("[store] terminate of user {} refused: {}", user.uid(), err);
            return Err(err);
        }
        match self.remove(user.uid()) {
            Some(_) => {
                log::info!("[store] user {} terminated", user.uid());
                Ok(())
            }
            None => Err(BusError::UnknownObject("Unknown user".to_string())),
        }
    }
}
