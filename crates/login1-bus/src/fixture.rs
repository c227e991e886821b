// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! YAML user fixtures.
//!
//! A fixture describes a dispatcher configuration and a set of users with
//! their sessions, for driving a [`crate::UserObject`] without a login
//! manager.
//!
//! # Example YAML
//!
//! ```yaml
//! config:
//!   machine_id: 0123456789abcdef0123456789abcdef
//!   endian: little
//! users:
//!   - uid: 1000
//!     gid: 1000
//!     name: alice
//!     sessions: [c1, c2]
//!     display: c2
//!     state: active
//!   - uid: 1001
//!     gid: 100
//!     name: bob
//!     state: lingering
//! ```

use crate::backend::{Gid, Session, Uid, User, UserState};
use crate::config::DispatcherConfig;
use crate::store::InMemoryUsers;
use serde::Deserialize;
use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::path::Path;
use std::sync::Arc;

/// Errors raised while loading a fixture
#[derive(Debug)]
pub enum FixtureError {
    /// The file could not be read
    Io(std::io::Error),
    /// The document is not valid YAML for a fixture
    Parse(serde_yaml::Error),
    /// The document parsed but describes an impossible state
    Invalid(String),
}

impl fmt::Display for FixtureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "Failed to read fixture: {}", e),
            Self::Parse(e) => write!(f, "Failed to parse fixture: {}", e),
            Self::Invalid(msg) => write!(f, "Invalid fixture: {}", msg),
        }
    }
}

impl std::error::Error for FixtureError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Parse(e) => Some(e),
            Self::Invalid(_) => None,
        }
    }
}

impl From<std::io::Error> for FixtureError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<serde_yaml::Error> for FixtureError {
    fn from(e: serde_yaml::Error) -> Self {
        Self::Parse(e)
    }
}

/// Root fixture document
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FixtureDocument {
    #[serde(default)]
    pub config: DispatcherConfig,

    #[serde(default)]
    pub users: Vec<FixtureUser>,
}

/// One user in a fixture
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FixtureUser {
    pub uid: Uid,
    pub gid: Gid,
    pub name: String,

    /// Defaults to `/run/user/<uid>`
    #[serde(default)]
    pub runtime_path: Option<String>,

    /// Defaults to `/user/<name>`
    #[serde(default)]
    pub cgroup_path: Option<String>,

    /// Defaults to `user@<uid>.service`
    #[serde(default)]
    pub service: Option<String>,

    /// Session ids in attachment order
    #[serde(default)]
    pub sessions: Vec<String>,

    /// Id of the session owning the display
    #[serde(default)]
    pub display: Option<String>,

    /// Reported state; derived from the sessions when absent
    #[serde(default)]
    pub state: Option<UserState>,
}

impl FixtureUser {
    fn build(&self) -> Result<User, FixtureError> {
        let mut user = User::new(self.uid, self.gid, self.name.as_str());
        if let Some(path) = &self.runtime_path {
            user = user.with_runtime_path(path.as_str());
        }
        if let Some(path) = &self.cgroup_path {
            user = user.with_cgroup_path(path.as_str());
        }
        if let Some(service) = &self.service {
            user = user.with_service(service.as_str());
        }

        for id in &self.sessions {
            if !user.attach_session(Arc::new(Session::new(id.as_str(), self.uid))) {
                return Err(FixtureError::Invalid(format!(
                    "user {}: session '{}' listed twice",
                    self.uid, id
                )));
            }
        }

        if !user.set_display(self.display.as_deref()) {
            return Err(FixtureError::Invalid(format!(
                "user {}: display session '{}' is not attached",
                self.uid,
                self.display.as_deref().unwrap_or_default()
            )));
        }
        Ok(user)
    }
}

impl FixtureDocument {
    /// Parse a fixture from YAML text.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, FixtureError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Check the configuration and build the user store.
    pub fn into_store(self) -> Result<(DispatcherConfig, InMemoryUsers), FixtureError> {
        self.config
            .validate()
            .map_err(|e| FixtureError::Invalid(e.to_string()))?;

        let store = InMemoryUsers::new();
        let mut seen = HashSet::new();
        for entry in &self.users {
            if !seen.insert(entry.uid) {
                return Err(FixtureError::Invalid(format!("user {} listed twice", entry.uid)));
            }
            store.insert(entry.build()?);
            if let Some(state) = entry.state {
                store.set_state(entry.uid, state);
            }
        }

        log::debug!("[fixture] loaded {} users", store.len());
        Ok((self.config, store))
    }
}

/// Read and parse a fixture file.
pub fn load_fixture<P: AsRef<Path>>(path: P) -> Result<FixtureDocument, FixtureError> {
    let path = path.as_ref();
    log::debug!("[fixture] loading {}", path.display());
    let content = fs::read_to_string(path)?;
    FixtureDocument::from_yaml_str(&content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{StatusSource, UserStore};
    use crate::wire::Endian;
    use std::io::Write;

    const SAMPLE: &str = r#"
config:
  machine_id: 0123456789abcdef0123456789abcdef
  endian: big
users:
  - uid: 1000
    gid: 1000
    name: alice
    sessions: [c1, c2]
    display: c2
    state: active
  - uid: 1001
    gid: 100
    name: bob
    service: custom@1001.service
"#;

    #[test]
    fn parse_and_build() {
        let doc = FixtureDocument::from_yaml_str(SAMPLE).unwrap();
        let (config, store) = doc.into_store().unwrap();
        assert_eq!(config.endian, Endian::Big);
        assert_eq!(store.uids(), vec![1000, 1001]);

        let alice = store.lookup(1000).unwrap();
        assert_eq!(alice.sessions().len(), 2);
        assert_eq!(alice.display().map(Session::id), Some("c2"));
        assert_eq!(store.state(&alice), UserState::Active);

        let bob = store.lookup(1001).unwrap();
        assert_eq!(bob.service(), "custom@1001.service");
        assert_eq!(store.state(&bob), UserState::Offline);
    }

    #[test]
    fn empty_document_uses_defaults() {
        let (config, store) = FixtureDocument::from_yaml_str("{}")
            .unwrap()
            .into_store()
            .unwrap();
        assert_eq!(config, DispatcherConfig::default());
        assert!(store.is_empty());
    }

    #[test]
    fn rejects_unattached_display() {
        let yaml = "users:\n  - {uid: 1, gid: 1, name: x, display: c9}\n";
        let err = FixtureDocument::from_yaml_str(yaml).unwrap().into_store();
        assert!(matches!(err, Err(FixtureError::Invalid(_))));
    }

    #[test]
    fn rejects_duplicate_uid() {
        let yaml = "users:\n  - {uid: 1, gid: 1, name: x}\n  - {uid: 1, gid: 1, name: y}\n";
        let err = FixtureDocument::from_yaml_str(yaml).unwrap().into_store();
        assert!(matches!(err, Err(FixtureError::Invalid(_))));
    }

    #[test]
    fn rejects_unknown_fields() {
        let err = FixtureDocument::from_yaml_str("users: []\nshell: /bin/sh\n");
        assert!(matches!(err, Err(FixtureError::Parse(_))));
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();
        let doc = load_fixture(file.path()).unwrap();
        assert_eq!(doc.users.len(), 2);

        assert!(matches!(
            load_fixture("/nonexistent/fixture.yaml"),
            Err(FixtureError::Io(_))
        ));
    }
}
