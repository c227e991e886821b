// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Dispatcher configuration.

use crate::error::{BusError, BusResult};
use crate::wire::{Endian, MAX_MESSAGE_SIZE};
use std::path::Path;

/// Machine id reported when none is configured
pub const DEFAULT_MACHINE_ID: &str = "00000000000000000000000000000000";

/// Location of the host machine id
pub const SYSTEM_MACHINE_ID_PATH: &str = "/etc/machine-id";

/// Settings shared by every call a dispatcher serves.
///
/// # Example
///
/// ```
/// use login1_bus::{DispatcherConfig, Endian};
///
/// let config = DispatcherConfig::default()
///     .with_machine_id("0123456789abcdef0123456789abcdef")
///     .with_endian(Endian::Big);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "yaml", derive(serde::Deserialize))]
#[cfg_attr(feature = "yaml", serde(default, deny_unknown_fields))]
pub struct DispatcherConfig {
    /// Answer to `org.freedesktop.DBus.Peer.GetMachineId`
    pub machine_id: String,
    /// Upper bound for an encoded reply body, in bytes
    pub max_reply_size: usize,
    /// Byte order of encoded reply bodies
    pub endian: Endian,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            machine_id: DEFAULT_MACHINE_ID.to_string(),
            max_reply_size: MAX_MESSAGE_SIZE,
            endian: Endian::Little,
        }
    }
}

impl DispatcherConfig {
    pub fn with_machine_id(mut self, machine_id: impl Into<String>) -> Self {
        self.machine_id = machine_id.into();
        self
    }

    pub fn with_max_reply_size(mut self, max_reply_size: usize) -> Self {
        self.max_reply_size = max_reply_size;
        self
    }

    pub fn with_endian(mut self, endian: Endian) -> Self {
        self.endian = endian;
        self
    }

    /// Read the machine id from `path` (usually [`SYSTEM_MACHINE_ID_PATH`]).
    pub fn with_machine_id_from(self, path: impl AsRef<Path>) -> BusResult<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let config = self.with_machine_id(raw.trim());
        config.validate()?;
        Ok(config)
    }

    /// Check the machine id format and the reply size bound.
    pub fn validate(&self) -> BusResult<()> {
        if !is_valid_machine_id(&self.machine_id) {
            return Err(BusError::invalid_args(format!(
                "machine id '{}' is not 32 lowercase hex digits",
                self.machine_id
            )));
        }
        if self.max_reply_size == 0 || self.max_reply_size > MAX_MESSAGE_SIZE {
            return Err(BusError::invalid_args(format!(
                "max_reply_size {} out of range 1..={}",
                self.max_reply_size, MAX_MESSAGE_SIZE
            )));
        }
        Ok(())
    }
}

fn is_valid_machine_id(id: &str) -> bool {
    id.len() == 32
        && id
            .bytes()
            .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
}
