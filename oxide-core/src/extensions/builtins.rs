//! Built-in libraries registered by the manager before any extension loads

use std::collections::BTreeMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use oxide_ext_api::Library;

/// Library name of [`Timer`]
pub const TIMER_LIBRARY: &str = "Timer";

/// Library name of [`Permission`]
pub const PERMISSION_LIBRARY: &str = "Permission";

/// Host clock shared with extensions
pub struct Timer {
    started: Instant,
}

impl Timer {
    pub fn new() -> Self {
        Self {
            started: Instant::now(),
        }
    }

    /// Time since the host created its extension manager
    pub fn uptime(&self) -> Duration {
        self.started.elapsed()
    }
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}

impl Library for Timer {}

/// Registry of permission names and the extension that owns each one
#[derive(Default)]
pub struct Permission {
    owners: Mutex<BTreeMap<String, String>>,
}

impl Permission {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `permission` for `owner`. Returns `false` if it already exists.
    pub fn register_permission(&self, permission: &str, owner: &str) -> bool {
        let Ok(mut owners) = self.owners.lock() else {
            return false;
        };
        let key = permission.to_lowercase();
        if owners.contains_key(&key) {
            tracing::warn!(permission = %permission, owner = %owner, "Duplicate permission registered");
            return false;
        }
        owners.insert(key, owner.to_string());
        true
    }

    pub fn permission_exists(&self, permission: &str) -> bool {
        self.owners
            .lock()
            .map(|owners| owners.contains_key(&permission.to_lowercase()))
            .unwrap_or(false)
    }

    pub fn owner_of(&self, permission: &str) -> Option<String> {
        self.owners
            .lock()
            .ok()
            .and_then(|owners| owners.get(&permission.to_lowercase()).cloned())
    }
}

impl Library for Permission {}
