//! Extension metadata types

use serde::{Deserialize, Serialize};
use std::fmt;

/// Branch name that is omitted from version strings.
pub const DEFAULT_BRANCH: &str = "master";

/// Semantic version of an extension (`major.minor.patch`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct VersionNumber {
    pub major: u16,
    pub minor: u16,
    pub patch: u16,
}

impl VersionNumber {
    pub const fn new(major: u16, minor: u16, patch: u16) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Render the version with an `@branch` suffix unless the branch is `master`.
    pub fn with_branch(&self, branch: &str) -> String {
        if branch.is_empty() || branch == DEFAULT_BRANCH {
            self.to_string()
        } else {
            format!("{}@{}", self, branch)
        }
    }
}

impl fmt::Display for VersionNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}
