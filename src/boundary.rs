use serde::{Deserialize, Serialize};
use std::fmt;

/// Non-fatal conditions met while calculating a version.
/// The calculation continues with a documented fallback; these are reported to the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BoundaryWarning {
    /// A release-type branch name carries no parsable version
    UnparsableBranchVersion { branch: String },
    /// No version tag, merge message or configured version was found
    NoVersionTag {
        branch: String,
        fallback_version: String,
    },
    /// Tag looks like a version but cannot be parsed under the configured format
    UnparsableTag { tag: String, reason: String },
    /// Cached result could not be read back and was recomputed
    CorruptCacheEntry { key: String, reason: String },
}

impl fmt::Display for BoundaryWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoundaryWarning::UnparsableBranchVersion { branch } => {
                write!(
                    f,
                    "Branch '{}' does not contain a parsable version; ignoring its name",
                    branch
                )
            }
            BoundaryWarning::NoVersionTag {
                branch,
                fallback_version,
            } => {
                write!(
                    f,
                    "No version tag found for branch '{}'; starting from {}",
                    branch, fallback_version
                )
            }
            BoundaryWarning::UnparsableTag { tag, reason } => {
                write!(f, "Cannot parse tag '{}': {}", tag, reason)
            }
            BoundaryWarning::CorruptCacheEntry { key, reason } => {
                let short_key = if key.len() > 12 { &key[..12] } else { key.as_str() };
                write!(
                    f,
                    "Ignoring corrupt cache entry {} ({}); recalculating",
                    short_key, reason
                )
            }
        }
    }
}
