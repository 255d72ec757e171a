//! Base version candidates and where they came from

use crate::config::VersionStrategyKind;
use crate::domain::{SemanticVersion, VersionField};
use git2::Oid;
use std::fmt;

/// Where a base version was found
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BaseVersionOrigin {
    /// `next_version` from configuration
    Configured,
    /// A version tag in the history
    Tag,
    /// A merged release branch named in a merge message
    MergeMessage,
    /// A version declared by a release branch name
    BranchName,
    /// Nothing found; the default starting version
    Fallback,
}

impl BaseVersionOrigin {
    /// Whether the version was already released, so a pre-release must sort above it
    pub fn is_released(self) -> bool {
        matches!(self, BaseVersionOrigin::Tag | BaseVersionOrigin::MergeMessage)
    }
}

/// A candidate version the final version is derived from
#[derive(Debug, Clone, PartialEq)]
pub struct BaseVersion {
    pub strategy: VersionStrategyKind,
    pub origin: BaseVersionOrigin,
    /// Commit the version was found on; commits are counted from here
    pub base_version_source: Option<Oid>,
    pub semantic_version: SemanticVersion,
    pub should_increment: bool,
    pub increment: VersionField,
    pub label: Option<String>,
}

impl BaseVersion {
    /// The `major.minor.patch` this candidate leads to once incremented
    pub fn resulting_version(&self, label: Option<&str>) -> SemanticVersion {
        if self.should_increment {
            self.semantic_version.increment(self.increment, label, false)
        } else {
            self.semantic_version.triple()
        }
    }
}

impl fmt::Display for BaseVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({:?}) {}", self.strategy, self.origin, self.semantic_version)?;
        if self.should_increment {
            write!(f, " +{}", self.increment)?;
        }
        if let Some(source) = self.base_version_source {
            let sha = source.to_string();
            write!(f, " from {}", &sha[..7.min(sha.len())])?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::PreReleaseTag;

    fn base(version: SemanticVersion, should_increment: bool, increment: VersionField) -> BaseVersion {
        BaseVersion {
            strategy: VersionStrategyKind::TaggedCommit,
            origin: BaseVersionOrigin::Tag,
            base_version_source: None,
            semantic_version: version,
            should_increment,
            increment,
            label: None,
        }
    }

    #[test]
    fn test_resulting_version_increments() {
        let candidate = base(SemanticVersion::new(1, 0, 0), true, VersionField::Minor);
        assert_eq!(candidate.resulting_version(None), SemanticVersion::new(1, 1, 0));
    }

    #[test]
    fn test_resulting_version_without_increment() {
        let candidate = base(SemanticVersion::new(1, 0, 0), false, VersionField::Minor);
        assert_eq!(candidate.resulting_version(None), SemanticVersion::new(1, 0, 0));
    }

    #[test]
    fn test_resulting_version_continues_same_label() {
        let version = SemanticVersion::new(1, 2, 0).with_pre_release(PreReleaseTag::new("beta", Some(1)));
        let candidate = base(version, true, VersionField::Minor);
        assert_eq!(candidate.resulting_version(Some("beta")), SemanticVersion::new(1, 2, 0));
        assert_eq!(candidate.resulting_version(Some("alpha")), SemanticVersion::new(1, 3, 0));
    }

    #[test]
    fn test_released_origins() {
        assert!(BaseVersionOrigin::Tag.is_released());
        assert!(BaseVersionOrigin::MergeMessage.is_released());
        assert!(!BaseVersionOrigin::BranchName.is_released());
        assert!(!BaseVersionOrigin::Fallback.is_released());
    }
}
