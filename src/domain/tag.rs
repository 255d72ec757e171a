use crate::domain::version::{SemanticVersion, SemanticVersionFormat};
use crate::error::{GitSemverError, Result};
use git2::Oid;
use regex::Regex;

/// Default tag prefix: an optional `v` or `V`
pub const DEFAULT_TAG_PREFIX: &str = "[vV]?";

/// Tag prefix pattern (a regex anchored at the start of the tag name)
///
/// The remainder after the prefix must be a version under the configured
/// format, e.g. with `[vV]?` both "v1.2.3" and "1.2.3" carry 1.2.3.
#[derive(Debug, Clone)]
pub struct TagPrefix {
    pattern: String,
    regex: Regex,
}

impl TagPrefix {
    /// Compile a tag prefix pattern
    pub fn new(pattern: impl Into<String>) -> Result<Self> {
        let pattern = pattern.into();
        let regex = Regex::new(&format!("^(?:{})", pattern)).map_err(|e| {
            GitSemverError::config(format!("Invalid tag prefix '{}': {}", pattern, e))
        })?;
        Ok(TagPrefix { pattern, regex })
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Strip the prefix from a tag name; None when the prefix does not match
    pub fn strip<'a>(&self, name: &'a str) -> Option<&'a str> {
        self.regex.find(name).map(|m| &name[m.end()..])
    }

    /// Parse a tag name into a version, None when it is not a version tag
    pub fn parse(&self, name: &str, format: SemanticVersionFormat) -> Option<SemanticVersion> {
        let remainder = self.strip(name)?;
        SemanticVersion::try_parse(remainder, format)
    }
}

/// A tag that parsed as a version
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionTag {
    pub name: String,
    pub commit: Oid,
    pub version: SemanticVersion,
}
