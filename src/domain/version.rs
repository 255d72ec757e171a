use crate::domain::metadata::BuildMetaData;
use crate::domain::prerelease::PreReleaseTag;
use crate::error::{GitSemverError, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

/// Which part of a version to bump
///
/// Ordered `None < Patch < Minor < Major` so that combining two increments is
/// simply taking the larger one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum VersionField {
    #[default]
    None,
    Patch,
    Minor,
    Major,
}

impl VersionField {
    /// Combine two increments; the larger one wins
    pub fn consolidate(self, other: VersionField) -> VersionField {
        self.max(other)
    }
}

impl fmt::Display for VersionField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            VersionField::None => "None",
            VersionField::Patch => "Patch",
            VersionField::Minor => "Minor",
            VersionField::Major => "Major",
        };
        write!(f, "{}", name)
    }
}

/// How strictly version strings found in tags and branch names are parsed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SemanticVersionFormat {
    /// Full `major.minor.patch` required
    #[default]
    Strict,
    /// Missing minor/patch default to zero, a fourth number is tolerated
    Loose,
}

/// Semantic version: `major.minor.patch[-pre_release][+build_metadata]`
///
/// Equality and ordering ignore build metadata. A version without a
/// pre-release sorts after all of its pre-releases.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SemanticVersion {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
    pub pre_release: Option<PreReleaseTag>,
    pub build_metadata: Option<BuildMetaData>,
}

impl SemanticVersion {
    /// Create a new stable version
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        SemanticVersion {
            major,
            minor,
            patch,
            pre_release: None,
            build_metadata: None,
        }
    }

    /// Builder-style pre-release setter
    pub fn with_pre_release(mut self, pre_release: PreReleaseTag) -> Self {
        self.pre_release = Some(pre_release);
        self
    }

    /// The pre-release tag when it is not stable
    pub fn pre_release_tag(&self) -> Option<&PreReleaseTag> {
        self.pre_release.as_ref().filter(|tag| !tag.is_stable())
    }

    pub fn is_pre_release(&self) -> bool {
        self.pre_release_tag().is_some()
    }

    /// Whether this version is a pre-release carrying `label`
    pub fn has_pre_release_label(&self, label: &str) -> bool {
        self.pre_release_tag()
            .map_or(false, |tag| tag.has_label(label))
    }

    /// The numeric core of the version without pre-release or metadata
    pub fn triple(&self) -> SemanticVersion {
        SemanticVersion::new(self.major, self.minor, self.patch)
    }

    /// "1.2.3"
    pub fn major_minor_patch(&self) -> String {
        format!("{}.{}.{}", self.major, self.minor, self.patch)
    }

    /// Standard bump; higher fields zero lower fields. Drops pre-release and metadata.
    pub fn bump(&self, field: VersionField) -> SemanticVersion {
        match field {
            VersionField::None => self.triple(),
            VersionField::Patch => SemanticVersion::new(self.major, self.minor, self.patch + 1),
            VersionField::Minor => SemanticVersion::new(self.major, self.minor + 1, 0),
            VersionField::Major => SemanticVersion::new(self.major + 1, 0, 0),
        }
    }

    /// Bump unless this is a pre-release of `label` and the bump is not forced.
    ///
    /// A pre-release `1.2.0-beta.3` continued on a `beta` branch stays on
    /// `1.2.0`; only its pre-release number moves.
    pub fn increment(&self, field: VersionField, label: Option<&str>, force: bool) -> SemanticVersion {
        let same_label = label.map_or(false, |label| self.has_pre_release_label(label));
        if same_label && !force {
            self.triple()
        } else {
            self.bump(field)
        }
    }

    /// Compare only the numeric `major.minor.patch` triple
    pub fn compare_triple(&self, other: &SemanticVersion) -> Ordering {
        (self.major, self.minor, self.patch).cmp(&(other.major, other.minor, other.patch))
    }

    /// Parse a version string under the given format
    pub fn parse(s: &str, format: SemanticVersionFormat) -> Result<Self> {
        match format {
            SemanticVersionFormat::Strict => Self::parse_strict(s),
            SemanticVersionFormat::Loose => Self::parse_loose(s),
        }
    }

    /// Parse leniently, returning None instead of an error
    pub fn try_parse(s: &str, format: SemanticVersionFormat) -> Option<Self> {
        Self::parse(s, format).ok()
    }

    fn parse_strict(s: &str) -> Result<Self> {
        let parsed = semver::Version::parse(s)
            .map_err(|e| GitSemverError::version(format!("Invalid version '{}': {}", s, e)))?;

        let pre_release = if parsed.pre.is_empty() {
            None
        } else {
            Some(PreReleaseTag::parse(parsed.pre.as_str()))
        };
        let build_metadata = if parsed.build.is_empty() {
            None
        } else {
            Some(BuildMetaData::parse(parsed.build.as_str()))
        };

        Ok(SemanticVersion {
            major: parsed.major,
            minor: parsed.minor,
            patch: parsed.patch,
            pre_release,
            build_metadata,
        })
    }

    fn parse_loose(s: &str) -> Result<Self> {
        static LOOSE: OnceLock<Option<Regex>> = OnceLock::new();
        let re = LOOSE
            .get_or_init(|| {
                Regex::new(
                    r"^(?P<major>\d+)(?:\.(?P<minor>\d+))?(?:\.(?P<patch>\d+))?(?:\.\d+)?(?:-(?P<pre>[0-9A-Za-z\-.]+))?(?:\+(?P<build>[0-9A-Za-z\-.]+))?$",
                )
                .ok()
            })
            .as_ref()
            .ok_or_else(|| GitSemverError::version("Loose version pattern failed to compile"))?;

        let caps = re
            .captures(s)
            .ok_or_else(|| GitSemverError::version(format!("Invalid version '{}'", s)))?;

        let number = |name: &str| -> Result<u64> {
            match caps.name(name) {
                Some(m) => m.as_str().parse::<u64>().map_err(|_| {
                    GitSemverError::version(format!("Invalid {} version in '{}'", name, s))
                }),
                None => Ok(0),
            }
        };

        Ok(SemanticVersion {
            major: number("major")?,
            minor: number("minor")?,
            patch: number("patch")?,
            pre_release: caps.name("pre").map(|m| PreReleaseTag::parse(m.as_str())),
            build_metadata: caps.name("build").map(|m| BuildMetaData::parse(m.as_str())),
        })
    }
}

impl fmt::Display for SemanticVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)?;
        if let Some(tag) = self.pre_release_tag() {
            write!(f, "-{}", tag)?;
        }
        Ok(())
    }
}

impl FromStr for SemanticVersion {
    type Err = GitSemverError;

    fn from_str(s: &str) -> Result<Self> {
        SemanticVersion::parse(s, SemanticVersionFormat::Loose)
    }
}

impl Ord for SemanticVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        self.compare_triple(other).then_with(|| {
            match (self.pre_release_tag(), other.pre_release_tag()) {
                (None, None) => Ordering::Equal,
                (None, Some(_)) => Ordering::Greater,
                (Some(_), None) => Ordering::Less,
                (Some(a), Some(b)) => a.cmp(b),
            }
        })
    }
}

impl PartialOrd for SemanticVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for SemanticVersion {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for SemanticVersion {}
