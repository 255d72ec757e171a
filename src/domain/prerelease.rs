//! Pre-release tag handling for semantic versions
//!
//! A pre-release tag is a label with an optional number, e.g. `beta.4`.
//! An absent or empty label marks a stable version.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Placeholder a label template may use to position the pre-release number
pub const COUNT_PLACEHOLDER: &str = "{count}";

/// Pre-release tag with optional number
///
/// # Examples
/// - "beta.4" -> PreReleaseTag { label: Some("beta"), number: Some(4) }
/// - "alpha" -> PreReleaseTag { label: Some("alpha"), number: None }
///
/// Ordering: a stable tag sorts after every pre-release; pre-releases compare
/// by number first (missing number sorts first), then by label.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PreReleaseTag {
    pub label: Option<String>,
    pub number: Option<u64>,
}

impl PreReleaseTag {
    /// Create a new pre-release tag
    pub fn new(label: impl Into<String>, number: Option<u64>) -> Self {
        PreReleaseTag {
            label: Some(label.into()),
            number,
        }
    }

    /// Parse a pre-release tag such as "beta", "beta.4" or "rc.1.2"
    ///
    /// The last dot-separated numeric identifier becomes the number; everything
    /// before it is the label. A lone identifier is always the label, so
    /// "1" stays a pre-release labelled "1".
    pub fn parse(s: &str) -> Self {
        if s.is_empty() {
            return PreReleaseTag::default();
        }

        match s.rsplit_once('.') {
            Some((label, number)) => match number.parse::<u64>() {
                Ok(number) => PreReleaseTag::new(label, Some(number)),
                Err(_) => PreReleaseTag::new(s, None),
            },
            None => PreReleaseTag::new(s, None),
        }
    }

    /// Build a pre-release tag from a label template and a commit count
    ///
    /// A template mentioning `{count}` receives the count in place and carries
    /// no separate number; any other template gets the count as its number.
    pub fn from_template(template: &str, count: u64) -> Self {
        if template.contains(COUNT_PLACEHOLDER) {
            PreReleaseTag::new(template.replace(COUNT_PLACEHOLDER, &count.to_string()), None)
        } else {
            PreReleaseTag::new(template, Some(count))
        }
    }

    /// True when the tag carries no label
    pub fn is_stable(&self) -> bool {
        self.label.as_deref().map_or(true, str::is_empty)
    }

    /// The label, or "" for stable tags
    pub fn label_str(&self) -> &str {
        self.label.as_deref().unwrap_or("")
    }

    /// Whether this tag's label equals `label`
    pub fn has_label(&self, label: &str) -> bool {
        !self.is_stable() && self.label_str() == label
    }

    /// "-beta.4" for pre-releases, "" for stable tags
    pub fn with_dash(&self) -> String {
        if self.is_stable() {
            String::new()
        } else {
            format!("-{}", self)
        }
    }
}

/// Normalize a label template: a trailing `.{count}` is implied by default.
pub fn normalize_label_template(template: &str) -> String {
    template
        .strip_suffix(&format!(".{}", COUNT_PLACEHOLDER))
        .unwrap_or(template)
        .to_string()
}

impl fmt::Display for PreReleaseTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_stable() {
            return Ok(());
        }
        write!(f, "{}", self.label_str())?;
        if let Some(number) = self.number {
            write!(f, ".{}", number)?;
        }
        Ok(())
    }
}

impl Ord for PreReleaseTag {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.is_stable(), other.is_stable()) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Greater,
            (false, true) => Ordering::Less,
            (false, false) => self
                .number
                .cmp(&other.number)
                .then_with(|| self.label_str().cmp(other.label_str())),
        }
    }
}

impl PartialOrd for PreReleaseTag {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for PreReleaseTag {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for PreReleaseTag {}
