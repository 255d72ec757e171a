//! Merge commit message recognition
//!
//! Merge commits created by git itself, hosting services and GUI clients each
//! phrase their messages differently. A `MergeMessageFormat` is a named regex
//! with a `SourceBranch` capture and optional `TargetBranch` and
//! `PullRequestNumber` captures.

use crate::domain::branch::friendly_name;
use crate::error::{GitSemverError, Result};
use regex::Regex;

/// Built-in merge message formats, tried after any custom formats
pub const BUILTIN_MERGE_MESSAGE_FORMATS: &[(&str, &str)] = &[
    (
        "Default",
        r"^Merge (?:branch|tag) '(?P<SourceBranch>[^']*)'(?: into (?P<TargetBranch>[^\s]*))*",
    ),
    (
        "SmartGit",
        r"^Finish (?P<SourceBranch>[^\s]*)(?: into (?P<TargetBranch>[^\s]*))*",
    ),
    (
        "BitBucketPull",
        r"^Merge pull request #(?P<PullRequestNumber>\d+) (?:from|in) (?P<Source>.*) from (?P<SourceBranch>[^\s]*) to (?P<TargetBranch>[^\s]*)",
    ),
    (
        "BitBucketPullv7",
        r"^Pull request #(?P<PullRequestNumber>\d+).*\r?\n\r?\nMerge in (?P<Source>.*) from (?P<SourceBranch>[^\s]*) to (?P<TargetBranch>[^\s]*)",
    ),
    (
        "GitHubPull",
        r"^Merge pull request #(?P<PullRequestNumber>\d+) (?:from|in) (?:[^\s/]+/)?(?P<SourceBranch>[^\s]*)(?: into (?P<TargetBranch>[^\s]*))*",
    ),
    (
        "RemoteTracking",
        r"^Merge remote-tracking branch '(?P<SourceBranch>[^\s]*)'(?: into (?P<TargetBranch>[^\s]*))*",
    ),
    (
        "AzureDevOps",
        r"^Merge (?:pull request|PR) (?P<PullRequestNumber>\d+) from (?P<SourceBranch>[^\s]*) into (?P<TargetBranch>[^\s]*)",
    ),
];

/// A named, compiled merge message pattern
#[derive(Debug, Clone)]
pub struct MergeMessageFormat {
    pub name: String,
    pub regex: Regex,
}

impl MergeMessageFormat {
    /// Compile a merge message format
    pub fn new(name: impl Into<String>, pattern: &str) -> Result<Self> {
        let name = name.into();
        let regex = Regex::new(pattern).map_err(|e| {
            GitSemverError::config(format!("Invalid merge message format '{}': {}", name, e))
        })?;
        if !regex.capture_names().flatten().any(|n| n == "SourceBranch") {
            return Err(GitSemverError::config(format!(
                "Merge message format '{}' has no SourceBranch group",
                name
            )));
        }
        Ok(MergeMessageFormat { name, regex })
    }

    /// Custom formats (in the given order) followed by the built-in ones
    pub fn with_builtins<'a, I>(custom: I) -> Result<Vec<MergeMessageFormat>>
    where
        I: IntoIterator<Item = (&'a String, &'a String)>,
    {
        let mut formats = custom
            .into_iter()
            .map(|(name, pattern)| MergeMessageFormat::new(name.clone(), pattern))
            .collect::<Result<Vec<_>>>()?;
        for (name, pattern) in BUILTIN_MERGE_MESSAGE_FORMATS {
            formats.push(MergeMessageFormat::new(*name, pattern)?);
        }
        Ok(formats)
    }
}

/// What a recognised merge message says about the merge
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeMessage {
    pub format_name: String,
    pub source_branch: String,
    pub target_branch: Option<String>,
    pub pull_request_number: Option<u64>,
}

impl MergeMessage {
    /// Match a commit message against the formats in order; first match wins
    pub fn parse(message: &str, formats: &[MergeMessageFormat]) -> Option<MergeMessage> {
        formats.iter().find_map(|format| {
            let caps = format.regex.captures(message)?;
            let source = caps.name("SourceBranch")?.as_str();
            if source.is_empty() {
                return None;
            }
            Some(MergeMessage {
                format_name: format.name.clone(),
                source_branch: friendly_name(source),
                target_branch: caps
                    .name("TargetBranch")
                    .map(|m| friendly_name(m.as_str()))
                    .filter(|name| !name.is_empty()),
                pull_request_number: caps
                    .name("PullRequestNumber")
                    .and_then(|m| m.as_str().parse().ok()),
            })
        })
    }

    pub fn is_pull_request(&self) -> bool {
        self.pull_request_number.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn builtins() -> Vec<MergeMessageFormat> {
        MergeMessageFormat::with_builtins(std::iter::empty()).unwrap()
    }

    #[test]
    fn test_parse_default_merge() {
        let merge = MergeMessage::parse("Merge branch 'release/1.2.0' into main", &builtins()).unwrap();
        assert_eq!(merge.format_name, "Default");
        assert_eq!(merge.source_branch, "release/1.2.0");
        assert_eq!(merge.target_branch.as_deref(), Some("main"));
        assert!(!merge.is_pull_request());
    }

    #[test]
    fn test_parse_default_merge_without_target() {
        let merge = MergeMessage::parse("Merge branch 'feature/x'", &builtins()).unwrap();
        assert_eq!(merge.source_branch, "feature/x");
        assert_eq!(merge.target_branch, None);
    }

    #[test]
    fn test_parse_github_pull() {
        let merge = MergeMessage::parse(
            "Merge pull request #42 from octo/feature/login\n\nAdd login",
            &builtins(),
        )
        .unwrap();
        assert_eq!(merge.format_name, "GitHubPull");
        assert_eq!(merge.source_branch, "feature/login");
        assert_eq!(merge.pull_request_number, Some(42));
    }

    #[test]
    fn test_parse_remote_tracking() {
        let merge = MergeMessage::parse(
            "Merge remote-tracking branch 'origin/release/2.0.0' into develop",
            &builtins(),
        )
        .unwrap();
        assert_eq!(merge.format_name, "RemoteTracking");
        assert_eq!(merge.source_branch, "release/2.0.0");
    }

    #[test]
    fn test_parse_smartgit() {
        let merge = MergeMessage::parse("Finish release/3.1.0", &builtins()).unwrap();
        assert_eq!(merge.format_name, "SmartGit");
        assert_eq!(merge.source_branch, "release/3.1.0");
    }

    #[test]
    fn test_parse_azure_devops() {
        let merge = MergeMessage::parse(
            "Merge PR 17 from hotfix/1.0.1 into main",
            &builtins(),
        )
        .unwrap();
        assert_eq!(merge.format_name, "AzureDevOps");
        assert_eq!(merge.source_branch, "hotfix/1.0.1");
        assert_eq!(merge.pull_request_number, Some(17));
    }

    #[test]
    fn test_plain_message_is_not_a_merge() {
        assert!(MergeMessage::parse("Fix typo", &builtins()).is_none());
    }

    #[test]
    fn test_custom_format_takes_precedence() {
        let name = "Custom".to_string();
        let pattern = r"^Integrated (?P<SourceBranch>\S+)".to_string();
        let formats = MergeMessageFormat::with_builtins(vec![(&name, &pattern)]).unwrap();
        let merge = MergeMessage::parse("Integrated release/4.0.0", &formats).unwrap();
        assert_eq!(merge.format_name, "Custom");
        assert_eq!(merge.source_branch, "release/4.0.0");
    }

    #[test]
    fn test_custom_format_requires_source_branch_group() {
        let err = MergeMessageFormat::new("Bad", r"^Merged (\S+)").unwrap_err();
        assert!(err.is_configuration_error());
    }
}
