use super::{
    AssemblyVersioningScheme, BranchConfig, CommitMessageIncrementMode, Config, IncrementStrategy,
    VersionStrategyKind,
};
use crate::domain::{MergeMessageFormat, SemanticVersion, SemanticVersionFormat, TagPrefix};
use crate::error::{GitSemverError, Result};
use regex::Regex;
use std::collections::HashSet;
use std::sync::Arc;

/// Settings of one branch type, validated and immutable for a calculation
#[derive(Debug, Clone)]
pub struct EffectiveConfiguration {
    pub branch_type: String,
    pub regex: Regex,
    pub source_branches: Vec<String>,
    pub is_mainline: bool,
    pub is_main_branch: bool,
    pub is_release_branch: bool,
    pub increment: IncrementStrategy,
    /// Label template; may embed `{BranchName}`, other named groups and `{count}`
    pub label: Option<String>,
    pub prevent_increment_of_merged_branch: bool,
    pub prevent_increment_when_branch_merged: bool,
    pub prevent_increment_when_current_commit_tagged: bool,
    pub track_merge_target: bool,
    pub commit_message_incrementing: CommitMessageIncrementMode,
    pub pre_release_weight: u64,
}

impl EffectiveConfiguration {
    fn from_branch_config(
        entry: &BranchConfig,
        default_message_mode: CommitMessageIncrementMode,
    ) -> Result<Self> {
        let pattern = entry.regex.as_deref().ok_or_else(|| {
            GitSemverError::config(format!("Branch type '{}' has no regex", entry.name))
        })?;
        let regex = Regex::new(pattern).map_err(|e| {
            GitSemverError::config(format!(
                "Branch type '{}' has an invalid regex: {}",
                entry.name, e
            ))
        })?;
        let source_branches = entry.source_branches.clone().ok_or_else(|| {
            GitSemverError::config(format!(
                "Branch type '{}' has no source_branches",
                entry.name
            ))
        })?;

        Ok(EffectiveConfiguration {
            branch_type: entry.name.clone(),
            regex,
            source_branches,
            is_mainline: entry.is_mainline.unwrap_or(false),
            is_main_branch: entry.is_main_branch.unwrap_or(false),
            is_release_branch: entry.is_release_branch.unwrap_or(false),
            increment: entry.increment.unwrap_or_default(),
            label: entry.label.clone(),
            prevent_increment_of_merged_branch: entry
                .prevent_increment_of_merged_branch
                .unwrap_or(false),
            prevent_increment_when_branch_merged: entry
                .prevent_increment_when_branch_merged
                .unwrap_or(false),
            prevent_increment_when_current_commit_tagged: entry
                .prevent_increment_when_current_commit_tagged
                .unwrap_or(true),
            track_merge_target: entry.track_merge_target.unwrap_or(false),
            commit_message_incrementing: entry
                .commit_message_incrementing
                .unwrap_or(default_message_mode),
            pre_release_weight: entry.pre_release_weight.unwrap_or(0),
        })
    }

    /// Branches of this type never carry a pre-release label
    pub fn is_stable(&self) -> bool {
        self.is_main_branch || self.is_mainline || self.label.as_deref() == Some("")
    }
}

/// Compiled `+semver:` message patterns
#[derive(Debug, Clone)]
pub struct BumpMessages {
    pub major: Regex,
    pub minor: Regex,
    pub patch: Regex,
    pub none: Regex,
}

impl BumpMessages {
    fn compile(config: &Config) -> Result<Self> {
        let compile = |name: &str, pattern: &str| {
            Regex::new(pattern).map_err(|e| {
                GitSemverError::config(format!("Invalid {} pattern '{}': {}", name, pattern, e))
            })
        };
        Ok(BumpMessages {
            major: compile("major_version_bump_message", &config.major_version_bump_message)?,
            minor: compile("minor_version_bump_message", &config.minor_version_bump_message)?,
            patch: compile("patch_version_bump_message", &config.patch_version_bump_message)?,
            none: compile("no_bump_message", &config.no_bump_message)?,
        })
    }
}

/// Validated configuration: compiled patterns and the ordered branch-type table.
#[derive(Debug, Clone)]
pub struct ResolvedConfiguration {
    pub tag_prefix: TagPrefix,
    pub next_version: Option<SemanticVersion>,
    pub semantic_version_format: SemanticVersionFormat,
    pub bump_messages: BumpMessages,
    pub merge_message_formats: Vec<MergeMessageFormat>,
    pub assembly_versioning_scheme: AssemblyVersioningScheme,
    pub assembly_file_versioning_scheme: AssemblyVersioningScheme,
    pub tag_pre_release_weight: u64,
    pub strategies: Vec<VersionStrategyKind>,
    branches: Vec<Arc<EffectiveConfiguration>>,
    unknown: Arc<EffectiveConfiguration>,
}

impl ResolvedConfiguration {
    /// Validate a file configuration.
    ///
    /// Every branch type needs a compiling regex and a source branch list, and
    /// every source branch must name a branch type.
    pub fn resolve(config: &Config) -> Result<Self> {
        let (table, unknown) = config.branch_table();
        let mode = config.commit_message_incrementing;

        let branches = table
            .iter()
            .map(|entry| EffectiveConfiguration::from_branch_config(entry, mode).map(Arc::new))
            .collect::<Result<Vec<_>>>()?;
        let unknown = Arc::new(EffectiveConfiguration::from_branch_config(&unknown, mode)?);

        let mut seen = HashSet::new();
        for branch in &branches {
            if !seen.insert(branch.branch_type.as_str()) {
                return Err(GitSemverError::config(format!(
                    "Branch type '{}' is defined twice",
                    branch.branch_type
                )));
            }
        }
        for branch in branches.iter().chain(std::iter::once(&unknown)) {
            if let Some(missing) = branch
                .source_branches
                .iter()
                .find(|source| !seen.contains(source.as_str()))
            {
                return Err(GitSemverError::config(format!(
                    "Branch type '{}' names unknown source branch '{}'",
                    branch.branch_type, missing
                )));
            }
        }

        let tag_prefix = TagPrefix::new(config.tag_prefix.clone())?;
        let next_version = config
            .next_version
            .as_deref()
            .map(|v| {
                SemanticVersion::parse(v, SemanticVersionFormat::Loose).map_err(|e| {
                    GitSemverError::config(format!("Invalid next_version '{}': {}", v, e))
                })
            })
            .transpose()?;

        let mut strategies = config.strategies.clone();
        strategies.sort();
        strategies.dedup();

        Ok(ResolvedConfiguration {
            tag_prefix,
            next_version,
            semantic_version_format: config.semantic_version_format,
            bump_messages: BumpMessages::compile(config)?,
            merge_message_formats: MergeMessageFormat::with_builtins(&config.merge_message_formats)?,
            assembly_versioning_scheme: config.assembly_versioning_scheme,
            assembly_file_versioning_scheme: config.assembly_file_versioning_scheme,
            tag_pre_release_weight: config.tag_pre_release_weight,
            strategies,
            branches,
            unknown,
        })
    }

    /// Branch types in classification order (without the fallback)
    pub fn branch_types(&self) -> &[Arc<EffectiveConfiguration>] {
        &self.branches
    }

    /// The fallback type used when no regex matches
    pub fn unknown(&self) -> &Arc<EffectiveConfiguration> {
        &self.unknown
    }

    /// Look up a branch type by name.
    ///
    /// Names come from validated configuration, so a miss signals a defect.
    pub fn branch_type(&self, name: &str) -> Result<Arc<EffectiveConfiguration>> {
        if name == self.unknown.branch_type {
            return Ok(Arc::clone(&self.unknown));
        }
        self.branches
            .iter()
            .find(|b| b.branch_type == name)
            .cloned()
            .ok_or_else(|| GitSemverError::not_supported(format!("Unknown branch type '{}'", name)))
    }

    pub fn strategy_enabled(&self, kind: VersionStrategyKind) -> bool {
        self.strategies.contains(&kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{parse_config, Workflow};

    #[test]
    fn test_resolve_default_gitflow() {
        let resolved = Config::default().resolve().unwrap();
        assert_eq!(resolved.branch_types().len(), 7);
        assert_eq!(resolved.unknown().branch_type, "unknown");
        assert_eq!(resolved.tag_pre_release_weight, 60000);
        assert!(resolved.next_version.is_none());
    }

    #[test]
    fn test_resolve_trunk_based() {
        let resolved = Config::for_workflow(Workflow::TrunkBased).resolve().unwrap();
        let main = resolved.branch_type("main").unwrap();
        assert!(main.is_mainline);
        assert!(main.is_stable());
    }

    #[test]
    fn test_unknown_branch_type_lookup_is_not_supported() {
        let resolved = Config::default().resolve().unwrap();
        let err = resolved.branch_type("nonexistent").unwrap_err();
        assert!(matches!(err, GitSemverError::NotSupported(_)));
    }

    #[test]
    fn test_missing_regex_is_rejected() {
        let config = parse_config(
            r#"
[[branches]]
name = "experiment"
source_branches = ["main"]
"#,
        )
        .unwrap();
        let err = config.resolve().unwrap_err();
        assert!(err.to_string().contains("has no regex"));
    }

    #[test]
    fn test_missing_source_branches_is_rejected() {
        let config = parse_config(
            r#"
[[branches]]
name = "experiment"
regex = "^exp/"
"#,
        )
        .unwrap();
        let err = config.resolve().unwrap_err();
        assert!(err.to_string().contains("has no source_branches"));
    }

    #[test]
    fn test_unknown_source_branch_is_rejected() {
        let config = parse_config(
            r#"
[[branches]]
name = "feature"
source_branches = ["trunk"]
"#,
        )
        .unwrap();
        let err = config.resolve().unwrap_err();
        assert!(err.is_configuration_error());
        assert!(err.to_string().contains("trunk"));
    }

    #[test]
    fn test_invalid_next_version_is_rejected() {
        let config = parse_config("next_version = \"banana\"").unwrap();
        assert!(config.resolve().unwrap_err().is_configuration_error());
    }

    #[test]
    fn test_loose_next_version() {
        let config = parse_config("next_version = \"2.1\"").unwrap();
        let resolved = config.resolve().unwrap();
        assert_eq!(resolved.next_version, Some(SemanticVersion::new(2, 1, 0)));
    }

    #[test]
    fn test_release_branch_is_not_stable() {
        let resolved = Config::default().resolve().unwrap();
        let release = resolved.branch_type("release").unwrap();
        assert!(!release.is_stable());
        let support = resolved.branch_type("support").unwrap();
        assert!(support.is_stable());
    }
}
