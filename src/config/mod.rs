//! Configuration file model and loading
//!
//! The file selects a workflow preset (`GitFlow` or `TrunkBased`) and may
//! override or extend its branch types with `[[branches]]` entries matched
//! by name. [`ResolvedConfiguration`] is the validated form the engine uses.

mod resolved;
mod workflow;

pub use resolved::{BumpMessages, EffectiveConfiguration, ResolvedConfiguration};
pub use workflow::{preset_branches, unknown_branch, UNKNOWN_BRANCH};

use crate::domain::{SemanticVersionFormat, VersionField, DEFAULT_TAG_PREFIX};
use crate::error::{GitSemverError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// Configuration file name looked up in the working directory
pub const CONFIG_FILE_NAME: &str = "GitSemver.toml";

/// Represents the complete configuration file for git-semver.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub workflow: Workflow,

    #[serde(default = "default_tag_prefix")]
    pub tag_prefix: String,

    #[serde(default)]
    pub next_version: Option<String>,

    #[serde(default)]
    pub semantic_version_format: SemanticVersionFormat,

    #[serde(default)]
    pub commit_message_incrementing: CommitMessageIncrementMode,

    #[serde(default = "default_major_version_bump_message")]
    pub major_version_bump_message: String,

    #[serde(default = "default_minor_version_bump_message")]
    pub minor_version_bump_message: String,

    #[serde(default = "default_patch_version_bump_message")]
    pub patch_version_bump_message: String,

    #[serde(default = "default_no_bump_message")]
    pub no_bump_message: String,

    /// Custom merge message formats, tried before the built-in ones
    #[serde(default)]
    pub merge_message_formats: BTreeMap<String, String>,

    #[serde(default = "default_assembly_versioning_scheme")]
    pub assembly_versioning_scheme: AssemblyVersioningScheme,

    #[serde(default = "default_assembly_file_versioning_scheme")]
    pub assembly_file_versioning_scheme: AssemblyVersioningScheme,

    #[serde(default = "default_tag_pre_release_weight")]
    pub tag_pre_release_weight: u64,

    #[serde(default = "default_strategies")]
    pub strategies: Vec<VersionStrategyKind>,

    #[serde(default)]
    pub branches: Vec<BranchConfig>,
}

/// Per-branch-type settings as written in the file; unset fields come from the preset.
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
pub struct BranchConfig {
    pub name: String,
    #[serde(default)]
    pub regex: Option<String>,
    #[serde(default)]
    pub increment: Option<IncrementStrategy>,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub source_branches: Option<Vec<String>>,
    #[serde(default)]
    pub is_mainline: Option<bool>,
    #[serde(default)]
    pub is_main_branch: Option<bool>,
    #[serde(default)]
    pub is_release_branch: Option<bool>,
    #[serde(default)]
    pub prevent_increment_of_merged_branch: Option<bool>,
    #[serde(default)]
    pub prevent_increment_when_branch_merged: Option<bool>,
    #[serde(default)]
    pub prevent_increment_when_current_commit_tagged: Option<bool>,
    #[serde(default)]
    pub track_merge_target: Option<bool>,
    #[serde(default)]
    pub commit_message_incrementing: Option<CommitMessageIncrementMode>,
    #[serde(default)]
    pub pre_release_weight: Option<u64>,
}

impl BranchConfig {
    /// Overlay every field set in `other` onto `self`
    pub fn merge(&mut self, other: &BranchConfig) {
        fn overlay<T: Clone>(target: &mut Option<T>, value: &Option<T>) {
            if value.is_some() {
                *target = value.clone();
            }
        }

        overlay(&mut self.regex, &other.regex);
        overlay(&mut self.increment, &other.increment);
        overlay(&mut self.label, &other.label);
        overlay(&mut self.source_branches, &other.source_branches);
        overlay(&mut self.is_mainline, &other.is_mainline);
        overlay(&mut self.is_main_branch, &other.is_main_branch);
        overlay(&mut self.is_release_branch, &other.is_release_branch);
        overlay(
            &mut self.prevent_increment_of_merged_branch,
            &other.prevent_increment_of_merged_branch,
        );
        overlay(
            &mut self.prevent_increment_when_branch_merged,
            &other.prevent_increment_when_branch_merged,
        );
        overlay(
            &mut self.prevent_increment_when_current_commit_tagged,
            &other.prevent_increment_when_current_commit_tagged,
        );
        overlay(&mut self.track_merge_target, &other.track_merge_target);
        overlay(
            &mut self.commit_message_incrementing,
            &other.commit_message_incrementing,
        );
        overlay(&mut self.pre_release_weight, &other.pre_release_weight);
    }
}

/// Branching model preset
#[derive(Debug, Deserialize, Serialize, Clone, Copy, Default, PartialEq, Eq)]
pub enum Workflow {
    #[default]
    GitFlow,
    TrunkBased,
}

/// How a branch type increments its version
#[derive(Debug, Deserialize, Serialize, Clone, Copy, Default, PartialEq, Eq)]
pub enum IncrementStrategy {
    None,
    Patch,
    Minor,
    Major,
    /// Take the increment of the branch this one was created from
    #[default]
    Inherit,
}

impl IncrementStrategy {
    /// The concrete field, None for `Inherit`
    pub fn field(self) -> Option<VersionField> {
        match self {
            IncrementStrategy::None => Some(VersionField::None),
            IncrementStrategy::Patch => Some(VersionField::Patch),
            IncrementStrategy::Minor => Some(VersionField::Minor),
            IncrementStrategy::Major => Some(VersionField::Major),
            IncrementStrategy::Inherit => None,
        }
    }
}

impl fmt::Display for IncrementStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.field() {
            Some(field) => write!(f, "{}", field),
            None => write!(f, "Inherit"),
        }
    }
}

/// Whether `+semver:` messages in commits may change the increment
#[derive(Debug, Deserialize, Serialize, Clone, Copy, Default, PartialEq, Eq)]
pub enum CommitMessageIncrementMode {
    #[default]
    Enabled,
    Disabled,
    MergeMessageOnly,
}

/// Numeric-only version stamp layouts
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
pub enum AssemblyVersioningScheme {
    MajorMinorPatchTag,
    MajorMinorPatch,
    MajorMinor,
    Major,
    None,
}

/// Base version strategies, in tie-break order
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum VersionStrategyKind {
    ConfiguredNextVersion,
    TaggedCommit,
    MergeMessage,
    TrunkBased,
}

impl fmt::Display for VersionStrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            VersionStrategyKind::ConfiguredNextVersion => "ConfiguredNextVersion",
            VersionStrategyKind::TaggedCommit => "TaggedCommit",
            VersionStrategyKind::MergeMessage => "MergeMessage",
            VersionStrategyKind::TrunkBased => "TrunkBased",
        };
        write!(f, "{}", name)
    }
}

fn default_tag_prefix() -> String {
    DEFAULT_TAG_PREFIX.to_string()
}

fn default_major_version_bump_message() -> String {
    r"\+semver:\s?(breaking|major)".to_string()
}

fn default_minor_version_bump_message() -> String {
    r"\+semver:\s?(feature|minor)".to_string()
}

fn default_patch_version_bump_message() -> String {
    r"\+semver:\s?(fix|patch)".to_string()
}

fn default_no_bump_message() -> String {
    r"\+semver:\s?(none|skip)".to_string()
}

fn default_assembly_versioning_scheme() -> AssemblyVersioningScheme {
    AssemblyVersioningScheme::MajorMinorPatch
}

fn default_assembly_file_versioning_scheme() -> AssemblyVersioningScheme {
    AssemblyVersioningScheme::MajorMinorPatchTag
}

fn default_tag_pre_release_weight() -> u64 {
    60000
}

fn default_strategies() -> Vec<VersionStrategyKind> {
    vec![
        VersionStrategyKind::ConfiguredNextVersion,
        VersionStrategyKind::TaggedCommit,
        VersionStrategyKind::MergeMessage,
        VersionStrategyKind::TrunkBased,
    ]
}

impl Default for Config {
    fn default() -> Self {
        Config {
            workflow: Workflow::default(),
            tag_prefix: default_tag_prefix(),
            next_version: None,
            semantic_version_format: SemanticVersionFormat::default(),
            commit_message_incrementing: CommitMessageIncrementMode::default(),
            major_version_bump_message: default_major_version_bump_message(),
            minor_version_bump_message: default_minor_version_bump_message(),
            patch_version_bump_message: default_patch_version_bump_message(),
            no_bump_message: default_no_bump_message(),
            merge_message_formats: BTreeMap::new(),
            assembly_versioning_scheme: default_assembly_versioning_scheme(),
            assembly_file_versioning_scheme: default_assembly_file_versioning_scheme(),
            tag_pre_release_weight: default_tag_pre_release_weight(),
            strategies: default_strategies(),
            branches: Vec::new(),
        }
    }
}

impl Config {
    /// Default configuration for a given workflow preset
    pub fn for_workflow(workflow: Workflow) -> Self {
        Config {
            workflow,
            ..Config::default()
        }
    }

    /// The workflow preset's branch types with the file's overrides merged in by name.
    ///
    /// Entries naming an existing type overlay it; new names are appended in
    /// file order. An entry named `unknown` overlays the fallback type, which
    /// is returned separately.
    pub fn branch_table(&self) -> (Vec<BranchConfig>, BranchConfig) {
        let mut table = preset_branches(self.workflow);
        let mut unknown = unknown_branch(self.workflow);

        for entry in &self.branches {
            if entry.name == UNKNOWN_BRANCH {
                unknown.merge(entry);
            } else if let Some(existing) = table.iter_mut().find(|b| b.name == entry.name) {
                existing.merge(entry);
            } else {
                table.push(entry.clone());
            }
        }

        (table, unknown)
    }

    /// Validate and compile into the form the engine consumes
    pub fn resolve(&self) -> Result<ResolvedConfiguration> {
        ResolvedConfiguration::resolve(self)
    }
}

/// Finds the configuration file to use, if any.
///
/// Lookup order:
/// 1. Custom path provided as parameter
/// 2. `GitSemver.toml` in the current directory
/// 3. `git-semver/GitSemver.toml` in the user config directory
pub fn locate_config(config_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = config_path {
        return Some(path.to_path_buf());
    }

    let local = Path::new(".").join(CONFIG_FILE_NAME);
    if local.exists() {
        return Some(local);
    }

    dirs::config_dir()
        .map(|dir| dir.join("git-semver").join(CONFIG_FILE_NAME))
        .filter(|path| path.exists())
}

/// Loads configuration from file or returns defaults.
///
/// # Arguments
/// * `config_path` - Optional path to custom configuration file
///
/// # Returns
/// * `Ok(Config)` - Loaded or default configuration
/// * `Err` - If a file was named or found but cannot be read or parsed
pub fn load_config(config_path: Option<&Path>) -> Result<Config> {
    match locate_config(config_path) {
        Some(path) => {
            let contents = fs::read_to_string(&path)?;
            parse_config(&contents).map_err(|e| {
                GitSemverError::config(format!("{}: {}", path.display(), e))
            })
        }
        None => Ok(Config::default()),
    }
}

/// Parse configuration from TOML text
pub fn parse_config(contents: &str) -> Result<Config> {
    toml::from_str(contents).map_err(|e| GitSemverError::config(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_values() {
        let config = Config::default();
        assert_eq!(config.workflow, Workflow::GitFlow);
        assert_eq!(config.tag_prefix, "[vV]?");
        assert_eq!(config.tag_pre_release_weight, 60000);
        assert_eq!(config.strategies.len(), 4);
        assert!(config.next_version.is_none());
    }

    #[test]
    fn test_parse_minimal_file() {
        let config = parse_config("workflow = \"TrunkBased\"\nnext_version = \"1.0.0\"\n").unwrap();
        assert_eq!(config.workflow, Workflow::TrunkBased);
        assert_eq!(config.next_version.as_deref(), Some("1.0.0"));
        assert_eq!(config.tag_prefix, "[vV]?");
    }

    #[test]
    fn test_branch_override_merges_by_name() {
        let config = parse_config(
            r#"
[[branches]]
name = "develop"
label = "dev"
"#,
        )
        .unwrap();
        let (table, _) = config.branch_table();
        let develop = table.iter().find(|b| b.name == "develop").unwrap();
        assert_eq!(develop.label.as_deref(), Some("dev"));
        assert_eq!(develop.increment, Some(IncrementStrategy::Minor));
    }

    #[test]
    fn test_new_branch_type_is_appended() {
        let config = parse_config(
            r#"
[[branches]]
name = "experiment"
regex = "^exp/"
source_branches = ["main"]
"#,
        )
        .unwrap();
        let (table, _) = config.branch_table();
        assert_eq!(table.last().map(|b| b.name.as_str()), Some("experiment"));
    }

    #[test]
    fn test_unknown_entry_overlays_fallback() {
        let config = parse_config(
            r#"
[[branches]]
name = "unknown"
increment = "Major"
"#,
        )
        .unwrap();
        let (table, unknown) = config.branch_table();
        assert!(table.iter().all(|b| b.name != UNKNOWN_BRANCH));
        assert_eq!(unknown.increment, Some(IncrementStrategy::Major));
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let err = parse_config("workflow = ").unwrap_err();
        assert!(err.is_configuration_error());
    }

    #[test]
    fn test_increment_strategy_field() {
        assert_eq!(IncrementStrategy::Minor.field(), Some(VersionField::Minor));
        assert_eq!(IncrementStrategy::Inherit.field(), None);
    }
}
