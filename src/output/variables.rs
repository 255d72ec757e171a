use crate::analyzer::VersionResult;
use crate::config::{AssemblyVersioningScheme, ResolvedConfiguration};
use crate::domain::{escape_branch_name, SemanticVersion};
use crate::error::{GitSemverError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Flat, string-valued view of a calculated version
///
/// Keys are the variable names (`SemVer`, `FullSemVer`, `BranchName`, ...),
/// kept sorted so the JSON rendering is stable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VersionVariables(BTreeMap<String, String>);

impl VersionVariables {
    pub fn from_result(result: &VersionResult, configuration: &ResolvedConfiguration) -> Self {
        let version = &result.semantic_version;
        let metadata = version.build_metadata.clone().unwrap_or_default();
        let pre_release = version.pre_release_tag();

        let pre_release_number = pre_release.and_then(|tag| tag.number);
        let weighted = match pre_release {
            Some(tag) => tag.number.unwrap_or(0) + result.configuration.pre_release_weight,
            None => configuration.tag_pre_release_weight,
        };
        let full_sem_ver = version.to_string();
        let full_build_metadata = metadata.full();
        let sha = result.commit.id.to_string();

        let mut vars = BTreeMap::new();
        let mut set = |name: &str, value: String| {
            vars.insert(name.to_string(), value);
        };
        set("Major", version.major.to_string());
        set("Minor", version.minor.to_string());
        set("Patch", version.patch.to_string());
        set("MajorMinorPatch", version.major_minor_patch());
        set("SemVer", version.to_string());
        set("FullSemVer", full_sem_ver.clone());
        set("PreReleaseTag", pre_release.map(|t| t.to_string()).unwrap_or_default());
        set("PreReleaseTagWithDash", pre_release.map(|t| t.with_dash()).unwrap_or_default());
        set("PreReleaseLabel", pre_release.map(|t| t.label_str().to_string()).unwrap_or_default());
        set(
            "PreReleaseLabelWithDash",
            pre_release.map(|t| format!("-{}", t.label_str())).unwrap_or_default(),
        );
        set("PreReleaseNumber", pre_release_number.map(|n| n.to_string()).unwrap_or_default());
        set("WeightedPreReleaseNumber", weighted.to_string());
        set("BuildMetaData", metadata.short());
        set("FullBuildMetaData", full_build_metadata.clone());
        set("BranchName", result.branch.clone());
        set("EscapedBranchName", escape_branch_name(&result.branch));
        set("Sha", sha.clone());
        set("ShortSha", result.commit.short_sha());
        set("CommitDate", result.commit.when.format("%Y-%m-%d").to_string());
        set(
            "CommitsSinceVersionSource",
            metadata.commits_since_tag.unwrap_or(0).to_string(),
        );
        set("VersionSourceSha", metadata.version_source_sha.clone().unwrap_or_default());
        set(
            "InformationalVersion",
            format!("{}+{}", full_sem_ver, full_build_metadata),
        );
        set(
            "AssemblySemVer",
            assembly_version(version, configuration.assembly_versioning_scheme),
        );
        set(
            "AssemblySemFileVer",
            assembly_version(version, configuration.assembly_file_versioning_scheme),
        );

        VersionVariables(vars)
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    /// Look up a variable by name, ignoring case
    pub fn find(&self, name: &str) -> Option<(&str, &str)> {
        self.0
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| GitSemverError::version(format!("Cannot serialize variables: {}", e)))
    }

    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| GitSemverError::version(format!("Cannot read variables: {}", e)))
    }
}

/// Numeric four-part version stamp
pub fn assembly_version(version: &SemanticVersion, scheme: AssemblyVersioningScheme) -> String {
    match scheme {
        AssemblyVersioningScheme::MajorMinorPatchTag => {
            let tag = version
                .pre_release_tag()
                .and_then(|tag| tag.number)
                .unwrap_or(0);
            format!("{}.{}.{}.{}", version.major, version.minor, version.patch, tag)
        }
        AssemblyVersioningScheme::MajorMinorPatch => {
            format!("{}.{}.{}.0", version.major, version.minor, version.patch)
        }
        AssemblyVersioningScheme::MajorMinor => format!("{}.{}.0.0", version.major, version.minor),
        AssemblyVersioningScheme::Major => format!("{}.0.0.0", version.major),
        AssemblyVersioningScheme::None => String::new(),
    }
}
