use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::branch::escape_branch_name;

/// Informational suffix of a version; never part of equality or ordering
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildMetaData {
    pub commits_since_tag: Option<u64>,
    pub branch: Option<String>,
    pub sha: Option<String>,
    pub commit_date: Option<DateTime<Utc>>,
    pub version_source_sha: Option<String>,
}

impl BuildMetaData {
    /// Short form: the number of commits since the version source
    pub fn short(&self) -> String {
        self.commits_since_tag
            .map(|n| n.to_string())
            .unwrap_or_default()
    }

    /// Full form, e.g. `4.Branch.release-1-2-0.Sha.0f3c...`
    pub fn full(&self) -> String {
        let mut parts = Vec::new();
        if let Some(commits) = self.commits_since_tag {
            parts.push(commits.to_string());
        }
        if let Some(branch) = &self.branch {
            parts.push(format!("Branch.{}", escape_branch_name(branch)));
        }
        if let Some(sha) = &self.sha {
            parts.push(format!("Sha.{}", sha));
        }
        parts.join(".")
    }

    /// Parse the short form used after `+` in a version string
    pub fn parse(s: &str) -> Self {
        BuildMetaData {
            commits_since_tag: s.split('.').next().and_then(|n| n.parse().ok()),
            ..BuildMetaData::default()
        }
    }
}
