//! On-disk cache of calculated variables
//!
//! Entries are JSON files under `<git dir>/git-semver-cache/`, named by a
//! SHA-256 digest of everything the calculation reads: the branch and its
//! tip, every branch and tag ref, the configuration and the command-line
//! overrides. Any change to those yields a new key; entries never expire.

use crate::boundary::BoundaryWarning;
use crate::config::Config;
use crate::error::{GitSemverError, Result};
use crate::git::Repository;
use crate::output::VersionVariables;
use git2::Oid;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Directory inside the git dir holding cache entries
pub const CACHE_DIR_NAME: &str = "git-semver-cache";

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Digest the repository state and parameters a calculation depends on
pub fn cache_key(
    repo: &dyn Repository,
    config: &Config,
    branch: Option<&str>,
    commit: Option<Oid>,
    overrides: &[String],
) -> Result<CacheKey> {
    let mut branches = repo.branches()?;
    branches.sort_by(|a, b| (a.is_remote, &a.name).cmp(&(b.is_remote, &b.name)));
    let mut tags = repo.tags()?;
    tags.sort_by(|a, b| a.name.cmp(&b.name));

    let branch_name = match branch {
        Some(name) => name.to_string(),
        None => repo.head()?.branch.unwrap_or_default(),
    };
    let tip = match commit {
        Some(oid) => oid,
        None => match branches.iter().find(|b| !b.is_remote && b.name == branch_name) {
            Some(found) => found.tip,
            None => repo.head()?.commit,
        },
    };
    let config_json = serde_json::to_string(config)
        .map_err(|e| GitSemverError::cache(format!("Cannot serialize configuration: {}", e)))?;

    let mut hasher = Sha256::new();
    hasher.update(branch_name.as_bytes());
    hasher.update(b"\n");
    hasher.update(tip.as_bytes());
    hasher.update(b"\n---\n");
    for branch in &branches {
        let scope: &[u8] = if branch.is_remote { b"remote:" } else { b"local:" };
        hasher.update(scope);
        hasher.update(branch.name.as_bytes());
        hasher.update(b"=");
        hasher.update(branch.tip.as_bytes());
        hasher.update(b"\n");
    }
    hasher.update(b"---\n");
    for tag in &tags {
        hasher.update(tag.name.as_bytes());
        hasher.update(b"=");
        hasher.update(tag.target.as_bytes());
        hasher.update(b"\n");
    }
    hasher.update(b"---\n");
    hasher.update(config_json.as_bytes());
    hasher.update(b"\n---\n");
    for value in overrides {
        hasher.update(value.as_bytes());
        hasher.update(b"\n");
    }

    Ok(CacheKey(format!("{:x}", hasher.finalize())))
}

/// Contents of one cache file
///
/// Warnings raised by the calculation are kept so a cached run reports
/// the same conditions as the run that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedCalculation {
    pub variables: VersionVariables,
    #[serde(default)]
    pub warnings: Vec<BoundaryWarning>,
}

/// Result of a cache lookup
#[derive(Debug)]
pub enum CacheEntry {
    Hit(CachedCalculation),
    Miss,
    /// The entry exists but cannot be read; it has been removed
    Corrupt(BoundaryWarning),
}

pub struct VersionCache {
    dir: PathBuf,
}

impl VersionCache {
    pub fn new(git_dir: &Path) -> Self {
        VersionCache {
            dir: git_dir.join(CACHE_DIR_NAME),
        }
    }

    pub fn path(&self, key: &CacheKey) -> PathBuf {
        self.dir.join(format!("{}.json", key.as_str()))
    }

    pub fn load(&self, key: &CacheKey) -> CacheEntry {
        let path = self.path(key);
        let contents = match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(_) => return CacheEntry::Miss,
        };

        match serde_json::from_str::<CachedCalculation>(&contents) {
            Ok(cached) if !cached.variables.is_empty() => {
                debug!(key = key.as_str(), "cache hit");
                CacheEntry::Hit(cached)
            }
            Ok(_) => self.corrupt(key, &path, "empty entry".to_string()),
            Err(e) => self.corrupt(key, &path, e.to_string()),
        }
    }

    fn corrupt(&self, key: &CacheKey, path: &Path, reason: String) -> CacheEntry {
        let warning = BoundaryWarning::CorruptCacheEntry {
            key: key.as_str().to_string(),
            reason,
        };
        warn!("{}", warning);
        if let Err(e) = fs::remove_file(path) {
            debug!(error = %e, "could not remove corrupt cache entry");
        }
        CacheEntry::Corrupt(warning)
    }

    pub fn store(
        &self,
        key: &CacheKey,
        variables: &VersionVariables,
        warnings: &[BoundaryWarning],
    ) -> Result<()> {
        let cached = CachedCalculation {
            variables: variables.clone(),
            warnings: warnings.to_vec(),
        };
        let json = serde_json::to_string_pretty(&cached)
            .map_err(|e| GitSemverError::cache(format!("Cannot serialize cache entry: {}", e)))?;
        fs::create_dir_all(&self.dir)?;
        fs::write(self.path(key), json)?;
        debug!(key = key.as_str(), "cache stored");
        Ok(())
    }
}
