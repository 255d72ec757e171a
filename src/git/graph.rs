//! Per-calculation view of a repository
//!
//! Branches and tags are read once when the session starts. Commits, merge
//! bases and ancestry answers are memoized so repeated queries during a
//! graph walk stay cheap. Every calculation owns its own session.

use crate::boundary::BoundaryWarning;
use crate::domain::{SemanticVersionFormat, TagPrefix, VersionTag};
use crate::error::Result;
use crate::git::{Branch, Commit, Repository};
use git2::Oid;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, warn};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn pair(a: Oid, b: Oid) -> (Oid, Oid) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

pub struct CommitGraph<'r> {
    repo: &'r dyn Repository,
    branches: Vec<Branch>,
    version_tags: HashMap<Oid, Vec<VersionTag>>,
    /// Tags of merge commits keyed by the merged (non-first) parents
    merge_target_tags: HashMap<Oid, Vec<VersionTag>>,
    warnings: Vec<BoundaryWarning>,
    commits: Mutex<HashMap<Oid, Commit>>,
    merge_bases: Mutex<HashMap<(Oid, Oid), Option<Oid>>>,
    ancestry: Mutex<HashMap<(Oid, Oid), bool>>,
}

impl<'r> CommitGraph<'r> {
    /// Open a session, reading branches and version tags up front
    pub fn new(
        repo: &'r dyn Repository,
        tag_prefix: &TagPrefix,
        format: SemanticVersionFormat,
    ) -> Result<Self> {
        let mut branches = repo.branches()?;
        branches.sort_by(|a, b| a.is_remote.cmp(&b.is_remote).then_with(|| a.name.cmp(&b.name)));

        let mut version_tags: HashMap<Oid, Vec<VersionTag>> = HashMap::new();
        let mut warnings = Vec::new();
        for tag in repo.tags()? {
            match tag_prefix.parse(&tag.name, format) {
                Some(version) => version_tags.entry(tag.target).or_default().push(VersionTag {
                    name: tag.name,
                    commit: tag.target,
                    version,
                }),
                None => {
                    let looks_like_version = tag_prefix
                        .strip(&tag.name)
                        .map_or(false, |rest| rest.starts_with(|c: char| c.is_ascii_digit()));
                    if looks_like_version {
                        let warning = BoundaryWarning::UnparsableTag {
                            reason: format!("not a {:?} semantic version", format),
                            tag: tag.name,
                        };
                        warn!("{}", warning);
                        warnings.push(warning);
                    }
                }
            }
        }
        for tags in version_tags.values_mut() {
            tags.sort_by(|a, b| b.version.cmp(&a.version).then_with(|| a.name.cmp(&b.name)));
        }

        let mut commits = HashMap::new();
        let mut merge_target_tags: HashMap<Oid, Vec<VersionTag>> = HashMap::new();
        for (oid, tags) in &version_tags {
            let commit = repo.find_commit(*oid)?;
            for parent in commit.parents.iter().skip(1) {
                merge_target_tags.entry(*parent).or_default().extend(tags.iter().cloned());
            }
            commits.insert(*oid, commit);
        }
        for tags in merge_target_tags.values_mut() {
            tags.sort_by(|a, b| b.version.cmp(&a.version).then_with(|| a.name.cmp(&b.name)));
        }

        debug!(
            branches = branches.len(),
            tagged_commits = version_tags.len(),
            "opened commit graph session"
        );

        Ok(CommitGraph {
            repo,
            branches,
            version_tags,
            merge_target_tags,
            warnings,
            commits: Mutex::new(commits),
            merge_bases: Mutex::new(HashMap::new()),
            ancestry: Mutex::new(HashMap::new()),
        })
    }

    pub fn repository(&self) -> &'r dyn Repository {
        self.repo
    }

    /// Warnings raised while reading tags
    pub fn warnings(&self) -> &[BoundaryWarning] {
        &self.warnings
    }

    /// Look up a commit, memoized
    pub fn commit(&self, oid: Oid) -> Result<Commit> {
        if let Some(commit) = lock(&self.commits).get(&oid) {
            return Ok(commit.clone());
        }
        let commit = self.repo.find_commit(oid)?;
        lock(&self.commits).insert(oid, commit.clone());
        Ok(commit)
    }

    /// Merge base of two commits, memoized by the unordered pair
    pub fn merge_base(&self, a: Oid, b: Oid) -> Result<Option<Oid>> {
        if a == b {
            return Ok(Some(a));
        }
        let key = pair(a, b);
        if let Some(base) = lock(&self.merge_bases).get(&key) {
            return Ok(*base);
        }
        let base = self.repo.merge_base(a, b)?;
        lock(&self.merge_bases).insert(key, base);
        Ok(base)
    }

    /// Whether `ancestor` is reachable from `descendant`, memoized
    pub fn is_ancestor(&self, ancestor: Oid, descendant: Oid) -> Result<bool> {
        if ancestor == descendant {
            return Ok(true);
        }
        let key = (ancestor, descendant);
        if let Some(answer) = lock(&self.ancestry).get(&key) {
            return Ok(*answer);
        }
        let answer = self.repo.is_ancestor(ancestor, descendant)?;
        lock(&self.ancestry).insert(key, answer);
        Ok(answer)
    }

    /// Commits reachable from `tip` but not from `hide`, newest first
    pub fn commits_between(&self, tip: Oid, hide: Option<Oid>) -> Result<Vec<Oid>> {
        self.repo.commits_between(tip, hide)
    }

    /// Number of commits reachable from `tip` but not from `source`
    pub fn count_commits(&self, tip: Oid, source: Option<Oid>) -> Result<u64> {
        Ok(self.commits_between(tip, source)?.len() as u64)
    }

    /// All branches, locals first, each group sorted by name
    pub fn branches(&self) -> &[Branch] {
        &self.branches
    }

    /// Branches whose tip is exactly `oid`, locals first, sorted by name
    pub fn branches_at(&self, oid: Oid) -> Vec<&Branch> {
        self.branches.iter().filter(|b| b.tip == oid).collect()
    }

    /// Find a branch by friendly name, preferring the local one
    pub fn find_branch(&self, name: &str) -> Option<&Branch> {
        self.branches.iter().find(|b| b.name == name)
    }

    /// Version tags on a commit, highest version first
    pub fn tags_on(&self, oid: Oid) -> &[VersionTag] {
        self.version_tags
            .get(&oid)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Version tags of the merge commits that merged `oid`, highest version first
    pub fn merge_target_tags(&self, oid: Oid) -> &[VersionTag] {
        self.merge_target_tags
            .get(&oid)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Every parsed version tag in the repository
    pub fn version_tags(&self) -> impl Iterator<Item = &VersionTag> {
        self.version_tags.values().flatten()
    }
}
