//! Git access abstraction layer
//!
//! This module provides a trait-based, read-only abstraction over a commit
//! graph, allowing for multiple implementations including real Git
//! repositories and in-memory graphs for testing.
//!
//! # Overview
//!
//! The primary abstraction is the [Repository] trait, which defines the
//! graph queries git-semver needs. The concrete implementations include:
//!
//! - [repository::Git2Repository]: A real implementation using the `git2` crate
//! - [mock::MockRepository]: An in-memory graph builder for testing
//!
//! [graph::CommitGraph] wraps a repository for the duration of one
//! calculation and memoizes the expensive queries.
//!
//! # Usage
//!
//! Most code should depend on the [Repository] trait rather than concrete
//! implementations to enable easy testing and flexibility.
//!
//! ```rust
//! # use git_semver::git::Repository;
//! # fn example(repo: &dyn Repository) -> git_semver::error::Result<()> {
//! let head = repo.head()?;
//! let history = repo.commits_between(head.commit, None)?;
//! println!("{} commits reachable from HEAD", history.len());
//! # Ok(())
//! # }
//! ```

pub mod graph;
pub mod mock;
pub mod repository;

pub use graph::CommitGraph;
pub use mock::MockRepository;
pub use repository::Git2Repository;

use crate::error::Result;
use chrono::{DateTime, Utc};
use git2::Oid;

/// A commit with the fields version calculation reads
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Commit {
    pub id: Oid,
    /// Parent commits; the first parent is the mainline of a merge
    pub parents: Vec<Oid>,
    pub message: String,
    pub when: DateTime<Utc>,
}

impl Commit {
    pub fn is_merge(&self) -> bool {
        self.parents.len() > 1
    }

    /// Abbreviated sha as shown by `git log --oneline`
    pub fn short_sha(&self) -> String {
        let sha = self.id.to_string();
        sha[..7.min(sha.len())].to_string()
    }
}

/// A local or remote-tracking branch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Branch {
    /// Friendly name, without `refs/heads/` or the remote name
    pub name: String,
    pub tip: Oid,
    pub is_remote: bool,
}

/// A tag peeled to the commit it points at
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    pub name: String,
    pub target: Oid,
}

/// Where HEAD points
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Head {
    /// None when HEAD is detached
    pub branch: Option<String>,
    pub commit: Oid,
}

/// Read-only commit graph trait
///
/// This trait abstracts the git queries version calculation performs, to
/// allow for multiple implementations including real Git repositories and
/// in-memory graphs for testing.
///
/// ## Thread Safety
///
/// All implementors must be `Send + Sync` to allow safe sharing across threads.
/// Callers guarantee the repository is not mutated during a calculation.
///
/// ## Error Handling
///
/// All methods return [crate::error::Result<T>] which handles Git-specific and
/// application errors uniformly. Implementations should map underlying errors
/// (like `git2::Error`) to the appropriate [crate::error::GitSemverError] variants.
///
/// ## Implementations
///
/// - [Git2Repository](repository::Git2Repository): Real Git implementation using the `git2` crate
/// - [MockRepository](mock::MockRepository): In-memory graph for tests
pub trait Repository: Send + Sync {
    /// Get the branch and commit HEAD points at
    ///
    /// # Returns
    /// * `Ok(Head)` - Current branch (None when detached) and commit
    /// * `Err` - If HEAD is unborn or there's a Git error
    fn head(&self) -> Result<Head>;

    /// Look up a commit by id
    ///
    /// # Arguments
    /// * `oid` - Object ID of the commit
    ///
    /// # Returns
    /// * `Ok(Commit)` - The commit with ordered parents, message and timestamp
    /// * `Err` - If the object doesn't exist or is not a commit
    fn find_commit(&self, oid: Oid) -> Result<Commit>;

    /// Resolve a commit-ish (full sha, abbreviated sha or ref name)
    ///
    /// # Arguments
    /// * `spec` - Anything `git rev-parse` would accept for a commit
    fn resolve_commit(&self, spec: &str) -> Result<Oid>;

    /// All local and remote-tracking branches
    ///
    /// Remote `HEAD` symbolic refs are skipped. Names are friendly names.
    fn branches(&self) -> Result<Vec<Branch>>;

    /// All tags, peeled to the commit they point at
    ///
    /// Tags pointing at non-commit objects are skipped.
    fn tags(&self) -> Result<Vec<Tag>>;

    /// Lowest common ancestor of two commits
    ///
    /// # Returns
    /// * `Ok(Some(Oid))` - The merge base
    /// * `Ok(None)` - If the commits share no history
    fn merge_base(&self, a: Oid, b: Oid) -> Result<Option<Oid>>;

    /// Whether `ancestor` is reachable from `descendant`
    ///
    /// A commit is its own ancestor.
    fn is_ancestor(&self, ancestor: Oid, descendant: Oid) -> Result<bool>;

    /// Commits reachable from `tip` but not from `hide`
    ///
    /// Returns commits in topological and time order, newest first, so a
    /// child is always listed before its parents regardless of timestamps.
    ///
    /// # Arguments
    /// * `tip` - Starting commit (inclusive)
    /// * `hide` - Commits reachable from this one are excluded
    ///
    /// # Example
    /// ```rust
    /// # use git_semver::git::Repository;
    /// # use git2::Oid;
    /// # fn example(repo: &dyn Repository, feature: Oid, develop: Oid) -> git_semver::error::Result<()> {
    /// let ahead = repo.commits_between(feature, Some(develop))?;
    /// println!("feature is {} commits ahead of develop", ahead.len());
    /// # Ok(())
    /// # }
    /// ```
    fn commits_between(&self, tip: Oid, hide: Option<Oid>) -> Result<Vec<Oid>>;
}
