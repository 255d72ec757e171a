use crate::error::{GitSemverError, Result};
use crate::git::{Branch, Commit, Head, Repository, Tag};
use chrono::{DateTime, Duration, Utc};
use git2::Oid;
use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};

/// 2024-01-01T00:00:00Z
const EPOCH: i64 = 1_704_067_200;

/// In-memory commit graph for testing without actual git repositories
///
/// Commits get sequential ids and timestamps one minute apart, so the
/// creation order is also the time order.
///
/// ```rust
/// # use git_semver::git::MockRepository;
/// let mut repo = MockRepository::new();
/// let a = repo.commit("main", "initial");
/// repo.tag("1.0.0", a);
/// repo.branch("feature/x", "main");
/// repo.commit("feature/x", "work");
/// repo.merge("feature/x", "main");
/// ```
pub struct MockRepository {
    commits: HashMap<Oid, Commit>,
    sequence: HashMap<Oid, u64>,
    branches: BTreeMap<String, Oid>,
    remote_branches: BTreeMap<String, Oid>,
    tags: Vec<Tag>,
    head: String,
    detached: Option<Oid>,
    counter: u64,
}

impl MockRepository {
    /// Create a new empty mock repository with HEAD on an unborn `main`
    pub fn new() -> Self {
        MockRepository {
            commits: HashMap::new(),
            sequence: HashMap::new(),
            branches: BTreeMap::new(),
            remote_branches: BTreeMap::new(),
            tags: Vec::new(),
            head: "main".to_string(),
            detached: None,
            counter: 0,
        }
    }

    fn next_commit(&mut self, parents: Vec<Oid>, message: &str) -> Oid {
        self.counter += 1;
        let mut bytes = [0u8; 20];
        bytes[0] = 0xc0;
        bytes[12..20].copy_from_slice(&self.counter.to_be_bytes());
        let id = Oid::from_bytes(&bytes).unwrap_or_else(|_| Oid::zero());

        let when = DateTime::<Utc>::from_timestamp(EPOCH, 0).unwrap_or_default()
            + Duration::minutes(self.counter as i64);

        self.commits.insert(
            id,
            Commit {
                id,
                parents,
                message: message.to_string(),
                when,
            },
        );
        self.sequence.insert(id, self.counter);
        id
    }

    /// Add a commit on top of a branch, creating the branch if it does not exist
    pub fn commit(&mut self, branch: &str, message: &str) -> Oid {
        let parents = self.branches.get(branch).copied().into_iter().collect();
        let id = self.next_commit(parents, message);
        self.branches.insert(branch.to_string(), id);
        id
    }

    /// Add several commits to a branch, returning them oldest first
    pub fn commits(&mut self, branch: &str, count: usize) -> Vec<Oid> {
        (1..=count)
            .map(|n| self.commit(branch, &format!("{} commit {}", branch, n)))
            .collect()
    }

    /// Create a branch at the tip of another branch
    pub fn branch(&mut self, name: &str, from: &str) {
        if let Some(tip) = self.branches.get(from).copied() {
            self.branches.insert(name.to_string(), tip);
        }
    }

    /// Create or move a branch to a specific commit
    pub fn branch_at(&mut self, name: &str, oid: Oid) {
        self.branches.insert(name.to_string(), oid);
    }

    /// Create or move a remote-tracking branch
    pub fn remote_branch(&mut self, name: &str, oid: Oid) {
        self.remote_branches.insert(name.to_string(), oid);
    }

    /// Merge `from` into `into` with git's default merge message
    pub fn merge(&mut self, from: &str, into: &str) -> Oid {
        let message = format!("Merge branch '{}' into {}", from, into);
        self.merge_with_message(from, into, &message)
    }

    /// Merge `from` into `into` with a custom message
    pub fn merge_with_message(&mut self, from: &str, into: &str, message: &str) -> Oid {
        let parents = [self.branches.get(into), self.branches.get(from)]
            .into_iter()
            .flatten()
            .copied()
            .collect();
        let id = self.next_commit(parents, message);
        self.branches.insert(into.to_string(), id);
        id
    }

    /// Add a tag pointing to a commit
    pub fn tag(&mut self, name: impl Into<String>, oid: Oid) {
        self.tags.push(Tag {
            name: name.into(),
            target: oid,
        });
    }

    /// Point HEAD at a branch
    pub fn checkout(&mut self, branch: &str) {
        self.head = branch.to_string();
        self.detached = None;
    }

    /// Detach HEAD at a commit
    pub fn detach(&mut self, oid: Oid) {
        self.detached = Some(oid);
    }

    /// Current tip of a local branch
    pub fn tip(&self, branch: &str) -> Option<Oid> {
        self.branches.get(branch).copied()
    }

    fn ancestors(&self, tip: Oid) -> HashSet<Oid> {
        let mut seen = HashSet::new();
        let mut queue = VecDeque::from([tip]);
        while let Some(oid) = queue.pop_front() {
            if !seen.insert(oid) {
                continue;
            }
            if let Some(commit) = self.commits.get(&oid) {
                queue.extend(commit.parents.iter().copied());
            }
        }
        seen
    }

    fn sequence_of(&self, oid: &Oid) -> u64 {
        self.sequence.get(oid).copied().unwrap_or(0)
    }
}

impl Default for MockRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl Repository for MockRepository {
    fn head(&self) -> Result<Head> {
        if let Some(commit) = self.detached {
            return Ok(Head {
                branch: None,
                commit,
            });
        }
        let commit = self.branches.get(&self.head).copied().ok_or_else(|| {
            GitSemverError::branch(format!("Branch '{}' has no commits", self.head))
        })?;
        Ok(Head {
            branch: Some(self.head.clone()),
            commit,
        })
    }

    fn find_commit(&self, oid: Oid) -> Result<Commit> {
        self.commits
            .get(&oid)
            .cloned()
            .ok_or_else(|| GitSemverError::branch(format!("Commit not found: {}", oid)))
    }

    fn resolve_commit(&self, spec: &str) -> Result<Oid> {
        if let Some(tip) = self.branches.get(spec) {
            return Ok(*tip);
        }
        if let Some(tag) = self.tags.iter().find(|t| t.name == spec) {
            return Ok(tag.target);
        }
        self.commits
            .keys()
            .find(|oid| oid.to_string().starts_with(spec))
            .copied()
            .ok_or_else(|| GitSemverError::branch(format!("Cannot resolve '{}'", spec)))
    }

    fn branches(&self) -> Result<Vec<Branch>> {
        let local = self.branches.iter().map(|(name, tip)| Branch {
            name: name.clone(),
            tip: *tip,
            is_remote: false,
        });
        let remote = self.remote_branches.iter().map(|(name, tip)| Branch {
            name: name.clone(),
            tip: *tip,
            is_remote: true,
        });
        Ok(local.chain(remote).collect())
    }

    fn tags(&self) -> Result<Vec<Tag>> {
        Ok(self.tags.clone())
    }

    fn merge_base(&self, a: Oid, b: Oid) -> Result<Option<Oid>> {
        let left = self.ancestors(a);
        let right = self.ancestors(b);
        Ok(left
            .intersection(&right)
            .max_by_key(|oid| self.sequence_of(oid))
            .copied())
    }

    fn is_ancestor(&self, ancestor: Oid, descendant: Oid) -> Result<bool> {
        Ok(self.ancestors(descendant).contains(&ancestor))
    }

    fn commits_between(&self, tip: Oid, hide: Option<Oid>) -> Result<Vec<Oid>> {
        let hidden = hide.map(|h| self.ancestors(h)).unwrap_or_default();
        let mut oids: Vec<Oid> = self
            .ancestors(tip)
            .into_iter()
            .filter(|oid| !hidden.contains(oid))
            .collect();
        oids.sort_by_key(|oid| std::cmp::Reverse(self.sequence_of(oid)));
        Ok(oids)
    }
}
