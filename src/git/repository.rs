use crate::domain::friendly_name;
use crate::error::{GitSemverError, Result};
use crate::git::{Branch, Commit, Head, Tag};
use chrono::{DateTime, Utc};
use git2::{BranchType, ErrorCode, Oid, Repository as Git2Repo, Sort};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

/// Wrapper around git2::Repository with our trait interface
///
/// `git2::Repository` is `Send` but not `Sync`; the mutex serializes access
/// so a repository can back a shared calculation session.
pub struct Git2Repository {
    repo: Mutex<Git2Repo>,
    git_dir: PathBuf,
}

impl Git2Repository {
    /// Open or discover a git repository
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let repo = Git2Repo::discover(path)?;

        Ok(Self::from_git2(repo))
    }

    /// Create from existing git2::Repository
    pub fn from_git2(repo: Git2Repo) -> Self {
        let git_dir = repo.path().to_path_buf();
        Git2Repository {
            repo: Mutex::new(repo),
            git_dir,
        }
    }

    /// The `.git` directory of the repository
    pub fn git_dir(&self) -> &Path {
        &self.git_dir
    }

    fn repo(&self) -> Result<MutexGuard<'_, Git2Repo>> {
        self.repo
            .lock()
            .map_err(|_| GitSemverError::not_supported("Repository lock poisoned"))
    }
}

fn commit_time(time: git2::Time) -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp(time.seconds(), 0).unwrap_or_default()
}

impl super::Repository for Git2Repository {
    fn head(&self) -> Result<Head> {
        let repo = self.repo()?;
        let head = repo
            .head()
            .map_err(|e| GitSemverError::branch(format!("Cannot read HEAD: {}", e)))?;

        let commit = head
            .peel_to_commit()
            .map_err(|e| GitSemverError::branch(format!("HEAD does not point at a commit: {}", e)))?
            .id();

        let branch = if head.is_branch() {
            head.shorthand().map(friendly_name)
        } else {
            None
        };

        Ok(Head { branch, commit })
    }

    fn find_commit(&self, oid: Oid) -> Result<Commit> {
        let repo = self.repo()?;
        let commit = repo.find_commit(oid)?;

        Ok(Commit {
            id: oid,
            parents: commit.parent_ids().collect(),
            message: commit.message().unwrap_or("").to_string(),
            when: commit_time(commit.time()),
        })
    }

    fn resolve_commit(&self, spec: &str) -> Result<Oid> {
        let repo = self.repo()?;
        let object = repo
            .revparse_single(spec)
            .map_err(|e| GitSemverError::branch(format!("Cannot resolve '{}': {}", spec, e)))?;
        let commit = object
            .peel_to_commit()
            .map_err(|e| GitSemverError::branch(format!("'{}' is not a commit: {}", spec, e)))?;

        Ok(commit.id())
    }

    fn branches(&self) -> Result<Vec<Branch>> {
        let repo = self.repo()?;
        let mut branches = Vec::new();

        for entry in repo.branches(None)? {
            let (branch, kind) = entry?;
            let reference = branch.get();

            if reference.symbolic_target().is_some() {
                continue;
            }
            let Some(name) = reference.name() else {
                continue;
            };
            let Some(tip) = reference.target() else {
                continue;
            };

            let name = friendly_name(name);
            if name == "HEAD" {
                continue;
            }

            branches.push(Branch {
                name,
                tip,
                is_remote: kind == BranchType::Remote,
            });
        }

        Ok(branches)
    }

    fn tags(&self) -> Result<Vec<Tag>> {
        let repo = self.repo()?;
        let names = repo.tag_names(None)?;
        let mut tags = Vec::new();

        for name in names.iter().flatten() {
            let reference = repo
                .find_reference(&format!("refs/tags/{}", name))
                .map_err(|e| GitSemverError::tag(format!("Cannot read tag '{}': {}", name, e)))?;
            match reference.peel_to_commit() {
                Ok(commit) => tags.push(Tag {
                    name: name.to_string(),
                    target: commit.id(),
                }),
                Err(e) => {
                    tracing::trace!(tag = name, error = %e, "skipping tag not pointing at a commit");
                }
            }
        }

        Ok(tags)
    }

    fn merge_base(&self, a: Oid, b: Oid) -> Result<Option<Oid>> {
        let repo = self.repo()?;
        match repo.merge_base(a, b) {
            Ok(oid) => Ok(Some(oid)),
            Err(e) if e.code() == ErrorCode::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn is_ancestor(&self, ancestor: Oid, descendant: Oid) -> Result<bool> {
        if ancestor == descendant {
            return Ok(true);
        }
        let repo = self.repo()?;
        Ok(repo.graph_descendant_of(descendant, ancestor)?)
    }

    fn commits_between(&self, tip: Oid, hide: Option<Oid>) -> Result<Vec<Oid>> {
        let repo = self.repo()?;
        let mut revwalk = repo.revwalk()?;
        revwalk.set_sorting(Sort::TOPOLOGICAL | Sort::TIME)?;
        revwalk.push(tip)?;
        if let Some(hide) = hide {
            revwalk.hide(hide)?;
        }

        let mut oids = Vec::new();
        for oid in revwalk {
            oids.push(oid?);
        }

        Ok(oids)
    }
}
