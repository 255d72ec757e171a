//! Iterations: runs of commits owned by one branch
//!
//! The root iteration follows the first parent from the current commit and
//! switches branch whenever it crosses a branch point of the lineage. Every
//! merge commit spawns a child iteration over the commits the merge brought
//! in. Commits and iterations live in an arena and refer to each other by
//! index.

use crate::analyzer::classifier::ClassifiedBranch;
use crate::analyzer::context::VersionContext;
use crate::config::{EffectiveConfiguration, UNKNOWN_BRANCH};
use crate::domain::{MergeMessage, SemanticVersion, VersionField};
use crate::error::Result;
use crate::git::Commit;
use git2::Oid;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::trace;

pub type IterationId = usize;
pub type CommitId = usize;

#[derive(Debug)]
pub struct TrunkIteration {
    pub branch_name: String,
    pub configuration: Arc<EffectiveConfiguration>,
    /// Branch increment with `Inherit` resolved
    pub increment: VersionField,
    /// Newest first
    pub commits: Vec<CommitId>,
    /// The iteration and merge commit that spawned this one
    pub parent: Option<(IterationId, CommitId)>,
}

#[derive(Debug)]
pub struct TrunkCommit {
    pub value: Commit,
    pub iteration: IterationId,
    pub branch_name: String,
    pub configuration: Arc<EffectiveConfiguration>,
    pub label: Option<String>,
    /// Increment of the branch the commit belongs to
    pub branch_increment: VersionField,
    /// Branch increment adjusted by the commit message
    pub increment: VersionField,
    /// Next older commit of the same iteration
    pub predecessor: Option<CommitId>,
    /// Next newer commit of the same iteration
    pub successor: Option<CommitId>,
    pub child_iteration: Option<IterationId>,
    /// Versions tagged on the commit, highest first
    pub semantic_versions: Vec<SemanticVersion>,
}

impl TrunkCommit {
    pub fn id(&self) -> Oid {
        self.value.id
    }

    pub fn is_mainline(&self) -> bool {
        self.configuration.is_mainline
    }

    pub fn stable_versions(&self) -> impl Iterator<Item = &SemanticVersion> {
        self.semantic_versions.iter().filter(|v| !v.is_pre_release())
    }

    /// Pre-release versions carrying `label`, highest first
    pub fn pre_release_versions<'s>(&'s self, label: &'s str) -> impl Iterator<Item = &'s SemanticVersion> {
        self.semantic_versions
            .iter()
            .filter(move |v| v.has_pre_release_label(label))
    }
}

#[derive(Debug, Default)]
pub struct TrunkArena {
    pub iterations: Vec<TrunkIteration>,
    pub commits: Vec<TrunkCommit>,
}

impl TrunkArena {
    pub fn iteration(&self, id: IterationId) -> &TrunkIteration {
        &self.iterations[id]
    }

    pub fn commit(&self, id: CommitId) -> &TrunkCommit {
        &self.commits[id]
    }
}

/// Builds the arena for one calculation
pub struct IterationBuilder<'v> {
    context: &'v VersionContext<'v>,
    arena: TrunkArena,
    visited: HashSet<Oid>,
}

struct Owner<'b> {
    iteration: IterationId,
    branch: &'b ClassifiedBranch,
    increment: VersionField,
    track_merge_target: bool,
    members: Option<&'b HashSet<Oid>>,
}

impl<'v> IterationBuilder<'v> {
    pub fn new(context: &'v VersionContext<'v>) -> Self {
        IterationBuilder {
            context,
            arena: TrunkArena::default(),
            visited: HashSet::new(),
        }
    }

    /// Build the root iteration and everything merged into it
    pub fn build(mut self) -> Result<(TrunkArena, IterationId)> {
        let context = self.context;
        let segments = &context.lineage.segments;
        let current = context.lineage.current();
        let root = self.push_iteration(&current.branch, current.increment, None);
        let track_merge_target = current.branch.configuration.track_merge_target;

        let mut index = 0;
        let mut next = Some(context.commit.id);
        while let Some(oid) = next.take() {
            if !self.visited.insert(oid) {
                break;
            }
            while let Some(point) = segments[index].branch_point {
                if index + 1 < segments.len() && context.graph.is_ancestor(oid, point)? {
                    index += 1;
                } else {
                    break;
                }
            }

            let segment = &segments[index];
            let commit = context.graph.commit(oid)?;
            let first_parent = commit.parents.first().copied();
            let owner = Owner {
                iteration: root,
                branch: &segment.branch,
                increment: segment.increment,
                track_merge_target,
                members: None,
            };
            if self.push_commit(&owner, commit)? {
                break;
            }
            next = first_parent;
        }

        Ok((self.arena, root))
    }

    fn push_iteration(
        &mut self,
        branch: &ClassifiedBranch,
        increment: VersionField,
        parent: Option<(IterationId, CommitId)>,
    ) -> IterationId {
        self.arena.iterations.push(TrunkIteration {
            branch_name: branch.name.clone(),
            configuration: Arc::clone(&branch.configuration),
            increment,
            commits: Vec::new(),
            parent,
        });
        self.arena.iterations.len() - 1
    }

    /// Add a commit to an iteration; returns true when it carries a stable tag
    fn push_commit(&mut self, owner: &Owner<'_>, commit: Commit) -> Result<bool> {
        let context = self.context;
        let configuration = &owner.branch.configuration;
        let increment = context.increment_finder.commit_increment(
            &commit,
            configuration.commit_message_incrementing,
            owner.increment,
            configuration.is_mainline,
        );

        let mut semantic_versions: Vec<SemanticVersion> = context
            .graph
            .tags_on(commit.id)
            .iter()
            .map(|tag| tag.version.clone())
            .collect();
        if owner.track_merge_target {
            semantic_versions.extend(
                context
                    .graph
                    .merge_target_tags(commit.id)
                    .iter()
                    .map(|tag| tag.version.clone()),
            );
            semantic_versions.sort_by(|a, b| b.cmp(a));
            semantic_versions.dedup();
        }
        let stable_tag = semantic_versions.iter().any(|v| !v.is_pre_release());

        let id = self.arena.commits.len();
        let successor = self.arena.iterations[owner.iteration].commits.last().copied();
        if let Some(newer) = successor {
            self.arena.commits[newer].predecessor = Some(id);
        }
        trace!(commit = %commit.short_sha(), branch = %owner.branch.name, %increment, "walk");

        let merge = commit.is_merge().then(|| commit.clone());
        self.arena.commits.push(TrunkCommit {
            value: commit,
            iteration: owner.iteration,
            branch_name: owner.branch.name.clone(),
            configuration: Arc::clone(configuration),
            label: owner.branch.label.clone(),
            branch_increment: owner.increment,
            increment,
            predecessor: None,
            successor,
            child_iteration: None,
            semantic_versions,
        });
        self.arena.iterations[owner.iteration].commits.push(id);

        if let Some(merge) = merge.filter(|_| !stable_tag) {
            let child = self.build_child(owner, id, &merge)?;
            self.arena.commits[id].child_iteration = child;
        }
        Ok(stable_tag)
    }

    /// Child iteration over the commits a merge brought in
    fn build_child(
        &mut self,
        owner: &Owner<'_>,
        merge_id: CommitId,
        merge: &Commit,
    ) -> Result<Option<IterationId>> {
        let context = self.context;
        let (mainline, merged) = (merge.parents[0], merge.parents[1]);
        if self.visited.contains(&merged) {
            return Ok(None);
        }

        let mut members: HashSet<Oid> = context
            .graph
            .commits_between(merged, Some(mainline))?
            .into_iter()
            .collect();
        if let Some(outer) = owner.members {
            members.retain(|oid| outer.contains(oid));
        }
        if !members.contains(&merged) {
            return Ok(None);
        }

        let name = MergeMessage::parse(&merge.message, &context.configuration.merge_message_formats)
            .map(|message| message.source_branch)
            .or_else(|| {
                context
                    .graph
                    .branches_at(merged)
                    .first()
                    .map(|branch| branch.name.clone())
            })
            .unwrap_or_else(|| UNKNOWN_BRANCH.to_string());
        let branch = context.classifier.classify(&name);
        let increment = branch
            .configuration
            .increment
            .field()
            .unwrap_or(owner.increment);
        let iteration = self.push_iteration(&branch, increment, Some((owner.iteration, merge_id)));

        let child_owner = Owner {
            iteration,
            branch: &branch,
            increment,
            track_merge_target: branch.configuration.track_merge_target,
            members: Some(&members),
        };
        let mut next = Some(merged);
        while let Some(oid) = next.take() {
            if !members.contains(&oid) || !self.visited.insert(oid) {
                break;
            }
            let commit = context.graph.commit(oid)?;
            let first_parent = commit.parents.first().copied();
            if self.push_commit(&child_owner, commit)? {
                break;
            }
            next = first_parent;
        }

        Ok(Some(iteration))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::classifier::BranchClassifier;
    use crate::analyzer::lineage::resolve_lineage;
    use crate::config::{Config, Workflow};
    use crate::git::{CommitGraph, MockRepository};

    fn with_arena(repo: &MockRepository, workflow: Workflow, branch: &str, test: impl FnOnce(&TrunkArena, IterationId)) {
        let config = Config::for_workflow(workflow).resolve().unwrap();
        let graph = CommitGraph::new(repo, &config.tag_prefix, config.semantic_version_format).unwrap();
        let classifier = BranchClassifier::new(&config);
        let classified = classifier.classify(branch);
        let tip = repo.tip(branch).unwrap();
        let lineage = resolve_lineage(&graph, &classifier, classified.clone(), tip).unwrap();
        let commit = graph.commit(tip).unwrap();
        let context = VersionContext::new(&graph, &classifier, classified, commit, lineage);
        let (arena, root) = IterationBuilder::new(&context).build().unwrap();
        test(&arena, root);
    }

    #[test]
    fn test_root_iteration_switches_segments() {
        let mut repo = MockRepository::new();
        repo.commit("main", "A");
        repo.branch("develop", "main");
        repo.commit("develop", "D");
        repo.branch("feature/foo", "develop");
        repo.commits("feature/foo", 2);

        with_arena(&repo, Workflow::GitFlow, "feature/foo", |arena, root| {
            let branches: Vec<&str> = arena
                .iteration(root)
                .commits
                .iter()
                .map(|&id| arena.commit(id).branch_name.as_str())
                .collect();
            assert_eq!(branches, vec!["feature/foo", "feature/foo", "develop", "main"]);
            let oldest = arena.commit(*arena.iteration(root).commits.last().unwrap());
            assert_eq!(oldest.predecessor, None);
            assert!(oldest.successor.is_some());
        });
    }

    #[test]
    fn test_merge_spawns_child_iteration() {
        let mut repo = MockRepository::new();
        repo.commit("main", "A");
        repo.branch("feature/x", "main");
        repo.commits("feature/x", 2);
        repo.merge("feature/x", "main");

        with_arena(&repo, Workflow::TrunkBased, "main", |arena, root| {
            let merge = arena.commit(arena.iteration(root).commits[0]);
            let child = arena.iteration(merge.child_iteration.unwrap());
            assert_eq!(child.branch_name, "feature/x");
            assert_eq!(child.increment, VersionField::Minor);
            assert_eq!(child.commits.len(), 2);
            assert_eq!(child.parent, Some((root, arena.iteration(root).commits[0])));
            // The merged commits are not walked again by the root iteration
            assert_eq!(arena.iteration(root).commits.len(), 2);
        });
    }

    #[test]
    fn test_walk_stops_after_stable_tag() {
        let mut repo = MockRepository::new();
        repo.commit("main", "A");
        let b = repo.commit("main", "B");
        repo.commit("main", "C");
        repo.tag("1.0.0", b);

        with_arena(&repo, Workflow::TrunkBased, "main", |arena, root| {
            let commits = &arena.iteration(root).commits;
            assert_eq!(commits.len(), 2);
            assert_eq!(arena.commit(commits[1]).id(), b);
            assert_eq!(arena.commit(commits[1]).semantic_versions, vec![SemanticVersion::new(1, 0, 0)]);
        });
    }

    #[test]
    fn test_merge_target_tags_tracked_on_develop() {
        let mut repo = MockRepository::new();
        repo.commit("main", "A");
        repo.branch("develop", "main");
        let d = repo.commit("develop", "D1");
        let m = repo.merge("develop", "main");
        repo.tag("1.1.0", m);
        repo.commit("develop", "D2");

        with_arena(&repo, Workflow::GitFlow, "develop", |arena, root| {
            let commits = &arena.iteration(root).commits;
            let tagged = arena.commit(*commits.last().unwrap());
            assert_eq!(tagged.id(), d);
            assert_eq!(tagged.semantic_versions, vec![SemanticVersion::new(1, 1, 0)]);
            assert_eq!(commits.len(), 2);
        });
    }
}
