//! Branch lineage: which branch each part of the history belongs to
//!
//! The current branch owns the commits newer than its branch point, the
//! merge base with its best source branch. The same search is repeated for
//! that source branch until a main or mainline branch (or a branch without
//! sources) is reached.

use crate::analyzer::classifier::{BranchClassifier, ClassifiedBranch};
use crate::domain::VersionField;
use crate::error::{GitSemverError, Result};
use crate::git::CommitGraph;
use git2::Oid;
use std::cmp::{Ordering, Reverse};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, instrument};

/// One branch in the lineage
#[derive(Debug, Clone)]
pub struct LineageSegment {
    pub branch: Arc<ClassifiedBranch>,
    pub tip: Oid,
    /// Where this branch left its source; None for the oldest segment
    pub branch_point: Option<Oid>,
    /// Configured increment with `Inherit` resolved
    pub increment: VersionField,
}

/// Segments from the current branch down to its root branch
#[derive(Debug, Clone)]
pub struct Lineage {
    pub segments: Vec<LineageSegment>,
}

impl Lineage {
    /// Segment of the current branch
    pub fn current(&self) -> &LineageSegment {
        &self.segments[0]
    }

    /// Whether the current branch has no commits of its own
    pub fn current_is_empty(&self, graph: &CommitGraph<'_>) -> Result<bool> {
        match self.current().branch_point {
            Some(point) => graph.is_ancestor(self.current().tip, point),
            None => Ok(false),
        }
    }
}

struct Candidate {
    branch: Arc<ClassifiedBranch>,
    tip: Oid,
    merge_base: Oid,
    merge_base_is_tip: bool,
    merge_base_when: i64,
    source_rank: usize,
}

impl Candidate {
    /// Lower sorts first: merge base off the tip, newest merge base, source order, name
    fn rank(&self, other: &Candidate) -> Ordering {
        self.merge_base_is_tip
            .cmp(&other.merge_base_is_tip)
            .then_with(|| Reverse(self.merge_base_when).cmp(&Reverse(other.merge_base_when)))
            .then_with(|| self.source_rank.cmp(&other.source_rank))
            .then_with(|| self.branch.name.cmp(&other.branch.name))
    }
}

fn find_branch_point(
    graph: &CommitGraph<'_>,
    classifier: &BranchClassifier<'_>,
    branch: &ClassifiedBranch,
    tip: Oid,
) -> Result<Option<Candidate>> {
    let sources = &branch.configuration.source_branches;
    let mut seen_names = HashSet::new();
    let mut disjoint = None;
    let mut candidates = Vec::new();

    for other in graph.branches() {
        if other.name == branch.name || !seen_names.insert(other.name.as_str()) {
            continue;
        }
        let classified = classifier.classify(&other.name);
        let Some(source_rank) = sources
            .iter()
            .position(|s| *s == classified.configuration.branch_type)
        else {
            continue;
        };

        match graph.merge_base(tip, other.tip)? {
            Some(merge_base) => candidates.push(Candidate {
                merge_base_is_tip: merge_base == tip,
                merge_base_when: graph.commit(merge_base)?.when.timestamp(),
                branch: classified,
                tip: other.tip,
                merge_base,
                source_rank,
            }),
            None => {
                disjoint.get_or_insert_with(|| other.name.clone());
            }
        }
    }

    if candidates.is_empty() {
        if let Some(source_branch) = disjoint {
            return Err(GitSemverError::ConfigurationMismatch {
                branch: branch.name.clone(),
                source_branch,
            });
        }
        return Ok(None);
    }

    candidates.sort_by(|a, b| a.rank(b));
    Ok(candidates.into_iter().next())
}

/// Walk from the current branch down through its source branches
#[instrument(skip(graph, classifier, branch), fields(branch = %branch.name))]
pub fn resolve_lineage(
    graph: &CommitGraph<'_>,
    classifier: &BranchClassifier<'_>,
    branch: Arc<ClassifiedBranch>,
    tip: Oid,
) -> Result<Lineage> {
    let mut segments: Vec<LineageSegment> = Vec::new();
    let mut visited = HashSet::new();
    let mut current = Some((branch, tip));

    while let Some((branch, tip)) = current.take() {
        visited.insert(branch.name.clone());
        let configuration = &branch.configuration;

        let found = if configuration.is_main_branch || configuration.is_mainline {
            None
        } else {
            find_branch_point(graph, classifier, &branch, tip)?
        };

        match found {
            Some(candidate) => {
                debug!(
                    branch = %branch.name,
                    source = %candidate.branch.name,
                    branch_point = %candidate.merge_base,
                    "found branch point"
                );
                segments.push(LineageSegment {
                    branch,
                    tip,
                    branch_point: Some(candidate.merge_base),
                    increment: VersionField::None,
                });
                if !visited.contains(&candidate.branch.name) {
                    current = Some((candidate.branch, candidate.tip));
                }
            }
            None => segments.push(LineageSegment {
                branch,
                tip,
                branch_point: None,
                increment: VersionField::None,
            }),
        }
    }

    let mut inherited = VersionField::Patch;
    for segment in segments.iter_mut().rev() {
        segment.increment = segment
            .branch
            .configuration
            .increment
            .field()
            .unwrap_or(inherited);
        inherited = segment.increment;
    }

    Ok(Lineage { segments })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, ResolvedConfiguration};
    use crate::domain::SemanticVersionFormat;
    use crate::git::MockRepository;

    fn lineage_of(repo: &MockRepository, config: &ResolvedConfiguration, name: &str) -> Result<Lineage> {
        let graph = CommitGraph::new(repo, &config.tag_prefix, SemanticVersionFormat::Strict)?;
        let classifier = BranchClassifier::new(config);
        let tip = repo.tip(name).unwrap();
        resolve_lineage(&graph, &classifier, classifier.classify(name), tip)
    }

    #[test]
    fn test_feature_from_develop_inherits_minor() {
        let mut repo = MockRepository::new();
        let a = repo.commit("main", "A");
        repo.branch("develop", "main");
        let d = repo.commit("develop", "D");
        repo.branch("feature/foo", "develop");
        repo.commit("feature/foo", "F");

        let config = Config::default().resolve().unwrap();
        let lineage = lineage_of(&repo, &config, "feature/foo").unwrap();
        let names: Vec<&str> = lineage.segments.iter().map(|s| s.branch.name.as_str()).collect();
        assert_eq!(names, vec!["feature/foo", "develop", "main"]);
        assert_eq!(lineage.segments[0].branch_point, Some(d));
        assert_eq!(lineage.segments[1].branch_point, Some(a));
        assert_eq!(lineage.segments[2].branch_point, None);
        assert_eq!(lineage.current().increment, VersionField::Minor);
    }

    #[test]
    fn test_main_has_no_branch_point() {
        let mut repo = MockRepository::new();
        repo.commit("main", "A");
        repo.branch("develop", "main");
        repo.commit("develop", "D");

        let config = Config::default().resolve().unwrap();
        let lineage = lineage_of(&repo, &config, "main").unwrap();
        assert_eq!(lineage.segments.len(), 1);
        assert_eq!(lineage.current().increment, VersionField::Patch);
    }

    #[test]
    fn test_disjoint_source_is_configuration_mismatch() {
        let mut repo = MockRepository::new();
        repo.commit("develop", "D");
        repo.commit("feature/orphan", "unrelated root");

        let config = Config::default().resolve().unwrap();
        let err = lineage_of(&repo, &config, "feature/orphan").unwrap_err();
        assert!(matches!(
            err,
            GitSemverError::ConfigurationMismatch { ref branch, ref source_branch }
                if branch == "feature/orphan" && source_branch == "develop"
        ));
    }

    #[test]
    fn test_no_source_branch_present() {
        let mut repo = MockRepository::new();
        repo.commit("feature/alone", "F");

        let config = Config::default().resolve().unwrap();
        let lineage = lineage_of(&repo, &config, "feature/alone").unwrap();
        assert_eq!(lineage.segments.len(), 1);
        assert_eq!(lineage.current().branch_point, None);
        // Inherit with nothing to inherit from
        assert_eq!(lineage.current().increment, VersionField::Patch);
    }

    #[test]
    fn test_newest_merge_base_preferred() {
        let mut repo = MockRepository::new();
        repo.commit("main", "A");
        repo.branch("develop", "main");
        let d = repo.commit("develop", "D");
        repo.branch("hotfix/1.0.1", "develop");
        repo.branch("feature/x", "develop");
        repo.commit("feature/x", "F");

        let config = Config::default().resolve().unwrap();
        let lineage = lineage_of(&repo, &config, "feature/x").unwrap();
        // develop and hotfix both branch at D; develop comes first in source order
        assert_eq!(lineage.current().branch_point, Some(d));
        assert_eq!(lineage.segments[1].branch.name, "develop");
    }
}
