//! Version calculation entry point
//!
//! Picks the branch and commit, short-circuits exactly tagged commits,
//! delegates empty branches to their source branch, then collects base
//! version candidates and turns the winner into the final version.

use crate::analyzer::base_version::{BaseVersion, BaseVersionOrigin};
use crate::analyzer::classifier::{BranchClassifier, ClassifiedBranch};
use crate::analyzer::context::VersionContext;
use crate::analyzer::lineage::resolve_lineage;
use crate::analyzer::strategies::collect_base_versions;
use crate::boundary::BoundaryWarning;
use crate::config::{EffectiveConfiguration, ResolvedConfiguration, VersionStrategyKind};
use crate::domain::{friendly_name, BuildMetaData, PreReleaseTag, SemanticVersion, VersionField};
use crate::error::{GitSemverError, Result};
use crate::git::{Commit, CommitGraph, Repository};
use git2::Oid;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Branch name used when HEAD is detached and no branch points at the commit
pub const DETACHED_BRANCH: &str = "HEAD";

/// Outcome of a calculation
#[derive(Debug, Clone)]
pub struct VersionResult {
    pub semantic_version: SemanticVersion,
    pub base_version: BaseVersion,
    pub branch: String,
    pub commit: Commit,
    pub configuration: Arc<EffectiveConfiguration>,
    pub warnings: Vec<BoundaryWarning>,
}

/// Calculate the version of `commit` on `branch`
///
/// `branch` defaults to the branch HEAD is on (or a branch pointing at the
/// commit when detached); `commit` defaults to the branch tip.
#[instrument(skip(repo, configuration))]
pub fn calculate_version(
    repo: &dyn Repository,
    configuration: &ResolvedConfiguration,
    branch: Option<&str>,
    commit: Option<Oid>,
) -> Result<VersionResult> {
    let graph = CommitGraph::new(repo, &configuration.tag_prefix, configuration.semantic_version_format)?;
    let classifier = BranchClassifier::new(configuration);
    let (branch, commit) = select_target(&graph, branch, commit)?;
    debug!(%branch, %commit, "selected target");

    let mut visited = HashSet::new();
    let mut result = calculate_in_session(&graph, &classifier, &branch, commit, &mut visited)?;

    let mut warnings = graph.warnings().to_vec();
    for warning in result.warnings.drain(..) {
        if !warnings.contains(&warning) {
            warnings.push(warning);
        }
    }
    result.warnings = warnings;

    info!(version = %result.semantic_version, branch = %result.branch, "calculated version");
    Ok(result)
}

fn select_target(graph: &CommitGraph<'_>, branch: Option<&str>, commit: Option<Oid>) -> Result<(String, Oid)> {
    match (branch, commit) {
        (Some(branch), Some(commit)) => Ok((friendly_name(branch), commit)),
        (Some(branch), None) => {
            let name = friendly_name(branch);
            let tip = graph
                .find_branch(&name)
                .map(|b| b.tip)
                .ok_or_else(|| GitSemverError::branch(format!("Branch '{}' not found", name)))?;
            Ok((name, tip))
        }
        (None, Some(commit)) => {
            let name = graph
                .branches_at(commit)
                .first()
                .map(|b| b.name.clone())
                .unwrap_or_else(|| DETACHED_BRANCH.to_string());
            Ok((name, commit))
        }
        (None, None) => {
            let head = graph.repository().head()?;
            let name = head
                .branch
                .as_deref()
                .map(friendly_name)
                .or_else(|| graph.branches_at(head.commit).first().map(|b| b.name.clone()))
                .unwrap_or_else(|| DETACHED_BRANCH.to_string());
            Ok((name, head.commit))
        }
    }
}

fn calculate_in_session(
    graph: &CommitGraph<'_>,
    classifier: &BranchClassifier<'_>,
    name: &str,
    commit_id: Oid,
    visited: &mut HashSet<String>,
) -> Result<VersionResult> {
    visited.insert(name.to_string());
    let branch = classifier.classify(name);

    if let Some(source) = delegation_target(graph, classifier, &branch, commit_id, visited) {
        debug!(branch = %branch.name, source = %source, "branch has no commits of its own; delegating");
        return calculate_in_session(graph, classifier, &source, commit_id, visited);
    }

    let commit = graph.commit(commit_id)?;
    if let Some(result) = exact_tag(graph, &branch, &commit) {
        return Ok(result);
    }

    let lineage = resolve_lineage(graph, classifier, Arc::clone(&branch), commit_id)?;
    let context = VersionContext::new(graph, classifier, Arc::clone(&branch), commit, lineage);

    let candidates = collect_base_versions(&context)?;
    let base = select_base_version(candidates, context.label()).ok_or_else(|| {
        GitSemverError::config(format!(
            "No base version found for branch '{}'; enable the {} strategy",
            branch.name,
            VersionStrategyKind::TrunkBased
        ))
    })?;
    debug!(base = %base, "selected base version");

    if base.origin == BaseVersionOrigin::Fallback {
        context.warn(BoundaryWarning::NoVersionTag {
            branch: branch.name.clone(),
            fallback_version: base.semantic_version.to_string(),
        });
    }

    let semantic_version = finalize(&context, &base)?;
    Ok(VersionResult {
        semantic_version,
        base_version: base,
        branch: branch.name.clone(),
        commit: context.commit.clone(),
        configuration: Arc::clone(&branch.configuration),
        warnings: context.take_warnings(),
    })
}

/// A source branch pointing at the same commit, for branches that only
/// follow their source
fn delegation_target(
    graph: &CommitGraph<'_>,
    classifier: &BranchClassifier<'_>,
    branch: &ClassifiedBranch,
    commit: Oid,
    visited: &HashSet<String>,
) -> Option<String> {
    let configuration = &branch.configuration;
    if configuration.is_main_branch || configuration.is_mainline || configuration.is_release_branch {
        return None;
    }

    graph
        .branches_at(commit)
        .into_iter()
        .filter(|other| other.name != branch.name && !visited.contains(&other.name))
        .filter_map(|other| {
            let classified = classifier.classify(&other.name);
            configuration
                .source_branches
                .iter()
                .position(|source| *source == classified.configuration.branch_type)
                .map(|rank| (rank, other.name.clone()))
        })
        .min()
        .map(|(_, name)| name)
}

/// The highest tag on the commit, when the branch keeps tagged commits as they are
fn exact_tag(graph: &CommitGraph<'_>, branch: &ClassifiedBranch, commit: &Commit) -> Option<VersionResult> {
    if !branch.configuration.prevent_increment_when_current_commit_tagged {
        return None;
    }
    let tag = graph.tags_on(commit.id).iter().find(|tag| {
        !tag.version.is_pre_release() || tag.version.has_pre_release_label(branch.label_str())
    })?;
    debug!(tag = %tag.name, "commit is tagged");

    let mut semantic_version = tag.version.clone();
    semantic_version.build_metadata = Some(BuildMetaData {
        commits_since_tag: Some(0),
        branch: Some(branch.name.clone()),
        sha: Some(commit.id.to_string()),
        commit_date: Some(commit.when),
        version_source_sha: Some(commit.id.to_string()),
    });

    Some(VersionResult {
        semantic_version,
        base_version: BaseVersion {
            strategy: VersionStrategyKind::TaggedCommit,
            origin: BaseVersionOrigin::Tag,
            base_version_source: Some(commit.id),
            semantic_version: tag.version.clone(),
            should_increment: false,
            increment: VersionField::None,
            label: branch.label.clone(),
        },
        branch: branch.name.clone(),
        commit: commit.clone(),
        configuration: Arc::clone(&branch.configuration),
        warnings: Vec::new(),
    })
}

/// Pick the candidate with the highest resulting version
///
/// Ties prefer a candidate that needs no increment, then strategy order, then
/// the order the candidates were proposed in.
pub fn select_base_version(candidates: Vec<BaseVersion>, label: &str) -> Option<BaseVersion> {
    candidates
        .into_iter()
        .enumerate()
        .map(|(index, candidate)| (index, candidate.resulting_version(Some(label)), candidate))
        .max_by(|(ia, va, a), (ib, vb, b)| {
            va.compare_triple(vb)
                .then_with(|| b.should_increment.cmp(&a.should_increment))
                .then_with(|| b.strategy.cmp(&a.strategy))
                .then_with(|| ib.cmp(ia))
        })
        .map(|(_, _, candidate)| candidate)
}

/// Apply the winning base version: bump, pre-release and build metadata
fn finalize(context: &VersionContext<'_>, base: &BaseVersion) -> Result<SemanticVersion> {
    let label = context.label();
    let mut version = base.resulting_version(Some(label));
    let unchanged = version.compare_triple(&base.semantic_version).is_eq();
    let commits = context
        .graph
        .count_commits(context.commit.id, base.base_version_source)?;

    if !context.branch.configuration.is_stable() {
        let number = match base.semantic_version.pre_release_tag() {
            Some(tag) if unchanged && tag.has_label(label) => tag.number.unwrap_or(0) + commits,
            _ => commits,
        };
        if unchanged && base.origin.is_released() && !base.semantic_version.is_pre_release() {
            version = version.bump(VersionField::Patch);
        }
        version.pre_release = Some(PreReleaseTag::from_template(label, number));
    }

    version.build_metadata = Some(BuildMetaData {
        commits_since_tag: Some(commits),
        branch: Some(context.branch.name.clone()),
        sha: Some(context.commit.id.to_string()),
        commit_date: Some(context.commit.when),
        version_source_sha: base.base_version_source.map(|source| source.to_string()),
    });
    Ok(version)
}
