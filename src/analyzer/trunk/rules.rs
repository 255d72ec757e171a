//! Incrementer rules, tried in order for every commit of an iteration
//!
//! The first rule whose precondition holds decides what the commit
//! contributes to the context.

use super::context::{BaseVersionIncrement, TrunkContext};
use super::iteration::TrunkCommit;
use super::TrunkEngine;
use crate::boundary::BoundaryWarning;
use crate::domain::{version_in_branch_name, VersionField};
use crate::error::{GitSemverError, Result};

/// One rule of the chain
pub trait Incrementer: Sync {
    fn name(&self) -> &'static str;

    fn matches(&self, engine: &TrunkEngine<'_>, commit: &TrunkCommit, context: &TrunkContext) -> bool;

    fn increments(
        &self,
        engine: &TrunkEngine<'_>,
        commit: &TrunkCommit,
        context: &TrunkContext,
    ) -> Result<Vec<BaseVersionIncrement>>;
}

/// The chain in priority order
pub static INCREMENTERS: &[&dyn Incrementer] = &[
    &CommitOnTrunkWithStableTag,
    &CommitOnNonTrunkWithPreReleaseTag,
    &CommitOnNonTrunkWithStableTag,
    &FirstCommitOnRelease,
    &MergeCommitWithChild,
    &CommitOnNonTrunk,
    &CommitOnTrunk,
];

fn operator(commit: &TrunkCommit, force: bool) -> BaseVersionIncrement {
    BaseVersionIncrement::Operator {
        increment: commit.increment,
        force,
        label: commit.label.clone(),
        source: commit.id(),
    }
}

pub struct CommitOnTrunkWithStableTag;

impl Incrementer for CommitOnTrunkWithStableTag {
    fn name(&self) -> &'static str {
        "CommitOnTrunkWithStableTag"
    }

    fn matches(&self, _: &TrunkEngine<'_>, commit: &TrunkCommit, _: &TrunkContext) -> bool {
        commit.is_mainline() && commit.stable_versions().next().is_some()
    }

    fn increments(&self, _: &TrunkEngine<'_>, commit: &TrunkCommit, _: &TrunkContext) -> Result<Vec<BaseVersionIncrement>> {
        Ok(commit
            .stable_versions()
            .next()
            .map(|version| BaseVersionIncrement::Operand {
                version: version.clone(),
                source: commit.id(),
            })
            .into_iter()
            .collect())
    }
}

pub struct CommitOnNonTrunkWithPreReleaseTag;

impl Incrementer for CommitOnNonTrunkWithPreReleaseTag {
    fn name(&self) -> &'static str {
        "CommitOnNonTrunkWithPreReleaseTag"
    }

    fn matches(&self, _: &TrunkEngine<'_>, commit: &TrunkCommit, context: &TrunkContext) -> bool {
        match context.target_label.as_deref() {
            Some(label) => !commit.is_mainline() && commit.pre_release_versions(label).next().is_some(),
            None => false,
        }
    }

    fn increments(
        &self,
        _: &TrunkEngine<'_>,
        commit: &TrunkCommit,
        context: &TrunkContext,
    ) -> Result<Vec<BaseVersionIncrement>> {
        let label = context.target_label.as_deref().unwrap_or_default();
        Ok(commit
            .pre_release_versions(label)
            .next()
            .map(|version| BaseVersionIncrement::Operand {
                version: version.clone(),
                source: commit.id(),
            })
            .into_iter()
            .collect())
    }
}

/// On release branches the tag must belong to the version named by the branch
pub struct CommitOnNonTrunkWithStableTag;

impl Incrementer for CommitOnNonTrunkWithStableTag {
    fn name(&self) -> &'static str {
        "CommitOnNonTrunkWithStableTag"
    }

    fn matches(&self, _: &TrunkEngine<'_>, commit: &TrunkCommit, _: &TrunkContext) -> bool {
        !commit.is_mainline() && commit.stable_versions().next().is_some()
    }

    fn increments(&self, engine: &TrunkEngine<'_>, commit: &TrunkCommit, _: &TrunkContext) -> Result<Vec<BaseVersionIncrement>> {
        let Some(version) = commit.stable_versions().next() else {
            return Ok(Vec::new());
        };

        if commit.configuration.is_release_branch {
            let configuration = engine.context().configuration;
            if let Some(family) = version_in_branch_name(
                &commit.branch_name,
                &configuration.tag_prefix,
                configuration.semantic_version_format,
            ) {
                if (family.major, family.minor) != (version.major, version.minor) {
                    return Err(GitSemverError::VersionFamilyMismatch {
                        branch: commit.branch_name.clone(),
                        tag_version: version.to_string(),
                        family: format!("{}.{}", family.major, family.minor),
                    });
                }
            }
        }

        Ok(vec![BaseVersionIncrement::Operand {
            version: version.clone(),
            source: commit.id(),
        }])
    }
}

/// Oldest commit of a release branch: the branch name declares the version
pub struct FirstCommitOnRelease;

impl Incrementer for FirstCommitOnRelease {
    fn name(&self) -> &'static str {
        "FirstCommitOnRelease"
    }

    fn matches(&self, engine: &TrunkEngine<'_>, commit: &TrunkCommit, _: &TrunkContext) -> bool {
        commit.configuration.is_release_branch
            && commit
                .predecessor
                .map_or(true, |older| engine.commit(older).branch_name != commit.branch_name)
    }

    fn increments(&self, engine: &TrunkEngine<'_>, commit: &TrunkCommit, _: &TrunkContext) -> Result<Vec<BaseVersionIncrement>> {
        let mut increments = vec![operator(commit, false)];
        let context = engine.context();
        let configuration = context.configuration;

        match version_in_branch_name(
            &commit.branch_name,
            &configuration.tag_prefix,
            configuration.semantic_version_format,
        ) {
            Some(version) => {
                let source = commit
                    .predecessor
                    .map(|older| engine.commit(older).id())
                    .or_else(|| commit.value.parents.first().copied());
                increments.push(BaseVersionIncrement::Alternative {
                    version: version.triple(),
                    source,
                    increment: VersionField::None,
                });
            }
            None => context.warn(BoundaryWarning::UnparsableBranchVersion {
                branch: commit.branch_name.clone(),
            }),
        }
        Ok(increments)
    }
}

/// Merge commit: the merged branch is evaluated on its own first
pub struct MergeCommitWithChild;

impl Incrementer for MergeCommitWithChild {
    fn name(&self) -> &'static str {
        "MergeCommitWithChild"
    }

    fn matches(&self, _: &TrunkEngine<'_>, commit: &TrunkCommit, _: &TrunkContext) -> bool {
        commit.child_iteration.is_some()
    }

    fn increments(
        &self,
        engine: &TrunkEngine<'_>,
        commit: &TrunkCommit,
        context: &TrunkContext,
    ) -> Result<Vec<BaseVersionIncrement>> {
        let mut increments = vec![operator(commit, commit.is_mainline())];
        let Some(child_id) = commit.child_iteration else {
            return Ok(increments);
        };

        let child = engine.evaluate(child_id, None)?;
        let prevented_by_target = context.configuration.prevent_increment_of_merged_branch;
        let prevented = prevented_by_target || child.configuration.prevent_increment_when_branch_merged;

        let child_increment = if prevented {
            VersionField::None
        } else {
            child.effective_increment()
        };
        increments.push(BaseVersionIncrement::Operator {
            increment: child_increment,
            force: false,
            label: child.label.clone(),
            source: commit.id(),
        });

        let before = context.effective_increment();
        let after = before.consolidate(commit.increment).consolidate(child_increment);
        for alternative in &child.alternative_semantic_versions {
            increments.push(BaseVersionIncrement::Alternative {
                version: alternative.version.clone(),
                source: Some(commit.id()),
                increment: if prevented_by_target { before } else { after },
            });
        }

        if let (Some(version), Some(source)) = (child.semantic_version, child.base_version_source) {
            increments.push(BaseVersionIncrement::Operand { version, source });
        }
        Ok(increments)
    }
}

pub struct CommitOnNonTrunk;

impl Incrementer for CommitOnNonTrunk {
    fn name(&self) -> &'static str {
        "CommitOnNonTrunk"
    }

    fn matches(&self, _: &TrunkEngine<'_>, commit: &TrunkCommit, _: &TrunkContext) -> bool {
        !commit.is_mainline()
    }

    fn increments(&self, _: &TrunkEngine<'_>, commit: &TrunkCommit, _: &TrunkContext) -> Result<Vec<BaseVersionIncrement>> {
        Ok(vec![operator(commit, false)])
    }
}

/// Every commit on the trunk counts
pub struct CommitOnTrunk;

impl Incrementer for CommitOnTrunk {
    fn name(&self) -> &'static str {
        "CommitOnTrunk"
    }

    fn matches(&self, _: &TrunkEngine<'_>, commit: &TrunkCommit, _: &TrunkContext) -> bool {
        commit.is_mainline()
    }

    fn increments(&self, _: &TrunkEngine<'_>, commit: &TrunkCommit, _: &TrunkContext) -> Result<Vec<BaseVersionIncrement>> {
        Ok(vec![operator(commit, true)])
    }
}
