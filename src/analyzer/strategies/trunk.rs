use super::VersionStrategy;
use crate::analyzer::base_version::{BaseVersion, BaseVersionOrigin};
use crate::analyzer::context::VersionContext;
use crate::analyzer::trunk::TrunkEngine;
use crate::boundary::BoundaryWarning;
use crate::config::VersionStrategyKind;
use crate::domain::{version_in_branch_name, SemanticVersion, VersionField};
use crate::error::Result;

/// Version a repository starts from when nothing else is known
pub const FALLBACK_VERSION: SemanticVersion = SemanticVersion {
    major: 0,
    minor: 1,
    patch: 0,
    pre_release: None,
    build_metadata: None,
};

/// The incrementer chain over the branch's history
///
/// Proposes the version found by the walk (or the fallback) plus every
/// version declared by a release branch name on the way.
pub struct TrunkBased;

impl VersionStrategy for TrunkBased {
    fn kind(&self) -> VersionStrategyKind {
        VersionStrategyKind::TrunkBased
    }

    fn base_versions(&self, context: &VersionContext<'_>) -> Result<Vec<BaseVersion>> {
        let engine = TrunkEngine::build(context)?;
        let result = engine.evaluate_root()?;
        let mut candidates = Vec::new();

        let (origin, semantic_version, source) = match &result.semantic_version {
            Some(version) => (BaseVersionOrigin::Tag, version.clone(), result.base_version_source),
            None => (BaseVersionOrigin::Fallback, FALLBACK_VERSION, result.initial_commit),
        };
        candidates.push(BaseVersion {
            strategy: self.kind(),
            origin,
            base_version_source: source,
            semantic_version,
            should_increment: result.should_increment(),
            increment: result.effective_increment(),
            label: result.label.clone(),
        });

        for alternative in &result.alternative_semantic_versions {
            candidates.push(BaseVersion {
                strategy: self.kind(),
                origin: BaseVersionOrigin::BranchName,
                base_version_source: alternative.source,
                semantic_version: alternative.version.clone(),
                should_increment: alternative.increment != VersionField::None,
                increment: alternative.increment,
                label: None,
            });
        }

        let branch = &context.branch;
        if branch.configuration.is_release_branch && context.lineage.current_is_empty(context.graph)? {
            let configuration = context.configuration;
            match version_in_branch_name(
                &branch.name,
                &configuration.tag_prefix,
                configuration.semantic_version_format,
            ) {
                Some(version) => candidates.push(BaseVersion {
                    strategy: self.kind(),
                    origin: BaseVersionOrigin::BranchName,
                    base_version_source: Some(context.commit.id),
                    semantic_version: version.triple(),
                    should_increment: false,
                    increment: VersionField::None,
                    label: None,
                }),
                None => context.warn(BoundaryWarning::UnparsableBranchVersion {
                    branch: branch.name.clone(),
                }),
            }
        }

        Ok(candidates)
    }
}
