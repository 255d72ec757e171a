use super::VersionStrategy;
use crate::analyzer::base_version::{BaseVersion, BaseVersionOrigin};
use crate::analyzer::context::VersionContext;
use crate::config::VersionStrategyKind;
use crate::domain::{version_in_branch_name, MergeMessage};
use crate::error::Result;
use tracing::trace;

/// Version of the most recently merged release branch, read from the merge message
pub struct MergeMessageStrategy;

impl VersionStrategy for MergeMessageStrategy {
    fn kind(&self) -> VersionStrategyKind {
        VersionStrategyKind::MergeMessage
    }

    fn base_versions(&self, context: &VersionContext<'_>) -> Result<Vec<BaseVersion>> {
        let graph = context.graph;
        let configuration = context.configuration;

        let mut next = Some(context.commit.id);
        while let Some(oid) = next.take() {
            let commit = graph.commit(oid)?;
            next = commit.parents.first().copied();
            if !commit.is_merge() {
                continue;
            }

            let Some(message) = MergeMessage::parse(&commit.message, &configuration.merge_message_formats) else {
                continue;
            };
            let source = context.classifier.classify(&message.source_branch);
            if !source.configuration.is_release_branch {
                continue;
            }
            let Some(version) = version_in_branch_name(
                &message.source_branch,
                &configuration.tag_prefix,
                configuration.semantic_version_format,
            ) else {
                continue;
            };
            trace!(merge = %commit.short_sha(), branch = %message.source_branch, %version, "merged release branch");

            let current = &context.branch.configuration;
            return Ok(vec![BaseVersion {
                strategy: self.kind(),
                origin: BaseVersionOrigin::MergeMessage,
                base_version_source: Some(commit.id),
                semantic_version: version,
                should_increment: !current.prevent_increment_of_merged_branch,
                increment: context.lineage.current().increment,
                label: context.branch.label.clone(),
            }]);
        }
        Ok(Vec::new())
    }
}
