use super::VersionStrategy;
use crate::analyzer::base_version::{BaseVersion, BaseVersionOrigin};
use crate::analyzer::context::VersionContext;
use crate::config::VersionStrategyKind;
use crate::domain::{VersionField, VersionTag};
use crate::error::Result;
use chrono::{DateTime, Utc};
use std::cmp::Ordering;

/// Newest version tag reachable from the current commit
///
/// Pre-release tags only count when they carry the current branch label.
pub struct TaggedCommit;

impl TaggedCommit {
    fn newest_tag<'g>(&self, context: &VersionContext<'g>) -> Result<Option<&'g VersionTag>> {
        let graph = context.graph;
        let label = context.label();
        let current = context.commit.id;

        let mut newest: Option<(DateTime<Utc>, &VersionTag)> = None;
        for tag in graph.version_tags() {
            if tag.version.is_pre_release() && !tag.version.has_pre_release_label(label) {
                continue;
            }
            if !graph.is_ancestor(tag.commit, current)? {
                continue;
            }
            let when = graph.commit(tag.commit)?.when;
            let newer = match &newest {
                None => true,
                Some((best_when, best)) => match when.cmp(best_when) {
                    Ordering::Greater => true,
                    Ordering::Less => false,
                    Ordering::Equal => tag
                        .version
                        .cmp(&best.version)
                        .then_with(|| best.name.cmp(&tag.name))
                        .is_gt(),
                },
            };
            if newer {
                newest = Some((when, tag));
            }
        }
        Ok(newest.map(|(_, tag)| tag))
    }
}

impl VersionStrategy for TaggedCommit {
    fn kind(&self) -> VersionStrategyKind {
        VersionStrategyKind::TaggedCommit
    }

    fn base_versions(&self, context: &VersionContext<'_>) -> Result<Vec<BaseVersion>> {
        let Some(tag) = self.newest_tag(context)? else {
            return Ok(Vec::new());
        };

        let graph = context.graph;
        let configuration = &context.branch.configuration;
        let mut commits = Vec::new();
        for oid in graph.commits_between(context.commit.id, Some(tag.commit))? {
            commits.push(graph.commit(oid)?);
        }
        let from_messages = context
            .increment_finder
            .increment_for_commits(&commits, configuration.commit_message_incrementing)
            .unwrap_or(VersionField::None);

        Ok(vec![BaseVersion {
            strategy: self.kind(),
            origin: BaseVersionOrigin::Tag,
            base_version_source: Some(tag.commit),
            semantic_version: tag.version.clone(),
            should_increment: tag.commit != context.commit.id,
            increment: context.lineage.current().increment.consolidate(from_messages),
            label: context.branch.label.clone(),
        }])
    }
}
