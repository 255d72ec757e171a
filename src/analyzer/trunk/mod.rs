//! Trunk-based version search
//!
//! Walks the history newest first, branch by branch, and folds every commit
//! into a [`TrunkContext`] through the ordered [`rules::INCREMENTERS`]. Merged
//! branches are evaluated as child iterations before their merge commit
//! contributes. The walk of an iteration ends once a version is found.

pub mod context;
pub mod iteration;
pub mod rules;

pub use context::{AlternativeVersion, BaseVersionIncrement, TrunkContext};
pub use iteration::{CommitId, IterationBuilder, IterationId, TrunkArena, TrunkCommit, TrunkIteration};

use crate::analyzer::context::VersionContext;
use crate::error::Result;
use tracing::{debug, instrument, trace};

pub struct TrunkEngine<'v> {
    context: &'v VersionContext<'v>,
    arena: TrunkArena,
    root: IterationId,
}

impl<'v> TrunkEngine<'v> {
    /// Build the iteration arena for the context's branch and commit
    #[instrument(skip_all, fields(branch = %context.branch.name))]
    pub fn build(context: &'v VersionContext<'v>) -> Result<Self> {
        let (arena, root) = IterationBuilder::new(context).build()?;
        debug!(
            iterations = arena.iterations.len(),
            commits = arena.commits.len(),
            "built iterations"
        );
        Ok(TrunkEngine { context, arena, root })
    }

    pub fn context(&self) -> &'v VersionContext<'v> {
        self.context
    }

    pub fn commit(&self, id: CommitId) -> &TrunkCommit {
        self.arena.commit(id)
    }

    /// Evaluate the root iteration against the current branch label
    pub fn evaluate_root(&self) -> Result<TrunkContext> {
        self.evaluate(self.root, Some(self.context.label().to_string()))
    }

    /// Fold the commits of an iteration, newest first, into a fresh context
    ///
    /// A root commit without a version only anchors the fallback version:
    /// its own increment is dropped.
    pub fn evaluate(&self, id: IterationId, target_label: Option<String>) -> Result<TrunkContext> {
        let iteration = self.arena.iteration(id);
        let mut context = TrunkContext::new(
            iteration.configuration.clone(),
            target_label,
            iteration.increment,
        );

        for &commit_id in &iteration.commits {
            let commit = self.arena.commit(commit_id);
            let Some(rule) = rules::INCREMENTERS
                .iter()
                .find(|rule| rule.matches(self, commit, &context))
            else {
                continue;
            };
            trace!(commit = %commit.value.short_sha(), rule = rule.name(), "matched");
            let increments = rule.increments(self, commit, &context)?;

            let initial = commit.value.parents.is_empty()
                && !increments
                    .iter()
                    .any(|inc| matches!(inc, BaseVersionIncrement::Operand { .. }));
            if initial {
                context.initial_commit = Some(commit.id());
                for increment in increments {
                    if matches!(increment, BaseVersionIncrement::Alternative { .. }) {
                        context.apply(increment);
                    }
                }
            } else {
                for increment in increments {
                    context.apply(increment);
                }
            }

            if context.is_resolved() {
                break;
            }
        }
        Ok(context)
    }
}
