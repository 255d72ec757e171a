//! Shared state of one calculation

use crate::analyzer::classifier::{BranchClassifier, ClassifiedBranch};
use crate::analyzer::increment::IncrementStrategyFinder;
use crate::analyzer::lineage::Lineage;
use crate::boundary::BoundaryWarning;
use crate::config::ResolvedConfiguration;
use crate::git::{Commit, CommitGraph};
use std::sync::{Arc, Mutex};
use tracing::warn;

/// Everything a strategy needs to know about the calculation at hand
pub struct VersionContext<'a> {
    pub graph: &'a CommitGraph<'a>,
    pub configuration: &'a ResolvedConfiguration,
    pub classifier: &'a BranchClassifier<'a>,
    pub branch: Arc<ClassifiedBranch>,
    pub commit: Commit,
    pub lineage: Lineage,
    pub increment_finder: IncrementStrategyFinder<'a>,
    warnings: Mutex<Vec<BoundaryWarning>>,
}

impl<'a> VersionContext<'a> {
    pub fn new(
        graph: &'a CommitGraph<'a>,
        classifier: &'a BranchClassifier<'a>,
        branch: Arc<ClassifiedBranch>,
        commit: Commit,
        lineage: Lineage,
    ) -> Self {
        let configuration = classifier.configuration();
        VersionContext {
            graph,
            configuration,
            classifier,
            branch,
            commit,
            lineage,
            increment_finder: IncrementStrategyFinder::new(&configuration.bump_messages),
            warnings: Mutex::new(Vec::new()),
        }
    }

    /// Rendered label of the current branch; empty for stable branches
    pub fn label(&self) -> &str {
        self.branch.label_str()
    }

    /// Log a warning and keep it for the result
    pub fn warn(&self, warning: BoundaryWarning) {
        warn!("{}", warning);
        let mut warnings = self.warnings.lock().unwrap_or_else(|p| p.into_inner());
        if !warnings.contains(&warning) {
            warnings.push(warning);
        }
    }

    pub fn take_warnings(&self) -> Vec<BoundaryWarning> {
        std::mem::take(&mut *self.warnings.lock().unwrap_or_else(|p| p.into_inner()))
    }
}
