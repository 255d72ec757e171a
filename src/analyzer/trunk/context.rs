//! Accumulated state of one trunk-based walk
//!
//! Rules yield operands, operators and alternatives; the context folds them
//! into a single increment, label and base version.

use crate::config::EffectiveConfiguration;
use crate::domain::{SemanticVersion, VersionField};
use git2::Oid;
use std::sync::Arc;
use tracing::trace;

/// What an incrementer rule contributes for one commit
#[derive(Debug, Clone, PartialEq)]
pub enum BaseVersionIncrement {
    /// A concrete version found in the history; ends the walk
    Operand { version: SemanticVersion, source: Oid },
    /// How much to bump and which label to use
    Operator {
        increment: VersionField,
        force: bool,
        label: Option<String>,
        source: Oid,
    },
    /// A version that bounds the result from below, e.g. from a release branch name
    Alternative {
        version: SemanticVersion,
        source: Option<Oid>,
        increment: VersionField,
    },
}

/// A collected alternative version
#[derive(Debug, Clone, PartialEq)]
pub struct AlternativeVersion {
    pub version: SemanticVersion,
    pub source: Option<Oid>,
    pub increment: VersionField,
}

/// Accumulator threaded through the evaluation of one iteration
#[derive(Debug, Clone)]
pub struct TrunkContext {
    pub configuration: Arc<EffectiveConfiguration>,
    pub semantic_version: Option<SemanticVersion>,
    pub base_version_source: Option<Oid>,
    pub increment: VersionField,
    pub label: Option<String>,
    pub target_label: Option<String>,
    pub force_increment: bool,
    /// Resolved increment of the iteration's branch; the floor of a forced bump
    pub branch_increment: VersionField,
    pub alternative_semantic_versions: Vec<AlternativeVersion>,
    /// Parentless commit reached without finding a version
    pub initial_commit: Option<Oid>,
}

impl TrunkContext {
    pub fn new(
        configuration: Arc<EffectiveConfiguration>,
        target_label: Option<String>,
        branch_increment: VersionField,
    ) -> Self {
        TrunkContext {
            configuration,
            semantic_version: None,
            base_version_source: None,
            increment: VersionField::None,
            label: None,
            target_label,
            force_increment: false,
            branch_increment,
            alternative_semantic_versions: Vec::new(),
            initial_commit: None,
        }
    }

    /// Increment accounting for forcing: a forced bump is at least the branch increment
    pub fn effective_increment(&self) -> VersionField {
        if self.force_increment {
            self.increment.consolidate(self.branch_increment)
        } else {
            self.increment
        }
    }

    pub fn should_increment(&self) -> bool {
        self.increment != VersionField::None || self.force_increment
    }

    /// Whether a concrete version has been found
    pub fn is_resolved(&self) -> bool {
        self.semantic_version.is_some()
    }

    pub fn apply(&mut self, increment: BaseVersionIncrement) {
        match increment {
            BaseVersionIncrement::Operand { version, source } => {
                trace!(%version, %source, "operand");
                self.semantic_version = Some(version);
                self.base_version_source = Some(source);
            }
            BaseVersionIncrement::Operator {
                increment,
                force,
                label,
                source,
            } => {
                trace!(%increment, force, ?label, %source, "operator");
                self.increment = self.increment.consolidate(increment);
                self.force_increment |= force;
                if self.label.is_none() {
                    self.label = label;
                }
            }
            BaseVersionIncrement::Alternative {
                version,
                source,
                increment,
            } => {
                trace!(%version, ?source, %increment, "alternative");
                self.alternative_semantic_versions.push(AlternativeVersion {
                    version,
                    source,
                    increment,
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn context() -> TrunkContext {
        let config = Config::default().resolve().unwrap();
        TrunkContext::new(config.branch_type("main").unwrap(), None, VersionField::Patch)
    }

    #[test]
    fn test_operators_consolidate() {
        let mut ctx = context();
        ctx.apply(BaseVersionIncrement::Operator {
            increment: VersionField::Patch,
            force: false,
            label: Some("first".to_string()),
            source: Oid::zero(),
        });
        ctx.apply(BaseVersionIncrement::Operator {
            increment: VersionField::Minor,
            force: false,
            label: Some("second".to_string()),
            source: Oid::zero(),
        });
        assert_eq!(ctx.increment, VersionField::Minor);
        assert_eq!(ctx.label.as_deref(), Some("first"));
        assert!(ctx.should_increment());
    }

    #[test]
    fn test_force_raises_to_branch_increment() {
        let mut ctx = context();
        ctx.apply(BaseVersionIncrement::Operator {
            increment: VersionField::None,
            force: true,
            label: None,
            source: Oid::zero(),
        });
        assert!(ctx.should_increment());
        assert_eq!(ctx.effective_increment(), VersionField::Patch);
    }

    #[test]
    fn test_operand_resolves() {
        let mut ctx = context();
        assert!(!ctx.is_resolved());
        ctx.apply(BaseVersionIncrement::Operand {
            version: SemanticVersion::new(1, 0, 0),
            source: Oid::zero(),
        });
        assert!(ctx.is_resolved());
        assert_eq!(ctx.base_version_source, Some(Oid::zero()));
        assert!(!ctx.should_increment());
    }
}
