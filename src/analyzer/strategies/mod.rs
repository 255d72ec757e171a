//! Base version strategies
//!
//! Each strategy looks at the history from a different angle and proposes
//! zero or more [`BaseVersion`] candidates. The calculator picks one of them.

mod configured;
mod merge_message;
mod tagged;
mod trunk;

pub use configured::ConfiguredNextVersion;
pub use merge_message::MergeMessageStrategy;
pub use tagged::TaggedCommit;
pub use trunk::TrunkBased;

use crate::analyzer::base_version::BaseVersion;
use crate::analyzer::context::VersionContext;
use crate::config::VersionStrategyKind;
use crate::error::Result;
use tracing::debug;

/// A source of base version candidates
pub trait VersionStrategy: Sync {
    fn kind(&self) -> VersionStrategyKind;

    fn base_versions(&self, context: &VersionContext<'_>) -> Result<Vec<BaseVersion>>;
}

/// All strategies, in tie-break order
pub static STRATEGIES: &[&dyn VersionStrategy] = &[
    &ConfiguredNextVersion,
    &TaggedCommit,
    &MergeMessageStrategy,
    &TrunkBased,
];

/// Collect the candidates of every enabled strategy, in strategy order
pub fn collect_base_versions(context: &VersionContext<'_>) -> Result<Vec<BaseVersion>> {
    let mut candidates = Vec::new();
    for strategy in STRATEGIES {
        if !context.configuration.strategy_enabled(strategy.kind()) {
            continue;
        }
        let found = strategy.base_versions(context)?;
        for candidate in &found {
            debug!(%candidate, "base version candidate");
        }
        candidates.extend(found);
    }
    Ok(candidates)
}
