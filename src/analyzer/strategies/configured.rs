use super::VersionStrategy;
use crate::analyzer::base_version::{BaseVersion, BaseVersionOrigin};
use crate::analyzer::context::VersionContext;
use crate::config::VersionStrategyKind;
use crate::domain::VersionField;
use crate::error::Result;

/// `next_version` from configuration, taken as is
pub struct ConfiguredNextVersion;

impl VersionStrategy for ConfiguredNextVersion {
    fn kind(&self) -> VersionStrategyKind {
        VersionStrategyKind::ConfiguredNextVersion
    }

    fn base_versions(&self, context: &VersionContext<'_>) -> Result<Vec<BaseVersion>> {
        Ok(context
            .configuration
            .next_version
            .iter()
            .map(|version| BaseVersion {
                strategy: self.kind(),
                origin: BaseVersionOrigin::Configured,
                base_version_source: None,
                semantic_version: version.clone(),
                should_increment: false,
                increment: VersionField::None,
                label: None,
            })
            .collect())
    }
}
