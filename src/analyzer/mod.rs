//! Version calculation engine

pub mod base_version;
pub mod calculator;
pub mod classifier;
pub mod context;
pub mod increment;
pub mod lineage;
pub mod strategies;
pub mod trunk;

pub use base_version::{BaseVersion, BaseVersionOrigin};
pub use calculator::{calculate_version, VersionResult};
pub use classifier::{BranchClassifier, ClassifiedBranch};
pub use increment::IncrementStrategyFinder;
