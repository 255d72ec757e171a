pub mod analyzer;
pub mod boundary;
pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod git;
pub mod observability;
pub mod output;
pub mod ui;

pub use analyzer::{calculate_version, VersionResult};
pub use error::{GitSemverError, Result};
