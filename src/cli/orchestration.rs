//! Main calculation orchestration logic
//!
//! Ties configuration loading, repository access, the cache and the engine
//! together. Kept apart from `main.rs` so the flow can be driven
//! programmatically without depending on clap.

use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::analyzer::{calculate_version, VersionResult};
use crate::boundary::BoundaryWarning;
use crate::config::{load_config, Config};
use crate::git::{Git2Repository, Repository};
use crate::output::{cache_key, CacheEntry, VersionCache, VersionVariables};

/// Arguments for a calculation
///
/// Mirrors the CLI Args in a form suitable for orchestration logic.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CalculateArgs {
    /// Directory inside the repository
    pub path: PathBuf,

    /// Path to custom config file
    pub config_path: Option<PathBuf>,

    /// Branch to calculate for instead of the current one
    pub branch: Option<String>,

    /// Commit-ish to calculate for instead of the branch tip
    pub commit: Option<String>,

    /// Overrides the configured next version
    pub next_version: Option<String>,

    /// Skip reading and writing the cache
    pub no_cache: bool,
}

/// Result of a successful calculation
#[derive(Debug, Clone)]
pub struct CalculationOutcome {
    pub variables: VersionVariables,

    /// The full engine result; None when served from the cache
    pub result: Option<VersionResult>,

    pub warnings: Vec<BoundaryWarning>,
}

impl CalculationOutcome {
    pub fn from_cache(&self) -> bool {
        self.result.is_none()
    }
}

/// Load the configuration and apply command-line overrides
pub fn effective_config(args: &CalculateArgs) -> Result<Config> {
    let mut config = load_config(args.config_path.as_deref()).context("Failed to load configuration")?;
    if let Some(next_version) = &args.next_version {
        config.next_version = Some(next_version.clone());
    }
    Ok(config)
}

/// Calculate the version for the repository at `args.path`
pub fn run_calculation(args: &CalculateArgs) -> Result<CalculationOutcome> {
    let config = effective_config(args)?;
    let repo = Git2Repository::open(&args.path)
        .with_context(|| format!("Failed to open git repository at {}", args.path.display()))?;

    let cache = (!args.no_cache).then(|| VersionCache::new(repo.git_dir()));
    calculate_with(&repo, &config, args, cache.as_ref())
}

/// Calculate against any repository, consulting `cache` when given
pub fn calculate_with(
    repo: &dyn Repository,
    config: &Config,
    args: &CalculateArgs,
    cache: Option<&VersionCache>,
) -> Result<CalculationOutcome> {
    let configuration = config.resolve().context("Invalid configuration")?;
    let commit = match &args.commit {
        Some(spec) => Some(
            repo.resolve_commit(spec)
                .with_context(|| format!("Cannot resolve commit '{}'", spec))?,
        ),
        None => None,
    };

    let mut warnings = Vec::new();
    let key = match cache {
        Some(_) => {
            let overrides: Vec<String> = [&args.branch, &args.commit, &args.next_version]
                .iter()
                .map(|value| value.as_deref().unwrap_or_default().to_string())
                .collect();
            Some(cache_key(repo, config, args.branch.as_deref(), commit, &overrides)?)
        }
        None => None,
    };

    if let (Some(cache), Some(key)) = (cache, &key) {
        match cache.load(key) {
            CacheEntry::Hit(cached) => {
                info!("using cached version");
                return Ok(CalculationOutcome {
                    variables: cached.variables,
                    result: None,
                    warnings: cached.warnings,
                });
            }
            CacheEntry::Corrupt(warning) => warnings.push(warning),
            CacheEntry::Miss => debug!("cache miss"),
        }
    }

    let result = calculate_version(repo, &configuration, args.branch.as_deref(), commit)?;
    let variables = VersionVariables::from_result(&result, &configuration);

    if let (Some(cache), Some(key)) = (cache, &key) {
        cache
            .store(key, &variables, &result.warnings)
            .context("Failed to write version cache")?;
    }

    warnings.extend(result.warnings.iter().cloned());
    Ok(CalculationOutcome {
        variables,
        result: Some(result),
        warnings,
    })
}
