//! Logging setup for the binary
//!
//! All logging goes to stderr; stdout is reserved for the calculated version
//! and variables.

use tracing_subscriber::filter::EnvFilter;

/// Level used when neither a flag nor `RUST_LOG` selects one
pub const DEFAULT_LOG_LEVEL: &str = "warn";

/// Build an `EnvFilter` based on CLI flags and environment.
///
/// Priority: quiet flag > verbose flag > RUST_LOG env > default_level
pub fn env_filter(quiet: bool, verbose: u8, default_level: &str) -> EnvFilter {
    if quiet {
        return EnvFilter::new("error");
    }

    if verbose > 0 {
        let level = match verbose {
            1 => "debug",
            _ => "trace",
        };
        return EnvFilter::new(level);
    }

    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
}

/// Install a compact stderr subscriber
///
/// Installing twice is not an error; the first subscriber stays active.
pub fn init_logging(filter: EnvFilter) {
    let result = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .try_init();

    if result.is_ok() {
        tracing::debug!("logging initialized");
    }
}
