//! Pure formatting functions for UI output.
//!
//! Rendering is split from printing so the text can be tested; the
//! `display_*` functions only print what the `format_*` functions return.
//! Styling degrades to plain text when the stream is not a terminal.

use console::style;

use crate::analyzer::VersionResult;
use crate::boundary::BoundaryWarning;
use crate::output::VersionVariables;

/// Format and print an error message in red.
pub fn display_error(message: &str) {
    eprintln!("{} {}", style("ERROR:").red().bold(), message);
}

/// Display a boundary warning to the user.
pub fn display_warning(warning: &BoundaryWarning) {
    eprintln!("{} {}", style("⚠ WARNING:").yellow(), warning);
}

/// Print the calculated version on stdout, with a summary on stderr.
pub fn display_version(result: &VersionResult, variables: &VersionVariables) {
    eprintln!("{}", format_summary(result));
    println!("{}", variables.get("FullSemVer").unwrap_or_default());
}

/// One line describing where the version came from
pub fn format_summary(result: &VersionResult) -> String {
    let source = result
        .base_version
        .base_version_source
        .map(|oid| oid.to_string()[..7].to_string())
        .unwrap_or_else(|| "-".to_string());
    format!(
        "{} {} on {} (base {} from {}, source {})",
        style("→").yellow(),
        style(&result.semantic_version).green().bold(),
        style(&result.branch).cyan(),
        result.base_version.semantic_version,
        result.base_version.strategy,
        source
    )
}
