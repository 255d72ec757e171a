//! Terminal output for the binary.
//!
//! - `formatter` - Styled rendering of versions, variables and warnings
//! - This module - Output mode selection

use crate::error::Result;
use crate::output::VersionVariables;

pub mod formatter;

pub use formatter::{display_error, display_version, display_warning};

/// How the calculated variables are written to stdout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// FullSemVer only, with a summary on stderr
    #[default]
    Text,
    /// Every variable as a JSON object
    Json,
}

/// Render the requested view of `variables`
///
/// A single variable prints its bare value; otherwise the format decides.
pub fn render(variables: &VersionVariables, format: OutputFormat, show_variable: Option<&str>) -> Result<String> {
    if let Some(name) = show_variable {
        return match variables.find(name) {
            Some((_, value)) => Ok(value.to_string()),
            None => Err(crate::error::GitSemverError::config(format!(
                "Unknown variable '{}'; known variables: {}",
                name,
                variables.iter().map(|(k, _)| k).collect::<Vec<_>>().join(", ")
            ))),
        };
    }

    match format {
        OutputFormat::Json => variables.to_json(),
        OutputFormat::Text => Ok(variables.get("FullSemVer").unwrap_or_default().to_string()),
    }
}
